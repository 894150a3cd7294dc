//! Data access for the terminal views.
//!
//! DESIGN
//! ======
//! `StatusSource` either talks to the REST server over HTTP or serves the
//! bundled sample dataset from memory. The mock mirrors the remote surface
//! closely enough for offline demos, with two deliberate differences:
//! lookups that miss fall back to the first sample record, and `create` /
//! `update` never persist anything.

use std::collections::BTreeMap;
use std::time::Duration;

use records::analytics::{self, AnalyticsSummary, EmbeddingRequest};
use records::embedding::{Plot, View};
use records::request::{AddSteps, CompleteStep, CurrentStep, ReorderSteps, StepReason};
use records::{
    ListFilter, NewStatus, SearchCriteria, Status, StatusUpdate, Step, StepOrder, StepPatch, query, seed, steps,
    timestamp,
};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error("sample dataset is empty")]
    NoSampleData,
    #[error("invalid sample dataset: {0}")]
    SampleData(#[from] serde_json::Error),
}

/// Embedding parameters as passed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmbeddingParams {
    pub view: View,
    pub count: Option<usize>,
    pub seed: Option<u64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

// =============================================================================
// SOURCE
// =============================================================================

pub enum StatusSource {
    Http(HttpSource),
    Mock(MockSource),
}

impl StatusSource {
    /// Build the remote source, or the in-memory one when `mock` is set.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or the bundled sample data
    /// does not parse.
    pub fn connect(base_url: &str, mock: bool) -> Result<Self, SourceError> {
        if mock {
            return Ok(Self::Mock(MockSource::from_seed()?));
        }
        Ok(Self::Http(HttpSource::new(base_url)?))
    }

    pub async fn ping(&self) -> Result<(), SourceError> {
        match self {
            Self::Http(http) => http.ping().await,
            Self::Mock(_) => Ok(()),
        }
    }

    pub async fn get_status(&mut self, status_id: &str) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => http.send(http.request(Method::GET, &format!("/status/{status_id}"))).await,
            Self::Mock(mock) => mock.get_status(status_id),
        }
    }

    pub async fn status_by_source(&mut self, source_id: &str) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let request = http.request(Method::GET, "/status/source").query(&[("sourceId", source_id)]);
                http.send(request).await
            }
            Self::Mock(mock) => mock.status_by_source(source_id),
        }
    }

    pub async fn status_by_tracking(&mut self, tracking_id: &str) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let request = http.request(Method::GET, "/status/tracking").query(&[("trackingId", tracking_id)]);
                http.send(request).await
            }
            Self::Mock(mock) => mock.status_by_tracking(tracking_id),
        }
    }

    pub async fn create_status(&mut self, body: NewStatus) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => http.send(http.request(Method::POST, "/status").json(&body)).await,
            Self::Mock(mock) => mock.first(),
        }
    }

    pub async fn update_status(&mut self, status_id: &str, body: StatusUpdate) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                http.send(http.request(Method::PUT, &format!("/status/{status_id}")).json(&body)).await
            }
            Self::Mock(mock) => mock.update_status(status_id, body),
        }
    }

    pub async fn client_statuses(&mut self, client_id: &str, filter: &ListFilter) -> Result<Vec<Status>, SourceError> {
        match self {
            Self::Http(http) => {
                let request = http.request(Method::GET, &format!("/client/{client_id}/statuses")).query(filter);
                http.send(request).await
            }
            Self::Mock(mock) => Ok(mock.client_statuses(client_id, filter)),
        }
    }

    pub async fn advisor_client_statuses(
        &mut self,
        advisor_id: &str,
        filter: &ListFilter,
    ) -> Result<BTreeMap<String, Vec<Status>>, SourceError> {
        match self {
            Self::Http(http) => {
                let path = format!("/advisor/{advisor_id}/client-statuses");
                http.send(http.request(Method::GET, &path).query(filter)).await
            }
            Self::Mock(mock) => Ok(mock.advisor_client_statuses(advisor_id, filter)),
        }
    }

    pub async fn search_statuses(&mut self, criteria: &SearchCriteria) -> Result<Vec<Status>, SourceError> {
        match self {
            Self::Http(http) => http.send(http.request(Method::POST, "/statuses/search").json(criteria)).await,
            Self::Mock(mock) => Ok(query::search(&mock.statuses, criteria)),
        }
    }

    // -------------------------------------------------------------------------
    // Steps
    // -------------------------------------------------------------------------

    pub async fn add_steps(&mut self, status_id: &str, new_steps: Vec<Step>) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let body = AddSteps { steps: new_steps };
                http.send(http.request(Method::POST, &format!("/status/{status_id}/steps")).json(&body)).await
            }
            Self::Mock(mock) => mock.edit_steps(status_id, |status, _| {
                steps::add_steps(status, new_steps);
                true
            }),
        }
    }

    pub async fn update_step(&mut self, status_id: &str, step_id: &str, patch: StepPatch) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let path = format!("/status/{status_id}/steps/{step_id}");
                http.send(http.request(Method::PUT, &path).json(&patch)).await
            }
            Self::Mock(mock) => mock.edit_steps(status_id, |status, _| steps::update_step(status, step_id, patch)),
        }
    }

    pub async fn set_current_step(&mut self, status_id: &str, step_id: &str) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let body = CurrentStep { step_id: step_id.to_owned() };
                http.send(http.request(Method::PUT, &format!("/status/{status_id}/current-step")).json(&body)).await
            }
            Self::Mock(mock) => mock.edit_steps(status_id, |status, _| steps::set_current_step(status, step_id)),
        }
    }

    pub async fn complete_step(
        &mut self,
        status_id: &str,
        step_id: &str,
        notes: Option<String>,
    ) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let path = format!("/status/{status_id}/steps/{step_id}/complete");
                http.send(http.request(Method::PUT, &path).json(&CompleteStep { notes })).await
            }
            Self::Mock(mock) => {
                mock.edit_steps(status_id, |status, now| steps::complete_step(status, step_id, notes, now))
            }
        }
    }

    pub async fn skip_step(&mut self, status_id: &str, step_id: &str, reason: &str) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let path = format!("/status/{status_id}/steps/{step_id}/skip");
                let body = StepReason { reason: reason.to_owned() };
                http.send(http.request(Method::PUT, &path).json(&body)).await
            }
            Self::Mock(mock) => mock.edit_steps(status_id, |status, _| steps::skip_step(status, step_id, reason)),
        }
    }

    pub async fn block_step(&mut self, status_id: &str, step_id: &str, reason: &str) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let path = format!("/status/{status_id}/steps/{step_id}/block");
                let body = StepReason { reason: reason.to_owned() };
                http.send(http.request(Method::PUT, &path).json(&body)).await
            }
            Self::Mock(mock) => mock.edit_steps(status_id, |status, _| steps::block_step(status, step_id, reason)),
        }
    }

    pub async fn reorder_steps(&mut self, status_id: &str, step_order: Vec<StepOrder>) -> Result<Status, SourceError> {
        match self {
            Self::Http(http) => {
                let path = format!("/status/{status_id}/steps/reorder");
                http.send(http.request(Method::PUT, &path).json(&ReorderSteps { step_order })).await
            }
            Self::Mock(mock) => mock.edit_steps(status_id, |status, _| {
                steps::reorder_steps(status, &step_order);
                true
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Analytics
    // -------------------------------------------------------------------------

    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary, SourceError> {
        match self {
            Self::Http(http) => http.send(http.request(Method::GET, "/analytics/summary")).await,
            Self::Mock(_) => Ok(analytics::summary()),
        }
    }

    pub async fn embedding(&self, params: EmbeddingParams) -> Result<Plot, SourceError> {
        match self {
            Self::Http(http) => {
                let view = match params.view {
                    View::Scatter => "2d",
                    View::Cluster => "cluster",
                };
                let mut query = vec![("view", view.to_owned())];
                if let Some(count) = params.count {
                    query.push(("count", count.to_string()));
                }
                if let Some(seed) = params.seed {
                    query.push(("seed", seed.to_string()));
                }
                if let Some(width) = params.width {
                    query.push(("width", width.to_string()));
                }
                if let Some(height) = params.height {
                    query.push(("height", height.to_string()));
                }
                http.send(http.request(Method::GET, "/analytics/embedding").query(&query)).await
            }
            Self::Mock(_) => {
                let request =
                    EmbeddingRequest::new(params.view, params.count, params.seed, params.width, params.height);
                Ok(analytics::embedding_plot(&request))
            }
        }
    }
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn ping(&self) -> Result<(), SourceError> {
        let response = self.request(Method::GET, "/healthz").send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Server { status: status.as_u16(), message: "health check failed".to_owned() });
        }
        Ok(())
    }

    /// Send a request and decode a JSON body, mapping non-2xx responses to
    /// [`SourceError::Server`].
    pub async fn send<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SourceError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(server_error(status.as_u16(), status.canonical_reason(), &body));
        }
        Ok(response.json::<T>().await?)
    }
}

/// Build a [`SourceError::Server`] from an `{"error":{...}}` body when present.
pub(crate) fn server_error(status: u16, reason: Option<&str>, body: &Value) -> SourceError {
    let message = body.pointer("/error/message").and_then(Value::as_str).or(reason).unwrap_or("unknown error");
    let message = match body.pointer("/error/code").and_then(Value::as_str) {
        Some(code) => format!("{message} ({code})"),
        None => message.to_owned(),
    };
    SourceError::Server { status, message }
}

// =============================================================================
// MOCK
// =============================================================================

/// In-memory sample dataset. Step operations mutate it in place.
pub struct MockSource {
    statuses: Vec<Status>,
}

impl MockSource {
    /// # Errors
    ///
    /// Fails when the bundled dataset does not parse or is empty.
    pub fn from_seed() -> Result<Self, SourceError> {
        Self::new(seed::statuses()?)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::NoSampleData`] for an empty list, since every
    /// fallback lookup needs a first record.
    pub fn new(statuses: Vec<Status>) -> Result<Self, SourceError> {
        if statuses.is_empty() {
            return Err(SourceError::NoSampleData);
        }
        Ok(Self { statuses })
    }

    fn first(&self) -> Result<Status, SourceError> {
        self.statuses.first().cloned().ok_or(SourceError::NoSampleData)
    }

    fn find_or_first(
        &self,
        label: &'static str,
        wanted: &str,
        hit: impl Fn(&Status) -> bool,
    ) -> Result<Status, SourceError> {
        match self.statuses.iter().find(|&s| hit(s)) {
            Some(status) => Ok(status.clone()),
            None => {
                tracing::warn!(lookup = label, id = wanted, "no sample record matched; using the first record");
                self.first()
            }
        }
    }

    fn get_status(&self, status_id: &str) -> Result<Status, SourceError> {
        self.find_or_first("statusId", status_id, |s| s.status_id == status_id)
    }

    fn status_by_source(&self, source_id: &str) -> Result<Status, SourceError> {
        self.find_or_first("sourceId", source_id, |s| s.source_id.as_deref() == Some(source_id))
    }

    fn status_by_tracking(&self, tracking_id: &str) -> Result<Status, SourceError> {
        self.find_or_first("trackingId", tracking_id, |s| s.tracking_id == tracking_id)
    }

    /// Merge the update into a copy of the stored record. Nothing is saved.
    fn update_status(&self, status_id: &str, body: StatusUpdate) -> Result<Status, SourceError> {
        let Some(stored) = self.statuses.iter().find(|s| s.status_id == status_id) else {
            tracing::warn!(id = status_id, "update target not in sample data; using the first record");
            return self.first();
        };
        let mut merged = stored.clone();
        body.apply_to(&mut merged, &timestamp::now());
        Ok(merged)
    }

    /// Client listing. Date bounds are ignored and `stage` matches the
    /// current stage, which is what the dashboard filters on.
    fn client_statuses(&self, client_id: &str, filter: &ListFilter) -> Vec<Status> {
        self.statuses
            .iter()
            .filter(|s| s.client_id == client_id)
            .filter(|s| stage_matches(filter, s))
            .cloned()
            .collect()
    }

    fn advisor_client_statuses(&self, advisor_id: &str, filter: &ListFilter) -> BTreeMap<String, Vec<Status>> {
        let matching = self
            .statuses
            .iter()
            .filter(|s| s.advisor_id == advisor_id)
            .filter(|s| stage_matches(filter, s))
            .cloned()
            .collect();
        query::group_by_client(matching)
    }

    /// Run a step operation against the stored record in place.
    ///
    /// An unknown status yields the first record untouched; an unknown step
    /// yields the status untouched.
    fn edit_steps(
        &mut self,
        status_id: &str,
        op: impl FnOnce(&mut Status, &str) -> bool,
    ) -> Result<Status, SourceError> {
        let Some(status) = self.statuses.iter_mut().find(|s| s.status_id == status_id) else {
            tracing::warn!(id = status_id, "step target not in sample data; using the first record");
            return self.first();
        };
        let now = timestamp::now();
        if op(status, &now) {
            status.last_updated_date.clone_from(&now);
        } else {
            tracing::warn!(id = status_id, "step not found; status left unchanged");
        }
        Ok(status.clone())
    }
}

/// Mock listings compare both `stage` and `statusType` against the current
/// stage; every non-empty value given must match.
fn stage_matches(filter: &ListFilter, status: &Status) -> bool {
    [filter.stage.as_deref(), filter.status_type.as_deref()]
        .into_iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .all(|wanted| status.current_stage == wanted)
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
