//! Status service: create, lookup, update, listing, search, and step edits.
//!
//! DESIGN
//! ======
//! Every operation works against the in-memory `StatusBook`. Mutations take
//! the write lock, edit a clone, and swap it back in only on success, so a
//! rejected step edit never leaves a half-applied record or a dirty flag.
//! Persistence is the flush task's job; nothing here touches Postgres.

use std::collections::BTreeMap;

use records::request::{MissingField, NewStatus, StatusUpdate};
use records::{ListFilter, QueryError, SearchCriteria, Status, Step, StepOrder, StepPatch, query, steps, timestamp};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::sentiment;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Status not found with ID: {0}")]
    NotFound(String),
    #[error("Status not found with source ID: {0}")]
    SourceNotFound(String),
    #[error("Status not found with tracking ID: {0}")]
    TrackingNotFound(String),
    #[error("Step {step_id} not found on status {status_id}")]
    StepNotFound { status_id: String, step_id: String },
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error("{0} query parameter is required")]
    MissingParam(&'static str),
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}

impl StatusError {
    /// Grepable error code for the JSON error body.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::SourceNotFound(_) | Self::TrackingNotFound(_) => "E_STATUS_NOT_FOUND",
            Self::StepNotFound { .. } => "E_STEP_NOT_FOUND",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::MissingParam(_) => "E_MISSING_PARAM",
            Self::InvalidQuery(_) => "E_INVALID_QUERY",
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::SourceNotFound(_) | Self::TrackingNotFound(_) | Self::StepNotFound { .. }
        )
    }
}

/// Human-friendly lookup key: `TRK-` plus eight upper-case hex digits.
#[must_use]
pub fn generate_tracking_id() -> String {
    format!("TRK-{:08X}", rand::random::<u32>())
}

// =============================================================================
// CREATE / READ / UPDATE
// =============================================================================

/// Create a status from a request body and store it.
///
/// # Errors
///
/// Returns [`StatusError::MissingField`] if a required field is absent.
pub async fn create_status(state: &AppState, mut body: NewStatus) -> Result<Status, StatusError> {
    let now = timestamp::now();
    let initial_steps = body.steps.take();
    let mut status = body.into_status(Uuid::new_v4().to_string(), generate_tracking_id(), &now)?;

    let mood = sentiment::analyze(&status.status_summary);
    status
        .metadata
        .get_or_insert_with(BTreeMap::new)
        .insert("sentiment".into(), mood.as_str().into());

    if let Some(initial) = initial_steps.filter(|s| !s.is_empty()) {
        steps::add_steps(&mut status, initial);
        status.current_step_id = steps::next_open_step(&status).map(|s| s.step_id.clone());
    }

    info!(status_id = %status.status_id, client_id = %status.client_id, tracking_id = %status.tracking_id, "status created");
    state.book.write().await.insert(status.clone());
    Ok(status)
}

/// # Errors
///
/// Returns [`StatusError::NotFound`] if no status has this id.
pub async fn get_status(state: &AppState, status_id: &str) -> Result<Status, StatusError> {
    state
        .book
        .read()
        .await
        .get(status_id)
        .cloned()
        .ok_or_else(|| StatusError::NotFound(status_id.to_owned()))
}

/// Look a status up by the id of the external system record it mirrors.
///
/// # Errors
///
/// Returns [`StatusError::MissingParam`] for a missing or empty id and
/// [`StatusError::SourceNotFound`] when nothing matches.
pub async fn find_by_source_id(state: &AppState, source_id: Option<&str>) -> Result<Status, StatusError> {
    let source_id = source_id.filter(|s| !s.is_empty()).ok_or(StatusError::MissingParam("sourceId"))?;
    let book = state.book.read().await;
    book.iter()
        .find(|s| s.source_id.as_deref() == Some(source_id))
        .cloned()
        .ok_or_else(|| StatusError::SourceNotFound(source_id.to_owned()))
}

/// # Errors
///
/// Returns [`StatusError::MissingParam`] for a missing or empty id and
/// [`StatusError::TrackingNotFound`] when nothing matches.
pub async fn find_by_tracking_id(state: &AppState, tracking_id: Option<&str>) -> Result<Status, StatusError> {
    let tracking_id = tracking_id.filter(|s| !s.is_empty()).ok_or(StatusError::MissingParam("trackingId"))?;
    let book = state.book.read().await;
    book.iter()
        .find(|s| s.tracking_id == tracking_id)
        .cloned()
        .ok_or_else(|| StatusError::TrackingNotFound(tracking_id.to_owned()))
}

/// Apply a partial update. A new summary re-runs sentiment analysis.
///
/// # Errors
///
/// Returns [`StatusError::NotFound`] if no status has this id.
pub async fn update_status(state: &AppState, status_id: &str, update: StatusUpdate) -> Result<Status, StatusError> {
    let now = timestamp::now();
    let summary_changed = update.status_summary.is_some();

    let mut book = state.book.write().await;
    let updated = book
        .update(status_id, |status| {
            let stage_changed = update.apply_to(status, &now);
            if summary_changed {
                let mood = sentiment::analyze(&status.status_summary);
                status
                    .metadata
                    .get_or_insert_with(BTreeMap::new)
                    .insert("sentiment".into(), mood.as_str().into());
            }
            if stage_changed {
                info!(%status_id, stage = %status.current_stage, "status stage changed");
            }
            status.clone()
        })
        .ok_or_else(|| StatusError::NotFound(status_id.to_owned()))?;
    Ok(updated)
}

// =============================================================================
// LISTING / SEARCH
// =============================================================================

/// # Errors
///
/// Returns [`StatusError::InvalidQuery`] for malformed date bounds.
pub async fn client_statuses(state: &AppState, client_id: &str, filter: &ListFilter) -> Result<Vec<Status>, StatusError> {
    let book = state.book.read().await;
    Ok(filter.apply(book.iter().filter(|s| s.client_id == client_id))?)
}

/// Statuses of every client served by an advisor, grouped by client.
///
/// # Errors
///
/// Returns [`StatusError::InvalidQuery`] for malformed date bounds.
pub async fn advisor_client_statuses(
    state: &AppState,
    advisor_id: &str,
    filter: &ListFilter,
) -> Result<BTreeMap<String, Vec<Status>>, StatusError> {
    let book = state.book.read().await;
    let matching = filter.apply(book.iter().filter(|s| s.advisor_id == advisor_id))?;
    Ok(query::group_by_client(matching))
}

pub async fn search_statuses(state: &AppState, criteria: &SearchCriteria) -> Vec<Status> {
    let book = state.book.read().await;
    query::search(book.iter(), criteria)
}

// =============================================================================
// STEPS
// =============================================================================

/// Append steps. When the status had no current step, the first open one
/// becomes current.
///
/// # Errors
///
/// Returns [`StatusError::NotFound`] if no status has this id.
pub async fn add_steps(state: &AppState, status_id: &str, new_steps: Vec<Step>) -> Result<Status, StatusError> {
    edit_steps(state, status_id, None, |status| {
        steps::add_steps(status, new_steps);
        if status.current_step_id.is_none() {
            status.current_step_id = steps::next_open_step(status).map(|s| s.step_id.clone());
        }
        true
    })
    .await
}

/// # Errors
///
/// Returns [`StatusError::NotFound`] or [`StatusError::StepNotFound`].
pub async fn update_step(
    state: &AppState,
    status_id: &str,
    step_id: &str,
    patch: StepPatch,
) -> Result<Status, StatusError> {
    edit_steps(state, status_id, Some(step_id), |status| steps::update_step(status, step_id, patch)).await
}

/// # Errors
///
/// Returns [`StatusError::NotFound`] or [`StatusError::StepNotFound`].
pub async fn set_current_step(state: &AppState, status_id: &str, step_id: &str) -> Result<Status, StatusError> {
    edit_steps(state, status_id, Some(step_id), |status| steps::set_current_step(status, step_id)).await
}

/// # Errors
///
/// Returns [`StatusError::NotFound`] or [`StatusError::StepNotFound`].
pub async fn complete_step(
    state: &AppState,
    status_id: &str,
    step_id: &str,
    notes: Option<String>,
) -> Result<Status, StatusError> {
    let now = timestamp::now();
    edit_steps(state, status_id, Some(step_id), |status| steps::complete_step(status, step_id, notes, &now)).await
}

/// # Errors
///
/// Returns [`StatusError::NotFound`] or [`StatusError::StepNotFound`].
pub async fn skip_step(state: &AppState, status_id: &str, step_id: &str, reason: &str) -> Result<Status, StatusError> {
    edit_steps(state, status_id, Some(step_id), |status| steps::skip_step(status, step_id, reason)).await
}

/// # Errors
///
/// Returns [`StatusError::NotFound`] or [`StatusError::StepNotFound`].
pub async fn block_step(state: &AppState, status_id: &str, step_id: &str, reason: &str) -> Result<Status, StatusError> {
    edit_steps(state, status_id, Some(step_id), |status| steps::block_step(status, step_id, reason)).await
}

/// Unknown step ids in `orders` are ignored.
///
/// # Errors
///
/// Returns [`StatusError::NotFound`] if no status has this id.
pub async fn reorder_steps(state: &AppState, status_id: &str, orders: &[StepOrder]) -> Result<Status, StatusError> {
    edit_steps(state, status_id, None, |status| {
        steps::reorder_steps(status, orders);
        true
    })
    .await
}

/// Run a step operation on a copy and commit it only if the step existed.
async fn edit_steps(
    state: &AppState,
    status_id: &str,
    step_id: Option<&str>,
    op: impl FnOnce(&mut Status) -> bool,
) -> Result<Status, StatusError> {
    let mut book = state.book.write().await;
    let mut working = book
        .get(status_id)
        .cloned()
        .ok_or_else(|| StatusError::NotFound(status_id.to_owned()))?;

    if !op(&mut working) {
        let step_id = step_id.unwrap_or_default().to_owned();
        warn!(%status_id, %step_id, "step operation on unknown step");
        return Err(StatusError::StepNotFound { status_id: status_id.to_owned(), step_id });
    }

    working.last_updated_date = timestamp::now();
    book.insert(working.clone());
    Ok(working)
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
