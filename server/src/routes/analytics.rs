//! Analytics routes: dashboard series and the embedding scatterplot.

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use records::analytics::{self, AnalyticsSummary, EmbeddingRequest};
use records::embedding::{Plot, View};
use serde::Deserialize;

use crate::routes::error::ApiError;
use crate::services::analytics::render_svg;

#[derive(Debug, Default, Deserialize)]
pub struct EmbeddingQuery {
    pub view: Option<String>,
    pub count: Option<usize>,
    pub seed: Option<u64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl EmbeddingQuery {
    fn into_request(self) -> Result<EmbeddingRequest, ApiError> {
        let view = match self.view.as_deref() {
            None | Some("") => View::default(),
            Some(raw) => View::parse(raw)
                .ok_or_else(|| ApiError::bad_request("E_INVALID_VIEW", format!("unknown view: {raw}")))?,
        };
        Ok(EmbeddingRequest::new(view, self.count, self.seed, self.width, self.height))
    }
}

/// `GET /analytics/summary`: static chart series.
pub async fn summary() -> Json<AnalyticsSummary> {
    Json(analytics::summary())
}

/// `GET /analytics/embedding`: laid-out sample points as JSON.
pub async fn embedding(query: Result<Query<EmbeddingQuery>, QueryRejection>) -> Result<Json<Plot>, ApiError> {
    let Query(query) = query?;
    let request = query.into_request()?;
    Ok(Json(analytics::embedding_plot(&request)))
}

/// `GET /analytics/embedding.svg`: the same plot rendered as SVG.
pub async fn embedding_svg(
    query: Result<Query<EmbeddingQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let request = query.into_request()?;
    let svg = render_svg(&analytics::embedding_plot(&request));
    Ok(([(CONTENT_TYPE, "image/svg+xml")], svg))
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
