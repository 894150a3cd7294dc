//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the REST surface under a single Axum router. CORS is
//! permissive so the dashboard can be served from anywhere, and every request
//! is traced through `tower-http`.

pub mod analytics;
pub mod error;
pub mod status;
pub mod steps;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", post(status::create_status))
        .route("/status/source", get(status::status_by_source))
        .route("/status/tracking", get(status::status_by_tracking))
        .route("/status/{id}", get(status::get_status).put(status::update_status))
        .route("/client/{id}/statuses", get(status::client_statuses))
        .route("/advisor/{id}/client-statuses", get(status::advisor_client_statuses))
        .route("/statuses/search", post(status::search_statuses))
        .route("/status/{id}/steps", post(steps::add_steps))
        .route("/status/{id}/steps/reorder", put(steps::reorder_steps))
        .route("/status/{id}/steps/{step_id}", put(steps::update_step))
        .route("/status/{id}/current-step", put(steps::set_current_step))
        .route("/status/{id}/steps/{step_id}/complete", put(steps::complete_step))
        .route("/status/{id}/steps/{step_id}/skip", put(steps::skip_step))
        .route("/status/{id}/steps/{step_id}/block", put(steps::block_step))
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/embedding", get(analytics::embedding))
        .route("/analytics/embedding.svg", get(analytics::embedding_svg))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /healthz`. Reports 503 when a configured database stops answering.
async fn healthz(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = &state.pool else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "health check database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
