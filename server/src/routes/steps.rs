//! Step sub-resource routes under `/status/{id}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use records::request::{AddSteps, CompleteStep, CurrentStep, ReorderSteps, StepReason};
use records::{Status, StepPatch};

use crate::routes::error::ApiError;
use crate::services::status as service;
use crate::state::AppState;

/// `POST /status/{id}/steps`: append steps.
pub async fn add_steps(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AddSteps>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(body) = body?;
    Ok(Json(service::add_steps(&state, &id, body.steps).await?))
}

/// `PUT /status/{id}/steps/{step_id}`: partial step update.
pub async fn update_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(String, String)>,
    body: Result<Json<StepPatch>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(service::update_step(&state, &id, &step_id, patch).await?))
}

/// `PUT /status/{id}/current-step`: move the current-step pointer.
pub async fn set_current_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CurrentStep>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(body) = body?;
    Ok(Json(service::set_current_step(&state, &id, &body.step_id).await?))
}

/// `PUT /status/{id}/steps/{step_id}/complete`.
///
/// The body is optional; a request without a JSON body completes without
/// notes. A malformed JSON body is still rejected.
pub async fn complete_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(String, String)>,
    body: Result<Option<Json<CompleteStep>>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let notes = body?.and_then(|Json(b)| b.notes);
    Ok(Json(service::complete_step(&state, &id, &step_id, notes).await?))
}

/// `PUT /status/{id}/steps/{step_id}/skip`.
pub async fn skip_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(String, String)>,
    body: Result<Json<StepReason>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(body) = body?;
    Ok(Json(service::skip_step(&state, &id, &step_id, &body.reason).await?))
}

/// `PUT /status/{id}/steps/{step_id}/block`.
pub async fn block_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(String, String)>,
    body: Result<Json<StepReason>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(body) = body?;
    Ok(Json(service::block_step(&state, &id, &step_id, &body.reason).await?))
}

/// `PUT /status/{id}/steps/reorder`.
pub async fn reorder_steps(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ReorderSteps>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(body) = body?;
    Ok(Json(service::reorder_steps(&state, &id, &body.step_order).await?))
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
