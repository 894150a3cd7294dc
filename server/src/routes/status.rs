//! Status CRUD, lookup, listing, and search routes.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use records::{ListFilter, NewStatus, SearchCriteria, Status, StatusUpdate};
use serde::Deserialize;

use crate::routes::error::ApiError;
use crate::services::status as service;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuery {
    pub source_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingQuery {
    pub tracking_id: Option<String>,
}

/// `POST /status`: create a status.
pub async fn create_status(
    State(state): State<AppState>,
    body: Result<Json<NewStatus>, JsonRejection>,
) -> Result<(StatusCode, Json<Status>), ApiError> {
    let Json(body) = body?;
    let status = service::create_status(&state, body).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

/// `GET /status/{id}`: fetch one status.
pub async fn get_status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Status>, ApiError> {
    Ok(Json(service::get_status(&state, &id).await?))
}

/// `PUT /status/{id}`: partial update.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Status>, ApiError> {
    let Json(update) = body?;
    Ok(Json(service::update_status(&state, &id, update).await?))
}

/// `GET /status/source?sourceId=`: look up by external system id.
pub async fn status_by_source(
    State(state): State<AppState>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<Status>, ApiError> {
    Ok(Json(service::find_by_source_id(&state, query.source_id.as_deref()).await?))
}

/// `GET /status/tracking?trackingId=`: look up by tracking id.
pub async fn status_by_tracking(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> Result<Json<Status>, ApiError> {
    Ok(Json(service::find_by_tracking_id(&state, query.tracking_id.as_deref()).await?))
}

/// `GET /client/{id}/statuses`: a client's statuses, optionally filtered.
pub async fn client_statuses(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    filter: Result<Query<ListFilter>, QueryRejection>,
) -> Result<Json<Vec<Status>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(service::client_statuses(&state, &client_id, &filter).await?))
}

/// `GET /advisor/{id}/client-statuses`: an advisor's statuses grouped by client.
pub async fn advisor_client_statuses(
    State(state): State<AppState>,
    Path(advisor_id): Path<String>,
    filter: Result<Query<ListFilter>, QueryRejection>,
) -> Result<Json<BTreeMap<String, Vec<Status>>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(service::advisor_client_statuses(&state, &advisor_id, &filter).await?))
}

/// `POST /statuses/search`: statuses matching every given criterion.
pub async fn search_statuses(
    State(state): State<AppState>,
    body: Result<Json<SearchCriteria>, JsonRejection>,
) -> Result<Json<Vec<Status>>, ApiError> {
    let Json(criteria) = body?;
    Ok(Json(service::search_statuses(&state, &criteria).await))
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
