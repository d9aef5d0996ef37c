use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::SubmissionItem,
    error::Result,
    service::SubmissionReviewRow,
};

#[derive(Debug, Deserialize)]
pub struct QueueParams {
    pub event_id: Option<Uuid>,
    pub q: Option<String>,
}

pub async fn queue(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<QueueParams>,
) -> Result<Json<Vec<SubmissionReviewRow>>> {
    let rows = state
        .service_context
        .review_service
        .review_queue(&current.user, params.event_id, params.q.as_deref())
        .await?;
    Ok(Json(rows))
}

pub async fn toggle_approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<SubmissionItem>> {
    let item = state
        .service_context
        .review_service
        .toggle_approve(&current.user, item_id)
        .await?;
    Ok(Json(item))
}

pub async fn toggle_revoke(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<SubmissionItem>> {
    let item = state
        .service_context
        .review_service
        .toggle_revoke(&current.user, item_id)
        .await?;
    Ok(Json(item))
}

#[derive(Debug, Serialize)]
pub struct ApprovedCount {
    pub approved: u64,
}

pub async fn approve_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<ApprovedCount>> {
    let approved = state
        .service_context
        .review_service
        .approve_all(&current.user, submission_id)
        .await?;
    Ok(Json(ApprovedCount { approved }))
}

pub async fn approve_all_for_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ApprovedCount>> {
    let approved = state
        .service_context
        .review_service
        .approve_all_for_event(&current.user, event_id)
        .await?;
    Ok(Json(ApprovedCount { approved }))
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> Result<StatusCode> {
    state
        .service_context
        .review_service
        .reject(&current.user, submission_id, &req.reason)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn unreject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .review_service
        .unreject(&current.user, submission_id)
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub struct ManualPointsRequest {
    /// `null` reverts to item-based scoring.
    pub points: Option<f64>,
}

pub async fn set_manual_points(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
    Json(req): Json<ManualPointsRequest>,
) -> Result<StatusCode> {
    state
        .service_context
        .review_service
        .set_manual_points(&current.user, submission_id, req.points)
        .await?;
    Ok(StatusCode::OK)
}
