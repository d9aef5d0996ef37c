use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateSubmissionRequest, ResubmitRequest, Submission},
    error::{AppError, Result},
    service::SubmissionDetail,
};

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>)> {
    let submission = state
        .service_context
        .submission_service
        .create(&current.user, req)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Submission>>> {
    let submissions = state
        .service_context
        .submission_service
        .list_mine(&current.user)
        .await?;
    Ok(Json(submissions))
}

/// Owners see their own submission; reviewers see anyone's. Everyone
/// else gets a 404 rather than a confirmation that the id exists.
pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionDetail>> {
    let detail = state
        .service_context
        .review_service
        .submission_detail(id)
        .await?;

    if detail.submission.user_id != current.user.id && !current.user.can_review() {
        return Err(AppError::NotFound("Submission not found".to_string()));
    }
    Ok(Json(detail))
}

pub async fn resubmit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResubmitRequest>,
) -> Result<Json<Submission>> {
    let submission = state
        .service_context
        .review_service
        .resubmit_edit(&current.user, id, req)
        .await?;
    Ok(Json(submission))
}

pub async fn soft_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .review_service
        .soft_delete(&current.user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .review_service
        .restore(&current.user, id)
        .await?;
    Ok(StatusCode::OK)
}
