use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::ReadStatus,
    error::Result,
    service::{Inbox, InboxItem},
};

#[derive(Debug, Deserialize)]
pub struct InboxParams {
    pub status: Option<ReadStatus>,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

pub async fn inbox(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<InboxParams>,
) -> Result<Json<Inbox>> {
    let inbox = state
        .service_context
        .notification_service
        .inbox(&current.user, params.status, params.page)
        .await?;
    Ok(Json(inbox))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UnreadCount>> {
    let unread = state
        .service_context
        .notification_service
        .unread_count(&current.user)
        .await?;
    Ok(Json(UnreadCount { unread }))
}

pub async fn open(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<InboxItem>> {
    let item = state
        .service_context
        .notification_service
        .open(&current.user, id)
        .await?;
    Ok(Json(item))
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: u64,
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MarkedRead>> {
    let marked = state
        .service_context
        .notification_service
        .mark_all_read(&current.user)
        .await?;
    Ok(Json(MarkedRead { marked }))
}

pub async fn soft_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .notification_service
        .soft_delete(&current.user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub batch_id: Uuid,
}

pub async fn broadcast(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<BroadcastRequest>,
) -> Result<(StatusCode, Json<BroadcastResponse>)> {
    let batch_id = state
        .service_context
        .notification_service
        .broadcast(&current.user, &req.title, &req.body)
        .await?;
    Ok((StatusCode::CREATED, Json(BroadcastResponse { batch_id })))
}

#[derive(Debug, Serialize)]
pub struct RecalledCount {
    pub recalled: u64,
}

pub async fn recall_broadcast(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<RecalledCount>> {
    let recalled = state
        .service_context
        .notification_service
        .recall_broadcast(&current.user, batch_id)
        .await?;
    Ok(Json(RecalledCount { recalled }))
}
