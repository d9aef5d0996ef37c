use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateAdjustmentRequest, PointAdjustment},
    error::Result,
    service::AdjustmentFilter,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PointAdjustment>>> {
    let filter = AdjustmentFilter {
        user_id: params.user_id,
        year: params.year,
        month: params.month,
        include_deleted: params.include_deleted,
    };
    let adjustments = state
        .service_context
        .adjustment_service
        .list(&current.user, filter)
        .await?;
    Ok(Json(adjustments))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateAdjustmentRequest>,
) -> Result<(StatusCode, Json<PointAdjustment>)> {
    let adjustment = state
        .service_context
        .adjustment_service
        .create(&current.user, req)
        .await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

pub async fn soft_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .adjustment_service
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
        .adjustment_service
        .restore(&current.user, id)
        .await?;
    Ok(StatusCode::OK)
}
