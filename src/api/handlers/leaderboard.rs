use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::Result,
    service::{CountLeaderboardOverview, LeaderboardOverview, UserScoreSummary},
};

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<LeaderboardOverview>> {
    let overview = state
        .service_context
        .leaderboard_service
        .overview(params.year, params.month)
        .await?;
    Ok(Json(overview))
}

pub async fn count_overview(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<CountLeaderboardOverview>> {
    let overview = state
        .service_context
        .leaderboard_service
        .count_overview(params.year, params.month)
        .await?;
    Ok(Json(overview))
}

pub async fn my_score(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<MonthParams>,
) -> Result<Json<UserScoreSummary>> {
    let summary = state
        .service_context
        .leaderboard_service
        .user_summary(current.user.id, params.year, params.month)
        .await?;
    Ok(Json(summary))
}
