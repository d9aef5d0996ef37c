use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{
        Challenge, CreateChallengeRequest, CreateEventRequest, Event, Lifecycle,
        UpdateChallengeRequest, UpdateEventRequest,
    },
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub include_deleted: bool,
}

/// Members see only active events; admins list everything through the
/// admin surface.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.service_context.event_repo.list_active().await?))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>> {
    Ok(Json(
        state
            .service_context
            .event_repo
            .list(params.include_deleted)
            .await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Event>> {
    let event = state
        .service_context
        .event_repo
        .find_by_id(id, false)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    Ok(Json(event))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    if !req.weight.is_finite() || req.weight < 0.0 {
        return Err(AppError::Validation(
            "Event weight must be a non-negative number".to_string(),
        ));
    }
    let event = state.service_context.event_repo.create(req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    if let Some(weight) = req.weight {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AppError::Validation(
                "Event weight must be a non-negative number".to_string(),
            ));
        }
    }
    let event = state.service_context.event_repo.update(id, req).await?;
    Ok(Json(event))
}

pub async fn soft_delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state
        .service_context
        .event_repo
        .set_lifecycle(id, Lifecycle::Deleted)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state
        .service_context
        .event_repo
        .set_lifecycle(id, Lifecycle::Active)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn purge(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.service_context.event_repo.purge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ChallengeListParams {
    #[serde(default)]
    pub include_deleted: bool,
    pub category: Option<String>,
    pub q: Option<String>,
}

pub async fn list_challenges(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(params): Query<ChallengeListParams>,
) -> Result<Json<Vec<Challenge>>> {
    let ctx = &state.service_context;
    ctx.event_repo
        .find_by_id(event_id, params.include_deleted)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let challenges = ctx
        .challenge_repo
        .list_by_event(
            event_id,
            params.include_deleted,
            params.category.as_deref(),
            params.q.as_deref(),
        )
        .await?;
    Ok(Json(challenges))
}

pub async fn create_challenge(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<Challenge>)> {
    let ctx = &state.service_context;
    ctx.event_repo
        .find_by_id(event_id, false)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let challenge = ctx.challenge_repo.create(event_id, req).await?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

pub async fn update_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateChallengeRequest>,
) -> Result<Json<Challenge>> {
    let challenge = state.service_context.challenge_repo.update(id, req).await?;
    Ok(Json(challenge))
}

pub async fn soft_delete_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .challenge_repo
        .set_lifecycle(id, Lifecycle::Deleted)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .challenge_repo
        .set_lifecycle(id, Lifecycle::Active)
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub struct PurgeParams {
    #[serde(default)]
    pub force: bool,
}

/// Hard delete is refused while submission items still reference the
/// challenge, unless forced. Forcing removes those items along with
/// the challenge.
pub async fn purge_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PurgeParams>,
) -> Result<StatusCode> {
    let ctx = &state.service_context;
    let references = ctx.challenge_repo.reference_count(id).await?;
    if references > 0 && !params.force {
        return Err(AppError::InvalidTransition(format!(
            "Challenge is referenced by {} submission items",
            references
        )));
    }
    ctx.challenge_repo.purge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
