use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{CreateUserRequest, Lifecycle, UpdateUserRequest, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>> {
    let users = state
        .service_context
        .user_repo
        .list(params.include_deleted)
        .await?;
    Ok(Json(users))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<User>> {
    let user = state
        .service_context
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let ctx = &state.service_context;

    if req.password.len() < state.settings.auth.min_password_length {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            state.settings.auth.min_password_length
        )));
    }
    if ctx.user_repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Validation("Username is already taken".to_string()));
    }

    let password_hash = AuthService::hash_password(&req.password).await?;
    let user = ctx.user_repo.create(req, &password_hash).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.user_repo.update(id, req).await?;
    Ok(Json(user))
}

pub async fn soft_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if current.user.id == id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }
    let ctx = &state.service_context;
    ctx.user_repo.set_lifecycle(id, Lifecycle::Deleted).await?;
    ctx.auth_service.invalidate_sessions_for(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state
        .service_context
        .user_repo
        .set_lifecycle(id, Lifecycle::Active)
        .await?;
    Ok(StatusCode::OK)
}

/// Hard delete with full cascade. Only offered for accounts already in
/// the trash.
pub async fn purge(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if current.user.id == id {
        return Err(AppError::Validation(
            "You cannot purge your own account".to_string(),
        ));
    }
    state.service_context.user_repo.purge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode> {
    let ctx = &state.service_context;

    if req.new_password.len() < state.settings.auth.min_password_length {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            state.settings.auth.min_password_length
        )));
    }
    ctx.user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let new_hash = AuthService::hash_password(&req.new_password).await?;
    ctx.user_repo.set_password_hash(id, &new_hash).await?;
    ctx.auth_service.invalidate_sessions_for(id).await?;
    Ok(StatusCode::OK)
}
