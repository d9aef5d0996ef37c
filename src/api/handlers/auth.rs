use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{CreateUserRequest, Role, TeamType, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let ctx = &state.service_context;

    let password_hash = ctx
        .user_repo
        .password_hash_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&req.password, &password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let user = ctx
        .user_repo
        .find_by_username(&req.username)
        .await?
        .filter(|u| u.is_active && !u.lifecycle.is_deleted())
        .ok_or(AppError::Unauthorized)?;

    let (_session, token) = ctx
        .auth_service
        .create_session(user.id, state.settings.auth.session_duration_hours)
        .await?;
    let cookie = ctx.auth_service.create_session_cookie(&token, false);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get("session") {
        let _ = state
            .service_context
            .auth_service
            .invalidate_session(session_cookie.value())
            .await;
    }

    Ok((jar.add(AuthService::create_logout_cookie()), StatusCode::OK))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// Self-service signup. New accounts always start as sub-team members;
/// roles and team assignments are admin decisions.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let ctx = &state.service_context;

    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("A username is required".to_string()));
    }
    if req.password.len() < state.settings.auth.min_password_length {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            state.settings.auth.min_password_length
        )));
    }
    if ctx.user_repo.find_by_username(username).await?.is_some() {
        return Err(AppError::Validation("Username is already taken".to_string()));
    }

    let password_hash = AuthService::hash_password(&req.password).await?;
    let user = ctx
        .user_repo
        .create(
            CreateUserRequest {
                username: username.to_string(),
                password: req.password,
                email: req.email,
                role: Role::Member,
                team_type: TeamType::Sub,
            },
            &password_hash,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Changing one's own password invalidates every other session.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    let ctx = &state.service_context;

    let password_hash = ctx
        .user_repo
        .password_hash_by_username(&current.user.username)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !AuthService::verify_password(&req.current_password, &password_hash).await? {
        return Err(AppError::Unauthorized);
    }
    if req.new_password.len() < state.settings.auth.min_password_length {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            state.settings.auth.min_password_length
        )));
    }

    let new_hash = AuthService::hash_password(&req.new_password).await?;
    ctx.user_repo
        .set_password_hash(current.user.id, &new_hash)
        .await?;
    ctx.auth_service
        .invalidate_sessions_for(current.user.id)
        .await?;

    Ok(StatusCode::OK)
}
