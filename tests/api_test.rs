use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use ctfboard::{
    api,
    auth::AuthService,
    config::Settings,
    domain::{CreateUserRequest, Role, TeamType},
    notify::NotifierManager,
    service::ServiceContext,
};
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn setup_app() -> anyhow::Result<(axum::Router, Arc<ServiceContext>)> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let ctx = Arc::new(ServiceContext::new(
        pool,
        Arc::new(NotifierManager::new()),
    ));
    let app = api::create_app(ctx.clone(), Arc::new(Settings::default()));
    Ok((app, ctx))
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let (app, _ctx) = setup_app().await?;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_login_flow_and_auth_gate() -> anyhow::Result<()> {
    let (app, ctx) = setup_app().await?;

    let hash = AuthService::hash_password("password123").await?;
    ctx.user_repo
        .create(
            CreateUserRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
                email: None,
                role: Role::Member,
                team_type: TeamType::Main,
            },
            &hash,
        )
        .await?;

    // No cookie: the member API is closed.
    let response = app
        .clone()
        .oneshot(Request::get("/api/submissions").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong password.
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"alice","password":"wrong"}"#,
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct login sets a session cookie.
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"alice","password":"password123"}"#,
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected a session cookie")
        .to_str()?
        .to_string();
    assert!(cookie.starts_with("session="));

    // With the cookie the member API opens up.
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/submissions")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // A plain member is rejected by the reviewer and admin surfaces.
    let response = app
        .clone()
        .oneshot(
            Request::get("/review/queue")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::get("/admin/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_public_leaderboard_needs_no_auth() -> anyhow::Result<()> {
    let (app, _ctx) = setup_app().await?;

    let response = app
        .oneshot(Request::get("/api/leaderboard").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
