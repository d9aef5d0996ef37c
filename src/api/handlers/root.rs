use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "ctfboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Team scoreboard and submission review for CTF events",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "leaderboard": "/api/leaderboard",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
