pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .nest("/auth", auth_routes(app_state.clone()))
        .nest("/api", api_routes(app_state.clone()))
        .nest("/review", review_routes(app_state.clone()))
        .nest("/admin", admin_routes(app_state.clone()))
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/password", put(handlers::auth::change_password))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ));

    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/register", post(handlers::auth::register))
        .merge(protected)
}

fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/leaderboard/me", get(handlers::leaderboard::my_score))
        .route("/events", get(handlers::events::list_active))
        .route("/events/:id", get(handlers::events::get))
        .route(
            "/events/:id/challenges",
            get(handlers::events::list_challenges),
        )
        .route("/submissions", post(handlers::submissions::create))
        .route("/submissions", get(handlers::submissions::list_mine))
        .route("/submissions/:id", get(handlers::submissions::get))
        .route(
            "/submissions/:id/resubmit",
            post(handlers::submissions::resubmit),
        )
        .route(
            "/submissions/:id",
            delete(handlers::submissions::soft_delete),
        )
        .route("/notifications", get(handlers::notifications::inbox))
        .route(
            "/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notifications::mark_all_read),
        )
        .route("/notifications/:id", get(handlers::notifications::open))
        .route(
            "/notifications/:id",
            delete(handlers::notifications::soft_delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ));

    // The leaderboard itself is the team's public face.
    Router::new()
        .route("/leaderboard", get(handlers::leaderboard::overview))
        .route(
            "/leaderboard/count",
            get(handlers::leaderboard::count_overview),
        )
        .merge(protected)
}

fn review_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/queue", get(handlers::review::queue))
        .route(
            "/items/:id/approve",
            post(handlers::review::toggle_approve),
        )
        .route("/items/:id/revoke", post(handlers::review::toggle_revoke))
        .route(
            "/submissions/:id/approve-all",
            post(handlers::review::approve_all),
        )
        .route(
            "/events/:id/approve-all",
            post(handlers::review::approve_all_for_event),
        )
        .route("/submissions/:id/reject", post(handlers::review::reject))
        .route(
            "/submissions/:id/unreject",
            post(handlers::review::unreject),
        )
        .route(
            "/submissions/:id/manual-points",
            put(handlers::review::set_manual_points),
        )
        .route(
            "/submissions/:id/restore",
            post(handlers::submissions::restore),
        )
        .route("/adjustments", get(handlers::adjustments::list))
        .route("/adjustments", post(handlers::adjustments::create))
        .route(
            "/adjustments/:id",
            delete(handlers::adjustments::soft_delete),
        )
        .route(
            "/adjustments/:id/restore",
            post(handlers::adjustments::restore),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_reviewer,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::users::list))
        .route("/users", post(handlers::users::create))
        .route("/users/:id", get(handlers::users::get))
        .route("/users/:id", put(handlers::users::update))
        .route("/users/:id", delete(handlers::users::soft_delete))
        .route("/users/:id/restore", post(handlers::users::restore))
        .route("/users/:id/purge", delete(handlers::users::purge))
        .route("/users/:id/password", put(handlers::users::reset_password))
        .route("/events", get(handlers::events::list))
        .route("/events", post(handlers::events::create))
        .route("/events/:id", put(handlers::events::update))
        .route("/events/:id", delete(handlers::events::soft_delete))
        .route("/events/:id/restore", post(handlers::events::restore))
        .route("/events/:id/purge", delete(handlers::events::purge))
        .route(
            "/events/:id/challenges",
            post(handlers::events::create_challenge),
        )
        .route("/challenges/:id", put(handlers::events::update_challenge))
        .route(
            "/challenges/:id",
            delete(handlers::events::soft_delete_challenge),
        )
        .route(
            "/challenges/:id/restore",
            post(handlers::events::restore_challenge),
        )
        .route(
            "/challenges/:id/purge",
            delete(handlers::events::purge_challenge),
        )
        .route("/broadcasts", post(handlers::notifications::broadcast))
        .route(
            "/broadcasts/:batch_id",
            delete(handlers::notifications::recall_broadcast),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
