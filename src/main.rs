use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ctfboard::{
    api,
    config::Settings,
    notify::{email::EmailNotifier, NotifierManager},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctfboard=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting ctfboard server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let notifier_manager = Arc::new(NotifierManager::new());
    if settings.email.enabled {
        match EmailNotifier::new(&settings.email) {
            Some(email) => notifier_manager.register(Arc::new(email)).await,
            None => tracing::warn!("Email enabled but SMTP configuration is incomplete"),
        }
    } else {
        tracing::info!("Email notifications disabled");
    }

    let service_context = Arc::new(ServiceContext::new(db_pool, notifier_manager));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
