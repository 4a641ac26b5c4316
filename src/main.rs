use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod config;
mod database;
mod dtos;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use database::connection::get_db_client;
use database::{MongoPublicationStore, MongoUserStore};
use services::email_service::sender_from_config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let email_sender = sender_from_config(&config).context("failed to configure email")?;
    let db = get_db_client(&config)
        .await
        .context("failed to connect to MongoDB")?;

    let users = Arc::new(MongoUserStore::new(db.clone()));
    let publications = Arc::new(MongoPublicationStore::new(&db));
    let bind_address = config.bind_address();

    let app_state = AppState::new(config, users, publications, email_sender);
    app_state
        .uploads
        .ensure_root()
        .await
        .context("failed to create upload directory")?;

    let app = routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!("🚀 Server running on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
