//! Forgeline API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use forgeline_core::AppError;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api_config::ApiConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = api_services::connect_and_migrate(&config.database_url).await?;
    if config.migrate_only {
        info!("migrations applied, exiting");
        return Ok(());
    }

    let state = api_services::build_state(pool);
    let router = api_router::build_router(state, &config.frontend_url)?;

    let address = config.socket_addr()?;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "forgeline api listening");
    axum::serve(listener, router)
        .await
        .map_err(|error| AppError::Internal(format!("server terminated: {error}")))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
