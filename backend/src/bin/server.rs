//! EVV HTTP Server Binary
//!
//! This is the main entry point for the EVV REST API server.
//! It loads configuration, builds the repositories and services, sets up the
//! HTTP router and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin evv-server
//!
//! # With an explicit configuration file
//! EVV_CONFIG=/etc/evv/evv.toml cargo run --bin evv-server
//! ```
//!
//! # Environment Variables
//!
//! - `EVV_CONFIG`: Path to a TOML configuration file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `EVV_USE_FALLBACK`: Serve demonstration data when the store fails
//! - `RUST_LOG`: Log filter (default: info)

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use evv_backend::config::AppConfig;
use evv_backend::db::RepositoryFactory;
use evv_backend::http::{create_router, AppState};
use evv_backend::services::Services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting EVV HTTP Server");

    let config = AppConfig::load().context("failed to load configuration")?;
    let repositories = RepositoryFactory::from_settings(&config.repository)
        .context("failed to initialize repositories")?;
    info!(
        "Repository initialized ({}), fallback data {}",
        config.repository.repo_type,
        if config.services.use_fallback_on_error {
            "enabled"
        } else {
            "disabled"
        }
    );

    let services = Services::new(&repositories, &config.services);
    let app = create_router(AppState::new(services), config.server.request_timeout());

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/v1/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
