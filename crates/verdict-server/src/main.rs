mod dto;
mod error;
mod handlers;
mod router;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use verdict_config::ServerConfig;
use verdict_core::Classifier;

/// State shared by every request handler.
///
/// The model is loaded once before the listener binds and is read-only
/// afterwards.
pub struct ServerState {
    pub model: Arc<dyn Classifier>,
}

impl ServerState {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    let model = verdict_model::load_model(&config.model_path)
        .with_context(|| format!("failed to load model from {}", config.model_path.display()))?;

    let state = Arc::new(ServerState::new(model));
    let app = router::build(state);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
