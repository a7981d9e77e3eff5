mod config;
mod error;
mod gemini;
mod manual;
mod models;
mod orchestrator;
mod prompt;
mod routes;

use anyhow::Context;
use routes::AppState;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::orchestrator::{Orchestrator, StageTimeouts};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("loading configuration")?;
    tracing::info!("Gemini API key loaded");
    tracing::info!(
        text_model = %config.gemini.text_model,
        image_model = %config.gemini.image_model,
        "Gemini models configured"
    );

    let gemini = Arc::new(GeminiClient::new(config.gemini.clone()));
    let orchestrator = Orchestrator::new(gemini.clone(), gemini, manual::FASHION_MANUAL)
        .with_timeouts(StageTimeouts {
            text: config.text_timeout,
            image: config.image_timeout,
        });
    let app = routes::router(AppState { orchestrator });

    let addr = SocketAddr::from(([0,0,0,0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
