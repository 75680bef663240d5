//! Entry point for the Adstage API server.
//!
//! Loads configuration, builds the shared state, and serves the API and
//! the front end until `Ctrl-C`.

use std::sync::Arc;

use adstage_server::{AppState, ServerConfig, start_server};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, state construction or the server
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("adstage-server starting");

    let config = ServerConfig::load().context("loading server configuration")?;
    info!(
        host = config.host,
        port = config.port,
        static_dir = %config.static_dir.display(),
        slots = config.slots.len(),
        latency_min_ms = config.latency.min_ms,
        latency_max_ms = config.latency.max_ms,
        openai_model = config.openai.model,
        openai_key_configured = config.openai.api_key().is_some(),
        "configuration loaded"
    );

    let state = AppState::from_config(&config).context("building application state")?;
    start_server(&config, Arc::new(state)).await?;

    info!("adstage-server shut down cleanly");
    Ok(())
}

/// Structured logging; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
