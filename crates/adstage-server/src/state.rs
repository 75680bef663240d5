//! Shared application state for the API server.
//!
//! [`AppState`] is built once at startup and shared read-only by every
//! handler behind an `Arc`. Nothing in it is mutated after construction.

use std::path::PathBuf;

use adstage_creative::{CreativeError, CreativeRenderer};
use adstage_types::AdSlot;
use tracing::info;

use crate::config::{LatencyConfig, ServerConfig};
use crate::upstream::{OpenAiBackend, UpstreamError};

/// Errors that can occur while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The creative templates did not load.
    #[error(transparent)]
    Creative(#[from] CreativeError),

    /// The upstream client could not be built.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Read-only state shared by the handlers.
#[derive(Debug)]
pub struct AppState {
    /// Slot catalog, in configuration order.
    pub slots: Vec<AdSlot>,
    /// Synthetic latency of `POST /api/ads`.
    pub latency: LatencyConfig,
    /// Creative renderer.
    pub creative: CreativeRenderer,
    /// Completion provider; `None` when no API key is configured.
    pub upstream: Option<OpenAiBackend>,
    /// Directory holding the built front end.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the templates or the upstream client fail
    /// to initialize.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StateError> {
        let creative = match &config.templates_dir {
            Some(dir) => {
                info!(templates_dir = %dir.display(), "using creative template overrides");
                CreativeRenderer::from_dir(dir)
            }
            None => CreativeRenderer::new()?,
        };

        let upstream = config
            .openai
            .api_key()
            .map(|key| OpenAiBackend::new(&config.openai, key))
            .transpose()?;

        Ok(Self {
            slots: config.slots.clone(),
            latency: config.latency,
            creative,
            upstream,
            static_dir: config.static_dir.clone(),
        })
    }

    /// Slot registered under `code`.
    pub fn slot(&self, code: &str) -> Option<&AdSlot> {
        self.slots.iter().find(|s| s.code == code)
    }
}
