//! Backend API server for the Adstage ad demo stack.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Standalone ad server** (`POST /api/ads`, `GET /api/ads/config`):
//!   mock creatives with synthetic latency, plus the slot catalog
//! - **Prompt proxy** (`POST /api/openai`): forwards prompts to an
//!   `OpenAI`-compatible chat completions API, keeping the key server-side
//! - **SSP demo** (`GET /ssp-demo`): a static creative with request-id echo
//! - **Front end**: static files from the `dist` directory with an
//!   `index.html` fallback
//!
//! # Architecture
//!
//! The server is stateless. Every handler reads the shared, immutable
//! [`AppState`] built from [`ServerConfig`] at startup; errors leave the
//! handlers as [`ApiError`] and become JSON [`ErrorBody`] responses.
//!
//! [`ErrorBody`]: adstage_types::ErrorBody

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod upstream;

// Re-export primary types for convenience.
pub use crate::config::{ConfigError, ServerConfig};
pub use crate::error::ApiError;
pub use crate::router::build_router;
pub use crate::server::{ServerError, start_server};
pub use crate::state::{AppState, StateError};
