//! Axum router construction for the API server.
//!
//! Assembles all API routes into a single [`Router`] with CORS and HTTP
//! tracing enabled. Everything that is not an API route is served from
//! the static front-end directory, with `index.html` as the fallback so
//! client-side routes resolve.

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the API server.
///
/// The router includes:
/// - `POST /api/ads` -- mock creative for one slot
/// - `GET /api/ads/config` -- slot catalog
/// - `POST /api/openai` -- prompt proxy
/// - `GET /ssp-demo` -- static SSP demo creative
/// - `GET /health` -- liveness check
/// - `/api/*` -- JSON 404 for anything else under the API prefix
/// - everything else -- static files, `index.html` fallback
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = state.static_dir.join("index.html");
    let static_files = ServeDir::new(&state.static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/api/ads", post(handlers::request_ad))
        .route("/api/ads/config", get(handlers::ads_config))
        .route("/api/openai", post(handlers::prompt))
        .route("/api/{*rest}", any(handlers::api_not_found))
        .route("/ssp-demo", get(handlers::ssp_demo))
        .route("/health", get(handlers::health))
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
