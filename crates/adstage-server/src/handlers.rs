//! REST endpoint handlers for the API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/ads` | Mock creative for one slot, after synthetic latency |
//! | `GET` | `/api/ads/config` | Slot catalog |
//! | `POST` | `/api/openai` | Prompt proxy to the completion provider |
//! | `GET` | `/ssp-demo` | Static SSP demo creative |
//! | `GET` | `/health` | Liveness check |

use std::sync::Arc;
use std::time::Duration;

use adstage_types::{
    AdRequest, AdResponse, AdSlot, AdType, CatalogResponse, PromptRequest, PromptResponse,
    SlotCatalogEntry, SspDemoResponse,
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::error::{ApiError, MISSING_KEY_MESSAGE};
use crate::state::AppState;

/// Slot code reported by the SSP demo endpoint.
pub const SSP_DEMO_SLOT: &str = "ssp-demo";

/// Fixed price of the SSP demo creative.
pub const SSP_DEMO_CPM: Decimal = Decimal::from_parts(250, 0, 0, false, 2);

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /ssp-demo`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SspDemoQuery {
    /// Caller-supplied request id.
    pub request_id: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /api/ads
// ---------------------------------------------------------------------------

/// Serve a mock creative for one slot.
///
/// The ad type comes from the catalog entry for the code, banner when the
/// code is not in the catalog. The response is delayed by a random
/// latency drawn from the configured range.
pub async fn request_ad(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AdRequest>, JsonRejection>,
) -> Result<Json<AdResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let delay = Duration::from_millis(rand::rng().random_range(state.latency.range_ms()));
    debug!(slot = %request.ad_unit_code, delay_ms = delay.as_millis(), "ad request received");
    tokio::time::sleep(delay).await;

    let catalog = state.slot(&request.ad_unit_code);
    let slot = AdSlot {
        ad_type: catalog.map_or(AdType::Banner, |s| s.ad_type),
        title: catalog.and_then(|s| s.title.clone()),
        code: request.ad_unit_code,
        sizes: request.sizes,
    };

    let response = state.creative.generate_mock_ad(&slot, &mut rand::rng());
    info!(
        slot = %response.ad_unit_code,
        ad_type = response.ad_type.as_str(),
        cpm = %response.cpm,
        page = request.targeting.page.as_deref().unwrap_or("-"),
        "mock ad served"
    );
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// GET /api/ads/config
// ---------------------------------------------------------------------------

/// Return the slot catalog.
pub async fn ads_config(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        success: true,
        ad_units: state.slots.iter().map(SlotCatalogEntry::from).collect(),
    })
}

// ---------------------------------------------------------------------------
// POST /api/openai
// ---------------------------------------------------------------------------

/// Forward a prompt to the completion provider.
///
/// The key check runs before the body is looked at, so a server without
/// a key answers every call with the configuration error.
pub async fn prompt(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    let Some(upstream) = state.upstream.as_ref() else {
        warn!("prompt received but no OpenAI API key is configured");
        return Err(ApiError::Config(MISSING_KEY_MESSAGE.to_owned()));
    };

    let Json(request) = body?;
    request.validate()?;

    debug!(model = upstream.model(), max_tokens = request.max_tokens, "forwarding prompt");
    let completion = upstream
        .complete(request.prompt.trim(), request.max_tokens)
        .await
        .map_err(|e| {
            warn!(error = %e, "completion request failed");
            ApiError::Upstream(e.to_string())
        })?;

    info!(model = upstream.model(), chars = completion.text.len(), "prompt answered");
    Ok(Json(PromptResponse {
        success: true,
        response: completion.text,
        usage: completion.usage,
    }))
}

// ---------------------------------------------------------------------------
// GET /ssp-demo
// ---------------------------------------------------------------------------

/// Return the static SSP demo creative.
///
/// Echoes the `x-request-id` header, then the `requestId` query
/// parameter, and generates a UUID v4 when neither is present.
pub async fn ssp_demo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SspDemoQuery>,
) -> Json<SspDemoResponse> {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| query.request_id.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    Json(SspDemoResponse {
        ad_html: state.creative.ssp_demo(&request_id),
        request_id,
        ad_unit_code: SSP_DEMO_SLOT.to_owned(),
        cpm: SSP_DEMO_CPM,
        currency: adstage_creative::CURRENCY.to_owned(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// JSON 404 for unknown API paths, which must not fall through to the
/// front end.
pub async fn api_not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("no API route for {}", uri.path()))
}
