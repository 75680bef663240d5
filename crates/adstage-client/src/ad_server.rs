//! Client for the standalone ad server.
//!
//! One `POST /api/ads` per call, no retries. Any transport failure
//! (network error, non-2xx status, undecodable body) is absorbed: the
//! client synthesizes an [`AdResponse`] of the same shape locally, so
//! callers never need a failure branch for a registered slot.

use std::collections::BTreeMap;

use adstage_creative::CreativeRenderer;
use adstage_types::{AdRequest, AdResponse, AdSlot, CatalogResponse, Targeting};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::surface::{Surface, WriteStatus};

/// Where a delivered [`AdResponse`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdOrigin {
    /// Decoded from the backend's answer.
    Remote,
    /// Generated locally after the backend request failed.
    Synthesized,
}

/// An ad response together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The response to render.
    pub response: AdResponse,
    /// Where the response came from.
    pub origin: AdOrigin,
}

/// What a render cycle put on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdRenderOutcome {
    /// The backend's creative was written.
    Served {
        /// The backend's response.
        response: AdResponse,
        /// Whether the write reached the surface.
        write: WriteStatus,
    },
    /// The backend was unreachable; a locally generated creative was written.
    Synthesized {
        /// The local response.
        response: AdResponse,
        /// Whether the write reached the surface.
        write: WriteStatus,
    },
    /// The backend had nothing to serve; the "no ad" placeholder was written.
    NoAd {
        /// Whether the write reached the surface.
        write: WriteStatus,
    },
}

impl AdRenderOutcome {
    /// Status of the surface write.
    pub const fn write_status(&self) -> WriteStatus {
        match self {
            Self::Served { write, .. } | Self::Synthesized { write, .. } | Self::NoAd { write } => {
                *write
            }
        }
    }
}

/// Client for `POST /api/ads` with local fallback.
#[derive(Debug, Clone)]
pub struct AdServerClient {
    http: reqwest::Client,
    ads_url: String,
    catalog_url: String,
    slots: BTreeMap<String, AdSlot>,
    page_path: String,
    publisher_id: Option<String>,
    creative: CreativeRenderer,
}

impl AdServerClient {
    /// Create a client for the backend named in `config` serving `slots`.
    pub fn new(
        http: reqwest::Client,
        config: &ClientConfig,
        slots: Vec<AdSlot>,
        creative: CreativeRenderer,
    ) -> Self {
        let slots: BTreeMap<_, _> = slots.into_iter().map(|s| (s.code.clone(), s)).collect();
        info!(
            ad_server = config.ad_server_url,
            ad_units = slots.len(),
            "standalone ad server client initialized"
        );
        Self {
            http,
            ads_url: config.endpoint("/api/ads"),
            catalog_url: config.endpoint("/api/ads/config"),
            slots,
            page_path: config.page_path.clone(),
            publisher_id: config.publisher_id.clone(),
            creative,
        }
    }

    /// Registered slot for a code.
    pub fn slot(&self, code: &str) -> Option<&AdSlot> {
        self.slots.get(code)
    }

    /// All registered slots, ordered by code.
    pub fn slots(&self) -> impl Iterator<Item = &AdSlot> {
        self.slots.values()
    }

    /// Request one creative for a registered slot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownSlot`] if `code` is not registered.
    /// Transport failures never surface; see the module docs.
    pub async fn request_ad(&self, code: &str) -> Result<AdResponse, ClientError> {
        self.request_ad_traced(code).await.map(|d| d.response)
    }

    /// Like [`AdServerClient::request_ad`], also reporting the origin.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownSlot`] if `code` is not registered.
    pub async fn request_ad_traced(&self, code: &str) -> Result<Delivery, ClientError> {
        let slot = self
            .slot(code)
            .ok_or_else(|| ClientError::UnknownSlot(code.to_owned()))?;

        match self.fetch(slot).await {
            Ok(response) => {
                debug!(slot = code, cpm = %response.cpm, "ad server responded");
                Ok(Delivery {
                    response,
                    origin: AdOrigin::Remote,
                })
            }
            Err(e) => {
                warn!(slot = code, error = %e, "ad server request failed, synthesizing creative");
                let response = self.creative.generate_mock_ad(slot, &mut rand::rng());
                Ok(Delivery {
                    response,
                    origin: AdOrigin::Synthesized,
                })
            }
        }
    }

    /// Request a creative and write it into `surface`.
    ///
    /// Writes the creative when the response reports success, otherwise
    /// the "no ad available" placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownSlot`] if `code` is not registered;
    /// the surface is left untouched in that case.
    pub async fn render(&self, code: &str, surface: &Surface) -> Result<AdRenderOutcome, ClientError> {
        let ticket = surface.claim();
        let Delivery { response, origin } = self.request_ad_traced(code).await?;

        if !response.success || response.ad_html.trim().is_empty() {
            let write = surface.write(ticket, &self.creative.no_ad(code));
            info!(slot = code, write = ?write, "no ad available");
            return Ok(AdRenderOutcome::NoAd { write });
        }

        let write = surface.write(ticket, &response.ad_html);
        info!(slot = code, cpm = %response.cpm, origin = ?origin, write = ?write, "rendered standalone ad");
        Ok(match origin {
            AdOrigin::Remote => AdRenderOutcome::Served { response, write },
            AdOrigin::Synthesized => AdRenderOutcome::Synthesized { response, write },
        })
    }

    /// Read the backend's slot catalog from `GET /api/ads/config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the request fails or the body
    /// does not decode.
    pub async fn fetch_catalog(&self) -> Result<Vec<AdSlot>, ClientError> {
        let response = self
            .http
            .get(&self.catalog_url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("catalog request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!("catalog request returned {status}")));
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("catalog decode failed: {e}")))?;

        Ok(catalog.ad_units.into_iter().map(AdSlot::from).collect())
    }

    /// One attempt against the backend.
    async fn fetch(&self, slot: &AdSlot) -> Result<AdResponse, ClientError> {
        let body = AdRequest {
            ad_unit_code: slot.code.clone(),
            sizes: slot.sizes.clone(),
            targeting: Targeting {
                page: Some(self.page_path.clone()),
                timestamp: Some(chrono::Utc::now().timestamp_millis()),
                publisher_id: self.publisher_id.clone(),
            },
        };

        let response = self
            .http
            .post(&self.ads_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("ad request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!("ad server returned {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("ad response decode failed: {e}")))
    }
}
