//! Application context owning every client.
//!
//! One [`AdContext`] is built at startup and shared by reference (or in an
//! `Arc`) with everything that renders ads. It owns the HTTP connection
//! pool, the clients, and the surfaces handed out for rendering.
//! [`AdContext::shutdown`] detaches all surfaces so in-flight renders
//! finish without writing.

use std::sync::{Mutex, PoisonError};

use adstage_creative::CreativeRenderer;
use adstage_types::catalog::{header_bidding_units, standalone_slots};
use adstage_types::{AdSlot, AdUnit};
use tracing::info;

use crate::ad_server::AdServerClient;
use crate::auction::AuctionReadiness;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::orchestrator::{BiddingOrchestrator, OrchestratorTimings};
use crate::prompt::PromptProxyClient;
use crate::search::AcademicSearch;
use crate::surface::Surface;

/// Shared handle to the configured clients.
#[derive(Debug)]
pub struct AdContext {
    config: ClientConfig,
    ad_server: AdServerClient,
    orchestrator: BiddingOrchestrator,
    prompt: PromptProxyClient,
    search: AcademicSearch,
    surfaces: Mutex<Vec<Surface>>,
}

impl AdContext {
    /// Build the context with the built-in slot catalogs.
    pub fn new(config: ClientConfig, readiness: AuctionReadiness) -> Result<Self, ClientError> {
        Self::with_catalogs(config, readiness, standalone_slots(), header_bidding_units())
    }

    /// Build the context with explicit slot catalogs.
    pub fn with_catalogs(
        config: ClientConfig,
        readiness: AuctionReadiness,
        slots: Vec<AdSlot>,
        units: Vec<AdUnit>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::Settings(format!("http client: {e}")))?;
        let creative = CreativeRenderer::new()
            .map_err(|e| ClientError::Settings(format!("creative templates: {e}")))?;

        let timings = OrchestratorTimings {
            bid_timeout: config.bid_timeout,
            ready_timeout: config.auction_ready_timeout,
        };

        let ad_server = AdServerClient::new(http.clone(), &config, slots, creative.clone());
        let orchestrator = BiddingOrchestrator::new(units, readiness, creative, timings);
        let prompt = PromptProxyClient::new(http, &config);
        let search = AcademicSearch::new(prompt.clone());

        info!(ad_server = config.ad_server_url, "ad context ready");
        Ok(Self {
            config,
            ad_server,
            orchestrator,
            prompt,
            search,
            surfaces: Mutex::new(Vec::new()),
        })
    }

    /// Active configuration.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Standalone ad server client.
    pub const fn ad_server(&self) -> &AdServerClient {
        &self.ad_server
    }

    /// Header-bidding orchestrator.
    pub const fn orchestrator(&self) -> &BiddingOrchestrator {
        &self.orchestrator
    }

    /// Prompt proxy client.
    pub const fn prompt(&self) -> &PromptProxyClient {
        &self.prompt
    }

    /// Academic search over the prompt proxy.
    pub const fn search(&self) -> &AcademicSearch {
        &self.search
    }

    /// Create a surface tracked by this context.
    ///
    /// Surfaces detached since the last call are forgotten.
    pub fn surface(&self, id: &str) -> Surface {
        let surface = Surface::new(id);
        let mut surfaces = self.surfaces.lock().unwrap_or_else(PoisonError::into_inner);
        surfaces.retain(Surface::is_attached);
        surfaces.push(surface.clone());
        surface
    }

    /// Number of tracked surfaces.
    pub fn tracked_surfaces(&self) -> usize {
        self.surfaces.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Detach every tracked surface and forget them.
    ///
    /// Returns how many surfaces were still attached.
    pub fn shutdown(&self) -> usize {
        let surfaces = std::mem::take(
            &mut *self.surfaces.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let attached = surfaces.iter().filter(|s| s.is_attached()).count();
        for surface in &surfaces {
            surface.detach();
        }
        info!(surfaces = attached, "ad context shut down");
        attached
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auction::StandbyAuction;

    fn context() -> Option<AdContext> {
        AdContext::new(
            ClientConfig::for_backend("http://127.0.0.1:9"),
            AuctionReadiness::resolved(Arc::new(StandbyAuction)),
        )
        .ok()
    }

    #[test]
    fn registers_builtin_catalogs() {
        let ctx = context();
        assert!(ctx.as_ref().is_some_and(|c| c.ad_server().slot("standalone-ad-1").is_some()));
        assert!(
            ctx.as_ref()
                .is_some_and(|c| c.orchestrator().ad_unit("div-gpt-ad-1234567890-0").is_some())
        );
    }

    #[test]
    fn context_builds() {
        assert!(context().is_some());
    }

    #[tokio::test]
    async fn search_rejects_blank_query() {
        let ctx = context();
        assert!(ctx.is_some());
        let Some(ctx) = ctx else { return };
        let result = ctx.search().search(" ").await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn shutdown_detaches_surfaces() {
        let ctx = context();
        assert!(ctx.is_some());
        let Some(ctx) = ctx else { return };
        let a = ctx.surface("a");
        let b = ctx.surface("b");
        b.detach();
        assert_eq!(ctx.shutdown(), 1);
        assert!(!a.is_attached());
        assert_eq!(ctx.shutdown(), 0);
    }

    #[test]
    fn detached_surfaces_are_released() {
        let ctx = context();
        assert!(ctx.is_some());
        let Some(ctx) = ctx else { return };
        for _ in 0..10_000 {
            ctx.surface("standalone-ad-1").detach();
        }
        let live = ctx.surface("standalone-ad-1");
        assert_eq!(ctx.tracked_surfaces(), 1);
        assert_eq!(ctx.shutdown(), 1);
        assert!(!live.is_attached());
    }
}
