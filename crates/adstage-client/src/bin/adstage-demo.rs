//! Command-line demo of the ad clients.
//!
//! Renders every built-in header-bidding unit and standalone slot once
//! against the configured backend, logs what landed on each surface, and
//! (when arguments are given) sends them as a prompt to the proxy.
//!
//! ```text
//! AD_SERVER_URL=http://localhost:3000 adstage-demo "What is header bidding?"
//! ```
//!
//! The auction primitive is provided shortly after startup, the way a
//! third-party script would finish loading after the page.

use std::sync::Arc;
use std::time::Duration;

use adstage_client::{
    AdContext, AdRenderOutcome, ClientConfig, SharedAuction, SyntheticAuction, auction_channel,
};
use adstage_creative::CreativeRenderer;
use adstage_types::DEFAULT_MAX_TOKENS;
use anyhow::Context;
use futures::future::join_all;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Simulated load time of the auction primitive.
const AUCTION_LOAD_DELAY: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("adstage-demo starting");

    let config = ClientConfig::from_env().context("loading client configuration")?;
    info!(
        ad_server = config.ad_server_url,
        bid_timeout_ms = config.bid_timeout.as_millis(),
        ready_timeout_ms = config.auction_ready_timeout.as_millis(),
        "configuration loaded"
    );

    let (loader, readiness) = auction_channel();
    let creative = CreativeRenderer::new().context("compiling creative templates")?;
    tokio::spawn(async move {
        tokio::time::sleep(AUCTION_LOAD_DELAY).await;
        loader.provide(Arc::new(SyntheticAuction::new(creative)) as SharedAuction);
    });

    let owned = AdContext::new(config, readiness).context("building ad context")?;
    let ctx = &owned;

    let bidding = ctx.orchestrator().ad_units().map(|unit| {
        let surface = ctx.surface(&unit.code);
        async move {
            let outcome = ctx.orchestrator().render(&unit.code, &surface).await;
            match outcome.winner() {
                Some(bid) => info!(slot = %unit.code, bidder = %bid.bidder_id, cpm = %bid.cpm, "header-bidding slot filled"),
                None => info!(slot = %unit.code, "header-bidding slot showing fallback"),
            }
        }
    });

    let standalone = ctx.ad_server().slots().map(|slot| {
        let surface = ctx.surface(&slot.code);
        async move {
            match ctx.ad_server().render(&slot.code, &surface).await {
                Ok(outcome) => info!(slot = %slot.code, outcome = outcome_label(&outcome), bytes = surface.markup().len(), "standalone slot rendered"),
                Err(e) => warn!(slot = %slot.code, error = %e, "standalone slot failed"),
            }
        }
    });

    futures::join!(join_all(bidding), join_all(standalone));

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !prompt.trim().is_empty() {
        match ctx.prompt().ask(&prompt, DEFAULT_MAX_TOKENS).await {
            Ok(answer) => println!("{answer}"),
            Err(e) => warn!(error = %e, "prompt failed"),
        }
    }

    ctx.shutdown();
    Ok(())
}

const fn outcome_label(outcome: &AdRenderOutcome) -> &'static str {
    match outcome {
        AdRenderOutcome::Served { .. } => "served",
        AdRenderOutcome::Synthesized { .. } => "synthesized",
        AdRenderOutcome::NoAd { .. } => "no_ad",
    }
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
