//! Integration tests for the header-bidding orchestrator.
//!
//! Time is paused in every test, so deadlines are exact and the tests
//! run instantly. Auctions are scripted primitives that answer with a
//! fixed set of bids after a fixed delay.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use adstage_client::{
    AuctionPrimitive, AuctionReadiness, BiddingOrchestrator, OrchestratorTimings, RenderOutcome,
    SharedAuction, Surface, WriteStatus, auction_channel,
};
use adstage_creative::CreativeRenderer;
use adstage_types::catalog::header_bidding_units;
use adstage_types::{AdUnit, BidResult};
use futures::FutureExt;
use futures::future::BoxFuture;
use rust_decimal::Decimal;
use tokio::time::Instant;

const SLOT: &str = "div-gpt-ad-1234567890-0";

struct ScriptedAuction {
    delay: Duration,
    bids: Vec<(&'static str, i64)>,
}

impl AuctionPrimitive for ScriptedAuction {
    fn name(&self) -> &str {
        "scripted"
    }

    fn request_bids<'a>(&'a self, unit: &'a AdUnit) -> BoxFuture<'a, Vec<BidResult>> {
        async move {
            tokio::time::sleep(self.delay).await;
            self.bids
                .iter()
                .map(|(bidder, cents)| BidResult {
                    ad_unit_code: unit.code.clone(),
                    bidder_id: (*bidder).to_owned(),
                    cpm: Decimal::new(*cents, 2),
                    currency: "USD".to_owned(),
                    creative_markup: format!("<div>{bidder} creative</div>"),
                })
                .collect()
        }
        .boxed()
    }
}

fn scripted(delay_ms: u64, bids: Vec<(&'static str, i64)>) -> SharedAuction {
    Arc::new(ScriptedAuction {
        delay: Duration::from_millis(delay_ms),
        bids,
    })
}

fn timings(bid_ms: u64, ready_ms: u64) -> OrchestratorTimings {
    OrchestratorTimings {
        bid_timeout: Duration::from_millis(bid_ms),
        ready_timeout: Duration::from_millis(ready_ms),
    }
}

fn orchestrator(readiness: AuctionReadiness, timings: OrchestratorTimings) -> BiddingOrchestrator {
    BiddingOrchestrator::new(
        header_bidding_units(),
        readiness,
        CreativeRenderer::new().unwrap(),
        timings,
    )
}

// ---------------------------------------------------------------------------
// Winner selection
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn higher_cpm_creative_is_rendered() {
    let readiness = AuctionReadiness::resolved(scripted(200, vec![("appnexus", 350), ("rubicon", 520)]));
    let orch = orchestrator(readiness, OrchestratorTimings::default());

    let surface = Surface::new(SLOT);
    let outcome = orch.render(SLOT, &surface).await;

    let winner = outcome.winner().unwrap();
    assert_eq!(winner.cpm, Decimal::new(520, 2));
    assert_eq!(winner.bidder_id, "rubicon");
    assert_eq!(surface.markup(), "<div>rubicon creative</div>");
}

#[tokio::test(start_paused = true)]
async fn no_bids_renders_fallback() {
    let readiness = AuctionReadiness::resolved(scripted(100, Vec::new()));
    let orch = orchestrator(readiness, OrchestratorTimings::default());

    let surface = Surface::new(SLOT);
    let outcome = orch.render(SLOT, &surface).await;

    assert!(matches!(outcome, RenderOutcome::Fallback { write: WriteStatus::Applied }));
    assert!(surface.markup().contains("Demo Advertisement"));
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn missing_primitive_resolves_within_bid_timeout() {
    let (loader, readiness) = auction_channel();
    let orch = orchestrator(readiness, timings(3000, 5000));

    let start = Instant::now();
    let winner = orch.request_bids(SLOT).await;

    assert!(winner.is_none());
    assert!(start.elapsed() <= Duration::from_millis(3000));
    drop(loader);
}

#[tokio::test(start_paused = true)]
async fn readiness_deadline_installs_standby() {
    let (loader, readiness) = auction_channel();
    let orch = orchestrator(readiness, timings(3000, 1000));

    let start = Instant::now();
    assert!(orch.request_bids(SLOT).await.is_none());
    assert!(start.elapsed() <= Duration::from_millis(1000));

    // Too late: the standby primitive stays installed.
    loader.provide(scripted(0, vec![("appnexus", 900)]));
    assert!(orch.request_bids(SLOT).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn late_loading_primitive_is_used() {
    let (loader, readiness) = auction_channel();
    let orch = orchestrator(readiness, timings(3000, 5000));
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(800)).await;
        loader.provide(scripted(300, vec![("appnexus", 410)]));
    });

    let winner = orch.request_bids(SLOT).await.unwrap();
    assert_eq!(winner.bidder_id, "appnexus");
}

#[tokio::test(start_paused = true)]
async fn late_bid_never_overwrites_fallback() {
    let readiness = AuctionReadiness::resolved(scripted(4000, vec![("appnexus", 500)]));
    let orch = orchestrator(readiness, timings(3000, 5000));

    let surface = Surface::new(SLOT);
    let outcome = orch.render(SLOT, &surface).await;
    assert!(matches!(outcome, RenderOutcome::Fallback { .. }));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(surface.write_count(), 1);
    assert!(surface.markup().contains("Demo Advertisement"));
}

// ---------------------------------------------------------------------------
// Registration and teardown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn unregistered_slot_resolves_immediately() {
    let readiness = AuctionReadiness::resolved(scripted(1000, vec![("appnexus", 500)]));
    let orch = orchestrator(readiness, OrchestratorTimings::default());

    let start = Instant::now();
    assert!(orch.request_bids("not-registered").await.is_none());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn detached_surface_discards_winner() {
    let readiness = AuctionReadiness::resolved(scripted(500, vec![("rubicon", 300)]));
    let orch = orchestrator(readiness, OrchestratorTimings::default());

    let surface = Surface::new(SLOT);
    let render = orch.render(SLOT, &surface);
    surface.detach();
    let outcome = render.await;

    assert!(outcome.winner().is_some());
    assert_eq!(outcome.write_status(), WriteStatus::Detached);
    assert!(surface.markup().is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_renders_keep_newest() {
    let readiness = AuctionReadiness::resolved(scripted(200, vec![("appnexus", 350)]));
    let orch = orchestrator(readiness, OrchestratorTimings::default());
    let surface = Surface::new(SLOT);

    let (first, second) = tokio::join!(orch.render(SLOT, &surface), orch.render(SLOT, &surface));

    assert!(first.write_status().is_applied() || second.write_status().is_applied());
    assert_eq!(surface.markup(), "<div>appnexus creative</div>");
}
