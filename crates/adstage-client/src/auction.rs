//! Auction primitives and their readiness handshake.
//!
//! The orchestrator never runs an auction itself; it asks an
//! [`AuctionPrimitive`] for the bids of one ad unit. The primitive may
//! show up late (in the browser it is a third-party script that loads
//! after the page), so it is delivered through an [`AuctionLoader`] /
//! [`AuctionReadiness`] pair created by [`auction_channel`].
//!
//! Implementations shipped here:
//!
//! - [`SyntheticAuction`] -- random bids from every registered bidder
//!   after a random latency, for demos and local development
//! - [`StandbyAuction`] -- answers immediately with no bids; installed
//!   when the real primitive never arrives

use std::sync::Arc;
use std::time::Duration;

use adstage_creative::{CURRENCY, CreativeRenderer, random_cpm};
use adstage_types::{AdUnit, BidResult};
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use rand::Rng;
use tokio::sync::watch;
use tokio::time::{Instant, timeout_at};

/// A source of bids for header-bidding ad units.
///
/// `request_bids` returns every bid the primitive collected for `unit`;
/// winner selection is the orchestrator's job.
pub trait AuctionPrimitive: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Collect bids for one ad unit.
    fn request_bids<'a>(&'a self, unit: &'a AdUnit) -> BoxFuture<'a, Vec<BidResult>>;
}

/// Shared handle to an installed primitive.
pub type SharedAuction = Arc<dyn AuctionPrimitive>;

/// Create a connected loader/readiness pair.
pub fn auction_channel() -> (AuctionLoader, AuctionReadiness) {
    let (tx, rx) = watch::channel(None);
    (AuctionLoader { tx }, AuctionReadiness { rx })
}

/// Producer side: hands the primitive over once it is available.
///
/// Dropping the loader without calling [`AuctionLoader::provide`] tells the
/// readiness side that the primitive will never arrive.
#[derive(Debug)]
pub struct AuctionLoader {
    tx: watch::Sender<Option<SharedAuction>>,
}

impl AuctionLoader {
    /// Install the primitive and wake every waiter.
    pub fn provide(self, primitive: SharedAuction) {
        tracing::debug!(auction = primitive.name(), "auction primitive provided");
        self.tx.send_replace(Some(primitive));
    }
}

/// Consumer side: resolves to the primitive, bounded by a deadline.
#[derive(Debug, Clone)]
pub struct AuctionReadiness {
    rx: watch::Receiver<Option<SharedAuction>>,
}

impl AuctionReadiness {
    /// Readiness that is already resolved to `primitive`.
    pub fn resolved(primitive: SharedAuction) -> Self {
        let (_, rx) = watch::channel(Some(primitive));
        Self { rx }
    }

    /// Wait until the primitive is provided or `deadline` passes.
    ///
    /// Returns `None` on deadline or when the loader was dropped first.
    pub async fn wait_until(&self, deadline: Instant) -> Option<SharedAuction> {
        let mut rx = self.rx.clone();
        match timeout_at(deadline, rx.wait_for(Option::is_some)).await {
            Ok(Ok(current)) => current.as_ref().map(Arc::clone),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

impl core::fmt::Debug for dyn AuctionPrimitive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuctionPrimitive")
            .field("name", &self.name())
            .finish()
    }
}

/// No-op stand-in: every request resolves at once with no bids.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandbyAuction;

impl AuctionPrimitive for StandbyAuction {
    fn name(&self) -> &str {
        "standby"
    }

    fn request_bids<'a>(&'a self, _unit: &'a AdUnit) -> BoxFuture<'a, Vec<BidResult>> {
        futures::future::ready(Vec::new()).boxed()
    }
}

/// Tuning knobs for [`SyntheticAuction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticAuctionSettings {
    /// Probability in `[0, 1]` that a bidder answers with a bid.
    pub fill_rate: f64,
    /// Fastest bidder response.
    pub min_latency: Duration,
    /// Slowest bidder response.
    pub max_latency: Duration,
}

impl Default for SyntheticAuctionSettings {
    fn default() -> Self {
        Self {
            fill_rate: 0.8,
            min_latency: Duration::from_millis(100),
            max_latency: Duration::from_millis(900),
        }
    }
}

/// One bidder's pre-drawn answer.
struct BidPlan {
    delay: Duration,
    bid: Option<BidResult>,
}

/// Simulated auction: each registered bidder answers after a random
/// latency with a random CPM, or not at all.
#[derive(Debug, Clone)]
pub struct SyntheticAuction {
    creative: CreativeRenderer,
    settings: SyntheticAuctionSettings,
}

impl SyntheticAuction {
    /// Create an auction with default settings.
    pub fn new(creative: CreativeRenderer) -> Self {
        Self::with_settings(creative, SyntheticAuctionSettings::default())
    }

    /// Create an auction with explicit settings.
    pub const fn with_settings(creative: CreativeRenderer, settings: SyntheticAuctionSettings) -> Self {
        Self { creative, settings }
    }

    fn plan(&self, unit: &AdUnit) -> Vec<BidPlan> {
        let mut rng = rand::rng();
        let fill_rate = if self.settings.fill_rate.is_nan() {
            0.0
        } else {
            self.settings.fill_rate.clamp(0.0, 1.0)
        };
        let (min, max) = ordered(self.settings.min_latency, self.settings.max_latency);

        unit.bidders
            .iter()
            .map(|bidder| {
                let delay = if min == max { min } else { rng.random_range(min..=max) };
                let bid = rng.random_bool(fill_rate).then(|| {
                    let cpm = random_cpm(&mut rng);
                    let creative_markup = self
                        .creative
                        .render_bid(&unit.code, &bidder.bidder, cpm, &unit.sizes)
                        .unwrap_or_else(|_| self.creative.bid_fallback(&unit.code));
                    BidResult {
                        ad_unit_code: unit.code.clone(),
                        bidder_id: bidder.bidder.clone(),
                        cpm,
                        currency: CURRENCY.to_owned(),
                        creative_markup,
                    }
                });
                BidPlan { delay, bid }
            })
            .collect()
    }
}

impl AuctionPrimitive for SyntheticAuction {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn request_bids<'a>(&'a self, unit: &'a AdUnit) -> BoxFuture<'a, Vec<BidResult>> {
        // Draw everything up front; the thread RNG must not live across an await.
        let plans = self.plan(unit);
        async move {
            let answers = join_all(plans.into_iter().map(|plan| async move {
                tokio::time::sleep(plan.delay).await;
                plan.bid
            }))
            .await;
            answers.into_iter().flatten().collect()
        }
        .boxed()
    }
}

fn ordered(a: Duration, b: Duration) -> (Duration, Duration) {
    if a <= b { (a, b) } else { (b, a) }
}
