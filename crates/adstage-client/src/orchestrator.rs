//! Header-bidding orchestration: bid request, deadline race, render.
//!
//! One cycle per call:
//! 1. Look the slot code up in the registration table
//! 2. Wait for the auction primitive (bounded by the readiness deadline)
//! 3. Ask the primitive for bids
//! 4. Pick the winner (highest CPM, ties to the first-registered bidder)
//! 5. Write the winner's creative, or the fallback creative, to the surface
//!
//! Steps 2 and 3 run under the bid timeout. When the deadline wins,
//! the auction future is dropped, so a late bid can never reach the
//! surface. An unavailable primitive, an auction that never answers and
//! an auction with no usable bid all end in the same fallback render.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use adstage_creative::CreativeRenderer;
use adstage_types::{AdUnit, BidResult};
use tokio::sync::OnceCell;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use crate::auction::{AuctionReadiness, SharedAuction, StandbyAuction};
use crate::config::{DEFAULT_AUCTION_READY_TIMEOUT, DEFAULT_BID_TIMEOUT};
use crate::surface::{Surface, WriteStatus};

/// Timing bounds for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorTimings {
    /// Deadline for one bid request cycle.
    pub bid_timeout: Duration,
    /// Bound on waiting for the auction primitive, from construction.
    pub ready_timeout: Duration,
}

impl Default for OrchestratorTimings {
    fn default() -> Self {
        Self {
            bid_timeout: DEFAULT_BID_TIMEOUT,
            ready_timeout: DEFAULT_AUCTION_READY_TIMEOUT,
        }
    }
}

/// What a render cycle put on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A bid won and its creative was written.
    Winner {
        /// The winning bid.
        bid: BidResult,
        /// Whether the write reached the surface.
        write: WriteStatus,
    },
    /// No bid won; the fallback creative was written.
    Fallback {
        /// Whether the write reached the surface.
        write: WriteStatus,
    },
}

impl RenderOutcome {
    /// The winning bid, if any.
    pub const fn winner(&self) -> Option<&BidResult> {
        match self {
            Self::Winner { bid, .. } => Some(bid),
            Self::Fallback { .. } => None,
        }
    }

    /// Status of the surface write.
    pub const fn write_status(&self) -> WriteStatus {
        match self {
            Self::Winner { write, .. } | Self::Fallback { write } => *write,
        }
    }
}

/// Obtains a winning bid for a slot with a bounded wait.
#[derive(Debug)]
pub struct BiddingOrchestrator {
    units: BTreeMap<String, AdUnit>,
    readiness: AuctionReadiness,
    ready_deadline: Instant,
    auction: OnceCell<SharedAuction>,
    bid_timeout: Duration,
    creative: CreativeRenderer,
}

impl BiddingOrchestrator {
    /// Register `units` and start the readiness clock.
    ///
    /// Units with a duplicate code replace earlier ones.
    pub fn new(
        units: Vec<AdUnit>,
        readiness: AuctionReadiness,
        creative: CreativeRenderer,
        timings: OrchestratorTimings,
    ) -> Self {
        let now = Instant::now();
        let units: BTreeMap<_, _> = units.into_iter().map(|u| (u.code.clone(), u)).collect();
        info!(
            ad_units = units.len(),
            bid_timeout_ms = timings.bid_timeout.as_millis(),
            ready_timeout_ms = timings.ready_timeout.as_millis(),
            "bidding orchestrator initialized"
        );
        Self {
            units,
            readiness,
            ready_deadline: now.checked_add(timings.ready_timeout).unwrap_or(now),
            auction: OnceCell::new(),
            bid_timeout: timings.bid_timeout,
            creative,
        }
    }

    /// Registered ad unit for a code.
    pub fn ad_unit(&self, code: &str) -> Option<&AdUnit> {
        self.units.get(code)
    }

    /// All registered ad units, ordered by code.
    pub fn ad_units(&self) -> impl Iterator<Item = &AdUnit> {
        self.units.values()
    }

    /// The installed primitive, waiting for it on first use.
    ///
    /// Installs [`StandbyAuction`] when the primitive is not provided
    /// before the readiness deadline.
    async fn auction(&self) -> SharedAuction {
        let installed = self
            .auction
            .get_or_init(|| async {
                if let Some(primitive) = self.readiness.wait_until(self.ready_deadline).await {
                    info!(auction = primitive.name(), "auction primitive ready");
                    primitive
                } else {
                    warn!("auction primitive unavailable, installing standby");
                    Arc::new(StandbyAuction) as SharedAuction
                }
            })
            .await;
        Arc::clone(installed)
    }

    /// Request bids for one slot and return the winner.
    ///
    /// Resolves exactly once, no later than the bid timeout. Unknown slot
    /// codes resolve to `None` at once.
    pub async fn request_bids(&self, code: &str) -> Option<BidResult> {
        let Some(unit) = self.units.get(code) else {
            warn!(slot = code, "bid request for unregistered ad unit");
            return None;
        };

        let cycle = async {
            let auction = self.auction().await;
            let bids = auction.request_bids(unit).await;
            (auction, bids)
        };

        match timeout(self.bid_timeout, cycle).await {
            Ok((auction, bids)) => {
                let received = bids.len();
                let winner = select_winning_bid(unit, bids);
                match &winner {
                    Some(bid) => info!(
                        slot = code,
                        auction = auction.name(),
                        bidder = %bid.bidder_id,
                        cpm = %bid.cpm,
                        bids_received = received,
                        "winning bid selected"
                    ),
                    None => debug!(
                        slot = code,
                        auction = auction.name(),
                        bids_received = received,
                        "no winning bid"
                    ),
                }
                winner
            }
            Err(_) => {
                warn!(
                    slot = code,
                    timeout_ms = self.bid_timeout.as_millis(),
                    "bid deadline exceeded, rendering fallback"
                );
                None
            }
        }
    }

    /// Run one bid cycle and write the result into `surface`.
    pub async fn render(&self, code: &str, surface: &Surface) -> RenderOutcome {
        let ticket = surface.claim();
        if let Some(bid) = self.request_bids(code).await {
            let write = surface.write(ticket, &bid.creative_markup);
            debug!(slot = code, cpm = %bid.cpm, write = ?write, "rendered winning bid");
            RenderOutcome::Winner { bid, write }
        } else {
            let write = surface.write(ticket, &self.creative.bid_fallback(code));
            debug!(slot = code, write = ?write, "rendered fallback creative");
            RenderOutcome::Fallback { write }
        }
    }
}

/// Pick the winning bid of an auction.
///
/// Only renderable bids for `unit` compete. Highest CPM wins; equal CPMs
/// go to the bidder registered first in `unit`, bidders missing from the
/// unit rank after registered ones, and remaining ties go to arrival
/// order.
pub fn select_winning_bid(unit: &AdUnit, bids: Vec<BidResult>) -> Option<BidResult> {
    let rank = |bid: &BidResult| unit.bidder_rank(&bid.bidder_id).unwrap_or(usize::MAX);

    bids.into_iter()
        .enumerate()
        .filter(|(_, bid)| bid.ad_unit_code == unit.code && bid.is_renderable())
        .min_by(|(arrived_a, a), (arrived_b, b)| {
            b.cpm
                .cmp(&a.cpm)
                .then_with(|| rank(a).cmp(&rank(b)))
                .then_with(|| arrived_a.cmp(arrived_b))
        })
        .map(|(_, bid)| bid)
}
