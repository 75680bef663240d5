//! Bids produced by a header-bidding auction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A candidate offer from a demand source to fill one ad unit.
///
/// CPM is a [`Decimal`] so prices compare exactly; it is never negative
/// for a bid that can win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BidResult {
    /// Ad unit code the bid was made for.
    pub ad_unit_code: String,
    /// Bidder code that produced the bid.
    pub bidder_id: String,
    /// Price per thousand impressions.
    #[ts(as = "String")]
    pub cpm: Decimal,
    /// ISO currency code of `cpm`.
    pub currency: String,
    /// Renderable creative markup.
    pub creative_markup: String,
}

impl BidResult {
    /// Whether the bid is eligible to win: non-negative price and
    /// non-empty markup.
    pub fn is_renderable(&self) -> bool {
        !self.cpm.is_sign_negative() && !self.creative_markup.trim().is_empty()
    }
}
