//! Ad slots and header-bidding ad units.
//!
//! An [`AdSlot`] is a named placement served by the standalone ad server.
//! An [`AdUnit`] is the header-bidding counterpart: the same placement
//! identity plus the ordered list of bidders asked to fill it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Fallback dimensions used when a slot carries no sizes.
const DEFAULT_SIZE: Size = Size(300, 250);

/// A creative size as `[width, height]` in CSS pixels.
///
/// Serialized as a two-element array to match the front end's
/// `[[300, 250], [320, 50]]` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Size(pub u32, pub u32);

impl Size {
    /// Width in pixels.
    pub const fn width(self) -> u32 {
        self.0
    }

    /// Height in pixels.
    pub const fn height(self) -> u32 {
        self.1
    }

    /// The primary size of a size list, or 300x250 when the list is empty.
    pub fn primary(sizes: &[Self]) -> Self {
        sizes.first().copied().unwrap_or(DEFAULT_SIZE)
    }
}

impl core::fmt::Display for Size {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.0, self.1)
    }
}

/// The kind of creative a slot expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AdType {
    /// Static display banner.
    #[default]
    Banner,
    /// Video placeholder creative.
    Video,
}

impl AdType {
    /// Wire name of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Video => "video",
        }
    }
}

/// A placement served by the standalone ad server.
///
/// Created once from static configuration and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AdSlot {
    /// Unique, opaque slot identifier (also the DOM element id).
    pub code: String,
    /// Accepted sizes, most preferred first.
    pub sizes: Vec<Size>,
    /// Optional display label.
    #[serde(default)]
    pub title: Option<String>,
    /// Creative kind.
    #[serde(default, rename = "type")]
    pub ad_type: AdType,
}

impl AdSlot {
    /// Create a banner slot with no title.
    pub fn banner(code: impl Into<String>, sizes: Vec<Size>) -> Self {
        Self {
            code: code.into(),
            sizes,
            title: None,
            ad_type: AdType::Banner,
        }
    }

    /// Attach a display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The first listed size, or the 300x250 default.
    pub fn primary_size(&self) -> Size {
        Size::primary(&self.sizes)
    }
}

/// One bidder entry of a header-bidding ad unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BidderConfig {
    /// Bidder code (e.g. `appnexus`).
    pub bidder: String,
    /// Bidder-specific parameters, passed through untouched.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl BidderConfig {
    /// Create a bidder entry.
    pub fn new(bidder: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            bidder: bidder.into(),
            params,
        }
    }
}

/// A header-bidding ad unit: a slot code, its sizes, and its bidders.
///
/// Bidder order is registration order and decides CPM ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AdUnit {
    /// Slot code the auction is run for.
    pub code: String,
    /// Banner sizes offered to bidders.
    pub sizes: Vec<Size>,
    /// Bidders in registration order.
    pub bidders: Vec<BidderConfig>,
}

impl AdUnit {
    /// Registration index of a bidder, if it belongs to this unit.
    pub fn bidder_rank(&self, bidder: &str) -> Option<usize> {
        self.bidders.iter().position(|b| b.bidder == bidder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_serializes_as_pair() {
        let json = serde_json::to_string(&vec![Size(300, 250), Size(320, 50)]).unwrap_or_default();
        assert_eq!(json, "[[300,250],[320,50]]");
    }

    #[test]
    fn primary_size_defaults_when_empty() {
        let slot = AdSlot::banner("empty", Vec::new());
        assert_eq!(slot.primary_size(), Size(300, 250));
        let slot = AdSlot::banner("lb", vec![Size(728, 90)]);
        assert_eq!(slot.primary_size().to_string(), "728x90");
    }

    #[test]
    fn slot_type_field_renamed() {
        let json = serde_json::json!({
            "code": "standalone-ad-9",
            "sizes": [[300, 250]],
            "type": "video"
        });
        let slot: AdSlot = serde_json::from_value(json).unwrap_or_else(|_| AdSlot::banner("x", Vec::new()));
        assert_eq!(slot.ad_type, AdType::Video);
        assert_eq!(slot.title, None);
    }

    #[test]
    fn bidder_rank_follows_registration_order() {
        let unit = AdUnit {
            code: "u".to_owned(),
            sizes: vec![Size(300, 250)],
            bidders: vec![
                BidderConfig::new("appnexus", serde_json::Value::Null),
                BidderConfig::new("rubicon", serde_json::Value::Null),
            ],
        };
        assert_eq!(unit.bidder_rank("appnexus"), Some(0));
        assert_eq!(unit.bidder_rank("rubicon"), Some(1));
        assert_eq!(unit.bidder_rank("ix"), None);
    }
}
