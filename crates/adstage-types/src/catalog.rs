//! Built-in catalogs used when no configuration overrides them.

use serde_json::json;

use crate::slot::{AdSlot, AdType, AdUnit, BidderConfig, Size};

/// Slots registered with the standalone ad server by default.
pub fn standalone_slots() -> Vec<AdSlot> {
    vec![
        AdSlot {
            code: "standalone-ad-1".to_owned(),
            sizes: vec![Size(300, 250), Size(320, 50)],
            title: Some("Banner Ad".to_owned()),
            ad_type: AdType::Banner,
        },
        AdSlot {
            code: "standalone-ad-2".to_owned(),
            sizes: vec![Size(728, 90), Size(320, 50)],
            title: Some("Leaderboard Ad".to_owned()),
            ad_type: AdType::Banner,
        },
    ]
}

/// Test bidders attached to every default header-bidding unit.
fn test_bidders() -> Vec<BidderConfig> {
    vec![
        BidderConfig::new("appnexus", json!({"placementId": 13_144_370})),
        BidderConfig::new(
            "rubicon",
            json!({"accountId": 14_062, "siteId": 70_608, "zoneId": 335_918}),
        ),
    ]
}

/// Header-bidding ad units registered with the orchestrator by default.
pub fn header_bidding_units() -> Vec<AdUnit> {
    vec![
        AdUnit {
            code: "div-gpt-ad-1234567890-0".to_owned(),
            sizes: vec![Size(300, 250), Size(320, 50)],
            bidders: test_bidders(),
        },
        AdUnit {
            code: "div-gpt-ad-1234567890-1".to_owned(),
            sizes: vec![Size(728, 90), Size(320, 50)],
            bidders: test_bidders(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn slot_codes_are_unique() {
        let slots = standalone_slots();
        let codes: BTreeSet<_> = slots.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes.len(), slots.len());
        assert!(slots.iter().all(|s| !s.sizes.is_empty()));
    }

    #[test]
    fn units_register_appnexus_first() {
        for unit in header_bidding_units() {
            assert_eq!(unit.bidder_rank("appnexus"), Some(0));
            assert_eq!(unit.bidder_rank("rubicon"), Some(1));
        }
    }
}
