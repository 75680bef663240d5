//! Standalone ad server payloads.
//!
//! [`AdRequest`] is what a client posts to `POST /api/ads`;
//! [`AdResponse`] is what comes back (or what the client synthesizes
//! locally when the backend cannot be reached).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::slot::{AdSlot, AdType, Size};

/// Ambient targeting data sent with an ad request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Targeting {
    /// Path of the page the slot lives on.
    #[serde(default)]
    pub page: Option<String>,
    /// Client clock in milliseconds since the Unix epoch.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub timestamp: Option<i64>,
    /// Publisher account identifier.
    #[serde(default)]
    pub publisher_id: Option<String>,
}

/// Body of `POST /api/ads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AdRequest {
    /// Slot code to fill.
    #[validate(length(min = 1, message = "adUnitCode is required"))]
    pub ad_unit_code: String,
    /// Accepted sizes, most preferred first.
    #[validate(length(min = 1, message = "at least one size is required"))]
    pub sizes: Vec<Size>,
    /// Ambient targeting data.
    #[serde(default)]
    pub targeting: Targeting,
}

/// Response of `POST /api/ads`.
///
/// `cpm` keeps two decimal places and serializes as a string
/// (`"3.50"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AdResponse {
    /// Whether a creative was served.
    pub success: bool,
    /// Slot code the creative is for.
    pub ad_unit_code: String,
    /// Creative markup.
    pub ad_html: String,
    /// Creative kind.
    pub ad_type: AdType,
    /// Sizes the creative was generated for.
    pub sizes: Vec<Size>,
    /// Generation time in milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Price per thousand impressions.
    #[ts(as = "String")]
    pub cpm: Decimal,
    /// ISO currency code of `cpm`.
    pub currency: String,
}

/// One entry of the slot catalog served by `GET /api/ads/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SlotCatalogEntry {
    /// Slot code.
    pub code: String,
    /// Accepted sizes.
    pub sizes: Vec<Size>,
    /// Display label.
    pub title: Option<String>,
    /// Creative kind.
    #[serde(rename = "type")]
    pub ad_type: AdType,
}

impl From<&AdSlot> for SlotCatalogEntry {
    fn from(slot: &AdSlot) -> Self {
        Self {
            code: slot.code.clone(),
            sizes: slot.sizes.clone(),
            title: slot.title.clone(),
            ad_type: slot.ad_type,
        }
    }
}

impl From<SlotCatalogEntry> for AdSlot {
    fn from(entry: SlotCatalogEntry) -> Self {
        Self {
            code: entry.code,
            sizes: entry.sizes,
            title: entry.title,
            ad_type: entry.ad_type,
        }
    }
}

/// Response of `GET /api/ads/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CatalogResponse {
    /// Always `true` for a served catalog.
    pub success: bool,
    /// Registered slots.
    pub ad_units: Vec<SlotCatalogEntry>,
}

/// Response of `GET /ssp-demo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SspDemoResponse {
    /// Echo of the caller's request id, or a generated one.
    pub request_id: String,
    /// Slot code of the demo placement.
    pub ad_unit_code: String,
    /// Creative markup.
    pub ad_html: String,
    /// Fixed demo price.
    #[ts(as = "String")]
    pub cpm: Decimal,
    /// ISO currency code of `cpm`.
    pub currency: String,
    /// Generation time in milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_request_requires_sizes() {
        let request = AdRequest {
            ad_unit_code: "standalone-ad-1".to_owned(),
            sizes: Vec::new(),
            targeting: Targeting::default(),
        };
        assert!(request.validate().is_err());

        let request = AdRequest {
            sizes: vec![Size(300, 250)],
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn ad_request_targeting_is_optional() {
        let json = serde_json::json!({"adUnitCode": "top-banner", "sizes": [[728, 90]]});
        let parsed: Result<AdRequest, _> = serde_json::from_value(json);
        assert!(parsed.is_ok_and(|r| r.targeting == Targeting::default()));
    }

    #[test]
    fn ad_response_cpm_keeps_two_decimals() {
        let response = AdResponse {
            success: true,
            ad_unit_code: "standalone-ad-1".to_owned(),
            ad_html: "<div></div>".to_owned(),
            ad_type: AdType::Banner,
            sizes: vec![Size(300, 250)],
            timestamp: 1_700_000_000_000,
            cpm: Decimal::new(350, 2),
            currency: "USD".to_owned(),
        };
        let json = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(json["cpm"], "3.50");
        assert_eq!(json["adType"], "banner");
        assert_eq!(json["adUnitCode"], "standalone-ad-1");
    }
}
