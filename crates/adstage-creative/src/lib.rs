//! Creative markup rendering for the Adstage ad demo stack.
//!
//! All creatives are HTML fragments produced from `minijinja` templates.
//! The built-in templates are compiled into the crate; an operator can
//! point [`CreativeRenderer::from_dir`] at a directory holding files with
//! the same names to restyle them.
//!
//! | Template | Used for |
//! |----------|----------|
//! | `banner.html` | Mock banner creative from the standalone ad server |
//! | `video.html` | Mock video placeholder creative |
//! | `bid.html` | Winning header-bidding bid, labelled with bidder and CPM |
//! | `bid_fallback.html` | Header-bidding slot with no winning bid |
//! | `no_ad.html` | Standalone slot with nothing to show |
//! | `ssp_demo.html` | The static SSP demo creative |
//!
//! Template variables are HTML-escaped (the `.html` suffix turns
//! auto-escaping on), so slot codes never inject markup.

use std::path::Path;

use adstage_types::{AdResponse, AdSlot, AdType, Size};
use minijinja::{Environment, HtmlEscape, context};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::warn;

/// Horizontal and vertical padding subtracted from a slot size so the
/// creative's box fits inside the slot.
const CREATIVE_PADDING_PX: u32 = 40;

/// Lowest mock CPM in cents (inclusive).
const MOCK_CPM_MIN_CENTS: i64 = 100;

/// Highest mock CPM in cents (exclusive).
const MOCK_CPM_MAX_CENTS: i64 = 600;

/// Currency of every generated price.
pub const CURRENCY: &str = "USD";

const BUILTIN_TEMPLATES: [(&str, &str); 6] = [
    ("banner.html", include_str!("../templates/banner.html")),
    ("video.html", include_str!("../templates/video.html")),
    ("bid.html", include_str!("../templates/bid.html")),
    ("bid_fallback.html", include_str!("../templates/bid_fallback.html")),
    ("no_ad.html", include_str!("../templates/no_ad.html")),
    ("ssp_demo.html", include_str!("../templates/ssp_demo.html")),
];

/// Errors that can occur while rendering creatives.
#[derive(Debug, thiserror::Error)]
pub enum CreativeError {
    /// A template failed to load or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders creative markup from the creative templates.
#[derive(Debug, Clone)]
pub struct CreativeRenderer {
    env: Environment<'static>,
}

impl CreativeRenderer {
    /// Create a renderer backed by the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`CreativeError::Template`] if a built-in template does not
    /// parse.
    pub fn new() -> Result<Self, CreativeError> {
        let mut env = Environment::new();
        for (name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Create a renderer that loads templates from `dir` on first use.
    ///
    /// Missing files surface as render errors, which the infallible
    /// helpers below turn into a plain placeholder.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir.as_ref()));
        Self { env }
    }

    /// Render the mock creative for a slot of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`CreativeError::Template`] if the template is missing or
    /// fails to render.
    pub fn render_mock(
        &self,
        code: &str,
        ad_type: AdType,
        sizes: &[Size],
    ) -> Result<String, CreativeError> {
        let name = match ad_type {
            AdType::Banner => "banner.html",
            AdType::Video => "video.html",
        };
        let (width, height) = padded_dimensions(Size::primary(sizes));
        let html = self
            .env
            .get_template(name)?
            .render(context! { code, width, height })?;
        Ok(html)
    }

    /// Render the creative carried by a header-bidding bid.
    ///
    /// # Errors
    ///
    /// Returns [`CreativeError::Template`] if the template is missing or
    /// fails to render.
    pub fn render_bid(
        &self,
        code: &str,
        bidder: &str,
        cpm: Decimal,
        sizes: &[Size],
    ) -> Result<String, CreativeError> {
        let (width, height) = padded_dimensions(Size::primary(sizes));
        let cpm = cpm.to_string();
        let html = self
            .env
            .get_template("bid.html")?
            .render(context! { code, bidder, cpm, width, height })?;
        Ok(html)
    }

    /// Markup for a header-bidding slot that received no winning bid.
    pub fn bid_fallback(&self, code: &str) -> String {
        self.render_or_placeholder("bid_fallback.html", code)
    }

    /// Markup for a standalone slot with no ad to show.
    pub fn no_ad(&self, code: &str) -> String {
        self.render_or_placeholder("no_ad.html", code)
    }

    /// Markup for the SSP demo endpoint.
    pub fn ssp_demo(&self, request_id: &str) -> String {
        self.env
            .get_template("ssp_demo.html")
            .and_then(|t| t.render(context! { request_id }))
            .unwrap_or_else(|e| {
                warn!(error = %e, "ssp demo template failed, using placeholder");
                static_placeholder(request_id)
            })
    }

    /// Build a complete mock [`AdResponse`] for a slot.
    ///
    /// The CPM is drawn uniformly from `[1.00, 6.00)` with two decimals.
    /// A template failure degrades to a plain placeholder creative so the
    /// response is always servable.
    pub fn generate_mock_ad<R: Rng>(&self, slot: &AdSlot, rng: &mut R) -> AdResponse {
        let ad_html = self
            .render_mock(&slot.code, slot.ad_type, &slot.sizes)
            .unwrap_or_else(|e| {
                warn!(slot = %slot.code, error = %e, "mock creative failed, using placeholder");
                static_placeholder(&slot.code)
            });

        AdResponse {
            success: true,
            ad_unit_code: slot.code.clone(),
            ad_html,
            ad_type: slot.ad_type,
            sizes: slot.sizes.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            cpm: random_cpm(rng),
            currency: CURRENCY.to_owned(),
        }
    }

    fn render_or_placeholder(&self, name: &str, code: &str) -> String {
        self.env
            .get_template(name)
            .and_then(|t| t.render(context! { code }))
            .unwrap_or_else(|e| {
                warn!(template = name, slot = code, error = %e, "template failed, using placeholder");
                static_placeholder(code)
            })
    }
}

/// Draw a mock CPM in `[1.00, 6.00)` with two decimal places.
pub fn random_cpm<R: Rng>(rng: &mut R) -> Decimal {
    Decimal::new(rng.random_range(MOCK_CPM_MIN_CENTS..MOCK_CPM_MAX_CENTS), 2)
}

/// Creative box dimensions for a slot size.
pub const fn padded_dimensions(size: Size) -> (u32, u32) {
    (
        size.width().saturating_sub(CREATIVE_PADDING_PX),
        size.height().saturating_sub(CREATIVE_PADDING_PX),
    )
}

/// Last-resort markup that needs no template.
fn static_placeholder(label: &str) -> String {
    format!(
        r#"<div style="padding: 20px; text-align: center; font-family: Arial, sans-serif;">Ad Unit: {}</div>"#,
        HtmlEscape(label)
    )
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn renderer() -> CreativeRenderer {
        CreativeRenderer::new().unwrap_or_else(|_| CreativeRenderer::from_dir("/nonexistent"))
    }

    #[test]
    fn builtin_templates_parse() {
        assert!(CreativeRenderer::new().is_ok());
    }

    #[test]
    fn banner_uses_padded_primary_size() {
        let html = renderer()
            .render_mock("standalone-ad-2", AdType::Banner, &[Size(728, 90), Size(320, 50)])
            .unwrap_or_default();
        assert!(html.contains("width: 688px"));
        assert!(html.contains("height: 50px"));
        assert!(html.contains("Premium Advertisement"));
        assert!(html.contains("Ad Unit: standalone-ad-2"));
    }

    #[test]
    fn video_template_selected_for_video_slots() {
        let html = renderer()
            .render_mock("v-1", AdType::Video, &[Size(640, 360)])
            .unwrap_or_default();
        assert!(html.contains("Video Advertisement"));
    }

    #[test]
    fn bid_creative_names_bidder_and_price() {
        let html = renderer()
            .render_bid("div-gpt-ad-1", "appnexus", Decimal::new(245, 2), &[Size(300, 250)])
            .unwrap_or_default();
        assert!(html.contains("Header Bidding Advertisement"));
        assert!(html.contains("Won by appnexus at $2.45 CPM"));
        assert!(html.contains("Ad Unit: div-gpt-ad-1"));
        assert!(html.contains("width: 260px"));
        assert!(!html.contains("Standalone Ad Server"));
    }

    #[test]
    fn placeholder_escapes_label() {
        let html = CreativeRenderer::from_dir("/nonexistent/adstage-templates").no_ad("<b>x</b>");
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;x"));
    }

    #[test]
    fn tiny_sizes_saturate_at_zero() {
        assert_eq!(padded_dimensions(Size(20, 50)), (0, 10));
    }

    #[test]
    fn slot_code_is_escaped() {
        let html = renderer().bid_fallback("<script>x</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn missing_template_dir_degrades_to_placeholder() {
        let broken = CreativeRenderer::from_dir("/nonexistent/adstage-templates");
        assert!(broken.render_mock("x", AdType::Banner, &[]).is_err());
        let html = broken.no_ad("slot-a");
        assert!(html.contains("Ad Unit: slot-a"));
    }

    #[test]
    fn fallback_templates_embed_slot_code() {
        let r = renderer();
        assert!(r.bid_fallback("div-gpt-ad-1").contains("Demo Advertisement"));
        assert!(r.no_ad("standalone-ad-1").contains("No ad available at this time"));
        assert!(r.ssp_demo("req-42").contains("Request: req-42"));
    }

    #[test]
    fn mock_cpm_within_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let cpm = random_cpm(&mut rng);
            assert!(cpm >= Decimal::new(100, 2));
            assert!(cpm < Decimal::new(600, 2));
            assert_eq!(cpm.scale(), 2);
        }
    }

    #[test]
    fn mock_ad_has_banner_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let slot = AdSlot::banner("standalone-ad-1", vec![Size(300, 250)]);
        let ad = renderer().generate_mock_ad(&slot, &mut rng);
        assert!(ad.success);
        assert_eq!(ad.ad_unit_code, "standalone-ad-1");
        assert_eq!(ad.currency, CURRENCY);
        assert!(!ad.ad_html.is_empty());
        assert!(ad.timestamp > 0);
    }
}
