//! Server configuration.
//!
//! Settings are layered with the `config` crate, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `adstage.toml` in the working directory, or the file named by
//!    `ADSTAGE_CONFIG` (required when set)
//! 3. Environment variables
//!
//! | Variable | Key | Default |
//! |----------|-----|---------|
//! | `HOST` | `host` | `0.0.0.0` |
//! | `PORT` | `port` | `3000` |
//! | `STATIC_DIR` | `static_dir` | `dist` |
//! | `TEMPLATES_DIR` | `templates_dir` | built-in templates |
//! | `AD_LATENCY_MIN_MS` | `latency.min_ms` | `200` |
//! | `AD_LATENCY_MAX_MS` | `latency.max_ms` | `700` |
//! | `OPENAI_API_KEY` | `openai.api_key` | unset |
//! | `OPENAI_API_URL` | `openai.api_url` | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL` | `openai.model` | `gpt-3.5-turbo` |
//!
//! The slot catalog served by `/api/ads/config` can be replaced in the
//! file with `[[slots]]` tables.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use adstage_types::AdSlot;
use adstage_types::catalog::standalone_slots;
use config::{Config, File, FileFormat};
use serde::Deserialize;

/// Config file read when `ADSTAGE_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "adstage.toml";

/// Environment variables and the keys they override.
const ENV_OVERRIDES: [(&str, &str); 9] = [
    ("HOST", "host"),
    ("PORT", "port"),
    ("STATIC_DIR", "static_dir"),
    ("TEMPLATES_DIR", "templates_dir"),
    ("AD_LATENCY_MIN_MS", "latency.min_ms"),
    ("AD_LATENCY_MAX_MS", "latency.max_ms"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_API_URL", "openai.api_url"),
    ("OPENAI_MODEL", "openai.model"),
];

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The values loaded are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Directory holding the built front end.
    pub static_dir: PathBuf,
    /// Directory with creative template overrides.
    pub templates_dir: Option<PathBuf>,
    /// Synthetic latency of `POST /api/ads`.
    pub latency: LatencyConfig,
    /// Upstream completion provider.
    pub openai: OpenAiConfig,
    /// Slot catalog.
    pub slots: Vec<AdSlot>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            static_dir: PathBuf::from("dist"),
            templates_dir: None,
            latency: LatencyConfig::default(),
            openai: OpenAiConfig::default(),
            slots: standalone_slots(),
        }
    }
}

/// Synthetic response latency bounds, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Shortest delay.
    pub min_ms: u64,
    /// Longest delay.
    pub max_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            min_ms: 200,
            max_ms: 700,
        }
    }
}

impl LatencyConfig {
    /// No synthetic latency at all.
    pub const fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// The delay range in milliseconds, lower bound first.
    ///
    /// An inverted pair is swapped, so the range is never empty.
    pub const fn range_ms(&self) -> RangeInclusive<u64> {
        if self.min_ms <= self.max_ms {
            self.min_ms..=self.max_ms
        } else {
            self.max_ms..=self.min_ms
        }
    }
}

/// `OpenAI`-compatible chat completions settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Secret key; an empty value counts as unset.
    pub api_key: Option<String>,
    /// Base URL; requests go to `{api_url}/chat/completions`.
    pub api_url: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-3.5-turbo".to_owned(),
            temperature: 0.7,
            timeout_ms: 30_000,
        }
    }
}

impl OpenAiConfig {
    /// The configured key, if it is non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ServerConfig {
    /// Load configuration from the config file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if an explicitly named file is missing
    /// or a value does not parse, and [`ConfigError::Invalid`] if the
    /// latency range is inverted.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load configuration reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::load`].
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let (path, required) = lookup("ADSTAGE_CONFIG").map_or_else(
            || (DEFAULT_CONFIG_FILE.to_owned(), false),
            |path| (path, true),
        );

        let mut builder = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml).required(required));
        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, lookup(var))?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validated()
    }

    /// Parse configuration from a TOML string alone.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::load`].
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.latency.min_ms > self.latency.max_ms {
            return Err(ConfigError::Invalid(format!(
                "latency.min_ms ({}) exceeds latency.max_ms ({})",
                self.latency.min_ms, self.latency.max_ms
            )));
        }
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::Invalid(format!(
                "openai.temperature must be within [0, 2], got {}",
                self.openai.temperature
            )));
        }
        Ok(self)
    }

    /// Slot registered under `code`.
    pub fn slot(&self, code: &str) -> Option<&AdSlot> {
        self.slots.iter().find(|s| s.code == code)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use adstage_types::{AdType, Size};

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = ServerConfig::load_with(env(&[]));
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.latency, LatencyConfig::default());
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert!(config.openai.api_key().is_none());
        assert_eq!(config.slots.len(), 2);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::load_with(env(&[
            ("PORT", "8088"),
            ("OPENAI_API_KEY", "sk-test"),
            ("AD_LATENCY_MIN_MS", "0"),
            ("AD_LATENCY_MAX_MS", "5"),
        ]))
        .unwrap_or_default();
        assert_eq!(config.port, 8088);
        assert_eq!(config.openai.api_key(), Some("sk-test"));
        assert_eq!(config.latency.range_ms(), 0..=5);
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = ServerConfig::load_with(env(&[("OPENAI_API_KEY", "  ")])).unwrap_or_default();
        assert!(config.openai.api_key().is_none());
    }

    #[test]
    fn inverted_latency_is_rejected() {
        let result = ServerConfig::load_with(env(&[
            ("AD_LATENCY_MIN_MS", "900"),
            ("AD_LATENCY_MAX_MS", "100"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_pair_still_yields_a_range() {
        let latency = LatencyConfig {
            min_ms: 700,
            max_ms: 200,
        };
        assert_eq!(latency.range_ms(), 200..=700);
        assert!(!latency.range_ms().is_empty());
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let result = ServerConfig::load_with(env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn named_file_must_exist() {
        let result = ServerConfig::load_with(env(&[("ADSTAGE_CONFIG", "/nonexistent/adstage.toml")]));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn file_replaces_slot_catalog() {
        let config = ServerConfig::parse(
            r#"
            port = 4000

            [latency]
            min_ms = 10
            max_ms = 20

            [[slots]]
            code = "sidebar-1"
            sizes = [[160, 600]]
            title = "Skyscraper"
            type = "video"
            "#,
        )
        .unwrap_or_default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.latency.range_ms(), 10..=20);
        let slot = config.slot("sidebar-1");
        assert_eq!(slot.map(|s| s.ad_type), Some(AdType::Video));
        assert_eq!(slot.map(|s| s.sizes.clone()), Some(vec![Size(160, 600)]));
        assert!(config.slot("standalone-ad-1").is_none());
    }
}
