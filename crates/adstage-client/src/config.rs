//! Configuration for the ad clients.
//!
//! All configuration is loaded from environment variables. The clients
//! need to know where the backend lives, how to describe the page they
//! serve, and how long to wait for bids.

use std::time::Duration;

use crate::error::ClientError;

/// Default backend base URL.
pub const DEFAULT_AD_SERVER_URL: &str = "http://localhost:3000";

/// Default wall-clock deadline for one bid request cycle.
pub const DEFAULT_BID_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default bound on waiting for the auction primitive to load.
pub const DEFAULT_AUCTION_READY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash (e.g. `http://localhost:3000`).
    pub ad_server_url: String,
    /// Publisher account identifier sent as targeting.
    pub publisher_id: Option<String>,
    /// Page path sent as targeting.
    pub page_path: String,
    /// Deadline for one bid request cycle (readiness wait plus auction).
    pub bid_timeout: Duration,
    /// Bound on waiting for the auction primitive, measured from
    /// orchestrator construction.
    pub auction_ready_timeout: Duration,
    /// Per-request HTTP timeout for backend calls.
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ad_server_url: DEFAULT_AD_SERVER_URL.to_owned(),
            publisher_id: None,
            page_path: "/".to_owned(),
            bid_timeout: DEFAULT_BID_TIMEOUT,
            auction_ready_timeout: DEFAULT_AUCTION_READY_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a specific backend, defaults elsewhere.
    pub fn for_backend(base_url: &str) -> Self {
        Self {
            ad_server_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `AD_SERVER_URL` -- backend base URL (default `http://localhost:3000`)
    /// - `PUBLISHER_ID` -- publisher id sent as targeting
    /// - `PAGE_PATH` -- page path sent as targeting (default `/`)
    /// - `BID_TIMEOUT_MS` -- bid cycle deadline (default 3000)
    /// - `AUCTION_READY_MS` -- auction readiness bound (default 5000)
    /// - `HTTP_TIMEOUT_MS` -- backend request timeout (default 10000)
    pub fn from_env() -> Result<Self, ClientError> {
        let ad_server_url = std::env::var("AD_SERVER_URL")
            .map_or_else(|_| DEFAULT_AD_SERVER_URL.to_owned(), |v| normalize_base_url(&v));
        if ad_server_url.is_empty() {
            return Err(ClientError::Settings("AD_SERVER_URL is empty".to_owned()));
        }

        let publisher_id = std::env::var("PUBLISHER_ID").ok().filter(|v| !v.trim().is_empty());
        let page_path = std::env::var("PAGE_PATH").unwrap_or_else(|_| "/".to_owned());

        Ok(Self {
            ad_server_url,
            publisher_id,
            page_path,
            bid_timeout: duration_var("BID_TIMEOUT_MS", DEFAULT_BID_TIMEOUT)?,
            auction_ready_timeout: duration_var("AUCTION_READY_MS", DEFAULT_AUCTION_READY_TIMEOUT)?,
            http_timeout: duration_var("HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT)?,
        })
    }

    /// URL of an endpoint under the backend base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.ad_server_url)
    }
}

/// Read an optional millisecond duration from the environment.
fn duration_var(name: &str, default: Duration) -> Result<Duration, ClientError> {
    match std::env::var(name) {
        Ok(raw) => parse_millis(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<Duration, ClientError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ClientError::Settings(format!("invalid {name}: {e}")))
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings() {
        let config = ClientConfig::default();
        assert_eq!(config.bid_timeout, Duration::from_secs(3));
        assert_eq!(config.auction_ready_timeout, Duration::from_secs(5));
        assert_eq!(config.page_path, "/");
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = ClientConfig::for_backend("http://127.0.0.1:4000/");
        assert_eq!(config.endpoint("/api/ads"), "http://127.0.0.1:4000/api/ads");
    }

    #[test]
    fn millis_parsing() {
        assert_eq!(parse_millis("X", " 250 ").ok(), Some(Duration::from_millis(250)));
        assert!(parse_millis("X", "soon").is_err());
    }
}
