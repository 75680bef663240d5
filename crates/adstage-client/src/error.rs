//! Error types for the ad clients.
//!
//! Transport failures of the ad clients never surface here: they are
//! absorbed into a degraded-but-valid result. Only validation,
//! configuration and upstream failures of the prompt proxy propagate.

/// Errors surfaced by the clients to their callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Required input was missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The slot code is not registered with the client.
    #[error("unknown ad slot: {0}")]
    UnknownSlot(String),

    /// The backend reported missing upstream credentials.
    #[error("backend configuration error ({status}): {message}")]
    Config {
        /// HTTP status returned by the backend.
        status: u16,
        /// Message returned by the backend.
        message: String,
    },

    /// The prompt provider or the proxy in front of it failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The backend could not be reached or answered with garbage.
    #[error("transport error: {0}")]
    Transport(String),

    /// Client settings are invalid.
    #[error("invalid client settings: {0}")]
    Settings(String),
}
