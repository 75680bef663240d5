//! Error types for the Adstage API.
//!
//! [`ApiError`] unifies all failure modes of the handlers into a single
//! enum that converts into an Axum HTTP response carrying an
//! [`ErrorBody`] via its [`IntoResponse`] implementation.

use adstage_types::{ErrorBody, ErrorKind};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Message returned when no completion key is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "OpenAI API key not configured. Please set OPENAI_API_KEY in your environment or adstage.toml.";

/// Message returned when the completion provider fails.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to process OpenAI request";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is missing a field or carries a bad value.
    #[error("validation error: {0}")]
    Validation(String),

    /// The server is missing configuration needed for this request.
    #[error("configuration error: {0}")]
    Config(String),

    /// The upstream provider failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Config(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire body for this error.
    pub fn body(&self) -> ErrorBody {
        let (error, details, kind) = match self {
            Self::Validation(msg) => (msg.clone(), None, ErrorKind::Validation),
            Self::Config(msg) => (msg.clone(), None, ErrorKind::Config),
            Self::Upstream(details) => (
                UPSTREAM_FAILURE_MESSAGE.to_owned(),
                Some(details.clone()),
                ErrorKind::Upstream,
            ),
            Self::NotFound(msg) => (msg.clone(), None, ErrorKind::NotFound),
        };
        ErrorBody {
            error,
            details,
            kind: Some(kind),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), axum::Json(self.body())).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|list| list.iter())
            .find_map(|e| e.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| errors.to_string());
        Self::Validation(message)
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_bad_request() {
        let error = ApiError::Config(MISSING_KEY_MESSAGE.to_owned());
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.body().kind, Some(ErrorKind::Config));
    }

    #[test]
    fn upstream_error_carries_details() {
        let body = ApiError::Upstream("connection reset".to_owned()).body();
        assert_eq!(body.error, UPSTREAM_FAILURE_MESSAGE);
        assert_eq!(body.details.as_deref(), Some("connection reset"));
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ApiError::NotFound("x".to_owned()).status(), StatusCode::NOT_FOUND);
    }
}
