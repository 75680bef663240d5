//! Prompt proxy payloads and the error body shared by every endpoint.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Completion budget used when a request does not name one.
pub const DEFAULT_MAX_TOKENS: u32 = 150;

const fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Body of `POST /api/openai`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PromptRequest {
    /// Free-text prompt; must contain a non-whitespace character.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub prompt: String,
    /// Maximum number of completion tokens.
    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, max = 4096, message = "maxTokens must be between 1 and 4096"))]
    pub max_tokens: u32,
}

impl PromptRequest {
    /// Create a request with a trimmed prompt.
    pub fn new(prompt: &str, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.trim().to_owned(),
            max_tokens,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Prompt is required".into()));
    }
    Ok(())
}

/// Successful response of `POST /api/openai`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PromptResponse {
    /// Always `true` for a completed request.
    pub success: bool,
    /// Generated text.
    pub response: String,
    /// Provider token accounting, passed through untouched.
    #[serde(default)]
    pub usage: serde_json::Value,
}

/// Classification of an [`ErrorBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// Missing upstream credentials or other server configuration.
    Config,
    /// The upstream provider failed.
    Upstream,
    /// Unknown resource.
    NotFound,
}

/// JSON error payload returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Underlying cause, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_tokens_defaults() {
        let parsed: Result<PromptRequest, _> =
            serde_json::from_value(serde_json::json!({"prompt": "Explain header bidding"}));
        assert!(parsed.is_ok_and(|r| r.max_tokens == DEFAULT_MAX_TOKENS));
    }

    #[test]
    fn blank_prompt_fails_validation() {
        assert!(PromptRequest::new("   ", 150).validate().is_err());
        assert!(PromptRequest::new("", 150).validate().is_err());
        assert!(PromptRequest::new("hello", 150).validate().is_ok());
    }

    #[test]
    fn zero_tokens_fails_validation() {
        assert!(PromptRequest::new("hello", 0).validate().is_err());
    }

    #[test]
    fn new_trims_prompt() {
        assert_eq!(PromptRequest::new("  hi \n", 10).prompt, "hi");
    }

    #[test]
    fn error_body_omits_empty_fields() {
        let body = ErrorBody {
            error: "Prompt is required".to_owned(),
            details: None,
            kind: Some(ErrorKind::Validation),
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["kind"], "validation");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn error_kinds_are_closed() {
        let names: Vec<String> = [
            ErrorKind::Validation,
            ErrorKind::Config,
            ErrorKind::Upstream,
            ErrorKind::NotFound,
        ]
        .iter()
        .map(|k| serde_json::to_value(k).unwrap_or_default().as_str().unwrap_or_default().to_owned())
        .collect();
        assert_eq!(names, ["validation", "config", "upstream", "not_found"]);
        assert!(serde_json::from_value::<ErrorKind>(serde_json::json!("internal")).is_err());
    }
}
