//! Client for the prompt proxy endpoint.
//!
//! Unlike the ad clients, failures here are reported to the caller: a
//! prompt answer cannot be faked. Errors are classified from the
//! backend's [`ErrorBody`]:
//!
//! | Backend answer | Error |
//! |----------------|-------|
//! | `kind: "config"`, or 400 mentioning "not configured" | [`ClientError::Config`] |
//! | `kind: "validation"` | [`ClientError::Validation`] |
//! | anything else non-2xx, transport failure, `success: false` | [`ClientError::Upstream`] |

use adstage_types::{ErrorBody, ErrorKind, PromptRequest, PromptResponse};
use reqwest::StatusCode;
use tracing::{debug, warn};
use validator::Validate;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Client for `POST /api/openai`.
#[derive(Debug, Clone)]
pub struct PromptProxyClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PromptProxyClient {
    /// Create a client for the backend named in `config`.
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint("/api/openai"),
        }
    }

    /// Send a prompt and return the generated text.
    ///
    /// The prompt is trimmed before sending. A blank prompt fails with
    /// [`ClientError::Validation`] without touching the network.
    pub async fn ask(&self, prompt: &str, max_tokens: u32) -> Result<String, ClientError> {
        let request = PromptRequest::new(prompt, max_tokens);
        request
            .validate()
            .map_err(|e| ClientError::Validation(first_message(&e)))?;

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "prompt proxy unreachable");
                ClientError::Upstream(format!("prompt request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<ErrorBody> = response.json().await.ok();
            let error = classify_failure(status, body);
            warn!(status = status.as_u16(), error = %error, "prompt proxy rejected request");
            return Err(error);
        }

        let answer: PromptResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Upstream(format!("prompt response decode failed: {e}")))?;

        if !answer.success {
            return Err(ClientError::Upstream(
                "prompt proxy reported failure".to_owned(),
            ));
        }

        debug!(chars = answer.response.len(), "prompt answered");
        Ok(answer.response)
    }
}

/// Map a non-2xx answer of the proxy to a client error.
fn classify_failure(status: StatusCode, body: Option<ErrorBody>) -> ClientError {
    let Some(body) = body else {
        return ClientError::Upstream(format!("prompt proxy returned {status}"));
    };

    let mentions_config =
        status == StatusCode::BAD_REQUEST && body.error.to_lowercase().contains("not configured");

    match body.kind {
        Some(ErrorKind::Config) => ClientError::Config {
            status: status.as_u16(),
            message: body.error,
        },
        Some(ErrorKind::Validation) => ClientError::Validation(body.error),
        None if mentions_config => ClientError::Config {
            status: status.as_u16(),
            message: body.error,
        },
        _ => ClientError::Upstream(body.details.map_or_else(
            || body.error.clone(),
            |details| format!("{}: {details}", body.error),
        )),
    }
}

fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|list| list.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| errors.to_string())
}
