//! Upstream text completion provider.
//!
//! Talks to an `OpenAI`-compatible chat completions API over HTTP via
//! `reqwest`. One request per prompt, no retries, no streaming.

use crate::config::OpenAiConfig;

/// System message sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that provides concise and informative responses about advertising, technology, and general topics.";

/// Errors from the completion provider.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Client(String),

    /// The request never got an answer.
    #[error("OpenAI request failed: {0}")]
    Request(String),

    /// The provider answered with a non-2xx status.
    #[error("OpenAI returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// The answer did not have the expected shape.
    #[error("OpenAI response parse failed: {0}")]
    Parse(String),
}

/// A completed prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text.
    pub text: String,
    /// Token accounting as reported by the provider.
    pub usage: serde_json::Value,
}

/// Backend for `OpenAI`-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiBackend {
    /// Create a backend from configuration and a non-blank key.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig, api_key: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model name for logging.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the generated text.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion, UpstreamError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        Ok(Completion {
            text: extract_openai_content(&json)?,
            usage: json.get("usage").cloned().unwrap_or(serde_json::Value::Null),
        })
    }
}

/// Extract the generated text from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, UpstreamError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| UpstreamError::Parse("missing choices[0].message.content".to_owned()))
}
