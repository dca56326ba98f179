//! OpenAI-compatible transport implementation.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any endpoint
//! exposing `POST {base_url}/chat/completions`.
//!
//! The transport only moves bytes: it sends the body, maps HTTP-level
//! failures to [`ChatError`] and hands back the JSON body untouched.

use async_trait::async_trait;
use aide_core::error::ChatError;
use aide_core::provider::{ChatCompletionRequest, ChatTransport};
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible HTTP transport.
pub struct OpenAiCompatTransport {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompatTransport {
    /// Create a new transport with the given request timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatTransport for OpenAiCompatTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn post_chat(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> std::result::Result<serde_json::Value, ChatError> {
        let url = self.endpoint();

        debug!(transport = %self.name, model = %body.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Provider returned error");
            return Err(ChatError::Http {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        // A 2xx body that isn't JSON at all is still a malformed response.
        response.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_timeout() {
                ChatError::Timeout(e.to_string())
            } else {
                warn!(error = %e, "Failed to parse provider response");
                ChatError::MalformedResponse
            }
        })
    }
}

fn map_send_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout(e.to_string())
    } else {
        ChatError::Transport(e.to_string())
    }
}
