//! The chat client: one prompt in, one tagged result out.
//!
//! Every call fetches a fresh API key, stamps the start instant, makes exactly
//! one transport attempt and folds every outcome (including a body of the
//! wrong shape) into a [`ChatResult`]. Nothing is shared between calls except
//! the transport itself.

use aide_core::chat::{ChatConfig, ChatReply, ChatResult};
use aide_core::error::ChatError;
use aide_core::provider::{ChatCompletionRequest, ChatTransport};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Send `prompt` and resolve once with the outcome.
    pub async fn send_chat(&self, config: &ChatConfig, prompt: &str) -> ChatReply {
        let api_key = config.api_key.key().await;
        let started_at = Utc::now();

        if api_key.trim().is_empty() {
            warn!("No API key available, not sending request");
            return ChatReply {
                result: ChatResult::failure(ChatError::MissingApiKey),
                started_at,
            };
        }

        let body = ChatCompletionRequest::single_prompt(
            &config.model,
            config.max_output_tokens,
            config.temperature,
            prompt,
        );

        debug!(
            transport = %self.transport.name(),
            model = %config.model,
            prompt_chars = prompt.chars().count(),
            "Issuing chat request"
        );

        let result = match self.transport.post_chat(&api_key, &body).await {
            Ok(value) => extract_content(&value),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                ChatResult::failure(e)
            }
        };

        ChatReply { result, started_at }
    }

    /// Send `prompt` on the runtime and hand the outcome to `on_complete`.
    ///
    /// `on_complete` runs exactly once, on the same runtime, whatever happens.
    pub fn spawn_chat<F>(&self, config: ChatConfig, prompt: String, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(ChatReply) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let reply = client.send_chat(&config, &prompt).await;
            on_complete(reply);
        })
    }
}

/// Pull `choices[0].message.content` out of a completion body.
pub fn extract_content(body: &serde_json::Value) -> ChatResult {
    match body
        .pointer("/choices/0/message/content")
        .and_then(serde_json::Value::as_str)
    {
        Some(text) if text.trim().is_empty() => ChatResult::failure(ChatError::EmptyResult),
        Some(text) => ChatResult::success(text),
        None => {
            warn!("Completion body has no choices[0].message.content");
            ChatResult::failure(ChatError::MalformedResponse)
        }
    }
}
