//! Transport trait: the abstraction over the chat-completion endpoint.
//!
//! A transport knows how to POST one request body and hand back whatever JSON
//! came back. Interpreting that JSON is the chat client's job, so a mock
//! transport can return arbitrary bodies (including malformed ones).
//!
//! Implementations: the reqwest-backed HTTP transport, scripted test mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChatError;

/// A chat message on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// The JSON body of a `/chat/completions` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The model to use (e.g., "gpt-4o")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Always a single user message holding the prompt
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    pub fn single_prompt(
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
            messages: vec![ChatMessage::user(prompt)],
        }
    }

    /// The prompt carried by this request.
    pub fn prompt(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// The core transport trait.
///
/// One call is one attempt: implementations must not retry.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// A human-readable name for this transport (e.g., "openai").
    fn name(&self) -> &str;

    /// POST `body` with bearer `api_key`, returning the parsed 2xx body.
    ///
    /// Non-2xx statuses, timeouts and network failures are errors. A 2xx body
    /// that is valid JSON of any shape is returned as-is.
    async fn post_chat(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> std::result::Result<serde_json::Value, ChatError>;
}
