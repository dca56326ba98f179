//! Chat-completion transport and client for Aide.
//!
//! The transport implements `aide_core::ChatTransport` over HTTP; the client
//! turns a prompt into a `ChatReply` on top of any transport.

pub mod client;
pub mod openai_compat;

pub use client::{ChatClient, extract_content};
pub use openai_compat::OpenAiCompatTransport;

use aide_core::error::ChatError;
use std::sync::Arc;
use std::time::Duration;

/// Build a chat client for the endpoint named in `config`.
pub fn build_from_config(config: &aide_config::AideConfig) -> Result<ChatClient, ChatError> {
    let transport = OpenAiCompatTransport::new(
        "openai-compat",
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(ChatClient::new(Arc::new(transport)))
}
