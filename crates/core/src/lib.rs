//! # Aide Core
//!
//! Domain types, traits, and error definitions for the Aide editor assistant.
//! This crate has **no I/O framework dependencies**. It defines the domain
//! model that the other crates implement against.
//!
//! ## Pieces
//!
//! - [`prompt`] fits memory, instruction and document text into a character budget
//! - [`provider`] is the seam to the chat-completion endpoint
//! - [`chat`] carries per-call settings and the tagged call outcome
//! - [`session`] remembers the caller's last instruction

pub mod error;
pub mod prompt;
pub mod provider;
pub mod chat;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use error::{ChatError, Error, Result};
pub use prompt::{PromptRequest, build_prompt, max_chars_for_tokens};
pub use provider::{ChatCompletionRequest, ChatMessage, ChatTransport};
pub use chat::{ApiKeyProvider, ChatConfig, ChatReply, ChatResult, KeyFuture};
pub use session::Session;
