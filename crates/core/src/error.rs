//! Error types for the Aide domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Aide operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Chat errors ---
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Exchange log errors ---
    #[error("Log error: {0}")]
    Log(#[from] LogError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Session ---
    #[error("No instruction given and no previous instruction to reuse")]
    NoInstruction,

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Why a chat call produced no usable text.
///
/// Cloneable so it can travel inside a [`crate::chat::ChatResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("no API key available")]
    MissingApiKey,

    #[error("API request failed: {message} (status: {status_code})")]
    Http { status_code: u16, message: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("malformed response")]
    MalformedResponse,

    #[error("empty response")]
    EmptyResult,
}

impl ChatError {
    /// Whether the call reached the provider and got a usable body back,
    /// but the body held no text.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ChatError::EmptyResult)
    }
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory file {path} is unreadable: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to append to chat log {path}: {reason}")]
    Append { path: PathBuf, reason: String },
}
