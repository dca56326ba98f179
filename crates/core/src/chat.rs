//! Per-call chat settings and the outcome of a chat call.

use crate::error::ChatError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A pending API key lookup.
pub type KeyFuture = Pin<Box<dyn Future<Output = String> + Send>>;

/// Yields the API key for one call.
///
/// Invoked once per request and never cached, so a rotated key is picked up
/// on the very next call. Lookups are async so a slow key command never
/// stalls other in-flight calls on the same runtime.
#[derive(Clone)]
pub struct ApiKeyProvider(Arc<dyn Fn() -> KeyFuture + Send + Sync>);

impl ApiKeyProvider {
    /// A provider backed by a cheap synchronous lookup.
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(move || -> KeyFuture { Box::pin(std::future::ready(f())) }))
    }

    /// A provider whose lookup has to wait on something (a process, a vault).
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        Self(Arc::new(move || -> KeyFuture { Box::pin(f()) }))
    }

    /// A provider that always returns the same key.
    pub fn fixed(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(move || key.clone())
    }

    pub async fn key(&self) -> String {
        (self.0)().await
    }
}

impl fmt::Debug for ApiKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKeyProvider([REDACTED])")
    }
}

/// Settings for a single chat call. Built fresh from configuration each time.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub api_key: ApiKeyProvider,
}

/// The outcome of one chat call. Exactly one variant, fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatResult {
    Success { text: String },
    Failure { reason: ChatError },
}

impl ChatResult {
    pub fn success(text: impl Into<String>) -> Self {
        ChatResult::Success { text: text.into() }
    }

    pub fn failure(reason: ChatError) -> Self {
        ChatResult::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChatResult::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ChatResult::Success { text } => Some(text),
            ChatResult::Failure { .. } => None,
        }
    }
}

/// A chat result plus the instant the request was issued.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub result: ChatResult,
    pub started_at: DateTime<Utc>,
}

impl ChatReply {
    /// Seconds between the request being issued and `now`.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        elapsed_secs(self.started_at, now)
    }
}

pub fn elapsed_secs(started_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - started_at).num_milliseconds() as f64 / 1000.0
}
