//! The completion pipeline: memory → prompt → chat → log → caller.

use aide_config::AideConfig;
use aide_core::chat::{ChatResult, elapsed_secs};
use aide_core::error::ChatError;
use aide_core::prompt::PromptRequest;
use aide_memory::{FsSource, MemoryLoader, MemorySource};
use aide_providers::ChatClient;
use aide_telemetry::ExchangeLogger;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the caller should do with the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Insert this text at the insertion point.
    Insert(String),
    /// The model answered with nothing; leave the document alone.
    Empty,
    /// The call failed; leave the document alone.
    Failed(ChatError),
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub outcome: Outcome,
    /// Set when memory was enabled but couldn't be read.
    pub memory_warning: Option<String>,
}

impl Completion {
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Insert(text) => Some(text),
            _ => None,
        }
    }

    /// A short, transient message for the user, if any.
    pub fn notice(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Insert(_) => None,
            Outcome::Empty => Some("Aide: empty response, nothing inserted".into()),
            Outcome::Failed(e) => Some(format!("Aide: request failed: {e}")),
        }
    }
}

/// Runs completions against one chat client and memory source.
pub struct Assistant<S = FsSource> {
    client: ChatClient,
    memory: Arc<MemoryLoader<S>>,
}

impl<S> Clone for Assistant<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            memory: self.memory.clone(),
        }
    }
}

impl Assistant<FsSource> {
    pub fn new(client: ChatClient) -> Self {
        Self::with_memory(client, MemoryLoader::new())
    }
}

impl<S: MemorySource + 'static> Assistant<S> {
    pub fn with_memory(client: ChatClient, memory: MemoryLoader<S>) -> Self {
        Self {
            client,
            memory: Arc::new(memory),
        }
    }

    /// Run one completion. `document` is the context window chosen by the
    /// caller (text before the point, or a region).
    pub async fn complete(&self, config: &AideConfig, instruction: &str, document: &str) -> Completion {
        let memory = self
            .memory
            .load(&config.memory_path(), config.memory.enabled);

        let memory_warning = memory.warning.map(|w| w.to_string());
        if memory_warning.is_some() && config.memory.notice_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.memory.notice_delay_ms)).await;
        }

        let request = PromptRequest::fit(&memory.text, instruction, document, config.max_prompt_chars());
        if request.was_truncated() {
            debug!(
                dropped_chars = request.dropped_chars,
                kept_chars = request.document_tail.chars().count(),
                "Document trimmed to fit the prompt budget"
            );
        }
        let prompt = request.render();

        let chat_config = config.chat_config();
        let reply = self.client.send_chat(&chat_config, &prompt).await;
        let started_at = reply.started_at;

        let outcome = match reply.result {
            ChatResult::Success { text } => {
                let logger = ExchangeLogger::new(config.chat_log_path());
                if let Err(e) = logger.log_exchange(&prompt, &text, &chat_config.model, started_at) {
                    warn!(error = %e, "Failed to write exchange log");
                }
                info!(
                    model = %chat_config.model,
                    elapsed_secs = elapsed_secs(started_at, Utc::now()),
                    chars = text.chars().count(),
                    "Completion received"
                );
                Outcome::Insert(text)
            }
            ChatResult::Failure { reason } if reason.is_empty_result() => Outcome::Empty,
            ChatResult::Failure { reason } => Outcome::Failed(reason),
        };

        Completion {
            outcome,
            memory_warning,
        }
    }

    /// Run a completion on the runtime and hand the result to `on_complete`.
    ///
    /// `on_complete` runs exactly once. Each call owns its config snapshot,
    /// instruction and document, so overlapping calls never see each other.
    pub fn spawn_complete<F>(
        &self,
        config: AideConfig,
        instruction: String,
        document: String,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        let assistant = self.clone();
        tokio::spawn(async move {
            let completion = assistant.complete(&config, &instruction, &document).await;
            on_complete(completion);
        })
    }
}
