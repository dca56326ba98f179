//! Configuration loading, validation, and management for Aide.
//!
//! Loads configuration from `~/.aide/config.toml` with environment
//! variable overrides. Validates all settings at load time.
//!
//! The host is expected to load the config once per invocation so edits to
//! the file take effect on the next call.

use aide_core::chat::{ApiKeyProvider, ChatConfig};
use aide_core::prompt::max_chars_for_tokens;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Values of `log.chat_log` that turn the exchange log off.
const LOG_DISABLED_SENTINELS: &[&str] = &["", "none", "off"];

/// The root configuration structure.
///
/// Maps directly to `~/.aide/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AideConfig {
    /// Static API key (lowest priority after the command)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Shell command whose trimmed stdout is the API key, run on every call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_command: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Input budget in tokens (1 token ≈ 4 characters)
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: u32,

    /// Maximum tokens per response. Output quality drops off above ~480.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP client timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_max_input_tokens() -> u32 {
    4000
}
fn default_max_output_tokens() -> u32 {
    480
}
fn default_temperature() -> f32 {
    1.1
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AideConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AideConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_key_command", &self.api_key_command)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_input_tokens", &self.max_input_tokens)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("memory", &self.memory)
            .field("log", &self.log)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_memory_path")]
    pub path: String,

    /// Pause after an unreadable-memory notice so a human can see it
    #[serde(default)]
    pub notice_delay_ms: u64,
}

fn default_memory_path() -> String {
    "~/memory.txt".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_memory_path(),
            notice_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Path of the exchange log, or "none" to disable it
    #[serde(default = "default_chat_log")]
    pub chat_log: String,
}

fn default_chat_log() -> String {
    "~/aide-log.txt".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            chat_log: default_chat_log(),
        }
    }
}

impl AideConfig {
    /// Load configuration from the default path (~/.aide/config.toml).
    ///
    /// Environment overrides:
    /// - `AIDE_MODEL`
    /// - `AIDE_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path(), |key| std::env::var(key).ok())
    }

    /// Load from `path`, apply overrides looked up through `env`, then validate.
    fn load_with_env(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;

        if let Some(model) = env("AIDE_MODEL") {
            config.model = model;
        }

        if let Some(base_url) = env("AIDE_BASE_URL") {
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".aide")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Where the CLI keeps its session (last instruction).
    pub fn session_path() -> PathBuf {
        Self::config_dir().join("session.json")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_input_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_input_tokens must be > 0".into(),
            ));
        }

        if self.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_output_tokens must be > 0".into(),
            ));
        }

        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("base_url must not be empty".into()));
        }

        Ok(())
    }

    /// Character budget for a whole prompt.
    pub fn max_prompt_chars(&self) -> usize {
        max_chars_for_tokens(self.max_input_tokens as usize)
    }

    pub fn memory_path(&self) -> PathBuf {
        expand_home(&self.memory.path)
    }

    /// The exchange log path, or `None` when logging is disabled.
    pub fn chat_log_path(&self) -> Option<PathBuf> {
        let raw = self.log.chat_log.trim();
        if LOG_DISABLED_SENTINELS
            .iter()
            .any(|s| raw.eq_ignore_ascii_case(s))
        {
            None
        } else {
            Some(expand_home(raw))
        }
    }

    /// Per-call chat settings derived from this config.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            model: self.model.clone(),
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            api_key: self.api_key_provider(),
        }
    }

    /// A key provider that resolves the key afresh on every call.
    ///
    /// Order: `api_key_command`, `api_key`, `AIDE_API_KEY`, `OPENAI_API_KEY`.
    /// Returns an empty string when nothing is set.
    pub fn api_key_provider(&self) -> ApiKeyProvider {
        let command = self.api_key_command.clone();
        let static_key = self.api_key.clone();
        ApiKeyProvider::from_async(move || {
            let command = command.clone();
            let static_key = static_key.clone();
            async move {
                let from_command = match command.as_deref() {
                    Some(cmd) => run_key_command(cmd).await,
                    None => None,
                };
                from_command
                    .or(static_key)
                    .or_else(|| std::env::var("AIDE_API_KEY").ok())
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .map(|k| k.trim().to_string())
                    .unwrap_or_default()
            }
        })
    }

    /// Generate a default config TOML string (for `init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AideConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_command: None,
            base_url: default_base_url(),
            model: default_model(),
            max_input_tokens: default_max_input_tokens(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            memory: MemoryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Run the configured key command, returning its stdout when it succeeds.
///
/// Runs on the tokio process driver so other calls keep going meanwhile.
async fn run_key_command(command: &str) -> Option<String> {
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    };
    #[cfg(not(target_os = "windows"))]
    let mut cmd = {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    };

    match cmd.kill_on_drop(true).output().await {
        Ok(out) if out.status.success() => {
            let key = String::from_utf8_lossy(&out.stdout).trim().to_string();
            (!key.is_empty()).then_some(key)
        }
        Ok(out) => {
            tracing::warn!(status = %out.status, "api_key_command exited unsuccessfully");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to run api_key_command");
            None
        }
    }
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs_home();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None => PathBuf::from(path),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for aide_core::Error {
    fn from(e: ConfigError) -> Self {
        aide_core::Error::Config {
            message: e.to_string(),
        }
    }
}
