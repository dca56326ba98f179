//! Exchange log: an append-only, human-readable record of chat exchanges.
//!
//! Each record is an org-mode style block so the file can be folded and
//! browsed as an outline:
//!
//! ```text
//! * 2026-10-17 14:03:11 (2.41s) gpt-4o
//! ** Prompt
//! ...
//! ** Response
//! ...
//! ```
//!
//! Only successful exchanges are written. Failed calls are surfaced to the
//! user as notices and never reach this file.

use aide_core::chat::elapsed_secs;
use aide_core::error::LogError;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Heading marker that opens every record.
pub const RECORD_MARKER: &str = "* ";

/// One completed exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub timestamp: DateTime<Local>,
    pub elapsed_seconds: f64,
    pub model: String,
    pub prompt: String,
    pub response: String,
}

impl ExchangeRecord {
    /// Render the record as a self-delimited outline block.
    pub fn render(&self) -> String {
        let mut block = format!(
            "{RECORD_MARKER}{} ({:.2}s) {}\n** Prompt\n{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.elapsed_seconds,
            self.model,
            escape_body(&self.prompt),
        );
        ensure_newline(&mut block);
        block.push_str("** Response\n");
        block.push_str(&escape_body(&self.response));
        ensure_newline(&mut block);
        block.push('\n');
        block
    }
}

/// Quote body lines that would otherwise read as headings, org-style: a
/// leading `,` in front of any run of commas followed by `*`.
fn escape_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.trim_start_matches(',').starts_with('*') {
            out.push(',');
        }
        out.push_str(line);
    }
    out
}

fn ensure_newline(s: &mut String) {
    if !s.ends_with('\n') {
        s.push('\n');
    }
}

/// Where records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Disabled,
    File(PathBuf),
}

impl From<Option<PathBuf>> for LogTarget {
    fn from(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => LogTarget::File(p),
            None => LogTarget::Disabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExchangeLogger {
    target: LogTarget,
}

impl ExchangeLogger {
    pub fn new(target: impl Into<LogTarget>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target != LogTarget::Disabled
    }

    /// Append one successful exchange. Elapsed time is measured up to now.
    pub fn log_exchange(
        &self,
        prompt: &str,
        response: &str,
        model: &str,
        started_at: DateTime<Utc>,
    ) -> Result<(), LogError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let now = Utc::now();
        let record = ExchangeRecord {
            timestamp: now.with_timezone(&Local),
            elapsed_seconds: elapsed_secs(started_at, now),
            model: model.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
        };
        self.append(&record)
    }

    /// Append a prepared record to the end of the log.
    pub fn append(&self, record: &ExchangeRecord) -> Result<(), LogError> {
        let LogTarget::File(path) = &self.target else {
            return Ok(());
        };

        let fail = |reason: String| LogError::Append {
            path: path.clone(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| fail(e.to_string()))?;

        file.write_all(record.render().as_bytes())
            .map_err(|e| fail(e.to_string()))?;

        debug!(path = %path.display(), model = %record.model, "Exchange logged");
        Ok(())
    }
}
