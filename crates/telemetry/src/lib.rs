//! Exchange logging for Aide.
//!
//! Keeps a persistent, append-only record of every successful prompt and
//! response, formatted for browsing as an outline.

pub mod exchange_log;

pub use exchange_log::{ExchangeLogger, ExchangeRecord, LogTarget, RECORD_MARKER};
