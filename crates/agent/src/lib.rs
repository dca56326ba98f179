//! The Aide completion pipeline.
//!
//! One completion runs through four steps:
//!
//! 1. **Load memory** from the configured file (if enabled)
//! 2. **Build the prompt**, trimming the oldest document text to fit the budget
//! 3. **Send it** as a single chat request
//! 4. **Log** the exchange when it succeeded, then hand the outcome to the caller
//!
//! The caller decides where the text goes; this crate never touches the
//! document itself.

pub mod assistant;
pub mod document;

pub use assistant::{Assistant, Completion, Outcome};
pub use document::{CompletionMode, insert_at};
