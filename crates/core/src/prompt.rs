//! Budgeted prompt assembly.
//!
//! A prompt is `memory ++ "Instructions: " ++ instruction ++ header ++ window`,
//! where the window is the tail of the document text. Only the window is ever
//! shortened; memory and instruction are kept whole. When the budget is too
//! small to hold even those, the window collapses to nothing.
//!
//! Lengths are counted in `char`s so a cut never lands inside a UTF-8
//! sequence.

use serde::{Deserialize, Serialize};

/// Heuristic: 1 token ≈ 4 characters.
pub const CHARS_PER_TOKEN: usize = 4;

pub const INSTRUCTIONS_PREFIX: &str = "Instructions: ";
pub const CONTEXT_HEADER: &str = "\n\nContext:\n\n";

/// Convert an input token budget into a character budget.
pub fn max_chars_for_tokens(max_input_tokens: usize) -> usize {
    max_input_tokens.saturating_mul(CHARS_PER_TOKEN)
}

/// The three parts of a prompt after budgeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub memory_text: String,
    pub instruction: String,
    pub document_tail: String,

    /// Characters cut from the front of the document to fit the budget.
    #[serde(default)]
    pub dropped_chars: usize,
}

impl PromptRequest {
    /// Fit `document` behind `memory` and `instruction` within `max_chars`.
    pub fn fit(memory: &str, instruction: &str, document: &str, max_chars: usize) -> Self {
        let reserved = reserved_chars(memory, instruction);
        let room = max_chars.saturating_sub(reserved);
        let document_len = document.chars().count();

        let (document_tail, dropped_chars) = if document_len <= room {
            (document.to_string(), 0)
        } else {
            let dropped = document_len - room;
            (char_suffix(document, room).to_string(), dropped)
        };

        Self {
            memory_text: memory.to_string(),
            instruction: instruction.to_string(),
            document_tail,
            dropped_chars,
        }
    }

    /// Render the final prompt text.
    pub fn render(&self) -> String {
        let mut prompt = String::with_capacity(
            self.memory_text.len()
                + INSTRUCTIONS_PREFIX.len()
                + self.instruction.len()
                + CONTEXT_HEADER.len()
                + self.document_tail.len(),
        );
        prompt.push_str(&self.memory_text);
        prompt.push_str(INSTRUCTIONS_PREFIX);
        prompt.push_str(&self.instruction);
        prompt.push_str(CONTEXT_HEADER);
        prompt.push_str(&self.document_tail);
        prompt
    }

    /// Whether any document text had to be dropped.
    pub fn was_truncated(&self) -> bool {
        self.dropped_chars > 0
    }
}

/// Build the prompt string for one call. Pure; inputs are never modified.
pub fn build_prompt(memory: &str, instruction: &str, document: &str, max_chars: usize) -> String {
    PromptRequest::fit(memory, instruction, document, max_chars).render()
}

/// Characters taken by everything except the document window.
pub fn reserved_chars(memory: &str, instruction: &str) -> usize {
    memory.chars().count()
        + INSTRUCTIONS_PREFIX.chars().count()
        + instruction.chars().count()
        + CONTEXT_HEADER.chars().count()
}

/// The last `n` chars of `text`.
fn char_suffix(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
