//! Picking the context window out of a document and putting text back in.
//!
//! Positions are character offsets, clamped to the document, so a host can
//! pass whatever its cursor says without risking a split UTF-8 sequence.

use serde::{Deserialize, Serialize};

/// Which part of the document feeds the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompletionMode {
    /// Everything before the point; the reply is inserted at the point.
    Tail { point: usize },
    /// An explicit selection; the reply is inserted after it.
    Region { start: usize, end: usize },
}

impl CompletionMode {
    /// Tail mode with the point at the end of the document.
    pub fn at_end(document: &str) -> Self {
        CompletionMode::Tail {
            point: document.chars().count(),
        }
    }

    /// The text this mode sends as context.
    pub fn context<'a>(&self, document: &'a str) -> &'a str {
        match *self {
            CompletionMode::Tail { point } => &document[..byte_offset(document, point)],
            CompletionMode::Region { start, end } => {
                let (start, end) = ordered(start, end);
                &document[byte_offset(document, start)..byte_offset(document, end)]
            }
        }
    }

    /// Character offset where the reply goes.
    pub fn insertion_point(&self, document: &str) -> usize {
        let len = document.chars().count();
        match *self {
            CompletionMode::Tail { point } => point.min(len),
            CompletionMode::Region { start, end } => ordered(start, end).1.min(len),
        }
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Byte offset of the `chars`-th character, clamped to the end.
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// `document` with `text` inserted at character offset `point`.
pub fn insert_at(document: &str, point: usize, text: &str) -> String {
    let at = byte_offset(document, point);
    let mut out = String::with_capacity(document.len() + text.len());
    out.push_str(&document[..at]);
    out.push_str(text);
    out.push_str(&document[at..]);
    out
}
