//! File-based memory loader.
//!
//! A disabled loader never touches the filesystem. An enabled loader that
//! can't read its file degrades to empty memory and reports why, so the
//! caller can show a notice; it never fails the call.

use aide_core::error::MemoryError;
use std::path::Path;
use tracing::{debug, warn};

/// Where memory text comes from. The default reads the filesystem.
pub trait MemorySource: Send + Sync {
    fn read(&self, path: &Path) -> std::io::Result<String>;
}

/// Reads memory straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl MemorySource for FsSource {
    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// The text loaded for one call, plus a warning when the file was unreadable.
#[derive(Debug, Default)]
pub struct MemoryLoad {
    pub text: String,
    pub warning: Option<MemoryError>,
}

pub struct MemoryLoader<S = FsSource> {
    source: S,
}

impl MemoryLoader<FsSource> {
    pub fn new() -> Self {
        Self { source: FsSource }
    }
}

impl Default for MemoryLoader<FsSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MemorySource> MemoryLoader<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    pub fn load(&self, path: &Path, enabled: bool) -> MemoryLoad {
        if !enabled {
            return MemoryLoad::default();
        }

        match self.source.read(path) {
            Ok(text) => {
                debug!(path = %path.display(), chars = text.chars().count(), "Memory loaded");
                MemoryLoad {
                    text,
                    warning: None,
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Memory file unreadable, continuing without it");
                MemoryLoad {
                    text: String::new(),
                    warning: Some(MemoryError::Unreadable {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }
}

/// Read the memory file at `path` if `enabled`; empty string otherwise or on error.
pub fn load_memory(path: &Path, enabled: bool) -> String {
    MemoryLoader::new().load(path, enabled).text
}
