//! Per-caller session state.
//!
//! Holds the last instruction so an empty instruction can mean "same as
//! before". The caller owns the session and passes it in; nothing here is
//! process-wide.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub last_instruction: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the instruction for this call and remember it.
    ///
    /// A blank `given` falls back to the previous instruction.
    pub fn resolve_instruction(&mut self, given: Option<&str>) -> Result<String> {
        let given = given.map(str::trim).filter(|s| !s.is_empty());
        match given {
            Some(instruction) => {
                self.last_instruction = instruction.to_string();
                Ok(self.last_instruction.clone())
            }
            None if !self.last_instruction.is_empty() => Ok(self.last_instruction.clone()),
            None => Err(Error::NoInstruction),
        }
    }

    /// Load a session from a JSON file. A missing file is a fresh session.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No session file, starting fresh");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
