//! Conversation history persistence.
//!
//! History is a JSON array of `[speaker, text]` pairs, saved to
//! `conversation_{YYYYmmdd_HHMMSS}.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{AI_SPEAKER, HUMAN_SPEAKER};
use crate::storage::atomic;
use crate::{time_utils, BarqError, BarqResult};

/// One line of a conversation: `(speaker, text)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange(pub String, pub String);

impl Exchange {
    pub fn human(text: impl Into<String>) -> Self {
        Self(HUMAN_SPEAKER.into(), text.into())
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self(AI_SPEAKER.into(), text.into())
    }

    pub fn speaker(&self) -> &str {
        &self.0
    }

    pub fn text(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save `history`. Returns `Ok(None)` for an empty history (nothing to save).
    pub fn save(&self, history: &[Exchange]) -> BarqResult<Option<PathBuf>> {
        if history.is_empty() {
            tracing::info!("No conversation to save");
            return Ok(None);
        }
        let filename = format!("conversation_{}.json", time_utils::file_stamp(&time_utils::now()));
        let path = self.dir.join(filename);
        let json = serde_json::to_string(history)?;
        // Same-second saves replace each other, like the stamp suggests.
        atomic::write_replace(&path, json.as_bytes())?;
        tracing::info!(path = %path.display(), exchanges = history.len(), "Conversation saved");
        Ok(Some(path))
    }

    /// Load a saved history. Invalid JSON is an error; callers keep their
    /// current history in that case.
    pub fn load(path: &Path) -> BarqResult<Vec<Exchange>> {
        let content = std::fs::read_to_string(path).map_err(|e| BarqError::storage(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}
