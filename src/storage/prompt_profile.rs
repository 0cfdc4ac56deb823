//! Prompt profile persistence: the retrieval-rewrite and answer-synthesis
//! templates, stored as a single JSON record.
//!
//! Not cached: every `load()` reads the current file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RETRIEVAL_TEMPLATE, DEFAULT_SYNTHESIS_TEMPLATE};
use crate::storage::atomic;
use crate::{BarqError, BarqResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptProfile {
    /// Template for the rewrite step. `{message}` is replaced by the user prompt.
    #[serde(rename = "retrieval_prompt")]
    pub retrieval_template: String,
    /// Prefix of the answer-synthesis prompt.
    #[serde(rename = "full_prompt")]
    pub synthesis_template: String,
}

impl Default for PromptProfile {
    fn default() -> Self {
        Self {
            retrieval_template: DEFAULT_RETRIEVAL_TEMPLATE.into(),
            synthesis_template: DEFAULT_SYNTHESIS_TEMPLATE.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptProfileStore {
    path: PathBuf,
}

impl PromptProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored profile unconditionally (last write wins).
    pub fn save(&self, profile: &PromptProfile) -> BarqResult<()> {
        if profile.retrieval_template.trim().is_empty() || profile.synthesis_template.trim().is_empty() {
            return Err(BarqError::InvalidInput("prompt templates must not be empty".into()));
        }
        let json = serde_json::to_string_pretty(profile)?;
        atomic::write_replace(&self.path, json.as_bytes())?;
        tracing::info!(path = %self.path.display(), "Prompt profile saved");
        Ok(())
    }

    /// `Ok(None)` when nothing has been saved yet (first run).
    pub fn load(&self) -> BarqResult<Option<PromptProfile>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No saved prompts found");
                return Ok(None);
            }
            Err(e) => return Err(BarqError::storage(&self.path, e)),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Saved profile, or the built-in defaults.
    pub fn load_or_default(&self) -> BarqResult<PromptProfile> {
        Ok(self.load()?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PromptProfileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PromptProfileStore::new(dir.path().join("custom_prompts.json"));
        (dir, store)
    }

    #[test]
    fn test_first_run_is_none() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.load_or_default().unwrap(), PromptProfile::default());
    }

    #[test]
    fn test_roundtrip() {
        let (_dir, store) = store();
        let profile = PromptProfile {
            retrieval_template: "Keywords only: {message}".into(),
            synthesis_template: "Answer from the catalog".into(),
        };
        store.save(&profile).unwrap();
        assert_eq!(store.load().unwrap(), Some(profile));
    }

    #[test]
    fn test_last_write_wins_and_no_cache() {
        let (_dir, store) = store();
        store.save(&PromptProfile::default()).unwrap();
        let second = PromptProfile {
            retrieval_template: "r2".into(),
            synthesis_template: "s2".into(),
        };
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap(), Some(second));

        // Edited behind our back: the next load sees it
        std::fs::write(store.path(), r#"{"retrieval_prompt":"r3","full_prompt":"s3"}"#).unwrap();
        assert_eq!(store.load().unwrap().unwrap().retrieval_template, "r3");
    }

    #[test]
    fn test_empty_templates_rejected() {
        let (_dir, store) = store();
        let profile = PromptProfile {
            retrieval_template: " ".into(),
            synthesis_template: "s".into(),
        };
        assert!(matches!(store.save(&profile), Err(BarqError::InvalidInput(_))));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_record_is_error() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{").unwrap();
        assert!(matches!(store.load(), Err(BarqError::Serialization(_))));
    }
}
