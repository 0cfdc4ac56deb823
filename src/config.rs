//! Client configuration: service locations, cadences and storage paths.
//!
//! Loaded from `{data_dir}/config.json`. Every field has a default so a
//! missing or partial file still yields a usable configuration; CLI flags
//! override individual values on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants;
use crate::storage::{atomic, path_utils};
use crate::{BarqError, BarqResult};

// ============================================================================
// ENDPOINTS
// ============================================================================

/// Paths on the memory bank service, relative to `server_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub health: String,
    pub memory_banks: String,
    pub enqueue_ingestion: String,
    pub ingestion_progress: String,
    pub semantic_query: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: constants::HEALTH_PATH.into(),
            memory_banks: constants::MEMORY_BANKS_PATH.into(),
            enqueue_ingestion: constants::ENQUEUE_INGESTION_PATH.into(),
            ingestion_progress: constants::INGESTION_PROGRESS_PATH.into(),
            semantic_query: constants::SEMANTIC_QUERY_PATH.into(),
        }
    }
}

// ============================================================================
// CLIENT CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Memory bank service base URL.
    pub server_url: String,
    /// LLM chat backend base URL (Ollama-compatible).
    pub llm_url: String,
    /// Model used for the rewrite step and answer synthesis.
    pub default_model: String,
    /// Default number of semantic search results (1..=50).
    pub query_limit: u32,
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
    /// Budget for reading a whole streamed LLM answer.
    pub stream_timeout_secs: u64,
    /// Minimum delay between two ingestion status polls.
    pub poll_interval_ms: u64,
    /// Upper bound on total ingestion polling. `None` = unbounded.
    pub poll_timeout_secs: Option<u64>,
    /// Where raw retrieval responses are archived.
    pub retrievals_dir: PathBuf,
    /// Persisted prompt profile location. `None` = `{data_dir}/custom_prompts.json`.
    pub prompts_path: Option<PathBuf>,
    /// Saved conversations. `None` = `{data_dir}/conversations`.
    pub conversations_dir: Option<PathBuf>,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: constants::DEFAULT_SERVER_URL.into(),
            llm_url: constants::DEFAULT_LLM_URL.into(),
            default_model: constants::DEFAULT_MODEL.into(),
            query_limit: constants::DEFAULT_QUERY_LIMIT,
            request_timeout_secs: constants::REQUEST_TIMEOUT_SECS,
            stream_timeout_secs: constants::STREAM_TIMEOUT_SECS,
            poll_interval_ms: constants::POLL_INTERVAL_MS,
            poll_timeout_secs: Some(constants::POLL_TIMEOUT_SECS),
            retrievals_dir: PathBuf::from(constants::RETRIEVALS_DIR),
            prompts_path: None,
            conversations_dir: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    /// Load from `{data_dir}/config.json`. Returns defaults if missing or invalid.
    pub fn load() -> Self {
        Self::load_from(&path_utils::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid client config, using defaults"
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> BarqResult<()> {
        self.save_to(&path_utils::config_path())
    }

    pub fn save_to(&self, path: &Path) -> BarqResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        atomic::write_replace(path, json.as_bytes())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs.max(1))
    }

    /// Poll interval, floored so the status loop never busy-spins.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(constants::MIN_POLL_INTERVAL_MS))
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.prompts_path
            .clone()
            .unwrap_or_else(|| path_utils::data_dir().join(constants::PROMPTS_FILE))
    }

    pub fn conversations_dir(&self) -> PathBuf {
        self.conversations_dir
            .clone()
            .unwrap_or_else(|| path_utils::data_dir().join(constants::CONVERSATIONS_DIR))
    }

    /// Copy with one field replaced. `key` uses dot notation for nested
    /// fields (`endpoints.health`); `raw` is parsed as JSON, falling back
    /// to a plain string.
    pub fn with_value(&self, key: &str, raw: &str) -> BarqResult<Self> {
        let mut root = serde_json::to_value(self)?;
        let parsed = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        let mut slot = &mut root;
        for segment in key.split('.') {
            slot = slot
                .as_object_mut()
                .and_then(|fields| fields.get_mut(segment))
                .ok_or_else(|| BarqError::InvalidInput(format!("unknown config key: {}", key)))?;
        }
        *slot = parsed;

        let updated: Self = serde_json::from_value(root)
            .map_err(|e| BarqError::InvalidInput(format!("invalid value for {}: {}", key, e)))?;
        crate::memory_bank::check_limit(updated.query_limit)?;
        Ok(updated)
    }

    /// Validated query limit.
    pub fn checked_limit(&self, limit: Option<u32>) -> BarqResult<u32> {
        crate::memory_bank::check_limit(limit.unwrap_or(self.query_limit))
    }
}
