//! Response archiving: one file per retrieval under the retrievals directory.
//!
//! Filenames are `{unix_timestamp}_{uuid_v4}.json`, so concurrent retrievals
//! never need to coordinate. Files are staged and renamed into place, and a
//! name clash is an error rather than an overwrite.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::atomic;
use crate::{id_gen, time_utils, BarqError, BarqResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedResponse {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the archived payload.
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ResponseArchiver {
    dir: PathBuf,
}

impl ResponseArchiver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store `raw` verbatim and return where it landed.
    pub fn archive(&self, raw: &[u8]) -> BarqResult<ArchivedResponse> {
        std::fs::create_dir_all(&self.dir).map_err(|e| BarqError::storage(&self.dir, e))?;

        let created_at = time_utils::now();
        let filename = format!("{}_{}.json", created_at.timestamp(), id_gen::archive_id());
        let path = self.dir.join(filename);
        atomic::write_new(&path, raw)?;

        tracing::info!(path = %path.display(), bytes = raw.len(), "Retrieval response archived");
        Ok(ArchivedResponse {
            path,
            created_at,
            sha256: id_gen::content_digest(raw),
        })
    }
}
