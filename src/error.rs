use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure at the HTTP boundary. No retries happen at this layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server answered with a status outside 200-299.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Timeout, connection refused, DNS failure, unreadable body.
    #[error("Network error calling {url}: {cause}")]
    Network { url: String, cause: String },
}

#[derive(Error, Debug)]
pub enum BarqError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Ingestion enqueue rejected or unreachable.
    #[error("Ingestion submission failed: {0}")]
    Submission(String),

    #[error("Ingestion failed for memory bank '{memory_bank}' (last progress {last_progress:.2}%)")]
    IngestionFailed {
        memory_bank: String,
        last_progress: f64,
    },

    #[error("Ingestion for memory bank '{memory_bank}' timed out after {elapsed:?} (last progress {last_progress:.2}%)")]
    IngestionTimeout {
        memory_bank: String,
        elapsed: Duration,
        last_progress: f64,
    },

    /// LLM rewrite step failed; retrieval is aborted.
    #[error("Query rewrite failed: {0}")]
    Rewrite(String),

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LLM backend error: {0}")]
    Llm(String),

    #[error("Service unhealthy: {0}")]
    Unhealthy(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BarqError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

pub type BarqResult<T> = Result<T, BarqError>;
