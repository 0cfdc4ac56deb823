//! Explicit service-client value for the memory bank service.
//!
//! Holds the base URL, endpoint paths and the transport. Components receive
//! a clone of it instead of reaching for a process-wide handle.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Endpoints;
use crate::memory_bank::{MemoryBankList, MemoryBankName, RetrievalQuery};
use crate::transport::Transport;
use crate::{BarqError, BarqResult, TransportError};

/// Health string reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHealth {
    pub status: String,
}

impl ServiceHealth {
    /// Parse either a plain-text body (`OK`) or JSON (`"OK"`, `{"status":"OK"}`).
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        let status = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => s,
            Ok(serde_json::Value::Object(map)) => map
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or(trimmed)
                .to_string(),
            _ => trimmed.to_string(),
        };
        Self { status }
    }

    pub fn is_ok(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("ok")
    }
}

/// Acknowledgement returned by the ingestion enqueue endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionAck {
    #[serde(default = "default_accepted")]
    pub accepted: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_accepted() -> bool {
    true
}

#[derive(Clone)]
pub struct BarqClient {
    base_url: String,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BarqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarqClient")
            .field("base_url", &self.base_url)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl BarqClient {
    pub fn new(base_url: &str, endpoints: Endpoints, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /health`. Transport failures propagate; an unexpected status
    /// string is returned as-is for the caller to judge.
    pub fn check_health(&self) -> Result<ServiceHealth, TransportError> {
        let body = self.transport.get(&self.url(&self.endpoints.health), &[])?;
        Ok(ServiceHealth::from_body(&body))
    }

    /// Precondition for every workflow: healthy, or `Unhealthy`.
    pub fn ensure_healthy(&self) -> BarqResult<ServiceHealth> {
        let health = self
            .check_health()
            .map_err(|e| BarqError::Unhealthy(format!("service at {} is not reachable: {}", self.base_url, e)))?;
        if !health.is_ok() {
            return Err(BarqError::Unhealthy(format!(
                "service at {} reported '{}'",
                self.base_url, health.status
            )));
        }
        Ok(health)
    }

    pub fn memory_banks(&self) -> BarqResult<Vec<String>> {
        let body = self
            .transport
            .get(&self.url(&self.endpoints.memory_banks), &[])?;
        let list: MemoryBankList = serde_json::from_str(&body)?;
        Ok(list.names())
    }

    /// Post an ingestion job. Body keys follow the service's camelCase contract.
    pub fn enqueue_ingestion(
        &self,
        memory_bank: &MemoryBankName,
        input_path: &Path,
        overwrite: bool,
    ) -> Result<String, TransportError> {
        let payload = serde_json::json!({
            "memoryBankName": memory_bank.as_str(),
            "inputPath": input_path.to_string_lossy(),
            "overwrite": overwrite,
        });
        self.transport
            .post(&self.url(&self.endpoints.enqueue_ingestion), &payload)
    }

    /// Raw status snapshot body for one memory bank. `budget` bounds the
    /// request below the transport's own timeout.
    pub fn ingestion_progress(
        &self,
        memory_bank: &MemoryBankName,
        budget: Option<Duration>,
    ) -> Result<String, TransportError> {
        let url = self.url(&self.endpoints.ingestion_progress);
        let params = [("memorybank", memory_bank.as_str().to_string())];
        match budget {
            Some(budget) => self.transport.get_within(&url, &params, budget),
            None => self.transport.get(&url, &params),
        }
    }

    /// Raw semantic-search body.
    pub fn semantic_query(&self, query: &RetrievalQuery) -> Result<String, TransportError> {
        self.transport
            .get(&self.url(&self.endpoints.semantic_query), &query.params())
    }
}
