//! Memory bank identifiers and the query/listing types built around them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_QUERY_LIMIT;
use crate::{BarqError, BarqResult};

/// Server-side partition key for a document collection. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemoryBankName(String);

impl MemoryBankName {
    pub fn new(name: impl Into<String>) -> BarqResult<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BarqError::InvalidInput(
                "memory bank name must not be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive a name suffixed with a random disambiguator ("no-override" mode).
    /// The derived name is the one that must be used for polling afterwards.
    pub fn with_disambiguator(&self) -> Self {
        Self(format!("{}{}", self.0, crate::id_gen::disambiguator()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemoryBankName {
    type Error = BarqError;

    fn try_from(value: String) -> BarqResult<Self> {
        Self::new(value)
    }
}

impl From<MemoryBankName> for String {
    fn from(name: MemoryBankName) -> Self {
        name.0
    }
}

impl fmt::Display for MemoryBankName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rewritten, compact query ready for the semantic search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalQuery {
    /// Comma-separated keyword list.
    pub keywords: String,
    pub memory_bank: MemoryBankName,
    pub limit: u32,
}

impl RetrievalQuery {
    pub fn new(keywords: impl Into<String>, memory_bank: MemoryBankName, limit: u32) -> BarqResult<Self> {
        Ok(Self {
            keywords: keywords.into(),
            memory_bank,
            limit: check_limit(limit)?,
        })
    }

    /// Query-string parameters in the order the service documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.keywords.clone()),
            ("limit", self.limit.to_string()),
            ("memorybank", self.memory_bank.as_str().to_string()),
        ]
    }
}

/// Result-count limits are positive and capped at `MAX_QUERY_LIMIT`.
pub fn check_limit(limit: u32) -> BarqResult<u32> {
    if limit == 0 || limit > MAX_QUERY_LIMIT {
        return Err(BarqError::InvalidInput(format!(
            "query limit must be within 1..={}, got {}",
            MAX_QUERY_LIMIT, limit
        )));
    }
    Ok(limit)
}

/// One entry of the memory bank listing. Only `name` is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryBankInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of the memory bank listing endpoint. Older servers use `SilkMemoryBanks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryBankList {
    #[serde(rename = "memoryBanks", alias = "SilkMemoryBanks", default)]
    pub memory_banks: Vec<MemoryBankInfo>,
}

impl MemoryBankList {
    /// Names of banks that carry a non-empty name.
    pub fn names(&self) -> Vec<String> {
        self.memory_banks
            .iter()
            .filter_map(|b| b.name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}
