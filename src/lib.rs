//! Barq client: memory bank client core.
//!
//! Talks to a remote ingestion/retrieval service over HTTP: submits
//! ingestion jobs and polls them to completion, rewrites free-form prompts
//! into keyword queries through an LLM, runs semantic search against a
//! memory bank and archives every raw response.

// Foundation
pub mod constants;
pub mod error;
pub mod id_gen;
pub mod time_utils;

// Core types
pub mod config;
pub mod memory_bank;

// Boundaries
pub mod client;
pub mod llm;
pub mod transport;

// Workflows
pub mod chat;
pub mod diagnostics;
pub mod ingestion;
pub mod progress;
pub mod retrieval;

// Sub-systems
pub mod storage;
pub mod tracing_init;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenience
pub use error::{BarqError, BarqResult, TransportError};
