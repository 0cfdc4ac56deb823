//! Retrieval pipeline: rewrite, query, archive, parse.
//!
//! Failure policy:
//!   - rewrite failure: `Rewrite` error, no network query is made
//!   - query transport failure / unparsable body: degraded empty result
//!   - archive failure: `Storage` error, the result is incomplete
//!
//! The progress indicator runs only around the network call and is stopped
//! on every path before `retrieve` returns.

pub mod rewrite;

use std::fmt;

use serde_json::Value;

use crate::client::BarqClient;
use crate::constants::RETRIEVAL_MESSAGE;
use crate::memory_bank::{check_limit, MemoryBankName, RetrievalQuery};
use crate::progress::SpinnerSettings;
use crate::storage::{ArchivedResponse, ResponseArchiver};
use crate::{BarqResult, TransportError};

pub use rewrite::QueryRewriter;

/// Why a retrieval degraded to an empty result.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalFailure {
    Transport(TransportError),
    Parse(String),
}

impl fmt::Display for RetrievalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{}", e),
            Self::Parse(e) => write!(f, "unparsable response: {}", e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub query: RetrievalQuery,
    /// Parsed service payload; `Null` when degraded.
    pub payload: Value,
    /// Present whenever a body was received.
    pub archive: Option<ArchivedResponse>,
    pub failure: Option<RetrievalFailure>,
}

impl RetrievalResult {
    fn degraded(query: RetrievalQuery, archive: Option<ArchivedResponse>, failure: RetrievalFailure) -> Self {
        Self {
            query,
            payload: Value::Null,
            archive,
            failure: Some(failure),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_null()
    }

    pub fn keywords(&self) -> &str {
        &self.query.keywords
    }
}

pub struct RetrievalPipeline {
    client: BarqClient,
    rewriter: QueryRewriter,
    archiver: ResponseArchiver,
    spinner: SpinnerSettings,
}

impl RetrievalPipeline {
    pub fn new(client: BarqClient, rewriter: QueryRewriter, archiver: ResponseArchiver) -> Self {
        Self {
            client,
            rewriter,
            archiver,
            spinner: SpinnerSettings::default(),
        }
    }

    pub fn with_spinner(mut self, spinner: SpinnerSettings) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn retrieve(
        &self,
        user_prompt: &str,
        memory_bank: &MemoryBankName,
        limit: u32,
        retrieval_template: &str,
    ) -> BarqResult<RetrievalResult> {
        let limit = check_limit(limit)?;
        let keywords = self.rewriter.rewrite(user_prompt, retrieval_template)?;
        let query = RetrievalQuery::new(keywords, memory_bank.clone(), limit)?;

        let mut spinner = self.spinner.start(RETRIEVAL_MESSAGE);
        let outcome = self.fetch(query);
        spinner.stop();
        outcome
    }

    fn fetch(&self, query: RetrievalQuery) -> BarqResult<RetrievalResult> {
        let body = match self.client.semantic_query(&query) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    memory_bank = %query.memory_bank,
                    keywords = %query.keywords,
                    error = %e,
                    "Retrieval failed, returning empty result"
                );
                return Ok(RetrievalResult::degraded(query, None, RetrievalFailure::Transport(e)));
            }
        };

        let archive = self.archiver.archive(body.as_bytes())?;

        match serde_json::from_str::<Value>(&body) {
            Ok(payload) => Ok(RetrievalResult {
                query,
                payload,
                archive: Some(archive),
                failure: None,
            }),
            Err(e) => {
                tracing::warn!(
                    memory_bank = %query.memory_bank,
                    path = %archive.path.display(),
                    error = %e,
                    "Retrieval response is not JSON, returning empty result"
                );
                Ok(RetrievalResult::degraded(
                    query,
                    Some(archive),
                    RetrievalFailure::Parse(e.to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use crate::progress::{CaptureBuffer, ProgressOutput};
    use crate::test_helpers::{network_error, ScriptedChat, ScriptedTransport};
    use crate::BarqError;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        transport: Arc<ScriptedTransport>,
        chat: Arc<ScriptedChat>,
        spinner_out: CaptureBuffer,
        pipeline: RetrievalPipeline,
    }

    fn fixture(chat: ScriptedChat, archive_dir: &Path) -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let chat = Arc::new(chat);
        let spinner_out = CaptureBuffer::new();
        let client = BarqClient::new("http://localhost:6568", Endpoints::default(), transport.clone());
        let pipeline = RetrievalPipeline::new(
            client,
            QueryRewriter::new(chat.clone(), "llama3"),
            ResponseArchiver::new(archive_dir),
        )
        .with_spinner(SpinnerSettings {
            tick: Duration::from_millis(5),
            output: ProgressOutput::Capture(spinner_out.clone()),
        });
        Fixture {
            transport,
            chat,
            spinner_out,
            pipeline,
        }
    }

    fn recipes() -> MemoryBankName {
        MemoryBankName::new("recipes").unwrap()
    }

    fn assert_spinner_cleared(buf: &CaptureBuffer) {
        let expected = format!("\r{}\r", " ".repeat(RETRIEVAL_MESSAGE.len() + 1));
        assert!(buf.contents().ends_with(&expected));
    }

    #[test]
    fn test_chicken_soup_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture(ScriptedChat::replying("chicken, soup, recipe, steps"), dir.path());
        let body = r#"[{"text":"Boil the stock","file":"soups.pdf"}]"#;
        f.transport.push_ok(body);

        let result = f
            .pipeline
            .retrieve("chicken soup steps", &recipes(), 5, "{message}")
            .unwrap();

        let call = &f.transport.calls()[0];
        assert_eq!(call.url, "http://localhost:6568/api/silk/query");
        assert_eq!(call.param("q"), Some("chicken, soup, recipe, steps"));
        assert_eq!(call.param("limit"), Some("5"));
        assert_eq!(call.param("memorybank"), Some("recipes"));

        assert_eq!(result.payload, serde_json::from_str::<Value>(body).unwrap());
        assert!(result.failure.is_none());
        let archive = result.archive.unwrap();
        assert_eq!(std::fs::read_to_string(&archive.path).unwrap(), body);
        assert_spinner_cleared(&f.spinner_out);
    }

    #[test]
    fn test_transport_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture(ScriptedChat::replying("chicken, soup"), dir.path());
        f.transport.push_err(network_error("http://localhost:6568/api/silk/query"));

        let result = f
            .pipeline
            .retrieve("chicken soup", &recipes(), 10, "{message}")
            .unwrap();

        assert!(result.is_empty());
        assert!(matches!(result.failure, Some(RetrievalFailure::Transport(_))));
        assert!(result.archive.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
        assert_spinner_cleared(&f.spinner_out);
    }

    #[test]
    fn test_rewrite_failure_aborts_without_query() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture(ScriptedChat::failing("model not loaded"), dir.path());

        let err = f
            .pipeline
            .retrieve("chicken soup", &recipes(), 10, "{message}")
            .unwrap_err();

        assert!(matches!(err, BarqError::Rewrite(_)));
        assert!(f.transport.calls().is_empty());
        assert_eq!(f.chat.requests().len(), 1);
        // Indicator never started
        assert!(f.spinner_out.is_empty());
    }

    #[test]
    fn test_unparsable_body_is_archived_then_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture(ScriptedChat::replying("soup"), dir.path());
        f.transport.push_ok("<html>oops</html>");

        let result = f.pipeline.retrieve("soup", &recipes(), 3, "{message}").unwrap();

        assert!(result.is_empty());
        assert!(matches!(result.failure, Some(RetrievalFailure::Parse(_))));
        let archive = result.archive.unwrap();
        assert_eq!(std::fs::read_to_string(archive.path).unwrap(), "<html>oops</html>");
        assert_spinner_cleared(&f.spinner_out);
    }

    #[test]
    fn test_archive_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let f = fixture(ScriptedChat::replying("soup"), &blocker.join("retrievals"));
        f.transport.push_ok("[]");

        let err = f.pipeline.retrieve("soup", &recipes(), 3, "{message}").unwrap_err();

        assert!(matches!(err, BarqError::Storage { .. }));
        assert_spinner_cleared(&f.spinner_out);
    }

    #[test]
    fn test_invalid_limit_rejected_before_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture(ScriptedChat::replying("soup"), dir.path());

        let err = f.pipeline.retrieve("soup", &recipes(), 0, "{message}").unwrap_err();

        assert!(matches!(err, BarqError::InvalidInput(_)));
        assert!(f.chat.requests().is_empty());
    }

    #[test]
    fn test_concurrent_retrievals_archive_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture(ScriptedChat::replying("soup"), dir.path());
        f.transport.always(Ok(r#"{"results":[1,2,3]}"#.to_string()));
        let pipeline = Arc::new(f.pipeline);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || {
                    pipeline
                        .retrieve("soup", &recipes(), 3, "{message}")
                        .unwrap()
                        .archive
                        .unwrap()
                        .path
                })
            })
            .collect();
        let mut paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        paths.sort();
        paths.dedup();

        assert_eq!(paths.len(), 8);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 8);
    }
}
