//! Ingestion poller: submit a job for a memory bank, then poll its status
//! until the service reports a terminal state.
//!
//! States: Queued -> Running -> {Complete, Failed}. Transitions come only
//! from the service; the client never forces one. Polling waits at least
//! `interval` between queries and gives up after the optional `timeout`.
//! `Failed` and timeouts are errors, never a silent return.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::client::{BarqClient, SubmissionAck};
use crate::config::ClientConfig;
use crate::constants::MIN_POLL_INTERVAL_MS;
use crate::memory_bank::MemoryBankName;
use crate::{BarqError, BarqResult};

/// Timer granularity tolerated when deciding a failed query hit the deadline.
const DEADLINE_SLACK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionState {
    #[serde(alias = "pending")]
    Queued,
    #[serde(alias = "processing")]
    Running,
    #[serde(alias = "completed")]
    Complete,
    #[serde(alias = "error")]
    Failed,
}

impl IngestionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

/// Read-only snapshot fetched on each poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionStatus {
    #[serde(rename = "status")]
    pub state: IngestionState,
    /// Percent in [0, 100].
    #[serde(rename = "progress", default)]
    pub progress_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionJob {
    pub memory_bank: MemoryBankName,
    pub input_path: PathBuf,
    pub overwrite: bool,
}

impl IngestionJob {
    /// `input_path` must already be absolute; resolving it is the caller's job.
    pub fn new(memory_bank: MemoryBankName, input_path: impl Into<PathBuf>, overwrite: bool) -> BarqResult<Self> {
        let input_path = input_path.into();
        check_absolute(&input_path)?;
        Ok(Self {
            memory_bank,
            input_path,
            overwrite,
        })
    }
}

fn check_absolute(path: &Path) -> BarqResult<()> {
    if !path.is_absolute() {
        return Err(BarqError::InvalidInput(format!(
            "input path must be absolute: {}",
            path.display()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOptions {
    /// Minimum delay between two status queries.
    pub interval: Duration,
    /// Upper bound on the whole wait. `None` = unbounded.
    pub timeout: Option<Duration>,
}

impl PollOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            timeout: config.poll_timeout(),
        }
    }
}

#[derive(Clone)]
pub struct IngestionPoller {
    client: BarqClient,
}

impl IngestionPoller {
    pub fn new(client: BarqClient) -> Self {
        Self { client }
    }

    /// Enqueue the job. Transport failures and explicit rejections are
    /// `Submission` errors.
    pub fn submit(&self, job: &IngestionJob) -> BarqResult<SubmissionAck> {
        check_absolute(&job.input_path)?;
        tracing::info!(
            memory_bank = %job.memory_bank,
            input_path = %job.input_path.display(),
            overwrite = job.overwrite,
            "Submitting ingestion"
        );

        let body = self
            .client
            .enqueue_ingestion(&job.memory_bank, &job.input_path, job.overwrite)
            .map_err(|e| BarqError::Submission(e.to_string()))?;

        let ack = parse_ack(&body);
        if !ack.accepted {
            return Err(BarqError::Submission(format!(
                "service rejected ingestion for '{}': {}",
                job.memory_bank,
                body.trim()
            )));
        }
        Ok(ack)
    }

    /// Poll until Complete (Ok) or Failed (Err). `observer` sees every snapshot,
    /// terminal one included.
    pub fn await_completion(
        &self,
        memory_bank: &MemoryBankName,
        options: PollOptions,
        mut observer: impl FnMut(&IngestionStatus),
    ) -> BarqResult<IngestionStatus> {
        let interval = options
            .interval
            .max(Duration::from_millis(MIN_POLL_INTERVAL_MS));
        let started = Instant::now();
        let mut last_progress = 0.0;
        let mut polls = 0u32;

        let timed_out = |polls: u32, last_progress: f64| {
            tracing::error!(
                memory_bank = %memory_bank,
                polls,
                last_progress,
                "Ingestion polling timed out"
            );
            BarqError::IngestionTimeout {
                memory_bank: memory_bank.to_string(),
                elapsed: started.elapsed(),
                last_progress,
            }
        };

        loop {
            if options.timeout.is_some_and(|limit| started.elapsed() >= limit) {
                return Err(timed_out(polls, last_progress));
            }

            let poll_started = Instant::now();
            polls += 1;
            let budget = options
                .timeout
                .map(|limit| limit.saturating_sub(started.elapsed()));
            let status = match self.poll_once(memory_bank, budget) {
                Ok(status) => status,
                Err(e) => {
                    // A query cut short by the remaining budget is a timeout
                    if options
                        .timeout
                        .is_some_and(|limit| started.elapsed() + DEADLINE_SLACK >= limit)
                    {
                        tracing::debug!(error = %e, "Status query hit the polling deadline");
                        return Err(timed_out(polls, last_progress));
                    }
                    tracing::error!(
                        memory_bank = %memory_bank,
                        last_progress,
                        error = %e,
                        "Ingestion status query failed"
                    );
                    return Err(e);
                }
            };

            if status.state == IngestionState::Running && status.progress_percent < last_progress {
                // Monotonicity is the service's contract; only noted here
                tracing::debug!(
                    memory_bank = %memory_bank,
                    previous = last_progress,
                    current = status.progress_percent,
                    "Ingestion progress went backwards"
                );
            }
            last_progress = status.progress_percent;
            observer(&status);

            match status.state {
                IngestionState::Complete => {
                    tracing::info!(memory_bank = %memory_bank, polls, "Ingestion complete");
                    return Ok(status);
                }
                IngestionState::Failed => {
                    tracing::error!(memory_bank = %memory_bank, polls, last_progress, "Ingestion failed");
                    return Err(BarqError::IngestionFailed {
                        memory_bank: memory_bank.to_string(),
                        last_progress,
                    });
                }
                IngestionState::Queued | IngestionState::Running => {}
            }

            let mut wait = interval.saturating_sub(poll_started.elapsed());
            if let Some(limit) = options.timeout {
                wait = wait.min(limit.saturating_sub(started.elapsed()));
            }
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
    }

    /// Submit, then wait on the same memory bank name.
    pub fn ingest(
        &self,
        job: &IngestionJob,
        options: PollOptions,
        observer: impl FnMut(&IngestionStatus),
    ) -> BarqResult<IngestionStatus> {
        self.submit(job)?;
        self.await_completion(&job.memory_bank, options, observer)
    }

    fn poll_once(&self, memory_bank: &MemoryBankName, budget: Option<Duration>) -> BarqResult<IngestionStatus> {
        let body = self.client.ingestion_progress(memory_bank, budget)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Non-JSON or field-less acknowledgements count as accepted: the 2xx status
/// already said so.
fn parse_ack(body: &str) -> SubmissionAck {
    serde_json::from_str(body).unwrap_or_else(|_| SubmissionAck {
        accepted: true,
        extra: serde_json::Map::new(),
    })
}
