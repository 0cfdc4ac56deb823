use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use barq_client::ingestion::{IngestionJob, IngestionPoller, PollOptions};
use barq_client::memory_bank::MemoryBankName;
use barq_client::storage::path_utils;

/// One-shot ingestion: health check, submit, poll until terminal.
pub fn run(
    memory_bank: &str,
    input_path: &str,
    no_override: bool,
    server_url: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let config = super::load_config(server_url);
    let client = super::client(&config);

    let health = client
        .ensure_healthy()
        .context("Health check failed, not starting ingestion")?;
    println!("Service health: {}", health.status);

    let mut bank = MemoryBankName::new(memory_bank)?;
    if no_override {
        bank = bank.with_disambiguator();
        println!("Using memory bank name: {}", bank);
    }

    let input_path = path_utils::absolute_input_path(input_path)
        .with_context(|| format!("Cannot resolve input path '{}'", input_path))?;
    println!("Using absolute input path: {}", input_path.display());

    let mut options = PollOptions::from_config(&config);
    if let Some(secs) = timeout_secs {
        options.timeout = Some(Duration::from_secs(secs));
    }

    let poller = IngestionPoller::new(client);
    // Source files are never touched, overwriting only replaces the bank
    let job = IngestionJob::new(bank, input_path, true)?;
    let ack = poller.submit(&job)?;
    println!("Ingestion result: {}", serde_json::to_string(&ack)?);

    let mut stdout = std::io::stdout();
    let outcome = poller.await_completion(&job.memory_bank, options, |status| {
        let _ = write!(stdout, "\rIngestion progress: {:.2}% ", status.progress_percent);
        let _ = stdout.flush();
    });
    println!();

    let status = outcome.with_context(|| format!("Ingestion into '{}' did not complete", job.memory_bank))?;
    println!(
        "Ingestion complete! Memory bank '{}' ({:.2}%)",
        job.memory_bank, status.progress_percent
    );
    Ok(())
}
