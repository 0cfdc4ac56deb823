pub mod banks;
pub mod chat;
pub mod config;
pub mod health;
pub mod ingest;
pub mod prompts;
pub mod retrieve;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use barq_client::client::BarqClient;
use barq_client::config::ClientConfig;
use barq_client::llm::OllamaBackend;
use barq_client::retrieval::{QueryRewriter, RetrievalPipeline};
use barq_client::storage::{PromptProfile, PromptProfileStore, ResponseArchiver};
use barq_client::transport::HttpTransport;

/// Persisted config with command-line overrides applied.
pub fn load_config(server_url: Option<&str>) -> ClientConfig {
    let mut config = ClientConfig::load();
    if let Some(url) = server_url {
        config.server_url = url.to_string();
    }
    config
}

pub fn client(config: &ClientConfig) -> BarqClient {
    BarqClient::new(
        &config.server_url,
        config.endpoints.clone(),
        Arc::new(HttpTransport::new(config.request_timeout())),
    )
}

/// Client for a workflow that must not start against an unhealthy service.
pub fn healthy_client(config: &ClientConfig, workflow: &str) -> Result<BarqClient> {
    let client = client(config);
    client
        .ensure_healthy()
        .with_context(|| format!("Health check failed, not starting {}", workflow))?;
    Ok(client)
}

pub fn llm(config: &ClientConfig) -> Arc<OllamaBackend> {
    Arc::new(OllamaBackend::new(
        &config.llm_url,
        HttpTransport::new(config.request_timeout()).with_stream_timeout(config.stream_timeout()),
    ))
}

/// Saved prompt profile, or the defaults with a notice on `out`.
pub fn prompt_profile(store: &PromptProfileStore, out: &mut impl Write) -> Result<PromptProfile> {
    let profile = store.load().context("Failed to load prompt profile")?;
    Ok(match profile {
        Some(profile) => profile,
        None => {
            writeln!(out, "No saved prompts found ({}), using defaults.", store.path().display())?;
            PromptProfile::default()
        }
    })
}

/// Retrieval pipeline wired to the service, LLM and archive directory.
pub fn pipeline(
    client: BarqClient,
    config: &ClientConfig,
    llm: Arc<OllamaBackend>,
    model: &str,
) -> RetrievalPipeline {
    RetrievalPipeline::new(
        client,
        QueryRewriter::new(llm, model),
        ResponseArchiver::new(config.retrievals_dir.clone()),
    )
}

const LIGHT_BLUE: &str = "\x1b[94m";
const RESET: &str = "\x1b[0m";

/// Where the raw response of a retrieval went.
pub fn print_archive_notice(path: &std::path::Path) {
    println!("{}Retrieved info has been saved to {}{}", LIGHT_BLUE, path.display(), RESET);
    println!("___");
    println!();
}
