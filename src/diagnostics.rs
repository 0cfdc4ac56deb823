//! Dependency checks run before a workflow starts.
//!
//! Collects every problem instead of stopping at the first, so the user
//! sees the memory bank service and the LLM backend status together.

use crate::client::BarqClient;
use crate::llm::ChatBackend;

/// Human-readable problems; empty when everything answers.
pub fn check_dependencies(client: &BarqClient, llm: Option<&dyn ChatBackend>) -> Vec<String> {
    let mut errors = Vec::new();

    match client.check_health() {
        Ok(health) if health.is_ok() => {}
        Ok(health) => errors.push(format!(
            "Memory bank service at {} is not responding properly (status: {}).",
            client.base_url(),
            health.status
        )),
        Err(e) => errors.push(format!(
            "Memory bank service is not running or installed properly. Error: {}",
            e
        )),
    }

    if let Some(llm) = llm {
        if let Err(e) = llm.list_models() {
            errors.push(format!(
                "LLM backend is not running or installed properly. Error: {}",
                e
            ));
        }
    }

    for e in &errors {
        tracing::warn!(problem = %e, "Dependency check failed");
    }
    errors
}
