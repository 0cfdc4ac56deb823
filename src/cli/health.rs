use anyhow::{bail, Result};
use barq_client::diagnostics;
use barq_client::llm::ChatBackend;

pub fn run(server_url: Option<&str>) -> Result<()> {
    let config = super::load_config(server_url);
    let client = super::client(&config);
    let llm = super::llm(&config);

    let errors = diagnostics::check_dependencies(&client, Some(llm.as_ref() as &dyn ChatBackend));
    if !errors.is_empty() {
        eprintln!("The following errors occurred:");
        for e in &errors {
            eprintln!("  - {}", e);
        }
        bail!("{} dependency check(s) failed", errors.len());
    }

    println!("Memory bank service: OK ({})", config.server_url);
    println!("LLM backend:         OK ({})", config.llm_url);
    Ok(())
}
