use anyhow::{Context, Result};
use barq_client::constants::DEFAULT_MODEL;
use barq_client::llm::ChatBackend;

pub fn list(server_url: Option<&str>) -> Result<()> {
    let config = super::load_config(server_url);
    let banks = super::client(&config)
        .memory_banks()
        .context("Failed to fetch memory banks")?;

    if banks.is_empty() {
        println!("No memory banks on {}", config.server_url);
        return Ok(());
    }
    println!("Memory banks on {}:", config.server_url);
    for name in &banks {
        println!("  {}", name);
    }
    Ok(())
}

/// Models served by the LLM backend. Falls back to the default model so the
/// list is never empty.
pub fn models() -> Result<()> {
    let config = super::load_config(None);
    let models = match super::llm(&config).list_models() {
        Ok(m) if !m.is_empty() => m,
        Ok(_) => vec![DEFAULT_MODEL.to_string()],
        Err(e) => {
            eprintln!("Error fetching models: {}", e);
            vec![DEFAULT_MODEL.to_string()]
        }
    };
    for m in &models {
        println!("{}", m);
    }
    Ok(())
}
