use anyhow::{Context, Result};
use barq_client::config::ClientConfig;
use barq_client::storage::path_utils;

/// `config show`: the effective configuration, defaults included.
pub fn show() -> Result<()> {
    let config = ClientConfig::load();
    println!("# {}", path_utils::config_path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// `config set <key> <value>`: validate, then persist to config.json.
pub fn set(key: &str, value: &str) -> Result<()> {
    let config = ClientConfig::load()
        .with_value(key, value)
        .with_context(|| format!("Cannot set {}", key))?;
    config.save().context("Failed to write config.json")?;
    println!("{} = {}", key, value);
    Ok(())
}
