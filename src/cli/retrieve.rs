use anyhow::Result;
use barq_client::memory_bank::MemoryBankName;
use barq_client::storage::PromptProfileStore;

pub fn run(
    prompt: &str,
    memory_bank: &str,
    limit: Option<u32>,
    model: Option<&str>,
    server_url: Option<&str>,
) -> Result<()> {
    let config = super::load_config(server_url);
    let limit = config.checked_limit(limit)?;
    let model = model.unwrap_or(&config.default_model).to_string();
    let bank = MemoryBankName::new(memory_bank)?;
    let client = super::healthy_client(&config, "retrieval")?;
    let profile = super::prompt_profile(
        &PromptProfileStore::new(config.prompts_path()),
        &mut std::io::stdout(),
    )?;

    let pipeline = super::pipeline(client, &config, super::llm(&config), &model);
    let result = pipeline.retrieve(prompt, &bank, limit, &profile.retrieval_template)?;

    println!("Keywords: {}", result.keywords());
    if let Some(archive) = &result.archive {
        super::print_archive_notice(&archive.path);
    }
    match &result.failure {
        Some(failure) => println!("An error occurred: {}", failure),
        None => println!("{}", serde_json::to_string_pretty(&result.payload)?),
    }
    Ok(())
}
