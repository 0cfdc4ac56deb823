use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use barq_client::chat::ChatSession;
use barq_client::memory_bank::MemoryBankName;
use barq_client::storage::{ConversationStore, PromptProfileStore};

pub struct AskArgs<'a> {
    pub prompt: &'a str,
    pub memory_bank: &'a str,
    pub limit: Option<u32>,
    pub model: Option<&'a str>,
    pub server_url: Option<&'a str>,
    pub history: Option<&'a Path>,
    pub save: bool,
}

/// One chat turn: retrieval, streamed answer, optional save of the conversation.
pub fn ask(args: AskArgs<'_>) -> Result<()> {
    let config = super::load_config(args.server_url);
    let limit = config.checked_limit(args.limit)?;
    let model = args.model.unwrap_or(&config.default_model).to_string();
    let bank = MemoryBankName::new(args.memory_bank)?;
    let client = super::healthy_client(&config, "chat")?;
    let profile = super::prompt_profile(
        &PromptProfileStore::new(config.prompts_path()),
        &mut std::io::stdout(),
    )?;

    let llm = super::llm(&config);
    let pipeline = Arc::new(super::pipeline(client, &config, llm.clone(), &model));
    let mut session = ChatSession::new(pipeline, llm, model);

    if let Some(path) = args.history {
        let history = ConversationStore::load(path)
            .with_context(|| format!("Invalid conversation file {}", path.display()))?;
        session.restore(history);
    }

    let mut stdout = std::io::stdout();
    let turn = session.answer(args.prompt, &bank, limit, &profile, |chunk| {
        let _ = write!(stdout, "{}", chunk);
        let _ = stdout.flush();
    })?;
    println!();

    if let Some(archive) = &turn.retrieval.archive {
        println!();
        super::print_archive_notice(&archive.path);
    }
    if let Some(failure) = &turn.retrieval.failure {
        eprintln!("(answered without retrieved context: {})", failure);
    }

    if args.save {
        match ConversationStore::new(config.conversations_dir()).save(session.history())? {
            Some(path) => println!("Conversation saved as {}", path.display()),
            None => println!("No conversation to save."),
        }
    }
    Ok(())
}

pub fn show(path: &Path) -> Result<()> {
    let history = ConversationStore::load(path)
        .with_context(|| format!("Invalid conversation file {}", path.display()))?;
    for exchange in &history {
        println!("{}: {}", exchange.speaker(), exchange.text());
    }
    Ok(())
}
