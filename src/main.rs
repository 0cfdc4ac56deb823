mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "barq", version, about = "Barq: memory bank ingestion and retrieval client")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a file or directory into a memory bank and wait for completion
    Ingest {
        #[arg(long)]
        memory_bank: String,
        #[arg(long)]
        input_path: String,
        /// Append a random suffix to the memory bank name
        #[arg(long)]
        no_override: bool,
        #[arg(long)]
        server_url: Option<String>,
        /// Give up polling after this many seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
    },
    /// Check the memory bank service and the LLM backend
    Health {
        #[arg(long)]
        server_url: Option<String>,
    },
    /// List memory banks
    Banks {
        #[arg(long)]
        server_url: Option<String>,
    },
    /// List models served by the LLM backend
    Models,
    /// Rewrite a prompt into keywords and query a memory bank
    Retrieve {
        prompt: String,
        #[arg(long)]
        memory_bank: String,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        server_url: Option<String>,
    },
    /// Answer a question from a memory bank
    Ask {
        prompt: String,
        #[arg(long)]
        memory_bank: String,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        server_url: Option<String>,
        /// Continue a saved conversation
        #[arg(long)]
        history: Option<PathBuf>,
        /// Save the conversation afterwards
        #[arg(long)]
        save: bool,
    },
    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },
    /// Inspect saved conversations
    Conversation {
        #[command(subcommand)]
        action: ConversationAction,
    },
    /// Show or change the client configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum PromptsAction {
    /// Show saved templates (or defaults)
    Show,
    /// Save templates
    Save {
        #[arg(long)]
        retrieval: Option<String>,
        #[arg(long)]
        synthesis: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a value (dot notation for endpoints, e.g. endpoints.health)
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum ConversationAction {
    /// Print a saved conversation
    Show { file: PathBuf },
}

fn main() {
    barq_client::tracing_init::init_file_tracing();
    let app = App::parse();

    let result = match app.command {
        Commands::Ingest {
            memory_bank,
            input_path,
            no_override,
            server_url,
            timeout_secs,
        } => cli::ingest::run(
            &memory_bank,
            &input_path,
            no_override,
            server_url.as_deref(),
            timeout_secs,
        ),
        Commands::Health { server_url } => cli::health::run(server_url.as_deref()),
        Commands::Banks { server_url } => cli::banks::list(server_url.as_deref()),
        Commands::Models => cli::banks::models(),
        Commands::Retrieve {
            prompt,
            memory_bank,
            limit,
            model,
            server_url,
        } => cli::retrieve::run(
            &prompt,
            &memory_bank,
            limit,
            model.as_deref(),
            server_url.as_deref(),
        ),
        Commands::Ask {
            prompt,
            memory_bank,
            limit,
            model,
            server_url,
            history,
            save,
        } => cli::chat::ask(cli::chat::AskArgs {
            prompt: &prompt,
            memory_bank: &memory_bank,
            limit,
            model: model.as_deref(),
            server_url: server_url.as_deref(),
            history: history.as_deref(),
            save,
        }),
        Commands::Prompts { action } => match action {
            PromptsAction::Show => cli::prompts::show(),
            PromptsAction::Save { retrieval, synthesis } => {
                cli::prompts::save(retrieval.as_deref(), synthesis.as_deref())
            }
        },
        Commands::Conversation { action } => match action {
            ConversationAction::Show { file } => cli::chat::show(&file),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config::show(),
            ConfigAction::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
