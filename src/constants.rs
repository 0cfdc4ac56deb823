// === Service endpoints ===
pub const DEFAULT_SERVER_URL: &str = "http://localhost:6568";
pub const DEFAULT_LLM_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";

pub const HEALTH_PATH: &str = "/health";
pub const MEMORY_BANKS_PATH: &str = "/api/silk/memorybanks";
pub const ENQUEUE_INGESTION_PATH: &str = "/api/silk/enqueueingestion";
pub const INGESTION_PROGRESS_PATH: &str = "/api/silk/ingestionprogress";
pub const SEMANTIC_QUERY_PATH: &str = "/api/silk/query";

// === HTTP ===
pub const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Whole-body budget for streamed LLM answers.
pub const STREAM_TIMEOUT_SECS: u64 = 900;

// === Ingestion polling ===
pub const POLL_INTERVAL_MS: u64 = 500;
pub const MIN_POLL_INTERVAL_MS: u64 = 50; // floor, never busy-spin
pub const POLL_TIMEOUT_SECS: u64 = 3_600; // 1h

// === Memory bank naming ===
pub const DISAMBIGUATOR_LEN: usize = 5;
pub const DISAMBIGUATOR_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// === Retrieval ===
pub const DEFAULT_QUERY_LIMIT: u32 = 10;
pub const MAX_QUERY_LIMIT: u32 = 50;
pub const RETRIEVAL_MESSAGE: &str = "Retrieving info from database...";

// === Progress indicator ===
pub const SPINNER_TICK_MS: u64 = 100;
pub const SPINNER_FRAMES: [char; 4] = ['-', '\\', '|', '/'];

// === Chat ===
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const HUMAN_SPEAKER: &str = "Human";
pub const AI_SPEAKER: &str = "AI";

// === Prompt templates ===
pub const DEFAULT_RETRIEVAL_TEMPLATE: &str = "Take the user's prompt to create a prompt for a semantic database retriever. Only respond with a list of comma-separated keywords. DO NOT say anything before or after the keywords. User prompt: {message}";
pub const DEFAULT_SYNTHESIS_TEMPLATE: &str = "Use these results from your recipe catalog to form your answer (include the file reference in your answer if you use one)";
pub const MESSAGE_PLACEHOLDER: &str = "{message}";

// === Files ===
pub const CONFIG_FILE: &str = "config.json";
pub const PROMPTS_FILE: &str = "custom_prompts.json";
pub const LOG_FILE: &str = "barq.log";
pub const RETRIEVALS_DIR: &str = "retrievals";
pub const CONVERSATIONS_DIR: &str = "conversations";
