//! Tracing initialization: structured logs go to `{data_dir}/barq.log`.
//!
//! Logging to a file keeps stdout free for the spinner line, progress
//! output and streamed answers.

use std::sync::Mutex;

use crate::storage::path_utils;

/// Initialize tracing to barq.log (append mode). `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_file_tracing() {
    use tracing_subscriber::EnvFilter;

    let data_dir = path_utils::data_dir();
    std::fs::create_dir_all(&data_dir).ok();
    let log_path = path_utils::log_path();

    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[barq] Cannot open {}: {} (logging disabled)", log_path.display(), e);
            return;
        }
    };

    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .try_init();
    if result.is_err() {
        // A subscriber is already installed (embedding host); keep theirs
        tracing::debug!("Global tracing subscriber already set");
    }
}
