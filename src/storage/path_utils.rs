use std::path::PathBuf;

use crate::constants;

/// Retourne le repertoire de donnees centralise cross-platform.
/// Linux: ~/.config/barq-client/
/// macOS: ~/Library/Application Support/barq-client/
/// Windows: %APPDATA%/barq-client/
pub fn data_dir() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("barq-client")
}

/// {data_dir}/config.json
pub fn config_path() -> PathBuf {
    data_dir().join(constants::CONFIG_FILE)
}

/// {data_dir}/barq.log
pub fn log_path() -> PathBuf {
    data_dir().join(constants::LOG_FILE)
}

/// Expand ~ to home directory in paths.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

/// Resolve a user-supplied input path to an absolute one (no symlink resolution,
/// the path does not need to exist).
pub fn absolute_input_path(path: &str) -> std::io::Result<PathBuf> {
    std::path::absolute(expand_tilde(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_input_path() {
        let abs = absolute_input_path("/data/pdfs").unwrap();
        assert_eq!(abs, PathBuf::from("/data/pdfs"));

        let rel = absolute_input_path("docs/manuals").unwrap();
        assert!(rel.is_absolute());
        assert!(rel.ends_with("docs/manuals"));
    }

    #[test]
    fn test_data_dir_suffix() {
        assert!(data_dir().ends_with("barq-client"));
        assert!(config_path().ends_with("barq-client/config.json"));
    }
}
