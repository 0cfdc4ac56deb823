//! Write-then-rename persistence. Readers never observe a partial file.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{BarqError, BarqResult};

/// Atomically write `bytes` to `path`, replacing any existing file.
pub fn write_replace(path: &Path, bytes: &[u8]) -> BarqResult<()> {
    let staged = stage(path, bytes)?;
    staged
        .persist(path)
        .map_err(|e| BarqError::storage(path, e.error))?;
    Ok(())
}

/// Atomically write `bytes` to `path`; fails if `path` already exists.
pub fn write_new(path: &Path, bytes: &[u8]) -> BarqResult<()> {
    let staged = stage(path, bytes)?;
    staged
        .persist_noclobber(path)
        .map_err(|e| BarqError::storage(path, e.error))?;
    Ok(())
}

/// Write the payload to a temp file in the target's directory (same filesystem,
/// so the final rename is a single syscall).
fn stage(path: &Path, bytes: &[u8]) -> BarqResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| BarqError::storage(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| BarqError::storage(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| BarqError::storage(tmp.path(), e))?;
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_replace_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b.json");
        write_replace(&path, b"one").unwrap();
        write_replace(&path, b"two").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");
    }

    #[test]
    fn test_write_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        write_new(&path, b"first").unwrap();
        let err = write_new(&path, b"second").unwrap_err();
        assert!(matches!(err, BarqError::Storage { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        write_new(&dir.path().join("x.json"), b"{}").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
    }
}
