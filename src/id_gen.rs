use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::{DISAMBIGUATOR_CHARSET, DISAMBIGUATOR_LEN};

/// Random lowercase alphanumeric suffix for "no-override" memory bank names.
/// Best effort only: nothing checks it against existing banks.
pub fn disambiguator() -> String {
    let mut rng = rand::thread_rng();
    (0..DISAMBIGUATOR_LEN)
        .map(|_| DISAMBIGUATOR_CHARSET[rng.gen_range(0..DISAMBIGUATOR_CHARSET.len())] as char)
        .collect()
}

/// Hyphenated UUID v4, used in archive filenames.
pub fn archive_id() -> String {
    Uuid::new_v4().to_string()
}

/// SHA-256 hex digest of a payload.
pub fn content_digest(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    format!("{:x}", hasher.finalize())
}
