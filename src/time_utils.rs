use chrono::{DateTime, Utc};

/// Retourne le timestamp courant en UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Compact local-time stamp for conversation filenames: `20260101_093000`.
pub fn file_stamp(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&chrono::Local)
        .format("%Y%m%d_%H%M%S")
        .to_string()
}
