//! HTTP boundary: thin GET/POST with status-code validation.
//!
//! Any status outside 200-299, and any network-level failure, surfaces as a
//! single `TransportError`. Retry policy belongs to callers.

pub mod http;

use std::time::Duration;

pub use self::http::HttpTransport;
pub use crate::error::TransportError;

/// Abstraction over the wire. `HttpTransport` is the production
/// implementation; tests script responses through the same seam.
pub trait Transport: Send + Sync {
    /// GET `url` with query-string `params`, returning the raw body.
    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError>;

    /// GET bounded by the shorter of `timeout` and the transport's own limit.
    fn get_within(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<String, TransportError>;

    /// POST a JSON `payload` to `url`, returning the raw body.
    fn post(&self, url: &str, payload: &serde_json::Value) -> Result<String, TransportError>;
}

/// Maximum characters of an error body kept in a `TransportError::Status`.
pub(crate) const ERROR_BODY_MAX_CHARS: usize = 512;

pub(crate) fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
