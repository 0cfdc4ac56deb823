//! LLM chat boundary.
//!
//! A chat request is `{model, messages: [{role, content}]}`. The reply comes
//! back either aggregated or as a finite, non-restartable sequence of text
//! chunks that the caller concatenates.

pub mod ollama;

use serde::{Deserialize, Serialize};

use crate::BarqResult;

pub use ollama::OllamaBackend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Lazy sequence of reply chunks. Consumed once.
pub type ChatStream = Box<dyn Iterator<Item = BarqResult<String>> + Send>;

pub trait ChatBackend: Send + Sync {
    /// Single aggregated reply.
    fn chat(&self, model: &str, messages: &[ChatMessage]) -> BarqResult<String>;

    /// Incremental reply.
    fn chat_stream(&self, model: &str, messages: &[ChatMessage]) -> BarqResult<ChatStream>;

    /// Models the backend can serve.
    fn list_models(&self) -> BarqResult<Vec<String>>;
}

/// Drain `stream`, forwarding every chunk to `on_chunk`, and return the
/// concatenated text. The first failing chunk aborts.
pub fn collect_stream(stream: ChatStream, mut on_chunk: impl FnMut(&str)) -> BarqResult<String> {
    let mut reply = String::new();
    for chunk in stream {
        let chunk = chunk?;
        on_chunk(&chunk);
        reply.push_str(&chunk);
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BarqError;

    #[test]
    fn test_collect_stream_concatenates() {
        let stream: ChatStream = Box::new(
            vec![Ok("Sim".to_string()), Ok("mer ".to_string()), Ok("gently".to_string())].into_iter(),
        );
        let mut seen = Vec::new();
        let reply = collect_stream(stream, |c| seen.push(c.to_string())).unwrap();
        assert_eq!(reply, "Simmer gently");
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_collect_stream_stops_on_error() {
        let stream: ChatStream = Box::new(
            vec![
                Ok("partial".to_string()),
                Err(BarqError::Llm("connection reset".into())),
                Ok("never".to_string()),
            ]
            .into_iter(),
        );
        let mut seen = 0;
        assert!(collect_stream(stream, |_| seen += 1).is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
