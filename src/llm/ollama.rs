//! Ollama-compatible chat backend (`/api/chat`, `/api/tags`).
//!
//! Streaming replies are newline-delimited JSON objects, each carrying a
//! `message.content` fragment; the last one has `done: true`.

use std::io::BufRead;

use serde::Deserialize;

use super::{ChatBackend, ChatMessage, ChatStream};
use crate::transport::{HttpTransport, Transport};
use crate::{BarqError, BarqResult};

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<ReplyMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct OllamaBackend {
    base_url: String,
    http: HttpTransport,
}

impl OllamaBackend {
    pub fn new(base_url: &str, http: HttpTransport) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn request(model: &str, messages: &[ChatMessage], stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": stream,
        })
    }
}

impl ChatBackend for OllamaBackend {
    fn chat(&self, model: &str, messages: &[ChatMessage]) -> BarqResult<String> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(model = %model, messages = messages.len(), "LLM chat");
        let body = self.http.post(&url, &Self::request(model, messages, false))?;
        let reply: ChatReply = serde_json::from_str(&body)?;
        if let Some(err) = reply.error {
            return Err(BarqError::Llm(err));
        }
        reply
            .message
            .map(|m| m.content)
            .ok_or_else(|| BarqError::Llm("reply carries no message".into()))
    }

    fn chat_stream(&self, model: &str, messages: &[ChatMessage]) -> BarqResult<ChatStream> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(model = %model, messages = messages.len(), "LLM chat (stream)");
        let reader = self.http.post_stream(&url, &Self::request(model, messages, true))?;
        Ok(Box::new(ChunkReader::new(reader)))
    }

    fn list_models(&self) -> BarqResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let body = self.http.get(&url, &[])?;
        let tags: TagList = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Iterator over the content fragments of a newline-delimited JSON reply.
pub struct ChunkReader<R> {
    reader: R,
    finished: bool,
}

impl<R: BufRead> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for ChunkReader<R> {
    type Item = BarqResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(BarqError::Llm(format!("stream read failed: {}", e))));
                }
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply: ChatReply = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(BarqError::Llm(format!("malformed stream chunk: {}", e))));
                }
            };
            if let Some(err) = reply.error {
                self.finished = true;
                return Some(Err(BarqError::Llm(err)));
            }
            self.finished = reply.done;
            match reply.message {
                Some(m) if !m.content.is_empty() => return Some(Ok(m.content)),
                _ => continue,
            }
        }
        None
    }
}
