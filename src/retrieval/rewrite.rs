//! Rewrite step: free-form prompt -> compact comma-separated keywords.

use std::sync::Arc;

use crate::constants::MESSAGE_PLACEHOLDER;
use crate::llm::{ChatBackend, ChatMessage};
use crate::{BarqError, BarqResult};

/// Substitute the prompt into the template. Templates without a `{message}`
/// placeholder get the prompt appended.
pub fn render_template(template: &str, prompt: &str) -> String {
    if template.contains(MESSAGE_PLACEHOLDER) {
        template.replace(MESSAGE_PLACEHOLDER, prompt)
    } else {
        format!("{} User prompt: {}", template.trim_end(), prompt)
    }
}

/// Clean an LLM reply into `kw1, kw2, kw3`. `None` if no keyword survives.
pub fn normalize_keywords(reply: &str) -> Option<String> {
    let keywords: Vec<&str> = reply
        .split([',', '\n'])
        .map(|k| k.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        None
    } else {
        Some(keywords.join(", "))
    }
}

#[derive(Clone)]
pub struct QueryRewriter {
    backend: Arc<dyn ChatBackend>,
    model: String,
}

impl QueryRewriter {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Any backend failure or an unusable reply is a `Rewrite` error.
    pub fn rewrite(&self, prompt: &str, template: &str) -> BarqResult<String> {
        if prompt.trim().is_empty() {
            return Err(BarqError::InvalidInput("prompt must not be empty".into()));
        }
        let request = vec![ChatMessage::user(render_template(template, prompt))];
        let reply = self
            .backend
            .chat(&self.model, &request)
            .map_err(|e| BarqError::Rewrite(e.to_string()))?;

        let keywords = normalize_keywords(&reply)
            .ok_or_else(|| BarqError::Rewrite(format!("no keywords in reply: {:?}", reply)))?;
        tracing::info!(model = %self.model, keywords = %keywords, "Prompt rewritten");
        Ok(keywords)
    }
}
