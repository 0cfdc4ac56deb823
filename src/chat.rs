//! Chat turns: retrieve context for a message, then stream an answer
//! synthesised from it.
//!
//! Retrieval degradation does not stop the turn: the answer is produced
//! from an empty context. Rewrite, archive and LLM failures do.

use std::sync::Arc;

use crate::constants::SYSTEM_PROMPT;
use crate::llm::{collect_stream, ChatBackend, ChatMessage};
use crate::memory_bank::MemoryBankName;
use crate::retrieval::{RetrievalPipeline, RetrievalResult};
use crate::storage::{Exchange, PromptProfile};
use crate::BarqResult;

/// Prompt sent to the LLM for the answer.
pub fn synthesis_prompt(template: &str, retrieval: &RetrievalResult, message: &str) -> String {
    format!(
        "{} : RAG_response {}, keywords: {}, original_prompt: {}",
        template,
        retrieval.payload,
        retrieval.keywords(),
        message
    )
}

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub retrieval: RetrievalResult,
    pub answer: String,
}

pub struct ChatSession {
    pipeline: Arc<RetrievalPipeline>,
    backend: Arc<dyn ChatBackend>,
    model: String,
    history: Vec<Exchange>,
}

impl ChatSession {
    pub fn new(pipeline: Arc<RetrievalPipeline>, backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            pipeline,
            backend,
            model: model.into(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Replace the history, e.g. with a loaded conversation.
    pub fn restore(&mut self, history: Vec<Exchange>) {
        self.history = history;
    }

    /// Run one turn. `on_chunk` receives answer fragments as they arrive.
    /// History is only extended when the whole turn succeeds.
    pub fn answer(
        &mut self,
        message: &str,
        memory_bank: &MemoryBankName,
        limit: u32,
        profile: &PromptProfile,
        on_chunk: impl FnMut(&str),
    ) -> BarqResult<ChatTurn> {
        let retrieval = self
            .pipeline
            .retrieve(message, memory_bank, limit, &profile.retrieval_template)?;
        if let Some(failure) = &retrieval.failure {
            tracing::info!(error = %failure, "Answering without retrieved context");
        }

        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(synthesis_prompt(&profile.synthesis_template, &retrieval, message)),
        ];
        let stream = self.backend.chat_stream(&self.model, &messages)?;
        let answer = collect_stream(stream, on_chunk)?;

        self.history.push(Exchange::human(message));
        self.history.push(Exchange::ai(answer.clone()));
        Ok(ChatTurn { retrieval, answer })
    }
}
