//! Answer synthesis
//!
//! The three terminal stages of a run. Unlike routing, expansion and grading
//! they have no safe default, so gateway failures are returned to the
//! orchestrator.

use std::sync::Arc;

use super::progress::ProgressSender;
use crate::llm::{InferenceGateway, Result};
use sdk::types::{AnswerResult, Document, Phase, Source};

/// Answers from graded corpus documents
pub struct Generator {
    gateway: Arc<dyn InferenceGateway>,
}

impl Generator {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Answer `query` from `documents`, citing every document supplied as context
    ///
    /// Callers guarantee `documents` is non-empty.
    pub async fn generate(
        &self,
        query: &str,
        documents: &[Document],
        progress: &ProgressSender,
    ) -> Result<AnswerResult> {
        debug_assert!(!documents.is_empty(), "generator needs context documents");

        progress
            .emit(
                Phase::Generating,
                "Synthesizing final answer from documents...",
            )
            .await;

        let answer = self
            .gateway
            .complete_text(&Self::prompt(query, documents))
            .await?;

        progress
            .emit(Phase::Generating, "Final answer generated.")
            .await;

        let sources = documents.iter().map(Source::from_document).collect();
        Ok(AnswerResult::new(answer, sources))
    }

    fn prompt(query: &str, documents: &[Document]) -> String {
        let context = documents
            .iter()
            .map(|d| format!("Source: {}\nContent: {}", d.source, d.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "You are a helpful AI assistant. Based on the provided context documents, answer the \
             user's query. Be concise and cite the sources you used from the context. If the \
             context does not contain the answer, say so.\n\nContext:\n{}\n\nUser Query: \"{}\"",
            context, query
        )
    }
}

/// Answers from the web via grounded completion
pub struct WebSearchFallback {
    gateway: Arc<dyn InferenceGateway>,
}

impl WebSearchFallback {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Sources are exactly the grounding citations reported by the gateway
    pub async fn search(&self, query: &str, progress: &ProgressSender) -> Result<AnswerResult> {
        progress
            .emit(
                Phase::WebSearch,
                format!("Performing web search for: \"{}\"", query),
            )
            .await;

        let prompt = format!(
            "Answer the following user query based on up-to-date information from the web.\n\
             Query: {}",
            query
        );
        let completion = self.gateway.complete_grounded(&prompt).await?;

        progress
            .emit(
                Phase::WebSearch,
                format!(
                    "Web search complete. Found {} sources.",
                    completion.citations.len()
                ),
            )
            .await;

        Ok(AnswerResult::new(completion.text, completion.citations))
    }
}

/// Answers with no retrieval at all
pub struct DirectAnswer {
    gateway: Arc<dyn InferenceGateway>,
}

impl DirectAnswer {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// The raw query is the prompt; sources are always empty
    pub async fn answer(&self, query: &str, progress: &ProgressSender) -> Result<AnswerResult> {
        progress
            .emit(Phase::DirectAnswer, "Generating a direct response...")
            .await;

        let answer = self.gateway.complete_text(query).await?;

        progress
            .emit(Phase::DirectAnswer, "Direct answer generated.")
            .await;

        Ok(AnswerResult::new(answer, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_prompt_includes_every_document() {
        let docs = vec![
            Document::new("doc1", "ReactJS Official Docs", "Components."),
            Document::new("doc3", "Tailwind CSS Docs", "Utilities."),
        ];
        let prompt = Generator::prompt("q", &docs);
        assert!(prompt.contains("Source: ReactJS Official Docs\nContent: Components."));
        assert!(prompt.contains("Source: Tailwind CSS Docs\nContent: Utilities."));
        assert!(prompt.ends_with("User Query: \"q\""));
    }
}
