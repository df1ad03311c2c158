//! Query Expander (RAG fusion)
//!
//! Asks the gateway for paraphrases of the query to widen lexical recall.
//! The original query is always element 0 of the result, so the variant set
//! is never empty even when expansion fails.

use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::progress::ProgressSender;
use crate::llm::{decode, InferenceGateway, ResponseSchema};
use sdk::types::Phase;

#[derive(Debug, Deserialize)]
struct ExpansionResponse {
    queries: Vec<String>,
}

pub struct QueryExpander {
    gateway: Arc<dyn InferenceGateway>,
    variants: usize,
}

impl QueryExpander {
    /// `variants` is the number of paraphrases requested
    pub fn new(gateway: Arc<dyn InferenceGateway>, variants: usize) -> Self {
        Self { gateway, variants }
    }

    /// Produce the query variant set: `[query, paraphrases...]`
    pub async fn expand(&self, query: &str, progress: &ProgressSender) -> Vec<String> {
        progress
            .emit(
                Phase::GenerateQueries,
                "Generating sub-queries for RAG Fusion...",
            )
            .await;

        let result = self
            .gateway
            .complete_structured(&self.prompt(query), &Self::schema())
            .await
            .and_then(decode::<ExpansionResponse>);

        match result {
            Ok(response) => {
                let queries = with_original(query, response.queries, self.variants);
                progress
                    .emit(
                        Phase::GenerateQueries,
                        format!(
                            "Generated {} queries: {}",
                            queries.len(),
                            queries.join(", ")
                        ),
                    )
                    .await;
                queries
            }
            Err(e) => {
                warn!("Failed to generate sub-queries: {}", e);
                progress
                    .emit(
                        Phase::GenerateQueries,
                        "Could not generate sub-queries. Using original query.",
                    )
                    .await;
                vec![query.to_string()]
            }
        }
    }

    fn prompt(&self, query: &str) -> String {
        format!(
            "You are an expert at query expansion. Take the following user query and generate {} \
             different versions of it to improve search retrieval. The queries should be diverse \
             but semantically similar.\n\nOriginal Query: \"{}\"",
            self.variants, query
        )
    }

    fn schema() -> ResponseSchema {
        ResponseSchema::object(vec![(
            "queries",
            ResponseSchema::array_of(
                "Rephrased versions of the original query.",
                ResponseSchema::string("A single rephrased query."),
            ),
        )])
    }
}

/// Prepend the original query to at most `limit` non-blank paraphrases
fn with_original(query: &str, paraphrases: Vec<String>, limit: usize) -> Vec<String> {
    std::iter::once(query.to_string())
        .chain(
            paraphrases
                .into_iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .take(limit),
        )
        .collect()
}
