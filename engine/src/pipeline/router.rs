//! Query Router
//!
//! Classifies a query into one of the three top-level strategies with a
//! schema-constrained completion. Any failure, whether malformed output or
//! an unreachable gateway, falls back to `vectorstore`: that branch grades its
//! own results and can still fall back to web search.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::progress::ProgressSender;
use crate::llm::{decode, InferenceGateway, ResponseSchema};
use sdk::types::{Phase, RouteDecision};

/// Decision used whenever routing fails
pub const FALLBACK_DECISION: RouteDecision = RouteDecision::VectorStore;

#[derive(Debug, Deserialize)]
struct RouteResponse {
    decision: RouteDecision,
}

pub struct QueryRouter {
    gateway: Arc<dyn InferenceGateway>,
}

impl QueryRouter {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Decide how to answer `query`
    ///
    /// Emits a Routing event before the gateway call and one after it,
    /// including when the fallback is taken.
    pub async fn route(&self, query: &str, progress: &ProgressSender) -> RouteDecision {
        progress
            .emit(Phase::Routing, format!("Analyzing query: \"{}\"", query))
            .await;

        let result = self
            .gateway
            .complete_structured(&Self::prompt(query), &Self::schema())
            .await
            .and_then(decode::<RouteResponse>);

        match result {
            Ok(response) => {
                info!("Routed query to {}", response.decision);
                progress
                    .emit(Phase::Routing, format!("Decision: {}.", response.decision))
                    .await;
                response.decision
            }
            Err(e) => {
                warn!("Failed to route query, defaulting to {}: {}", FALLBACK_DECISION, e);
                progress
                    .emit(
                        Phase::Routing,
                        format!("Error in routing. Defaulting to {}.", FALLBACK_DECISION),
                    )
                    .await;
                FALLBACK_DECISION
            }
        }
    }

    fn prompt(query: &str) -> String {
        format!(
            "Based on the user query, decide the best path to answer it. The options are:\n\
             1. '{web}': For queries about recent events, news, or specific real-time information.\n\
             2. '{store}': For queries about technology topics like React, Tailwind CSS, Gemini API, or general knowledge that might be in a database.\n\
             3. '{direct}': For simple greetings, conversational questions, or questions that don't require external knowledge.\n\n\
             User query: \"{query}\"",
            web = RouteDecision::WebSearch,
            store = RouteDecision::VectorStore,
            direct = RouteDecision::Direct,
            query = query,
        )
    }

    fn schema() -> ResponseSchema {
        let values: Vec<&str> = RouteDecision::ALL.iter().map(|d| d.as_str()).collect();
        ResponseSchema::object(vec![(
            "decision",
            ResponseSchema::string_enum(
                "The chosen path: 'web_search', 'vectorstore', or 'direct'.",
                &values,
            ),
        )])
    }
}
