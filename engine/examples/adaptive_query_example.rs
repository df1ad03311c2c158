//! Example answering a few queries with the adaptive RAG pipeline
//!
//! This example shows how to:
//! - Wire the orchestrator to the builtin corpus and the Gemini gateway
//! - Start runs in the background and stream their progress events
//! - Substitute the apology answer when a run fails
//!
//! Prerequisites:
//! - GEMINI_API_KEY must be set (or stored with `adaptive-rag config set-key`)

use adaptive_rag::{
    config::{GeminiConfig, PipelineConfig},
    corpus::Corpus,
    llm::gemini::GeminiGateway,
    orchestrator::Orchestrator,
    secrets::SecretManager,
};
use sdk::types::AnswerResult;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Adaptive RAG Example ===\n");

    let api_key = SecretManager::new("adaptive-rag").gemini_api_key()?;
    let gateway = Arc::new(GeminiGateway::new(GeminiConfig::default(), api_key)?);
    let corpus = Arc::new(Corpus::builtin());

    println!("✓ Gateway ready, {} corpus documents\n", corpus.len());

    let orchestrator = Arc::new(Orchestrator::new(
        corpus,
        gateway,
        PipelineConfig::default(),
    ));

    let queries = [
        "Hello there!",
        "How does useState work in React?",
        "What happened in tech news this week?",
    ];

    for query in queries {
        println!("Query: {}", query);

        let mut run = orchestrator.spawn(query);
        while let Some(event) = run.events.recv().await {
            println!("  [{}] {}", event.phase.label(), event.message);
        }

        let answer = match run.handle.await? {
            Ok(answer) => answer,
            Err(e) => {
                println!("  ✗ {}", e);
                AnswerResult::apology()
            }
        };

        println!("\n{}\n", answer.answer);
        for source in &answer.sources {
            println!("  - {} ({})", source.title, source.uri);
        }
        println!();
    }

    Ok(())
}
