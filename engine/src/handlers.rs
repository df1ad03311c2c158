//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - ask: Answer one query, streaming progress while it runs
//! - chat: Answer queries read line by line from stdin
//! - corpus list: List the documents available for retrieval
//! - config show / set-key: Inspect configuration and store the API key

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::Config;
use crate::corpus::Corpus;
use crate::llm::gemini::GeminiGateway;
use crate::llm::{InferenceGateway, LLMError};
use crate::orchestrator::Orchestrator;
use crate::secrets::{SecretManager, GEMINI_API_KEY};
use sdk::errors::{EngineError, RagErrorExt};
use sdk::types::{AnswerResult, ProgressEvent};

/// Keychain service name for stored secrets
pub const KEYCHAIN_SERVICE: &str = "adaptive-rag";

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Load the configured corpus
pub fn load_corpus(config: &Config) -> Result<Corpus> {
    Corpus::resolve(config.corpus.path.as_deref(), &config.core.data_dir)
        .context("Failed to load corpus")
}

/// Wire the orchestrator to the configured corpus and Gemini gateway
pub fn build_orchestrator(config: &Config) -> Result<Arc<Orchestrator>> {
    let corpus = Arc::new(load_corpus(config)?);

    let api_key = SecretManager::new(KEYCHAIN_SERVICE)
        .gemini_api_key()
        .map_err(with_hint)?;
    let gateway: Arc<dyn InferenceGateway> = Arc::new(
        GeminiGateway::new(config.llm.gemini.clone(), api_key)
            .map_err(gateway_error)
            .map_err(with_hint)?,
    );

    tracing::debug!(
        "Using {} gateway with {} corpus documents",
        gateway.name(),
        corpus.len()
    );

    Ok(Arc::new(Orchestrator::new(
        corpus,
        gateway,
        config.pipeline.clone(),
    )))
}

/// Answer a single query
pub async fn handle_ask(
    query: String,
    quiet: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    answer_query(&orchestrator, query, quiet, format).await
}

/// Interactive session
///
/// Each line is an independent run against the same orchestrator. `exit`,
/// `quit` or end of input ends the session.
pub async fn handle_chat(config: &Config, format: OutputFormat) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    if let OutputFormat::Text = format {
        println!("Ask a question (type 'exit' to quit).");
    }

    loop {
        if let OutputFormat::Text = format {
            stdout.write_all(b"\n> ").await?;
            stdout.flush().await?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        answer_query(&orchestrator, query.to_string(), false, format).await?;
    }

    Ok(())
}

/// Run one query, printing progress as it arrives and the answer at the end
///
/// A failed run prints the apology answer; the error itself goes to the log
/// and, in JSON mode, to the `error` field.
async fn answer_query(
    orchestrator: &Arc<Orchestrator>,
    query: String,
    quiet: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut run = orchestrator.spawn(query.clone());
    let mut events = Vec::new();

    while let Some(event) = run.events.recv().await {
        if let (OutputFormat::Text, false) = (format, quiet) {
            print_event(&event);
        }
        events.push(event);
    }

    let result = run.handle.await.context("Query task panicked")?;

    let (answer, error) = match result {
        Ok(answer) => (answer, None),
        Err(e) => {
            tracing::warn!("Query failed in {}: {}", e.phase(), e);
            let error: EngineError = e.into();
            (AnswerResult::apology(), Some(error))
        }
    };

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!();
            }
            print_answer(&answer);
        }
        OutputFormat::Json => {
            let status = if error.is_none() { "completed" } else { "failed" };
            let output = json!({
                "status": status,
                "query": query,
                "answer": answer.answer,
                "sources": answer.sources,
                "events": events,
                "error": error.as_ref().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn print_event(event: &ProgressEvent) {
    println!(
        "  {} [{}] {}",
        event.at.format("%H:%M:%S"),
        event.phase.label(),
        event.message
    );
}

fn print_answer(answer: &AnswerResult) {
    println!("{}", answer.answer);

    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {} ({})", source.title, source.uri);
        }
    }
}

/// List corpus documents
pub async fn handle_corpus_list(config: &Config, format: OutputFormat) -> Result<()> {
    let corpus = load_corpus(config)?;

    match format {
        OutputFormat::Text => {
            println!("Corpus ({} documents):", corpus.len());
            println!();
            for doc in corpus.iter() {
                println!("  {:<8} {}", doc.id, doc.source);
                println!("           {}", preview(&doc.content, 72));
            }
        }
        OutputFormat::Json => {
            let documents: Vec<_> = corpus.iter().collect();
            let output = json!({
                "documents": documents,
                "count": corpus.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Show the effective configuration
pub async fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    let key_configured = SecretManager::new(KEYCHAIN_SERVICE)
        .gemini_api_key()
        .is_ok();

    match format {
        OutputFormat::Text => {
            let rendered =
                toml::to_string_pretty(config).context("Failed to render configuration")?;
            println!("{}", rendered.trim_end());
            println!();
            println!(
                "# Gemini API key: {}",
                if key_configured {
                    "configured"
                } else {
                    "missing"
                }
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "config": config,
                "api_key_configured": key_configured,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Prompt for the Gemini API key and store it in the keychain
pub async fn handle_config_set_key() -> Result<()> {
    let key = rpassword::prompt_password_stdout("Gemini API key: ")
        .context("Failed to read API key")?;

    SecretManager::new(KEYCHAIN_SERVICE)
        .set_secret(GEMINI_API_KEY, &key)
        .map_err(with_hint)?;

    println!("Stored in keychain.");
    Ok(())
}

fn gateway_error(e: LLMError) -> EngineError {
    EngineError::Gateway(e.to_string())
}

/// Attach the user-facing hint to an engine error
fn with_hint(e: EngineError) -> anyhow::Error {
    let hint = e.user_hint().to_string();
    anyhow::Error::new(e).context(hint)
}
