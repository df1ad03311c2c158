//! Adaptive RAG Engine Library
//!
//! This library answers free-text queries by choosing between a direct
//! answer, a grounded web search and retrieval over a local corpus.
//! It is used by both the main binary and integration tests.

/// Command-line interface definitions
pub mod cli;

/// Configuration management module
pub mod config;

/// Local document corpus
pub mod corpus;

/// CLI command handlers
pub mod handlers;

/// Inference gateway abstraction and the Gemini implementation
pub mod llm;

/// Run state machine and orchestrator
pub mod orchestrator;

/// Pipeline stages and the progress channel
pub mod pipeline;

/// Secret management module
pub mod secrets;

/// Telemetry and structured logging
pub mod telemetry;

pub use orchestrator::{Orchestrator, PipelineError, QueryRun};
