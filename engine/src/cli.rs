//! CLI interface for Adaptive RAG
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Adaptive RAG
///
/// Answers questions by routing each query to a direct answer, a grounded
/// web search, or retrieval over a local document corpus.
#[derive(Parser, Debug)]
#[command(name = "adaptive-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a single query and print the progress trace
    Ask {
        /// The question to answer
        query: String,

        /// Hide progress events
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive session, one query per line
    Chat,

    /// Inspect the local corpus
    Corpus {
        #[command(subcommand)]
        action: CorpusAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Corpus actions
#[derive(Subcommand, Debug)]
pub enum CorpusAction {
    /// List the documents available for retrieval
    List,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Store the Gemini API key in the OS keychain
    SetKey,
}
