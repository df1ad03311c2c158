//! Error types and handling
//!
//! This module provides the top-level error type used by the engine outside
//! of a single pipeline run: configuration, corpus loading, secrets and IO.
//! All errors implement the `RagErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never include API keys. Gateway error text is scrubbed
//! before it is wrapped in an `EngineError`.

use thiserror::Error;

/// Trait for engine error extensions
pub trait RagErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// secrets or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors require the user to fix configuration or data first.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RagErrorExt};
///
/// let error = EngineError::Gateway("503 Service Unavailable".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Corpus("duplicate id 'doc1'".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Inference gateway error: {0}")]
    Gateway(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Keyring error: {0}")]
    KeyringError(String),

    #[error("Pipeline failed during {phase}: {message}")]
    Pipeline { phase: String, message: String },
}

impl RagErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Corpus(_) => "Check the corpus file: every document needs a unique id",
            Self::Gateway(_) => "Inference service unavailable. Check your API key and network",
            Self::MissingApiKey(_) => {
                "Set GEMINI_API_KEY or run 'adaptive-rag config set-key'"
            }
            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",
            Self::Pipeline { .. } => "The query could not be answered. Try again",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Corpus(_) | Self::MissingApiKey(_) => false,
            _ => true,
        }
    }
}
