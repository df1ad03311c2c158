//! Adaptive RAG SDK
//!
//! Shared library providing the domain types and error types used by the
//! engine and by presentation layers that consume its progress stream.

/// Error types and handling
pub mod errors;

/// Documents, answers, route decisions and progress events
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, RagErrorExt};
pub use types::{AnswerResult, Document, Phase, ProgressEvent, RouteDecision, Source};
