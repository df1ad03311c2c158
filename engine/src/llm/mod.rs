//! Inference Gateway Abstraction Layer
//!
//! This module defines the contract between the pipeline and the external
//! inference service. The pipeline needs three kinds of completion:
//!
//! - free text (`complete_text`)
//! - JSON constrained by a response schema (`complete_structured`)
//! - web-grounded text with citations (`complete_grounded`)
//!
//! The gateway is constructed once and injected into the orchestrator, so
//! tests can substitute a scripted double and independent runs can share one
//! HTTP client.
//!
//! Structured output is returned as raw JSON and decoded into a typed value
//! with [`decode`]. A decode failure is an [`LLMError::ParseError`], which
//! every caller treats as recoverable.

use async_trait::async_trait;
use sdk::types::Source;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub mod gemini;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during gateway operations
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LLMError {
    /// Malformed or unparseable model output, as opposed to the service being unreachable
    pub fn is_parse_error(&self) -> bool {
        matches!(self, LLMError::ParseError(_))
    }
}

/// Text answer plus the web citations the service grounded it on
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundedCompletion {
    pub text: String,
    pub citations: Vec<Source>,
}

/// Response schema for structured completion
///
/// Serializes to the OpenAPI subset understood by the Gemini API
/// (`{"type": "OBJECT", "properties": {...}}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseSchema(Value);

impl ResponseSchema {
    /// A string value
    pub fn string(description: &str) -> Self {
        Self(json!({ "type": "STRING", "description": description }))
    }

    /// A string restricted to the given values
    pub fn string_enum(description: &str, values: &[&str]) -> Self {
        Self(json!({ "type": "STRING", "description": description, "enum": values }))
    }

    /// An array whose items follow `items`
    pub fn array_of(description: &str, items: ResponseSchema) -> Self {
        Self(json!({ "type": "ARRAY", "description": description, "items": items.0 }))
    }

    /// An object with the given required properties, in order
    pub fn object(properties: Vec<(&str, ResponseSchema)>) -> Self {
        let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
        let mut props = Map::new();
        for (name, schema) in properties {
            props.insert(name.to_string(), schema.0);
        }
        Self(json!({ "type": "OBJECT", "properties": props, "required": required }))
    }

    /// Raw JSON form
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Inference gateway trait that all providers must implement
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Returns the name of the provider (e.g., "gemini")
    fn name(&self) -> &str;

    /// Unconstrained completion
    async fn complete_text(&self, prompt: &str) -> Result<String>;

    /// Completion constrained to `schema`, returned as parsed JSON
    ///
    /// Callers decode the value with [`decode`]; any mismatch is a `ParseError`.
    async fn complete_structured(&self, prompt: &str, schema: &ResponseSchema) -> Result<Value>;

    /// Web-grounded completion
    async fn complete_grounded(&self, prompt: &str) -> Result<GroundedCompletion>;
}

/// Decode a structured response into a typed value
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| LLMError::ParseError(e.to_string()))
}

/// Parse model text that should be JSON.
///
/// Accepts raw JSON or the body of a markdown code fence
/// (` ```json\n{...}\n``` `), which models occasionally emit even when asked
/// for `application/json`.
pub fn parse_json_payload(text: &str) -> Result<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(inner) = extract_fenced_json(trimmed) {
        if let Ok(value) = serde_json::from_str(inner.trim()) {
            return Ok(value);
        }
    }

    Err(LLMError::ParseError(format!(
        "Response is not valid JSON: {}",
        truncate(trimmed, 200)
    )))
}

/// Extract the body of the first markdown code fence in the text.
///
/// Works even when there is trailing prose after the closing ```.
fn extract_fenced_json(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
