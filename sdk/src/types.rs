//! Domain types shared by the engine and its presentation layers
//!
//! Everything here is created fresh for a single query and discarded once the
//! answer (or a failure) has been delivered. The only long-lived value built
//! from these types is the corpus, which is read-only after startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document in the local corpus
///
/// Identity is by `id`; two documents may share a `source` label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier within the corpus
    pub id: String,

    /// Human-readable source label used for citations
    pub source: String,

    /// Document body
    pub content: String,
}

impl Document {
    /// Create a new document
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            content: content.into(),
        }
    }
}

/// A citation attached to an answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    /// Create a new source
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }

    /// Citation for a corpus document. Local documents have no URI.
    pub fn from_document(doc: &Document) -> Self {
        Self::new(doc.source.clone(), "#")
    }
}

/// Final output of a query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResult {
    /// Answer text as produced by the model
    pub answer: String,

    /// Ordered citations, possibly empty
    pub sources: Vec<Source>,
}

impl AnswerResult {
    /// Create a new answer result
    pub fn new(answer: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            answer: answer.into(),
            sources,
        }
    }

    /// Substitute answer shown to the user when a run fails
    pub fn apology() -> Self {
        Self::new(
            "Sorry, I encountered an error. Please check the logs or try again.",
            Vec::new(),
        )
    }
}

/// Top-level strategy chosen for a query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// Answer without any retrieval
    Direct,

    /// Answer with web-grounded generation
    WebSearch,

    /// Answer from the local corpus
    #[serde(rename = "vectorstore")]
    VectorStore,
}

impl RouteDecision {
    /// All decisions, in the order they are presented to the model
    pub const ALL: [RouteDecision; 3] = [
        RouteDecision::WebSearch,
        RouteDecision::VectorStore,
        RouteDecision::Direct,
    ];

    /// Wire name of the decision
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Direct => "direct",
            RouteDecision::WebSearch => "web_search",
            RouteDecision::VectorStore => "vectorstore",
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline phase reported to observers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    Routing,
    GenerateQueries,
    Retrieving,
    Grading,
    Generating,
    WebSearch,
    DirectAnswer,
    Finished,
}

impl Phase {
    /// Short label for progress logs
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Routing => "Routing Query",
            Phase::GenerateQueries => "Expanding Query",
            Phase::Retrieving => "Retrieving",
            Phase::Grading => "Grading Docs",
            Phase::Generating => "Generating Answer",
            Phase::WebSearch => "Web Search",
            Phase::DirectAnswer => "Direct Answer",
            Phase::Finished => "Finished",
        }
    }

    /// One-line description of what the phase does
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Idle => "Waiting for a new query.",
            Phase::Routing => "Analyze the query to decide the best path.",
            Phase::GenerateQueries => "Create query variations for better retrieval.",
            Phase::Retrieving => "Search the local corpus for relevant documents.",
            Phase::Grading => "Check if retrieved documents are relevant.",
            Phase::Generating => "Synthesize the final answer from documents.",
            Phase::WebSearch => "Use web search for up-to-date info.",
            Phase::DirectAnswer => "Answer directly without retrieval.",
            Phase::Finished => "The answer is ready.",
        }
    }

    /// Whether a run ends in this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single phase-change notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ProgressEvent {
    /// Create an event stamped with the current time
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_decision_wire_names() {
        assert_eq!(
            serde_json::to_string(&RouteDecision::VectorStore).unwrap(),
            "\"vectorstore\""
        );
        assert_eq!(
            serde_json::to_string(&RouteDecision::WebSearch).unwrap(),
            "\"web_search\""
        );
        let direct: RouteDecision = serde_json::from_str("\"direct\"").unwrap();
        assert_eq!(direct, RouteDecision::Direct);
        assert!(serde_json::from_str::<RouteDecision>("\"vector_store\"").is_err());
    }

    #[test]
    fn test_phase_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&Phase::GenerateQueries).unwrap();
        assert_eq!(json, "\"GENERATE_QUERIES\"");
    }

    #[test]
    fn test_source_from_document_uses_placeholder_uri() {
        let doc = Document::new("doc2", "ReactJS Official Docs", "useState");
        let source = Source::from_document(&doc);
        assert_eq!(source.title, "ReactJS Official Docs");
        assert_eq!(source.uri, "#");
    }

    #[test]
    fn test_apology_has_no_sources() {
        let apology = AnswerResult::apology();
        assert!(apology.sources.is_empty());
        assert!(apology.answer.starts_with("Sorry"));
    }

    #[test]
    fn test_only_finished_is_terminal() {
        assert!(Phase::Finished.is_terminal());
        assert!(!Phase::Idle.is_terminal());
        assert!(!Phase::WebSearch.is_terminal());
    }
}
