//! Relevance Grader
//!
//! Filters retrieved documents down to the ones the model judges relevant.
//! Candidates are keyed by document id, not by source label, so documents
//! that share a label (two pages of the same docs site) are graded
//! independently.
//!
//! Grading fails open: if the response cannot be obtained or decoded, every
//! candidate is kept.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::progress::ProgressSender;
use crate::llm::{decode, InferenceGateway, ResponseSchema};
use sdk::types::{Document, Phase};

#[derive(Debug, Deserialize)]
struct GradingResponse {
    #[serde(default)]
    relevant_sources: Vec<String>,
}

pub struct Grader {
    gateway: Arc<dyn InferenceGateway>,
}

impl Grader {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Keep the candidates judged relevant to `query`, preserving their order
    ///
    /// An empty candidate list returns immediately without a gateway call.
    pub async fn grade(
        &self,
        query: &str,
        documents: Vec<Document>,
        progress: &ProgressSender,
    ) -> Vec<Document> {
        if documents.is_empty() {
            progress.emit(Phase::Grading, "No documents to grade.").await;
            return Vec::new();
        }

        progress
            .emit(
                Phase::Grading,
                format!("Assessing relevance of {} documents...", documents.len()),
            )
            .await;

        let result = self
            .gateway
            .complete_structured(&Self::prompt(query, &documents), &Self::schema())
            .await
            .and_then(decode::<GradingResponse>);

        match result {
            Ok(response) => {
                let relevant = select_relevant(documents, &response.relevant_sources);
                progress
                    .emit(
                        Phase::Grading,
                        format!("Found {} relevant documents.", relevant.len()),
                    )
                    .await;
                relevant
            }
            Err(e) => {
                warn!("Failed to grade documents, keeping all candidates: {}", e);
                progress
                    .emit(
                        Phase::Grading,
                        "Error during grading. Assuming all are relevant.",
                    )
                    .await;
                documents
            }
        }
    }

    fn prompt(query: &str, documents: &[Document]) -> String {
        let listing = documents
            .iter()
            .map(|d| format!("[{}] Source: {}\nContent: {}", d.id, d.source, d.content))
            .collect::<Vec<_>>()
            .join("\n---\n");

        format!(
            "Given the user query and the retrieved documents, identify which documents are \
             relevant to answer the query. Each document starts with its id in square brackets. \
             Return the ids of the relevant documents, without the brackets.\n\n\
             User Query: \"{}\"\n\nDocuments:\n{}",
            query, listing
        )
    }

    fn schema() -> ResponseSchema {
        ResponseSchema::object(vec![(
            "relevant_sources",
            ResponseSchema::array_of(
                "Ids of the provided documents that are relevant.",
                ResponseSchema::string("A document id."),
            ),
        )])
    }
}

/// Filter candidates by the identifiers the model returned.
///
/// An identifier matches a document id. An identifier that matches no id but
/// equals a source label selects every candidate carrying that label.
fn select_relevant(documents: Vec<Document>, identifiers: &[String]) -> Vec<Document> {
    let wanted: HashSet<&str> = identifiers.iter().map(|s| s.trim()).collect();
    let ids: HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    let labels: HashSet<&str> = wanted
        .iter()
        .copied()
        .filter(|w| !ids.contains(w))
        .collect();

    if !labels.is_empty() {
        debug!("Grader returned labels instead of ids: {:?}", labels);
    }

    documents
        .into_iter()
        .filter(|d| wanted.contains(d.id.as_str()) || labels.contains(d.source.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Document> {
        vec![
            Document::new("doc1", "ReactJS Official Docs", "React components"),
            Document::new("doc2", "ReactJS Official Docs", "Hooks like useState"),
            Document::new("doc3", "Tailwind CSS Docs", "Utility classes"),
        ]
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_select_by_id_distinguishes_shared_labels() {
        let relevant = select_relevant(candidates(), &["doc2".to_string()]);
        assert_eq!(ids(&relevant), vec!["doc2"]);
    }

    #[test]
    fn test_select_by_label_keeps_every_match() {
        let relevant = select_relevant(candidates(), &["ReactJS Official Docs".to_string()]);
        assert_eq!(ids(&relevant), vec!["doc1", "doc2"]);
    }

    #[test]
    fn test_select_preserves_candidate_order() {
        let relevant = select_relevant(candidates(), &[" doc3 ".to_string(), "doc1".to_string()]);
        assert_eq!(ids(&relevant), vec!["doc1", "doc3"]);
    }

    #[test]
    fn test_select_ignores_unknown_identifiers() {
        assert!(select_relevant(candidates(), &["doc9".to_string()]).is_empty());
        assert!(select_relevant(candidates(), &[]).is_empty());
    }

    #[test]
    fn test_prompt_tags_documents_with_ids() {
        let prompt = Grader::prompt("What is useState?", &candidates());
        assert!(prompt.contains("[doc2] Source: ReactJS Official Docs\nContent: Hooks like useState"));
        assert_eq!(prompt.matches("\n---\n").count(), 2);
    }

    #[test]
    fn test_missing_field_decodes_as_empty() {
        let response = decode::<GradingResponse>(serde_json::json!({})).unwrap();
        assert!(response.relevant_sources.is_empty());
    }
}
