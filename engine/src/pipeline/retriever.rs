//! Lexical retrieval over the local corpus
//!
//! Relevance is approximated by lexical overlap: a document's score is the
//! number of distinct query tokens that occur, case-folded, anywhere in its
//! content. Matching is plain substring containment ("art" matches "start").
//!
//! Tokens are split on whitespace and case-folded; punctuation clinging to a
//! token's edges is trimmed so "useState?" becomes "usestate". Symbol-only
//! suffixes go with it, so "C++" and "C#" both reduce to "c". That loss is
//! accepted: scores count overlap, they do not identify languages.
//!
//! Ranking is deterministic for a fixed corpus and token set: descending
//! score, ties kept in corpus order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::corpus::Corpus;
use sdk::types::Document;

/// A document paired with its overlap score for one retrieval call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    pub score: usize,
}

/// Unique lower-cased whitespace tokens across all variants, in first-seen order
pub fn tokenize<S: AsRef<str>>(variants: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    variants
        .iter()
        .flat_map(|variant| {
            variant
                .as_ref()
                .split_whitespace()
                .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                .filter(|token| !token.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Count of distinct tokens contained in the document's content
///
/// `tokens` must already be lower-cased and unique (see [`tokenize`]).
pub fn lexical_score(document: &Document, tokens: &[String]) -> usize {
    let content = document.content.to_lowercase();
    tokens
        .iter()
        .filter(|token| content.contains(token.as_str()))
        .count()
}

pub struct Retriever {
    corpus: Arc<Corpus>,
    max_documents: usize,
}

impl Retriever {
    pub fn new(corpus: Arc<Corpus>, max_documents: usize) -> Self {
        Self {
            corpus,
            max_documents,
        }
    }

    /// Score every corpus document against `tokens`, keeping those with score >= 1
    ///
    /// Sorted by descending score; the sort is stable so ties stay in corpus order.
    pub fn rank(&self, tokens: &[String]) -> Vec<ScoredDocument<'_>> {
        let mut scored: Vec<ScoredDocument<'_>> = self
            .corpus
            .iter()
            .map(|document| ScoredDocument {
                document,
                score: lexical_score(document, tokens),
            })
            .filter(|scored| scored.score >= 1)
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Top documents for a query variant set
    pub fn retrieve<S: AsRef<str>>(&self, variants: &[S]) -> Vec<Document> {
        let tokens = tokenize(variants);
        self.rank(&tokens)
            .into_iter()
            .take(self.max_documents)
            .map(|scored| scored.document.clone())
            .collect()
    }
}
