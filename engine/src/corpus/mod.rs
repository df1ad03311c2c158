//! Local document corpus
//!
//! The corpus is a fixed, ordered collection of documents loaded once at
//! startup and shared read-only between runs. Iteration order matters: the
//! retriever breaks score ties by corpus order.
//!
//! A corpus file is either a JSON array of documents or a TOML file with a
//! `[[documents]]` table array:
//!
//! ```toml
//! [[documents]]
//! id = "doc1"
//! source = "ReactJS Official Docs"
//! content = "React is a JavaScript library for building user interfaces."
//! ```

use sdk::errors::EngineError;
use sdk::types::Document;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Corpus file picked up from the data directory when none is configured
pub const DEFAULT_CORPUS_FILE: &str = "corpus.json";

/// Fixed ordered collection of documents
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct CorpusFile {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from documents, validating ids
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Corpus` if the list is empty, an id is blank,
    /// or two documents share an id.
    pub fn from_documents(documents: Vec<Document>) -> Result<Self, EngineError> {
        if documents.is_empty() {
            return Err(EngineError::Corpus("corpus contains no documents".to_string()));
        }

        let mut seen = HashSet::new();
        for doc in &documents {
            if doc.id.trim().is_empty() {
                return Err(EngineError::Corpus(format!(
                    "document from '{}' has an empty id",
                    doc.source
                )));
            }
            if !seen.insert(doc.id.as_str()) {
                return Err(EngineError::Corpus(format!("duplicate id '{}'", doc.id)));
            }
        }

        Ok(Self { documents })
    }

    /// Load a corpus file (`.toml` as TOML, anything else as JSON)
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            EngineError::Corpus(format!("Failed to read corpus file {:?}: {}", path, e))
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let documents = if is_toml {
            toml::from_str::<CorpusFile>(&contents)
                .map_err(|e| EngineError::Corpus(format!("Failed to parse corpus: {}", e)))?
                .documents
        } else {
            serde_json::from_str::<Vec<Document>>(&contents)
                .map_err(|e| EngineError::Corpus(format!("Failed to parse corpus: {}", e)))?
        };

        let corpus = Self::from_documents(documents)?;
        tracing::info!("Loaded {} documents from {:?}", corpus.len(), path);
        Ok(corpus)
    }

    /// Pick the corpus for this installation
    ///
    /// An explicit `path` must load. Otherwise `<data_dir>/corpus.json` is used
    /// if present, and the builtin corpus if not.
    pub fn resolve(path: Option<&Path>, data_dir: &Path) -> Result<Self, EngineError> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let default_path = data_dir.join(DEFAULT_CORPUS_FILE);
        if default_path.exists() {
            return Self::load_from_path(&default_path);
        }

        tracing::debug!("No corpus file found, using builtin corpus");
        Ok(Self::builtin())
    }

    /// The reference corpus shipped with the engine
    pub fn builtin() -> Self {
        Self {
            documents: vec![
                Document::new(
                    "doc1",
                    "ReactJS Official Docs",
                    "React is a JavaScript library for building user interfaces. It uses a component-based architecture, allowing developers to create encapsulated components that manage their own state. State changes trigger re-renders of the component and its children.",
                ),
                Document::new(
                    "doc2",
                    "ReactJS Official Docs",
                    "Hooks are functions that let you \u{201c}hook into\u{201d} React state and lifecycle features from function components. The most common hooks are useState for managing local state and useEffect for performing side effects.",
                ),
                Document::new(
                    "doc3",
                    "Tailwind CSS Docs",
                    "Tailwind CSS is a utility-first CSS framework for rapidly building custom user interfaces. It provides low-level utility classes that let you build completely custom designs without ever leaving your HTML.",
                ),
                Document::new(
                    "doc4",
                    "Gemini API Docs",
                    "The Gemini API provides access to Google's latest generation of large language models. It supports multimodal queries, function calling, and embedded computations for a wide range of applications.",
                ),
                Document::new(
                    "doc5",
                    "General Knowledge Base",
                    "The sky appears blue to the human eye because of a phenomenon called Rayleigh scattering. Short-wavelength blue light is scattered more effectively by the tiny molecules of air in Earth's atmosphere than long-wavelength red light.",
                ),
            ],
        }
    }

    /// Documents in corpus order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a document by id
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }
}
