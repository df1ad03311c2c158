//! Pipeline stages
//!
//! Each stage wraps one kind of gateway request (or, for retrieval, a pure
//! scoring pass) and reports its progress on the run's channel. Stages hold
//! only shared, read-only state and can serve concurrent runs.

pub mod answer;
pub mod expander;
pub mod grader;
pub mod progress;
pub mod retriever;
pub mod router;

pub use answer::{DirectAnswer, Generator, WebSearchFallback};
pub use expander::QueryExpander;
pub use grader::Grader;
pub use progress::{ProgressReceiver, ProgressSender};
pub use retriever::{lexical_score, tokenize, Retriever, ScoredDocument};
pub use router::QueryRouter;
