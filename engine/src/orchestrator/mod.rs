//! Adaptive RAG orchestrator
//!
//! Sequences the pipeline stages for one query. The control path is decided
//! by the pure transition function in [`state`]; this module only runs the
//! action each transition asks for and feeds the outcome back in as an event.
//!
//! Routing, expansion and grading degrade to safe defaults on gateway
//! failures and never abort a run. A failure in a terminal stage (corpus
//! answer, web search, direct answer) ends the run with a [`PipelineError`];
//! callers substitute [`AnswerResult::apology`] for display.
//!
//! An `Orchestrator` holds no per-run state, so one instance can serve any
//! number of concurrent runs.

pub mod state;

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::corpus::Corpus;
use crate::llm::{InferenceGateway, LLMError};
use crate::pipeline::progress::{self, ProgressReceiver, ProgressSender};
use crate::pipeline::{
    DirectAnswer, Generator, Grader, QueryExpander, QueryRouter, Retriever, WebSearchFallback,
};
use sdk::errors::EngineError;
use sdk::types::{AnswerResult, Document, Phase};

pub use state::{transition, Action, Event, State, TransitionError};

/// A run that could not produce an answer
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{phase} failed: {source}")]
    Stage { phase: Phase, source: LLMError },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl PipelineError {
    /// Phase the run was in when it failed
    pub fn phase(&self) -> Phase {
        match self {
            Self::Stage { phase, .. } => *phase,
            Self::Transition(e) => e.state.phase(),
        }
    }
}

impl From<PipelineError> for EngineError {
    fn from(e: PipelineError) -> Self {
        let phase = e.phase().label().to_string();
        let message = match e {
            PipelineError::Stage { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        EngineError::Pipeline { phase, message }
    }
}

/// A run started with [`Orchestrator::spawn`]
pub struct QueryRun {
    /// Progress events in emission order; ends after the last event of the run
    pub events: ProgressReceiver,
    pub handle: JoinHandle<Result<AnswerResult, PipelineError>>,
}

/// Per-run working data threaded between actions
#[derive(Default)]
struct RunContext {
    variants: Vec<String>,
    retrieved: Vec<Document>,
    relevant: Vec<Document>,
}

pub struct Orchestrator {
    router: QueryRouter,
    expander: QueryExpander,
    retriever: Retriever,
    grader: Grader,
    generator: Generator,
    web_search: WebSearchFallback,
    direct: DirectAnswer,
    progress_buffer: usize,
}

impl Orchestrator {
    /// Build the pipeline over a shared corpus and gateway
    pub fn new(
        corpus: Arc<Corpus>,
        gateway: Arc<dyn InferenceGateway>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            router: QueryRouter::new(Arc::clone(&gateway)),
            expander: QueryExpander::new(Arc::clone(&gateway), config.query_variants),
            retriever: Retriever::new(corpus, config.max_documents),
            grader: Grader::new(Arc::clone(&gateway)),
            generator: Generator::new(Arc::clone(&gateway)),
            web_search: WebSearchFallback::new(Arc::clone(&gateway)),
            direct: DirectAnswer::new(gateway),
            progress_buffer: config.progress_buffer,
        }
    }

    /// Answer `query`, reporting progress on `progress`
    ///
    /// The sender is consumed and dropped when the run ends, which closes the
    /// observer's stream.
    pub async fn process_query(
        &self,
        query: &str,
        progress: ProgressSender,
    ) -> Result<AnswerResult, PipelineError> {
        let run_id = Uuid::new_v4();
        let start_time = Instant::now();

        info!("Starting run {}: {}", run_id, query);

        let result = self.execute_run(run_id, query, &progress).await;
        let duration_ms = start_time.elapsed().as_millis();

        match &result {
            Ok(answer) => {
                progress
                    .emit(
                        Phase::Finished,
                        format!("Answer ready with {} source(s).", answer.sources.len()),
                    )
                    .await;
                info!(
                    "Run {} completed in {}ms with {} source(s)",
                    run_id,
                    duration_ms,
                    answer.sources.len()
                );
            }
            Err(e) => {
                error!("Run {} failed after {}ms: {}", run_id, duration_ms, e);
            }
        }

        result
    }

    /// Start `query` on a background task
    ///
    /// Progress can be consumed from [`QueryRun::events`] while the run is in
    /// flight; the result is available from [`QueryRun::handle`].
    pub fn spawn(self: &Arc<Self>, query: impl Into<String>) -> QueryRun {
        let (tx, events) = progress::channel(self.progress_buffer);
        let orchestrator = Arc::clone(self);
        let query = query.into();

        let handle = tokio::spawn(async move { orchestrator.process_query(&query, tx).await });

        QueryRun { events, handle }
    }

    async fn execute_run(
        &self,
        run_id: Uuid,
        query: &str,
        progress: &ProgressSender,
    ) -> Result<AnswerResult, PipelineError> {
        let mut ctx = RunContext::default();
        let (mut state, mut action) = transition(State::Idle, Event::QueryReceived)?;

        loop {
            debug!("Run {} in {:?}, next action {:?}", run_id, state, action);

            let event = match action {
                Action::Route => Event::Routed(self.router.route(query, progress).await),

                Action::ExpandQuery => {
                    ctx.variants = self.expander.expand(query, progress).await;
                    Event::Expanded
                }

                Action::Retrieve => {
                    progress
                        .emit(Phase::Retrieving, "Searching local corpus...")
                        .await;
                    ctx.retrieved = self.retriever.retrieve(&ctx.variants);
                    progress
                        .emit(
                            Phase::Retrieving,
                            format!(
                                "Found {} potentially relevant documents.",
                                ctx.retrieved.len()
                            ),
                        )
                        .await;
                    Event::Retrieved
                }

                Action::Grade => {
                    let candidates = std::mem::take(&mut ctx.retrieved);
                    ctx.relevant = self.grader.grade(query, candidates, progress).await;
                    if ctx.relevant.is_empty() {
                        progress
                            .emit(
                                Phase::Grading,
                                "No relevant documents found in vector store. Falling back to web search.",
                            )
                            .await;
                    }
                    Event::Graded {
                        relevant: ctx.relevant.len(),
                    }
                }

                Action::Generate => Event::Answered(
                    self.generator
                        .generate(query, &ctx.relevant, progress)
                        .await
                        .map_err(|source| stage_failure(state, source))?,
                ),

                Action::WebSearch => Event::Answered(
                    self.web_search
                        .search(query, progress)
                        .await
                        .map_err(|source| stage_failure(state, source))?,
                ),

                Action::DirectAnswer => Event::Answered(
                    self.direct
                        .answer(query, progress)
                        .await
                        .map_err(|source| stage_failure(state, source))?,
                ),

                Action::Finish(answer) => return Ok(answer),
            };

            (state, action) = transition(state, event)?;
        }
    }
}

fn stage_failure(state: State, source: LLMError) -> PipelineError {
    PipelineError::Stage {
        phase: state.phase(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_reports_phase() {
        let e = stage_failure(
            State::WebSearch,
            LLMError::ProviderUnavailable("down".to_string()),
        );
        assert_eq!(e.phase(), Phase::WebSearch);

        let engine: EngineError = e.into();
        match engine {
            EngineError::Pipeline { phase, message } => {
                assert_eq!(phase, Phase::WebSearch.label());
                assert!(message.contains("down"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_transition_error_reports_state_phase() {
        let e: PipelineError = transition(State::Idle, Event::Retrieved).unwrap_err().into();
        assert_eq!(e.phase(), Phase::Idle);
    }
}
