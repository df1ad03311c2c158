//! Run state machine
//!
//! The control flow of a single run as a pure function of
//! `(state, event) -> (next state, action)`:
//!
//! ```text
//! Idle -> Routing -+-> DirectAnswer ---------------------------------+-> Finished
//!                  +-> WebSearch ------------------------------------+
//!                  +-> GenerateQueries -> Retrieving -> Grading -+-> Generating
//!                                                                +-> WebSearch (nothing relevant)
//! ```
//!
//! Every run starts in `Idle`; the state is owned by the run and discarded
//! with it, so the next query starts from `Idle` again.

use sdk::types::{AnswerResult, Phase, RouteDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
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

impl State {
    /// Phase reported to observers while in this state
    pub fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Routing => Phase::Routing,
            State::GenerateQueries => Phase::GenerateQueries,
            State::Retrieving => Phase::Retrieving,
            State::Grading => Phase::Grading,
            State::Generating => Phase::Generating,
            State::WebSearch => Phase::WebSearch,
            State::DirectAnswer => Phase::DirectAnswer,
            State::Finished => Phase::Finished,
        }
    }
}

/// Outcome of the step that just ran
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    QueryReceived,
    Routed(RouteDecision),
    Expanded,
    Retrieved,
    Graded { relevant: usize },
    Answered(AnswerResult),
}

/// Step the orchestrator must run next
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Route,
    ExpandQuery,
    Retrieve,
    Grade,
    Generate,
    WebSearch,
    DirectAnswer,
    Finish(AnswerResult),
}

#[derive(Debug, thiserror::Error)]
#[error("event {event:?} is not valid in state {state:?}")]
pub struct TransitionError {
    pub state: State,
    pub event: Event,
}

/// Advance the run
pub fn transition(state: State, event: Event) -> Result<(State, Action), TransitionError> {
    let next = match (state, event) {
        (State::Idle, Event::QueryReceived) => (State::Routing, Action::Route),

        (State::Routing, Event::Routed(RouteDecision::Direct)) => {
            (State::DirectAnswer, Action::DirectAnswer)
        }
        (State::Routing, Event::Routed(RouteDecision::WebSearch)) => {
            (State::WebSearch, Action::WebSearch)
        }
        (State::Routing, Event::Routed(RouteDecision::VectorStore)) => {
            (State::GenerateQueries, Action::ExpandQuery)
        }

        (State::GenerateQueries, Event::Expanded) => (State::Retrieving, Action::Retrieve),
        (State::Retrieving, Event::Retrieved) => (State::Grading, Action::Grade),

        (State::Grading, Event::Graded { relevant: 0 }) => (State::WebSearch, Action::WebSearch),
        (State::Grading, Event::Graded { .. }) => (State::Generating, Action::Generate),

        (State::Generating | State::WebSearch | State::DirectAnswer, Event::Answered(answer)) => {
            (State::Finished, Action::Finish(answer))
        }

        (state, event) => return Err(TransitionError { state, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(state: State, event: Event) -> (State, Action) {
        transition(state, event).unwrap()
    }

    #[test]
    fn test_direct_path() {
        let (s, a) = step(State::Idle, Event::QueryReceived);
        assert_eq!((s, a), (State::Routing, Action::Route));

        let (s, a) = step(s, Event::Routed(RouteDecision::Direct));
        assert_eq!((s, a), (State::DirectAnswer, Action::DirectAnswer));

        let answer = AnswerResult::new("Hi!", Vec::new());
        let (s, a) = step(s, Event::Answered(answer.clone()));
        assert_eq!((s, a), (State::Finished, Action::Finish(answer)));
    }

    #[test]
    fn test_vectorstore_path_with_relevant_documents() {
        let (s, _) = step(State::Routing, Event::Routed(RouteDecision::VectorStore));
        assert_eq!(s, State::GenerateQueries);
        let (s, a) = step(s, Event::Expanded);
        assert_eq!((s, a), (State::Retrieving, Action::Retrieve));
        let (s, a) = step(s, Event::Retrieved);
        assert_eq!((s, a), (State::Grading, Action::Grade));
        let (s, a) = step(s, Event::Graded { relevant: 2 });
        assert_eq!((s, a), (State::Generating, Action::Generate));
    }

    #[test]
    fn test_grading_with_nothing_relevant_falls_back_to_web_search() {
        let (s, a) = step(State::Grading, Event::Graded { relevant: 0 });
        assert_eq!((s, a), (State::WebSearch, Action::WebSearch));
    }

    #[test]
    fn test_web_search_route() {
        let (s, a) = step(State::Routing, Event::Routed(RouteDecision::WebSearch));
        assert_eq!((s, a), (State::WebSearch, Action::WebSearch));
    }

    #[test]
    fn test_invalid_events_are_rejected() {
        assert!(transition(State::Idle, Event::Expanded).is_err());
        assert!(transition(State::Retrieving, Event::Graded { relevant: 1 }).is_err());
        assert!(transition(State::Finished, Event::QueryReceived).is_err());
        assert!(transition(
            State::Grading,
            Event::Answered(AnswerResult::new("", Vec::new()))
        )
        .is_err());
    }

    #[test]
    fn test_state_phase_mapping() {
        assert_eq!(State::GenerateQueries.phase(), Phase::GenerateQueries);
        assert_eq!(State::Finished.phase(), Phase::Finished);
    }
}
