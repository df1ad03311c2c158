use proptest::prelude::*;
use std::sync::Arc;

use adaptive_rag::corpus::Corpus;
use adaptive_rag::orchestrator::{transition, Event, State};
use adaptive_rag::pipeline::{lexical_score, tokenize, Retriever};
use sdk::types::{AnswerResult, Document, RouteDecision};

fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        // Words that occur in the builtin corpus
        prop::sample::select(vec![
            "React", "useState", "hooks", "Tailwind", "CSS", "Gemini", "sky", "blue", "state",
        ])
        .prop_map(str::to_string),
        "[a-zA-Z?!.,]{1,10}",
    ]
}

fn variants() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec(word(), 0..6).prop_map(|words| words.join(" ")),
        1..4,
    )
}

fn corpus_documents() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec("[a-z ]{0,40}", 1..8).prop_map(|contents| {
        contents
            .into_iter()
            .enumerate()
            .map(|(i, content)| Document::new(format!("d{}", i), "Generated", content))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_tokens_are_unique_lowercase_and_non_empty(variants in variants()) {
        let tokens = tokenize(&variants);
        let mut seen = std::collections::HashSet::new();
        for token in &tokens {
            prop_assert!(!token.is_empty());
            prop_assert_eq!(token.clone(), token.to_lowercase());
            prop_assert!(!token.chars().any(char::is_whitespace));
            prop_assert!(seen.insert(token.clone()));
        }
    }

    #[test]
    fn test_retrieval_is_bounded_scored_and_deterministic(
        variants in variants(),
        max_documents in 1..5usize,
    ) {
        let retriever = Retriever::new(Arc::new(Corpus::builtin()), max_documents);
        let tokens = tokenize(&variants);

        let first = retriever.retrieve(&variants);
        let second = retriever.retrieve(&variants);

        prop_assert!(first.len() <= max_documents);
        prop_assert_eq!(&first, &second);
        for doc in &first {
            prop_assert!(lexical_score(doc, &tokens) >= 1);
        }
    }

    #[test]
    fn test_ranking_is_descending_with_corpus_order_ties(
        documents in corpus_documents(),
        variants in variants(),
    ) {
        let corpus = Arc::new(Corpus::from_documents(documents).unwrap());
        let order: Vec<String> = corpus.iter().map(|d| d.id.clone()).collect();
        let retriever = Retriever::new(corpus, usize::MAX);
        let ranked = retriever.rank(&tokenize(&variants));

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                let a = order.iter().position(|id| *id == pair[0].document.id);
                let b = order.iter().position(|id| *id == pair[1].document.id);
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn test_every_route_reaches_finished(
        decision in prop::sample::select(RouteDecision::ALL.to_vec()),
        relevant in 0..4usize,
    ) {
        let (mut state, _) = transition(State::Idle, Event::QueryReceived).unwrap();
        let mut steps = 0;

        while state != State::Finished {
            let event = match state {
                State::Routing => Event::Routed(decision),
                State::GenerateQueries => Event::Expanded,
                State::Retrieving => Event::Retrieved,
                State::Grading => Event::Graded { relevant },
                _ => Event::Answered(AnswerResult::new("answer", Vec::new())),
            };
            state = transition(state, event).unwrap().0;
            steps += 1;
            prop_assert!(steps <= 6);
        }
    }
}
