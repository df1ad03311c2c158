use proptest::prelude::*;
use sdk::errors::{EngineError, RagErrorExt};
use sdk::types::{Phase, RouteDecision};

// User hints are static strings and never echo the wrapped detail
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::Corpus(error_str.clone()),
            EngineError::Gateway(error_str.clone()),
            EngineError::MissingApiKey(error_str.clone()),
            EngineError::KeyringError(error_str.clone()),
            EngineError::Pipeline { phase: "Grading Docs".to_string(), message: error_str.clone() },
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            if error_str.len() > 24 {
                prop_assert!(!hint.contains(&error_str));
            }
        }
    }
}

// Anything other than the three wire names is rejected
proptest! {
    #[test]
    fn test_route_decision_rejects_unknown_names(name in "[a-z_]{1,16}") {
        let parsed = serde_json::from_value::<RouteDecision>(serde_json::Value::String(name.clone()));
        let known = ["direct", "web_search", "vectorstore"].contains(&name.as_str());
        prop_assert_eq!(parsed.is_ok(), known);
    }
}

#[test]
fn test_every_phase_has_label_and_description() {
    let phases = [
        Phase::Idle,
        Phase::Routing,
        Phase::GenerateQueries,
        Phase::Retrieving,
        Phase::Grading,
        Phase::Generating,
        Phase::WebSearch,
        Phase::DirectAnswer,
        Phase::Finished,
    ];
    for phase in phases {
        assert!(!phase.label().is_empty());
        assert!(phase.description().ends_with('.'));
    }
}
