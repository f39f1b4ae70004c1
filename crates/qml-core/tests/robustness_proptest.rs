//! Property tests: translation never fails and sorting stays consistent.

use proptest::prelude::*;

use qml_core::{FlowAnalysis, translate};
use qml_model::{Questionnaire, Transition};

proptest! {
    #[test]
    fn translate_never_panics(input in ".{0,120}") {
        let output = translate(Some(&input));
        prop_assert!(!output.contains("  "));
        prop_assert!(!output.contains('\t'));
    }

    #[test]
    fn translate_handles_expression_like_input(
        input in r"[a-z0-9_ .!=()&|]{0,80}"
    ) {
        let _ = translate(Some(&input));
    }

    #[test]
    fn sorted_order_respects_every_non_loop_edge(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..14)
    ) {
        let uids: Vec<String> = (0..6).map(|n| format!("P{n}")).collect();
        let mut questionnaire = Questionnaire::new();
        for uid in &uids {
            questionnaire.declare_page(uid).unwrap();
        }
        let mut counters = [0usize; 6];
        for (from, to) in &edges {
            let transition =
                Transition::new(counters[*from], uids[*from].as_str(), uids[*to].as_str(), None)
                    .unwrap();
            questionnaire.add_transition(transition).unwrap();
            counters[*from] += 1;
        }
        questionnaire.verify_sources().unwrap();

        let order = questionnaire.topologically_sorted_pages();
        if order.is_empty() {
            prop_assert!(questionnaire.transitions_to_nodes_edges().has_cycle());
        } else {
            prop_assert_eq!(order.len(), uids.len());
            let position = |uid: &str| order.iter().position(|p| p == uid).unwrap();
            for transition in questionnaire.transitions() {
                if !transition.is_self_loop() {
                    prop_assert!(position(&transition.source) < position(&transition.target));
                }
            }
        }
    }
}
