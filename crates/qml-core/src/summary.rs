use serde::Serialize;

use qml_model::Questionnaire;

use crate::flow::{FlowAnalysis, TransitionFilter};

/// Headline counts for a questionnaire model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionnaireSummary {
    pub title: Option<String>,
    pub pages: usize,
    pub declared_pages: usize,
    pub undeclared_pages: usize,
    pub transitions: usize,
    pub backward_transitions: usize,
    pub self_loops: usize,
    pub declared_variables: usize,
    pub used_variables: usize,
    pub unused_variables: usize,
    pub shown_variables: usize,
    pub sortable: bool,
}

impl QuestionnaireSummary {
    pub fn from_questionnaire(questionnaire: &Questionnaire) -> Self {
        let pages = questionnaire.page_count();
        let declared_pages = questionnaire
            .pages()
            .iter()
            .filter(|page| page.declared)
            .count();
        let sortable = !questionnaire.transitions_to_nodes_edges().has_cycle();
        let backward_transitions = questionnaire
            .list_transitions(&TransitionFilter::backward())
            .len();
        Self {
            title: questionnaire.title.clone(),
            pages,
            declared_pages,
            undeclared_pages: pages - declared_pages,
            transitions: questionnaire.transition_count(),
            backward_transitions,
            self_loops: questionnaire
                .transitions()
                .filter(|transition| transition.is_self_loop())
                .count(),
            declared_variables: questionnaire.variables.len(),
            used_variables: questionnaire.used_variable_names().len(),
            unused_variables: questionnaire.find_unused_variables().len(),
            shown_variables: questionnaire.shown_variable_names().len(),
            sortable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qml_model::Transition;

    #[test]
    fn counts_undeclared_and_backward() {
        let mut questionnaire = Questionnaire::new();
        questionnaire.declare_page("A").unwrap();
        questionnaire.declare_page("B").unwrap();
        questionnaire
            .add_transition(Transition::new(0, "A", "B", None).unwrap())
            .unwrap();
        questionnaire
            .add_transition(Transition::new(0, "B", "B", Some("x.value")).unwrap())
            .unwrap();
        questionnaire
            .add_transition(Transition::new(1, "B", "end", None).unwrap())
            .unwrap();
        let summary = QuestionnaireSummary::from_questionnaire(&questionnaire);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.undeclared_pages, 1);
        assert_eq!(summary.transitions, 3);
        assert_eq!(summary.self_loops, 1);
        assert_eq!(summary.backward_transitions, 0);
        assert!(summary.sortable);
    }
}
