use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::registry::{Insertion, VariableRegistry};
use crate::transition::{Source, Transition};
use crate::validate::{normalize_condition, validate_uid};
use crate::variable::Variable;

/// Kind of a header text object, derived from its element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    Title,
    Text,
    Question,
    Instruction,
    Introduction,
    Other,
}

impl HeaderKind {
    /// Map an element local name onto a header kind.
    pub fn from_element(name: &str) -> Self {
        if name.eq_ignore_ascii_case("title") {
            HeaderKind::Title
        } else if name.eq_ignore_ascii_case("text") {
            HeaderKind::Text
        } else if name.eq_ignore_ascii_case("question") {
            HeaderKind::Question
        } else if name.eq_ignore_ascii_case("instruction") {
            HeaderKind::Instruction
        } else if name.eq_ignore_ascii_case("introduction") {
            HeaderKind::Introduction
        } else {
            HeaderKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderKind::Title => "title",
            HeaderKind::Text => "text",
            HeaderKind::Question => "question",
            HeaderKind::Instruction => "instruction",
            HeaderKind::Introduction => "introduction",
            HeaderKind::Other => "other",
        }
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Header text object of a page or question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub uid: String,
    pub index: usize,
    pub kind: HeaderKind,
    pub text: String,
    pub visible: Option<String>,
    pub visible_new: Option<String>,
}

impl Header {
    pub fn new(
        uid: impl Into<String>,
        index: usize,
        kind: HeaderKind,
        text: impl Into<String>,
        visible: Option<&str>,
    ) -> Result<Self> {
        let uid = uid.into();
        validate_uid("header", &uid)?;
        Ok(Self {
            uid,
            index,
            kind,
            text: text.into(),
            visible: normalize_condition(visible),
            visible_new: None,
        })
    }
}

/// Raw trigger element attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub index: usize,
    /// Element local name, e.g. `variable`, `action` or `jsCheck`.
    pub kind: String,
    pub variable: Option<String>,
    pub value: Option<String>,
    pub command: Option<String>,
    pub condition: Option<String>,
}

/// Question element in a page body with its own headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub uid: String,
    pub kind: String,
    pub headers: Vec<Header>,
    pub variables: Vec<String>,
}

impl Question {
    pub fn new(uid: impl Into<String>, kind: impl Into<String>) -> Result<Self> {
        let uid = uid.into();
        validate_uid("question", &uid)?;
        Ok(Self {
            uid,
            kind: kind.into(),
            headers: Vec::new(),
            variables: Vec::new(),
        })
    }
}

/// One navigable page of a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    uid: String,
    /// False for pages synthesized because a transition pointed at them.
    pub declared: bool,
    headers: BTreeMap<usize, Header>,
    questions: Vec<Question>,
    transitions: BTreeMap<usize, Transition>,
    sources: BTreeMap<String, Source>,
    pub variables: VariableRegistry,
    pub duplicate_variables: VariableRegistry,
    triggers: BTreeMap<usize, Trigger>,
}

impl Page {
    pub fn new(uid: impl Into<String>, declared: bool) -> Result<Self> {
        let uid = uid.into();
        validate_uid("page", &uid)?;
        Ok(Self {
            uid,
            declared,
            headers: BTreeMap::new(),
            questions: Vec::new(),
            transitions: BTreeMap::new(),
            sources: BTreeMap::new(),
            variables: VariableRegistry::new(),
            duplicate_variables: VariableRegistry::new(),
            triggers: BTreeMap::new(),
        })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn add_header(&mut self, header: Header) -> Result<()> {
        if self.headers.contains_key(&header.index) {
            return Err(ModelError::DuplicateHeader {
                page: self.uid.clone(),
                index: header.index,
            });
        }
        self.headers.insert(header.index, header);
        Ok(())
    }

    pub fn add_trigger(&mut self, trigger: Trigger) -> Result<()> {
        if self.triggers.contains_key(&trigger.index) {
            return Err(ModelError::DuplicateTrigger {
                page: self.uid.clone(),
                index: trigger.index,
            });
        }
        self.triggers.insert(trigger.index, trigger);
        Ok(())
    }

    pub fn add_question(&mut self, question: Question) -> Result<()> {
        if self.questions.iter().any(|existing| existing.uid == question.uid) {
            return Err(ModelError::DuplicateQuestion {
                page: self.uid.clone(),
                uid: question.uid,
            });
        }
        self.questions.push(question);
        Ok(())
    }

    pub fn add_variable(&mut self, variable: Variable, replace: bool) -> Insertion {
        self.variables.add_variable(variable, replace)
    }

    /// Record a re-encountered variable in the duplicate bucket (last one wins).
    pub fn add_duplicate_variable(&mut self, variable: Variable) -> Insertion {
        self.duplicate_variables.add_variable(variable, true)
    }

    /// Add a variable, redirecting names already present on this page to
    /// the duplicate bucket.
    pub fn add_variable_or_duplicate(&mut self, variable: Variable) -> Insertion {
        if self.variables.contains(variable.name()) {
            debug!(
                page = %self.uid,
                variable = %variable.name(),
                "variable already used on page, recording duplicate"
            );
            return self.add_duplicate_variable(variable);
        }
        self.variables.add_variable(variable, false)
    }

    pub fn headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.values()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Transitions in index order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(&index)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn has_transition(&self, index: usize) -> bool {
        self.transitions.contains_key(&index)
    }

    /// Incoming sources keyed by originating page uid.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    pub fn source(&self, page: &str) -> Option<&Source> {
        self.sources.get(page)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.values()
    }

    pub(crate) fn insert_transition(&mut self, transition: Transition) {
        self.transitions.insert(transition.index, transition);
    }

    pub(crate) fn transitions_mut(&mut self) -> impl Iterator<Item = &mut Transition> {
        self.transitions.values_mut()
    }

    pub(crate) fn insert_source(&mut self, origin: &str, index: usize) {
        let source = self
            .sources
            .entry(origin.to_string())
            .or_insert_with(|| Source::new(origin));
        if !source.transitions.contains(&index) {
            source.transitions.push(index);
            source.transitions.sort_unstable();
        }
    }

    pub(crate) fn clear_sources(&mut self) {
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{VarPlace, VariableType};

    #[test]
    fn duplicate_header_index_is_rejected() {
        let mut page = Page::new("A01", true).unwrap();
        let header = Header::new("q1", 0, HeaderKind::Question, "How old are you?", None).unwrap();
        page.add_header(header.clone()).unwrap();
        let err = page.add_header(header).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateHeader {
                page: "A01".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn duplicate_trigger_index_is_rejected() {
        let mut page = Page::new("A01", true).unwrap();
        let trigger = Trigger {
            index: 0,
            kind: "action".to_string(),
            variable: None,
            value: None,
            command: Some("navigatorBean.reset()".to_string()),
            condition: None,
        };
        page.add_trigger(trigger.clone()).unwrap();
        assert!(page.add_trigger(trigger).is_err());
    }

    #[test]
    fn repeated_variable_goes_to_duplicate_bucket() {
        let mut page = Page::new("A01", true).unwrap();
        let var = Variable::new("v1", VariableType::Boolean)
            .unwrap()
            .with_place(VarPlace::Body);
        assert_eq!(page.add_variable_or_duplicate(var.clone()), Insertion::Inserted);
        assert_eq!(page.add_variable_or_duplicate(var.clone()), Insertion::Inserted);
        assert_eq!(page.add_variable_or_duplicate(var), Insertion::Replaced);
        assert_eq!(page.variables.len(), 1);
        assert_eq!(page.duplicate_variables.len(), 1);
    }

    #[test]
    fn header_kind_from_element_name() {
        assert_eq!(HeaderKind::from_element("instruction"), HeaderKind::Instruction);
        assert_eq!(HeaderKind::from_element("Title"), HeaderKind::Title);
        assert_eq!(HeaderKind::from_element("paragraph"), HeaderKind::Other);
    }
}
