use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validate::{normalize_condition, validate_uid};

/// A directed, optionally conditional navigation edge between two pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Position among the transitions of the source page, starting at 0.
    pub index: usize,
    pub source: String,
    pub target: String,
    /// Raw guard expression as written in the markup.
    pub condition: Option<String>,
    /// Readable rendering of `condition`.
    pub condition_new: String,
    /// Topological position of target minus that of source, once known.
    pub distance: Option<i64>,
}

impl Transition {
    pub fn new(
        index: usize,
        source: impl Into<String>,
        target: impl Into<String>,
        condition: Option<&str>,
    ) -> Result<Self> {
        let source = source.into();
        let target = target.into();
        validate_uid("transition source", &source)?;
        validate_uid("transition target", &target)?;
        let condition = normalize_condition(condition);
        let condition_new = condition.clone().unwrap_or_else(|| "true".to_string());
        Ok(Self {
            index,
            source,
            target,
            condition,
            condition_new,
            distance: None,
        })
    }

    /// Attach the readable form of the condition.
    #[must_use]
    pub fn with_translated(mut self, condition_new: impl Into<String>) -> Self {
        self.condition_new = condition_new.into();
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Negative distances mark backward jumps.
    pub fn is_backward(&self) -> bool {
        self.distance.is_some_and(|distance| distance < 0)
    }
}

/// Reverse index entry on a target page: which transitions of one
/// originating page lead here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub page: String,
    /// Transition indexes on `page` whose target is the owning page.
    pub transitions: Vec<usize>,
}

impl Source {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            transitions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconditional_transition_reads_true() {
        let transition = Transition::new(0, "index", "A01", None).unwrap();
        assert!(!transition.is_conditional());
        assert_eq!(transition.condition_new, "true");
        assert_eq!(transition.distance, None);
    }

    #[test]
    fn rejects_empty_target() {
        assert!(Transition::new(0, "index", "", None).is_err());
    }

    #[test]
    fn backward_needs_known_negative_distance() {
        let mut transition = Transition::new(0, "A02", "A01", Some("x == 1")).unwrap();
        assert!(!transition.is_backward());
        transition.distance = Some(-1);
        assert!(transition.is_backward());
    }
}
