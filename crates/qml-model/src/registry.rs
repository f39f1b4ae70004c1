use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::variable::{VarPlace, Variable};

/// Outcome of inserting a variable into a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    Replaced,
    /// The name already existed and `replace` was false.
    Ignored,
}

/// Variables keyed by name, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Variable>", into = "Vec<Variable>")]
pub struct VariableRegistry {
    entries: Vec<Variable>,
    index: HashMap<String, usize>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable by name.
    ///
    /// An existing name is kept untouched unless `replace` is set.
    pub fn add_variable(&mut self, variable: Variable, replace: bool) -> Insertion {
        if let Some(&position) = self.index.get(variable.name()) {
            if !replace {
                debug!(variable = %variable.name(), "variable already registered, keeping first");
                return Insertion::Ignored;
            }
            self.entries[position] = variable;
            return Insertion::Replaced;
        }
        self.index
            .insert(variable.name().to_string(), self.entries.len());
        self.entries.push(variable);
        Insertion::Inserted
    }

    /// Update the place tag of a registered variable in place.
    pub fn set_varplace(&mut self, name: &str, place: VarPlace) -> Result<()> {
        let position = self
            .index
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownVariable {
                name: name.to_string(),
            })?;
        self.entries[position].set_place(place);
        Ok(())
    }

    /// Same as [`set_varplace`](Self::set_varplace), taking the place name.
    pub fn set_varplace_str(&mut self, name: &str, place: &str) -> Result<()> {
        let place = place.parse()?;
        self.set_varplace(name, place)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.entries.iter()
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|variable| variable.name().to_string())
            .collect()
    }

    /// All variables except those only shown in text.
    pub fn list_all_vars(&self) -> Vec<&Variable> {
        self.entries
            .iter()
            .filter(|variable| !variable.is_shown())
            .collect()
    }

    pub fn list_all_shown_vars(&self) -> Vec<&Variable> {
        self.entries
            .iter()
            .filter(|variable| variable.is_shown())
            .collect()
    }

    /// Names present on exactly one side: in this registry or in `used`.
    pub fn list_unused(&self, used: &BTreeSet<String>) -> Vec<String> {
        self.names().symmetric_difference(used).cloned().collect()
    }

    /// Merge another registry into this one with the given replace policy.
    pub fn extend_from(&mut self, other: &VariableRegistry, replace: bool) {
        for variable in other.iter() {
            self.add_variable(variable.clone(), replace);
        }
    }
}

impl From<Vec<Variable>> for VariableRegistry {
    fn from(variables: Vec<Variable>) -> Self {
        let mut registry = Self::new();
        for variable in variables {
            registry.add_variable(variable, false);
        }
        registry
    }
}

impl From<VariableRegistry> for Vec<Variable> {
    fn from(registry: VariableRegistry) -> Self {
        registry.entries
    }
}
