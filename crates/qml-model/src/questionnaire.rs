use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::page::Page;
use crate::registry::VariableRegistry;
use crate::transition::Transition;

/// How [`Questionnaire::append_other_questionnaire_with`] treats a page uid
/// present in both questionnaires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// The incoming page always wins.
    #[default]
    Replace,
    /// An incoming undeclared placeholder does not overwrite a declared page.
    KeepDeclared,
}

/// Aggregate of all pages and declared variables of one questionnaire.
///
/// Pages keep the order in which they were first declared or referenced.
/// Every transition added through [`Questionnaire::add_transition`] is
/// mirrored by a source entry on its target page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Questionnaire {
    pub file: Option<String>,
    pub title: Option<String>,
    pages: Vec<Page>,
    #[serde(skip)]
    page_index: HashMap<String, usize>,
    pub variables: VariableRegistry,
}

impl Questionnaire {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    fn position(&self, uid: &str) -> Option<usize> {
        self.page_index.get(uid).copied()
    }

    fn push_page(&mut self, page: Page) -> usize {
        let position = self.pages.len();
        self.page_index.insert(page.uid().to_string(), position);
        self.pages.push(page);
        position
    }

    fn ensure_page_position(&mut self, uid: &str) -> Result<usize> {
        if let Some(position) = self.position(uid) {
            return Ok(position);
        }
        debug!(page = %uid, "synthesizing undeclared page");
        let page = Page::new(uid, false)?;
        Ok(self.push_page(page))
    }

    /// Register a page declared in the markup.
    ///
    /// A placeholder created earlier for the same uid is promoted to a
    /// declared page and keeps its incoming sources.
    pub fn declare_page(&mut self, uid: &str) -> Result<&mut Page> {
        match self.position(uid) {
            Some(position) if self.pages[position].declared => Err(ModelError::DuplicatePage {
                uid: uid.to_string(),
            }),
            Some(position) => {
                let page = &mut self.pages[position];
                page.declared = true;
                Ok(page)
            }
            None => {
                let position = self.push_page(Page::new(uid, true)?);
                Ok(&mut self.pages[position])
            }
        }
    }

    /// Return the page with this uid, synthesizing an undeclared one if needed.
    pub fn ensure_page(&mut self, uid: &str) -> Result<&mut Page> {
        let position = self.ensure_page_position(uid)?;
        Ok(&mut self.pages[position])
    }

    /// Insert a fully built page.
    ///
    /// Without `replace` a colliding uid is an error. The source index is
    /// rebuilt afterwards so the inserted page's transitions are mirrored.
    pub fn add_page(&mut self, page: Page, replace: bool) -> Result<()> {
        match self.position(page.uid()) {
            Some(_) if !replace => {
                return Err(ModelError::DuplicatePage {
                    uid: page.uid().to_string(),
                });
            }
            Some(position) => self.pages[position] = page,
            None => {
                self.push_page(page);
            }
        }
        self.rebuild_sources()
    }

    /// Add a transition to its source page and mirror it on the target page.
    ///
    /// The target page is synthesized as undeclared when missing. Nothing is
    /// modified when the transition is rejected.
    pub fn add_transition(&mut self, transition: Transition) -> Result<()> {
        let source_position =
            self.position(&transition.source)
                .ok_or_else(|| ModelError::UnknownPage {
                    uid: transition.source.clone(),
                })?;
        if self.pages[source_position].has_transition(transition.index) {
            return Err(ModelError::DuplicateTransition {
                page: transition.source.clone(),
                index: transition.index,
            });
        }
        let target_position = self.ensure_page_position(&transition.target)?;
        let origin = transition.source.clone();
        let index = transition.index;
        self.pages[source_position].insert_transition(transition);
        self.pages[target_position].insert_source(&origin, index);
        Ok(())
    }

    pub fn page(&self, uid: &str) -> Option<&Page> {
        self.position(uid).map(|position| &self.pages[position])
    }

    pub fn page_mut(&mut self, uid: &str) -> Option<&mut Page> {
        self.position(uid).map(|position| &mut self.pages[position])
    }

    pub fn contains_page(&self, uid: &str) -> bool {
        self.page_index.contains_key(uid)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_uids(&self) -> Vec<&str> {
        self.pages.iter().map(Page::uid).collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All transitions, page by page in index order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.pages.iter().flat_map(Page::transitions)
    }

    pub fn transition_count(&self) -> usize {
        self.pages.iter().map(Page::transition_count).sum()
    }

    /// Resolve the source entries of a page to the transitions they name.
    pub fn incoming(&self, uid: &str) -> Vec<&Transition> {
        let Some(page) = self.page(uid) else {
            return Vec::new();
        };
        page.sources()
            .filter_map(|source| {
                self.page(&source.page)
                    .map(|origin| (origin, &source.transitions))
            })
            .flat_map(|(origin, indexes)| {
                indexes
                    .iter()
                    .filter_map(move |&index| origin.transition(index))
            })
            .collect()
    }

    /// Set every transition's distance from its source and target uids.
    pub fn assign_distances<F>(&mut self, distance: F)
    where
        F: Fn(&str, &str) -> Option<i64>,
    {
        for page in &mut self.pages {
            for transition in page.transitions_mut() {
                transition.distance = distance(&transition.source, &transition.target);
            }
        }
    }

    /// Names of variables referenced on any page.
    pub fn used_variable_names(&self) -> BTreeSet<String> {
        self.pages
            .iter()
            .flat_map(|page| page.variables.iter())
            .map(|variable| variable.name().to_string())
            .collect()
    }

    /// Names of variables only interpolated into displayed text.
    pub fn shown_variable_names(&self) -> BTreeSet<String> {
        self.pages
            .iter()
            .flat_map(|page| page.variables.list_all_shown_vars())
            .map(|variable| variable.name().to_string())
            .collect()
    }

    /// Declared-but-unreferenced and referenced-but-undeclared variable names.
    pub fn find_unused_variables(&self) -> Vec<String> {
        self.variables.list_unused(&self.used_variable_names())
    }

    /// Merge another questionnaire into this one.
    ///
    /// Incoming pages overwrite pages with the same uid and incoming
    /// variables replace existing ones with the same name.
    pub fn append_other_questionnaire(&mut self, other: Questionnaire) -> Result<()> {
        self.append_other_questionnaire_with(other, MergePolicy::Replace)
    }

    /// Merge another questionnaire using an explicit page policy.
    pub fn append_other_questionnaire_with(
        &mut self,
        other: Questionnaire,
        policy: MergePolicy,
    ) -> Result<()> {
        let mut replaced = 0usize;
        let mut added = 0usize;
        let mut kept = 0usize;
        for page in other.pages {
            match self.position(page.uid()) {
                Some(position) => {
                    if policy == MergePolicy::KeepDeclared
                        && !page.declared
                        && self.pages[position].declared
                    {
                        kept += 1;
                        continue;
                    }
                    self.pages[position] = page;
                    replaced += 1;
                }
                None => {
                    self.push_page(page);
                    added += 1;
                }
            }
        }
        self.variables.extend_from(&other.variables, true);
        if self.title.is_none() {
            self.title = other.title;
        }
        info!(added, replaced, kept, ?policy, "merged questionnaire pages");
        self.rebuild_sources()
    }

    /// Recompute every source entry from the transitions.
    fn rebuild_sources(&mut self) -> Result<()> {
        for page in &mut self.pages {
            page.clear_sources();
        }
        let edges: Vec<(String, String, usize)> = self
            .pages
            .iter()
            .flat_map(|page| {
                page.transitions()
                    .map(move |t| (page.uid().to_string(), t.target.clone(), t.index))
            })
            .collect();
        for (origin, target, index) in edges {
            let position = self.ensure_page_position(&target)?;
            self.pages[position].insert_source(&origin, index);
        }
        Ok(())
    }

    /// Check that sources and transitions describe the same edges.
    pub fn verify_sources(&self) -> Result<()> {
        let mut expected: BTreeMap<&str, BTreeMap<&str, Vec<usize>>> = BTreeMap::new();
        for page in &self.pages {
            for transition in page.transitions() {
                expected
                    .entry(transition.target.as_str())
                    .or_default()
                    .entry(page.uid())
                    .or_default()
                    .push(transition.index);
            }
        }
        for page in &self.pages {
            let wanted = expected.remove(page.uid()).unwrap_or_default();
            let actual: BTreeMap<&str, Vec<usize>> = page
                .sources()
                .map(|source| (source.page.as_str(), source.transitions.clone()))
                .collect();
            if wanted != actual {
                return Err(ModelError::InconsistentSources {
                    page: page.uid().to_string(),
                    message: format!("expected {wanted:?}, found {actual:?}"),
                });
            }
        }
        if let Some((target, _)) = expected.into_iter().next() {
            return Err(ModelError::InconsistentSources {
                page: target.to_string(),
                message: "transition target is not a page".to_string(),
            });
        }
        Ok(())
    }
}
