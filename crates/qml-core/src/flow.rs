//! Page navigation graph projected from the transition ledger.
//!
//! The graph is rebuilt from the pages on every query and never edited
//! directly, so it always reflects the current model state.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use qml_model::{Questionnaire, Transition};

/// Node of the navigation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    pub uid: String,
    pub declared: bool,
}

/// All transitions from one page to another, merged into a single edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    /// `None` when the edge is a plain unconditional jump.
    pub label: Option<String>,
    /// Indexes of the merged transitions on the source page.
    pub transitions: Vec<usize>,
}

pub type PageGraph = DiGraph<PageNode, FlowEdge>;

/// Directed graph of page uids with merged, labelled transition edges.
#[derive(Debug, Clone)]
pub struct NavigationGraph {
    graph: PageGraph,
    nodes: HashMap<String, NodeIndex>,
}

impl NavigationGraph {
    /// Project the questionnaire's pages and transitions into a graph.
    pub fn from_questionnaire(questionnaire: &Questionnaire) -> Self {
        let mut graph = PageGraph::new();
        let mut nodes = HashMap::new();
        for page in questionnaire.pages() {
            let index = graph.add_node(PageNode {
                uid: page.uid().to_string(),
                declared: page.declared,
            });
            nodes.insert(page.uid().to_string(), index);
        }
        for page in questionnaire.pages() {
            let Some(&from) = nodes.get(page.uid()) else {
                continue;
            };
            for (target, group) in group_by_target(page.transitions()) {
                let Some(&to) = nodes.get(target) else {
                    warn!(page = %page.uid(), target = %target, "transition target missing from model");
                    continue;
                };
                graph.add_edge(
                    from,
                    to,
                    FlowEdge {
                        source: page.uid().to_string(),
                        target: target.to_string(),
                        label: edge_label(&group),
                        transitions: group.iter().map(|t| t.index).collect(),
                    },
                );
            }
        }
        Self { graph, nodes }
    }

    pub fn graph(&self) -> &PageGraph {
        &self.graph
    }

    pub fn node(&self, uid: &str) -> Option<NodeIndex> {
        self.nodes.get(uid).copied()
    }

    /// Edges in page order, then in order of first transition.
    pub fn edges(&self) -> Vec<&FlowEdge> {
        self.graph.edge_weights().collect()
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&FlowEdge> {
        let from = self.node(source)?;
        let to = self.node(target)?;
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Copy of the graph with self-loops removed.
    fn without_self_loops(&self) -> PageGraph {
        let mut acyclic = self.graph.clone();
        acyclic.retain_edges(|graph, edge| {
            graph
                .edge_endpoints(edge)
                .is_none_or(|(from, to)| from != to)
        });
        acyclic
    }

    /// True when a cycle remains after dropping self-loops.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.without_self_loops())
    }

    /// Topological order of page uids, ignoring self-loops.
    ///
    /// Ties are broken by page order, so the result is deterministic.
    /// Returns `None` when another cycle remains.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        let acyclic = self.without_self_loops();
        let mut in_degree: Vec<usize> = acyclic
            .node_indices()
            .map(|node| {
                acyclic
                    .neighbors_directed(node, Direction::Incoming)
                    .count()
            })
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = acyclic
            .node_indices()
            .filter(|node| in_degree[node.index()] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(acyclic.node_count());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(acyclic[node].uid.clone());
            for next in acyclic.neighbors_directed(node, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        if order.len() < acyclic.node_count() {
            debug!(
                sorted = order.len(),
                total = acyclic.node_count(),
                "navigation graph contains a cycle"
            );
            return None;
        }
        Some(order)
    }
}

/// Group transitions by target, keeping the order of first appearance.
fn group_by_target<'a>(
    transitions: impl Iterator<Item = &'a Transition>,
) -> Vec<(&'a str, Vec<&'a Transition>)> {
    let mut groups: Vec<(&str, Vec<&Transition>)> = Vec::new();
    for transition in transitions {
        match groups
            .iter_mut()
            .find(|(target, _)| *target == transition.target)
        {
            Some((_, group)) => group.push(transition),
            None => groups.push((transition.target.as_str(), vec![transition])),
        }
    }
    groups
}

/// Label for transitions sharing one target.
///
/// Only an unconditional transition in first position contributes nothing.
/// Every other transition adds `[index] condition`, joined with `|`, so an
/// unconditional fallthrough after a conditional one shows as `[n] true`.
fn edge_label(group: &[&Transition]) -> Option<String> {
    let parts: Vec<String> = group
        .iter()
        .enumerate()
        .filter(|(position, transition)| *position > 0 || transition.is_conditional())
        .map(|(_, transition)| format!("[{}] {}", transition.index, transition.condition_new))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// Field used to order listed transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Page order, then transition index.
    #[default]
    Index,
    Distance,
    Source,
    Target,
}

/// Selection of transitions by distance.
///
/// `min_distance` is inclusive and `max_distance` exclusive, so
/// `max_distance = 0` selects backward jumps. Transitions without a known
/// distance only pass a filter without bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionFilter {
    pub min_distance: Option<i64>,
    pub max_distance: Option<i64>,
    pub max_count: Option<usize>,
    pub sort: bool,
    pub sort_key: SortKey,
    pub descending: bool,
}

impl TransitionFilter {
    /// Transitions jumping back to an earlier page.
    pub fn backward() -> Self {
        Self {
            max_distance: Some(0),
            ..Self::default()
        }
    }

    fn accepts(&self, distance: Option<i64>) -> bool {
        if self.min_distance.is_none() && self.max_distance.is_none() {
            return true;
        }
        let Some(distance) = distance else {
            return false;
        };
        self.min_distance.is_none_or(|min| distance >= min)
            && self.max_distance.is_none_or(|max| distance < max)
    }
}

/// Ordering that page positions (and so distances) were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionBasis {
    /// Topological order of the graph without self-loops.
    Topological,
    /// Page order of the model, used when the graph has a cycle.
    PageOrder,
}

/// Position of every page plus the ordering it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePositions {
    pub basis: PositionBasis,
    pub positions: HashMap<String, usize>,
}

impl PagePositions {
    fn from_order<'a>(basis: PositionBasis, order: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            basis,
            positions: order
                .into_iter()
                .enumerate()
                .map(|(position, uid)| (uid.to_string(), position))
                .collect(),
        }
    }

    /// Position of target minus position of source.
    pub fn distance(&self, source: &str, target: &str) -> Option<i64> {
        let from = i64::try_from(*self.positions.get(source)?).ok()?;
        let to = i64::try_from(*self.positions.get(target)?).ok()?;
        Some(to - from)
    }
}

/// Graph-level queries over a questionnaire.
pub trait FlowAnalysis {
    /// Rebuild the navigation graph from the current pages.
    fn transitions_to_nodes_edges(&self) -> NavigationGraph;

    /// Pages in topological order; empty when the graph has a cycle
    /// other than self-loops.
    fn topologically_sorted_pages(&self) -> Vec<String>;

    /// Page positions used for distances: topological when sortable,
    /// page order otherwise.
    fn page_positions(&self) -> PagePositions;

    /// Transitions with freshly computed distances, filtered and sorted.
    fn list_transitions(&self, filter: &TransitionFilter) -> Vec<Transition>;

    /// Store distances on every transition and report the basis used.
    fn update_distances(&mut self) -> PositionBasis;
}

impl FlowAnalysis for Questionnaire {
    fn transitions_to_nodes_edges(&self) -> NavigationGraph {
        NavigationGraph::from_questionnaire(self)
    }

    fn topologically_sorted_pages(&self) -> Vec<String> {
        match self.transitions_to_nodes_edges().topological_order() {
            Some(order) => order,
            None => {
                warn!("page graph is cyclic, no topological order");
                Vec::new()
            }
        }
    }

    fn page_positions(&self) -> PagePositions {
        match self.transitions_to_nodes_edges().topological_order() {
            Some(order) => PagePositions::from_order(
                PositionBasis::Topological,
                order.iter().map(String::as_str),
            ),
            None => PagePositions::from_order(PositionBasis::PageOrder, self.page_uids()),
        }
    }

    fn list_transitions(&self, filter: &TransitionFilter) -> Vec<Transition> {
        let positions = self.page_positions();
        let mut selected: Vec<Transition> = self
            .transitions()
            .map(|transition| {
                let mut transition = transition.clone();
                transition.distance = positions.distance(&transition.source, &transition.target);
                transition
            })
            .filter(|transition| filter.accepts(transition.distance))
            .collect();
        if filter.sort {
            selected.sort_by(|a, b| compare(a, b, filter.sort_key));
            if filter.descending {
                selected.reverse();
            }
        }
        if let Some(max_count) = filter.max_count {
            selected.truncate(max_count);
        }
        selected
    }

    fn update_distances(&mut self) -> PositionBasis {
        let positions = self.page_positions();
        self.assign_distances(|source, target| positions.distance(source, target));
        positions.basis
    }
}

fn compare(a: &Transition, b: &Transition, key: SortKey) -> Ordering {
    match key {
        SortKey::Index => Ordering::Equal,
        SortKey::Distance => a.distance.cmp(&b.distance),
        SortKey::Source => a.source.cmp(&b.source).then(a.index.cmp(&b.index)),
        SortKey::Target => a.target.cmp(&b.target),
    }
}
