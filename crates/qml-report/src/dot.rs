//! DOT rendering for Graphviz and similar flowchart tools.

use qml_core::FlowAnalysis;
use qml_model::Questionnaire;

use crate::common::dot_quote;

/// Render the navigation graph as a DOT digraph.
///
/// Undeclared pages are drawn dashed; edge labels are the merged
/// conditions.
pub fn render_dot(questionnaire: &Questionnaire) -> String {
    let graph = questionnaire.transitions_to_nodes_edges();
    let name = questionnaire.title.as_deref().unwrap_or("questionnaire");

    let mut out = String::new();
    out.push_str(&format!("digraph {} {{\n", dot_quote(name)));
    out.push_str("  node [shape=box];\n");
    for node in graph.graph().node_weights() {
        if node.declared {
            out.push_str(&format!("  {};\n", dot_quote(&node.uid)));
        } else {
            out.push_str(&format!("  {} [style=dashed];\n", dot_quote(&node.uid)));
        }
    }
    for edge in graph.edges() {
        let source = dot_quote(&edge.source);
        let target = dot_quote(&edge.target);
        match edge.label.as_deref() {
            Some(label) => out.push_str(&format!(
                "  {source} -> {target} [label={}];\n",
                dot_quote(label)
            )),
            None => out.push_str(&format!("  {source} -> {target};\n")),
        }
    }
    out.push_str("}\n");
    out
}
