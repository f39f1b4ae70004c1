//! GraphML export of the navigation graph.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use qml_core::{FlowAnalysis, PositionBasis};
use qml_model::Questionnaire;

use crate::common::{GRAPHML_NS, GRAPHML_SCHEMA_LOCATION, XSI_NS, write_data_element, write_key};
use crate::error::Result;

/// Write the navigation graph as GraphML.
///
/// Nodes carry `declared` and, when the graph is acyclic, their topological
/// `position`. Each merged edge carries its `label`, the merged transition
/// indexes and the page distance.
pub fn write_graphml<W: Write>(writer: W, questionnaire: &Questionnaire) -> Result<()> {
    let graph = questionnaire.transitions_to_nodes_edges();
    let positions = questionnaire.page_positions();
    let graph_id = questionnaire.title.as_deref().unwrap_or("questionnaire");

    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("graphml");
    root.push_attribute(("xmlns", GRAPHML_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xsi:schemaLocation", GRAPHML_SCHEMA_LOCATION));
    xml.write_event(Event::Start(root))?;

    write_key(&mut xml, "declared", "node", "boolean")?;
    write_key(&mut xml, "position", "node", "int")?;
    write_key(&mut xml, "label", "edge", "string")?;
    write_key(&mut xml, "transitions", "edge", "string")?;
    write_key(&mut xml, "distance", "edge", "int")?;

    let mut graph_node = BytesStart::new("graph");
    graph_node.push_attribute(("id", graph_id));
    graph_node.push_attribute(("edgedefault", "directed"));
    xml.write_event(Event::Start(graph_node))?;

    for node in graph.graph().node_weights() {
        let mut element = BytesStart::new("node");
        element.push_attribute(("id", node.uid.as_str()));
        xml.write_event(Event::Start(element))?;
        write_data_element(&mut xml, "declared", if node.declared { "true" } else { "false" })?;
        if positions.basis == PositionBasis::Topological
            && let Some(position) = positions.positions.get(&node.uid)
        {
            write_data_element(&mut xml, "position", &position.to_string())?;
        }
        xml.write_event(Event::End(BytesEnd::new("node")))?;
    }

    for (idx, edge) in graph.edges().into_iter().enumerate() {
        let id = format!("e{idx}");
        let mut element = BytesStart::new("edge");
        element.push_attribute(("id", id.as_str()));
        element.push_attribute(("source", edge.source.as_str()));
        element.push_attribute(("target", edge.target.as_str()));
        xml.write_event(Event::Start(element))?;
        if let Some(label) = edge.label.as_deref() {
            write_data_element(&mut xml, "label", label)?;
        }
        let indexes = edge
            .transitions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write_data_element(&mut xml, "transitions", &indexes)?;
        if let Some(distance) = positions.distance(&edge.source, &edge.target) {
            write_data_element(&mut xml, "distance", &distance.to_string())?;
        }
        xml.write_event(Event::End(BytesEnd::new("edge")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("graph")))?;
    xml.write_event(Event::End(BytesEnd::new("graphml")))?;
    xml.into_inner().flush()?;
    Ok(())
}

/// Render the GraphML document into a string.
pub fn graphml_string(questionnaire: &Questionnaire) -> Result<String> {
    let mut buffer = Vec::new();
    write_graphml(&mut buffer, questionnaire)?;
    Ok(String::from_utf8(buffer)?)
}
