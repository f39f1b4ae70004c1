//! Integration tests for the export formats.

use qml_core::translate;
use qml_model::{Questionnaire, Transition};
use qml_report::{ExportFormat, graphml_string, render_dot, to_json_string, write_export};

fn sample() -> Questionnaire {
    let mut questionnaire = Questionnaire::new().with_title(Some("demo".to_string()));
    for uid in ["index", "A01", "A02"] {
        questionnaire.declare_page(uid).unwrap();
    }
    let edges = [
        (0, "index", "A01", None),
        (0, "A01", "A02", Some("x.value")),
        (1, "A01", "A03", None),
    ];
    for (index, source, target, condition) in edges {
        let transition = Transition::new(index, source, target, condition)
            .unwrap()
            .with_translated(translate(condition));
        questionnaire.add_transition(transition).unwrap();
    }
    questionnaire
}

#[test]
fn dot_marks_undeclared_pages_and_labels_conditions() {
    insta::assert_snapshot!(render_dot(&sample()), @r#"
    digraph "demo" {
      node [shape=box];
      "index";
      "A01";
      "A02";
      "A03" [style=dashed];
      "index" -> "A01";
      "A01" -> "A02" [label="[0] x == 1"];
      "A01" -> "A03";
    }
    "#);
}

#[test]
fn graphml_carries_node_and_edge_data() {
    let xml = graphml_string(&sample()).unwrap();
    let document = roxmltree::Document::parse(&xml).unwrap();
    let root = document.root_element();
    assert_eq!(root.tag_name().name(), "graphml");

    let graph = root
        .children()
        .find(|node| node.has_tag_name((GRAPHML_NS, "graph")))
        .unwrap();
    assert_eq!(graph.attribute("id"), Some("demo"));

    let data = |node: roxmltree::Node<'_, '_>, key: &str| -> Option<String> {
        node.children()
            .find(|child| child.is_element() && child.attribute("key") == Some(key))
            .and_then(|child| child.text().map(str::to_string))
    };

    let nodes: Vec<_> = graph
        .children()
        .filter(|node| node.has_tag_name((GRAPHML_NS, "node")))
        .collect();
    assert_eq!(nodes.len(), 4);
    let a03 = nodes
        .iter()
        .find(|node| node.attribute("id") == Some("A03"))
        .unwrap();
    assert_eq!(data(*a03, "declared").as_deref(), Some("false"));
    assert_eq!(data(*a03, "position").as_deref(), Some("3"));

    let edges: Vec<_> = graph
        .children()
        .filter(|node| node.has_tag_name((GRAPHML_NS, "edge")))
        .collect();
    assert_eq!(edges.len(), 3);
    let conditional = edges
        .iter()
        .find(|edge| edge.attribute("target") == Some("A02"))
        .unwrap();
    assert_eq!(data(*conditional, "label").as_deref(), Some("[0] x == 1"));
    assert_eq!(data(*conditional, "distance").as_deref(), Some("1"));
    let plain = edges
        .iter()
        .find(|edge| edge.attribute("target") == Some("A03"))
        .unwrap();
    assert_eq!(data(*plain, "label"), None);
    assert_eq!(data(*plain, "transitions").as_deref(), Some("1"));
    assert_eq!(data(*plain, "distance").as_deref(), Some("2"));
}

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";

#[test]
fn json_dump_contains_pages_and_translations() {
    let json = to_json_string(&sample()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "demo");
    assert_eq!(value["pages"].as_array().unwrap().len(), 4);
    assert_eq!(value["pages"][1]["uid"], "A01");
    assert_eq!(
        value["pages"][1]["transitions"]["0"]["condition_new"],
        "x == 1"
    );
    assert_eq!(value["pages"][3]["declared"], false);
}

#[test]
fn write_export_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("flow.gv");
    write_export(&path, &sample(), ExportFormat::Dot).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("digraph \"demo\" {"));
}
