//! End-to-end extraction of small questionnaire documents.

use proptest::prelude::*;

use qml_core::{FlowAnalysis, TransitionFilter};
use qml_ingest::{ExtractOptions, IngestError, Severity, parse_questionnaire};
use qml_model::{HeaderKind, VarPlace};

const LINEAR: &str = r#"<zofar:questionnaire xmlns:zofar="http://www.his.de/zofar/xml/questionnaire" name="linear">
  <zofar:variables>
    <zofar:variable name="age" type="number"/>
    <zofar:variable name="likes" type="boolean"/>
    <zofar:variable name="unused" type="string"/>
  </zofar:variables>
  <zofar:page uid="index">
    <zofar:header>
      <zofar:title uid="t1">Welcome</zofar:title>
      <zofar:text uid="x1" visible="!zofar.isMissing(age)">You are #{age.value}</zofar:text>
    </zofar:header>
    <zofar:transitions>
      <zofar:transition target="A01"/>
    </zofar:transitions>
  </zofar:page>
  <zofar:page uid="A01">
    <zofar:body uid="b">
      <zofar:questionOpen uid="q1" variable="age">
        <zofar:header><zofar:question uid="qh">How old are you?</zofar:question></zofar:header>
      </zofar:questionOpen>
    </zofar:body>
    <zofar:triggers>
      <zofar:variable variable="likes" value="true"/>
    </zofar:triggers>
    <zofar:transitions>
      <zofar:transition target="A02" condition="zofar.isMissing(age)"/>
      <zofar:transition target="A02"/>
    </zofar:transitions>
  </zofar:page>
  <zofar:page uid="A02"/>
</zofar:questionnaire>"#;

fn extract(input: &str) -> qml_ingest::Extraction {
    parse_questionnaire(input, &ExtractOptions::default()).unwrap()
}

#[test]
fn linear_document_is_sorted_without_backward_jumps() {
    let extraction = extract(LINEAR);
    let questionnaire = &extraction.questionnaire;
    assert_eq!(questionnaire.title.as_deref(), Some("linear"));
    assert_eq!(
        questionnaire.topologically_sorted_pages(),
        vec!["index", "A01", "A02"]
    );
    assert!(
        questionnaire
            .list_transitions(&TransitionFilter::backward())
            .is_empty()
    );
    assert!(questionnaire.transitions().all(|t| t.distance == Some(1)));
}

#[test]
fn transitions_are_indexed_and_translated() {
    let extraction = extract(LINEAR);
    let page = extraction.questionnaire.page("A01").unwrap();
    let indexes: Vec<usize> = page.transitions().map(|t| t.index).collect();
    assert_eq!(indexes, vec![0, 1]);
    let first = page.transition(0).unwrap();
    assert_eq!(first.condition.as_deref(), Some("zofar.isMissing(age)"));
    assert_eq!(first.condition_new, "age == MISS");
    assert_eq!(page.transition(1).unwrap().condition_new, "true");

    let target = extraction.questionnaire.page("A02").unwrap();
    assert_eq!(target.source("A01").unwrap().transitions, vec![0, 1]);
}

#[test]
fn merged_label_lists_conditional_transitions() {
    let extraction = extract(LINEAR);
    let graph = extraction.questionnaire.transitions_to_nodes_edges();
    let edge = graph.edge("A01", "A02").unwrap();
    assert_eq!(edge.transitions, vec![0, 1]);
    insta::assert_snapshot!(edge.label.as_deref().unwrap_or("-"), @"[0] age == MISS | [1] true");
}

#[test]
fn variables_are_tagged_by_place() {
    let extraction = extract(LINEAR);
    let questionnaire = &extraction.questionnaire;

    let index = questionnaire.page("index").unwrap();
    assert_eq!(
        index.variables.get("age").and_then(|v| v.place()),
        Some(VarPlace::Shown)
    );
    let a01 = questionnaire.page("A01").unwrap();
    assert_eq!(
        a01.variables.get("age").and_then(|v| v.place()),
        Some(VarPlace::Body)
    );
    assert_eq!(
        a01.variables.get("likes").and_then(|v| v.place()),
        Some(VarPlace::Triggers)
    );
    assert_eq!(questionnaire.find_unused_variables(), vec!["unused"]);
    assert_eq!(
        questionnaire.shown_variable_names().into_iter().collect::<Vec<_>>(),
        vec!["age"]
    );
}

#[test]
fn headers_triggers_and_questions_are_recorded() {
    let extraction = extract(LINEAR);
    let questionnaire = &extraction.questionnaire;

    let headers: Vec<_> = questionnaire.page("index").unwrap().headers().collect();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].kind, HeaderKind::Title);
    assert_eq!(headers[1].text, "You are #{age.value}");
    assert_eq!(headers[1].visible_new.as_deref(), Some("age != MISS"));

    let a01 = questionnaire.page("A01").unwrap();
    let trigger = a01.triggers().next().unwrap();
    assert_eq!(trigger.kind, "variable");
    assert_eq!(trigger.variable.as_deref(), Some("likes"));
    let question = &a01.questions()[0];
    assert_eq!(question.uid, "q1");
    assert_eq!(question.variables, vec!["age"]);
    assert_eq!(question.headers[0].text, "How old are you?");
}

#[test]
fn options_switch_off_optional_parts() {
    let options = ExtractOptions {
        extract_triggers: false,
        extract_headers: false,
        extract_questions: false,
        ..ExtractOptions::default()
    };
    let extraction = parse_questionnaire(LINEAR, &options).unwrap();
    let a01 = extraction.questionnaire.page("A01").unwrap();
    assert_eq!(a01.triggers().count(), 0);
    assert!(a01.questions().is_empty());
    assert!(a01.variables.get("likes").is_none());
    assert_eq!(
        extraction.questionnaire.page("index").unwrap().headers().count(),
        0
    );
}

#[test]
fn undeclared_target_is_synthesized() {
    let extraction = extract(
        r#"<questionnaire>
  <page uid="index">
    <transitions><transition target="end"/></transitions>
  </page>
</questionnaire>"#,
    );
    let questionnaire = &extraction.questionnaire;
    let end = questionnaire.page("end").unwrap();
    assert!(!end.declared);
    assert_eq!(end.source("index").unwrap().transitions, vec![0]);
    assert_eq!(questionnaire.page_uids(), vec!["index", "end"]);

    let notes: Vec<_> = extraction
        .diagnostics
        .iter()
        .filter(|d| d.page.is_some())
        .collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Info);
    assert_eq!(notes[0].page.as_deref(), Some("end"));
    assert!(notes[0].message.contains("index"));
}

#[test]
fn forward_reference_is_declared_later() {
    let extraction = extract(
        r#"<questionnaire>
  <page uid="index">
    <transitions><transition target="A01"/></transitions>
  </page>
  <page uid="A01"/>
</questionnaire>"#,
    );
    let page = extraction.questionnaire.page("A01").unwrap();
    assert!(page.declared);
    assert_eq!(page.source("index").unwrap().transitions, vec![0]);
    assert!(extraction.diagnostics.iter().all(|d| d.page.is_none()));
}

#[test]
fn undeclared_variable_is_a_warning() {
    let extraction = extract(
        r#"<questionnaire>
  <variables><variable name="known" type="string"/></variables>
  <page uid="index">
    <body><questionOpen uid="q1" variable="ghost"/></body>
  </page>
</questionnaire>"#,
    );
    assert_eq!(extraction.diagnostics.warning_count(), 1);
    let diagnostic = extraction
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Warning)
        .unwrap();
    assert_eq!(diagnostic.page.as_deref(), Some("index"));
    assert!(diagnostic.message.contains("ghost"));
    assert!(
        extraction
            .questionnaire
            .page("index")
            .unwrap()
            .variables
            .is_empty()
    );
}

#[test]
fn repeated_body_variable_goes_to_duplicates() {
    let extraction = extract(
        r#"<questionnaire>
  <variables><variable name="v" type="singleChoiceAnswerOption"/></variables>
  <page uid="index">
    <body>
      <questionSingleChoice uid="q1" variable="v"/>
      <questionSingleChoice uid="q2" variable="v"/>
    </body>
  </page>
</questionnaire>"#,
    );
    let page = extraction.questionnaire.page("index").unwrap();
    assert_eq!(page.variables.len(), 1);
    assert!(page.duplicate_variables.contains("v"));
}

#[test]
fn invalid_variable_type_is_a_warning() {
    let extraction = extract(
        r#"<questionnaire>
  <variables>
    <variable name="ok" type="string"/>
    <variable name="odd" type="matrix"/>
  </variables>
</questionnaire>"#,
    );
    assert_eq!(extraction.questionnaire.variables.len(), 1);
    assert_eq!(extraction.diagnostics.warning_count(), 1);
}

#[test]
fn backward_jump_is_listed_on_cyclic_document() {
    let extraction = extract(
        r#"<questionnaire>
  <variables><variable name="retry" type="boolean"/></variables>
  <page uid="A01">
    <transitions><transition target="A02"/></transitions>
  </page>
  <page uid="A02">
    <transitions>
      <transition target="A01" condition="retry.value"/>
      <transition target="A03"/>
    </transitions>
  </page>
  <page uid="A03"/>
</questionnaire>"#,
    );
    let questionnaire = &extraction.questionnaire;
    assert!(questionnaire.topologically_sorted_pages().is_empty());
    let backward = questionnaire.list_transitions(&TransitionFilter::backward());
    assert_eq!(backward.len(), 1);
    assert_eq!(backward[0].source, "A02");
    assert_eq!(backward[0].target, "A01");
    assert_eq!(backward[0].condition_new, "retry == 1");
    assert_eq!(backward[0].distance, Some(-1));
}

#[test]
fn malformed_documents_are_errors() {
    let options = ExtractOptions::default();
    assert!(matches!(
        parse_questionnaire("<questionnaire>", &options),
        Err(IngestError::Xml(_))
    ));
    assert!(matches!(
        parse_questionnaire("<survey/>", &options),
        Err(IngestError::MissingRoot { .. })
    ));
    assert!(matches!(
        parse_questionnaire("<questionnaire><page/></questionnaire>", &options),
        Err(IngestError::MissingAttribute { attribute: "uid", .. })
    ));
    assert!(matches!(
        parse_questionnaire(
            r#"<questionnaire><page uid="a"><transitions><transition/></transitions></page></questionnaire>"#,
            &options
        ),
        Err(IngestError::MissingAttribute {
            attribute: "target",
            ..
        })
    ));
    assert!(matches!(
        parse_questionnaire(
            r#"<questionnaire><page uid="a"/><page uid="a"/></questionnaire>"#,
            &options
        ),
        Err(IngestError::Model(_))
    ));
}

proptest! {
    #[test]
    fn transition_indexes_are_contiguous(targets in prop::collection::vec(0usize..4, 0..8)) {
        let transitions: String = targets
            .iter()
            .map(|t| format!(r#"<transition target="P{t}"/>"#))
            .collect();
        let document = format!(
            r#"<questionnaire><page uid="start"><transitions>{transitions}</transitions></page></questionnaire>"#
        );
        let extraction = parse_questionnaire(&document, &ExtractOptions::default()).unwrap();
        let questionnaire = &extraction.questionnaire;
        let page = questionnaire.page("start").unwrap();
        let indexes: Vec<usize> = page.transitions().map(|t| t.index).collect();
        prop_assert_eq!(indexes, (0..targets.len()).collect::<Vec<_>>());
        prop_assert!(questionnaire.verify_sources().is_ok());
    }
}
