//! Single pass over a parsed questionnaire document.
//!
//! Pages are processed in document order. For each page the extractor
//! registers the page, its transitions, the variables used in the body and
//! in triggers, variables shown in text, and finally headers and questions.
//! Distances are assigned once all pages are known.

use regex::Regex;
use roxmltree::{Document, Node};
use tracing::{debug, debug_span, info, info_span};

use qml_core::{FlowAnalysis, translate};
use qml_model::{
    Header, HeaderKind, Insertion, Question, Questionnaire, Transition, Trigger, VarPlace,
    Variable,
};

use crate::diagnostics::Diagnostics;
use crate::error::{IngestError, Result};
use crate::markup::{
    self, PageElement, QuestionnaireElement, attribute, child_element, collapsed_text, local_name,
};
use crate::options::ExtractOptions;

/// Result of one extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub questionnaire: Questionnaire,
    pub diagnostics: Diagnostics,
}

/// Parse markup text and extract the questionnaire model.
pub fn parse_questionnaire(input: &str, options: &ExtractOptions) -> Result<Extraction> {
    let document = Document::parse(input)?;
    extract_questionnaire(&document, options)
}

/// Extract the questionnaire model from an already parsed document.
pub fn extract_questionnaire(
    document: &Document<'_>,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let root = QuestionnaireElement::from_document(document)?;
    let extractor = Extractor {
        options,
        shown_pattern: options.shown_variable_regex()?,
        questionnaire: Questionnaire::new().with_title(root.title()),
        diagnostics: Diagnostics::new(),
    };
    extractor.run(&root)
}

struct Extractor<'o> {
    options: &'o ExtractOptions,
    shown_pattern: Regex,
    questionnaire: Questionnaire,
    diagnostics: Diagnostics,
}

impl Extractor<'_> {
    fn run(mut self, root: &QuestionnaireElement<'_, '_>) -> Result<Extraction> {
        let span = info_span!(
            "extract",
            title = self.questionnaire.title.as_deref().unwrap_or("-")
        );
        let _guard = span.enter();

        self.extract_declared_variables(root);
        for page in root.pages() {
            self.extract_page(&page)?;
        }
        self.report_undeclared_targets();
        let basis = self.questionnaire.update_distances();
        info!(
            pages = self.questionnaire.page_count(),
            transitions = self.questionnaire.transition_count(),
            variables = self.questionnaire.variables.len(),
            diagnostics = self.diagnostics.len(),
            basis = ?basis,
            "extraction finished"
        );
        Ok(Extraction {
            questionnaire: self.questionnaire,
            diagnostics: self.diagnostics,
        })
    }

    fn extract_declared_variables(&mut self, root: &QuestionnaireElement<'_, '_>) {
        if root.variables_block().is_none() {
            self.diagnostics.info(None, "no variables block declared");
            return;
        }
        for node in root.variable_elements() {
            let Some(name) = attribute(node, "name") else {
                self.diagnostics.warn(
                    None,
                    format!("variable at {} has no name", markup::position(node)),
                );
                continue;
            };
            let var_type = attribute(node, "type").unwrap_or_default();
            let variable = match Variable::parse(name, var_type) {
                Ok(variable) => variable.with_place(VarPlace::Declared),
                Err(err) => {
                    self.diagnostics.warn(None, err.to_string());
                    continue;
                }
            };
            if self.questionnaire.variables.add_variable(variable, false) == Insertion::Ignored {
                self.diagnostics
                    .info(None, format!("variable {name} declared more than once"));
            }
        }
        debug!(
            count = self.questionnaire.variables.len(),
            "declared variables registered"
        );
    }

    fn extract_page(&mut self, page: &PageElement<'_, '_>) -> Result<()> {
        let uid = page.uid().ok_or_else(|| IngestError::MissingAttribute {
            element: markup::PAGE.to_string(),
            attribute: "uid",
            position: page.position(),
        })?;
        let span = debug_span!("page", uid = %uid);
        let _guard = span.enter();

        self.questionnaire.declare_page(uid)?;
        self.extract_transitions(uid, page)?;
        self.extract_body_variables(uid, page);
        if self.options.extract_triggers {
            self.extract_triggers(uid, page)?;
        }
        self.extract_shown_variables(uid, page);
        if self.options.extract_headers {
            self.extract_page_headers(uid, page)?;
        }
        if self.options.extract_questions {
            self.extract_questions(uid, page);
        }
        Ok(())
    }

    fn extract_transitions(&mut self, uid: &str, page: &PageElement<'_, '_>) -> Result<()> {
        for (index, node) in page.transition_elements().into_iter().enumerate() {
            let target = attribute(node, "target").ok_or_else(|| IngestError::MissingAttribute {
                element: markup::TRANSITION.to_string(),
                attribute: "target",
                position: markup::position(node),
            })?;
            let condition = attribute(node, "condition");
            let transition =
                Transition::new(index, uid, target, condition)?.with_translated(translate(condition));
            self.questionnaire.add_transition(transition)?;
        }
        Ok(())
    }

    /// Targets that never got a page element stay as placeholders.
    fn report_undeclared_targets(&mut self) {
        for page in self.questionnaire.pages().iter().filter(|page| !page.declared) {
            let sources: Vec<&str> = page.sources().map(|source| source.page.as_str()).collect();
            self.diagnostics.info(
                Some(page.uid()),
                format!(
                    "page is targeted from {} but never declared",
                    sources.join(", ")
                ),
            );
        }
    }

    /// Look up a declared variable and tag the copy with where it was used.
    fn resolve(&mut self, uid: &str, name: &str, place: VarPlace) -> Option<Variable> {
        match self.questionnaire.variables.get(name) {
            Some(variable) => Some(variable.clone().with_place(place)),
            None => {
                self.diagnostics.warn(
                    Some(uid),
                    format!("variable {name} used in {place} is not declared"),
                );
                None
            }
        }
    }

    fn extract_body_variables(&mut self, uid: &str, page: &PageElement<'_, '_>) {
        let Some(body) = page.body() else {
            return;
        };
        for name in variable_references(body) {
            let Some(variable) = self.resolve(uid, name, VarPlace::Body) else {
                continue;
            };
            if let Some(page) = self.questionnaire.page_mut(uid) {
                page.add_variable_or_duplicate(variable);
            }
        }
    }

    fn extract_triggers(&mut self, uid: &str, page: &PageElement<'_, '_>) -> Result<()> {
        for (index, node) in page.trigger_elements().into_iter().enumerate() {
            let trigger = Trigger {
                index,
                kind: local_name(node).to_string(),
                variable: attribute(node, "variable").map(str::to_string),
                value: attribute(node, "value").map(str::to_string),
                command: attribute(node, "command").map(str::to_string),
                condition: attribute(node, "condition").map(str::to_string),
            };
            if let Some(page) = self.questionnaire.page_mut(uid) {
                page.add_trigger(trigger)?;
            }
            for name in variable_references(node) {
                let Some(variable) = self.resolve(uid, name, VarPlace::Triggers) else {
                    continue;
                };
                if let Some(page) = self.questionnaire.page_mut(uid)
                    && page.add_variable(variable, false) == Insertion::Ignored
                {
                    debug!(variable = %name, "trigger variable already recorded on page");
                }
            }
        }
        Ok(())
    }

    fn extract_shown_variables(&mut self, uid: &str, page: &PageElement<'_, '_>) {
        let names: Vec<String> = page
            .node()
            .descendants()
            .filter(Node::is_text)
            .filter_map(|node| node.text())
            .flat_map(|text| {
                self.shown_pattern
                    .captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
        for name in names {
            let Some(variable) = self.resolve(uid, &name, VarPlace::Shown) else {
                continue;
            };
            if let Some(page) = self.questionnaire.page_mut(uid)
                && page.add_variable(variable, false) == Insertion::Ignored
            {
                debug!(variable = %name, "shown variable already recorded on page");
            }
        }
    }

    fn extract_page_headers(&mut self, uid: &str, page: &PageElement<'_, '_>) -> Result<()> {
        let Some(header) = page.header() else {
            return Ok(());
        };
        let headers = self.read_headers(uid, header);
        if let Some(page) = self.questionnaire.page_mut(uid) {
            for header in headers {
                page.add_header(header)?;
            }
        }
        Ok(())
    }

    /// Header objects under a `header` element; entries without uid are skipped.
    fn read_headers(&mut self, uid: &str, header: Node<'_, '_>) -> Vec<Header> {
        let mut headers = Vec::new();
        for (index, node) in header.children().filter(Node::is_element).enumerate() {
            let Some(header_uid) = attribute(node, "uid") else {
                self.diagnostics.warn(
                    Some(uid),
                    format!(
                        "<{}> header at {} has no uid",
                        local_name(node),
                        markup::position(node)
                    ),
                );
                continue;
            };
            let visible = attribute(node, "visible");
            match Header::new(
                header_uid,
                index,
                HeaderKind::from_element(local_name(node)),
                collapsed_text(node),
                visible,
            ) {
                Ok(mut header) => {
                    header.visible_new = visible.map(|condition| translate(Some(condition)));
                    headers.push(header);
                }
                Err(err) => self.diagnostics.warn(Some(uid), err.to_string()),
            }
        }
        headers
    }

    fn extract_questions(&mut self, uid: &str, page: &PageElement<'_, '_>) {
        let Some(body) = page.body() else {
            return;
        };
        for node in body.descendants().filter(|node| is_question(*node)) {
            let Some(question_uid) = attribute(node, "uid") else {
                continue;
            };
            let mut question = match Question::new(question_uid, local_name(node)) {
                Ok(question) => question,
                Err(err) => {
                    self.diagnostics.warn(Some(uid), err.to_string());
                    continue;
                }
            };
            if let Some(header) = child_element(node, markup::HEADER) {
                question.headers = self.read_headers(uid, header);
            }
            question.variables = variable_references(node)
                .into_iter()
                .map(str::to_string)
                .collect();
            let Some(page) = self.questionnaire.page_mut(uid) else {
                continue;
            };
            if let Err(err) = page.add_question(question) {
                self.diagnostics.warn(Some(uid), err.to_string());
            }
        }
    }
}

/// Values of `variable` attributes on an element and its descendants.
fn variable_references<'a>(node: Node<'a, '_>) -> Vec<&'a str> {
    node.descendants()
        .filter(Node::is_element)
        .filter_map(|element| attribute(element, "variable"))
        .collect()
}

/// Question and matrix elements; a bare `question` is a header object.
fn is_question(node: Node<'_, '_>) -> bool {
    if !node.is_element() {
        return false;
    }
    let name = local_name(node);
    name != "question" && (name.starts_with("question") || name.starts_with("matrix"))
}
