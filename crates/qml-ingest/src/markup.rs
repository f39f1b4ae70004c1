//! Typed accessors over the parsed questionnaire markup.
//!
//! Elements are matched by local name, so namespaced (`zofar:page`) and
//! plain (`page`) documents read the same. Optional children are returned
//! as `Option`, never probed implicitly.

use roxmltree::{Document, Node};

use crate::error::{IngestError, Result};

pub const QUESTIONNAIRE: &str = "questionnaire";
pub const VARIABLES: &str = "variables";
pub const VARIABLE: &str = "variable";
pub const PAGE: &str = "page";
pub const HEADER: &str = "header";
pub const BODY: &str = "body";
pub const TRANSITIONS: &str = "transitions";
pub const TRANSITION: &str = "transition";
pub const TRIGGERS: &str = "triggers";
pub const TITLE: &str = "title";

/// Local name of an element node.
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

pub fn is_element_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && local_name(node) == name
}

/// First child element with the given local name.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_element_named(*child, name))
}

/// Child elements with the given local name, in document order.
pub fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| is_element_named(*child, name))
}

/// Non-blank attribute value.
pub fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// All descendant text, whitespace-collapsed.
pub fn collapsed_text(node: Node<'_, '_>) -> String {
    let pieces: Vec<&str> = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .flat_map(str::split_whitespace)
        .collect();
    pieces.join(" ")
}

/// `row:col` of a node for messages.
pub fn position(node: Node<'_, '_>) -> String {
    node.document().text_pos_at(node.range().start).to_string()
}

/// The document root.
#[derive(Debug, Clone, Copy)]
pub struct QuestionnaireElement<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> QuestionnaireElement<'a, 'input> {
    pub fn from_document(document: &'a Document<'input>) -> Result<Self> {
        let node = document.root_element();
        if local_name(node) != QUESTIONNAIRE {
            return Err(IngestError::MissingRoot {
                found: local_name(node).to_string(),
            });
        }
        Ok(Self { node })
    }

    /// Title from a `name`/`title` attribute or a `title` child.
    pub fn title(&self) -> Option<String> {
        attribute(self.node, "name")
            .or_else(|| attribute(self.node, TITLE))
            .map(str::to_string)
            .or_else(|| {
                child_element(self.node, TITLE)
                    .map(collapsed_text)
                    .filter(|text| !text.is_empty())
            })
    }

    pub fn variables_block(&self) -> Option<Node<'a, 'input>> {
        child_element(self.node, VARIABLES)
    }

    /// Variable declarations, empty when there is no variables block.
    pub fn variable_elements(&self) -> Vec<Node<'a, 'input>> {
        self.variables_block()
            .map(|block| child_elements(block, VARIABLE).collect())
            .unwrap_or_default()
    }

    pub fn pages(&self) -> impl Iterator<Item = PageElement<'a, 'input>> {
        child_elements(self.node, PAGE).map(|node| PageElement { node })
    }
}

/// One `page` element.
#[derive(Debug, Clone, Copy)]
pub struct PageElement<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> PageElement<'a, 'input> {
    pub fn node(&self) -> Node<'a, 'input> {
        self.node
    }

    pub fn uid(&self) -> Option<&'a str> {
        attribute(self.node, "uid")
    }

    pub fn position(&self) -> String {
        position(self.node)
    }

    pub fn header(&self) -> Option<Node<'a, 'input>> {
        child_element(self.node, HEADER)
    }

    pub fn body(&self) -> Option<Node<'a, 'input>> {
        child_element(self.node, BODY)
    }

    pub fn transitions(&self) -> Option<Node<'a, 'input>> {
        child_element(self.node, TRANSITIONS)
    }

    pub fn triggers(&self) -> Option<Node<'a, 'input>> {
        child_element(self.node, TRIGGERS)
    }

    /// `transition` elements in document order.
    pub fn transition_elements(&self) -> Vec<Node<'a, 'input>> {
        self.transitions()
            .map(|block| child_elements(block, TRANSITION).collect())
            .unwrap_or_default()
    }

    /// Element children of the triggers block.
    pub fn trigger_elements(&self) -> Vec<Node<'a, 'input>> {
        self.triggers()
            .map(|block| block.children().filter(Node::is_element).collect())
            .unwrap_or_default()
    }
}
