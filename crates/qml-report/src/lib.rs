//! Questionnaire exports for external tools.
//!
//! - **GraphML**: navigation graph with node and edge data
//! - **DOT**: navigation graph for Graphviz
//! - **JSON**: full model dump

mod common;
mod dot;
mod error;
mod format;
mod graphml;
mod json;

pub use dot::render_dot;
pub use error::{ReportError, Result};
pub use format::{ExportFormat, render, write_export};
pub use graphml::{graphml_string, write_graphml};
pub use json::to_json_string;
