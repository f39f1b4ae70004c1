//! Soft findings collected during one extraction run.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A recoverable finding, tied to a page when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub page: Option<String>,
    pub message: String,
}

/// Per-run collector. Every entry is also emitted through `tracing`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, page: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        warn!(page = page.unwrap_or("-"), "{message}");
        self.push(Severity::Warning, page, message);
    }

    pub fn info(&mut self, page: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        debug!(page = page.unwrap_or("-"), "{message}");
        self.push(Severity::Info, page, message);
    }

    fn push(&mut self, severity: Severity, page: Option<&str>, message: String) {
        self.entries.push(Diagnostic {
            severity,
            page: page.map(str::to_string),
            message,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity == Severity::Warning)
            .count()
    }

    /// Append the entries of another run, e.g. when merging questionnaires.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}
