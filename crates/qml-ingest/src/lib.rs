//! Extraction of questionnaire markup into the questionnaire model.

pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod markup;
pub mod options;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{IngestError, Result};
pub use extract::{Extraction, extract_questionnaire, parse_questionnaire};
pub use options::{DEFAULT_SHOWN_VARIABLE_PATTERN, ExtractOptions};
