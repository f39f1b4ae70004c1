use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Default pattern for text that inserts a variable's value, e.g.
/// `#{v1.value}` or `#{zofar.labelOf(v1)}`.
pub const DEFAULT_SHOWN_VARIABLE_PATTERN: &str =
    r"#\{(?:zofar\.labelOf\()?([A-Za-z_][A-Za-z0-9_]*)(?:\.value(?:Id)?)?\)?\}";

/// Switches for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractOptions {
    /// Regex whose first capture group names a variable shown in text.
    pub shown_variable_pattern: String,
    pub extract_triggers: bool,
    pub extract_headers: bool,
    pub extract_questions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            shown_variable_pattern: DEFAULT_SHOWN_VARIABLE_PATTERN.to_string(),
            extract_triggers: true,
            extract_headers: true,
            extract_questions: true,
        }
    }
}

impl ExtractOptions {
    /// Parse options from a TOML table; missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let options: Self = toml::from_str(input)?;
        options.shown_variable_regex()?;
        Ok(options)
    }

    /// Compile the shown-variable pattern, requiring one capture group.
    pub fn shown_variable_regex(&self) -> Result<Regex> {
        let regex =
            Regex::new(&self.shown_variable_pattern).map_err(|err| IngestError::InvalidPattern {
                pattern: self.shown_variable_pattern.clone(),
                message: err.to_string(),
            })?;
        if regex.captures_len() < 2 {
            return Err(IngestError::InvalidPattern {
                pattern: self.shown_variable_pattern.clone(),
                message: "pattern needs a capture group for the variable name".to_string(),
            });
        }
        Ok(regex)
    }
}
