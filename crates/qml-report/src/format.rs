use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use qml_model::Questionnaire;

use crate::dot::render_dot;
use crate::error::{ReportError, Result};
use crate::graphml::graphml_string;
use crate::json::to_json_string;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Graphml,
    Dot,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Graphml => "graphml",
            ExportFormat::Dot => "dot",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graphml" => Ok(ExportFormat::Graphml),
            "dot" | "gv" => Ok(ExportFormat::Dot),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Render the questionnaire in the given format.
pub fn render(questionnaire: &Questionnaire, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Graphml => graphml_string(questionnaire),
        ExportFormat::Dot => Ok(render_dot(questionnaire)),
        ExportFormat::Json => to_json_string(questionnaire),
    }
}

/// Render and write to `path`, creating parent directories.
pub fn write_export(path: &Path, questionnaire: &Questionnaire, format: ExportFormat) -> Result<()> {
    let rendered = render(questionnaire, format)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| ReportError::io(parent, err))?;
    }
    fs::write(path, rendered).map_err(|err| ReportError::io(path, err))?;
    info!(path = %path.display(), format = %format, "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("GraphML".parse::<ExportFormat>().unwrap(), ExportFormat::Graphml);
        assert_eq!("gv".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert!(matches!(
            "svg".parse::<ExportFormat>(),
            Err(ReportError::UnknownFormat(value)) if value == "svg"
        ));
    }
}
