use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::validate::validate_uid;

/// Value type of a questionnaire variable as declared in the variables block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableType {
    Boolean,
    String,
    Number,
    SingleChoiceAnswerOption,
}

impl VariableType {
    /// Returns the type name as it appears in questionnaire markup.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Boolean => "boolean",
            VariableType::String => "string",
            VariableType::Number => "number",
            VariableType::SingleChoiceAnswerOption => "singleChoiceAnswerOption",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = String;

    /// Parse a markup type name (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("boolean") {
            Ok(VariableType::Boolean)
        } else if trimmed.eq_ignore_ascii_case("string") {
            Ok(VariableType::String)
        } else if trimmed.eq_ignore_ascii_case("number") {
            Ok(VariableType::Number)
        } else if trimmed.eq_ignore_ascii_case("singleChoiceAnswerOption") {
            Ok(VariableType::SingleChoiceAnswerOption)
        } else {
            Err(format!("Unknown variable type: {}", s))
        }
    }
}

/// Where a variable was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarPlace {
    /// Listed in the questionnaire's variable declaration block.
    Declared,
    /// Bound to an input element in a page body.
    Body,
    /// Set or read by a page trigger.
    Triggers,
    /// Interpolated into displayed text only.
    Shown,
}

impl VarPlace {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarPlace::Declared => "declared",
            VarPlace::Body => "body",
            VarPlace::Triggers => "triggers",
            VarPlace::Shown => "shown",
        }
    }
}

impl fmt::Display for VarPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VarPlace {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "declared" => Ok(VarPlace::Declared),
            "body" => Ok(VarPlace::Body),
            "triggers" => Ok(VarPlace::Triggers),
            "shown" => Ok(VarPlace::Shown),
            _ => Err(ModelError::InvalidVariablePlace {
                value: s.to_string(),
            }),
        }
    }
}

/// A named questionnaire variable.
///
/// The name is fixed at construction; only the place tag may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    #[serde(rename = "type")]
    var_type: VariableType,
    place: Option<VarPlace>,
}

impl Variable {
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Result<Self> {
        let name = name.into();
        validate_uid("variable", &name)?;
        Ok(Self {
            name,
            var_type,
            place: None,
        })
    }

    /// Build a variable from the raw `name`/`type` attribute pair of the markup.
    pub fn parse(name: &str, var_type: &str) -> Result<Self> {
        let parsed = var_type
            .parse::<VariableType>()
            .map_err(|_| ModelError::InvalidVariableType {
                name: name.to_string(),
                value: var_type.to_string(),
            })?;
        Self::new(name, parsed)
    }

    #[must_use]
    pub fn with_place(mut self, place: VarPlace) -> Self {
        self.place = Some(place);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var_type(&self) -> VariableType {
        self.var_type
    }

    pub fn place(&self) -> Option<VarPlace> {
        self.place
    }

    pub fn set_place(&mut self, place: VarPlace) {
        self.place = Some(place);
    }

    /// Set the place tag from its textual form, rejecting unknown places.
    pub fn set_place_str(&mut self, place: &str) -> Result<()> {
        self.place = Some(place.parse()?);
        Ok(())
    }

    pub fn is_shown(&self) -> bool {
        self.place == Some(VarPlace::Shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_markup_type_names() {
        assert_eq!(
            "singleChoiceAnswerOption".parse::<VariableType>(),
            Ok(VariableType::SingleChoiceAnswerOption)
        );
        assert_eq!("Boolean".parse::<VariableType>(), Ok(VariableType::Boolean));
        assert!("date".parse::<VariableType>().is_err());
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let err = Variable::parse("v1", "date").unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidVariableType {
                name: "v1".to_string(),
                value: "date".to_string(),
            }
        );
    }

    #[test]
    fn place_update_keeps_type() {
        let mut var = Variable::parse("v1", "number")
            .unwrap()
            .with_place(VarPlace::Declared);
        var.set_place_str("body").unwrap();
        assert_eq!(var.place(), Some(VarPlace::Body));
        assert_eq!(var.var_type(), VariableType::Number);
        assert!(var.set_place_str("footer").is_err());
        assert_eq!(var.place(), Some(VarPlace::Body));
    }
}
