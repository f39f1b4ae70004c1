//! JSON dump of the full questionnaire model.

use qml_model::Questionnaire;

use crate::error::Result;

/// Pretty-printed JSON of the model.
pub fn to_json_string(questionnaire: &Questionnaire) -> Result<String> {
    Ok(serde_json::to_string_pretty(questionnaire)?)
}
