//! Construction-time checks shared by the model entities.

use crate::error::{ModelError, Result};

/// Check that an identifier is present and usable as a map key.
pub fn validate_uid(kind: &'static str, uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ModelError::EmptyIdentifier { kind });
    }
    if uid.chars().any(char::is_whitespace) {
        return Err(ModelError::InvalidIdentifier {
            kind,
            uid: uid.to_string(),
        });
    }
    Ok(())
}

/// Normalize an optional guard condition: blank conditions count as absent.
pub fn normalize_condition(condition: Option<&str>) -> Option<String> {
    condition
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
