use thiserror::Error;

/// Structural violations raised while building a questionnaire model.
///
/// These indicate a bug in the code feeding the model (for example an
/// extractor assigning the same transition index twice), not ordinary
/// variance in the input document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier { kind: &'static str },

    #[error("{kind} identifier {uid:?} contains whitespace")]
    InvalidIdentifier { kind: &'static str, uid: String },

    #[error("invalid type {value:?} for variable {name}")]
    InvalidVariableType { name: String, value: String },

    #[error("invalid variable place {value:?}")]
    InvalidVariablePlace { value: String },

    #[error("unknown variable {name}")]
    UnknownVariable { name: String },

    #[error("duplicate page uid {uid}")]
    DuplicatePage { uid: String },

    #[error("unknown page {uid}")]
    UnknownPage { uid: String },

    #[error("duplicate transition index {index} on page {page}")]
    DuplicateTransition { page: String, index: usize },

    #[error("duplicate header index {index} on page {page}")]
    DuplicateHeader { page: String, index: usize },

    #[error("duplicate trigger index {index} on page {page}")]
    DuplicateTrigger { page: String, index: usize },

    #[error("duplicate question uid {uid} on page {page}")]
    DuplicateQuestion { page: String, uid: String },

    #[error("source index of page {page} is inconsistent with transitions: {message}")]
    InconsistentSources { page: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
