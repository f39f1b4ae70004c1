use qml_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to parse questionnaire markup: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{found}>, expected <questionnaire>")]
    MissingRoot { found: String },

    #[error("<{element}> at {position} is missing required attribute {attribute}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        position: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid shown-variable pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to parse extraction options: {0}")]
    Options(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
