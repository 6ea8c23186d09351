//! Error types for the schema advisor

use thiserror::Error;

/// Result type for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Advisor errors
///
/// Structural and configuration problems are raised at the entry point of an
/// analysis, before anything is computed. Exceeding the largest tier's capacity
/// is not an error: it is reported on the cost projection itself.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Invalid schema shape at '{path}': {reason}")]
    InvalidSchemaShape { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Schema not found: {id}")]
    NotFound { id: String },

    #[error("Broken lineage at {id}: {reason}")]
    LineageBroken { id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl AdvisorError {
    pub(crate) fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchemaShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
