//! Error types for Spark

use thiserror::Error;

/// The main error type for Spark operations
///
/// Only the surrounding plumbing (scene files, config files, world edits)
/// produces errors. Bounds measurement and effect controllers degrade to
/// sentinel values instead.
#[derive(Debug, Error)]
pub enum SparkError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid component '{component}': {reason}")]
    InvalidComponent { component: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Spark operations
pub type Result<T> = std::result::Result<T, SparkError>;

impl From<toml::de::Error> for SparkError {
    fn from(err: toml::de::Error) -> Self {
        SparkError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: SparkError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, SparkError::TomlParseError(_)));
    }

    #[test]
    fn invalid_component_message() {
        let err = SparkError::InvalidComponent {
            component: "mesh".into(),
            reason: "min greater than max".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid component 'mesh': min greater than max"
        );
    }
}
