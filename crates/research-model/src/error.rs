//! Error types for the research model
//!
//! Decode paths report [`SerializationError`]; operations that enforce
//! model invariants or load resources report [`ModelError`], which wraps the
//! lower layers.

use std::path::PathBuf;

use research_input::InputError;
use research_serialization::SerializationError;

/// Main model error type
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Document could not be decoded or encoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    /// Participant input was rejected
    #[error("input rejected: {0}")]
    Input(#[from] InputError),

    /// Two steps of one task share an identifier
    #[error("duplicate step identifier '{identifier}'")]
    DuplicateStepIdentifier {
        /// Repeated identifier
        identifier: String,
    },

    /// A result was finished before it started
    #[error("result '{identifier}' ends before it starts")]
    EndBeforeStart {
        /// Identifier of the result
        identifier: String,
    },

    /// A task resource could not be parsed
    #[error("invalid {resource_type} resource: {message}")]
    Resource {
        /// Resource type that was being read
        resource_type: &'static str,
        /// Parser message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ModelError {
    /// Create a resource parsing error
    #[inline]
    pub fn resource(resource_type: &'static str, message: impl Into<String>) -> Self {
        Self::Resource {
            resource_type,
            message: message.into(),
        }
    }
}

/// Errors raised while loading factory configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the configuration schema
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_errors_convert() {
        let err: ModelError = SerializationError::unresolved("steps", Some("spinner")).into();
        assert_eq!(
            err.to_string(),
            "serialization failed: unresolved type for steps: spinner"
        );
    }

    #[test]
    fn duplicate_step_display() {
        let err = ModelError::DuplicateStepIdentifier {
            identifier: "step1".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate step identifier 'step1'");
    }
}
