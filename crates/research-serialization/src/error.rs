//! Error types for document decoding and encoding
//!
//! Every failure is terminal for the decode call that raised it: callers never
//! receive a partially built object.

use std::fmt::{self, Display, Formatter};

/// Shape a document field was expected to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// JSON string
    String,
    /// JSON boolean
    Boolean,
    /// Integral JSON number
    Integer,
    /// Any JSON number
    Number,
    /// JSON array
    Array,
    /// JSON object
    Object,
    /// String holding a timestamp in the canonical format
    Timestamp,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Errors raised while decoding or encoding documents
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SerializationError {
    /// Document shape is not what the decoder expects
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// What was wrong with the document
        message: String,
    },

    /// No constructor (and no default) for the discriminator in this family
    #[error("unresolved type for {capability}: {}", .discriminator.as_deref().unwrap_or("<missing>"))]
    UnresolvedType {
        /// Family the lookup ran in
        capability: String,
        /// Raw discriminator, `None` when the node had none
        discriminator: Option<String>,
    },

    /// A field is present but holds the wrong kind of value
    #[error("field '{field}' has the wrong type: expected {expected}")]
    FieldTypeMismatch {
        /// Field name
        field: String,
        /// Expected shape
        expected: FieldKind,
    },
}

impl SerializationError {
    /// Create a malformed document error
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Create an unresolved type error
    #[inline]
    pub fn unresolved(capability: impl Into<String>, discriminator: Option<&str>) -> Self {
        Self::UnresolvedType {
            capability: capability.into(),
            discriminator: discriminator.map(str::to_string),
        }
    }

    /// Create a field type mismatch error
    #[inline]
    pub fn mismatch(field: impl Into<String>, expected: FieldKind) -> Self {
        Self::FieldTypeMismatch {
            field: field.into(),
            expected,
        }
    }

    /// Create a missing required field error
    #[inline]
    pub fn missing(field: &str) -> Self {
        Self::malformed(format!("missing required field '{field}'"))
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Result type alias for serialization operations
pub type SerializationResult<T> = Result<T, SerializationError>;
