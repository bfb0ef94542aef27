//! Error types for answer coding and validation

use chrono::{DateTime, FixedOffset};

/// Default message used when a number validator has no custom message
pub const DEFAULT_INVALID_NUMBER_MESSAGE: &str = "The number entered is not valid.";

/// Errors raised while deriving a date coder from a pattern
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoderError {
    /// The pattern does not mention any supported calendar component
    #[error("no calendar components derived from pattern '{pattern}'")]
    NoComponentsDerived {
        /// Pattern that was scanned
        pattern: String,
    },

    /// The pattern uses a field symbol the coder cannot translate
    #[error("unsupported symbol '{symbol}' in pattern '{pattern}'")]
    UnsupportedSymbol {
        /// Pattern that was translated
        pattern: String,
        /// Offending run of pattern letters
        symbol: String,
    },

    /// A quoted literal is never closed
    #[error("unterminated literal in pattern '{pattern}'")]
    UnterminatedLiteral {
        /// Pattern that was translated
        pattern: String,
    },
}

/// Errors raised by text input validators
///
/// Every variant carries the message meant for the participant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Text could not be read as a number, or a required number is missing
    #[error("'{text}' is not a number: {message}")]
    NotANumber {
        /// Raw input text
        text: String,
        /// Participant-facing message
        message: String,
    },

    /// Number is smaller than the declared minimum
    #[error("{value} is below the minimum {minimum}: {message}")]
    BelowMinimum {
        /// Declared minimum
        minimum: f64,
        /// Rejected value
        value: f64,
        /// Participant-facing message
        message: String,
    },

    /// Number is larger than the declared maximum
    #[error("{value} is above the maximum {maximum}: {message}")]
    AboveMaximum {
        /// Declared maximum
        maximum: f64,
        /// Rejected value
        value: f64,
        /// Participant-facing message
        message: String,
    },

    /// Text does not match the validator's pattern
    #[error("'{text}' does not match the expected pattern: {message}")]
    PatternMismatch {
        /// Raw input text
        text: String,
        /// Participant-facing message
        message: String,
    },

    /// Date is earlier than the allowed range
    #[error("{value} is before the minimum date {minimum}")]
    BeforeMinimumDate {
        /// Earliest allowed date
        minimum: DateTime<FixedOffset>,
        /// Rejected date
        value: DateTime<FixedOffset>,
    },

    /// Date is later than the allowed range
    #[error("{value} is after the maximum date {maximum}")]
    AfterMaximumDate {
        /// Latest allowed date
        maximum: DateTime<FixedOffset>,
        /// Rejected date
        value: DateTime<FixedOffset>,
    },

    /// Text could not be parsed with the validator's display format
    #[error("'{text}' could not be read with format '{format}'")]
    InvalidFormat {
        /// Raw input text
        text: String,
        /// Pattern the text was read with
        format: String,
    },

    /// The answer has a type this validator does not accept
    #[error("invalid answer type: {message}")]
    InvalidType {
        /// Description of the rejected answer
        message: String,
    },

    /// A date pattern used by the validator is invalid
    #[error("date pattern error: {0}")]
    Coder(#[from] CoderError),
}

impl InputError {
    /// Create an invalid type error
    #[inline]
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::InvalidType {
            message: message.into(),
        }
    }

    /// Participant-facing message for this error
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotANumber { message, .. }
            | Self::BelowMinimum { message, .. }
            | Self::AboveMaximum { message, .. }
            | Self::PatternMismatch { message, .. }
            | Self::InvalidType { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for validation
pub type InputResult<T> = Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_participant_text() {
        let err = InputError::AboveMaximum {
            maximum: 10.0,
            value: 15.0,
            message: "Too many".to_string(),
        };
        assert_eq!(err.message(), "Too many");
        assert_eq!(err.to_string(), "15 is above the maximum 10: Too many");
    }

    #[test]
    fn coder_error_display() {
        let err = CoderError::NoComponentsDerived {
            pattern: "xyz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no calendar components derived from pattern 'xyz'"
        );
    }
}
