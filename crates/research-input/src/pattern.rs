//! Regular expression validator

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::answer::AnswerValue;
use crate::error::{InputError, InputResult};
use crate::validator::TextInputValidator;

/// Accepts text the pattern matches end to end
#[derive(Debug, Clone)]
pub struct RegExValidator {
    pattern: Regex,
    anchored: Regex,
    invalid_message: String,
}

/// Encoded form: `{"pattern": .., "invalidMessage": ..}`
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegExValidatorDocument {
    pattern: String,
    invalid_message: String,
}

impl RegExValidator {
    /// Compile a validator
    ///
    /// # Errors
    /// Returns the regex compilation error for an invalid pattern
    pub fn new(pattern: &str, invalid_message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            anchored: Regex::new(&format!("^(?:{pattern})$"))?,
            invalid_message: invalid_message.into(),
        })
    }

    /// Source pattern
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Message shown when input does not match
    #[inline]
    #[must_use]
    pub fn invalid_message(&self) -> &str {
        &self.invalid_message
    }

    /// Check whether the whole text is matched by the pattern
    #[inline]
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.anchored.is_match(text)
    }

    fn mismatch(&self, text: &str) -> InputError {
        InputError::PatternMismatch {
            text: text.to_string(),
            message: self.invalid_message.clone(),
        }
    }
}

impl PartialEq for RegExValidator {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern() && self.invalid_message == other.invalid_message
    }
}

impl TextInputValidator for RegExValidator {
    fn validate_text(&self, text: Option<&str>) -> InputResult<Option<AnswerValue>> {
        match text {
            Some(text) if self.matches(text) => Ok(Some(AnswerValue::from(text))),
            Some(text) => Err(self.mismatch(text)),
            None => Err(self.mismatch("")),
        }
    }

    fn validate_answer(&self, answer: Option<&AnswerValue>) -> InputResult<Option<AnswerValue>> {
        match answer {
            Some(answer) => self.validate_text(Some(&answer.to_string())),
            None => Ok(None),
        }
    }

    fn display_text(&self, answer: &AnswerValue) -> Option<String> {
        Some(answer.to_string())
    }
}

impl Serialize for RegExValidator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RegExValidatorDocument {
            pattern: self.pattern().to_string(),
            invalid_message: self.invalid_message.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RegExValidator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = RegExValidatorDocument::deserialize(deserializer)?;
        Self::new(&document.pattern, document.invalid_message).map_err(D::Error::custom)
    }
}
