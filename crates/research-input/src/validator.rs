//! Text input validation seam

use std::fmt::Debug;

use crate::answer::AnswerValue;
use crate::error::InputResult;

/// Validates participant input and renders stored answers
///
/// `display_text` is a left inverse of `validate_text`: feeding the displayed
/// text of a validated answer back through `validate_text` yields an equal
/// answer, up to the precision of the display format.
pub trait TextInputValidator: Debug + Send + Sync {
    /// Validate free text typed by the participant
    ///
    /// `Ok(None)` means "no answer", which is only accepted when the
    /// validator has nothing to enforce.
    ///
    /// # Errors
    /// The validator-specific rejection
    fn validate_text(&self, text: Option<&str>) -> InputResult<Option<AnswerValue>>;

    /// Validate an already typed answer
    ///
    /// # Errors
    /// The validator-specific rejection, or `InvalidType`
    fn validate_answer(&self, answer: Option<&AnswerValue>) -> InputResult<Option<AnswerValue>>;

    /// Text shown to the participant for a stored answer
    fn display_text(&self, answer: &AnswerValue) -> Option<String>;
}

/// Accepts any text unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassThruValidator;

impl TextInputValidator for PassThruValidator {
    fn validate_text(&self, text: Option<&str>) -> InputResult<Option<AnswerValue>> {
        Ok(text.map(AnswerValue::from))
    }

    fn validate_answer(&self, answer: Option<&AnswerValue>) -> InputResult<Option<AnswerValue>> {
        Ok(answer.cloned())
    }

    fn display_text(&self, answer: &AnswerValue) -> Option<String> {
        Some(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_thru_accepts_anything() {
        let validator = PassThruValidator;
        assert_eq!(
            validator.validate_text(Some("anything at all")).unwrap(),
            Some(AnswerValue::from("anything at all"))
        );
        assert_eq!(validator.validate_text(None).unwrap(), None);
        assert_eq!(
            validator.validate_answer(Some(&AnswerValue::Integer(3))).unwrap(),
            Some(AnswerValue::Integer(3))
        );
    }

    #[test]
    fn pass_thru_displays_value() {
        assert_eq!(
            PassThruValidator.display_text(&AnswerValue::Boolean(true)),
            Some("true".to_string())
        );
    }
}
