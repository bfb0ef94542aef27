//! Question steps
//!
//! A question pairs prompt text with an answer type and the validator that
//! turns participant text into a typed answer.

use std::any::Any;

use research_input::{
    AnswerValue, DatePickerMode, DateTimeValidator, DoubleFormatOptions, InputError,
    IntegerFormatOptions, PassThruValidator, RegExValidator, TextInputValidator, YearFormatOptions,
};
use research_serialization::{Document, DocumentReader, SerializationError, SerializationResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{encode_header, step_type, Step, StepInfo};
use crate::answer_type::AnswerType;
use crate::error::ModelResult;
use crate::factory::Factory;
use crate::result::{AnswerResult, ResultData};

/// Validator configuration of a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputOptions {
    /// Whole numbers
    Integer(IntegerFormatOptions),
    /// Decimal numbers
    Double(DoubleFormatOptions),
    /// Years
    Year(YearFormatOptions),
    /// Dates and times
    DateTime(DateTimeValidator),
    /// Text matching a pattern
    Regex(RegExValidator),
}

impl InputOptions {
    /// Validator for participant text
    #[must_use]
    pub fn validator(&self) -> &dyn TextInputValidator {
        match self {
            Self::Integer(options) => options,
            Self::Double(options) => options,
            Self::Year(options) => options,
            Self::DateTime(options) => options,
            Self::Regex(options) => options,
        }
    }
}

/// Single question with a typed answer
#[derive(Debug)]
pub struct QuestionStep {
    identifier: String,
    info: StepInfo,
    answer_type: AnswerType,
    input_options: Option<InputOptions>,
    is_optional: bool,
}

impl QuestionStep {
    /// Create a required question
    #[must_use]
    pub fn new(identifier: impl Into<String>, info: StepInfo, answer_type: AnswerType) -> Self {
        Self {
            identifier: identifier.into(),
            info,
            answer_type,
            input_options: None,
            is_optional: false,
        }
    }

    /// With a validator configuration
    #[inline]
    #[must_use]
    pub fn with_input_options(mut self, options: InputOptions) -> Self {
        self.input_options = Some(options);
        self
    }

    /// With optionality
    #[inline]
    #[must_use]
    pub fn with_optional(mut self, is_optional: bool) -> Self {
        self.is_optional = is_optional;
        self
    }

    /// Answer type of the result
    #[inline]
    #[must_use]
    pub fn answer_type(&self) -> &AnswerType {
        &self.answer_type
    }

    /// Validator configuration
    #[inline]
    #[must_use]
    pub fn input_options(&self) -> Option<&InputOptions> {
        self.input_options.as_ref()
    }

    /// Whether the participant may skip the question
    #[inline]
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// Validate participant text
    ///
    /// Without explicit options the validator follows the answer type.
    ///
    /// # Errors
    /// The validator's rejection, or `InvalidType` when a required question
    /// is left empty or the answer does not fit the answer type
    pub fn validate_text(&self, text: Option<&str>) -> ModelResult<Option<AnswerValue>> {
        let text = text.filter(|text| !text.trim().is_empty());
        let answer = match &self.input_options {
            Some(options) => options.validator().validate_text(text)?,
            None => self.default_validate(text)?,
        };
        match &answer {
            None if !self.is_optional => {
                Err(InputError::invalid_type(format!("'{}' requires an answer", self.identifier)).into())
            }
            None => Ok(None),
            Some(value) => {
                self.answer_type
                    .encode_value(value)
                    .map_err(|err| InputError::invalid_type(err.to_string()))?;
                Ok(answer)
            }
        }
    }

    /// Text shown for a stored answer
    #[must_use]
    pub fn display_text(&self, answer: &AnswerValue) -> Option<String> {
        match &self.input_options {
            Some(options) => options.validator().display_text(answer),
            None => Some(answer.to_string()),
        }
    }

    fn default_validate(&self, text: Option<&str>) -> Result<Option<AnswerValue>, InputError> {
        match &self.answer_type {
            AnswerType::Integer => IntegerFormatOptions::new().validate_text(text),
            AnswerType::Number => DoubleFormatOptions::new().validate_text(text),
            AnswerType::Date { .. } => DateTimeValidator::new(DatePickerMode::default()).validate_text(text),
            AnswerType::Boolean => match text.map(str::trim) {
                None => Ok(None),
                Some(flag) => flag
                    .parse()
                    .map(|flag| Some(AnswerValue::Boolean(flag)))
                    .map_err(|_| InputError::invalid_type(format!("'{flag}' is not true or false"))),
            },
            AnswerType::String | AnswerType::Array { .. } => PassThruValidator.validate_text(text),
        }
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` for a bad `answerType` or `inputOptions`
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let answer_type = match reader.value("answerType") {
            Some(raw) => AnswerType::from_value(raw)?,
            None => AnswerType::default(),
        };
        let input_options = reader
            .value("inputOptions")
            .map(|raw| {
                InputOptions::deserialize(raw)
                    .map_err(|err| SerializationError::malformed(format!("inputOptions: {err}")))
            })
            .transpose()?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            info: StepInfo::decode(&reader, factory)?,
            answer_type,
            input_options,
            is_optional: reader.optional_bool("isOptional")?.unwrap_or(false),
        })
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![
            json!({
                "type": step_type::QUESTION,
                "identifier": "age",
                "title": "How old are you?",
                "answerType": {"type": "integer"},
                "inputOptions": {"type": "integer", "minimumValue": 18, "maximumValue": 110},
                "isOptional": false
            }),
            json!({
                "type": step_type::QUESTION,
                "identifier": "zip",
                "title": "What is your zip code?",
                "answerType": {"type": "string"},
                "inputOptions": {
                    "type": "regex",
                    "pattern": "^[0-9]{5}$",
                    "invalidMessage": "Please enter a five digit zip code."
                },
                "isOptional": true
            }),
        ]
    }
}

impl Step for QuestionStep {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn step_type(&self) -> &str {
        step_type::QUESTION
    }

    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn instantiate_result(&self) -> Box<dyn ResultData> {
        let mut result = AnswerResult::new(self.identifier.as_str(), self.answer_type.clone());
        if let Some(title) = &self.info.title {
            result = result.with_question_text(title.as_str());
        }
        Box::new(result)
    }

    fn encode(&self) -> SerializationResult<Document> {
        let options = self
            .input_options
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        Ok(encode_header(self)?
            .field("answerType", self.answer_type.to_value()?)
            .optional("inputOptions", options)
            .field("isOptional", self.is_optional)
            .finish())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn age_question() -> QuestionStep {
        QuestionStep::decode(&QuestionStep::examples()[0], Factory::shared()).unwrap()
    }

    #[test]
    fn bounded_integer_question() {
        let step = age_question();
        assert_eq!(step.validate_text(Some("42")).unwrap(), Some(AnswerValue::Integer(42)));
        assert!(matches!(
            step.validate_text(Some("7")),
            Err(ModelError::Input(InputError::BelowMinimum { .. }))
        ));
    }

    #[test]
    fn required_question_rejects_blank() {
        let step = QuestionStep::new("name", StepInfo::default(), AnswerType::String);
        assert!(step.validate_text(Some("  ")).is_err());
        assert!(step.with_optional(true).validate_text(None).unwrap().is_none());
    }

    #[test]
    fn regex_question_uses_message() {
        let step = QuestionStep::decode(&QuestionStep::examples()[1], Factory::shared()).unwrap();
        let err = step.validate_text(Some("1234")).unwrap_err();
        assert!(err.to_string().contains("five digit zip code"));
        assert_eq!(step.validate_text(Some("12345")).unwrap(), Some(AnswerValue::from("12345")));
    }

    #[test]
    fn boolean_without_options() {
        let step = QuestionStep::new("consent", StepInfo::default(), AnswerType::Boolean);
        assert_eq!(step.validate_text(Some("true")).unwrap(), Some(AnswerValue::Boolean(true)));
        assert!(step.validate_text(Some("yes")).is_err());
    }

    #[test]
    fn instantiated_result_carries_answer_type() {
        let step = age_question();
        let result = step.instantiate_result();
        let answer = result.downcast_ref::<AnswerResult>().unwrap();
        assert_eq!(answer.answer_type(), &AnswerType::Integer);
        assert_eq!(answer.question_text(), Some("How old are you?"));
    }

    #[test]
    fn example_round_trip() {
        let example = &QuestionStep::examples()[1];
        let step = QuestionStep::decode(example, Factory::shared()).unwrap();
        assert_eq!(&Value::Object(step.encode().unwrap()), example);
    }
}
