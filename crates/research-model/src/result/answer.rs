//! Answer results

use research_input::AnswerValue;
use research_serialization::{
    Document, DocumentReader, DocumentWriter, SerializationError, SerializationResult,
};
use serde_json::{json, Value};

use super::{result_data_common, result_type, ResultData, ResultTiming};
use crate::answer_type::AnswerType;
use crate::factory::Factory;

/// Result holding one typed answer
///
/// The answer type is stored alongside the value so the raw JSON can be read
/// back without the step that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    identifier: String,
    timing: ResultTiming,
    answer_type: AnswerType,
    value: Option<AnswerValue>,
    question_text: Option<String>,
}

impl AnswerResult {
    /// Create an empty answer starting now
    #[must_use]
    pub fn new(identifier: impl Into<String>, answer_type: AnswerType) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            answer_type,
            value: None,
            question_text: None,
        }
    }

    /// With an answer value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: AnswerValue) -> Self {
        self.value = Some(value);
        self
    }

    /// With the question text shown to the participant
    #[inline]
    #[must_use]
    pub fn with_question_text(mut self, text: impl Into<String>) -> Self {
        self.question_text = Some(text.into());
        self
    }

    /// Answer type metadata
    #[inline]
    #[must_use]
    pub fn answer_type(&self) -> &AnswerType {
        &self.answer_type
    }

    /// Current answer, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&AnswerValue> {
        self.value.as_ref()
    }

    /// Replace the answer
    #[inline]
    pub fn set_value(&mut self, value: Option<AnswerValue>) {
        self.value = value;
    }

    /// Question text, if recorded
    #[inline]
    #[must_use]
    pub fn question_text(&self) -> Option<&str> {
        self.question_text.as_deref()
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::ANSWER,
            "identifier": "age",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "endDate": "2017-10-16T22:30:09.000-02:30",
            "answerType": {"type": "integer"},
            "value": 42,
            "questionText": "How old are you?"
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` for a bad `answerType`, `FieldTypeMismatch` when
    /// `value` does not fit the answer type
    pub fn decode(value: &Value, _factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let answer_type = match reader.value("answerType") {
            Some(raw) => AnswerType::from_value(raw)?,
            None => AnswerType::default(),
        };
        let answer = reader
            .value("value")
            .map(|raw| answer_type.decode_value(raw))
            .transpose()?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
            answer_type,
            value: answer,
            question_text: reader.optional_string("questionText")?,
        })
    }
}

impl ResultData for AnswerResult {
    result_data_common!(result_type::ANSWER);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        let raw = self
            .value
            .as_ref()
            .map(|value| self.answer_type.encode_value(value))
            .transpose()
            .map_err(|err| {
                SerializationError::malformed(format!("answer '{}': {err}", self.identifier))
            })?;
        Ok(self
            .timing
            .encode(writer)
            .field("answerType", self.answer_type.to_value()?)
            .optional("value", raw)
            .optional("questionText", self.question_text.clone())
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer_type::BaseType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn integer_answer_round_trip() {
        let value = json!({
            "type": "answer",
            "identifier": "age",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "answerType": {"type": "integer"},
            "value": 42,
            "questionText": "How old are you?"
        });
        let result = AnswerResult::decode(&value, Factory::shared()).unwrap();
        assert_eq!(result.value(), Some(&AnswerValue::Integer(42)));
        assert_eq!(Value::Object(result.encode().unwrap()), value);
    }

    #[test]
    fn missing_value_is_absent_not_null() {
        let result = AnswerResult::new("q1", AnswerType::Boolean);
        let document = result.encode().unwrap();
        assert!(!document.contains_key("value"));
    }

    #[test]
    fn mismatched_value_fails_to_decode() {
        let value = json!({
            "identifier": "age",
            "answerType": {"type": "integer"},
            "value": "forty"
        });
        assert!(AnswerResult::decode(&value, Factory::shared()).is_err());
    }

    #[test]
    fn encode_rejects_value_of_wrong_type() {
        let result = AnswerResult::new("colors", AnswerType::array(BaseType::String, None))
            .with_value(AnswerValue::Integer(3));
        assert!(result.encode().is_err());
    }
}
