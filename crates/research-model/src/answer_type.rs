//! Answer type metadata
//!
//! An [`AnswerType`] travels with every answer result and says how the raw
//! JSON value of the answer is read and written.

use research_input::{AnswerValue, DateCoder};
use research_serialization::{FieldKind, SerializationError, SerializationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scalar element type of an array answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    /// `true`/`false`
    Boolean,
    /// Whole number
    Integer,
    /// Decimal number
    Number,
    /// Text
    #[default]
    String,
}

impl BaseType {
    fn decode(self, value: &Value) -> SerializationResult<AnswerValue> {
        match self {
            Self::Boolean => value
                .as_bool()
                .map(AnswerValue::Boolean)
                .ok_or_else(|| mismatch(FieldKind::Boolean)),
            Self::Integer => integer(value)
                .map(AnswerValue::Integer)
                .ok_or_else(|| mismatch(FieldKind::Integer)),
            Self::Number => value
                .as_f64()
                .map(AnswerValue::Number)
                .ok_or_else(|| mismatch(FieldKind::Number)),
            Self::String => value
                .as_str()
                .map(AnswerValue::from)
                .ok_or_else(|| mismatch(FieldKind::String)),
        }
    }

    fn decode_text(self, text: &str) -> SerializationResult<AnswerValue> {
        let text = text.trim();
        match self {
            Self::Boolean => text
                .parse()
                .map(AnswerValue::Boolean)
                .map_err(|_| mismatch(FieldKind::Boolean)),
            Self::Integer => text
                .parse()
                .map(AnswerValue::Integer)
                .map_err(|_| mismatch(FieldKind::Integer)),
            Self::Number => text
                .parse()
                .map(AnswerValue::Number)
                .map_err(|_| mismatch(FieldKind::Number)),
            Self::String => Ok(AnswerValue::from(text)),
        }
    }

    fn encode(self, answer: &AnswerValue) -> SerializationResult<Value> {
        match (self, answer) {
            (Self::Boolean, AnswerValue::Boolean(_))
            | (Self::Integer, AnswerValue::Integer(_))
            | (Self::Number, AnswerValue::Integer(_) | AnswerValue::Number(_))
            | (Self::String, AnswerValue::String(_)) => Ok(answer.to_json()),
            _ => Err(mismatch(self.kind())),
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Boolean => FieldKind::Boolean,
            Self::Integer => FieldKind::Integer,
            Self::Number => FieldKind::Number,
            Self::String => FieldKind::String,
        }
    }
}

/// How an answer value is encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerType {
    /// `true`/`false`
    Boolean,
    /// Whole number
    Integer,
    /// Decimal number
    Number,
    /// Text
    String,
    /// Date stored as text with the coder's storage pattern
    Date {
        /// Input pattern; the timestamp coder when absent
        #[serde(
            rename = "codingFormat",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        coding_format: Option<DateCoder>,
    },
    /// Several values of one base type
    Array {
        /// Element type
        #[serde(rename = "baseType", default)]
        base_type: BaseType,
        /// When set, the array is stored as one joined string
        #[serde(
            rename = "sequenceSeparator",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        sequence_separator: Option<String>,
    },
}

impl Default for AnswerType {
    fn default() -> Self {
        Self::String
    }
}

fn mismatch(expected: FieldKind) -> SerializationError {
    SerializationError::mismatch("value", expected)
}

/// Join array items so that splitting on the separator reads them back
///
/// Items that are blank, padded with whitespace, or contain the separator
/// cannot be read back and are rejected.
fn join_separated(items: &[AnswerValue], separator: &str) -> SerializationResult<String> {
    if separator.is_empty() {
        return Err(SerializationError::malformed("sequence separator is empty"));
    }
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let text = item.to_string();
        if text.is_empty() || text.trim() != text || text.contains(separator) {
            return Err(SerializationError::malformed(format!(
                "array item '{text}' cannot be joined with separator '{separator}'"
            )));
        }
        parts.push(text);
    }
    Ok(parts.join(separator))
}

#[allow(clippy::cast_possible_truncation)]
fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.fract() == 0.0 && number.abs() < 9.0e15)
            .map(|number| number as i64)
    })
}

impl AnswerType {
    /// Date answer type with an input pattern
    ///
    /// # Errors
    /// Returns the coder error for a pattern without calendar components
    pub fn date(pattern: &str) -> Result<Self, research_input::CoderError> {
        Ok(Self::Date {
            coding_format: Some(DateCoder::new(pattern)?),
        })
    }

    /// Array answer type
    #[inline]
    #[must_use]
    pub fn array(base_type: BaseType, sequence_separator: Option<&str>) -> Self {
        Self::Array {
            base_type,
            sequence_separator: sequence_separator.map(str::to_string),
        }
    }

    /// Discriminator of this answer type
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Date { .. } => "date",
            Self::Array { .. } => "array",
        }
    }

    fn coder(coding_format: Option<&DateCoder>) -> DateCoder {
        coding_format.cloned().unwrap_or_default()
    }

    /// Read a raw JSON answer
    ///
    /// # Errors
    /// `FieldTypeMismatch` naming `value` when the raw value does not fit
    pub fn decode_value(&self, value: &Value) -> SerializationResult<AnswerValue> {
        match self {
            Self::Boolean => BaseType::Boolean.decode(value),
            Self::Integer => BaseType::Integer.decode(value),
            Self::Number => BaseType::Number.decode(value),
            Self::String => BaseType::String.decode(value),
            Self::Date { coding_format } => value
                .as_str()
                .and_then(|text| Self::coder(coding_format.as_ref()).decode(text))
                .map(AnswerValue::Date)
                .ok_or_else(|| mismatch(FieldKind::Timestamp)),
            Self::Array {
                base_type,
                sequence_separator,
            } => match (value, sequence_separator) {
                (Value::Array(items), _) => items
                    .iter()
                    .map(|item| base_type.decode(item))
                    .collect::<SerializationResult<Vec<_>>>()
                    .map(AnswerValue::Array),
                (Value::String(text), Some(separator)) => text
                    .split(separator.as_str())
                    .filter(|part| !part.trim().is_empty())
                    .map(|part| base_type.decode_text(part))
                    .collect::<SerializationResult<Vec<_>>>()
                    .map(AnswerValue::Array),
                _ => Err(mismatch(FieldKind::Array)),
            },
        }
    }

    /// Write an answer as raw JSON
    ///
    /// # Errors
    /// `FieldTypeMismatch` naming `value` when the answer does not fit
    pub fn encode_value(&self, answer: &AnswerValue) -> SerializationResult<Value> {
        match self {
            Self::Boolean => BaseType::Boolean.encode(answer),
            Self::Integer => BaseType::Integer.encode(answer),
            Self::Number => BaseType::Number.encode(answer),
            Self::String => BaseType::String.encode(answer),
            Self::Date { coding_format } => match answer {
                AnswerValue::Date(date) => {
                    Ok(Value::String(Self::coder(coding_format.as_ref()).encode(date)))
                }
                _ => Err(mismatch(FieldKind::Timestamp)),
            },
            Self::Array {
                base_type,
                sequence_separator,
            } => {
                let items = answer.as_array().ok_or_else(|| mismatch(FieldKind::Array))?;
                let encoded = items
                    .iter()
                    .map(|item| base_type.encode(item))
                    .collect::<SerializationResult<Vec<_>>>()?;
                match sequence_separator {
                    Some(separator) => join_separated(items, separator).map(Value::String),
                    None => Ok(Value::Array(encoded)),
                }
            }
        }
    }

    /// Encode this answer type as a document value
    ///
    /// # Errors
    /// Propagates `serde_json` failures as `MalformedDocument`
    pub fn to_value(&self) -> SerializationResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode an answer type from a document value
    ///
    /// # Errors
    /// `MalformedDocument` for unknown answer types or bad coding formats
    pub fn from_value(value: &Value) -> SerializationResult<Self> {
        Ok(Self::deserialize(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scalar_types_round_trip() {
        let cases = [
            (AnswerType::Boolean, json!(true)),
            (AnswerType::Integer, json!(42)),
            (AnswerType::Number, json!(2.5)),
            (AnswerType::String, json!("hello")),
        ];
        for (answer_type, raw) in cases {
            let value = answer_type.decode_value(&raw).unwrap();
            assert_eq!(answer_type.encode_value(&value).unwrap(), raw);
        }
    }

    #[test]
    fn wrong_raw_value_is_a_mismatch() {
        assert_eq!(
            AnswerType::Integer.decode_value(&json!("42")).unwrap_err(),
            SerializationError::mismatch("value", FieldKind::Integer)
        );
    }

    #[test]
    fn dates_use_the_storage_pattern() {
        let answer_type = AnswerType::date("MM/dd/yyyy").unwrap();
        let value = answer_type.decode_value(&json!("2017-10-16")).unwrap();
        assert_eq!(answer_type.encode_value(&value).unwrap(), json!("2017-10-16"));
        assert_eq!(
            answer_type.to_value().unwrap(),
            json!({"type": "date", "codingFormat": "MM/dd/yyyy"})
        );
    }

    #[test]
    fn dates_default_to_timestamps() {
        let answer_type: AnswerType = serde_json::from_value(json!({"type": "date"})).unwrap();
        let raw = json!("2017-10-16T22:28:09.000-02:30");
        let value = answer_type.decode_value(&raw).unwrap();
        assert_eq!(answer_type.encode_value(&value).unwrap(), raw);
    }

    #[test]
    fn separated_arrays_are_joined_strings() {
        let answer_type = AnswerType::array(BaseType::Integer, Some(","));
        let value = answer_type.decode_value(&json!("1,2,3")).unwrap();
        assert_eq!(
            value,
            AnswerValue::Array(vec![
                AnswerValue::Integer(1),
                AnswerValue::Integer(2),
                AnswerValue::Integer(3)
            ])
        );
        assert_eq!(answer_type.encode_value(&value).unwrap(), json!("1,2,3"));
    }

    #[test]
    fn separated_items_that_cannot_be_split_back_are_rejected() {
        let answer_type = AnswerType::array(BaseType::String, Some(","));
        let joined = AnswerValue::Array(vec![AnswerValue::from("a,b"), AnswerValue::from("c")]);
        assert!(matches!(
            answer_type.encode_value(&joined),
            Err(SerializationError::MalformedDocument { .. })
        ));
        let blank = AnswerValue::Array(vec![AnswerValue::from(""), AnswerValue::from("x")]);
        assert!(answer_type.encode_value(&blank).is_err());
        let padded = AnswerValue::Array(vec![AnswerValue::from(" x")]);
        assert!(answer_type.encode_value(&padded).is_err());

        let plain = AnswerValue::Array(vec![AnswerValue::from("red"), AnswerValue::from("blue")]);
        let encoded = answer_type.encode_value(&plain).unwrap();
        assert_eq!(answer_type.decode_value(&encoded).unwrap(), plain);
    }

    #[test]
    fn plain_arrays_stay_arrays() {
        let answer_type = AnswerType::array(BaseType::String, None);
        let raw = json!(["a", "b"]);
        let value = answer_type.decode_value(&raw).unwrap();
        assert_eq!(answer_type.encode_value(&value).unwrap(), raw);
        assert_eq!(
            answer_type.to_value().unwrap(),
            json!({"type": "array", "baseType": "string"})
        );
    }

    #[test]
    fn unknown_answer_type_fails() {
        assert!(AnswerType::from_value(&json!({"type": "color"})).is_err());
    }
}
