//! Typed answer values

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::Value;

/// A participant answer after validation
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    /// Yes/no answer
    Boolean(bool),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Number(f64),
    /// Free text
    String(String),
    /// Calendar date or time
    Date(DateTime<FixedOffset>),
    /// Multiple answers of one base type
    Array(Vec<AnswerValue>),
}

impl AnswerValue {
    /// Boolean value, if this is a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Integer value, if this is an integer
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value of an integer or number
    #[allow(clippy::cast_precision_loss)]
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Text value, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Date value, if this is a date
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }

    /// Elements, if this is an array
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[AnswerValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
        }
    }

    /// Untyped JSON rendering
    ///
    /// Dates are written as timestamps. Use an answer type with a coding
    /// format when a narrower date pattern is required.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(flag) => Value::Bool(*flag),
            Self::Integer(value) => Value::from(*value),
            Self::Number(value) => serde_json::Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Self::String(text) => Value::String(text.clone()),
            Self::Date(date) => Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, false)),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Best-effort reading of an untyped JSON value
    ///
    /// Strings stay strings; `null` and objects yield `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Self::Boolean(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Number)),
            Value::String(text) => Some(Self::String(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::Array),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl Display for AnswerValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(text) => f.write_str(text),
            Self::Date(date) => f.write_str(&date.to_rfc3339_opts(SecondsFormat::Millis, false)),
            Self::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<FixedOffset>> for AnswerValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_reads_as_float() {
        assert_eq!(AnswerValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(AnswerValue::from("3").as_f64(), None);
    }

    #[test]
    fn from_json_prefers_integers() {
        assert_eq!(AnswerValue::from_json(&json!(4)), Some(AnswerValue::Integer(4)));
        assert_eq!(AnswerValue::from_json(&json!(4.5)), Some(AnswerValue::Number(4.5)));
        assert_eq!(AnswerValue::from_json(&json!(null)), None);
    }

    #[test]
    fn array_display_joins_items() {
        let value = AnswerValue::Array(vec![1_i64.into(), "two".into()]);
        assert_eq!(value.to_string(), "1, two");
        assert_eq!(value.to_json(), json!([1, "two"]));
    }

    #[test]
    fn date_renders_as_timestamp() {
        let date = DateTime::parse_from_rfc3339("2017-10-16T22:28:09-02:30").unwrap();
        assert_eq!(
            AnswerValue::Date(date).to_json(),
            json!("2017-10-16T22:28:09.000-02:30")
        );
    }
}
