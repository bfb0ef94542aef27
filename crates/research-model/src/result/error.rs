//! Error results

use research_serialization::{Document, DocumentReader, DocumentWriter, SerializationResult};
use serde_json::{json, Value};

use super::{result_data_common, result_type, ResultData, ResultTiming};
use crate::factory::Factory;

/// Result recorded in place of an answer when a step fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    identifier: String,
    timing: ResultTiming,
    error_description: String,
    error_domain: String,
    error_code: i64,
}

impl ErrorResult {
    /// Create an error result starting now
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        error_description: impl Into<String>,
        error_domain: impl Into<String>,
        error_code: i64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            error_description: error_description.into(),
            error_domain: error_domain.into(),
            error_code,
        }
    }

    /// Human readable description
    #[inline]
    #[must_use]
    pub fn error_description(&self) -> &str {
        &self.error_description
    }

    /// Error domain
    #[inline]
    #[must_use]
    pub fn error_domain(&self) -> &str {
        &self.error_domain
    }

    /// Code within the domain
    #[inline]
    #[must_use]
    pub fn error_code(&self) -> i64 {
        self.error_code
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::ERROR,
            "identifier": "walkMotion",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "errorDescription": "Motion sensors unavailable",
            "errorDomain": "MotionRecorder",
            "errorCode": -1
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` when `errorDescription` or `errorDomain` is missing
    pub fn decode(value: &Value, _factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
            error_description: reader.required_str("errorDescription")?.to_string(),
            error_domain: reader.required_str("errorDomain")?.to_string(),
            error_code: reader.optional_i64("errorCode")?.unwrap_or_default(),
        })
    }
}

impl ResultData for ErrorResult {
    result_data_common!(result_type::ERROR);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        Ok(self
            .timing
            .encode(writer)
            .field("errorDescription", self.error_description.as_str())
            .field("errorDomain", self.error_domain.as_str())
            .field("errorCode", self.error_code)
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_round_trip() {
        let value = json!({
            "type": "error",
            "identifier": "motion",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "errorDescription": "Sensor unavailable",
            "errorDomain": "MotionRecorder",
            "errorCode": -3
        });
        let result = ErrorResult::decode(&value, Factory::shared()).unwrap();
        assert_eq!(result.error_code(), -3);
        assert_eq!(Value::Object(result.encode().unwrap()), value);
    }

    #[test]
    fn description_is_required() {
        let value = json!({"identifier": "motion", "errorDomain": "MotionRecorder"});
        assert!(ErrorResult::decode(&value, Factory::shared()).is_err());
    }
}
