//! File results

use research_serialization::{
    Document, DocumentReader, DocumentWriter, SerializationError, SerializationResult,
};
use serde_json::{json, Value};

use super::{result_data_common, result_type, ResultData, ResultTiming};
use crate::factory::Factory;

/// Result pointing at a file written during the task
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    identifier: String,
    timing: ResultTiming,
    relative_path: Option<String>,
    url: Option<String>,
    content_type: Option<String>,
}

impl FileResult {
    /// Create a result for a file relative to the task output directory
    #[must_use]
    pub fn with_relative_path(identifier: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            relative_path: Some(relative_path.into()),
            url: None,
            content_type: None,
        }
    }

    /// Create a result for a file at an absolute URL
    #[must_use]
    pub fn with_url(identifier: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            relative_path: None,
            url: Some(url.into()),
            content_type: None,
        }
    }

    /// With a MIME content type
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Path relative to the task output directory
    #[inline]
    #[must_use]
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Absolute location
    #[inline]
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// MIME content type
    #[inline]
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::FILE,
            "identifier": "walkMotion",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "endDate": "2017-10-16T22:30:09.000-02:30",
            "relativePath": "walkMotion.json",
            "contentType": "application/json"
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` when neither `relativePath` nor `url` is present
    pub fn decode(value: &Value, _factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let identifier = reader.identifier()?.to_string();
        let relative_path = reader.optional_string("relativePath")?;
        let url = reader.optional_string("url")?;
        if relative_path.is_none() && url.is_none() {
            return Err(SerializationError::malformed(format!(
                "file result '{identifier}' needs a relativePath or url"
            )));
        }
        Ok(Self {
            identifier,
            timing: ResultTiming::decode(&reader)?,
            relative_path,
            url,
            content_type: reader.optional_string("contentType")?,
        })
    }
}

impl ResultData for FileResult {
    result_data_common!(result_type::FILE);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        Ok(self
            .timing
            .encode(writer)
            .optional("relativePath", self.relative_path.clone())
            .optional("url", self.url.clone())
            .optional("contentType", self.content_type.clone())
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relative_path_round_trip() {
        let value = json!({
            "type": "file",
            "identifier": "recording",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "relativePath": "recording.json",
            "contentType": "application/json"
        });
        let result = FileResult::decode(&value, Factory::shared()).unwrap();
        assert_eq!(result.relative_path(), Some("recording.json"));
        assert_eq!(Value::Object(result.encode().unwrap()), value);
    }

    #[test]
    fn location_is_required() {
        let value = json!({"type": "file", "identifier": "recording"});
        assert!(FileResult::decode(&value, Factory::shared()).is_err());
    }
}
