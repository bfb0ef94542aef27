//! Base and navigation results

use research_serialization::{Document, DocumentReader, DocumentWriter, SerializationResult};
use serde_json::{json, Value};

use super::{result_data_common, result_type, ResultData, ResultTiming};
use crate::factory::Factory;

/// Result holding an identifier and timestamps only
///
/// This is the default variant of the results family: nodes with a missing
/// or unregistered discriminator decode as a `ResultObject`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultObject {
    identifier: String,
    timing: ResultTiming,
}

impl ResultObject {
    /// Create a result starting now
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
        }
    }

    /// Replace the timing
    #[inline]
    #[must_use]
    pub fn with_timing(mut self, timing: ResultTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::BASE,
            "identifier": "foo",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "endDate": "2017-10-16T22:30:09.000-02:30"
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` for a missing or empty identifier, or bad dates
    pub fn decode(value: &Value, _factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
        })
    }
}

impl ResultData for ResultObject {
    result_data_common!(result_type::BASE);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        Ok(self.timing.encode(writer).finish())
    }
}

/// Result recording where navigation should jump next
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    identifier: String,
    timing: ResultTiming,
    skip_to_identifier: Option<String>,
}

impl NavigationResult {
    /// Create a navigation result starting now
    #[must_use]
    pub fn new(identifier: impl Into<String>, skip_to_identifier: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            skip_to_identifier: skip_to_identifier.map(str::to_string),
        }
    }

    /// Identifier of the node to jump to
    #[inline]
    #[must_use]
    pub fn skip_to_identifier(&self) -> Option<&str> {
        self.skip_to_identifier.as_deref()
    }

    /// Set the node to jump to
    #[inline]
    pub fn set_skip_to_identifier(&mut self, skip_to_identifier: Option<String>) {
        self.skip_to_identifier = skip_to_identifier;
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::NAVIGATION,
            "identifier": "chooser",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "skipToIdentifier": "nextSection"
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` or `FieldTypeMismatch` for bad fields
    pub fn decode(value: &Value, _factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
            skip_to_identifier: reader.optional_string("skipToIdentifier")?,
        })
    }
}

impl ResultData for NavigationResult {
    result_data_common!(result_type::NAVIGATION);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        Ok(self
            .timing
            .encode(writer)
            .optional("skipToIdentifier", self.skip_to_identifier.clone())
            .finish())
    }
}
