//! Collection results

use research_serialization::{Document, DocumentReader, DocumentWriter, SerializationResult};
use serde_json::{json, Value};

use super::{result_data_common, result_type, ResultData, ResultSet, ResultTiming};
use crate::factory::Factory;

/// Result grouping child results by identifier
///
/// Typically produced by a form step with several questions.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    identifier: String,
    timing: ResultTiming,
    children: ResultSet,
    skip_to_identifier: Option<String>,
}

impl CollectionResult {
    /// Create an empty collection starting now
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            children: ResultSet::new(),
            skip_to_identifier: None,
        }
    }

    /// Children in insertion order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &ResultSet {
        &self.children
    }

    /// Insert a child, replacing any child with the same identifier
    #[inline]
    pub fn insert(&mut self, result: Box<dyn ResultData>) -> Option<Box<dyn ResultData>> {
        self.children.insert(result)
    }

    /// Find a child by identifier
    #[inline]
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&dyn ResultData> {
        self.children.find(identifier)
    }

    /// Find a child by identifier, mutably
    #[inline]
    pub fn find_mut(&mut self, identifier: &str) -> Option<&mut (dyn ResultData + 'static)> {
        self.children.find_mut(identifier)
    }

    /// Remove a child by identifier
    #[inline]
    pub fn remove(&mut self, identifier: &str) -> Option<Box<dyn ResultData>> {
        self.children.remove(identifier)
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
            "type": result_type::COLLECTION,
            "identifier": "demographics",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "children": [
                {"type": "answer", "identifier": "age", "answerType": {"type": "integer"}, "value": 42},
                {"type": "answer", "identifier": "name", "answerType": {"type": "string"}, "value": "Pat"}
            ],
            "skipToIdentifier": "nextSection"
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// Any child that fails to decode
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let children = match reader.value("children") {
            Some(raw) => ResultSet::decode("children", raw, factory)?,
            None => ResultSet::new(),
        };
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
            children,
            skip_to_identifier: reader.optional_string("skipToIdentifier")?,
        })
    }
}

impl ResultData for CollectionResult {
    result_data_common!(result_type::COLLECTION);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        Ok(self
            .timing
            .encode(writer)
            .field("children", self.children.encode()?)
            .optional("skipToIdentifier", self.skip_to_identifier.clone())
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer_type::AnswerType;
    use crate::result::AnswerResult;
    use research_input::AnswerValue;
    use serde_json::json;

    #[test]
    fn children_decode_polymorphically() {
        let value = json!({
            "type": "collection",
            "identifier": "form",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "children": [
                {"type": "answer", "identifier": "q1", "startDate": "2017-10-16T22:28:09.000-02:30",
                 "answerType": {"type": "boolean"}, "value": true},
                {"type": "base", "identifier": "q2", "startDate": "2017-10-16T22:28:09.000-02:30"}
            ]
        });
        let collection = CollectionResult::decode(&value, Factory::shared()).unwrap();
        let first = collection.find("q1").unwrap().downcast_ref::<AnswerResult>().unwrap();
        assert_eq!(first.value(), Some(&AnswerValue::Boolean(true)));
        assert_eq!(Value::Object(collection.encode().unwrap()), value);
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut original = CollectionResult::new("form");
        original.insert(Box::new(
            AnswerResult::new("q1", AnswerType::Integer).with_value(AnswerValue::Integer(1)),
        ));
        let copy = original.deep_copy();

        original
            .find_mut("q1")
            .and_then(|node| node.downcast_mut::<AnswerResult>())
            .unwrap()
            .set_value(Some(AnswerValue::Integer(2)));

        let copied = copy.downcast_ref::<CollectionResult>().unwrap();
        let answer = copied.find("q1").unwrap().downcast_ref::<AnswerResult>().unwrap();
        assert_eq!(answer.value(), Some(&AnswerValue::Integer(1)));
    }
}
