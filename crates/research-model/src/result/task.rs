//! Task and section results

use research_serialization::{
    Document, DocumentReader, DocumentWriter, FieldKind, SerializationError, SerializationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{result_data_common, result_type, ResultData, ResultSet, ResultTiming};
use crate::factory::Factory;

/// Direction of a navigation move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Moving to the next node
    #[default]
    Forward,
    /// Moving back to a previous node
    Backward,
}

/// One entry of the navigation path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathMarker {
    /// Node visited
    pub identifier: String,
    /// How the node was reached
    pub direction: Direction,
}

impl PathMarker {
    /// Marker for a forward move
    #[inline]
    #[must_use]
    pub fn forward(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            direction: Direction::Forward,
        }
    }

    /// Marker for a backward move
    #[inline]
    #[must_use]
    pub fn backward(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            direction: Direction::Backward,
        }
    }
}

/// Step history, async results and path shared by task and section results
#[derive(Debug, Clone, PartialEq, Default)]
struct History {
    step_history: Vec<Box<dyn ResultData>>,
    async_results: Option<ResultSet>,
    path: Vec<PathMarker>,
}

impl History {
    fn find_result(&self, identifier: &str) -> Option<&dyn ResultData> {
        self.step_history
            .iter()
            .find(|result| result.identifier() == identifier)
            .map(AsRef::as_ref)
    }

    fn append_step_history(&mut self, result: Box<dyn ResultData>) {
        self.path.push(PathMarker::forward(result.identifier()));
        self.step_history.push(result);
    }

    fn append_async_result(&mut self, result: Box<dyn ResultData>) -> Option<Box<dyn ResultData>> {
        self.async_results.get_or_insert_with(ResultSet::new).insert(result)
    }

    fn remove_async_result(&mut self, identifier: &str) -> Option<Box<dyn ResultData>> {
        self.async_results.as_mut().and_then(|set| set.remove(identifier))
    }

    fn node_path(&self) -> Vec<&str> {
        self.path.iter().map(|marker| marker.identifier.as_str()).collect()
    }

    fn decode(reader: &DocumentReader<'_>, factory: &Factory) -> SerializationResult<Self> {
        let step_history = match reader.value("stepHistory") {
            Some(raw) => factory.decode_results("stepHistory", raw)?,
            None => Vec::new(),
        };
        let async_results = reader
            .value("asyncResults")
            .map(|raw| ResultSet::decode("asyncResults", raw, factory))
            .transpose()?;
        let path = match reader.value("path") {
            Some(raw) => serde_json::from_value::<Vec<PathMarker>>(raw.clone())
                .map_err(|_| SerializationError::mismatch("path", FieldKind::Array))?,
            None => reader
                .optional_string_array("nodePath")?
                .unwrap_or_default()
                .into_iter()
                .map(PathMarker::forward)
                .collect(),
        };
        Ok(Self {
            step_history,
            async_results,
            path,
        })
    }

    fn encode(&self, writer: DocumentWriter) -> SerializationResult<DocumentWriter> {
        let step_history = self
            .step_history
            .iter()
            .map(|result| result.encode().map(Value::Object))
            .collect::<SerializationResult<Vec<_>>>()?;
        let async_results = self.async_results.as_ref().map(ResultSet::encode).transpose()?;
        let path = serde_json::to_value(&self.path)
            .map_err(|err| SerializationError::malformed(format!("path: {err}")))?;
        Ok(writer
            .field("stepHistory", step_history)
            .optional("asyncResults", async_results)
            .field("path", path)
            .field("nodePath", self.node_path()))
    }
}

macro_rules! history_accessors {
    () => {
        /// Results in the order steps were visited, repeats included
        #[inline]
        pub fn step_history(&self) -> impl Iterator<Item = &dyn ResultData> + '_ {
            self.history.step_history.iter().map(AsRef::as_ref)
        }

        /// Results finished outside the step sequence, absent until the first append
        #[inline]
        #[must_use]
        pub fn async_results(&self) -> Option<&ResultSet> {
            self.history.async_results.as_ref()
        }

        /// Navigation path
        #[inline]
        #[must_use]
        pub fn path(&self) -> &[PathMarker] {
            &self.history.path
        }

        /// Identifiers along the navigation path
        #[inline]
        #[must_use]
        pub fn node_path(&self) -> Vec<&str> {
            self.history.node_path()
        }

        /// First step history result with the given identifier
        #[inline]
        #[must_use]
        pub fn find_result(&self, identifier: &str) -> Option<&dyn ResultData> {
            self.history.find_result(identifier)
        }

        /// Append a step result and a forward path marker
        #[inline]
        pub fn append_step_history(&mut self, result: Box<dyn ResultData>) {
            self.history.append_step_history(result);
        }

        /// Record a backward move to a previously visited node
        #[inline]
        pub fn record_backward(&mut self, identifier: impl Into<String>) {
            self.history.path.push(PathMarker::backward(identifier));
        }

        /// Add an async result, replacing any result with the same identifier
        #[inline]
        pub fn append_async_result(&mut self, result: Box<dyn ResultData>) -> Option<Box<dyn ResultData>> {
            self.history.append_async_result(result)
        }

        /// Remove an async result
        #[inline]
        pub fn remove_async_result(&mut self, identifier: &str) -> Option<Box<dyn ResultData>> {
            self.history.remove_async_result(identifier)
        }
    };
}

/// Root result of one task run
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    identifier: String,
    timing: ResultTiming,
    task_run_uuid: Uuid,
    version_string: Option<String>,
    assessment_identifier: Option<String>,
    schema_identifier: Option<String>,
    history: History,
}

impl TaskResult {
    /// Create a task result with a fresh run identifier
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            task_run_uuid: Uuid::new_v4(),
            version_string: None,
            assessment_identifier: None,
            schema_identifier: None,
            history: History::default(),
        }
    }

    /// With the task version
    #[inline]
    #[must_use]
    pub fn with_version_string(mut self, version: impl Into<String>) -> Self {
        self.version_string = Some(version.into());
        self
    }

    /// With the assessment identifier
    #[inline]
    #[must_use]
    pub fn with_assessment_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.assessment_identifier = Some(identifier.into());
        self
    }

    /// With the schema identifier
    #[inline]
    #[must_use]
    pub fn with_schema_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.schema_identifier = Some(identifier.into());
        self
    }

    /// Run identifier, fixed at creation
    #[inline]
    #[must_use]
    pub fn task_run_uuid(&self) -> Uuid {
        self.task_run_uuid
    }

    /// Task version
    #[inline]
    #[must_use]
    pub fn version_string(&self) -> Option<&str> {
        self.version_string.as_deref()
    }

    /// Assessment identifier
    #[inline]
    #[must_use]
    pub fn assessment_identifier(&self) -> Option<&str> {
        self.assessment_identifier.as_deref()
    }

    /// Schema identifier
    #[inline]
    #[must_use]
    pub fn schema_identifier(&self) -> Option<&str> {
        self.schema_identifier.as_deref()
    }

    history_accessors!();

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::TASK,
            "identifier": "walk",
            "taskRunUUID": "8b2c4c5e-6f0a-4d2e-9c3b-1a2b3c4d5e6f",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "endDate": "2017-10-16T22:40:09.000-02:30",
            "stepHistory": [
                {"type": "base", "identifier": "intro"},
                {"type": "answer", "identifier": "age", "answerType": {"type": "integer"}, "value": 42}
            ],
            "asyncResults": [
                {"type": "file", "identifier": "walkMotion", "relativePath": "walkMotion.json"}
            ],
            "path": [
                {"identifier": "intro", "direction": "forward"},
                {"identifier": "age", "direction": "forward"}
            ]
        })]
    }

    /// Decode from a document node
    ///
    /// Documents without `path` fall back to the legacy `nodePath` list.
    ///
    /// # Errors
    /// `FieldTypeMismatch` for a bad `taskRunUUID`, or any child that fails
    /// to decode
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let task_run_uuid = match reader.optional_str("taskRunUUID")? {
            Some(text) => Uuid::parse_str(text)
                .map_err(|_| SerializationError::mismatch("taskRunUUID", FieldKind::String))?,
            None => Uuid::new_v4(),
        };
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
            task_run_uuid,
            version_string: reader.optional_string("versionString")?,
            assessment_identifier: reader.optional_string("assessmentIdentifier")?,
            schema_identifier: reader.optional_string("schemaIdentifier")?,
            history: History::decode(&reader, factory)?,
        })
    }
}

impl ResultData for TaskResult {
    result_data_common!(result_type::TASK);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type())
            .field("identifier", self.identifier.as_str())
            .field("taskRunUUID", self.task_run_uuid.to_string())
            .optional("versionString", self.version_string.clone())
            .optional("assessmentIdentifier", self.assessment_identifier.clone())
            .optional("schemaIdentifier", self.schema_identifier.clone());
        Ok(self.history.encode(self.timing.encode(writer))?.finish())
    }
}

/// Step history of one section nested in a task
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResult {
    identifier: String,
    timing: ResultTiming,
    history: History,
}

impl SectionResult {
    /// Create an empty section result starting now
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            timing: ResultTiming::now(),
            history: History::default(),
        }
    }

    history_accessors!();

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": result_type::SECTION,
            "identifier": "walkSection",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "stepHistory": [{"type": "base", "identifier": "countdown"}],
            "path": [{"identifier": "countdown", "direction": "forward"}]
        })]
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// Any child that fails to decode
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            timing: ResultTiming::decode(&reader)?,
            history: History::decode(&reader, factory)?,
        })
    }
}

impl ResultData for SectionResult {
    result_data_common!(result_type::SECTION);

    fn encode(&self) -> SerializationResult<Document> {
        let writer = DocumentWriter::new(self.serializable_type()).field("identifier", self.identifier.as_str());
        Ok(self.history.encode(self.timing.encode(writer))?.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{CollectionResult, ResultObject};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn step_history_keeps_repeats_and_path() {
        let mut task = TaskResult::new("survey");
        task.append_step_history(Box::new(ResultObject::new("intro")));
        task.append_step_history(Box::new(ResultObject::new("q1")));
        task.record_backward("intro");
        task.append_step_history(Box::new(ResultObject::new("intro")));

        assert_eq!(task.step_history().count(), 3);
        assert_eq!(task.node_path(), vec!["intro", "q1", "intro", "intro"]);
        assert_eq!(task.path()[2].direction, Direction::Backward);
        assert!(task.async_results().is_none());
    }

    #[test]
    fn async_results_replace_by_identifier() {
        let mut task = TaskResult::new("survey");
        assert!(task.append_async_result(Box::new(ResultObject::new("motion"))).is_none());
        let previous = task.append_async_result(Box::new(CollectionResult::new("motion")));
        assert!(previous.unwrap().downcast_ref::<ResultObject>().is_some());
        assert_eq!(task.async_results().map(ResultSet::len), Some(1));
        assert!(task.remove_async_result("motion").is_some());
        assert!(task.remove_async_result("motion").is_none());
    }

    #[test]
    fn legacy_node_path_is_read() {
        let value = json!({
            "type": "task",
            "identifier": "survey",
            "startDate": "2017-10-16T22:28:09.000-02:30",
            "stepHistory": [],
            "nodePath": ["intro", "q1"]
        });
        let task = TaskResult::decode(&value, Factory::shared()).unwrap();
        assert_eq!(task.path(), &[PathMarker::forward("intro"), PathMarker::forward("q1")]);
    }

    #[test]
    fn deep_copy_preserves_run_identifier() {
        let mut task = TaskResult::new("survey").with_schema_identifier("survey-v2");
        task.append_step_history(Box::new(ResultObject::new("intro")));
        let copy = task.deep_copy();
        let copied = copy.downcast_ref::<TaskResult>().unwrap();
        assert_eq!(copied.task_run_uuid(), task.task_run_uuid());
        assert_eq!(copied.schema_identifier(), Some("survey-v2"));
        assert!(copy.as_ref() == &task as &dyn ResultData);
    }

    #[test]
    fn section_round_trip() {
        let mut section = SectionResult::new("part1");
        section.append_step_history(Box::new(ResultObject::new("intro")));
        let encoded = Value::Object(section.encode().unwrap());
        let decoded = SectionResult::decode(&encoded, Factory::shared()).unwrap();
        assert_eq!(decoded, section);
    }
}
