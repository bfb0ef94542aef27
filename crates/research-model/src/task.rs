//! Assessment task definitions

use std::collections::HashSet;
use std::path::Path;

use research_serialization::{
    Document, DocumentReader, DocumentWriter, SerializationError, SerializationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::factory::Factory;
use crate::result::TaskResult;
use crate::step::Step;

/// Text format of a task resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// JSON text
    #[default]
    Json,
    /// YAML text
    Yaml,
}

impl ResourceType {
    /// Name used in errors and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Pick the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// An ordered list of steps with schema metadata
#[derive(Debug)]
pub struct AssessmentTask {
    identifier: String,
    schema_identifier: Option<String>,
    version_string: Option<String>,
    steps: Vec<Box<dyn Step>>,
}

impl AssessmentTask {
    /// Create a task from already built steps
    #[must_use]
    pub fn new(identifier: impl Into<String>, steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            identifier: identifier.into(),
            schema_identifier: None,
            version_string: None,
            steps,
        }
    }

    /// With a schema identifier
    #[inline]
    #[must_use]
    pub fn with_schema_identifier(mut self, schema: impl Into<String>) -> Self {
        self.schema_identifier = Some(schema.into());
        self
    }

    /// With a version
    #[inline]
    #[must_use]
    pub fn with_version_string(mut self, version: impl Into<String>) -> Self {
        self.version_string = Some(version.into());
        self
    }

    /// Task identifier
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Schema identifier
    #[inline]
    #[must_use]
    pub fn schema_identifier(&self) -> Option<&str> {
        self.schema_identifier.as_deref()
    }

    /// Task version
    #[inline]
    #[must_use]
    pub fn version_string(&self) -> Option<&str> {
        self.version_string.as_deref()
    }

    /// Steps in order
    pub fn steps(&self) -> impl Iterator<Item = &dyn Step> + '_ {
        self.steps.iter().map(AsRef::as_ref)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the task has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step with the given identifier
    #[must_use]
    pub fn step(&self, identifier: &str) -> Option<&dyn Step> {
        self.steps().find(|step| step.identifier() == identifier)
    }

    /// Check that step identifiers are unique
    ///
    /// # Errors
    /// `DuplicateStepIdentifier` naming the first repeat
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.identifier()) {
                return Err(ModelError::DuplicateStepIdentifier {
                    identifier: step.identifier().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Fresh result for a new run of this task
    #[must_use]
    pub fn new_result(&self) -> TaskResult {
        let mut result = TaskResult::new(self.identifier.as_str()).with_assessment_identifier(self.identifier.as_str());
        if let Some(schema) = &self.schema_identifier {
            result = result.with_schema_identifier(schema.as_str());
        }
        if let Some(version) = &self.version_string {
            result = result.with_version_string(version.as_str());
        }
        result
    }

    /// Decode from a document node
    ///
    /// Countdown steps are linked to the active steps that follow them.
    ///
    /// # Errors
    /// `MalformedDocument` without `identifier` or `steps`, or any step that
    /// fails to decode
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let steps = reader
            .value("steps")
            .ok_or_else(|| SerializationError::missing("steps"))?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            schema_identifier: reader.optional_string("schemaIdentifier")?,
            version_string: reader.optional_string("versionString")?,
            steps: factory.decode_steps("steps", steps)?,
        })
    }

    /// Encode as an untyped document
    ///
    /// # Errors
    /// Any step that fails to encode
    pub fn encode(&self) -> SerializationResult<Document> {
        let steps = self
            .steps
            .iter()
            .map(|step| step.encode().map(Value::Object))
            .collect::<SerializationResult<Vec<_>>>()?;
        Ok(DocumentWriter::untyped()
            .field("identifier", self.identifier.as_str())
            .optional("schemaIdentifier", self.schema_identifier.clone())
            .optional("versionString", self.version_string.clone())
            .field("steps", steps)
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{InstructionStep, StepInfo};
    use serde_json::json;

    #[test]
    fn duplicate_step_identifiers_are_rejected() {
        let task = AssessmentTask::new(
            "survey",
            vec![
                Box::new(InstructionStep::new("intro", StepInfo::default())),
                Box::new(InstructionStep::new("intro", StepInfo::titled("Again"))),
            ],
        );
        assert!(matches!(
            task.validate(),
            Err(ModelError::DuplicateStepIdentifier { identifier }) if identifier == "intro"
        ));
    }

    #[test]
    fn new_result_carries_metadata() {
        let task = AssessmentTask::new("survey", Vec::new())
            .with_schema_identifier("survey-schema")
            .with_version_string("1.2");
        let result = task.new_result();
        assert_eq!(result.assessment_identifier(), Some("survey"));
        assert_eq!(result.schema_identifier(), Some("survey-schema"));
        assert_eq!(result.version_string(), Some("1.2"));
        assert_eq!(result.step_history().count(), 0);
    }

    #[test]
    fn decode_requires_steps() {
        let value = json!({"identifier": "survey"});
        assert!(AssessmentTask::decode(&value, Factory::shared()).is_err());
    }

    #[test]
    fn extension_picks_resource_type() {
        assert_eq!(ResourceType::from_path(Path::new("task.yml")), Some(ResourceType::Yaml));
        assert_eq!(ResourceType::from_path(Path::new("task.json")), Some(ResourceType::Json));
        assert_eq!(ResourceType::from_path(Path::new("task.txt")), None);
    }
}
