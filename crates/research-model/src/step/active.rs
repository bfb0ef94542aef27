//! Active steps
//!
//! An active step holds the participant on a timed task; a countdown may
//! lead into it.

use std::any::Any;

use research_serialization::{Document, DocumentReader, SerializationResult};
use serde_json::{json, Value};

use super::{duration, encode_header, step_type, Step, StepInfo};
use crate::factory::Factory;

/// Timed step that records sensor data or participant activity
#[derive(Debug)]
pub struct ActiveStep {
    identifier: String,
    info: StepInfo,
    duration: f64,
    commands: Vec<String>,
    spoken_instructions: Option<String>,
}

impl ActiveStep {
    /// Seconds used when a document declares no duration
    pub const DEFAULT_DURATION: f64 = 30.0;

    /// Create an active step
    #[must_use]
    pub fn new(identifier: impl Into<String>, duration: f64) -> Self {
        Self {
            identifier: identifier.into(),
            info: StepInfo::default(),
            duration,
            commands: Vec::new(),
            spoken_instructions: None,
        }
    }

    /// With presentation
    #[inline]
    #[must_use]
    pub fn with_info(mut self, info: StepInfo) -> Self {
        self.info = info;
        self
    }

    /// With commands run while the step is active
    #[inline]
    #[must_use]
    pub fn with_commands(mut self, commands: Vec<String>) -> Self {
        self.commands = commands;
        self
    }

    /// Length of the step in seconds
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Commands such as `transitionAutomatically` or `playSoundOnStart`
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Check whether a command is set
    #[inline]
    #[must_use]
    pub fn has_command(&self, command: &str) -> bool {
        self.commands.iter().any(|candidate| candidate == command)
    }

    /// Text read aloud when the step starts
    #[inline]
    #[must_use]
    pub fn spoken_instructions(&self) -> Option<&str> {
        self.spoken_instructions.as_deref()
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `FieldTypeMismatch` for a non-positive duration or non-string commands
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            info: StepInfo::decode(&reader, factory)?,
            duration: duration(&reader, Self::DEFAULT_DURATION)?,
            commands: reader.optional_string_array("commands")?.unwrap_or_default(),
            spoken_instructions: reader.optional_string("spokenInstructions")?,
        })
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": step_type::ACTIVE,
            "identifier": "walk",
            "title": "Walk",
            "duration": 30.0,
            "commands": ["transitionAutomatically", "vibrateOnFinish"],
            "spokenInstructions": "Start walking."
        })]
    }
}

impl Step for ActiveStep {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn step_type(&self) -> &str {
        step_type::ACTIVE
    }

    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn encode(&self) -> SerializationResult<Document> {
        let commands = (!self.commands.is_empty()).then(|| self.commands.clone());
        Ok(encode_header(self)?
            .field("duration", self.duration)
            .optional("commands", commands)
            .optional("spokenInstructions", self.spoken_instructions.clone())
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

    #[test]
    fn example_round_trip() {
        let example = &ActiveStep::examples()[0];
        let step = ActiveStep::decode(example, Factory::shared()).unwrap();
        assert!(step.has_command("vibrateOnFinish"));
        assert_eq!(&Value::Object(step.encode().unwrap()), example);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let value = json!({"identifier": "walk", "duration": -1});
        assert!(ActiveStep::decode(&value, Factory::shared()).is_err());
    }
}
