//! Instruction steps

use std::any::Any;

use research_serialization::{Document, DocumentReader, SerializationResult};
use serde_json::{json, Value};

use super::{encode_header, step_type, Step, StepInfo};
use crate::factory::Factory;

/// Step that shows text and an optional image
///
/// Default variant of the step family.
#[derive(Debug)]
pub struct InstructionStep {
    identifier: String,
    info: StepInfo,
    image_name: Option<String>,
}

impl InstructionStep {
    /// Create an instruction step
    #[must_use]
    pub fn new(identifier: impl Into<String>, info: StepInfo) -> Self {
        Self {
            identifier: identifier.into(),
            info,
            image_name: None,
        }
    }

    /// With an image
    #[inline]
    #[must_use]
    pub fn with_image_name(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = Some(image_name.into());
        self
    }

    /// Image shown with the text
    #[inline]
    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `MalformedDocument` for a missing identifier, or any bad action
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            info: StepInfo::decode(&reader, factory)?,
            image_name: reader.optional_string("imageName")?,
        })
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": step_type::INSTRUCTION,
            "identifier": "intro",
            "title": "Hello World!",
            "detail": "This is a test.",
            "actions": {
                "learnMore": {"type": "webView", "url": "About_Dogs.html", "buttonTitle": "Go, Dogs! Go"}
            },
            "shouldHideActions": ["goBackward"],
            "imageName": "happyFaceIcon"
        })]
    }
}

impl Step for InstructionStep {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn step_type(&self) -> &str {
        step_type::INSTRUCTION
    }

    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn encode(&self) -> SerializationResult<Document> {
        Ok(encode_header(self)?
            .optional("imageName", self.image_name.clone())
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
    use crate::action::{ButtonType, WebViewAction};
    use pretty_assertions::assert_eq;

    #[test]
    fn example_round_trip() {
        let example = &InstructionStep::examples()[0];
        let step = InstructionStep::decode(example, Factory::shared()).unwrap();
        assert!(step.should_hide_action(ButtonType::GoBackward));
        let learn_more = step.action(ButtonType::LearnMore).unwrap();
        assert!(learn_more.downcast_ref::<WebViewAction>().is_some());
        assert_eq!(&Value::Object(step.encode().unwrap()), example);
    }
}
