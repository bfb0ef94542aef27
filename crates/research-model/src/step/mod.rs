//! Step family
//!
//! A task is an ordered list of steps. Every step has an identifier, shared
//! presentation ([`StepInfo`]) and can create the empty result it will fill.
//! Variants are decoded through the factory's step registry.

mod active;
mod countdown;
mod instruction;
mod question;
mod transform;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use research_serialization::{
    Document, DocumentReader, DocumentWriter, FieldKind, SerializationError, SerializationResult,
};
use serde_json::Value;

use crate::action::{ButtonType, UIAction};
use crate::factory::Factory;
use crate::result::{ResultData, ResultObject};

pub use active::ActiveStep;
pub use countdown::{link_countdowns, ActiveStepLink, CountdownStep};
pub use instruction::InstructionStep;
pub use question::{InputOptions, QuestionStep};
pub use transform::{transform_step, StepTransform, TransformSource};

/// Discriminators of the bundled step variants
pub mod step_type {
    /// Text and image shown to the participant
    pub const INSTRUCTION: &str = "instruction";
    /// Single question with a typed answer
    pub const QUESTION: &str = "question";
    /// Timed pause before an active step
    pub const COUNTDOWN: &str = "countdown";
    /// Timed recording
    pub const ACTIVE: &str = "active";
    /// Placeholder replaced by a template or inline step
    pub const TRANSFORM: &str = "transform";
}

/// Presentation shared by every step
#[derive(Debug, Default)]
pub struct StepInfo {
    /// Primary text
    pub title: Option<String>,
    /// Secondary text
    pub subtitle: Option<String>,
    /// Longer description
    pub detail: Option<String>,
    /// Actions keyed by the button they replace
    pub actions: BTreeMap<ButtonType, Box<dyn UIAction>>,
    /// Buttons that are not shown
    pub should_hide_actions: Vec<ButtonType>,
}

impl StepInfo {
    /// Info with a title
    #[inline]
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Read the presentation fields of a step
    ///
    /// # Errors
    /// `FieldTypeMismatch` for badly typed fields, or any action that fails
    /// to decode
    pub fn decode(reader: &DocumentReader<'_>, factory: &Factory) -> SerializationResult<Self> {
        let mut actions = BTreeMap::new();
        if let Some(raw) = reader.optional_object("actions")? {
            for (key, value) in raw {
                actions.insert(key.parse::<ButtonType>()?, factory.decode_action(value)?);
            }
        }
        let should_hide_actions = reader
            .optional_string_array("shouldHideActions")?
            .unwrap_or_default()
            .iter()
            .map(|key| key.parse::<ButtonType>())
            .collect::<SerializationResult<Vec<_>>>()?;
        Ok(Self {
            title: reader.optional_string("title")?,
            subtitle: reader.optional_string("subtitle")?,
            detail: reader.optional_string("detail")?,
            actions,
            should_hide_actions,
        })
    }

    /// Write the presentation fields
    ///
    /// # Errors
    /// Any action that fails to encode
    pub fn encode(&self, writer: DocumentWriter) -> SerializationResult<DocumentWriter> {
        let actions = if self.actions.is_empty() {
            None
        } else {
            let mut encoded = Document::new();
            for (button, action) in &self.actions {
                encoded.insert(button.as_str().to_string(), Value::Object(action.encode()?));
            }
            Some(Value::Object(encoded))
        };
        let hidden = (!self.should_hide_actions.is_empty()).then(|| {
            self.should_hide_actions
                .iter()
                .map(|button| button.as_str())
                .collect::<Vec<_>>()
        });
        Ok(writer
            .optional("title", self.title.clone())
            .optional("subtitle", self.subtitle.clone())
            .optional("detail", self.detail.clone())
            .optional("actions", actions)
            .optional("shouldHideActions", hidden))
    }
}

/// A node of a task's step sequence
pub trait Step: fmt::Debug + Send + Sync + Any {
    /// Identifier, unique within a task
    fn identifier(&self) -> &str;

    /// Discriminator written as `"type"`
    fn step_type(&self) -> &str;

    /// Shared presentation
    fn info(&self) -> &StepInfo;

    /// Empty result this step fills
    fn instantiate_result(&self) -> Box<dyn ResultData> {
        Box::new(ResultObject::new(self.identifier()))
    }

    /// Encode with the discriminator first
    ///
    /// # Errors
    /// Any nested value that fails to encode
    fn encode(&self) -> SerializationResult<Document>;

    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Action attached to a button
    fn action(&self, button: ButtonType) -> Option<&dyn UIAction> {
        self.info().actions.get(&button).map(AsRef::as_ref)
    }

    /// Check whether a button is hidden
    fn should_hide_action(&self, button: ButtonType) -> bool {
        self.info().should_hide_actions.contains(&button)
    }
}

impl dyn Step {
    /// Borrow as a concrete step type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Step>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as a concrete step type
    #[inline]
    #[must_use]
    pub fn downcast_mut<T: Step>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Start a step document with the discriminator, identifier and info
fn encode_header(step: &dyn Step) -> SerializationResult<DocumentWriter> {
    let writer = DocumentWriter::new(step.step_type()).field("identifier", step.identifier());
    step.info().encode(writer)
}

/// Read a positive duration in seconds
fn duration(reader: &DocumentReader<'_>, default: f64) -> SerializationResult<f64> {
    match reader.optional_f64("duration")? {
        None => Ok(default),
        Some(seconds) if seconds > 0.0 && seconds.is_finite() => Ok(seconds),
        Some(_) => Err(SerializationError::mismatch("duration", FieldKind::Number)),
    }
}
