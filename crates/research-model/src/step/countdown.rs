//! Countdown steps
//!
//! A countdown pauses before the active step that follows it.

use std::any::Any;

use research_serialization::{Document, DocumentReader, SerializationResult};
use serde_json::{json, Value};

use super::{duration, encode_header, step_type, ActiveStep, Step, StepInfo};
use crate::factory::Factory;

/// Position of the active step a countdown leads into
///
/// Resolved after decoding, never encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStepLink {
    /// Index in the decoded step array
    pub index: usize,
    /// Identifier of the active step
    pub identifier: String,
}

/// Timed pause shown before an active step
#[derive(Debug)]
pub struct CountdownStep {
    identifier: String,
    info: StepInfo,
    duration: f64,
    active_step: Option<ActiveStepLink>,
}

impl CountdownStep {
    /// Seconds used when a document declares no duration
    pub const DEFAULT_DURATION: f64 = 5.0;

    /// Create a countdown with the default duration
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            info: StepInfo::default(),
            duration: Self::DEFAULT_DURATION,
            active_step: None,
        }
    }

    /// With a duration in seconds
    #[inline]
    #[must_use]
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Length of the countdown in seconds
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Active step this countdown leads into, once linked
    #[inline]
    #[must_use]
    pub fn active_step(&self) -> Option<&ActiveStepLink> {
        self.active_step.as_ref()
    }

    /// Decode from a document node
    ///
    /// # Errors
    /// `FieldTypeMismatch` for a non-positive duration
    pub fn decode(value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        Ok(Self {
            identifier: reader.identifier()?.to_string(),
            info: StepInfo::decode(&reader, factory)?,
            duration: duration(&reader, Self::DEFAULT_DURATION)?,
            active_step: None,
        })
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": step_type::COUNTDOWN,
            "identifier": "countdown",
            "title": "Get ready",
            "duration": 5.0
        })]
    }
}

impl Step for CountdownStep {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn step_type(&self) -> &str {
        step_type::COUNTDOWN
    }

    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn encode(&self) -> SerializationResult<Document> {
        Ok(encode_header(self)?.field("duration", self.duration).finish())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Link every countdown to an active step that immediately follows it
///
/// Runs once per decoded step array, in array order. Returns the number of
/// links made.
pub fn link_countdowns(steps: &mut [Box<dyn Step>]) -> usize {
    let mut linked = 0;
    for index in 1..steps.len() {
        let Some(active) = steps[index].downcast_ref::<ActiveStep>() else {
            continue;
        };
        let link = ActiveStepLink {
            index,
            identifier: active.identifier().to_string(),
        };
        if let Some(countdown) = steps[index - 1].downcast_mut::<CountdownStep>() {
            tracing::debug!(
                countdown = %countdown.identifier,
                active = %link.identifier,
                "linked countdown to active step"
            );
            countdown.active_step = Some(link);
            linked += 1;
        }
    }
    linked
}
