//! Transform steps
//!
//! A transform node stands in for a step defined elsewhere: a named template
//! registered with the factory, or a step document inlined under `"step"`.
//! The node's identifier and `replacements` are laid over the source before
//! it is decoded. A source may itself be a transform; chains are followed up
//! to the factory's `max_transform_depth`.

use research_serialization::{
    as_document, discriminator, Document, DocumentReader, SerializationError, SerializationResult,
};
use serde_json::{json, Value};

use super::{step_type, Step};
use crate::factory::Factory;

/// Where a transform takes its step from
#[derive(Debug, Clone, PartialEq)]
pub enum TransformSource {
    /// Template registered with [`Factory::register_template`]
    Template(String),
    /// Step document inlined in the transform
    Inline(Document),
}

/// A decoded transform node
#[derive(Debug, Clone, PartialEq)]
pub struct StepTransform {
    identifier: Option<String>,
    source: TransformSource,
    replacements: Document,
}

impl StepTransform {
    /// Read a transform node
    ///
    /// # Errors
    /// `MalformedDocument` when neither `template` nor `step` is present
    pub fn decode(value: &Value) -> SerializationResult<Self> {
        let reader = DocumentReader::new(value)?;
        let source = match (reader.optional_str("template")?, reader.optional_object("step")?) {
            (Some(name), _) => TransformSource::Template(name.to_string()),
            (None, Some(step)) => TransformSource::Inline(step.clone()),
            (None, None) => {
                return Err(SerializationError::malformed(
                    "transform needs a 'template' or an inline 'step'",
                ))
            }
        };
        Ok(Self {
            identifier: reader.optional_string("identifier")?,
            source,
            replacements: reader.optional_object("replacements")?.cloned().unwrap_or_default(),
        })
    }

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": step_type::TRANSFORM,
            "identifier": "welcome",
            "step": {"type": step_type::INSTRUCTION, "identifier": "intro", "title": "Hello World!"},
            "replacements": {"detail": "Thanks for joining the study."}
        })]
    }

    /// Identifier given to the transformed step
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Source of the step
    #[inline]
    #[must_use]
    pub fn source(&self) -> &TransformSource {
        &self.source
    }

    /// Build the transformed step document
    ///
    /// # Errors
    /// `UnresolvedType` for an unregistered template
    pub fn apply(&self, factory: &Factory) -> SerializationResult<Document> {
        let mut document = match &self.source {
            TransformSource::Template(name) => factory
                .template(name)
                .ok_or_else(|| SerializationError::unresolved("templates", Some(name)))
                .and_then(as_document)?
                .clone(),
            TransformSource::Inline(step) => step.clone(),
        };
        if let Some(identifier) = &self.identifier {
            document.insert("identifier".to_string(), Value::String(identifier.clone()));
        }
        for (key, value) in &self.replacements {
            document.insert(key.clone(), value.clone());
        }
        Ok(document)
    }
}

/// Decode a transform node into the step it stands for
///
/// # Errors
/// `MalformedDocument` when the chain of transforms is longer than the
/// factory's `max_transform_depth`, or any error decoding the final step
pub fn transform_step(value: &Value, factory: &Factory) -> SerializationResult<Box<dyn Step>> {
    let limit = factory.config().max_transform_depth;
    let mut current = value.clone();
    for depth in 1..=limit {
        let transformed = StepTransform::decode(&current)?.apply(factory)?;
        tracing::debug!(
            identifier = transformed.get("identifier").and_then(serde_json::Value::as_str).unwrap_or("<none>"),
            depth,
            "substituted transformed step"
        );
        let is_transform = discriminator(&transformed)? == Some(step_type::TRANSFORM);
        current = Value::Object(transformed);
        if !is_transform {
            return factory.decode_step(&current);
        }
    }
    Err(SerializationError::malformed(format!(
        "transform chain exceeds max depth {limit}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use crate::step::{CountdownStep, InstructionStep};
    use serde_json::json;

    fn factory_with_template() -> Factory {
        let mut factory = Factory::try_new(FactoryConfig::new().with_max_transform_depth(2)).unwrap();
        factory.register_template(
            "getReady",
            json!({"type": "countdown", "identifier": "template", "title": "Get ready", "duration": 5}),
        );
        factory
    }

    #[test]
    fn template_with_replacements() {
        let factory = factory_with_template();
        let value = json!({
            "type": "transform",
            "identifier": "countdown1",
            "template": "getReady",
            "replacements": {"duration": 3}
        });
        let step = factory.decode_step(&value).unwrap();
        let countdown = step.downcast_ref::<CountdownStep>().unwrap();
        assert_eq!(countdown.identifier(), "countdown1");
        assert!((countdown.duration() - 3.0).abs() < f64::EPSILON);
        assert_eq!(countdown.info().title.as_deref(), Some("Get ready"));
    }

    #[test]
    fn inline_step_without_type_uses_default() {
        let factory = factory_with_template();
        let value = json!({
            "type": "transform",
            "step": {"identifier": "intro", "title": "Welcome"}
        });
        let step = factory.decode_step(&value).unwrap();
        assert!(step.downcast_ref::<InstructionStep>().is_some());
    }

    #[test]
    fn unknown_template_is_unresolved() {
        let factory = factory_with_template();
        let value = json!({"type": "transform", "template": "missing"});
        assert_eq!(
            factory.decode_step(&value).unwrap_err(),
            SerializationError::unresolved("templates", Some("missing"))
        );
    }

    #[test]
    fn chains_stop_at_max_depth() {
        let factory = factory_with_template();
        let nested = |inner: Value| json!({"type": "transform", "step": inner});
        let two = nested(nested(json!({"type": "countdown", "identifier": "c"})));
        assert!(factory.decode_step(&two).is_ok());

        let three = nested(two);
        assert!(matches!(
            factory.decode_step(&three),
            Err(SerializationError::MalformedDocument { .. })
        ));
    }
}
