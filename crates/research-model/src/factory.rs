//! Serialization factory
//!
//! The [`Factory`] owns one [`TypeRegistry`] per capability family (results,
//! steps, UI actions) plus the step templates used by transform nodes. It is
//! passed explicitly through every decode call so nested polymorphic fields
//! are decoded with the same registries as their parent.
//!
//! # Usage
//!
//! ```ignore
//! let factory = Factory::try_new(FactoryConfig::new())?;
//! let task = factory.decode_task(text, ResourceType::Json)?;
//! let mut result = task.new_result();
//! result.append_step_history(task.steps().next().unwrap().instantiate_result());
//! let document = factory.encode_result(&result)?;
//! ```

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use research_serialization::{SerializationResult, TypeRegistry};
use serde_json::Value;

use crate::action::{
    action_type, DefaultAction, NavigationAction, ReminderAction, UIAction, VideoViewAction,
    WebViewAction,
};
use crate::config::FactoryConfig;
use crate::error::{ModelError, ModelResult};
use crate::result::{
    result_type, AnswerResult, CollectionResult, ErrorResult, FileResult, NavigationResult,
    ResultData, ResultObject, SectionResult, TaskResult,
};
use crate::step::{
    link_countdowns, step_type, transform_step, ActiveStep, CountdownStep, InstructionStep,
    QuestionStep, Step, StepTransform,
};
use crate::task::{AssessmentTask, ResourceType};

/// Registry of result constructors
pub type ResultRegistry = TypeRegistry<dyn ResultData, Factory>;
/// Registry of step constructors
pub type StepRegistry = TypeRegistry<dyn Step, Factory>;
/// Registry of UI action constructors
pub type ActionRegistry = TypeRegistry<dyn UIAction, Factory>;

static SHARED: Lazy<Factory> = Lazy::new(|| match Factory::try_new(FactoryConfig::default()) {
    Ok(factory) => factory,
    Err(err) => panic!("bundled registry examples failed to decode: {err}"),
});

macro_rules! boxed {
    ($family:ty, $decode:expr) => {
        |value: &Value, factory: &Factory| -> SerializationResult<Box<$family>> {
            Ok(Box::new($decode(value, factory)?) as Box<$family>)
        }
    };
}

macro_rules! boxed_action {
    ($action:ty) => {
        |value: &Value, _factory: &Factory| -> SerializationResult<Box<dyn UIAction>> {
            Ok(Box::new(<$action>::decode(value)?) as Box<dyn UIAction>)
        }
    };
}

/// Decoding context holding every capability family
#[derive(Debug)]
pub struct Factory {
    config: FactoryConfig,
    results: ResultRegistry,
    steps: StepRegistry,
    actions: ActionRegistry,
    templates: HashMap<String, Value>,
}

impl Factory {
    /// Build a factory with the bundled variants registered
    ///
    /// # Errors
    /// `Config` for invalid configuration, `Serialization` when
    /// `verify_examples` is set and a bundled example fails to decode
    pub fn try_new(config: FactoryConfig) -> ModelResult<Self> {
        config.validate()?;
        let mut factory = Self {
            results: bundled_results(),
            steps: bundled_steps(),
            actions: bundled_actions(),
            templates: HashMap::new(),
            config,
        };
        let strict = factory.config.strict_discriminators;
        factory.results.set_strict(strict);
        factory.steps.set_strict(strict);
        factory.actions.set_strict(strict);

        if factory.config.verify_examples {
            let checked = factory.verify_examples()?;
            tracing::debug!(checked, "verified bundled examples");
        }
        Ok(factory)
    }

    /// Process-wide factory with the default configuration
    ///
    /// # Panics
    /// If a bundled example fails to decode, which is a packaging defect
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Configuration the factory was built with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Result family
    #[inline]
    #[must_use]
    pub fn results(&self) -> &ResultRegistry {
        &self.results
    }

    /// Result family, for registering custom variants
    #[inline]
    pub fn results_mut(&mut self) -> &mut ResultRegistry {
        &mut self.results
    }

    /// Step family
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    /// Step family, for registering custom variants
    #[inline]
    pub fn steps_mut(&mut self) -> &mut StepRegistry {
        &mut self.steps
    }

    /// UI action family
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// UI action family, for registering custom variants
    #[inline]
    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    /// Register a step template for transform nodes
    ///
    /// Returns `true` if a template with the same name was replaced.
    pub fn register_template(&mut self, name: impl Into<String>, template: Value) -> bool {
        let name = name.into();
        let replaced = self.templates.insert(name.clone(), template).is_some();
        if replaced {
            tracing::debug!(template = %name, "replaced step template");
        }
        replaced
    }

    /// Template registered under a name
    #[inline]
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&Value> {
        self.templates.get(name)
    }

    /// Decode one polymorphic result
    ///
    /// # Errors
    /// Any `SerializationError` raised by the lookup or the constructor
    #[inline]
    pub fn decode_result(&self, value: &Value) -> SerializationResult<Box<dyn ResultData>> {
        self.results.decode(value, self)
    }

    /// Decode the array of polymorphic results held in `field`, preserving order
    ///
    /// # Errors
    /// `FieldTypeMismatch` naming `field` for a non-array, or the first
    /// element error
    #[inline]
    pub fn decode_results(
        &self,
        field: &str,
        value: &Value,
    ) -> SerializationResult<Vec<Box<dyn ResultData>>> {
        self.results.decode_array(field, value, self)
    }

    /// Parse JSON text and decode the result it holds
    ///
    /// # Errors
    /// `MalformedDocument` for invalid JSON, otherwise as [`Self::decode_result`]
    pub fn decode_result_text(&self, text: &str) -> SerializationResult<Box<dyn ResultData>> {
        let value: Value = serde_json::from_str(text)?;
        self.decode_result(&value)
    }

    /// Decode one polymorphic step
    ///
    /// # Errors
    /// Any `SerializationError` raised by the lookup or the constructor
    #[inline]
    pub fn decode_step(&self, value: &Value) -> SerializationResult<Box<dyn Step>> {
        self.steps.decode(value, self)
    }

    /// Decode the array of steps held in `field` and link countdowns to
    /// active steps
    ///
    /// # Errors
    /// `FieldTypeMismatch` naming `field` for a non-array, or the first
    /// element error
    pub fn decode_steps(&self, field: &str, value: &Value) -> SerializationResult<Vec<Box<dyn Step>>> {
        let mut steps = self.steps.decode_array(field, value, self)?;
        link_countdowns(&mut steps);
        Ok(steps)
    }

    /// Decode one polymorphic UI action
    ///
    /// # Errors
    /// Any `SerializationError` raised by the lookup or the constructor
    #[inline]
    pub fn decode_action(&self, value: &Value) -> SerializationResult<Box<dyn UIAction>> {
        self.actions.decode(value, self)
    }

    /// Parse and validate a task definition
    ///
    /// # Errors
    /// `Resource` for text that does not parse, `Serialization` for a bad
    /// document, `DuplicateStepIdentifier` for repeated step identifiers
    pub fn decode_task(&self, text: &str, resource_type: ResourceType) -> ModelResult<AssessmentTask> {
        let value: Value = match resource_type {
            ResourceType::Json => serde_json::from_str(text)
                .map_err(|err| ModelError::resource(resource_type.as_str(), err.to_string()))?,
            ResourceType::Yaml => serde_yaml::from_str(text)
                .map_err(|err| ModelError::resource(resource_type.as_str(), err.to_string()))?,
        };
        let task = AssessmentTask::decode(&value, self)?;
        task.validate()?;
        tracing::debug!(
            identifier = task.identifier(),
            steps = task.len(),
            resource_type = resource_type.as_str(),
            "decoded task"
        );
        Ok(task)
    }

    /// Load a task definition from a file, picking the format from its extension
    ///
    /// # Errors
    /// `Resource` for an unknown extension or unreadable file, otherwise as
    /// [`Self::decode_task`]
    pub fn load_task(&self, path: impl AsRef<Path>) -> ModelResult<AssessmentTask> {
        let path = path.as_ref();
        let resource_type = ResourceType::from_path(path).ok_or_else(|| {
            ModelError::resource("task", format!("unknown extension for {}", path.display()))
        })?;
        let text = std::fs::read_to_string(path)
            .map_err(|err| ModelError::resource(resource_type.as_str(), format!("{}: {err}", path.display())))?;
        self.decode_task(&text, resource_type)
    }

    /// Encode a result tree
    ///
    /// # Errors
    /// Any node that fails to encode
    #[inline]
    pub fn encode_result(&self, result: &dyn ResultData) -> SerializationResult<Value> {
        result.encode().map(Value::Object)
    }

    /// Encode a result tree as pretty-printed JSON text
    ///
    /// # Errors
    /// Any node that fails to encode
    pub fn encode_result_text(&self, result: &dyn ResultData) -> SerializationResult<String> {
        Ok(serde_json::to_string_pretty(&self.encode_result(result)?)?)
    }

    /// Decode every bundled example of every family
    ///
    /// # Errors
    /// The first example that fails to decode
    pub fn verify_examples(&self) -> SerializationResult<usize> {
        Ok(self.results.verify_examples(self)?
            + self.steps.verify_examples(self)?
            + self.actions.verify_examples(self)?)
    }
}

fn bundled_results() -> ResultRegistry {
    let mut registry = ResultRegistry::new("results");
    registry.register_with_examples(
        result_type::BASE,
        boxed!(dyn ResultData, ResultObject::decode),
        ResultObject::examples(),
    );
    registry.register_with_examples(
        result_type::ANSWER,
        boxed!(dyn ResultData, AnswerResult::decode),
        AnswerResult::examples(),
    );
    registry.register_with_examples(
        result_type::FILE,
        boxed!(dyn ResultData, FileResult::decode),
        FileResult::examples(),
    );
    registry.register_with_examples(
        result_type::ERROR,
        boxed!(dyn ResultData, ErrorResult::decode),
        ErrorResult::examples(),
    );
    registry.register_with_examples(
        result_type::COLLECTION,
        boxed!(dyn ResultData, CollectionResult::decode),
        CollectionResult::examples(),
    );
    registry.register_with_examples(
        result_type::TASK,
        boxed!(dyn ResultData, TaskResult::decode),
        TaskResult::examples(),
    );
    registry.register_with_examples(
        result_type::SECTION,
        boxed!(dyn ResultData, SectionResult::decode),
        SectionResult::examples(),
    );
    registry.register_with_examples(
        result_type::NAVIGATION,
        boxed!(dyn ResultData, NavigationResult::decode),
        NavigationResult::examples(),
    );
    registry.set_default(boxed!(dyn ResultData, ResultObject::decode));
    registry
}

fn bundled_steps() -> StepRegistry {
    let mut registry = StepRegistry::new("steps");
    registry.register_with_examples(
        step_type::INSTRUCTION,
        boxed!(dyn Step, InstructionStep::decode),
        InstructionStep::examples(),
    );
    registry.register_with_examples(
        step_type::QUESTION,
        boxed!(dyn Step, QuestionStep::decode),
        QuestionStep::examples(),
    );
    registry.register_with_examples(
        step_type::COUNTDOWN,
        boxed!(dyn Step, CountdownStep::decode),
        CountdownStep::examples(),
    );
    registry.register_with_examples(
        step_type::ACTIVE,
        boxed!(dyn Step, ActiveStep::decode),
        ActiveStep::examples(),
    );
    registry.register_with_examples(step_type::TRANSFORM, transform_step, StepTransform::examples());
    registry.set_default(boxed!(dyn Step, InstructionStep::decode));
    registry
}

fn bundled_actions() -> ActionRegistry {
    let mut registry = ActionRegistry::new("actions");
    registry.register_with_examples(
        action_type::DEFAULT,
        boxed_action!(DefaultAction),
        DefaultAction::examples(),
    );
    registry.register_with_examples(
        action_type::NAVIGATION,
        boxed_action!(NavigationAction),
        NavigationAction::examples(),
    );
    registry.register_with_examples(
        action_type::REMINDER,
        boxed_action!(ReminderAction),
        ReminderAction::examples(),
    );
    registry.register_with_examples(
        action_type::WEB_VIEW,
        boxed_action!(WebViewAction),
        WebViewAction::examples(),
    );
    registry.register_with_examples(
        action_type::VIDEO_VIEW,
        boxed_action!(VideoViewAction),
        VideoViewAction::examples(),
    );
    registry.set_default(boxed_action!(DefaultAction));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_serialization::SerializationError;
    use serde_json::json;

    #[test]
    fn shared_factory_has_every_family() {
        let factory = Factory::shared();
        assert_eq!(factory.results().len(), 8);
        assert_eq!(factory.steps().len(), 5);
        assert_eq!(factory.actions().len(), 5);
        assert!(factory.verify_examples().unwrap() >= 18);
    }

    #[test]
    fn every_bundled_variant_has_an_example() {
        let factory = Factory::shared();
        for name in factory.results().discriminators() {
            assert!(!factory.results().examples(name).is_empty(), "result '{name}'");
        }
        for name in factory.steps().discriminators() {
            assert!(!factory.steps().examples(name).is_empty(), "step '{name}'");
        }
        for name in factory.actions().discriminators() {
            assert!(!factory.actions().examples(name).is_empty(), "action '{name}'");
        }
    }

    #[test]
    fn result_examples_survive_encoding() {
        let factory = Factory::shared();
        for name in factory.results().discriminators() {
            for example in factory.results().examples(name) {
                let decoded = factory.decode_result(example).unwrap();
                assert_eq!(decoded.serializable_type(), name);
                let again = factory.decode_result(&factory.encode_result(decoded.as_ref()).unwrap()).unwrap();
                assert_eq!(&again, &decoded, "result '{name}'");
            }
        }
    }

    #[test]
    fn missing_type_uses_default_result() {
        let result = Factory::shared()
            .decode_result(&json!({"identifier": "foo"}))
            .unwrap();
        assert_eq!(result.serializable_type(), result_type::BASE);
    }

    #[test]
    fn strict_factory_rejects_unknown_type() {
        let factory = Factory::try_new(FactoryConfig::new().with_strict_discriminators(true)).unwrap();
        let value = json!({"type": "spinner", "identifier": "foo"});
        assert_eq!(
            factory.decode_step(&value).unwrap_err(),
            SerializationError::unresolved("steps", Some("spinner"))
        );
        assert!(factory.decode_step(&json!({"identifier": "foo"})).is_ok());
    }

    #[test]
    fn removed_variant_is_unresolved_when_strict() {
        let mut factory = Factory::try_new(FactoryConfig::new()).unwrap();
        assert!(factory.results_mut().remove(result_type::ANSWER));
        assert_eq!(factory.results().discriminators().len(), 7);
        factory.results_mut().set_strict(true);
        let err = factory
            .decode_result(&json!({"type": "answer", "identifier": "q1"}))
            .unwrap_err();
        assert_eq!(err, SerializationError::unresolved("results", Some("answer")));
    }

    #[test]
    fn custom_registration_overrides_bundled() {
        let mut factory = Factory::try_new(FactoryConfig::new()).unwrap();
        let replaced = factory.results_mut().register(result_type::FILE, |value, factory| {
            Ok(Box::new(ResultObject::decode(value, factory)?) as Box<dyn ResultData>)
        });
        assert!(replaced);
        let result = factory
            .decode_result(&json!({"type": "file", "identifier": "f"}))
            .unwrap();
        assert!(result.downcast_ref::<ResultObject>().is_some());
    }

    #[test]
    fn yaml_task_decodes() {
        let text = "identifier: walk\nsteps:\n  - type: countdown\n    identifier: c1\n  - type: active\n    identifier: walking\n    duration: 30\n";
        let task = Factory::shared().decode_task(text, ResourceType::Yaml).unwrap();
        assert_eq!(task.len(), 2);
        let countdown = task.step("c1").and_then(|step| step.downcast_ref::<CountdownStep>()).unwrap();
        assert_eq!(countdown.active_step().map(|link| link.index), Some(1));
    }

    #[test]
    fn unparsable_task_is_resource_error() {
        let err = Factory::shared().decode_task("{", ResourceType::Json).unwrap_err();
        assert!(matches!(err, ModelError::Resource { resource_type: "json", .. }));
    }
}
