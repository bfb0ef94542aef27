//! Research Model
//!
//! Result trees, step definitions, UI actions and the serialization factory
//! that decodes them from type-tagged documents.
//!
//! # Core Concepts
//!
//! - [`Factory`]: one registry per capability family, threaded through every decode
//! - [`ResultData`]: node of a result tree, from single answers up to [`TaskResult`]
//! - [`ResultSet`]: identifier-keyed, insertion-ordered children
//! - [`Step`]: node of a task's step sequence, able to create its empty result
//! - [`UIAction`]: behavior attached to a step button
//! - [`AssessmentTask`]: decoded task definition (JSON or YAML)
//!
//! # Example
//!
//! ```rust,ignore
//! use research_model::{Factory, ResultData, ResourceType};
//!
//! let factory = Factory::shared();
//! let task = factory.decode_task(&text, ResourceType::Json)?;
//!
//! let mut run = task.new_result();
//! for step in task.steps() {
//!     run.append_step_history(step.instantiate_result());
//! }
//! println!("{}", factory.encode_result_text(&run)?);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod answer_type;
pub mod config;
pub mod error;
pub mod factory;
pub mod result;
pub mod step;
pub mod task;

pub use action::{
    ButtonInfo, ButtonType, DefaultAction, NavigationAction, ReminderAction, UIAction,
    VideoViewAction, WebViewAction,
};
pub use answer_type::{AnswerType, BaseType};
pub use config::FactoryConfig;
pub use error::{ConfigError, ModelError, ModelResult};
pub use factory::{ActionRegistry, Factory, ResultRegistry, StepRegistry};
pub use result::{
    AnswerResult, CollectionResult, Direction, ErrorResult, FileResult, NavigationResult,
    PathMarker, ResultData, ResultObject, ResultSet, ResultTiming, SectionResult, TaskResult,
};
pub use step::{
    link_countdowns, ActiveStep, ActiveStepLink, CountdownStep, InputOptions, InstructionStep,
    QuestionStep, Step, StepInfo, StepTransform, TransformSource,
};
pub use task::{AssessmentTask, ResourceType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
