//! Research Input
//!
//! Coding and validation of participant answers.
//!
//! # Core Concepts
//!
//! - [`AnswerValue`]: a validated, typed answer
//! - [`DateCoder`]: calendar components and storage pattern derived from a date pattern
//! - [`TextInputValidator`]: validates typed text or answers and renders stored answers
//! - [`IntegerFormatOptions`], [`DoubleFormatOptions`], [`YearFormatOptions`]: numeric entry
//! - [`DateTimeValidator`]: date and time entry with an optional range
//! - [`RegExValidator`]: pattern-constrained text entry
//!
//! # Example
//!
//! ```rust,ignore
//! use research_input::{IntegerFormatOptions, TextInputValidator};
//!
//! let options = IntegerFormatOptions::new().with_range(Some(0), Some(10));
//! let answer = options.validate_text(Some("5"))?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod answer;
mod date_coder;
mod date_time;
mod error;
mod number;
mod pattern;
mod validator;

pub use answer::AnswerValue;
pub use date_coder::{
    derive_components, storage_pattern, CalendarComponent, DateCoder, PatternFormat,
    EXAMPLE_PATTERNS, TIMESTAMP_PATTERN,
};
pub use date_time::{DatePickerMode, DateRange, DateTimeValidator};
pub use error::{CoderError, InputError, InputResult, DEFAULT_INVALID_NUMBER_MESSAGE};
pub use number::{
    DoubleFormatOptions, IntegerFormatOptions, InvalidMessages, NumberFormatStyle,
    NumberFormatter, NumberValidator, YearFormatOptions,
};
pub use pattern::RegExValidator;
pub use validator::{PassThruValidator, TextInputValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
