//! Result tree model
//!
//! Every node of a result tree implements [`ResultData`]. Leaves record one
//! answer, file, error or navigation decision; [`CollectionResult`],
//! [`SectionResult`] and [`TaskResult`] hold children keyed by identifier.
//!
//! Nodes are owned by their parent (`Box<dyn ResultData>`), so a tree has a
//! single owner and [`ResultData::deep_copy`] always yields an independent
//! tree.

mod answer;
mod base;
mod collection;
mod error;
mod file;
mod set;
mod task;

use std::any::Any;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use research_serialization::{
    now_millis, Document, DocumentReader, DocumentWriter, SerializationError, SerializationResult,
};

use crate::error::{ModelError, ModelResult};

pub use answer::AnswerResult;
pub use base::{NavigationResult, ResultObject};
pub use collection::CollectionResult;
pub use error::ErrorResult;
pub use file::FileResult;
pub use set::ResultSet;
pub use task::{Direction, PathMarker, SectionResult, TaskResult};

/// Discriminators of the bundled result variants
pub mod result_type {
    /// Identifier and timestamps only
    pub const BASE: &str = "base";
    /// Typed answer
    pub const ANSWER: &str = "answer";
    /// Reference to a file on disk
    pub const FILE: &str = "file";
    /// Failure recorded in place of a result
    pub const ERROR: &str = "error";
    /// Ordered children with unique identifiers
    pub const COLLECTION: &str = "collection";
    /// Root of one task run
    pub const TASK: &str = "task";
    /// Step history of a sub-section
    pub const SECTION: &str = "section";
    /// Navigation decision
    pub const NAVIGATION: &str = "navigation";
}

/// Start and end of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultTiming {
    start_date: DateTime<FixedOffset>,
    end_date: Option<DateTime<FixedOffset>>,
}

impl ResultTiming {
    /// Timing starting now, not yet finished
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self::starting_at(now_millis())
    }

    /// Timing starting at a given date
    #[inline]
    #[must_use]
    pub fn starting_at(start_date: DateTime<FixedOffset>) -> Self {
        Self {
            start_date,
            end_date: None,
        }
    }

    /// Start date
    #[inline]
    #[must_use]
    pub fn start_date(&self) -> DateTime<FixedOffset> {
        self.start_date
    }

    /// End date, if finished
    #[inline]
    #[must_use]
    pub fn end_date(&self) -> Option<DateTime<FixedOffset>> {
        self.end_date
    }

    /// Set the end date
    ///
    /// # Errors
    /// `EndBeforeStart` if `end_date` precedes the start date
    pub fn finish(&mut self, identifier: &str, end_date: DateTime<FixedOffset>) -> ModelResult<()> {
        if end_date < self.start_date {
            return Err(ModelError::EndBeforeStart {
                identifier: identifier.to_string(),
            });
        }
        self.end_date = Some(end_date);
        Ok(())
    }

    /// Read `startDate` and `endDate`
    ///
    /// A missing start date means "now".
    ///
    /// # Errors
    /// `FieldTypeMismatch` for unparsable dates, `MalformedDocument` when the
    /// end precedes the start
    pub fn decode(reader: &DocumentReader<'_>) -> SerializationResult<Self> {
        let start_date = reader.optional_timestamp("startDate")?.unwrap_or_else(now_millis);
        let end_date = reader.optional_timestamp("endDate")?;
        if end_date.is_some_and(|end| end < start_date) {
            return Err(SerializationError::malformed("endDate precedes startDate"));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Write `startDate` and `endDate`
    #[must_use]
    pub fn encode(&self, writer: DocumentWriter) -> DocumentWriter {
        writer
            .timestamp("startDate", &self.start_date)
            .optional_timestamp("endDate", self.end_date.as_ref())
    }
}

impl Default for ResultTiming {
    fn default() -> Self {
        Self::now()
    }
}

/// A node of the result tree
pub trait ResultData: fmt::Debug + Send + Sync + Any {
    /// Identifier, never empty
    fn identifier(&self) -> &str;

    /// Discriminator written as `"type"`
    fn serializable_type(&self) -> &str;

    /// Start and end of the result
    fn timing(&self) -> &ResultTiming;

    /// Mutable start and end of the result
    fn timing_mut(&mut self) -> &mut ResultTiming;

    /// Encode with the discriminator first and variant fields in fixed order
    ///
    /// # Errors
    /// `FieldTypeMismatch` when a stored value cannot be written
    fn encode(&self) -> SerializationResult<Document>;

    /// Independent copy of this node and everything below it
    fn deep_copy(&self) -> Box<dyn ResultData>;

    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Structural equality against another node
    fn dyn_eq(&self, other: &dyn ResultData) -> bool;

    /// Start date
    fn start_date(&self) -> DateTime<FixedOffset> {
        self.timing().start_date()
    }

    /// End date, if finished
    fn end_date(&self) -> Option<DateTime<FixedOffset>> {
        self.timing().end_date()
    }
}

impl dyn ResultData {
    /// Borrow as a concrete result type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: ResultData>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as a concrete result type
    #[inline]
    #[must_use]
    pub fn downcast_mut<T: ResultData>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Set the end date
    ///
    /// # Errors
    /// `EndBeforeStart` if `end_date` precedes the start date
    pub fn finish(&mut self, end_date: DateTime<FixedOffset>) -> ModelResult<()> {
        let identifier = self.identifier().to_string();
        self.timing_mut().finish(&identifier, end_date)
    }
}

impl PartialEq for dyn ResultData {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Clone for Box<dyn ResultData> {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}

/// Equality between a concrete node and any node
pub(crate) fn downcast_eq<T: ResultData + PartialEq>(this: &T, other: &dyn ResultData) -> bool {
    other.as_any().downcast_ref::<T>() == Some(this)
}

/// Boilerplate shared by every `ResultData` implementation
///
/// Expects `identifier: String` and `timing: ResultTiming` fields and a
/// `Clone + PartialEq` implementation.
macro_rules! result_data_common {
    ($type_name:expr) => {
        fn identifier(&self) -> &str {
            &self.identifier
        }

        fn serializable_type(&self) -> &str {
            $type_name
        }

        fn timing(&self) -> &$crate::result::ResultTiming {
            &self.timing
        }

        fn timing_mut(&mut self) -> &mut $crate::result::ResultTiming {
            &mut self.timing
        }

        fn deep_copy(&self) -> Box<dyn $crate::result::ResultData> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn dyn_eq(&self, other: &dyn $crate::result::ResultData) -> bool {
            $crate::result::downcast_eq(self, other)
        }
    };
}

pub(crate) use result_data_common;
