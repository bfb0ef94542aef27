//! Research Serialization
//!
//! Type-tagged document codec shared by every model family.
//!
//! # Core Concepts
//!
//! - [`TypeRegistry`]: discriminator → constructor map for one capability family
//! - [`DocumentReader`]: typed field access with precise error reporting
//! - [`DocumentWriter`]: ordered field emission, discriminator first
//! - [`SerializationError`]: malformed documents, unresolved types, field mismatches
//!
//! # Example
//!
//! ```rust,ignore
//! use research_serialization::{DocumentReader, TypeRegistry};
//!
//! let mut registry: TypeRegistry<dyn Shape, ()> = TypeRegistry::new("shapes");
//! registry.register("circle", |value, _| {
//!     let radius = DocumentReader::new(value)?.optional_f64("radius")?.unwrap_or(1.0);
//!     Ok(Box::new(Circle(radius)))
//! });
//!
//! let shape = registry.decode(&serde_json::json!({"type": "circle"}), &())?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod document;
mod error;
mod registry;
mod timestamp;

pub use document::{
    as_document, decode_serde, discriminator, encode_serde, Document, DocumentReader, DocumentWriter,
    TYPE_KEY,
};
pub use error::{FieldKind, SerializationError, SerializationResult};
pub use registry::{Constructor, TypeRegistry};
pub use timestamp::{format_timestamp, now_millis, parse_timestamp, TIMESTAMP_FORMAT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
