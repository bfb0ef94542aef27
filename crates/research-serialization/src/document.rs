//! Untyped document access
//!
//! Provides [`DocumentReader`] for typed field access with precise errors and
//! [`DocumentWriter`] for emitting fields in a fixed, variant-defined order.
//! Object key order is preserved (`serde_json` is built with
//! `preserve_order`), so the order fields are written in is the order they
//! appear in the encoded text.

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{FieldKind, SerializationError, SerializationResult};
use crate::timestamp::{format_timestamp, parse_timestamp};

/// A single key/value node of a document
pub type Document = serde_json::Map<String, Value>;

/// Reserved key holding the discriminator of a polymorphic node
pub const TYPE_KEY: &str = "type";

/// Borrow a value as a document node
///
/// # Errors
/// Returns `MalformedDocument` if the value is not an object
pub fn as_document(value: &Value) -> SerializationResult<&Document> {
    value
        .as_object()
        .ok_or_else(|| SerializationError::malformed(format!("expected an object, found {}", kind_of(value))))
}

/// Read the discriminator of a document node
///
/// # Errors
/// Returns `FieldTypeMismatch` if `"type"` is present but not a string
pub fn discriminator(document: &Document) -> SerializationResult<Option<&str>> {
    match document.get(TYPE_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(tag)) => Ok(Some(tag.as_str())),
        Some(_) => Err(SerializationError::mismatch(TYPE_KEY, FieldKind::String)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a `serde` type from a document node
///
/// The discriminator key is ignored by the target type.
///
/// # Errors
/// `MalformedDocument` if the value is not an object or does not fit `T`
pub fn decode_serde<T: DeserializeOwned>(value: &Value) -> SerializationResult<T> {
    as_document(value)?;
    Ok(serde_json::from_value(value.clone())?)
}

/// Encode a `serde` type as a node tagged with a discriminator
///
/// Fields follow the discriminator in the order `T` serializes them.
///
/// # Errors
/// `MalformedDocument` if `T` does not serialize to an object
pub fn encode_serde<T: Serialize>(type_name: &str, value: &T) -> SerializationResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields
            .into_iter()
            .fold(DocumentWriter::new(type_name), |writer, (key, field)| writer.field(&key, field))
            .finish()),
        other => Err(SerializationError::malformed(format!(
            "expected an object, found {}",
            kind_of(&other)
        ))),
    }
}

/// Typed read access to one document node
///
/// `null` is treated as absent for every optional accessor.
#[derive(Debug, Clone, Copy)]
pub struct DocumentReader<'a> {
    document: &'a Document,
}

impl<'a> DocumentReader<'a> {
    /// Wrap a value, which must be an object
    ///
    /// # Errors
    /// Returns `MalformedDocument` if the value is not an object
    #[inline]
    pub fn new(value: &'a Value) -> SerializationResult<Self> {
        as_document(value).map(Self::from_document)
    }

    /// Wrap an already borrowed document node
    #[inline]
    #[must_use]
    pub fn from_document(document: &'a Document) -> Self {
        Self { document }
    }

    /// Underlying document node
    #[inline]
    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Discriminator of this node, if any
    ///
    /// # Errors
    /// Returns `FieldTypeMismatch` if `"type"` is not a string
    #[inline]
    pub fn discriminator(&self) -> SerializationResult<Option<&'a str>> {
        discriminator(self.document)
    }

    /// Raw value of a field (`null` counts as absent)
    #[inline]
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.document.get(key).filter(|value| !value.is_null())
    }

    /// Check whether a non-null field is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Required string field
    ///
    /// # Errors
    /// `MalformedDocument` if absent, `FieldTypeMismatch` if not a string
    pub fn required_str(&self, key: &str) -> SerializationResult<&'a str> {
        self.optional_str(key)?
            .ok_or_else(|| SerializationError::missing(key))
    }

    /// Required, non-empty `"identifier"` field
    ///
    /// # Errors
    /// `MalformedDocument` if absent or empty
    pub fn identifier(&self) -> SerializationResult<&'a str> {
        let identifier = self.required_str("identifier")?;
        if identifier.is_empty() {
            return Err(SerializationError::malformed("identifier must not be empty"));
        }
        Ok(identifier)
    }

    /// Optional string field
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not a string
    pub fn optional_str(&self, key: &str) -> SerializationResult<Option<&'a str>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.as_str())),
            Some(_) => Err(SerializationError::mismatch(key, FieldKind::String)),
        }
    }

    /// Optional string field, owned
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not a string
    #[inline]
    pub fn optional_string(&self, key: &str) -> SerializationResult<Option<String>> {
        self.optional_str(key).map(|text| text.map(str::to_string))
    }

    /// Optional boolean field
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not a boolean
    pub fn optional_bool(&self, key: &str) -> SerializationResult<Option<bool>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(_) => Err(SerializationError::mismatch(key, FieldKind::Boolean)),
        }
    }

    /// Optional integral field
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not an integer
    pub fn optional_i64(&self, key: &str) -> SerializationResult<Option<i64>> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| SerializationError::mismatch(key, FieldKind::Integer)),
        }
    }

    /// Optional numeric field
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not a number
    pub fn optional_f64(&self, key: &str) -> SerializationResult<Option<f64>> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| SerializationError::mismatch(key, FieldKind::Number)),
        }
    }

    /// Optional array field
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not an array
    pub fn optional_array(&self, key: &str) -> SerializationResult<Option<&'a Vec<Value>>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(SerializationError::mismatch(key, FieldKind::Array)),
        }
    }

    /// Required array field
    ///
    /// # Errors
    /// `MalformedDocument` if absent, `FieldTypeMismatch` if not an array
    pub fn required_array(&self, key: &str) -> SerializationResult<&'a Vec<Value>> {
        self.optional_array(key)?
            .ok_or_else(|| SerializationError::missing(key))
    }

    /// Optional array of strings
    ///
    /// # Errors
    /// `FieldTypeMismatch` if not an array or an element is not a string
    pub fn optional_string_array(&self, key: &str) -> SerializationResult<Option<Vec<String>>> {
        let Some(items) = self.optional_array(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SerializationError::mismatch(key, FieldKind::String))
            })
            .collect::<SerializationResult<Vec<_>>>()
            .map(Some)
    }

    /// Optional nested object
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not an object
    pub fn optional_object(&self, key: &str) -> SerializationResult<Option<&'a Document>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Object(nested)) => Ok(Some(nested)),
            Some(_) => Err(SerializationError::mismatch(key, FieldKind::Object)),
        }
    }

    /// Optional timestamp in the canonical format
    ///
    /// # Errors
    /// `FieldTypeMismatch` if present but not a parsable timestamp string
    pub fn optional_timestamp(&self, key: &str) -> SerializationResult<Option<DateTime<FixedOffset>>> {
        match self.optional_str(key) {
            Ok(None) => Ok(None),
            Ok(Some(text)) => parse_timestamp(text)
                .map(Some)
                .ok_or_else(|| SerializationError::mismatch(key, FieldKind::Timestamp)),
            Err(_) => Err(SerializationError::mismatch(key, FieldKind::Timestamp)),
        }
    }
}

/// Ordered writer for one document node
///
/// The discriminator is always the first key and is written at most once.
#[derive(Debug, Default)]
pub struct DocumentWriter {
    document: Document,
}

impl DocumentWriter {
    /// Start a node tagged with the given discriminator
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        let mut document = Document::new();
        document.insert(TYPE_KEY.to_string(), Value::String(type_name.to_string()));
        Self { document }
    }

    /// Start a node without a discriminator
    #[inline]
    #[must_use]
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Write a field
    ///
    /// Attempts to overwrite the discriminator are ignored.
    #[must_use]
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if key == TYPE_KEY && self.document.contains_key(TYPE_KEY) {
            tracing::trace!("ignoring duplicate discriminator write");
            return self;
        }
        self.document.insert(key.to_string(), value.into());
        self
    }

    /// Write a field only when a value is present
    #[inline]
    #[must_use]
    pub fn optional<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Write a timestamp in the canonical format
    #[inline]
    #[must_use]
    pub fn timestamp(self, key: &str, value: &DateTime<FixedOffset>) -> Self {
        self.field(key, format_timestamp(value))
    }

    /// Write a timestamp only when present
    #[inline]
    #[must_use]
    pub fn optional_timestamp(self, key: &str, value: Option<&DateTime<FixedOffset>>) -> Self {
        match value {
            Some(value) => self.timestamp(key, value),
            None => self,
        }
    }

    /// Finish the node
    #[inline]
    #[must_use]
    pub fn finish(self) -> Document {
        self.document
    }
}
