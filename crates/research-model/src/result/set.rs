//! Identifier-keyed ordered result sets

use indexmap::IndexMap;
use research_serialization::SerializationResult;
use serde_json::Value;

use super::ResultData;
use crate::factory::Factory;

/// Ordered set of results with unique identifiers
///
/// # Invariants
/// - Identifiers are unique; inserting an existing identifier replaces the
///   old node and moves the new one to the end
/// - Iteration order is insertion order
/// - Equality compares nodes pairwise in order
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: IndexMap<String, Box<dyn ResultData>>,
}

impl ResultSet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a result, returning the one it replaced
    pub fn insert(&mut self, result: Box<dyn ResultData>) -> Option<Box<dyn ResultData>> {
        let identifier = result.identifier().to_string();
        let previous = self.entries.shift_remove(&identifier);
        self.entries.insert(identifier, result);
        previous
    }

    /// Find a result by identifier
    #[inline]
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&dyn ResultData> {
        self.entries.get(identifier).map(AsRef::as_ref)
    }

    /// Find a result by identifier, mutably
    #[inline]
    pub fn find_mut(&mut self, identifier: &str) -> Option<&mut (dyn ResultData + 'static)> {
        self.entries.get_mut(identifier).map(AsMut::as_mut)
    }

    /// Remove a result, keeping the order of the rest
    ///
    /// An absent identifier is not an error.
    #[inline]
    pub fn remove(&mut self, identifier: &str) -> Option<Box<dyn ResultData>> {
        self.entries.shift_remove(identifier)
    }

    /// Check if an identifier is present
    #[inline]
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Position of an identifier in insertion order
    #[inline]
    #[must_use]
    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.entries.get_index_of(identifier)
    }

    /// Results in order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ResultData> + '_ {
        self.entries.values().map(AsRef::as_ref)
    }

    /// Identifiers in order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Decode the array of polymorphic results held in `field`
    ///
    /// A repeated identifier keeps the later node.
    ///
    /// # Errors
    /// `FieldTypeMismatch` naming `field` for a non-array, or the first
    /// element that fails to decode
    pub fn decode(field: &str, value: &Value, factory: &Factory) -> SerializationResult<Self> {
        let mut set = Self::new();
        for result in factory.decode_results(field, value)? {
            let identifier = result.identifier().to_string();
            if set.insert(result).is_some() {
                tracing::warn!(identifier = %identifier, "duplicate result identifier, keeping the later node");
            }
        }
        Ok(set)
    }

    /// Encode as an array in order
    ///
    /// # Errors
    /// The first node that fails to encode
    pub fn encode(&self) -> SerializationResult<Value> {
        self.iter()
            .map(|result| result.encode().map(Value::Object))
            .collect::<SerializationResult<Vec<_>>>()
            .map(Value::Array)
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl FromIterator<Box<dyn ResultData>> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Box<dyn ResultData>>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}
