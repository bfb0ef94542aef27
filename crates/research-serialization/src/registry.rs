//! Per-family constructor registry
//!
//! Provides [`TypeRegistry`], which maps discriminator strings to constructors
//! for one capability family (steps, results, actions, ...). Keeping one
//! registry per family means the same tag can mean different things in
//! different families without colliding.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry: TypeRegistry<dyn Step, Factory> = TypeRegistry::new("steps");
//! registry.register("instruction", |value, factory| InstructionStep::decode(value, factory));
//! registry.set_default(|value, factory| InstructionStep::decode(value, factory));
//!
//! let step = registry.decode(&document, &factory)?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::document::as_document;
use crate::document::discriminator;
use crate::error::{FieldKind, SerializationError, SerializationResult};

/// Constructor for one variant of a family
///
/// Receives the raw document node and the decoding context (usually the
/// factory, so nested polymorphic fields can be decoded recursively).
pub type Constructor<T, C> =
    Arc<dyn Fn(&Value, &C) -> SerializationResult<Box<T>> + Send + Sync>;

/// A registration entry combining a constructor with bundled examples
struct RegistryEntry<T: ?Sized, C: ?Sized> {
    constructor: Constructor<T, C>,
    examples: Vec<Value>,
}

/// Registry of constructors for one capability family
///
/// # Invariants
/// - At most one constructor per discriminator; re-registering a
///   discriminator replaces the previous constructor (last one wins)
/// - The default constructor is used when a node has no discriminator or,
///   unless the registry is strict, an unknown one
pub struct TypeRegistry<T: ?Sized, C: ?Sized> {
    capability: &'static str,
    entries: HashMap<String, RegistryEntry<T, C>>,
    default: Option<Constructor<T, C>>,
    strict: bool,
}

impl<T: ?Sized, C: ?Sized> TypeRegistry<T, C> {
    /// Create an empty registry for the named capability family
    #[inline]
    #[must_use]
    pub fn new(capability: &'static str) -> Self {
        Self {
            capability,
            entries: HashMap::new(),
            default: None,
            strict: false,
        }
    }

    /// Name of the capability family
    #[inline]
    #[must_use]
    pub fn capability(&self) -> &'static str {
        self.capability
    }

    /// Register a constructor for a discriminator
    ///
    /// Returns `true` if an existing registration was replaced. Examples
    /// attached to a replaced entry are dropped with it.
    pub fn register<F>(&mut self, discriminator: impl Into<String>, constructor: F) -> bool
    where
        F: Fn(&Value, &C) -> SerializationResult<Box<T>> + Send + Sync + 'static,
    {
        self.register_with_examples(discriminator, constructor, Vec::new())
    }

    /// Register a constructor together with example documents
    ///
    /// Returns `true` if an existing registration was replaced.
    pub fn register_with_examples<F>(
        &mut self,
        discriminator: impl Into<String>,
        constructor: F,
        examples: Vec<Value>,
    ) -> bool
    where
        F: Fn(&Value, &C) -> SerializationResult<Box<T>> + Send + Sync + 'static,
    {
        let discriminator = discriminator.into();
        let replaced = self
            .entries
            .insert(
                discriminator.clone(),
                RegistryEntry {
                    constructor: Arc::new(constructor),
                    examples,
                },
            )
            .is_some();
        if replaced {
            tracing::debug!(
                capability = self.capability,
                discriminator = %discriminator,
                "replaced registered constructor"
            );
        }
        replaced
    }

    /// Attach an example document to an existing registration
    ///
    /// # Errors
    /// Returns `UnresolvedType` if the discriminator is not registered
    pub fn add_example(&mut self, discriminator: &str, example: Value) -> SerializationResult<()> {
        let capability = self.capability;
        let entry = self
            .entries
            .get_mut(discriminator)
            .ok_or_else(|| SerializationError::unresolved(capability, Some(discriminator)))?;
        entry.examples.push(example);
        Ok(())
    }

    /// Set the constructor used when no registered discriminator matches
    pub fn set_default<F>(&mut self, constructor: F)
    where
        F: Fn(&Value, &C) -> SerializationResult<Box<T>> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(constructor));
    }

    /// Check whether a default constructor is set
    #[inline]
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// When strict, unknown discriminators fail instead of using the default
    ///
    /// Nodes without any discriminator still use the default.
    #[inline]
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Check if a discriminator is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, discriminator: &str) -> bool {
        self.entries.contains_key(discriminator)
    }

    /// Remove a registration
    #[inline]
    pub fn remove(&mut self, discriminator: &str) -> bool {
        self.entries.remove(discriminator).is_some()
    }

    /// Registered discriminators, sorted
    #[must_use]
    pub fn discriminators(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered discriminators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Example documents for a discriminator
    #[must_use]
    pub fn examples(&self, discriminator: &str) -> &[Value] {
        self.entries
            .get(discriminator)
            .map_or(&[], |entry| entry.examples.as_slice())
    }

    /// Find the constructor for a discriminator, applying the default fallback
    ///
    /// # Errors
    /// Returns `UnresolvedType` naming this family and the raw discriminator
    pub fn resolve(&self, discriminator: Option<&str>) -> SerializationResult<&Constructor<T, C>> {
        if let Some(entry) = discriminator.and_then(|tag| self.entries.get(tag)) {
            return Ok(&entry.constructor);
        }
        if discriminator.is_some() && self.strict {
            return Err(SerializationError::unresolved(self.capability, discriminator));
        }
        match &self.default {
            Some(constructor) => {
                tracing::trace!(
                    capability = self.capability,
                    discriminator = discriminator.unwrap_or("<missing>"),
                    "falling back to default constructor"
                );
                Ok(constructor)
            }
            None => Err(SerializationError::unresolved(self.capability, discriminator)),
        }
    }

    /// Decode one polymorphic node
    ///
    /// # Errors
    /// - `MalformedDocument` if the node is not an object
    /// - `FieldTypeMismatch` if `"type"` is not a string
    /// - `UnresolvedType` if no constructor applies
    /// - any error raised by the constructor itself
    pub fn decode(&self, value: &Value, context: &C) -> SerializationResult<Box<T>> {
        let document = as_document(value)?;
        let tag = discriminator(document)?;
        let constructor = self.resolve(tag)?;
        constructor(value, context)
    }

    /// Decode an array of polymorphic nodes held in `field`, preserving order
    ///
    /// # Errors
    /// `FieldTypeMismatch` naming `field` if the value is not an array, or the
    /// first element error encountered
    pub fn decode_array(
        &self,
        field: &str,
        value: &Value,
        context: &C,
    ) -> SerializationResult<Vec<Box<T>>> {
        let items = value
            .as_array()
            .ok_or_else(|| SerializationError::mismatch(field, FieldKind::Array))?;
        items.iter().map(|item| self.decode(item, context)).collect()
    }

    /// Decode every bundled example, returning how many were checked
    ///
    /// # Errors
    /// Returns the first decode failure, which indicates a packaging defect
    pub fn verify_examples(&self, context: &C) -> SerializationResult<usize> {
        let mut checked = 0;
        for (tag, entry) in &self.entries {
            for example in &entry.examples {
                self.decode(example, context).map_err(|err| {
                    SerializationError::malformed(format!(
                        "bundled {} example '{tag}' failed to decode: {err}",
                        self.capability
                    ))
                })?;
                checked += 1;
            }
        }
        Ok(checked)
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` with the same
    /// discriminator; `other`'s default replaces ours only if it has one.
    pub fn merge(&mut self, other: Self) {
        for (tag, entry) in other.entries {
            if self.entries.insert(tag.clone(), entry).is_some() {
                tracing::debug!(capability = self.capability, discriminator = %tag, "merge replaced constructor");
            }
        }
        if other.default.is_some() {
            self.default = other.default;
        }
    }
}

impl<T: ?Sized, C: ?Sized> fmt::Debug for TypeRegistry<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("capability", &self.capability)
            .field("discriminators", &self.discriminators())
            .field("has_default", &self.default.is_some())
            .field("strict", &self.strict)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentReader;
    use serde_json::json;

    trait Shape: fmt::Debug {
        fn name(&self) -> String;
    }

    #[derive(Debug)]
    struct Circle(f64);

    #[derive(Debug)]
    struct Square(f64);

    #[derive(Debug)]
    struct Unknown;

    impl Shape for Circle {
        fn name(&self) -> String {
            format!("circle {}", self.0)
        }
    }

    impl Shape for Square {
        fn name(&self) -> String {
            format!("square {}", self.0)
        }
    }

    impl Shape for Unknown {
        fn name(&self) -> String {
            "unknown".to_string()
        }
    }

    fn size(value: &Value) -> SerializationResult<f64> {
        Ok(DocumentReader::new(value)?.optional_f64("size")?.unwrap_or(0.0))
    }

    fn registry() -> TypeRegistry<dyn Shape, ()> {
        let mut registry: TypeRegistry<dyn Shape, ()> = TypeRegistry::new("shapes");
        registry.register("circle", |value, _| Ok(Box::new(Circle(size(value)?))));
        registry.register("square", |value, _| Ok(Box::new(Square(size(value)?))));
        registry
    }

    #[test]
    fn decodes_by_discriminator() {
        let registry = registry();
        let shape = registry.decode(&json!({"type": "square", "size": 2.0}), &()).unwrap();
        assert_eq!(shape.name(), "square 2");
    }

    #[test]
    fn unknown_without_default_is_unresolved() {
        let registry = registry();
        let err = registry.decode(&json!({"type": "hexagon"}), &()).unwrap_err();
        assert_eq!(err, SerializationError::unresolved("shapes", Some("hexagon")));
    }

    #[test]
    fn missing_tag_without_default_is_unresolved() {
        let registry = registry();
        let err = registry.decode(&json!({"size": 1}), &()).unwrap_err();
        assert_eq!(err, SerializationError::unresolved("shapes", None));
    }

    #[test]
    fn default_handles_missing_and_unknown() {
        let mut registry = registry();
        registry.set_default(|_, _| Ok(Box::new(Unknown)));
        assert_eq!(registry.decode(&json!({}), &()).unwrap().name(), "unknown");
        assert_eq!(
            registry.decode(&json!({"type": "hexagon"}), &()).unwrap().name(),
            "unknown"
        );
    }

    #[test]
    fn strict_registry_rejects_unknown_tags() {
        let mut registry = registry();
        registry.set_default(|_, _| Ok(Box::new(Unknown)));
        registry.set_strict(true);
        assert!(registry.decode(&json!({"type": "hexagon"}), &()).is_err());
        assert!(registry.decode(&json!({}), &()).is_ok());
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = registry();
        let replaced = registry.register("circle", |_, _| Ok(Box::new(Unknown)));
        assert!(replaced);
        assert_eq!(registry.len(), 2);
        let shape = registry.decode(&json!({"type": "circle"}), &()).unwrap();
        assert_eq!(shape.name(), "unknown");
    }

    #[test]
    fn non_object_is_malformed() {
        let registry = registry();
        let err = registry.decode(&json!("circle"), &()).unwrap_err();
        assert!(matches!(err, SerializationError::MalformedDocument { .. }));
    }

    #[test]
    fn decode_array_preserves_order() {
        let registry = registry();
        let shapes = registry
            .decode_array(
                "shapes",
                &json!([{"type": "square", "size": 1}, {"type": "circle", "size": 3}]),
                &(),
            )
            .unwrap();
        let names: Vec<String> = shapes.iter().map(|shape| shape.name()).collect();
        assert_eq!(names, vec!["square 1", "circle 3"]);
    }

    #[test]
    fn decode_array_fails_on_first_bad_element() {
        let registry = registry();
        let result =
            registry.decode_array("shapes", &json!([{"type": "square"}, {"type": "oval"}]), &());
        assert!(matches!(result, Err(SerializationError::UnresolvedType { .. })));
    }

    #[test]
    fn decode_array_mismatch_names_field() {
        let registry = registry();
        let err = registry.decode_array("shapes", &json!({}), &()).unwrap_err();
        assert_eq!(err, SerializationError::mismatch("shapes", FieldKind::Array));
    }

    #[test]
    fn verify_examples_reports_bad_bundle() {
        let mut registry = registry();
        registry.add_example("circle", json!({"type": "circle", "size": 1})).unwrap();
        assert_eq!(registry.verify_examples(&()).unwrap(), 1);

        registry.add_example("square", json!({"type": "square", "size": "big"})).unwrap();
        assert!(registry.verify_examples(&()).is_err());
    }

    #[test]
    fn add_example_requires_registration() {
        let mut registry = registry();
        assert!(registry.add_example("oval", json!({})).is_err());
    }

    #[test]
    fn merge_overrides_entries() {
        let mut base = registry();
        let mut plugin: TypeRegistry<dyn Shape, ()> = TypeRegistry::new("shapes");
        plugin.register("square", |_, _| Ok(Box::new(Unknown)));
        plugin.register("triangle", |_, _| Ok(Box::new(Unknown)));
        base.merge(plugin);

        assert_eq!(base.discriminators(), vec!["circle", "square", "triangle"]);
        assert_eq!(base.decode(&json!({"type": "square"}), &()).unwrap().name(), "unknown");
    }
}
