//! Public entry points for merging and cloning.
//!
//! [`MergeEngine`] wires the cloner, merger, and field copier together
//! around a shared [`TypeRegistry`]. The merge entry point pre-clones the
//! incoming value so that mutation of the result can never reach back
//! into a structure the caller still holds.
//!
//! `merge` and `deep_clone` are safe: they never fail and never panic;
//! recoverable trouble inside (a failing clone hook, an unknown type) is
//! logged and degrades to a best-effort result. The field-copying entry
//! point has both a typed-failure and a safe variant.

use std::sync::Arc;

use crate::clone;
use crate::error::EngineError;
use crate::fields;
use crate::merge;
use crate::registry::TypeRegistry;
use crate::value::Value;

/// The merge/clone engine.
///
/// Cheap to clone; holds only a handle to the registry.
#[derive(Clone)]
pub struct MergeEngine {
    registry: Arc<TypeRegistry>,
}

impl MergeEngine {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        MergeEngine { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Merge `incoming` onto `existing` and return the combined value.
    ///
    /// `incoming` is deep-cloned first, so the caller's value is never
    /// mutated and shares no storage with the result.
    pub fn merge(&self, existing: Value, incoming: &Value) -> Value {
        let isolated = clone::deep_clone(incoming, &self.registry);
        merge::merge_values(existing, isolated, &self.registry)
    }

    /// Fold several layers onto `initial`, later layers taking precedence.
    pub fn merge_all<'a>(
        &self,
        initial: Value,
        layers: impl IntoIterator<Item = &'a Value>,
    ) -> Value {
        layers
            .into_iter()
            .fold(initial, |acc, layer| self.merge(acc, layer))
    }

    /// Produce an independent deep copy of a value.
    pub fn deep_clone(&self, value: &Value) -> Value {
        clone::deep_clone(value, &self.registry)
    }

    /// Reconstruct an object under new constructor arguments, deep-copying
    /// its non-transient field state (bypassing any native clone hook).
    pub fn clone_by_fields(&self, value: &Value, args: &[Value]) -> Result<Value, EngineError> {
        match value {
            Value::Object(obj) => {
                fields::copy_by_fields(obj, args, &self.registry).map(Value::Object)
            }
            other => Err(EngineError::NotAnObject {
                shape: other.shape(),
            }),
        }
    }

    /// Safe variant of [`clone_by_fields`](Self::clone_by_fields): logs
    /// the failure and returns `None` instead of propagating it.
    pub fn try_clone_by_fields(&self, value: &Value, args: &[Value]) -> Option<Value> {
        match self.clone_by_fields(value, args) {
            Ok(copy) => Some(copy),
            Err(error) => {
                tracing::warn!(error = %error, "field copy failed");
                None
            }
        }
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        MergeEngine::new(Arc::new(TypeRegistry::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeDescriptor;
    use crate::value::ObjectValue;

    #[test]
    fn merge_onto_null_equals_deep_clone() {
        let engine = MergeEngine::default();
        let incoming = Value::map([("rows", Value::seq([1, 2]))]);
        let merged = engine.merge(Value::Null, &incoming);
        assert_eq!(merged, engine.deep_clone(&incoming));
        assert_eq!(merged, incoming);
    }

    #[test]
    fn merge_result_is_isolated_from_the_incoming_value() {
        let engine = MergeEngine::default();
        let incoming = Value::map([("rows", Value::seq([1]))]);
        let mut merged = engine.merge(Value::Null, &incoming);

        if let Value::Map(map) = &mut merged {
            if let Some(Value::Seq(rows)) = map.get_mut("rows") {
                rows.push(Value::from(2));
            }
        }
        assert_eq!(incoming.get("rows").and_then(Value::as_seq).unwrap().len(), 1);
    }

    #[test]
    fn merge_with_null_incoming_returns_existing_unchanged() {
        let engine = MergeEngine::default();
        let existing = Value::map([("a", 1)]);
        assert_eq!(engine.merge(existing.clone(), &Value::Null), existing);
    }

    #[test]
    fn merge_is_idempotent_over_reconciling_shapes() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Tab")
                .identified_by_field("id")
                .build(),
        );
        let engine = MergeEngine::new(Arc::new(registry));

        let x = Value::map([
            ("title", Value::from("main")),
            (
                "tabs",
                Value::seq([Value::Object(
                    ObjectValue::new("Tab").with_field("id", "a").with_field("n", 1),
                )]),
            ),
        ]);
        let merged = engine.merge(engine.deep_clone(&x), &x);
        assert_eq!(merged, x);
    }

    #[test]
    fn merge_all_folds_layers_in_order() {
        let engine = MergeEngine::default();
        let base = Value::map([("a", 1), ("b", 1)]);
        let mid = Value::map([("b", 2)]);
        let top = Value::map([("c", 3)]);
        let merged = engine.merge_all(base, [&mid, &top]);
        assert_eq!(merged, Value::map([("a", 1), ("b", 2), ("c", 3)]));
    }

    #[test]
    fn clone_by_fields_rejects_non_objects() {
        let engine = MergeEngine::default();
        let err = engine.clone_by_fields(&Value::from(1), &[]).unwrap_err();
        assert!(matches!(err, EngineError::NotAnObject { .. }));
    }

    #[test]
    fn try_clone_by_fields_absorbs_failures() {
        let engine = MergeEngine::default();
        let ghost = Value::Object(ObjectValue::new("Ghost"));
        assert_eq!(engine.try_clone_by_fields(&ghost, &[]), None);
    }

    #[test]
    fn try_clone_by_fields_returns_the_copy_on_success() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Point")
                .field("x")
                .field("y")
                .constructor(|_| Ok(ObjectValue::new("Point")))
                .build(),
        );
        let engine = MergeEngine::new(Arc::new(registry));

        let point = Value::Object(
            ObjectValue::new("Point").with_field("x", 3).with_field("y", 4),
        );
        let copy = engine.try_clone_by_fields(&point, &[]).unwrap();
        assert_eq!(copy.get("x").and_then(Value::as_int), Some(3));
        assert_eq!(copy.get("y").and_then(Value::as_int), Some(4));
    }
}
