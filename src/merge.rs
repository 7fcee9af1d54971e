//! Recursive shape-directed merging.
//!
//! `merge_values` combines two values of matching runtime type into one.
//! Rules are evaluated top-down, first applicable wins:
//!
//! 1. Null incoming → keep the existing value.
//! 2. Null existing → take the incoming value.
//! 3. Differing runtime types → incoming replaces wholesale.
//! 4. Both Mergeable objects → defer to the type's merge hook.
//! 5. Both arrays → index-wise recursive merge, growing to the longer
//!    length; existing-only tail indices stay untouched.
//! 6. Both maps → entry-wise recursive merge onto the existing map;
//!    existing-only keys stay untouched.
//! 7. Both sequences → identity reconciliation: Identifiable incoming
//!    elements fold onto the first existing slot with an equal identity,
//!    everything else appends.
//! 8. Otherwise → incoming replaces wholesale.
//!
//! The caller must pass an `incoming` that is already isolated from any
//! structure it wants to keep — merging consumes it, and substructures are
//! moved into the result. The engine façade pre-clones for exactly this
//! reason; see [`MergeEngine::merge`](crate::engine::MergeEngine::merge).

use std::collections::BTreeMap;

use crate::registry::TypeRegistry;
use crate::value::{ArrayValue, Value};

/// Merge `incoming` onto `existing`, returning the combined value.
pub fn merge_values(existing: Value, incoming: Value, registry: &TypeRegistry) -> Value {
    match (existing, incoming) {
        (existing, Value::Null) => existing,
        (Value::Null, incoming) => incoming,
        (existing, incoming) if existing.type_tag() != incoming.type_tag() => incoming,
        (Value::Object(existing), Value::Object(incoming)) => {
            match registry.merge_hook(existing.type_name()) {
                Some(hook) => hook(Value::Object(existing), Value::Object(incoming)),
                // Objects without a merge hook are opaque.
                None => Value::Object(incoming),
            }
        }
        (Value::Array(existing), Value::Array(incoming)) => {
            Value::Array(merge_arrays(existing, incoming, registry))
        }
        (Value::Map(existing), Value::Map(incoming)) => {
            Value::Map(merge_maps(existing, incoming, registry))
        }
        (Value::Seq(existing), Value::Seq(incoming)) => {
            Value::Seq(merge_seqs(existing, incoming, registry))
        }
        (_, incoming) => incoming,
    }
}

/// Index-wise array merge. The result has `max(len(existing),
/// len(incoming))` slots; slots past the incoming length keep their
/// existing values.
fn merge_arrays(
    mut existing: ArrayValue,
    incoming: ArrayValue,
    registry: &TypeRegistry,
) -> ArrayValue {
    for (index, item) in incoming.items.into_iter().enumerate() {
        if index < existing.items.len() {
            let slot = std::mem::replace(&mut existing.items[index], Value::Null);
            existing.items[index] = merge_values(slot, item, registry);
        } else {
            existing.items.push(merge_values(Value::Null, item, registry));
        }
    }
    existing
}

/// Entry-wise map merge onto `existing`. Keys present only in `existing`
/// are untouched.
fn merge_maps(
    mut existing: BTreeMap<String, Value>,
    incoming: BTreeMap<String, Value>,
    registry: &TypeRegistry,
) -> BTreeMap<String, Value> {
    for (key, item) in incoming {
        let slot = existing.remove(&key).unwrap_or(Value::Null);
        existing.insert(key, merge_values(slot, item, registry));
    }
    existing
}

/// Sequence merge with identity reconciliation.
///
/// The scan for a matching identity runs over the sequence as mutated so
/// far, so several incoming elements sharing one identity fold onto the
/// same slot instead of producing duplicates.
fn merge_seqs(
    mut existing: Vec<Value>,
    incoming: Vec<Value>,
    registry: &TypeRegistry,
) -> Vec<Value> {
    for item in incoming {
        let Some(id) = identity_of(&item, registry) else {
            existing.push(item);
            continue;
        };
        let found = existing
            .iter()
            .position(|slot| identity_of(slot, registry).as_deref() == Some(id.as_str()));
        match found {
            Some(index) if existing[index].type_tag() == item.type_tag() => {
                let slot = std::mem::replace(&mut existing[index], Value::Null);
                existing[index] = merge_values(slot, item, registry);
            }
            // Same identity but a different runtime type: replace the slot
            // outright, keeping its position.
            Some(index) => existing[index] = item,
            None => existing.push(item),
        }
    }
    existing
}

fn identity_of(value: &Value, registry: &TypeRegistry) -> Option<String> {
    match value {
        Value::Object(obj) => registry.identity_of(obj),
        _ => None,
    }
}
