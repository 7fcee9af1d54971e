//! Deep cloning of value graphs.
//!
//! The contract: no container (array, map, sequence) in the clone shares
//! storage with any container reachable from the original, and every
//! nested object's native clone hook has been honored.
//!
//! Dispatch order matters: the structural rules for arrays, maps, and
//! sequences take precedence over native clone hooks, so a container is
//! always rebuilt element by element. Hooks apply only to object values.

use std::collections::BTreeMap;

use crate::registry::TypeRegistry;
use crate::value::{ArrayValue, ObjectValue, Value};

/// Produce an independent deep copy of a value.
///
/// Never fails: a failing native clone hook is logged and degrades to a
/// plain structural copy of that object.
pub fn deep_clone(value: &Value, registry: &TypeRegistry) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
            value.clone()
        }
        Value::Array(arr) => {
            let items = arr
                .items()
                .iter()
                .map(|item| deep_clone(item, registry))
                .collect();
            Value::Array(ArrayValue::from_parts(arr.elem().clone(), items))
        }
        Value::Map(map) => {
            let cloned: BTreeMap<String, Value> = map
                .iter()
                .map(|(key, item)| (key.clone(), deep_clone(item, registry)))
                .collect();
            Value::Map(cloned)
        }
        Value::Seq(items) => Value::Seq(
            items
                .iter()
                .map(|item| deep_clone(item, registry))
                .collect(),
        ),
        Value::Object(obj) => clone_object(obj, registry),
    }
}

fn clone_object(obj: &ObjectValue, registry: &TypeRegistry) -> Value {
    match registry.invoke_native_clone(obj) {
        Some(Ok(cloned)) => cloned,
        Some(Err(error)) => {
            tracing::warn!(
                type_name = obj.type_name(),
                error = %error,
                "native clone failed, falling back to structural copy"
            );
            structural_copy(obj, registry)
        }
        None => structural_copy(obj, registry),
    }
}

/// Field-wise copy of an object, recursing so nested clone hooks still run.
fn structural_copy(obj: &ObjectValue, registry: &TypeRegistry) -> Value {
    let mut copy = ObjectValue::new(obj.type_name().to_string());
    for (name, value) in obj.fields() {
        copy.set(name.to_string(), deep_clone(value, registry));
    }
    Value::Object(copy)
}
