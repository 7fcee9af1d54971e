//! Field-by-field object reconstruction.
//!
//! Builds a fresh instance through the type's constructor, then copies
//! every non-transient field of the source object onto it as an isolated
//! deep clone. This bypasses the type's native clone hook on purpose:
//! it is the path for re-instantiating an object with different
//! constructor arguments while preserving the rest of its state.

use crate::clone::deep_clone;
use crate::error::EngineError;
use crate::registry::TypeRegistry;
use crate::value::{ObjectValue, Value};

/// Reconstruct `obj` under `args`, carrying its field state over.
///
/// Fails with a typed error when the type is unknown, has no constructor,
/// the constructor rejects the arguments, or a listed field is missing on
/// the source object.
pub fn copy_by_fields(
    obj: &ObjectValue,
    args: &[Value],
    registry: &TypeRegistry,
) -> Result<ObjectValue, EngineError> {
    let mut fresh = registry.construct(obj.type_name(), args)?;
    let layout = registry.instance_fields(obj.type_name())?;
    for field in layout.iter().filter(|field| !field.transient) {
        let value = obj.get(&field.name).ok_or_else(|| EngineError::FieldAccess {
            type_name: obj.type_name().to_string(),
            field: field.name.to_string(),
        })?;
        fresh.set(field.name.to_string(), deep_clone(value, registry));
    }
    Ok(fresh)
}
