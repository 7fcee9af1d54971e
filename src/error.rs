//! Error taxonomy for the merge engine.
//!
//! Only the non-safe entry points (`clone_by_fields`, the checked array
//! constructor) surface these; the safe entry points log recoverable
//! failures and degrade to best-effort results instead.

use thiserror::Error;

use crate::value::{Shape, TypeTag};

#[derive(Debug, Error)]
pub enum EngineError {
    /// No descriptor registered under this type name.
    #[error("no type named `{0}` is registered")]
    UnknownType(String),

    /// The type has no constructor capability.
    #[error("type `{type_name}` has no constructor")]
    NoConstructor { type_name: String },

    /// The type's constructor rejected the supplied arguments.
    #[error("constructor for `{type_name}` failed: {reason}")]
    Construction { type_name: String, reason: String },

    /// A field listed by the type descriptor is not readable on the
    /// source object.
    #[error("field `{field}` is not readable on `{type_name}`")]
    FieldAccess { type_name: String, field: String },

    /// The type's native clone hook failed.
    #[error("native clone for `{type_name}` failed: {reason}")]
    CloneFailed { type_name: String, reason: String },

    /// An array item contradicts the declared element type.
    #[error("array element {index} has type {found}, expected {expected}")]
    ElementType {
        index: usize,
        expected: TypeTag,
        found: TypeTag,
    },

    /// Field copying was requested for a value that has no fields.
    #[error("cannot copy fields of a {shape:?} value")]
    NotAnObject { shape: Shape },
}
