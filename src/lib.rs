//! # graft
//!
//! A schema-free deep merge and clone engine for dynamically shaped
//! value graphs.
//!
//! ## Approach
//!
//! Values are a closed union of runtime shapes (scalar, array, map,
//! sequence, object). Merging dispatches on the shape pair, first
//! applicable rule wins:
//!
//! 1. **Nulls** — a null incoming keeps the existing value; a null
//!    existing takes the incoming one.
//! 2. **Type mismatch** — incompatible runtime types never merge; the
//!    incoming value replaces the existing one wholesale.
//! 3. **Mergeable objects** — a type registered with its own merge hook
//!    owns its merge semantics entirely.
//! 4. **Containers** — arrays merge index-wise, maps merge entry-wise,
//!    and sequences reconcile elements by their registered identity
//!    string (matching elements merge in place, new ones append).
//! 5. **Everything else** — replaced wholesale.
//!
//! The public [`MergeEngine::merge`] entry point deep-clones the incoming
//! value before merging, so the caller's structures are never mutated and
//! never end up shared with the result. Cloning honors per-type native
//! clone hooks; failures degrade to structural copies with a logged
//! warning rather than errors.
//!
//! Object types are described to the engine through a [`TypeRegistry`] of
//! [`TypeDescriptor`]s: ordered field layouts (chained through a parent
//! type with shadowing) plus optional constructor, clone, merge, and
//! identity capabilities.
//!
//! ## Example
//!
//! ```rust
//! use graft::{MergeEngine, Value};
//!
//! let engine = MergeEngine::default();
//!
//! let existing = Value::map([
//!     ("host", Value::from("db.internal")),
//!     ("port", Value::from(5432)),
//! ]);
//! let incoming = Value::map([("port", Value::from(6432))]);
//!
//! let merged = engine.merge(existing, &incoming);
//! assert_eq!(merged.get("port"), Some(&Value::Int(6432)));
//! assert_eq!(merged.get("host"), Some(&Value::Str("db.internal".into())));
//! ```

pub mod clone;
pub mod convert;
pub mod engine;
pub mod error;
pub mod fields;
pub mod merge;
pub mod registry;
pub mod value;

// Re-export primary public API
pub use engine::MergeEngine;
pub use error::EngineError;
pub use registry::{FieldDef, TypeDescriptor, TypeDescriptorBuilder, TypeRegistry};
pub use value::{ArrayValue, ObjectValue, Shape, TypeTag, Value};
