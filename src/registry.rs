//! Type descriptors and the registry the engine consults for them.
//!
//! Rust has no ambient reflection, so the original reflection surface is
//! an explicit, injected service: callers register a [`TypeDescriptor`]
//! per object type, carrying the ordered field layout (chained through a
//! parent type, with subtype fields shadowing same-named parent fields)
//! and up to four capability hooks:
//! - **constructor** — build a fresh instance from argument values,
//! - **native clone** — type-owned deep copy,
//! - **merge** — type-owned merge semantics (the Mergeable capability),
//! - **identity** — a stable identity string used to reconcile sequence
//!   elements (the Identifiable capability).
//!
//! Flattened field lists are cached per type in a concurrent map with an
//! insert-if-absent discipline, so concurrent readers are safe and a
//! lookup never blocks another.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::EngineError;
use crate::value::{ObjectValue, Value};

/// Constructor capability: build an instance from argument values.
/// Errors are reported as reason strings and surface as
/// [`EngineError::Construction`].
pub type ConstructFn = Arc<dyn Fn(&[Value]) -> Result<ObjectValue, String> + Send + Sync>;

/// Native clone capability: a type-owned deep copy of an instance.
pub type CloneFn = Arc<dyn Fn(&ObjectValue) -> Result<Value, String> + Send + Sync>;

/// Merge capability: combine `existing` and `incoming` (in that order),
/// both instances of the owning type. The engine defers to this entirely.
pub type MergeFn = Arc<dyn Fn(Value, Value) -> Value + Send + Sync>;

/// Identity capability: a stable identity string for an instance, or
/// `None` when this particular instance has no identity.
pub type IdentityFn = Arc<dyn Fn(&ObjectValue) -> Option<String> + Send + Sync>;

/// A single named field in a type's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Arc<str>,
    /// Transient fields are skipped by the field copier.
    pub transient: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        FieldDef {
            name: name.into(),
            transient: false,
        }
    }

    pub fn transient(name: impl Into<Arc<str>>) -> Self {
        FieldDef {
            name: name.into(),
            transient: true,
        }
    }
}

/// Everything the engine knows about one object type.
pub struct TypeDescriptor {
    name: Arc<str>,
    parent: Option<Arc<str>>,
    fields: Vec<FieldDef>,
    construct: Option<ConstructFn>,
    clone_with: Option<CloneFn>,
    merge_with: Option<MergeFn>,
    identity: Option<IdentityFn>,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<Arc<str>>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            desc: TypeDescriptor {
                name: name.into(),
                parent: None,
                fields: Vec::new(),
                construct: None,
                clone_with: None,
                merge_with: None,
                identity: None,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_mergeable(&self) -> bool {
        self.merge_with.is_some()
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("construct", &self.construct.is_some())
            .field("clone_with", &self.clone_with.is_some())
            .field("merge_with", &self.merge_with.is_some())
            .field("identity", &self.identity.is_some())
            .finish()
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    desc: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    /// Chain this type's field layout through a parent type.
    pub fn parent(mut self, name: impl Into<Arc<str>>) -> Self {
        self.desc.parent = Some(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<Arc<str>>) -> Self {
        self.desc.fields.push(FieldDef::new(name));
        self
    }

    pub fn transient_field(mut self, name: impl Into<Arc<str>>) -> Self {
        self.desc.fields.push(FieldDef::transient(name));
        self
    }

    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<ObjectValue, String> + Send + Sync + 'static,
    {
        self.desc.construct = Some(Arc::new(f));
        self
    }

    pub fn clone_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&ObjectValue) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.desc.clone_with = Some(Arc::new(f));
        self
    }

    pub fn merge_with<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        self.desc.merge_with = Some(Arc::new(f));
        self
    }

    pub fn identified_by<F>(mut self, f: F) -> Self
    where
        F: Fn(&ObjectValue) -> Option<String> + Send + Sync + 'static,
    {
        self.desc.identity = Some(Arc::new(f));
        self
    }

    /// Identity read from a string field of the instance.
    pub fn identified_by_field(self, field: impl Into<Arc<str>>) -> Self {
        let field = field.into();
        self.identified_by(move |obj| {
            obj.get(&field).and_then(Value::as_str).map(str::to_string)
        })
    }

    pub fn build(self) -> TypeDescriptor {
        self.desc
    }
}

/// The registry of type descriptors the engine resolves object types
/// against.
///
/// Lookups of the flattened instance-field list are cached; the cache is
/// append-only and keyed by type name, so concurrent readers never see a
/// partially built entry. Descriptors must be registered before values of
/// their type are processed — registration does not invalidate already
/// cached field lists.
pub struct TypeRegistry {
    types: DashMap<Arc<str>, Arc<TypeDescriptor>>,
    field_cache: DashMap<Arc<str>, Arc<[FieldDef]>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            types: DashMap::new(),
            field_cache: DashMap::new(),
        }
    }

    /// Register a descriptor, replacing any previous one of the same name.
    pub fn register(&self, desc: TypeDescriptor) {
        self.types.insert(desc.name.clone(), Arc::new(desc));
    }

    pub fn descriptor(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The ordered instance-field list for a type: parent fields first,
    /// then the type's own fields, with same-named parent fields shadowed
    /// in place by the subtype's definition.
    pub fn instance_fields(&self, name: &str) -> Result<Arc<[FieldDef]>, EngineError> {
        if let Some(cached) = self.field_cache.get(name) {
            return Ok(cached.value().clone());
        }
        let flat = self.flatten_fields(name)?;
        let entry = self
            .field_cache
            .entry(Arc::from(name))
            .or_insert(flat);
        Ok(entry.value().clone())
    }

    fn flatten_fields(&self, name: &str) -> Result<Arc<[FieldDef]>, EngineError> {
        // Walk the parent chain from the type up to its root ancestor.
        let mut chain = Vec::new();
        let mut cursor = Some(name.to_string());
        while let Some(current) = cursor {
            if chain
                .iter()
                .any(|d: &Arc<TypeDescriptor>| *d.name == *current)
            {
                break;
            }
            let desc = self
                .descriptor(&current)
                .ok_or_else(|| EngineError::UnknownType(current.clone()))?;
            cursor = desc.parent.as_ref().map(|p| p.to_string());
            chain.push(desc);
        }

        let mut out: Vec<FieldDef> = Vec::new();
        for desc in chain.iter().rev() {
            for field in &desc.fields {
                if let Some(slot) = out.iter_mut().find(|d| d.name == field.name) {
                    *slot = field.clone();
                } else {
                    out.push(field.clone());
                }
            }
        }
        Ok(Arc::from(out))
    }

    /// Construct a fresh instance of a type from argument values.
    pub fn construct(&self, name: &str, args: &[Value]) -> Result<ObjectValue, EngineError> {
        let desc = self
            .descriptor(name)
            .ok_or_else(|| EngineError::UnknownType(name.to_string()))?;
        let construct = desc.construct.as_ref().ok_or_else(|| {
            EngineError::NoConstructor {
                type_name: name.to_string(),
            }
        })?;
        construct(args).map_err(|reason| EngineError::Construction {
            type_name: name.to_string(),
            reason,
        })
    }

    /// Invoke an object's native clone hook. `None` when its type is
    /// unregistered or declares no clone capability.
    pub fn invoke_native_clone(
        &self,
        obj: &ObjectValue,
    ) -> Option<Result<Value, EngineError>> {
        let desc = self.descriptor(obj.type_name())?;
        let clone_with = desc.clone_with.as_ref()?;
        Some(clone_with(obj).map_err(|reason| EngineError::CloneFailed {
            type_name: obj.type_name().to_string(),
            reason,
        }))
    }

    /// The merge hook for a type, if it is Mergeable.
    pub fn merge_hook(&self, name: &str) -> Option<MergeFn> {
        self.descriptor(name)
            .and_then(|desc| desc.merge_with.clone())
    }

    /// An object's identity string, if its type is Identifiable and this
    /// instance carries an identity.
    pub fn identity_of(&self, obj: &ObjectValue) -> Option<String> {
        let desc = self.descriptor(obj.type_name())?;
        let identity = desc.identity.as_ref()?;
        identity(obj)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectValue;

    fn names(fields: &[FieldDef]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_ref()).collect()
    }

    #[test]
    fn instance_fields_chain_through_parent() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Component")
                .field("background")
                .field("foreground")
                .build(),
        );
        registry.register(
            TypeDescriptor::builder("Button")
                .parent("Component")
                .field("label")
                .build(),
        );

        let fields = registry.instance_fields("Button").unwrap();
        assert_eq!(names(&fields), ["background", "foreground", "label"]);
    }

    #[test]
    fn subtype_fields_shadow_parent_fields_in_place() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Component")
                .field("background")
                .field("border")
                .build(),
        );
        registry.register(
            TypeDescriptor::builder("Panel")
                .parent("Component")
                .transient_field("border")
                .field("layout")
                .build(),
        );

        let fields = registry.instance_fields("Panel").unwrap();
        assert_eq!(names(&fields), ["background", "border", "layout"]);
        assert!(fields[1].transient);
    }

    #[test]
    fn instance_fields_are_cached() {
        let registry = TypeRegistry::new();
        registry.register(TypeDescriptor::builder("Leaf").field("a").build());

        let first = registry.instance_fields("Leaf").unwrap();
        let second = registry.instance_fields("Leaf").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_parent_reports_unknown_type() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Orphan")
                .parent("Missing")
                .field("a")
                .build(),
        );

        let err = registry.instance_fields("Orphan").unwrap_err();
        assert!(matches!(err, EngineError::UnknownType(name) if name == "Missing"));
    }

    #[test]
    fn construct_without_constructor_fails() {
        let registry = TypeRegistry::new();
        registry.register(TypeDescriptor::builder("Inert").build());

        let err = registry.construct("Inert", &[]).unwrap_err();
        assert!(matches!(err, EngineError::NoConstructor { .. }));
    }

    #[test]
    fn construct_maps_hook_errors() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Picky")
                .constructor(|args| {
                    if args.is_empty() {
                        Err("needs at least one argument".to_string())
                    } else {
                        Ok(ObjectValue::new("Picky"))
                    }
                })
                .build(),
        );

        let err = registry.construct("Picky", &[]).unwrap_err();
        assert!(matches!(err, EngineError::Construction { .. }));
        assert!(registry.construct("Picky", &[Value::from(1)]).is_ok());
    }

    #[test]
    fn identity_by_field_reads_string_field() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder("Named")
                .identified_by_field("id")
                .build(),
        );

        let named = ObjectValue::new("Named").with_field("id", "west");
        assert_eq!(registry.identity_of(&named), Some("west".to_string()));

        let anonymous = ObjectValue::new("Named");
        assert_eq!(registry.identity_of(&anonymous), None);
    }

    #[test]
    fn unregistered_type_has_no_capabilities() {
        let registry = TypeRegistry::new();
        let obj = ObjectValue::new("Ghost");
        assert!(registry.invoke_native_clone(&obj).is_none());
        assert!(registry.merge_hook("Ghost").is_none());
        assert_eq!(registry.identity_of(&obj), None);
    }
}
