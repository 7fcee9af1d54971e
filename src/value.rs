//! Core value model for the merge engine.
//!
//! The engine is schema-free: it operates over a closed union of value
//! shapes determined at runtime rather than over typed records. Five
//! shapes exist:
//! - **Scalar**: atomic values (booleans, integers, floats, strings) that
//!   are replaced wholesale, never merged structurally.
//! - **Array**: a fixed-size, index-addressed sequence with a declared
//!   element type.
//! - **Map**: a string-keyed mapping with unique keys.
//! - **Seq**: an ordered, duplicate-permitting sequence.
//! - **Object**: a custom value identified by a type name; its merge,
//!   identity, clone, and construction behavior come from the
//!   [`TypeRegistry`](crate::registry::TypeRegistry).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::EngineError;

/// A dynamically shaped value.
///
/// Values own their substructure outright, so a value graph is a tree:
/// cyclic graphs are unrepresentable and recursion over a value always
/// terminates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null marker.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// 64-bit float scalar.
    Float(f64),
    /// UTF-8 string scalar.
    Str(String),
    /// Homogeneous sequence with a declared element type.
    Array(ArrayValue),
    /// String-keyed mapping, keys unique.
    Map(BTreeMap<String, Value>),
    /// Ordered sequence, duplicates permitted.
    Seq(Vec<Value>),
    /// Custom value whose behavior is looked up by type name.
    Object(ObjectValue),
}

/// The runtime shape of a value, driving merge/clone rule dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Null,
    Scalar,
    Array,
    Map,
    Seq,
    Object,
}

/// The runtime type of a value.
///
/// Two values merge structurally only when their tags are equal; on any
/// mismatch the incoming value replaces the existing one wholesale.
/// Arrays carry their declared element type, objects their type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
    Array(Box<TypeTag>),
    Map,
    Seq,
    Object(Arc<str>),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Str => write!(f, "str"),
            TypeTag::Array(elem) => write!(f, "array<{}>", elem),
            TypeTag::Map => write!(f, "map"),
            TypeTag::Seq => write!(f, "seq"),
            TypeTag::Object(name) => write!(f, "{}", name),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Classify this value's shape.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => Shape::Scalar,
            Value::Array(_) => Shape::Array,
            Value::Map(_) => Shape::Map,
            Value::Seq(_) => Shape::Seq,
            Value::Object(_) => Shape::Object,
        }
    }

    /// The runtime type of this value. `None` for null, which is
    /// compatible with every type.
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeTag::Bool),
            Value::Int(_) => Some(TypeTag::Int),
            Value::Float(_) => Some(TypeTag::Float),
            Value::Str(_) => Some(TypeTag::Str),
            Value::Array(arr) => Some(TypeTag::Array(Box::new(arr.elem.clone()))),
            Value::Map(_) => Some(TypeTag::Map),
            Value::Seq(_) => Some(TypeTag::Seq),
            Value::Object(obj) => Some(TypeTag::Object(obj.type_name.clone())),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a map entry or object field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::Object(obj) => obj.get(key),
            _ => None,
        }
    }

    /// Build a sequence value from anything convertible.
    pub fn seq<I, V>(items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(arr) => write_items(f, arr.items()),
            Value::Seq(items) => write_items(f, items),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => {
                write!(f, "{} {{", obj.type_name)?;
                for (i, (name, v)) in obj.fields().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<ArrayValue> for Value {
    fn from(arr: ArrayValue) -> Self {
        Value::Array(arr)
    }
}

impl From<ObjectValue> for Value {
    fn from(obj: ObjectValue) -> Self {
        Value::Object(obj)
    }
}

/// A fixed-size, homogeneous sequence with a declared element type.
///
/// Nulls are permitted at any index regardless of the element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub(crate) elem: TypeTag,
    pub(crate) items: Vec<Value>,
}

impl ArrayValue {
    /// Build an array, checking every item against the declared element
    /// type. A mismatch reports [`EngineError::ElementType`] — this is the
    /// one caller-misuse error that propagates out of a constructor.
    pub fn new(elem: TypeTag, items: Vec<Value>) -> Result<Self, EngineError> {
        for (index, item) in items.iter().enumerate() {
            if let Some(found) = item.type_tag() {
                if found != elem {
                    return Err(EngineError::ElementType {
                        index,
                        expected: elem,
                        found,
                    });
                }
            }
        }
        Ok(ArrayValue { elem, items })
    }

    /// An empty array of the given element type.
    pub fn of(elem: TypeTag) -> Self {
        ArrayValue {
            elem,
            items: Vec::new(),
        }
    }

    pub(crate) fn from_parts(elem: TypeTag, items: Vec<Value>) -> Self {
        ArrayValue { elem, items }
    }

    pub fn elem(&self) -> &TypeTag {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

/// A custom value: a type name plus named field values.
///
/// The name resolves through the [`TypeRegistry`](crate::registry::TypeRegistry)
/// to the type's field layout and capability hooks. An object whose type is
/// not registered behaves as an opaque scalar with no capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub(crate) type_name: Arc<str>,
    pub(crate) fields: BTreeMap<String, Value>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        ObjectValue {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field initialization.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Field names and values in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}
