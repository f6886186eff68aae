//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the closed set of values a snippet can
//! produce, and the [`ObjectArena`] that owns every array and record.
//!
//! # Value Types
//!
//! - [`Value::Undefined`] / [`Value::Null`]: the two "nothing" values
//! - [`Value::Bool`], [`Value::Int`], [`Value::Float`]: scalars
//! - [`Value::Text`]: a string, held by content
//! - [`Value::Array`] / [`Value::Record`]: handles into the arena
//! - [`Value::Symbol`]: a unique symbol, equal only to itself
//! - [`Value::Opaque`]: anything else the memory model cannot represent
//!   (builtin functions and namespaces), carried as its display text
//!
//! # Identity
//!
//! Containers are never stored inline. A `Value::Array(id)` is a handle, so two
//! values alias the same container exactly when their [`ObjectId`]s are equal.
//! Cycles are just handles that point back into the arena.

use std::fmt;

/// Handle to a container stored in an [`ObjectArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A `Symbol([description])` result
///
/// Every call yields a fresh `id`, so two symbols with the same description
/// are still distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u32,
    description: String,
}

impl Symbol {
    pub fn new(id: u32, description: impl Into<String>) -> Self {
        Symbol {
            id,
            description: description.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Values produced by a snippet
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(ObjectId),
    Record(ObjectId),
    Symbol(Symbol),
    Opaque(String), // Display text of a value with no memory representation
}

/// Largest magnitude at which every integer is exactly representable in an f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Value {
    /// Build a number, normalizing integral doubles to `Int`
    ///
    /// `-0.0` stays a `Float` so its sign survives division.
    pub fn number(n: f64) -> Self {
        let negative_zero = n == 0.0 && n.is_sign_negative();
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER && !negative_zero {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Numeric payload for `Int` and `Float`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Arena handle for containers
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Array(id) | Value::Record(id) => Some(*id),
            _ => None,
        }
    }

    /// Check if this value lives on the heap (containers and strings)
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Text(_) | Value::Array(_) | Value::Record(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Record(_))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// The `typeof` tag
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Record(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Text(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Opaque(desc) if desc.starts_with("function") => "function",
            Value::Opaque(_) => "object",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => !(n.is_nan() || *n == 0.0),
            Value::Text(s) => !s.is_empty(),
            Value::Array(_) | Value::Record(_) | Value::Symbol(_) | Value::Opaque(_) => true,
        }
    }
}

/// A heap container
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Array(Vec<Value>),
    Record(Vec<(String, Value)>), // Kept in property iteration order
}

impl Object {
    /// Child values in iteration order (elements, or property values)
    pub fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Object::Array(elements) => Box::new(elements.iter()),
            Object::Record(entries) => Box::new(entries.iter().map(|(_, v)| v)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Object::Array(elements) => elements.len(),
            Object::Record(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a record property
    pub fn property(&self, key: &str) -> Option<&Value> {
        match self {
            Object::Record(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Object::Array(_) => None,
        }
    }
}

/// Parse `key` as a canonical array index ("0", "17", never "017" or "-1")
pub fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&n| n != u32::MAX)
}

/// Insert or overwrite a record property, preserving property order.
///
/// Integer-like keys iterate first in ascending order, then string keys in
/// insertion order. Overwriting an existing key keeps its position.
pub fn set_property(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
    if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
        entry.1 = value;
        return;
    }

    match array_index(&key) {
        Some(index) => {
            let position = entries
                .iter()
                .position(|(k, _)| array_index(k).map_or(true, |other| other > index))
                .unwrap_or(entries.len());
            entries.insert(position, (key, value));
        }
        None => entries.push((key, value)),
    }
}

/// Owner of every container created during a run
#[derive(Debug, Clone, Default)]
pub struct ObjectArena {
    objects: Vec<Object>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    /// Allocate an array and return a value referencing it
    pub fn alloc_array(&mut self, elements: Vec<Value>) -> Value {
        Value::Array(self.push(Object::Array(elements)))
    }

    /// Allocate a record; duplicate keys collapse with the last one winning
    pub fn alloc_record(&mut self, properties: Vec<(String, Value)>) -> Value {
        let mut entries = Vec::with_capacity(properties.len());
        for (key, value) in properties {
            set_property(&mut entries, key, value);
        }
        Value::Record(self.push(Object::Record(entries)))
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.index())
    }

    /// Number of containers allocated so far
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_normalization() {
        assert_eq!(Value::number(5.0), Value::Int(5));
        assert_eq!(Value::number(0.0), Value::Int(0));
        assert!(matches!(Value::number(-0.0), Value::Float(n) if n.is_sign_negative()));
        assert_eq!(Value::number(0.5), Value::Float(0.5));
        assert!(matches!(Value::number(f64::NAN), Value::Float(n) if n.is_nan()));
        assert!(matches!(Value::number(1e300), Value::Float(_)));
    }

    #[test]
    fn test_symbols_compare_by_identity() {
        let a = Symbol::new(0, "k");
        let b = Symbol::new(1, "k");

        assert_ne!(Value::Symbol(a.clone()), Value::Symbol(b.clone()));
        assert_eq!(Value::Symbol(a.clone()), Value::Symbol(a.clone()));
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(Value::Symbol(a).type_of(), "symbol");
    }

    #[test]
    fn test_aliasing_by_handle() {
        let mut arena = ObjectArena::new();
        let a = arena.alloc_array(vec![]);
        let b = arena.alloc_array(vec![]);
        let alias = a.clone();

        assert_eq!(a, alias);
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_record_property_order() {
        let mut arena = ObjectArena::new();
        let record = arena.alloc_record(vec![
            ("b".to_string(), Value::Int(1)),
            ("2".to_string(), Value::Int(2)),
            ("a".to_string(), Value::Int(3)),
            ("0".to_string(), Value::Int(4)),
            ("b".to_string(), Value::Int(5)),
        ]);

        let id = record.object_id().unwrap();
        let Some(Object::Record(entries)) = arena.get(id) else {
            panic!("Expected record");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["0", "2", "b", "a"]);
        assert_eq!(entries[2].1, Value::Int(5));
    }

    #[test]
    fn test_array_index_parsing() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("042"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("x1"), None);
        assert_eq!(array_index(""), None);
    }
}
