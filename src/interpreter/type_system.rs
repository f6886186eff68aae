//! Type conversions
//!
//! JavaScript's implicit conversions, restricted to the value set the executor
//! models:
//!
//! - [`to_number`]: `ToNumber` (`"12"` → 12, `null` → 0, `[]` → 0, `{}` → NaN)
//! - [`to_primitive`]: containers → their string form (arrays join with `,`,
//!   records become `[object Object]`)
//! - [`to_js_string`]: `ToString` used by `+` and property keys
//! - [`display_string`]: what `String(value)` returns (symbols allowed)
//!
//! All conversions read the arena but never allocate.

use crate::interpreter::constants::MAX_VALUE_DEPTH;
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::js_number;
use crate::memory::value::{Object, ObjectArena, ObjectId, Value};
use crate::parser::ast::SourceLocation;
use rustc_hash::FxHashSet;

/// `ToNumber` for any value
pub fn to_number(
    arena: &ObjectArena,
    value: &Value,
    location: SourceLocation,
) -> Result<f64, RuntimeError> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        Value::Text(s) => Ok(string_to_number(s)),
        Value::Array(_) | Value::Record(_) => {
            let primitive = to_primitive(arena, value);
            to_number(arena, &primitive, location)
        }
        Value::Symbol(_) => Err(RuntimeError::type_error(
            "Cannot convert a Symbol value to a number",
            location,
        )),
        Value::Opaque(_) => Ok(f64::NAN),
    }
}

/// Parse a string the way `Number(s)` does
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }

    // Rust also accepts "inf", "nan" and friends; JavaScript does not
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Reduce a container to its primitive (string) form; primitives pass through
pub fn to_primitive(arena: &ObjectArena, value: &Value) -> Value {
    match value {
        Value::Array(id) => {
            let mut visiting = FxHashSet::default();
            Value::Text(join_array(arena, *id, &mut visiting))
        }
        Value::Record(_) => Value::Text("[object Object]".to_string()),
        other => other.clone(),
    }
}

/// `ToString`; symbols cannot be implicitly converted
pub fn to_js_string(
    arena: &ObjectArena,
    value: &Value,
    location: SourceLocation,
) -> Result<String, RuntimeError> {
    match value {
        Value::Symbol(_) => Err(RuntimeError::type_error(
            "Cannot convert a Symbol value to a string",
            location,
        )),
        other => Ok(display_string(arena, other)),
    }
}

/// What `String(value)` returns
pub fn display_string(arena: &ObjectArena, value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => js_number(*n),
        Value::Text(s) => s.clone(),
        Value::Symbol(symbol) => symbol.to_string(),
        Value::Opaque(desc) => desc.clone(),
        Value::Array(_) | Value::Record(_) => match to_primitive(arena, value) {
            Value::Text(s) => s,
            _ => String::new(),
        },
    }
}

/// `Array.prototype.join(",")`: nullish elements are empty, and an array
/// already being joined further up renders as empty instead of looping.
/// Arrays nested past [`MAX_VALUE_DEPTH`] also render as empty.
fn join_array(arena: &ObjectArena, id: ObjectId, visiting: &mut FxHashSet<ObjectId>) -> String {
    let Some(Object::Array(elements)) = arena.get(id) else {
        return String::new();
    };
    if visiting.len() >= MAX_VALUE_DEPTH || !visiting.insert(id) {
        return String::new();
    }

    let parts: Vec<String> = elements
        .iter()
        .map(|element| match element {
            Value::Undefined | Value::Null => String::new(),
            Value::Array(inner) => join_array(arena, *inner, visiting),
            other => display_string(arena, other),
        })
        .collect();

    visiting.remove(&id);
    parts.join(",")
}

/// Property key text for a value used in `obj[key]`
pub fn property_key(
    arena: &ObjectArena,
    value: &Value,
    location: SourceLocation,
) -> Result<String, RuntimeError> {
    match value {
        Value::Symbol(_) => Err(RuntimeError::unsupported(
            "Symbol property keys are not supported",
            location,
        )),
        other => to_js_string(arena, other, location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Symbol;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(" 42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("12px").is_nan());
    }

    #[test]
    fn test_container_conversions() {
        let mut arena = ObjectArena::new();
        let inner = arena.alloc_array(vec![Value::Int(2), Value::Null]);
        let arr = arena.alloc_array(vec![Value::Int(1), inner, Value::Text("x".into())]);
        let rec = arena.alloc_record(vec![]);
        let empty = arena.alloc_array(vec![]);

        assert_eq!(display_string(&arena, &arr), "1,2,,x");
        assert_eq!(display_string(&arena, &rec), "[object Object]");
        assert_eq!(to_number(&arena, &empty, loc()).unwrap(), 0.0);
        assert!(to_number(&arena, &rec, loc()).unwrap().is_nan());
    }

    #[test]
    fn test_cyclic_array_join_terminates() {
        let mut arena = ObjectArena::new();
        let arr = arena.alloc_array(vec![Value::Int(1)]);
        if let Some(Object::Array(elements)) = arena.get_mut(arr.object_id().unwrap()) {
            elements.push(arr.clone());
        }

        assert_eq!(display_string(&arena, &arr), "1,");
    }

    #[test]
    fn test_symbols() {
        let arena = ObjectArena::new();
        let sym = Value::Symbol(Symbol::new(0, "k"));

        assert_eq!(display_string(&arena, &sym), "Symbol(k)");
        assert!(to_js_string(&arena, &sym, loc()).is_err());
        assert!(to_number(&arena, &sym, loc()).is_err());
        assert!(property_key(&arena, &sym, loc()).is_err());
    }

    #[test]
    fn test_number_text() {
        let arena = ObjectArena::new();
        assert_eq!(
            display_string(&arena, &Value::Float(0.1 + 0.2)),
            "0.30000000000000004"
        );
        assert_eq!(display_string(&arena, &Value::Int(-7)), "-7");
        assert_eq!(display_string(&arena, &Value::Float(-0.0)), "0");
        assert_eq!(
            display_string(&arena, &Value::Float(f64::INFINITY)),
            "Infinity"
        );
    }
}
