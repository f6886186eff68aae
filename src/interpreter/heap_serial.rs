//! JSON serialization of heap values
//!
//! Converts arena values into `serde_json` trees for `JSON.stringify` and for
//! the way `console.log` prints objects. Follows `JSON.stringify` rules:
//!
//! - `undefined`, functions and symbols are dropped from records and become
//!   `null` inside arrays
//! - non-finite numbers become `null`
//! - a container that contains itself (directly or through descendants) is an
//!   error; the same container reached twice along different paths is not

use crate::interpreter::constants::MAX_VALUE_DEPTH;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Object, ObjectArena, ObjectId, Value};
use crate::parser::ast::SourceLocation;
use serde_json::{Map, Number, Value as Json};

/// Serialize `value`; `Ok(None)` when JSON has no representation for it
pub fn to_json(
    arena: &ObjectArena,
    value: &Value,
    location: SourceLocation,
) -> Result<Option<Json>, RuntimeError> {
    let mut ancestors = Vec::new();
    serialize(arena, value, &mut ancestors, location)
}

/// `JSON.stringify(value)` or `JSON.stringify(value, null, 2)`
pub fn stringify(
    arena: &ObjectArena,
    value: &Value,
    pretty: bool,
    location: SourceLocation,
) -> Result<Option<String>, RuntimeError> {
    let Some(json) = to_json(arena, value, location)? else {
        return Ok(None);
    };

    let text = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    text.map(Some)
        .map_err(|e| RuntimeError::type_error(e.to_string(), location))
}

fn serialize(
    arena: &ObjectArena,
    value: &Value,
    ancestors: &mut Vec<ObjectId>,
    location: SourceLocation,
) -> Result<Option<Json>, RuntimeError> {
    let json = match value {
        Value::Undefined | Value::Symbol(_) | Value::Opaque(_) => return Ok(None),
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::Number(Number::from(*n)),
        Value::Float(n) if *n == 0.0 => Json::Number(Number::from(0)),
        Value::Float(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Text(s) => Json::String(s.clone()),
        Value::Array(id) | Value::Record(id) => {
            if ancestors.contains(id) {
                return Err(RuntimeError::type_error(
                    "Converting circular structure to JSON",
                    location,
                ));
            }
            if ancestors.len() >= MAX_VALUE_DEPTH {
                return Err(RuntimeError::type_error("Maximum nesting depth exceeded", location));
            }
            ancestors.push(*id);
            let json = serialize_object(arena, *id, ancestors, location)?;
            ancestors.pop();
            json
        }
    };
    Ok(Some(json))
}

fn serialize_object(
    arena: &ObjectArena,
    id: ObjectId,
    ancestors: &mut Vec<ObjectId>,
    location: SourceLocation,
) -> Result<Json, RuntimeError> {
    match arena.get(id) {
        Some(Object::Array(elements)) => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                let item = serialize(arena, element, ancestors, location)?;
                items.push(item.unwrap_or(Json::Null));
            }
            Ok(Json::Array(items))
        }
        Some(Object::Record(entries)) => {
            let mut map = Map::new();
            for (key, value) in entries {
                if let Some(json) = serialize(arena, value, ancestors, location)? {
                    map.insert(key.clone(), json);
                }
            }
            Ok(Json::Object(map))
        }
        None => Ok(Json::Null),
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
    fn test_stringify_compact() {
        let mut arena = ObjectArena::new();
        let inner = arena.alloc_array(vec![Value::Int(1), Value::Undefined, Value::Float(0.5)]);
        let rec = arena.alloc_record(vec![
            ("z".to_string(), inner),
            ("skip".to_string(), Value::Undefined),
            ("a".to_string(), Value::Text("q\"".into())),
            ("n".to_string(), Value::Float(f64::NAN)),
        ]);

        let text = stringify(&arena, &rec, false, loc()).unwrap().unwrap();
        assert_eq!(text, r#"{"z":[1,null,0.5],"a":"q\"","n":null}"#);
    }

    #[test]
    fn test_stringify_pretty() {
        let mut arena = ObjectArena::new();
        let rec = arena.alloc_record(vec![("a".to_string(), Value::Int(1))]);

        let text = stringify(&arena, &rec, true, loc()).unwrap().unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_unrepresentable_top_level() {
        let arena = ObjectArena::new();
        let symbol = Value::Symbol(Symbol::new(0, ""));
        assert_eq!(
            stringify(&arena, &Value::Undefined, false, loc()).unwrap(),
            None
        );
        assert_eq!(stringify(&arena, &symbol, false, loc()).unwrap(), None);
    }

    #[test]
    fn test_cycle_is_an_error_but_sharing_is_not() {
        let mut arena = ObjectArena::new();
        let shared = arena.alloc_array(vec![]);
        let pair = arena.alloc_array(vec![shared.clone(), shared]);
        assert_eq!(
            stringify(&arena, &pair, false, loc()).unwrap().unwrap(),
            "[[],[]]"
        );

        let cyclic = arena.alloc_record(vec![]);
        if let Some(Object::Record(entries)) = arena.get_mut(cyclic.object_id().unwrap()) {
            entries.push(("self".to_string(), cyclic.clone()));
        }
        let err = stringify(&arena, &cyclic, false, loc()).unwrap_err();
        assert_eq!(err.to_string(), "Converting circular structure to JSON");
    }

    #[test]
    fn test_negative_zero_serializes_as_zero() {
        let mut arena = ObjectArena::new();
        let arr = arena.alloc_array(vec![Value::Float(-0.0)]);
        assert_eq!(stringify(&arena, &arr, false, loc()).unwrap().unwrap(), "[0]");
    }

    #[test]
    fn test_deeply_nested_value_is_an_error() {
        let mut arena = ObjectArena::new();
        let mut value = arena.alloc_array(vec![]);
        for _ in 0..10_000 {
            value = arena.alloc_array(vec![value]);
        }
        let err = stringify(&arena, &value, true, loc()).unwrap_err();
        assert_eq!(err.to_string(), "Maximum nesting depth exceeded");

        let mut shallow = arena.alloc_array(vec![]);
        for _ in 0..50 {
            shallow = arena.alloc_array(vec![shallow]);
        }
        assert!(stringify(&arena, &shallow, false, loc()).is_ok());
    }
}
