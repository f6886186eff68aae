use crate::interpreter::builtins;
use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system;
use crate::memory::value::{array_index, set_property, Object, Value};
use crate::parser::ast::SourceLocation;

impl Interpreter {
    /// Convert an index value to a property key
    pub(crate) fn to_property_key(
        &self,
        index: &Value,
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        type_system::property_key(&self.arena, index, location)
    }

    /// Read `target[key]`
    pub(crate) fn get_property(
        &self,
        target: &Value,
        key: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match target {
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!(
                    "Cannot read properties of {} (reading '{}')",
                    type_system::display_string(&self.arena, target),
                    key
                ),
                location,
            )),
            Value::Array(id) | Value::Record(id) => match self.arena.get(*id) {
                Some(Object::Array(elements)) => Ok(match key {
                    "length" => Value::Int(elements.len() as i64),
                    "push" | "pop" => builtins::native_function(key),
                    _ => array_index(key)
                        .and_then(|i| elements.get(i as usize))
                        .cloned()
                        .unwrap_or_default(),
                }),
                Some(record @ Object::Record(_)) => {
                    Ok(record.property(key).cloned().unwrap_or_default())
                }
                None => Ok(Value::Undefined),
            },
            Value::Text(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                Ok(match key {
                    "length" => Value::Int(units.len() as i64),
                    _ => array_index(key)
                        .and_then(|i| units.get(i as usize))
                        .map(|unit| Value::Text(String::from_utf16_lossy(&[*unit])))
                        .unwrap_or_default(),
                })
            }
            Value::Opaque(desc) => Ok(builtins::namespace_member(desc, key).unwrap_or_default()),
            Value::Symbol(symbol) => Ok(match key {
                "description" => Value::Text(symbol.description().to_string()),
                _ => Value::Undefined,
            }),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(Value::Undefined),
        }
    }

    /// Write `target[key] = value`
    pub(crate) fn set_property_value(
        &mut self,
        target: &Value,
        key: String,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let (id, is_array) = match target {
            Value::Undefined | Value::Null => {
                return Err(RuntimeError::type_error(
                    format!(
                        "Cannot set properties of {} (setting '{}')",
                        type_system::display_string(&self.arena, target),
                        key
                    ),
                    location,
                ))
            }
            Value::Array(id) => (*id, true),
            Value::Record(id) => (*id, false),
            // Writes to primitives are silently dropped (sloppy mode)
            _ => return Ok(()),
        };

        let new_length = if is_array && key == "length" {
            let n = type_system::to_number(&self.arena, &value, location)?;
            if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                return Err(RuntimeError::type_error("Invalid array length", location));
            }
            Some(n as usize)
        } else {
            None
        };

        match self.arena.get_mut(id) {
            Some(Object::Array(elements)) => {
                let length = match (new_length, array_index(&key)) {
                    (Some(length), _) => length,
                    (None, Some(index)) => elements.len().max(index as usize + 1),
                    (None, None) => {
                        return Err(RuntimeError::unsupported(
                            format!("Non-index property '{}' on an array is not supported", key),
                            location,
                        ))
                    }
                };
                if length > MAX_ARRAY_LENGTH {
                    return Err(RuntimeError::unsupported(
                        format!("Array length above {} is not supported", MAX_ARRAY_LENGTH),
                        location,
                    ));
                }
                elements.resize(length, Value::Undefined);
                if let Some(index) = array_index(&key) {
                    elements[index as usize] = value;
                }
                Ok(())
            }
            Some(Object::Record(entries)) => {
                set_property(entries, key, value);
                Ok(())
            }
            None => Ok(()),
        }
    }
}
