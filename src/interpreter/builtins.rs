//! Built-in function implementations
//!
//! This module provides the builtins a snippet can call without defining
//! anything itself.
//!
//! # Supported Built-ins
//!
//! - `console.log(...)`: captured output, see [`Console`](super::console::Console)
//! - `String(x)`, `Symbol([description])`
//! - `JSON.stringify(x[, null, 2])`
//! - `Object.keys(o)`
//! - `Infinity` and `NaN`, which ignore assignment
//! - `array.push(...)`, `array.pop()`
//!
//! # Implementation Notes
//!
//! Builtin namespaces and functions are [`Value::Opaque`] values, so they can
//! be read, stored and passed around like any other value and show up as
//! `0xUNKNOWN` in a stack slot. A call dispatches on the function's name.

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::heap_serial;
use crate::interpreter::type_system::{display_string, to_js_string};
use crate::memory::value::{Object, Value};
use crate::parser::ast::{AstNode, SourceLocation};

const CONSOLE: &str = "[object console]";
const JSON_NAMESPACE: &str = "[object JSON]";
const NATIVE_SUFFIX: &str = "() { [native code] }";

/// Value of a builtin global name, if there is one
pub fn global(name: &str) -> Option<Value> {
    match name {
        "console" => Some(Value::Opaque(CONSOLE.to_string())),
        "JSON" => Some(Value::Opaque(JSON_NAMESPACE.to_string())),
        "Object" | "String" | "Symbol" => Some(native_function(name)),
        "Infinity" => Some(Value::Float(f64::INFINITY)),
        "NaN" => Some(Value::Float(f64::NAN)),
        _ => None,
    }
}

/// An opaque value standing for a native function
pub fn native_function(name: &str) -> Value {
    Value::Opaque(format!("function {}{}", name, NATIVE_SUFFIX))
}

/// Methods reachable on builtin namespaces (`console.log`, `Object.keys`)
pub fn namespace_member(namespace: &str, key: &str) -> Option<Value> {
    let found = match key {
        "log" => namespace == CONSOLE,
        "stringify" => namespace == JSON_NAMESPACE,
        "keys" => native_name(namespace) == Some("Object"),
        _ => false,
    };
    found.then(|| native_function(key))
}

fn native_name(desc: &str) -> Option<&str> {
    desc.strip_prefix("function ")?.strip_suffix(NATIVE_SUFFIX)
}

/// Source text for a callee, used in "is not a function" errors
fn callee_text(callee: &AstNode) -> String {
    match callee {
        AstNode::Variable(name, _) => name.clone(),
        AstNode::MemberAccess { object, member, .. } => {
            format!("{}.{}", callee_text(object), member)
        }
        AstNode::IndexAccess { object, .. } => format!("{}[...]", callee_text(object)),
        AstNode::Call { callee, .. } => format!("{}(...)", callee_text(callee)),
        _ => "expression".to_string(),
    }
}

impl Interpreter {
    /// Evaluate a call expression
    pub(crate) fn call(
        &mut self,
        callee: &AstNode,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // Method calls keep their receiver for push/pop
        let (receiver, function) = match callee {
            AstNode::MemberAccess {
                object,
                member,
                location: member_loc,
            } => {
                let receiver = self.evaluate_expr(object)?;
                let function = self.get_property(&receiver, member, *member_loc)?;
                (receiver, function)
            }
            _ => (Value::Undefined, self.evaluate_expr(callee)?),
        };

        let name = match &function {
            Value::Opaque(desc) => native_name(desc).map(str::to_string),
            _ => None,
        };
        let Some(name) = name else {
            return Err(RuntimeError::type_error(
                format!("{} is not a function", callee_text(callee)),
                location,
            ));
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg)?);
        }

        match name.as_str() {
            "log" => {
                self.console.log(&self.arena, &values, location)?;
                Ok(Value::Undefined)
            }
            "String" => Ok(Value::Text(
                values
                    .first()
                    .map(|v| display_string(&self.arena, v))
                    .unwrap_or_default(),
            )),
            "Symbol" => {
                let description = match values.first() {
                    None | Some(Value::Undefined) => String::new(),
                    Some(v) => to_js_string(&self.arena, v, location)?,
                };
                Ok(Value::Symbol(self.new_symbol(description)))
            }
            "stringify" => self.builtin_stringify(&values, location),
            "keys" => self.builtin_keys(values.first(), location),
            "push" => self.builtin_push(&receiver, values, location),
            "pop" => self.builtin_pop(&receiver, location),
            other => Err(RuntimeError::unsupported(
                format!("{}() is not supported", other),
                location,
            )),
        }
    }

    fn builtin_stringify(
        &self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let value = args.first().cloned().unwrap_or_default();
        if args.get(1).is_some_and(|replacer| !replacer.is_nullish()) {
            return Err(RuntimeError::unsupported(
                "JSON.stringify replacers are not supported",
                location,
            ));
        }
        let pretty = match args.get(2) {
            None | Some(Value::Undefined) => false,
            Some(Value::Int(2)) => true,
            Some(_) => {
                return Err(RuntimeError::unsupported(
                    "JSON.stringify only supports an indent of 2",
                    location,
                ))
            }
        };

        let text = heap_serial::stringify(&self.arena, &value, pretty, location)?;
        Ok(text.map_or(Value::Undefined, Value::Text))
    }

    fn builtin_keys(
        &mut self,
        target: Option<&Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let keys: Vec<Value> = match target {
            None | Some(Value::Undefined) | Some(Value::Null) => {
                return Err(RuntimeError::type_error(
                    "Cannot convert undefined or null to object",
                    location,
                ))
            }
            Some(Value::Array(id)) | Some(Value::Record(id)) => match self.arena.get(*id) {
                Some(Object::Array(elements)) => (0..elements.len())
                    .map(|i| Value::Text(i.to_string()))
                    .collect(),
                Some(Object::Record(entries)) => entries
                    .iter()
                    .map(|(k, _)| Value::Text(k.clone()))
                    .collect(),
                None => Vec::new(),
            },
            Some(Value::Text(s)) => (0..s.encode_utf16().count())
                .map(|i| Value::Text(i.to_string()))
                .collect(),
            Some(_) => Vec::new(),
        };
        Ok(self.arena.alloc_array(keys))
    }

    fn builtin_push(
        &mut self,
        receiver: &Value,
        values: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let elements = self.receiver_array(receiver, "push", location)?;
        if elements.len() + values.len() > MAX_ARRAY_LENGTH {
            return Err(RuntimeError::unsupported(
                format!("Array length above {} is not supported", MAX_ARRAY_LENGTH),
                location,
            ));
        }
        elements.extend(values);
        Ok(Value::Int(elements.len() as i64))
    }

    fn builtin_pop(
        &mut self,
        receiver: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let elements = self.receiver_array(receiver, "pop", location)?;
        Ok(elements.pop().unwrap_or_default())
    }

    fn receiver_array(
        &mut self,
        receiver: &Value,
        method: &str,
        location: SourceLocation,
    ) -> Result<&mut Vec<Value>, RuntimeError> {
        let not_array = || {
            RuntimeError::type_error(
                format!("Array.prototype.{} called on a non-array", method),
                location,
            )
        };
        let Value::Array(id) = receiver else {
            return Err(not_array());
        };
        match self.arena.get_mut(*id) {
            Some(Object::Array(elements)) => Ok(elements),
            _ => Err(not_array()),
        }
    }
}
