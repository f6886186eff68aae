use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::{self, to_number, to_primitive};
use crate::memory::value::{ObjectArena, Value};
use crate::parser::ast::{BinOp, SourceLocation};
use std::cmp::Ordering;

impl Interpreter {
    /// Apply a non-short-circuit binary operator
    pub(crate) fn binary_op(
        &self,
        op: BinOp,
        lhs: &Value,
        rhs: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let arena = &self.arena;
        match op {
            BinOp::Add => add(arena, lhs, rhs, location),
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let a = to_number(arena, lhs, location)?;
                let b = to_number(arena, rhs, location)?;
                let n = match op {
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    _ => a % b, // f64 `%` truncates like JavaScript's remainder
                };
                Ok(Value::number(n))
            }
            BinOp::StrictEq => Ok(Value::Bool(strict_equals(lhs, rhs))),
            BinOp::StrictNe => Ok(Value::Bool(!strict_equals(lhs, rhs))),
            BinOp::LooseEq => Ok(Value::Bool(loose_equals(arena, lhs, rhs, location)?)),
            BinOp::LooseNe => Ok(Value::Bool(!loose_equals(arena, lhs, rhs, location)?)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = compare(arena, lhs, rhs, location)?;
                let result = match (op, ordering) {
                    (_, None) => false, // NaN on either side
                    (BinOp::Lt, Some(o)) => o == Ordering::Less,
                    (BinOp::Le, Some(o)) => o != Ordering::Greater,
                    (BinOp::Gt, Some(o)) => o == Ordering::Greater,
                    (_, Some(o)) => o != Ordering::Less,
                };
                Ok(Value::Bool(result))
            }
            BinOp::And | BinOp::Or => Err(RuntimeError::unsupported(
                "Logical operators are evaluated lazily",
                location,
            )),
        }
    }
}

/// `+`: string concatenation if either primitive is a string, else numeric
fn add(
    arena: &ObjectArena,
    lhs: &Value,
    rhs: &Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    let a = to_primitive(arena, lhs);
    let b = to_primitive(arena, rhs);

    if matches!(a, Value::Text(_)) || matches!(b, Value::Text(_)) {
        let mut text = type_system::to_js_string(arena, &a, location)?;
        text.push_str(&type_system::to_js_string(arena, &b, location)?);
        return Ok(Value::Text(text));
    }

    let n = to_number(arena, &a, location)? + to_number(arena, &b, location)?;
    Ok(Value::number(n))
}

/// `===`
pub fn strict_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Array(a), Value::Array(b)) | (Value::Record(a), Value::Record(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a.id() == b.id(),
        (Value::Opaque(a), Value::Opaque(b)) => a == b,
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// `==`
fn loose_equals(
    arena: &ObjectArena,
    lhs: &Value,
    rhs: &Value,
    location: SourceLocation,
) -> Result<bool, RuntimeError> {
    if lhs.is_nullish() || rhs.is_nullish() {
        return Ok(lhs.is_nullish() && rhs.is_nullish());
    }
    if lhs.is_container() && rhs.is_container() {
        return Ok(strict_equals(lhs, rhs));
    }
    let opaque = |v: &Value| matches!(v, Value::Symbol(_) | Value::Opaque(_));
    if opaque(lhs) || opaque(rhs) {
        return Ok(strict_equals(lhs, rhs));
    }

    let a = to_primitive(arena, lhs);
    let b = to_primitive(arena, rhs);
    match (&a, &b) {
        (Value::Text(x), Value::Text(y)) => Ok(x == y),
        _ => {
            let x = to_number(arena, &a, location)?;
            let y = to_number(arena, &b, location)?;
            Ok(x == y)
        }
    }
}

/// Abstract relational comparison; `None` when either side is NaN
fn compare(
    arena: &ObjectArena,
    lhs: &Value,
    rhs: &Value,
    location: SourceLocation,
) -> Result<Option<Ordering>, RuntimeError> {
    let a = to_primitive(arena, lhs);
    let b = to_primitive(arena, rhs);

    if let (Value::Text(x), Value::Text(y)) = (&a, &b) {
        // Strings compare by UTF-16 code units
        return Ok(Some(x.encode_utf16().cmp(y.encode_utf16())));
    }

    let x = to_number(arena, &a, location)?;
    let y = to_number(arena, &b, location)?;
    Ok(x.partial_cmp(&y))
}
