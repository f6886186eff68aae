//! Expression evaluation implementation
//!
//! This module handles evaluation of every expression form the parser produces:
//!
//! - Literals (numbers, strings, booleans, `null`, `undefined`)
//! - Variables and builtin globals
//! - Array and object literals, which allocate in the arena
//! - Member access, indexing and calls (dispatched to `ops` and `builtins`)
//! - Unary, binary and logical operators
//! - Assignment and compound assignment
//!
//! Evaluation order follows JavaScript: left to right, object before key
//! before right-hand side.

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::js_number;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::NumberLiteral(n, _) => Ok(Value::number(*n)),

            AstNode::StringLiteral(s, _) => Ok(Value::Text(s.clone())),

            AstNode::BoolLiteral(b, _) => Ok(Value::Bool(*b)),

            AstNode::Null { .. } => Ok(Value::Null),

            AstNode::Undefined { .. } => Ok(Value::Undefined),

            AstNode::Variable(name, loc) => self.read_variable(name, *loc),

            AstNode::ArrayLiteral { elements, location } => {
                if elements.len() > MAX_ARRAY_LENGTH {
                    return Err(RuntimeError::unsupported("Array literal is too large", *location));
                }
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate_expr(element)?);
                }
                Ok(self.arena.alloc_array(values))
            }

            AstNode::ObjectLiteral { properties, .. } => {
                let mut entries = Vec::with_capacity(properties.len());
                for (key, value_expr) in properties {
                    let key = match key {
                        PropertyKey::Name(name) => name.clone(),
                        PropertyKey::Number(n) => js_number(*n),
                    };
                    entries.push((key, self.evaluate_expr(value_expr)?));
                }
                Ok(self.arena.alloc_record(entries))
            }

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => {
                let target = self.evaluate_expr(object)?;
                self.get_property(&target, member, *location)
            }

            AstNode::IndexAccess {
                object,
                index,
                location,
            } => {
                let target = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                let key = self.to_property_key(&index, *location)?;
                self.get_property(&target, &key, *location)
            }

            AstNode::Call {
                callee,
                args,
                location,
            } => self.call(callee, args, *location),

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.evaluate_unary(*op, operand, *location),

            AstNode::BinaryOp {
                op: BinOp::And,
                left,
                right,
                ..
            } => {
                let lhs = self.evaluate_expr(left)?;
                if !lhs.is_truthy() {
                    return Ok(lhs);
                }
                self.evaluate_expr(right)
            }

            AstNode::BinaryOp {
                op: BinOp::Or,
                left,
                right,
                ..
            } => {
                let lhs = self.evaluate_expr(left)?;
                if lhs.is_truthy() {
                    return Ok(lhs);
                }
                self.evaluate_expr(right)
            }

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => {
                let lhs = self.evaluate_expr(left)?;
                let rhs = self.evaluate_expr(right)?;
                self.binary_op(*op, &lhs, &rhs, *location)
            }

            AstNode::Assignment { lhs, rhs, location } => self.assign(lhs, None, rhs, *location),

            AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            } => self.assign(lhs, Some(*op), rhs, *location),

            AstNode::VarDecl { location, .. }
            | AstNode::ExpressionStatement { location, .. }
            | AstNode::Empty { location } => Err(RuntimeError::unsupported(
                "Statement used as an expression",
                *location,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::memory::value::{Object, Value};
    use crate::parser::parse;

    fn eval(source: &str) -> (Interpreter, Value) {
        let mut interp = Interpreter::new(parse(source).unwrap());
        interp.run().unwrap();
        let completion = interp.completion().clone();
        (interp, completion)
    }

    #[test]
    fn test_literals_allocate_fresh_containers() {
        let (interp, _) = eval("let a = [1, 'two', [3]]; let b = {x: a, 2: null};");
        let a = interp.scope().get("a").unwrap().value.clone().unwrap();
        let b = interp.scope().get("b").unwrap().value.clone().unwrap();

        assert_eq!(interp.arena().len(), 3);
        let Some(Object::Record(entries)) = interp.arena().get(b.object_id().unwrap()) else {
            panic!("Expected record");
        };
        assert_eq!(entries[0].0, "2");
        assert_eq!(entries[1], ("x".to_string(), a));
    }

    #[test]
    fn test_short_circuit() {
        let (_, value) = eval("null || 'fallback'");
        assert_eq!(value, Value::Text("fallback".into()));

        // The right side is never evaluated, so no ReferenceError
        let (_, value) = eval("0 && missing");
        assert_eq!(value, Value::Int(0));
    }

    #[test]
    fn test_numeric_object_keys() {
        let (interp, _) = eval("let o = {1.5: 'a', 10: 'b', 2: 'c'};");
        let o = interp.scope().get("o").unwrap().value.clone().unwrap();
        let Some(Object::Record(entries)) = interp.arena().get(o.object_id().unwrap()) else {
            panic!("Expected record");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["2", "10", "1.5"]);
    }
}
