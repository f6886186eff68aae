use crate::interpreter::constants::BUILTIN_GLOBALS;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation, UnOp};

impl Interpreter {
    pub(crate) fn evaluate_unary(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // `typeof undeclared` is "undefined", not a ReferenceError
        if op == UnOp::Typeof {
            if let AstNode::Variable(name, _) = operand {
                if !self.scope.contains(name) && !BUILTIN_GLOBALS.contains(&name.as_str()) {
                    return Ok(Value::Text("undefined".to_string()));
                }
            }
        }

        let value = self.evaluate_expr(operand)?;
        match op {
            UnOp::Neg => {
                let n = type_system::to_number(&self.arena, &value, location)?;
                Ok(Value::number(-n))
            }
            UnOp::Plus => {
                let n = type_system::to_number(&self.arena, &value, location)?;
                Ok(Value::number(n))
            }
            UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
            UnOp::Typeof => Ok(Value::Text(value.type_of().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::memory::value::Value;
    use crate::parser::parse;

    fn completion(source: &str) -> Value {
        let mut interp = Interpreter::new(parse(source).unwrap());
        interp.run().unwrap();
        interp.completion().clone()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_typeof() {
        assert_eq!(completion("typeof 1"), text("number"));
        assert_eq!(completion("typeof 'a'"), text("string"));
        assert_eq!(completion("typeof null"), text("object"));
        assert_eq!(completion("typeof []"), text("object"));
        assert_eq!(completion("typeof undefined"), text("undefined"));
        assert_eq!(completion("typeof nothingHere"), text("undefined"));
        assert_eq!(completion("typeof Symbol()"), text("symbol"));
        assert_eq!(completion("typeof String"), text("function"));
        assert_eq!(completion("typeof console"), text("object"));
    }

    #[test]
    fn test_numeric_unary() {
        assert_eq!(completion("-'3'"), Value::Int(-3));
        assert_eq!(completion("+true"), Value::Int(1));
        assert_eq!(completion("+[]"), Value::Int(0));
        assert!(matches!(completion("+{}"), Value::Float(n) if n.is_nan()));
        assert_eq!(completion("-0"), Value::Int(0));
    }

    #[test]
    fn test_logical_not() {
        assert_eq!(completion("!''"), Value::Bool(true));
        assert_eq!(completion("!![]"), Value::Bool(true));
        assert_eq!(completion("!(0 / 0)"), Value::Bool(true));
    }
}
