use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, BinOp, SourceLocation};

/// A resolved assignment target
enum Place {
    Variable(String, SourceLocation),
    Property(Value, String),
}

impl Interpreter {
    /// Evaluate `lhs = rhs` or `lhs op= rhs`, returning the assigned value
    pub(crate) fn assign(
        &mut self,
        lhs: &AstNode,
        op: Option<BinOp>,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(lhs)?;

        let value = match op {
            None => self.evaluate_expr(rhs)?,
            Some(op) => {
                let current = self.read_place(&place, location)?;
                let operand = self.evaluate_expr(rhs)?;
                self.binary_op(op, &current, &operand, location)?
            }
        };

        self.write_place(place, value.clone(), location)?;
        Ok(value)
    }

    /// Evaluate the object and key of a target before the right-hand side
    fn resolve_place(&mut self, lhs: &AstNode) -> Result<Place, RuntimeError> {
        match lhs {
            AstNode::Variable(name, loc) => Ok(Place::Variable(name.clone(), *loc)),
            AstNode::MemberAccess { object, member, .. } => {
                let target = self.evaluate_expr(object)?;
                Ok(Place::Property(target, member.clone()))
            }
            AstNode::IndexAccess {
                object,
                index,
                location,
            } => {
                let target = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                let key = self.to_property_key(&index, *location)?;
                Ok(Place::Property(target, key))
            }
            other => Err(RuntimeError::type_error(
                "Invalid left-hand side in assignment",
                *other.location(),
            )),
        }
    }

    fn read_place(&self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable(name, loc) => self.read_variable(name, *loc),
            Place::Property(target, key) => self.get_property(target, key, location),
        }
    }

    fn write_place(
        &mut self,
        place: Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match place {
            Place::Variable(name, loc) => self.write_variable(&name, value, loc),
            Place::Property(target, key) => self.set_property_value(&target, key, value, location),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::memory::value::Value;
    use crate::parser::parse;

    fn run(source: &str) -> Interpreter {
        let mut interp = Interpreter::new(parse(source).unwrap());
        interp.run().unwrap();
        interp
    }

    fn value_of(interp: &Interpreter, name: &str) -> Value {
        interp.scope().get(name).unwrap().value.clone().unwrap()
    }

    #[test]
    fn test_compound_assignment() {
        let interp = run("let s = 'a'; s += 1; let n = 10; n -= 3; n *= 2; n %= 5;");
        assert_eq!(value_of(&interp, "s"), Value::Text("a1".into()));
        assert_eq!(value_of(&interp, "n"), Value::Int(4));
    }

    #[test]
    fn test_assignment_expression_value() {
        let interp = run("let a; let b = a = [1]; b");
        assert_eq!(value_of(&interp, "a"), value_of(&interp, "b"));
        assert!(interp.completion().is_container());
    }

    #[test]
    fn test_aliased_mutation() {
        let interp = run("let a = {n: 1}; let b = a; b.n += 1; a.n");
        assert_eq!(*interp.completion(), Value::Int(2));
    }

    #[test]
    fn test_implicit_global_from_nested_assignment() {
        let interp = run("let o = {}; o.k = g = 'x';");
        assert_eq!(value_of(&interp, "g"), Value::Text("x".into()));
    }
}
