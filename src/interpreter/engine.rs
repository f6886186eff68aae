// Execution engine for the snippet executor

use crate::interpreter::console::Console;
use crate::interpreter::constants::READ_ONLY_GLOBALS;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::{builtins, ExecutionOutput};
use crate::memory::value::{ObjectArena, Symbol, Value};
use crate::parser::ast::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// How a binding was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Let,
    Const,
    Var,
    Implicit, // Assignment to an undeclared name
}

impl From<DeclKind> for BindingKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Let => BindingKind::Let,
            DeclKind::Const => BindingKind::Const,
            DeclKind::Var => BindingKind::Var,
        }
    }
}

/// A named binding; `value` is `None` until a `let`/`const` declaration runs
#[derive(Debug, Clone)]
pub struct Binding {
    pub kind: BindingKind,
    pub value: Option<Value>,
}

/// The snippet's single top-level scope, which is also the run's stack frame
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Binding>,
    insertion_order: Vec<String>, // Track order of declarations
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a binding; redeclaring keeps the original position
    pub fn declare(&mut self, name: &str, kind: BindingKind, value: Option<Value>) {
        if !self.bindings.contains_key(name) {
            self.insertion_order.push(name.to_string());
        }
        self.bindings.insert(name.to_string(), Binding { kind, value });
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Initialized bindings in declaration order
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| {
                let value = self.bindings.get(name)?.value.clone()?;
                Some((name.clone(), value))
            })
            .collect()
    }
}

/// The interpreter that executes a parsed snippet
pub struct Interpreter {
    /// Parsed snippet
    program: Program,

    /// Top-level bindings
    pub(crate) scope: Scope,

    /// Every array and record created by the snippet
    pub(crate) arena: ObjectArena,

    /// Mock console for `console.log` output
    pub(crate) console: Console,

    /// Value of the last expression statement
    completion: Value,

    /// Id handed to the next `Symbol()` call
    next_symbol: u32,
}

impl Interpreter {
    /// Create a new interpreter with the parsed program
    pub fn new(program: Program) -> Self {
        Interpreter {
            program,
            scope: Scope::new(),
            arena: ObjectArena::new(),
            console: Console::new(),
            completion: Value::Undefined,
            next_symbol: 0,
        }
    }

    /// A symbol distinct from every symbol created before it
    pub(crate) fn new_symbol(&mut self, description: String) -> Symbol {
        let symbol = Symbol::new(self.next_symbol, description);
        self.next_symbol += 1;
        symbol
    }

    /// Run the program from start to finish
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = std::mem::take(&mut self.program);
        self.hoist_declarations(&program)?;

        for stmt in &program.statements {
            self.execute_statement(stmt)?;
        }

        debug!(
            bindings = self.scope.insertion_order.len(),
            objects = self.arena.len(),
            "snippet finished"
        );
        self.program = program;
        Ok(())
    }

    /// Declare every `let`/`const`/`var` before execution, in source order.
    ///
    /// `var` bindings start as `undefined`; `let`/`const` stay uninitialized
    /// until their declaration runs. Redeclaring a lexical binding is an
    /// early error, reported before any statement executes.
    fn hoist_declarations(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for stmt in &program.statements {
            let AstNode::VarDecl {
                kind,
                name,
                location,
                ..
            } = stmt
            else {
                continue;
            };

            if READ_ONLY_GLOBALS.contains(&name.as_str()) {
                if *kind != DeclKind::Var {
                    return Err(RuntimeError::Redeclaration {
                        message: format!("Identifier '{}' has already been declared", name),
                        location: *location,
                    });
                }
                continue;
            }

            if let Some(existing) = self.scope.get(name) {
                let lexical = |k: BindingKind| matches!(k, BindingKind::Let | BindingKind::Const);
                if lexical(existing.kind) || lexical((*kind).into()) {
                    return Err(RuntimeError::Redeclaration {
                        message: format!("Identifier '{}' has already been declared", name),
                        location: *location,
                    });
                }
                continue;
            }

            let initial = match kind {
                DeclKind::Var => Some(Value::Undefined),
                DeclKind::Let | DeclKind::Const => None,
            };
            self.scope.declare(name, (*kind).into(), initial);
        }
        Ok(())
    }

    fn execute_statement(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        match stmt {
            AstNode::VarDecl {
                kind, name, init, ..
            } => {
                let value = match init {
                    Some(expr) => Some(self.evaluate_expr(expr)?),
                    None => None,
                };
                trace!(%name, ?value, "declare");
                match (kind, value) {
                    // `var x;` leaves an earlier value alone
                    (DeclKind::Var, None) => {}
                    (DeclKind::Var, Some(_)) if READ_ONLY_GLOBALS.contains(&name.as_str()) => {}
                    (_, value) => {
                        self.scope
                            .declare(name, (*kind).into(), Some(value.unwrap_or_default()))
                    }
                }
                Ok(())
            }
            AstNode::ExpressionStatement { expr, .. } => {
                self.completion = self.evaluate_expr(expr)?;
                Ok(())
            }
            AstNode::Empty { .. } => Ok(()),
            other => Err(RuntimeError::unsupported(
                "Expression used as a statement",
                *other.location(),
            )),
        }
    }

    /// Read a variable, falling back to builtin globals
    pub(crate) fn read_variable(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match self.scope.get(name) {
            Some(Binding {
                value: Some(value), ..
            }) => Ok(value.clone()),
            Some(Binding { value: None, .. }) => Err(RuntimeError::Uninitialized {
                name: name.to_string(),
                location,
            }),
            None => builtins::global(name).ok_or_else(|| RuntimeError::NotDefined {
                name: name.to_string(),
                location,
            }),
        }
    }

    /// Assign to a variable, creating an implicit global if it is undeclared
    pub(crate) fn write_variable(
        &mut self,
        name: &str,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match self.scope.get_mut(name) {
            Some(Binding { value: None, .. }) => Err(RuntimeError::Uninitialized {
                name: name.to_string(),
                location,
            }),
            Some(Binding {
                kind: BindingKind::Const,
                ..
            }) => Err(RuntimeError::type_error("Assignment to constant variable.", location)),
            Some(binding) => {
                binding.value = Some(value);
                Ok(())
            }
            None if READ_ONLY_GLOBALS.contains(&name) => {
                trace!(%name, "ignored write to read-only global");
                Ok(())
            }
            None => {
                trace!(%name, "implicit global");
                self.scope.declare(name, BindingKind::Implicit, Some(value));
                Ok(())
            }
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn arena(&self) -> &ObjectArena {
        &self.arena
    }

    pub fn completion(&self) -> &Value {
        &self.completion
    }

    /// Consume the interpreter, yielding everything the diagram needs
    pub fn into_output(self) -> ExecutionOutput {
        ExecutionOutput {
            bindings: self.scope.bindings(),
            arena: self.arena,
            console: self.console.into_output(),
            completion: self.completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(source: &str) -> Result<Interpreter, RuntimeError> {
        let mut interp = Interpreter::new(parse(source)?);
        interp.run()?;
        Ok(interp)
    }

    #[test]
    fn test_bindings_follow_declaration_order() {
        let interp = run("var b = 1; let a = 2; c = 3; var b = 4;").unwrap();
        let names: Vec<String> = interp
            .scope()
            .bindings()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(interp.scope().get("b").unwrap().value, Some(Value::Int(4)));
        assert_eq!(interp.scope().get("c").unwrap().kind, BindingKind::Implicit);
    }

    #[test]
    fn test_var_hoisting_and_redeclaration() {
        let interp = run("let seen = v; var v = 5; var v;").unwrap();
        assert_eq!(
            interp.scope().get("seen").unwrap().value,
            Some(Value::Undefined)
        );
        assert_eq!(interp.scope().get("v").unwrap().value, Some(Value::Int(5)));
    }

    #[test]
    fn test_lexical_errors() {
        let err = run("let x = 1; let x = 2;").err().unwrap();
        assert_eq!(err.kind(), "SyntaxError");

        let err = run("y = 1; let y = 2;").err().unwrap();
        assert_eq!(err.to_string(), "Cannot access 'y' before initialization");

        let err = run("const k = 1; k = 2;").err().unwrap();
        assert_eq!(err.to_string(), "Assignment to constant variable.");

        let err = run("missing + 1").err().unwrap();
        assert_eq!(err.to_string(), "missing is not defined");
        assert_eq!(err.location(), SourceLocation::new(1, 1));
    }

    #[test]
    fn test_read_only_globals_stay_out_of_scope() {
        let interp = run("var NaN = 1; Infinity = 2; let n = NaN;").unwrap();
        let names: Vec<String> = interp
            .scope()
            .bindings()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["n"]);
        let n = interp.scope().get("n").unwrap().value.clone();
        assert!(matches!(n, Some(Value::Float(v)) if v.is_nan()));

        let err = run("let Infinity = 1;").err().unwrap();
        assert_eq!(err.kind(), "SyntaxError");
    }

    #[test]
    fn test_negative_zero_keeps_its_sign() {
        let interp = run("let n = -0; let r = 1 / n; n === 0").unwrap();
        assert_eq!(*interp.completion(), Value::Bool(true));
        assert_eq!(
            interp.scope().get("r").unwrap().value,
            Some(Value::Float(f64::NEG_INFINITY))
        );
        let interp = run("String(1 / -0)").unwrap();
        assert_eq!(*interp.completion(), Value::Text("-Infinity".into()));
    }

    #[test]
    fn test_completion_value() {
        let interp = run("let a = 1; a + 1; let b = 3;").unwrap();
        assert_eq!(*interp.completion(), Value::Int(2));

        let interp = run("let a = 1;").unwrap();
        assert_eq!(*interp.completion(), Value::Undefined);
    }

    #[test]
    fn test_uninitialized_let_is_undefined_after_declaration() {
        let interp = run("let a; a").unwrap();
        assert_eq!(
            interp.scope().get("a").unwrap().value,
            Some(Value::Undefined)
        );
    }
}
