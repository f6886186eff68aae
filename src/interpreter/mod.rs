//! JavaScript-subset snippet executor
//!
//! This module provides the execution collaborator the diagram is built from:
//! - [`engine`]: Main interpreter with AST execution and the binding scope
//! - [`expressions`] and [`ops`]: expression evaluation, split by operator family
//! - [`builtins`]: `console.log`, `JSON.stringify`, `Object.keys` and friends
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! Declarations are hoisted, then the top-level statements run once from
//! start to finish. The result is the ordered set of bindings, the arena of
//! every array and record created, the captured console lines and the value
//! of the last expression statement.

pub mod builtins;
pub mod console;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod heap_serial;
pub mod ops;
pub mod type_system;

pub use errors::{ExecutionFailure, RuntimeError};

use crate::memory::value::{ObjectArena, Value};
use crate::parser;
use engine::Interpreter;
use tracing::{debug, warn};

/// Everything one successful run yields
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    /// Top-level bindings in declaration order
    pub bindings: Vec<(String, Value)>,
    pub arena: ObjectArena,
    /// One entry per `console.log` call
    pub console: Vec<String>,
    pub completion: Value,
}

impl ExecutionOutput {
    /// `String(completion)`, or `None` when the completion is `undefined`
    pub fn completion_text(&self) -> Option<String> {
        match self.completion {
            Value::Undefined => None,
            ref v => Some(type_system::display_string(&self.arena, v)),
        }
    }
}

/// Turns snippet source into named values
pub trait Executor {
    fn execute(&mut self, source: &str) -> Result<ExecutionOutput, ExecutionFailure>;
}

/// The built-in JavaScript-subset executor
#[derive(Debug, Clone, Copy, Default)]
pub struct JsExecutor;

impl JsExecutor {
    pub fn new() -> Self {
        JsExecutor
    }
}

impl Executor for JsExecutor {
    fn execute(&mut self, source: &str) -> Result<ExecutionOutput, ExecutionFailure> {
        let program = parser::parse(source).map_err(|e| {
            warn!(error = %e, "snippet failed to parse");
            ExecutionFailure::from(RuntimeError::from(e))
        })?;
        debug!(statements = program.statements.len(), "parsed snippet");

        let mut interpreter = Interpreter::new(program);
        if let Err(e) = interpreter.run() {
            warn!(kind = e.kind(), error = %e, location = %e.location(), "snippet failed");
            return Err(e.into());
        }
        Ok(interpreter.into_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_collects_bindings_and_console() {
        let output = JsExecutor::new()
            .execute("let a = [1]; const b = a; console.log(b.length); b.length + 1")
            .unwrap();
        let names: Vec<&str> = output.bindings.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(output.bindings[0].1, output.bindings[1].1);
        assert_eq!(output.console, vec!["1".to_string()]);
        assert_eq!(output.completion_text(), Some("2".to_string()));
    }

    #[test]
    fn test_undefined_completion_has_no_text() {
        let output = JsExecutor::new().execute("let a = 1;").unwrap();
        assert_eq!(output.completion_text(), None);
    }

    #[test]
    fn test_failures_carry_kind_and_message() {
        let err = JsExecutor::new().execute("let a = ;").unwrap_err();
        assert_eq!(err.kind, "SyntaxError");

        let err = JsExecutor::new().execute("let a = 1;\nb.c").unwrap_err();
        assert_eq!(err.kind, "ReferenceError");
        assert_eq!(err.to_string(), "b is not defined");
        assert_eq!(err.location.map(|l| l.line), Some(2));
    }
}
