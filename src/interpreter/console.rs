// Captured console output

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::heap_serial;
use crate::interpreter::type_system::display_string;
use crate::memory::value::{ObjectArena, Value};
use crate::parser::ast::SourceLocation;

/// Mock console capturing `console.log` calls
#[derive(Debug, Clone, Default)]
pub struct Console {
    entries: Vec<ConsoleEntry>,
}

/// One `console.log` call; `text` may span several lines
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleEntry {
    pub text: String,
    pub location: SourceLocation,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format and record one `console.log(args...)` call
    pub fn log(
        &mut self,
        arena: &ObjectArena,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(format_arg(arena, arg, location)?);
        }
        self.entries.push(ConsoleEntry {
            text: parts.join(" "),
            location,
        });
        Ok(())
    }

    pub fn entries(&self) -> &[ConsoleEntry] {
        &self.entries
    }

    /// One string per `console.log` call
    pub fn into_output(self) -> Vec<String> {
        self.entries.into_iter().map(|e| e.text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Objects print as indented JSON, everything else as `String(arg)`
fn format_arg(
    arena: &ObjectArena,
    arg: &Value,
    location: SourceLocation,
) -> Result<String, RuntimeError> {
    match arg {
        Value::Null | Value::Array(_) | Value::Record(_) => {
            let text = heap_serial::stringify(arena, arg, true, location)?;
            Ok(text.unwrap_or_default())
        }
        other => Ok(display_string(arena, other)),
    }
}
