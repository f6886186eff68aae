//! Runtime error types for the snippet executor
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! while running a snippet, and [`ExecutionFailure`], the form in which they cross
//! the executor boundary.
//!
//! All runtime errors are fatal: the run stops and nothing from it is shown
//! except the failure message.

use crate::parser::ast::SourceLocation;
use crate::parser::ParseError;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// Read of a name with no binding
    #[error("{name} is not defined")]
    NotDefined {
        name: String,
        location: SourceLocation,
    },

    /// Access to a `let`/`const` binding before its declaration ran
    #[error("Cannot access '{name}' before initialization")]
    Uninitialized {
        name: String,
        location: SourceLocation,
    },

    /// Any JavaScript `TypeError` (const assignment, null property access, ...)
    #[error("{message}")]
    TypeError {
        message: String,
        location: SourceLocation,
    },

    /// Early errors found before execution (redeclarations)
    #[error("{message}")]
    Redeclaration {
        message: String,
        location: SourceLocation,
    },

    /// Snippet failed to lex or parse
    #[error("{0}")]
    Syntax(#[from] ParseError),

    /// Valid JavaScript the executor does not model
    #[error("{message}")]
    Unsupported {
        message: String,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> SourceLocation {
        match self {
            RuntimeError::NotDefined { location, .. } => *location,
            RuntimeError::Uninitialized { location, .. } => *location,
            RuntimeError::TypeError { location, .. } => *location,
            RuntimeError::Redeclaration { location, .. } => *location,
            RuntimeError::Syntax(err) => err.location,
            RuntimeError::Unsupported { location, .. } => *location,
        }
    }

    /// JavaScript error constructor name for this error
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::NotDefined { .. } | RuntimeError::Uninitialized { .. } => {
                "ReferenceError"
            }
            RuntimeError::TypeError { .. } => "TypeError",
            RuntimeError::Redeclaration { .. } | RuntimeError::Syntax(_) => "SyntaxError",
            RuntimeError::Unsupported { .. } => "Error",
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::Unsupported {
            message: message.into(),
            location,
        }
    }
}

/// A run that stopped with an error; only the message is ever displayed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionFailure {
    pub kind: String,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl ExecutionFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ExecutionFailure {
            kind: kind.into(),
            message: message.into(),
            location: None,
        }
    }
}

impl From<RuntimeError> for ExecutionFailure {
    fn from(err: RuntimeError) -> Self {
        ExecutionFailure {
            kind: err.kind().to_string(),
            message: err.to_string(),
            location: Some(err.location()),
        }
    }
}
