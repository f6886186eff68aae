//! JavaScript snippet parser
//!
//! This module transforms snippet text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct and entry point (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! Enough JavaScript to build aliased, nested, and cyclic values:
//! - Statements: `let`/`const`/`var` declarations and expression statements
//! - Expressions: arithmetic, equality, relational, logical, `typeof`,
//!   member/index access, calls, array and object literals, assignment
//! - No functions, control flow, classes, or template literals
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{parse, ParseError, Parser};
