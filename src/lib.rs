//! # Introduction
//!
//! memtty runs a JavaScript snippet and draws the resulting memory model:
//! every top-level binding as a stack slot, every object, array and string it
//! can reach as a heap node, and an arrow for every reference. The diagram is
//! shown in a terminal UI built with [ratatui](https://docs.rs/ratatui) and
//! redrawn whenever the snippet file changes.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter → Bindings → Graph → Layout → Diagram → TUI
//! ```
//!
//! 1. [`parser`]: tokenises the snippet and builds an AST.
//! 2. [`interpreter`]: evaluates the program and returns its top-level
//!    bindings, the object arena and the console output.
//! 3. [`memory`]: addresses, the identity registry, the heap graph, value
//!    formatting and the stack model.
//! 4. [`layout`]: label measurement, spiral placement of heap nodes and
//!    arrow routing on box boundaries.
//! 5. [`run`]: the per-run orchestrator producing a [`run::Diagram`], plus
//!    the re-run debouncer and snippet file watcher.
//! 6. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported JavaScript subset
//!
//! Declarations: `let`, `const`, `var`. Values: numbers, strings, booleans,
//! `null`, `undefined`, symbols, array and object literals. Expressions:
//! arithmetic, comparison and logical operators, `typeof`,
//! member access and assignment.
//! Built-ins: `console.log`, `JSON.stringify`, `Object.keys`, `String`,
//! `Symbol`, `Array.prototype.push` and `pop`.

pub mod interpreter;
pub mod layout;
pub mod memory;
pub mod parser;
pub mod run;
pub mod ui;
