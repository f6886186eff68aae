//! Run orchestration
//!
//! Every run executes the snippet and rebuilds the whole diagram from the
//! result:
//!
//! ```text
//! source → Executor → HeapGraph + StackModel → ValueFormatter → TextMeasurer
//!        → LayoutEngine → connectors → Diagram
//! ```
//!
//! - [`orchestrator`]: the [`Orchestrator`] that sequences a run and node moves
//! - [`context`]: [`RunContext`], all state of the current run
//! - [`diagram`]: the [`Diagram`] handed to the presentation layer
//! - [`debounce`]: quiet-period coalescing of re-run triggers

pub mod context;
pub mod debounce;
pub mod diagram;
pub mod orchestrator;

pub use context::RunContext;
pub use debounce::{Debouncer, SnippetFile, DEFAULT_QUIET_PERIOD};
pub use diagram::{Connector, Diagnostic, Diagram, Endpoint, NodeView, SlotView};
pub use orchestrator::Orchestrator;
