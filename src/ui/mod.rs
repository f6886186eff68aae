//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, the event loop, pane focus, node
//!   selection and dragging, debounced re-runs of the watched snippet
//! - **[`panes`]**: stateless render functions for each visible pane (source,
//!   console, memory canvas, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with an
//! [`Orchestrator`] using the terminal layout preset and call [`App::run`] to
//! start the event loop.
//!
//! [`Orchestrator`]: crate::run::Orchestrator
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::{App, FocusedPane, TerminalOrchestrator};
