//! TUI pane rendering modules
//!
//! Each pane is a stateless render function; scroll offsets are owned by the
//! [`App`](crate::ui::App) and clamped here.
//!
//! # Pane Modules
//!
//! - [`source`]: the snippet with JavaScript syntax highlighting and the failing line
//! - [`console`]: `console.log` output, the completion value and run errors
//! - [`memory`]: stack slots, heap nodes and arrows on a braille canvas
//! - [`status`]: status bar with keybindings and run state

pub mod console;
pub mod memory;
pub mod source;
pub mod status;

pub use console::render_console_pane;
pub use memory::render_memory_pane;
pub use source::render_source_pane;
pub use status::{render_status_bar, StatusRenderData};
