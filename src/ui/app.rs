//! Main TUI application state and logic

use crate::interpreter::JsExecutor;
use crate::layout::geometry::{size, vector, Vector};
use crate::layout::{MonospaceMeasurer, Point};
use crate::memory::Address;
use crate::run::{Debouncer, Diagram, Orchestrator, SnippetFile};
use crate::ui::panes::{self, memory::to_diagram_point, StatusRenderData};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The orchestrator the terminal front-end drives
pub type TerminalOrchestrator = Orchestrator<JsExecutor, MonospaceMeasurer>;

/// How often the snippet's modification time is checked
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Cells moved per arrow key press with Shift held
const FAST_STEP: f64 = 5.0;

/// Rows scrolled per mouse wheel notch
const WHEEL_STEP: usize = 3;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> console -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Memory,
            FocusedPane::Console => FocusedPane::Source,
            FocusedPane::Memory => FocusedPane::Console,
        }
    }
}

/// A heap node being dragged with the mouse
#[derive(Debug, Clone, Copy)]
struct Drag {
    address: Address,
    /// Pointer position relative to the node's top-left corner
    grab: Vector,
}

/// The main application state
pub struct App {
    orchestrator: TerminalOrchestrator,

    /// Watched snippet file, if the source came from disk
    snippet: Option<SnippetFile>,

    /// The source code being visualized
    pub source_code: String,

    /// Diagram of the latest run
    pub diagram: Diagram,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub console_scroll: usize,
    pub memory_scroll: usize,

    /// Selected heap node
    pub selected: Option<Address>,

    drag: Option<Drag>,
    debouncer: Debouncer,
    last_poll: Instant,

    /// Pane rectangles from the last render, for mouse hit testing
    source_area: Rect,
    console_area: Rect,
    memory_inner: Rect,

    /// Number of completed runs
    pub run_count: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create the app and run the snippet once
    pub fn new(orchestrator: TerminalOrchestrator, source_code: String, quiet: Duration) -> Self {
        let mut app = App {
            orchestrator,
            snippet: None,
            source_code,
            diagram: Diagram::default(),
            focused_pane: FocusedPane::Memory,
            source_scroll: 0,
            console_scroll: 0,
            memory_scroll: 0,
            selected: None,
            drag: None,
            debouncer: Debouncer::new(quiet),
            last_poll: Instant::now(),
            source_area: Rect::default(),
            console_area: Rect::default(),
            memory_inner: Rect::default(),
            run_count: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
        };
        app.rerun();
        app
    }

    /// Re-run whenever `snippet` changes on disk
    pub fn watch(mut self, snippet: SnippetFile) -> Self {
        self.snippet = Some(snippet);
        self
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            self.sync_viewport();

            if self.should_quit {
                break;
            }

            let now = Instant::now();
            self.poll_snippet(now);
            if self.debouncer.fire(now) {
                self.reload_and_run();
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(key)
                    }
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    // Resizes are picked up by `sync_viewport` after the next draw
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Console (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]);

        self.source_area = left_rows[0];
        self.console_area = left_rows[1];
        self.memory_inner = panes::memory::memory_block(false, String::new()).inner(columns[1]);

        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            self.diagram.error_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_console_pane(
            frame,
            left_rows[1],
            &self.diagram.diagnostics,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        panes::render_memory_pane(
            frame,
            columns[1],
            &self.diagram,
            self.selected,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                message: &self.status_message,
                run_count: self.run_count,
                has_error: self.diagram.has_error(),
                rerun_pending: self.debouncer.is_pending(),
                selected: self.selected,
            },
        );
    }

    /// Re-run when the memory pane no longer matches the layout viewport
    pub fn sync_viewport(&mut self) {
        let inner = self.memory_inner;
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let viewport = size(f64::from(inner.width), f64::from(inner.height));
        if viewport != self.orchestrator.viewport() {
            debug!(
                width = inner.width,
                height = inner.height,
                "memory pane resized"
            );
            self.orchestrator.resize(viewport);
            self.rerun();
        }
    }

    fn poll_snippet(&mut self, now: Instant) {
        if now.duration_since(self.last_poll) < POLL_INTERVAL {
            return;
        }
        self.last_poll = now;

        let Some(snippet) = self.snippet.as_mut() else {
            return;
        };
        match snippet.poll() {
            Ok(true) => {
                self.debouncer.trigger(now);
                self.status_message = "Change detected".to_string();
            }
            Ok(false) => {}
            Err(e) => {
                self.status_message = format!("Cannot read {}: {}", snippet.path().display(), e);
            }
        }
    }

    /// Read the snippet again, if there is one, and run it
    fn reload_and_run(&mut self) {
        if let Some(snippet) = self.snippet.as_mut() {
            match snippet.read() {
                Ok(source) => self.source_code = source,
                Err(e) => {
                    warn!(path = %snippet.path().display(), error = %e, "cannot read snippet");
                    self.status_message =
                        format!("Cannot read {}: {}", snippet.path().display(), e);
                    return;
                }
            }
        }
        self.rerun();
    }

    /// Run the current source and replace the diagram
    pub fn rerun(&mut self) {
        self.diagram = self.orchestrator.run(&self.source_code);
        self.run_count += 1;
        self.drag = None;
        if self
            .selected
            .is_some_and(|address| self.diagram.node(address).is_none())
        {
            self.selected = None;
        }
        self.console_scroll = usize::MAX; // Clamped to the bottom when rendered

        self.status_message = if self.diagram.has_error() {
            "Run failed".to_string()
        } else {
            format!(
                "{} slot(s), {} heap node(s)",
                self.diagram.slots.len(),
                self.diagram.nodes.len()
            )
        };
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.debouncer.cancel();
                self.reload_and_run();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Char('n') if self.focused_pane == FocusedPane::Memory => {
                self.cycle_selection(true);
            }
            KeyCode::Char('p') if self.focused_pane == FocusedPane::Memory => {
                self.cycle_selection(false);
            }
            KeyCode::Esc => {
                self.selected = None;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down
                if self.focused_pane == FocusedPane::Memory && self.selected.is_some() =>
            {
                let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
                    FAST_STEP
                } else {
                    1.0
                };
                let delta = match key.code {
                    KeyCode::Left => vector(-step, 0.0),
                    KeyCode::Right => vector(step, 0.0),
                    KeyCode::Up => vector(0.0, -step),
                    _ => vector(0.0, step),
                };
                self.nudge_selected(delta);
            }
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                let page = self.page_size();
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(page);
            }
            KeyCode::PageDown => {
                let page = self.page_size();
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(page);
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Console => &mut self.console_scroll,
            FocusedPane::Memory => &mut self.memory_scroll,
        }
    }

    fn page_size(&self) -> usize {
        usize::from(self.memory_inner.height / 2).max(1)
    }

    fn cycle_selection(&mut self, forward: bool) {
        let count = self.diagram.nodes.len();
        if count == 0 {
            self.selected = None;
            return;
        }
        let nodes = &self.diagram.nodes;
        let current = self
            .selected
            .and_then(|address| nodes.iter().position(|n| n.address == address));
        let index = match (current, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        let address = self.diagram.nodes[index].address;
        self.selected = Some(address);
        self.status_message = format!("Selected {}", address);
    }

    /// Move the selected node by `delta` cells
    fn nudge_selected(&mut self, delta: Vector) {
        let Some(address) = self.selected else {
            return;
        };
        let Some(node) = self.diagram.node(address) else {
            return;
        };
        let target = node.rect.origin + delta;
        self.move_node_to(address, target);
    }

    /// Move a node's top-left corner to `target` in diagram coordinates
    fn move_node_to(&mut self, address: Address, target: Point) {
        let local = target - self.diagram.heap_area.origin;
        let moved = self.orchestrator.move_node(address, local.x, local.y);
        if moved.is_some() {
            self.diagram = self.orchestrator.diagram();
        }
    }

    /// Handle mouse events: dragging heap nodes and wheel scrolling
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        let cell = to_diagram_point(self.memory_inner, self.memory_scroll, column, row)
            .map(|p| p + vector(0.5, 0.5)); // Cell center

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(p) = cell else {
                    return;
                };
                self.focused_pane = FocusedPane::Memory;
                if let Some(node) = self.diagram.node_at(p) {
                    self.drag = Some(Drag {
                        address: node.address,
                        grab: p - node.rect.origin,
                    });
                    self.selected = Some(node.address);
                    self.status_message = format!("Dragging {}", node.address);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let (Some(drag), Some(p)) = (self.drag, cell) {
                    self.move_node_to(drag.address, p - drag.grab);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(drag) = self.drag.take() {
                    self.status_message = format!("Moved {}", drag.address);
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let down = mouse.kind == MouseEventKind::ScrollDown;
                let scroll = if contains(self.source_area, column, row) {
                    &mut self.source_scroll
                } else if contains(self.console_area, column, row) {
                    &mut self.console_scroll
                } else {
                    &mut self.memory_scroll
                };
                *scroll = if down {
                    scroll.saturating_add(WHEEL_STEP)
                } else {
                    scroll.saturating_sub(WHEEL_STEP)
                };
            }
            _ => {}
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, LayoutEngine};
    use ratatui::backend::TestBackend;

    fn app(source: &str) -> App {
        let orchestrator = Orchestrator::new(
            JsExecutor::new(),
            MonospaceMeasurer::cells(),
            LayoutEngine::new(LayoutConfig::terminal(), Some(9)),
            size(72.0, 30.0),
        );
        App::new(orchestrator, source.to_string(), Duration::from_millis(300))
    }

    fn draw(app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        app.sync_viewport();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(FocusedPane::Source.next(), FocusedPane::Console);
        assert_eq!(FocusedPane::Memory.next(), FocusedPane::Source);
        assert_eq!(FocusedPane::Source.prev(), FocusedPane::Memory);
    }

    #[test]
    fn test_resize_triggers_rerun() {
        let mut app = app("let a = [1];");
        assert_eq!(app.run_count, 1);
        draw(&mut app);
        assert_eq!(app.run_count, 2);
        assert_eq!(app.orchestrator.viewport(), size(70.0, 29.0));
    }

    #[test]
    fn test_select_and_nudge() {
        let mut app = app("let a = [1]; let b = {};");
        draw(&mut app);

        app.handle_key_event(key(KeyCode::Char('n')));
        let first = app.selected.unwrap();
        assert_eq!(first, app.diagram.nodes[0].address);
        app.handle_key_event(key(KeyCode::Char('n')));
        assert_eq!(app.selected, Some(app.diagram.nodes[1].address));
        app.handle_key_event(key(KeyCode::Char('p')));
        assert_eq!(app.selected, Some(first));

        app.handle_key_event(key(KeyCode::Home)); // ignored
        let before = app.diagram.node(first).unwrap().rect;
        app.handle_key_event(key(KeyCode::Left));
        let after = app.diagram.node(first).unwrap().rect;
        let expected = (before.min_x() - 1.0).max(app.diagram.heap_area.min_x());
        assert!((after.min_x() - expected).abs() < 1e-9);
        assert!((after.min_y() - before.min_y()).abs() < 1e-9);

        app.handle_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        app.handle_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        app.handle_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        let rect = app.diagram.node(first).unwrap().rect;
        assert!(rect.min_x() >= app.diagram.heap_area.min_x() - 1e-9);
    }

    #[test]
    fn test_mouse_drag_keeps_grab_offset() {
        let mut app = app("let a = {};");
        draw(&mut app);

        let node = app.diagram.nodes[0].clone();
        let inner = app.memory_inner;
        // Grab one cell right of the node's left edge, on its top row
        let column = inner.x + node.rect.min_x().ceil() as u16 + 1;
        let row = inner.y + node.rect.min_y().ceil() as u16;
        let mouse = |kind, column, row| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        assert_eq!(app.selected, Some(node.address));

        let (to_column, to_row) = (column + 3, row + 1);
        app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), to_column, to_row));
        let moved = app.diagram.node(node.address).unwrap().rect;
        let expected_x = (node.rect.min_x() + 3.0)
            .min(app.diagram.heap_area.max_x() - moved.width());
        assert!((moved.min_x() - expected_x).abs() < 1e-9);

        app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), to_column, to_row));
        assert!(app.drag.is_none());
        assert!(app.status_message.starts_with("Moved"));
    }

    #[test]
    fn test_rerun_and_quit_keys() {
        let mut app = app("let a = 1;");
        app.source_code = "let a = ;".to_string();
        app.handle_key_event(key(KeyCode::Char('r')));
        assert!(app.diagram.has_error());
        assert_eq!(app.status_message, "Run failed");

        app.handle_key_event(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_shows_every_pane() {
        let mut app = app("let list = [1, 2];\nlet n = list.length;\nn * 2");
        let terminal = draw(&mut app);
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(text.contains("Source"));
        assert!(text.contains("Console"));
        assert!(text.contains("Memory"));
        assert!(text.contains("=> 4"));
        assert!(text.contains("0x00001000"));
        assert!(text.contains("0x00000002"));
    }
}
