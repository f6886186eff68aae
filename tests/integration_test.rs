// End-to-end tests: snippet source through the orchestrator to a diagram

use std::fs;
use std::path::Path;
use std::time::Duration;

use memtty::interpreter::{Executor, JsExecutor};
use memtty::layout::geometry::size;
use memtty::layout::{LayoutConfig, LayoutEngine, MonospaceMeasurer};
use memtty::run::{Diagnostic, Diagram, Endpoint, Orchestrator};
use memtty::ui::App;
use ratatui::{backend::TestBackend, Terminal};

fn pixel_orchestrator() -> Orchestrator<JsExecutor, MonospaceMeasurer> {
    Orchestrator::new(
        JsExecutor::new(),
        MonospaceMeasurer::default(),
        LayoutEngine::new(LayoutConfig::default(), Some(42)),
        size(800.0, 600.0),
    )
}

fn demo(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name);
    fs::read_to_string(&path).expect("demo snippet should exist")
}

fn run_demo(name: &str) -> Diagram {
    pixel_orchestrator().run(&demo(name))
}

fn slot<'a>(diagram: &'a Diagram, name: &str) -> &'a memtty::run::SlotView {
    diagram
        .slots
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no slot named {}", name))
}

#[test]
fn test_aliasing_demo() {
    let diagram = run_demo("aliasing.js");

    let names: Vec<&str> = diagram.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["scores", "alias", "player", "count"]);

    let scores = slot(&diagram, "scores");
    assert_eq!(scores.encoded, "0x00001000");
    assert_eq!(slot(&diagram, "alias").address, scores.address);
    assert_eq!(slot(&diagram, "count").encoded, "0x00000004");
    assert_eq!(slot(&diagram, "count").address, None);

    // scores array, player record, "ada"
    assert_eq!(diagram.nodes.len(), 3);
    let array = diagram.node(scores.address.unwrap()).unwrap();
    assert_eq!(array.label, "[90, 72, 85, 100]");

    assert_eq!(
        diagram.diagnostics,
        vec![Diagnostic::Log("count: 4".into())]
    );
    assert!(!diagram.has_error());
}

#[test]
fn test_arrows_list_stack_before_heap() {
    let diagram = run_demo("aliasing.js");

    let first_heap = diagram
        .connectors
        .iter()
        .position(|c| matches!(c.from, Endpoint::Node(_)))
        .expect("player points at the array and the name");
    assert!(diagram.connectors[..first_heap]
        .iter()
        .all(|c| matches!(c.from, Endpoint::Slot(_))));
    assert!(diagram.connectors[first_heap..]
        .iter()
        .all(|c| matches!(c.from, Endpoint::Node(_))));

    // scores, alias and player each get one stack arrow
    assert_eq!(first_heap, 3);
    assert_eq!(diagram.connectors.len(), 5);
}

#[test]
fn test_cycles_demo_terminates() {
    let diagram = run_demo("cycles.js");

    let node = slot(&diagram, "node").address.unwrap();
    let self_edge = diagram
        .connectors
        .iter()
        .find(|c| c.from == Endpoint::Node(node) && c.to == node)
        .expect("self reference");
    assert_eq!(self_edge.arrow.length, 0.0);

    let left = slot(&diagram, "left").address.unwrap();
    let right = slot(&diagram, "right").address.unwrap();
    let edges: Vec<(Endpoint, _)> = diagram.connectors.iter().map(|c| (c.from, c.to)).collect();
    assert!(edges.contains(&(Endpoint::Node(left), right)));
    assert!(edges.contains(&(Endpoint::Node(right), left)));
}

#[test]
fn test_strings_demo_shares_equal_text() {
    let diagram = run_demo("strings.js");

    assert_eq!(
        slot(&diagram, "greeting").address,
        slot(&diagram, "copy").address
    );
    assert_eq!(slot(&diagram, "ratio").encoded, "0x3FE0000000000000");
    assert_eq!(slot(&diagram, "missing").encoded, "0xUNDEFINED");
    assert!(diagram.nodes.iter().any(|n| n.label == "\"hello!\""));
    assert_eq!(
        diagram.diagnostics,
        vec![Diagnostic::Result("object".into())]
    );
}

#[test]
fn test_errors_demo_clears_the_diagram() {
    let diagram = run_demo("errors.js");

    assert!(diagram.slots.is_empty());
    assert!(diagram.nodes.is_empty());
    assert!(diagram.connectors.is_empty());
    assert!(diagram.has_error());
    assert_eq!(diagram.error_line, Some(5));
}

#[test]
fn test_heap_nodes_stay_inside_the_container() {
    for name in ["aliasing.js", "cycles.js", "strings.js"] {
        let diagram = run_demo(name);
        let area = diagram.heap_area;
        for node in &diagram.nodes {
            let rect = node.rect;
            let inside = rect.min_x() >= area.min_x() - 1e-9
                && rect.min_y() >= area.min_y() - 1e-9
                && rect.max_x() <= area.max_x() + 1e-9
                && rect.max_y() <= area.max_y() + 1e-9;
            assert!(inside, "{} in {} escapes the heap area", node.address, name);
        }
    }
}

#[test]
fn test_seeded_layout_is_reproducible() {
    let a = run_demo("cycles.js");
    let b = run_demo("cycles.js");
    assert_eq!(a, b);
    assert_eq!(a.to_text(), b.to_text());
}

#[test]
fn test_executor_reports_bindings() {
    let output = JsExecutor::new()
        .execute("let a = [1]; var b = a; a.length")
        .unwrap();
    let names: Vec<&str> = output.bindings.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(output.completion_text(), Some("1".to_string()));
}

#[test]
fn test_dump_text_sections() {
    let text = run_demo("aliasing.js").to_text();
    assert!(text.starts_with("stack:\n  scores = 0x00001000\n"));
    assert!(text.contains("heap:\n"));
    assert!(text.contains("arrows:\n  scores -> 0x00001000"));
    assert!(text.ends_with("console:\n  count: 4\n"));
}

#[test]
fn test_tui_renders_headless() {
    let orchestrator = Orchestrator::new(
        JsExecutor::new(),
        MonospaceMeasurer::cells(),
        LayoutEngine::new(LayoutConfig::terminal(), Some(1)),
        size(1.0, 1.0),
    );
    let mut app = App::new(
        orchestrator,
        demo("aliasing.js"),
        Duration::from_millis(300),
    );

    let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    app.sync_viewport();
    terminal.draw(|f| app.render(f)).unwrap();

    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(text.contains("Source"));
    assert!(text.contains("Console"));
    assert!(text.contains("Memory"));
    assert!(text.contains("count: 4"));
    assert!(text.contains("scores"));
    assert_eq!(app.run_count, 2);
}
