//! Sequences one run: execute, build the graph, format, measure, lay out

use crate::interpreter::Executor;
use crate::layout::geometry::size;
use crate::layout::{LayoutEngine, Rect, Size, TextMeasurer};
use crate::memory::{Address, HeapGraph, StackModel, ValueFormatter};
use crate::run::context::{heap_origin, identity_value, RunContext};
use crate::run::diagram::{Diagnostic, Diagram};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Owns the collaborators and the current [`RunContext`]
pub struct Orchestrator<E: Executor, M: TextMeasurer> {
    executor: E,
    measurer: M,
    engine: LayoutEngine,
    viewport: Size,
    context: RunContext,
}

impl<E: Executor, M: TextMeasurer> Orchestrator<E, M> {
    pub fn new(executor: E, measurer: M, engine: LayoutEngine, viewport: Size) -> Self {
        Orchestrator {
            executor,
            measurer,
            engine,
            viewport,
            context: RunContext::default(),
        }
    }

    /// Discard the previous run and build a fresh diagram from `source`
    pub fn run(&mut self, source: &str) -> Diagram {
        self.context = RunContext::default();

        let output = match self.executor.execute(source) {
            Ok(output) => output,
            Err(failure) => {
                warn!(kind = %failure.kind, error = %failure, "run failed");
                let line = failure.location.map(|l| l.line);
                self.context = RunContext::failed(&failure.message, line);
                return self.context.diagram();
            }
        };

        let mut graph = HeapGraph::new();
        for (_, value) in &output.bindings {
            graph.build(&output.arena, value);
        }
        let stack = StackModel::build(&output.bindings, graph.registry_mut());
        debug!(
            slots = stack.len(),
            identities = graph.registry().len(),
            edges = graph.edge_count(),
            "built heap graph"
        );

        let formatter = ValueFormatter::new(&output.arena, graph.registry());
        let labels: IndexMap<Address, String> = graph
            .registry()
            .entries()
            .iter()
            .filter_map(|(identity, address)| {
                let value = identity_value(&output.arena, identity)?;
                Some((*address, formatter.format(&value)))
            })
            .collect();

        let slot_sizes: Vec<Size> = stack
            .slots()
            .iter()
            .map(|slot| self.box_size(&format!("{}\n{}", slot.name, slot.encoded)))
            .collect();
        let strip = self.engine.stack_strip(&slot_sizes, self.viewport.width);
        let origin = heap_origin(strip.height, self.engine.config().gap);

        let nodes: Vec<(Address, Size)> = labels
            .iter()
            .map(|(address, label)| (*address, self.box_size(label)))
            .collect();
        let natural = size(
            self.viewport.width,
            (self.viewport.height - origin.y).max(0.0),
        );
        let layout = self.engine.place(&nodes, natural);

        let mut diagnostics: Vec<Diagnostic> = output
            .console
            .iter()
            .cloned()
            .map(Diagnostic::Log)
            .collect();
        if let Some(text) = output.completion_text() {
            diagnostics.push(Diagnostic::Result(text));
        }

        self.context = RunContext {
            arena: output.arena,
            graph,
            stack,
            labels,
            slot_rects: strip.rects,
            heap_origin: origin,
            layout,
            diagnostics,
            error_line: None,
            width: self.viewport.width,
        };

        let diagram = self.context.diagram();
        info!(
            slots = diagram.slots.len(),
            nodes = diagram.nodes.len(),
            arrows = diagram.connectors.len(),
            "run complete"
        );
        diagram
    }

    /// Measured box size, falling back to the minimum when measuring fails
    fn box_size(&self, text: &str) -> Size {
        match self.measurer.measure(text, &self.engine.config().style) {
            Ok(measured) => self.engine.node_size(measured),
            Err(e) => {
                warn!(error = %e, "measurement failed, using minimum node size");
                self.engine.fallback_size()
            }
        }
    }

    /// Move a heap node to `(x, y)` in heap container coordinates. Returns the
    /// clamped rectangle in diagram coordinates.
    pub fn move_node(&mut self, address: Address, x: f64, y: f64) -> Option<Rect> {
        self.context.layout.move_node(address, x, y)?;
        self.context.node_rect(address)
    }

    /// Takes effect on the next run
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The current diagram with arrows recomputed from current positions
    pub fn diagram(&self) -> Diagram {
        self.context.diagram()
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{ExecutionFailure, ExecutionOutput, JsExecutor};
    use crate::layout::{LayoutConfig, MeasureError, MonospaceMeasurer, TextStyle};
    use crate::memory::{ObjectArena, Symbol, Value};
    use crate::run::diagram::Endpoint;

    fn orchestrator() -> Orchestrator<JsExecutor, MonospaceMeasurer> {
        Orchestrator::new(
            JsExecutor::new(),
            MonospaceMeasurer::cells(),
            LayoutEngine::new(LayoutConfig::terminal(), Some(42)),
            size(80.0, 40.0),
        )
    }

    #[test]
    fn test_aliases_share_one_node() {
        let mut orch = orchestrator();
        let diagram = orch.run("let a = [1, 2]; let b = a; let c = [1, 2];");
        assert_eq!(diagram.slots.len(), 3);
        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.slots[0].encoded, "0x00001000");
        assert_eq!(diagram.slots[1].encoded, "0x00001000");
        assert_eq!(diagram.slots[2].encoded, "0x00001001");
        assert_eq!(diagram.nodes[0].label, "[1, 2]");

        let froms: Vec<Endpoint> = diagram.connectors.iter().map(|c| c.from).collect();
        assert_eq!(
            froms,
            vec![Endpoint::Slot(0), Endpoint::Slot(1), Endpoint::Slot(2)]
        );
    }

    #[test]
    fn test_stack_arrows_come_before_heap_arrows() {
        let mut orch = orchestrator();
        let diagram = orch.run("let o = {name: 'x', list: [1]};");
        assert_eq!(diagram.nodes.len(), 3);
        assert_eq!(
            diagram.nodes[0].label,
            "{name: 0x00001001, list: 0x00001002}"
        );
        assert_eq!(diagram.nodes[1].label, "\"x\"");

        let edges: Vec<(Endpoint, Address)> =
            diagram.connectors.iter().map(|c| (c.from, c.to)).collect();
        assert_eq!(
            edges,
            vec![
                (Endpoint::Slot(0), Address::new(0x1000)),
                (Endpoint::Node(Address::new(0x1000)), Address::new(0x1001)),
                (Endpoint::Node(Address::new(0x1000)), Address::new(0x1002)),
            ]
        );
    }

    #[test]
    fn test_heap_sits_below_stack_strip() {
        let mut orch = orchestrator();
        let diagram = orch.run("let a = [[], {}];");
        let strip_bottom = diagram
            .slots
            .iter()
            .map(|s| s.rect.max_y())
            .fold(0.0, f64::max);
        assert!(diagram.heap_area.min_y() > strip_bottom);
        for node in &diagram.nodes {
            assert!(diagram.heap_area.contains_rect(&node.rect));
        }
    }

    #[test]
    fn test_failure_clears_everything() {
        let mut orch = orchestrator();
        orch.run("let a = [1];");
        let diagram = orch.run("console.log('lost'); let b = missing;");
        assert!(diagram.slots.is_empty());
        assert!(diagram.nodes.is_empty());
        assert!(diagram.connectors.is_empty());
        assert_eq!(
            diagram.diagnostics,
            vec![Diagnostic::Error("missing is not defined".into())]
        );
        assert_eq!(diagram.error_line, Some(1));
    }

    #[test]
    fn test_console_and_completion_lines() {
        let mut orch = orchestrator();
        let diagram = orch.run("let a = [1]; console.log('len', a.length); a.length * 2");
        assert_eq!(
            diagram.diagnostics,
            vec![
                Diagnostic::Log("len 1".into()),
                Diagnostic::Result("2".into())
            ]
        );
    }

    #[test]
    fn test_move_node_recomputes_arrows() {
        let mut orch = orchestrator();
        let before = orch.run("let a = {};");
        let address = before.nodes[0].address;

        let moved = orch.move_node(address, 0.0, 0.0).unwrap();
        assert_eq!(moved.origin, before.heap_area.origin);

        let after = orch.diagram();
        assert_eq!(after.connectors[0].arrow.end.y, moved.min_y());
        assert!(orch.move_node(Address::new(0xDEAD), 0.0, 0.0).is_none());
    }

    #[test]
    fn test_reruns_keep_structure() {
        let mut orch = orchestrator();
        let source = "let a = [1]; a.push(a); let s = 'hi'; let t = 'hi';";
        let first = orch.run(source);
        let second = orch.run(source);

        let shape = |d: &Diagram| {
            let nodes: Vec<(Address, String)> = d
                .nodes
                .iter()
                .map(|n| (n.address, n.label.clone()))
                .collect();
            let edges: Vec<(Endpoint, Address)> =
                d.connectors.iter().map(|c| (c.from, c.to)).collect();
            (nodes, edges)
        };
        assert_eq!(shape(&first), shape(&second));
        // The array points at itself; both strings share one node
        assert_eq!(first.nodes.len(), 2);
        assert_eq!(first.slots[1].encoded, first.slots[2].encoded);
    }

    struct BrokenMeasurer;

    impl TextMeasurer for BrokenMeasurer {
        fn measure(&self, _text: &str, style: &TextStyle) -> Result<Size, MeasureError> {
            Err(MeasureError::InvalidFontSize(style.font_size))
        }
    }

    #[test]
    fn test_measurement_failure_uses_minimum_size() {
        let config = LayoutConfig::terminal();
        let min = config.min_node;
        let mut orch = Orchestrator::new(
            JsExecutor::new(),
            BrokenMeasurer,
            LayoutEngine::new(config, Some(1)),
            size(80.0, 40.0),
        );
        let diagram = orch.run("let a = [1, 2, 3];");
        assert_eq!(diagram.nodes[0].rect.size, min);
        assert_eq!(diagram.slots[0].rect.size, min);
    }

    struct FixedExecutor(Vec<(String, Value)>);

    impl Executor for FixedExecutor {
        fn execute(&mut self, _source: &str) -> Result<ExecutionOutput, ExecutionFailure> {
            Ok(ExecutionOutput {
                bindings: self.0.clone(),
                arena: ObjectArena::new(),
                console: Vec::new(),
                completion: Value::Undefined,
            })
        }
    }

    #[test]
    fn test_scalar_slots_have_no_arrows() {
        let bindings = vec![
            ("n".to_string(), Value::Int(5)),
            ("f".to_string(), Value::Float(0.5)),
            ("u".to_string(), Value::Undefined),
            ("sym".to_string(), Value::Symbol(Symbol::new(0, "k"))),
        ];
        let mut orch = Orchestrator::new(
            FixedExecutor(bindings),
            MonospaceMeasurer::cells(),
            LayoutEngine::new(LayoutConfig::terminal(), Some(1)),
            size(80.0, 40.0),
        );
        let diagram = orch.run("");
        let encoded: Vec<&str> = diagram.slots.iter().map(|s| s.encoded.as_str()).collect();
        assert_eq!(
            encoded,
            vec![
                "0x00000005",
                "0x3FE0000000000000",
                "0xUNDEFINED",
                "0xUNKNOWN",
            ]
        );
        assert!(diagram.nodes.is_empty());
        assert!(diagram.connectors.is_empty());
    }
}
