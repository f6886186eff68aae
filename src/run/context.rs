//! Per-run state
//!
//! A [`RunContext`] is built from scratch for every run and replaced wholesale
//! by the next one. Node moves mutate its heap layout in place.

use crate::layout::geometry::{point, rect};
use crate::layout::{route, Anchor, HeapLayout, Point, Rect, Size};
use crate::memory::{Address, HeapGraph, Identity, Object, ObjectArena, StackModel, Value};
use crate::run::diagram::{Connector, Diagnostic, Diagram, Endpoint, NodeView, SlotView};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub(crate) arena: ObjectArena,
    pub(crate) graph: HeapGraph,
    pub(crate) stack: StackModel,
    /// Heap node labels in allocation order
    pub(crate) labels: IndexMap<Address, String>,
    pub(crate) slot_rects: Vec<Rect>,
    /// Top-left of the heap container in diagram space
    pub(crate) heap_origin: Point,
    pub(crate) layout: HeapLayout,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) error_line: Option<usize>,
    /// Width the stack strip was wrapped at
    pub(crate) width: f64,
}

impl RunContext {
    /// A context holding only an error line
    pub fn failed(message: &str, error_line: Option<usize>) -> Self {
        RunContext {
            diagnostics: vec![Diagnostic::Error(message.to_string())],
            error_line,
            ..RunContext::default()
        }
    }

    pub fn stack(&self) -> &StackModel {
        &self.stack
    }

    pub fn graph(&self) -> &HeapGraph {
        &self.graph
    }

    pub fn layout(&self) -> &HeapLayout {
        &self.layout
    }

    /// Heap node rectangle in diagram space
    pub fn node_rect(&self, address: Address) -> Option<Rect> {
        self.layout
            .rect(address)
            .map(|r| r.translate(self.heap_origin.to_vector()))
    }

    /// Every edge as an arrow from current rectangles: slots first, in
    /// referenced-by order, then heap edges by source allocation order
    pub fn connectors(&self) -> Vec<Connector> {
        let mut connectors = Vec::new();

        for (address, referrers) in self.stack.referenced_by() {
            let Some(target) = self.node_rect(*address) else {
                continue;
            };
            for &index in referrers {
                let Some(slot) = self.slot_rects.get(index) else {
                    continue;
                };
                connectors.push(Connector {
                    from: Endpoint::Slot(index),
                    to: *address,
                    arrow: route(&Anchor::slot(*slot), &Anchor::node(target)),
                });
            }
        }

        for (source, target) in self.graph.edges() {
            let (Some(from), Some(to)) = (self.node_rect(source), self.node_rect(target)) else {
                continue;
            };
            connectors.push(Connector {
                from: Endpoint::Node(source),
                to: target,
                arrow: route(&Anchor::node(from), &Anchor::node(to)),
            });
        }

        connectors
    }

    /// Diagram for the presentation layer
    pub fn diagram(&self) -> Diagram {
        let slots = self
            .stack
            .slots()
            .iter()
            .zip(&self.slot_rects)
            .map(|(slot, rect)| SlotView {
                name: slot.name.clone(),
                encoded: slot.encoded.to_string(),
                address: slot.address(),
                rect: *rect,
            })
            .collect();

        let nodes = self
            .labels
            .iter()
            .filter_map(|(address, label)| {
                Some(NodeView {
                    address: *address,
                    label: label.clone(),
                    rect: self.node_rect(*address)?,
                })
            })
            .collect();

        let extent = self.layout.extent();
        let heap_area = rect(
            self.heap_origin.x,
            self.heap_origin.y,
            extent.width,
            extent.height,
        );
        let strip_width = self
            .slot_rects
            .iter()
            .map(|r| r.max_x())
            .fold(0.0, f64::max);

        Diagram {
            slots,
            nodes,
            connectors: self.connectors(),
            diagnostics: self.diagnostics.clone(),
            error_line: self.error_line,
            heap_area,
            extent: Size::new(
                self.width.max(strip_width).max(heap_area.max_x()),
                heap_area.max_y(),
            ),
        }
    }
}

/// The value a registered identity stands for
pub(crate) fn identity_value(arena: &ObjectArena, identity: &Identity) -> Option<Value> {
    match identity {
        Identity::Text(text) => Some(Value::Text(text.clone())),
        Identity::Object(id) => match arena.get(*id)? {
            Object::Array(_) => Some(Value::Array(*id)),
            Object::Record(_) => Some(Value::Record(*id)),
        },
    }
}

/// Origin of the heap container below a stack strip
pub(crate) fn heap_origin(strip_height: f64, gap: f64) -> Point {
    if strip_height > 0.0 {
        point(0.0, strip_height + gap)
    } else {
        point(0.0, 0.0)
    }
}
