//! What one run hands to the presentation layer

use crate::layout::{Arrow, Point, Rect, Size};
use crate::memory::Address;
use std::fmt;

/// A stack slot box
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub name: String,
    /// Address or scalar encoding shown under the name
    pub encoded: String,
    pub address: Option<Address>,
    pub rect: Rect,
}

/// A heap node box
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub address: Address,
    pub label: String,
    pub rect: Rect,
}

/// Where an arrow leaves from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Slot(usize),
    Node(Address),
}

/// An arrow with what it connects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: Endpoint,
    pub to: Address,
    pub arrow: Arrow,
}

/// A line for the console pane, shown verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// One `console.log` call
    Log(String),
    /// The completion value
    Result(String),
    Error(String),
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::Error(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Log(text) => write!(f, "{}", text),
            Diagnostic::Result(text) => write!(f, "=> {}", text),
            Diagnostic::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// The full diagram in one coordinate space: the stack strip on top, the heap
/// container below it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    pub slots: Vec<SlotView>,
    pub nodes: Vec<NodeView>,
    /// Stack-to-heap arrows first, then heap-to-heap
    pub connectors: Vec<Connector>,
    pub diagnostics: Vec<Diagnostic>,
    /// Source line of the failure, when the run failed
    pub error_line: Option<usize>,
    /// Heap container bounds
    pub heap_area: Rect,
    pub extent: Size,
}

impl Diagram {
    /// Topmost node under a point
    pub fn node_at(&self, p: Point) -> Option<&NodeView> {
        self.nodes.iter().rev().find(|node| node.rect.contains(p))
    }

    pub fn node(&self, address: Address) -> Option<&NodeView> {
        self.nodes.iter().find(|node| node.address == address)
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Plain-text dump of the diagram
    pub fn to_text(&self) -> String {
        let mut out = String::from("stack:\n");
        for slot in &self.slots {
            out.push_str(&format!("  {} = {}\n", slot.name, slot.encoded));
        }
        out.push_str("heap:\n");
        for node in &self.nodes {
            out.push_str(&format!(
                "  {} {} at ({:.1}, {:.1}) size {:.0}x{:.0}\n",
                node.address,
                node.label,
                node.rect.origin.x,
                node.rect.origin.y,
                node.rect.size.width,
                node.rect.size.height
            ));
        }
        out.push_str("arrows:\n");
        for connector in &self.connectors {
            let from = match connector.from {
                Endpoint::Slot(index) => self
                    .slots
                    .get(index)
                    .map_or_else(|| format!("slot {}", index), |s| s.name.clone()),
                Endpoint::Node(address) => address.to_string(),
            };
            out.push_str(&format!(
                "  {} -> {} length {:.1} angle {:.1}\n",
                from, connector.to, connector.arrow.length, connector.arrow.angle_degrees
            ));
        }
        out.push_str("console:\n");
        for line in &self.diagnostics {
            for part in line.to_string().lines() {
                out.push_str(&format!("  {}\n", part));
            }
        }
        out
    }
}
