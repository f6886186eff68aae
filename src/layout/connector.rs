//! Arrow geometry between boxes
//!
//! Arrows run between box centers, clipped to the boundary of heap node
//! boxes. Stack slot arrows leave from the bottom-center of the slot. Nothing
//! here is cached: every arrow is recomputed from the current rectangles.

use super::geometry::{Point, Rect};

/// What kind of box an arrow end is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    StackSlot,
    HeapNode,
}

/// An arrow end: a box in the shared coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub rect: Rect,
    pub kind: AnchorKind,
}

impl Anchor {
    pub fn slot(rect: Rect) -> Self {
        Anchor {
            rect,
            kind: AnchorKind::StackSlot,
        }
    }

    pub fn node(rect: Rect) -> Self {
        Anchor {
            rect,
            kind: AnchorKind::HeapNode,
        }
    }
}

/// A routed connector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub start: Point,
    pub end: Point,
    pub length: f64,
    /// Direction of the body, `atan2(dy, dx)` in degrees
    pub angle_degrees: f64,
}

impl Arrow {
    pub fn between(start: Point, end: Point) -> Self {
        let delta = end - start;
        Arrow {
            start,
            end,
            length: delta.length(),
            angle_degrees: delta.y.atan2(delta.x).to_degrees(),
        }
    }

    /// Rotation of the arrowhead glyph
    pub fn head_angle_degrees(&self) -> f64 {
        self.angle_degrees - 45.0
    }
}

/// Where the line from `from` toward `to` first crosses the edge of `bounds`.
///
/// Solves against the nearer vertical edge first and falls back to the
/// nearer horizontal edge when that point is outside the box's vertical
/// span. Coincident endpoints return `to`.
pub fn box_intersection(from: Point, to: Point, bounds: Rect) -> Point {
    let delta = to - from;
    let length = delta.length();
    if length == 0.0 || !length.is_finite() {
        return to;
    }
    let unit = delta / length;

    let mut hit = None;
    if unit.x != 0.0 {
        let edge = if unit.x > 0.0 {
            bounds.min_x()
        } else {
            bounds.max_x()
        };
        let t = (edge - from.x) / unit.x;
        let p = from + unit * t;
        if p.y >= bounds.min_y() && p.y <= bounds.max_y() {
            hit = Some(p);
        }
    }

    match hit {
        Some(p) => p,
        None if unit.y != 0.0 => {
            let edge = if unit.y > 0.0 {
                bounds.min_y()
            } else {
                bounds.max_y()
            };
            let t = (edge - from.y) / unit.y;
            from + unit * t
        }
        None => to,
    }
}

/// Route an arrow from `source` to `target`
pub fn route(source: &Anchor, target: &Anchor) -> Arrow {
    let source_center = source.rect.center();
    let target_center = target.rect.center();

    let end = match target.kind {
        AnchorKind::HeapNode => box_intersection(source_center, target_center, target.rect),
        AnchorKind::StackSlot => target_center,
    };
    let start = match source.kind {
        AnchorKind::HeapNode => box_intersection(target_center, source_center, source.rect),
        AnchorKind::StackSlot => Point::new(source_center.x, source.rect.max_y()),
    };

    Arrow::between(start, end)
}
