//! Spiral placement of heap nodes and the stack slot strip

use super::geometry::{point, rect, size, Point, Rect, Size};
use super::measure::TextStyle;
use crate::memory::Address;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, trace};

/// Layout constants
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Smallest node box
    pub min_node: Size,
    /// Added to the measured label size
    pub padding: Size,
    /// Lower bound for spiral spacing
    pub min_spacing: f64,
    /// Total radial jitter as a fraction of spacing, centered on zero
    pub jitter: f64,
    /// Container height factor over the spiral radius
    pub growth: f64,
    /// Vertical squash of the spiral, for non-square units
    pub vertical_scale: f64,
    /// Gap between stack slots and below the stack strip
    pub gap: f64,
    /// Style labels are measured with
    pub style: TextStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            min_node: size(120.0, 60.0),
            padding: size(40.0, 40.0),
            min_spacing: 40.0,
            jitter: 0.3,
            growth: 2.5,
            vertical_scale: 1.0,
            gap: 16.0,
            style: TextStyle::monospace(),
        }
    }
}

impl LayoutConfig {
    /// Preset in terminal cells, which are about twice as tall as wide
    pub fn terminal() -> Self {
        LayoutConfig {
            min_node: size(12.0, 3.0),
            padding: size(4.0, 2.0),
            min_spacing: 4.0,
            jitter: 0.3,
            growth: 2.5,
            vertical_scale: 0.5,
            gap: 1.0,
            style: TextStyle::terminal(),
        }
    }
}

/// Positions of one run's heap nodes inside the heap container
#[derive(Debug, Clone, Default)]
pub struct HeapLayout {
    extent: Size,
    nodes: IndexMap<Address, Rect>,
}

impl HeapLayout {
    /// Container size after growth
    pub fn extent(&self) -> Size {
        self.extent
    }

    pub fn rect(&self, address: Address) -> Option<Rect> {
        self.nodes.get(&address).copied()
    }

    /// Nodes in allocation order
    pub fn nodes(&self) -> impl Iterator<Item = (Address, Rect)> + '_ {
        self.nodes.iter().map(|(addr, r)| (*addr, *r))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move a node's top-left corner, clamped so the whole box stays inside
    /// the container. Non-finite coordinates are treated as 0.
    pub fn move_node(&mut self, address: Address, x: f64, y: f64) -> Option<Rect> {
        let extent = self.extent;
        let node = self.nodes.get_mut(&address)?;
        node.origin = clamp_origin(point(x, y), node.size, extent);
        trace!(%address, x = node.origin.x, y = node.origin.y, "moved node");
        Some(*node)
    }
}

fn clamp_origin(origin: Point, node: Size, extent: Size) -> Point {
    let clamp = |v: f64, span: f64| {
        let v = if v.is_finite() { v } else { 0.0 };
        v.min(span).max(0.0)
    };
    point(
        clamp(origin.x, extent.width - node.width),
        clamp(origin.y, extent.height - node.height),
    )
}

/// Stack slot boxes flowing left to right
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackStrip {
    pub rects: Vec<Rect>,
    /// Total height; 0 with no slots
    pub height: f64,
}

/// Sizes and places diagram boxes
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    rng: StdRng,
}

impl LayoutEngine {
    /// A `seed` makes the jitter reproducible; otherwise it is seeded from entropy
    pub fn new(config: LayoutConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        LayoutEngine { config, rng }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Box size for a measured label
    pub fn node_size(&self, measured: Size) -> Size {
        size(
            self.config.min_node.width.max(measured.width + self.config.padding.width),
            self.config.min_node.height.max(measured.height + self.config.padding.height),
        )
    }

    /// Box size when measuring failed
    pub fn fallback_size(&self) -> Size {
        self.config.min_node
    }

    /// Spiral placement around the container center.
    ///
    /// Node `i` sits at angle `i * 90deg`, radius `sqrt(i) * spacing` plus
    /// jitter. The container grows to hold the spiral and every node, and
    /// each node starts fully inside it.
    pub fn place(&mut self, nodes: &[(Address, Size)], natural: Size) -> HeapLayout {
        if nodes.is_empty() {
            return HeapLayout {
                extent: natural,
                nodes: IndexMap::new(),
            };
        }

        let mut extent = natural;
        let spiral_height =
            (nodes.len() as f64).sqrt() * self.config.min_spacing * self.config.growth;
        extent.height = extent.height.max(spiral_height);
        for (_, node) in nodes {
            extent.width = extent.width.max(node.width);
            extent.height = extent.height.max(node.height);
        }
        let center = point(extent.width / 2.0, extent.height / 2.0);

        let mut placed = IndexMap::with_capacity(nodes.len());
        for (index, (address, node)) in nodes.iter().enumerate() {
            let spacing = node.width.max(node.height).max(self.config.min_spacing);
            let angle = index as f64 * FRAC_PI_2;
            let radius = (index as f64).sqrt() * spacing;
            let jitter = (self.rng.gen::<f64>() - 0.5) * spacing * self.config.jitter;
            let r = radius + jitter;

            let x = center.x + angle.cos() * r - node.width / 2.0;
            let y = center.y + angle.sin() * r * self.config.vertical_scale - node.height / 2.0;
            let origin = clamp_origin(point(x, y), *node, extent);
            placed.insert(*address, Rect::new(origin, *node));
        }

        debug!(
            nodes = placed.len(),
            width = extent.width,
            height = extent.height,
            "placed heap nodes"
        );
        HeapLayout {
            extent,
            nodes: placed,
        }
    }

    /// Lay slots out in rows, wrapping at `width`
    pub fn stack_strip(&self, slots: &[Size], width: f64) -> StackStrip {
        let gap = self.config.gap;
        let mut rects = Vec::with_capacity(slots.len());
        let (mut x, mut y, mut row_height) = (0.0_f64, 0.0_f64, 0.0_f64);

        for slot in slots {
            if x > 0.0 && x + slot.width > width {
                x = 0.0;
                y += row_height + gap;
                row_height = 0.0;
            }
            rects.push(rect(x, y, slot.width, slot.height));
            x += slot.width + gap;
            row_height = row_height.max(slot.height);
        }

        StackStrip {
            rects,
            height: y + row_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(n: u64) -> Vec<(Address, Size)> {
        (0..n)
            .map(|i| (Address::new(0x1000 + i), size(120.0, 60.0)))
            .collect()
    }

    fn inside(r: Rect, extent: Size) -> bool {
        r.min_x() >= 0.0
            && r.min_y() >= 0.0
            && r.max_x() <= extent.width + 1e-9
            && r.max_y() <= extent.height + 1e-9
    }

    #[test]
    fn test_node_size() {
        let engine = LayoutEngine::new(LayoutConfig::default(), Some(1));
        assert_eq!(engine.node_size(size(10.0, 10.0)), size(120.0, 60.0));
        assert_eq!(engine.node_size(size(200.0, 50.0)), size(240.0, 90.0));
    }

    #[test]
    fn test_empty_layout_keeps_natural_extent() {
        let mut engine = LayoutEngine::new(LayoutConfig::default(), Some(1));
        let layout = engine.place(&[], size(800.0, 400.0));
        assert!(layout.is_empty());
        assert_eq!(layout.extent(), size(800.0, 400.0));
    }

    #[test]
    fn test_first_node_is_centered() {
        let config = LayoutConfig {
            jitter: 0.0,
            ..LayoutConfig::default()
        };
        let mut engine = LayoutEngine::new(config, None);
        let layout = engine.place(&addrs(1), size(800.0, 400.0));
        let r = layout.rect(Address::new(0x1000)).unwrap();
        assert_eq!(r.center(), point(400.0, 200.0));
    }

    #[test]
    fn test_spiral_turns_a_quarter_per_node() {
        let config = LayoutConfig {
            jitter: 0.0,
            ..LayoutConfig::default()
        };
        let mut engine = LayoutEngine::new(config, None);
        let layout = engine.place(&addrs(3), size(1000.0, 1000.0));
        let centers: Vec<Point> = layout.nodes().map(|(_, r)| r.center()).collect();
        // Node 1 is below the center, node 2 left of it
        assert!((centers[1].x - 500.0).abs() < 1e-9);
        assert!((centers[1].y - (500.0 + 120.0)).abs() < 1e-9);
        assert!((centers[2].x - (500.0 - 2f64.sqrt() * 120.0)).abs() < 1e-9);
        assert!((centers[2].y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_layouts_repeat() {
        let place = || {
            LayoutEngine::new(LayoutConfig::default(), Some(7))
                .place(&addrs(6), size(600.0, 300.0))
        };
        let (a, b) = (place(), place());
        let a: Vec<_> = a.nodes().collect();
        let b: Vec<_> = b.nodes().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_container_grows_to_fit() {
        let mut engine = LayoutEngine::new(LayoutConfig::default(), Some(3));
        let mut nodes = addrs(16);
        nodes.push((Address::new(0x2000), size(900.0, 80.0)));
        let layout = engine.place(&nodes, size(400.0, 100.0));

        let extent = layout.extent();
        assert!(extent.width >= 900.0);
        assert!(extent.height >= 17f64.sqrt() * 40.0 * 2.5);
        assert!(layout.nodes().all(|(_, r)| inside(r, extent)));
    }

    #[test]
    fn test_move_node_stays_inside() {
        let mut engine = LayoutEngine::new(LayoutConfig::default(), Some(5));
        let mut layout = engine.place(&addrs(4), size(500.0, 300.0));
        let extent = layout.extent();
        let addr = Address::new(0x1002);

        let requests = [
            (-50.0, -50.0),
            (1e9, 1e9),
            (f64::NAN, 10.0),
            (f64::INFINITY, f64::NEG_INFINITY),
            (100.0, 100.0),
        ];
        for (x, y) in requests {
            let r = layout.move_node(addr, x, y).unwrap();
            assert!(inside(r, extent), "{:?} escaped for ({}, {})", r, x, y);
        }

        let r = layout.move_node(addr, 100.0, 100.0).unwrap();
        assert_eq!(r.origin, point(100.0, 100.0));
        let r = layout.move_node(addr, f64::NAN, 5.0).unwrap();
        assert_eq!(r.origin, point(0.0, 5.0));
        assert!(layout.move_node(Address::new(0x9999), 0.0, 0.0).is_none());
    }

    #[test]
    fn test_stack_strip_wraps() {
        let engine = LayoutEngine::new(LayoutConfig::terminal(), Some(1));
        let slots = [size(10.0, 4.0), size(10.0, 4.0), size(10.0, 5.0)];
        let strip = engine.stack_strip(&slots, 25.0);
        assert_eq!(strip.rects[0], rect(0.0, 0.0, 10.0, 4.0));
        assert_eq!(strip.rects[1], rect(11.0, 0.0, 10.0, 4.0));
        assert_eq!(strip.rects[2], rect(0.0, 5.0, 10.0, 5.0));
        assert_eq!(strip.height, 10.0);

        assert_eq!(engine.stack_strip(&[], 25.0), StackStrip::default());
    }
}
