//! Diagram geometry
//!
//! - [`measure`]: label measurement ([`TextMeasurer`]) for node sizing
//! - [`engine`]: spiral placement of heap nodes, the stack slot strip and
//!   clamped node moves
//! - [`connector`]: arrow endpoints on box boundaries
//!
//! All coordinates share one unit space; see [`geometry`].

pub mod connector;
pub mod engine;
pub mod geometry;
pub mod measure;

pub use connector::{route, Anchor, AnchorKind, Arrow};
pub use engine::{HeapLayout, LayoutConfig, LayoutEngine, StackStrip};
pub use geometry::{Point, Rect, Size};
pub use measure::{MeasureError, MonospaceMeasurer, TextMeasurer, TextStyle};
