//! Graph construction and layout.

pub mod graph;
pub mod layered;
pub mod timeline;

pub use graph::{GraphDiagnostics, GraphIR, GraphIndex};
pub use layered::{LayeredLayout, layered};
pub use timeline::{Timeline, TimelineItem, layout, layout_graph};
