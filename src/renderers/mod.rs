//! Output surfaces: the text timeline, SVG generation and the interactive
//! rendering container with its export hook.

pub mod canvas;
pub mod charset;
pub mod export;
pub mod interactive;
pub mod surface;
pub mod svg;
pub mod timeline;

pub use export::{Blob, ExportFormat, export};
pub use interactive::{
    DiagramGenerator, InteractiveRenderer, Selection, apply_selection, attach_interactivity, render,
};
pub use surface::{Container, NodeEvent, SelectHandler, VisualNode, dispatch};
pub use svg::SvgGenerator;
pub use timeline::render_timeline;
