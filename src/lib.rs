//! visaflow: immigration program flowcharts.
//!
//! Each program pairs a flowchart diagram with an ordered list of steps.
//! The crate keeps the two consistent and renders them:
//!
//! - [`parsers`] tokenizes and parses the diagram text;
//! - [`reconcile`] maps loosely named node ids onto canonical step ids and
//!   [`rewrite`]/[`repair`] apply those mappings to the text;
//! - [`steps`] builds template steps for nodes nothing maps onto;
//! - [`layout`] builds the graph and lays out the vertical timeline;
//! - [`renderers`] draws the timeline as text, generates SVG, drives the
//!   interactive rendering container and exports it.
//!
//! ```
//! use visaflow::repair::Repairer;
//!
//! let text = "flowchart TD\nStart([Start]) --> JobOffer[Secure Job Offer]\nJobOffer --> End([End])";
//! let out = Repairer::default().repair(text, &["job-offer"]);
//! assert!(out.text.contains("job-offer[Secure Job Offer]"));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod parsers;
pub mod reconcile;
pub mod renderers;
pub mod repair;
pub mod rewrite;
pub mod steps;
pub mod structured;
pub mod styles;
pub mod syntax;
pub mod validate;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{RenderConfig, RepairConfig, ReservedNames, TimelineConfig};
pub use error::{CatalogError, ExportError, LayoutError, RenderError};
pub use model::{Program, Step, StepRegistry, StructuredGraph};
pub use parsers::{ParsedDiagram, parse};
pub use reconcile::{IdentifierMapping, Reconciler, SynonymTable};
pub use repair::{RepairOutcome, Repairer};
pub use rewrite::rewrite;

/// Text timeline of a program's diagram.
pub fn render_program_timeline(
    program: &Program,
    config: &TimelineConfig,
) -> Result<String, LayoutError> {
    let graph = match &program.structured_graph {
        Some(g) => g.clone(),
        None => structured::to_structured(&parse(&program.diagram_text), program.registry()),
    };
    let timeline = layout::layout_graph(&graph, config)?;
    Ok(renderers::render_timeline(&timeline, config))
}
