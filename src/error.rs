//! Error types for the library surfaces that can fail.
//!
//! The parser, reconciler and rewriter never fail; everything that touches
//! files, layout preconditions or the rendering surface does.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or write a flowchart data file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid program data in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("program '{program}' not found in '{path}'")]
    UnknownProgram { path: PathBuf, program: String },
}

/// A structural precondition of the timeline layout does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("graph has no start node")]
    NoStartNode,
    #[error("graph has {} start nodes: {}", .0.len(), .0.join(", "))]
    MultipleStartNodes(Vec<String>),
    #[error("start node '{0}' is not part of the graph")]
    UnknownStart(String),
}

/// Failure inside the interactive rendering cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("diagram generation failed: {0}")]
    Generation(String),
    #[error("generated markup is not valid SVG: {0}")]
    InvalidMarkup(String),
    #[error("container has no rendered diagram")]
    SurfaceMissing,
}

/// Failure to export the rendered diagram.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("container has no rendered diagram to export")]
    NothingRendered,
    #[error("{0} export is not available in this build")]
    FormatUnavailable(&'static str),
    #[error("rasterization failed: {0}")]
    Raster(String),
}
