//! Diagram text parsing.

pub mod base;
pub mod flowchart;
pub mod lexer;

pub use base::{ParsedDiagram, Parser};
pub use flowchart::FlowchartParser;

/// Parse diagram text with the default reserved terminal names.
pub fn parse(src: &str) -> ParsedDiagram {
    FlowchartParser::default().parse(src)
}
