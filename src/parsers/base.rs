//! Parser trait and the parsed diagram it produces.

use crate::syntax::types::{Direction, Edge, Node};

// ─── Parser trait ────────────────────────────────────────────────────────────

/// Diagram text parser. Never fails: text that does not match the grammar
/// simply contributes nothing.
pub trait Parser {
    fn parse(&self, src: &str) -> ParsedDiagram;
}

// ─── ParsedDiagram ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDiagram {
    /// Direction from the `flowchart`/`graph` header, if the text has one.
    pub header: Option<Direction>,
    /// Every node mentioned, in first-mention order.
    pub nodes: Vec<Node>,
    /// Step-bearing node ids: defined ids minus reserved terminals, deduplicated.
    pub node_ids: Vec<String>,
    /// Every id with a definition site (`id[..]`, `id(..)`, `id{..}`), reserved included.
    pub defined: Vec<String>,
    pub edges: Vec<Edge>,
}

impl ParsedDiagram {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.defined.iter().any(|d| d == id)
    }

    /// Step-bearing ids whose shape is a decision brace.
    pub fn decision_ids(&self) -> Vec<&str> {
        self.node_ids
            .iter()
            .filter(|id| self.node(id).is_some_and(|n| n.shape.is_decision()))
            .map(String::as_str)
            .collect()
    }
}
