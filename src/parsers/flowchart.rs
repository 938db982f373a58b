//! Flowchart statement parser over the token stream.
//!
//! Statements are separated by newlines (or `;`). A statement is a node
//! reference optionally followed by `connector [|label|] node` segments.
//! Lines led by a keyword (`style`, `classDef`, ...) are skipped.

use std::collections::HashSet;

use super::base::{ParsedDiagram, Parser};
use super::lexer::{Token, TokenKind, tokenize};
use crate::config::ReservedNames;
use crate::syntax::types::{Direction, Edge, Node};

/// Leading words that start a non-graph statement.
pub const KEYWORDS: &[&str] = &[
    "flowchart",
    "graph",
    "style",
    "classDef",
    "class",
    "click",
    "linkStyle",
    "subgraph",
    "end",
    "direction",
];

// ─── FlowchartParser ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FlowchartParser {
    pub reserved: ReservedNames,
}

impl FlowchartParser {
    pub fn new(reserved: ReservedNames) -> Self {
        Self { reserved }
    }
}

impl Parser for FlowchartParser {
    fn parse(&self, src: &str) -> ParsedDiagram {
        let tokens = tokenize(src);
        let mut builder = DiagramBuilder::default();
        for statement in statements(src, &tokens) {
            builder.statement(src, &statement);
        }
        builder.finish(&self.reserved)
    }
}

// ─── Statement splitting ─────────────────────────────────────────────────────

/// Split tokens into statements of significant (non-trivia) tokens.
pub(crate) fn statements<'t>(src: &str, tokens: &'t [Token]) -> Vec<Vec<&'t Token>> {
    let mut out: Vec<Vec<&Token>> = Vec::new();
    let mut current: Vec<&Token> = Vec::new();
    for tok in tokens {
        let separator = match tok.kind {
            TokenKind::Whitespace | TokenKind::Comment => continue,
            TokenKind::Newline => true,
            TokenKind::Other => tok.text(src) == ";",
            _ => false,
        };
        if separator {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(tok);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

// ─── Builder ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct DiagramBuilder {
    header: Option<Direction>,
    nodes: Vec<Node>,
    defined: Vec<String>,
    defined_set: HashSet<String>,
    edges: Vec<Edge>,
}

impl DiagramBuilder {
    fn statement(&mut self, src: &str, toks: &[&Token]) {
        let Some(first) = toks.first() else {
            return;
        };
        if first.kind == TokenKind::Ident {
            let word = first.text(src);
            if KEYWORDS.contains(&word) {
                if (word == "flowchart" || word == "graph") && self.header.is_none() {
                    let dir = toks
                        .get(1)
                        .filter(|t| t.kind == TokenKind::Ident)
                        .and_then(|t| Direction::from_keyword(t.text(src)))
                        .unwrap_or_default();
                    self.header = Some(dir);
                }
                return;
            }
        }

        let Some((mut prev, mut i)) = self.node_ref(src, toks, 0) else {
            return;
        };
        while let Some(Token {
            kind: TokenKind::Connector(etype),
            ..
        }) = toks.get(i)
        {
            let mut j = i + 1;
            let mut label = None;
            if let Some(Token {
                kind: TokenKind::EdgeLabel(text),
                ..
            }) = toks.get(j)
            {
                label = Some(text.clone());
                j += 1;
            }
            let Some((target, next)) = self.node_ref(src, toks, j) else {
                break;
            };
            let mut edge = Edge::new(prev.clone(), target.clone(), *etype);
            edge.label = label;
            self.edges.push(edge);
            prev = target;
            i = next;
        }
    }

    /// Identifier plus an immediately adjacent shape. Returns the id and the
    /// index of the next unconsumed token.
    fn node_ref(&mut self, src: &str, toks: &[&Token], i: usize) -> Option<(String, usize)> {
        let tok = toks.get(i)?;
        if tok.kind != TokenKind::Ident {
            return None;
        }
        let id = tok.text(src).to_string();
        match toks.get(i + 1) {
            Some(Token {
                kind: TokenKind::Shape { shape, label },
                span,
            }) if span.start == tok.span.end => {
                self.define(Node::new(id.clone(), label.clone(), *shape));
                Some((id, i + 2))
            }
            _ => {
                self.reference(&id);
                Some((id, i + 1))
            }
        }
    }

    /// First definition wins; a definition upgrades an earlier bare reference.
    fn define(&mut self, node: Node) {
        if self.defined_set.insert(node.id.clone()) {
            self.defined.push(node.id.clone());
            match self.nodes.iter_mut().find(|n| n.id == node.id) {
                Some(existing) => *existing = node,
                None => self.nodes.push(node),
            }
        }
    }

    fn reference(&mut self, id: &str) {
        if !self.nodes.iter().any(|n| n.id == id) {
            self.nodes.push(Node::bare(id));
        }
    }

    fn finish(self, reserved: &ReservedNames) -> ParsedDiagram {
        let node_ids = self
            .defined
            .iter()
            .filter(|id| !reserved.is_reserved(id))
            .cloned()
            .collect();
        ParsedDiagram {
            header: self.header,
            nodes: self.nodes,
            node_ids,
            defined: self.defined,
            edges: self.edges,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
