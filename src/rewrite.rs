//! Diagram rewriter: renames node identifiers in place.
//!
//! Only identifier tokens in reference position are candidates: a definition
//! site (`id[`, `id(`, `id{`), an edge source (`id -->`) and an edge target
//! (`--> id`, `-->|label| id`). Labels, comments and keyword lines such as
//! `style` are never touched, and every byte outside a renamed identifier is
//! copied through unchanged.
//!
//! All mapping entries are applied in a single pass over whole identifier
//! tokens. An id that is a prefix of another (`Visa` / `VisaApplication`)
//! is therefore never partially rewritten, and renames do not chain
//! (`A → B`, `B → C` leaves the original `A` as `B`).

use std::collections::HashSet;

use crate::parsers::flowchart::{KEYWORDS, statements};
use crate::parsers::lexer::{Token, TokenKind, tokenize};
use crate::reconcile::IdentifierMapping;

/// Result of one rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    /// Number of identifier occurrences replaced.
    pub replacements: usize,
}

/// Rename every mapped identifier in reference position.
pub fn rewrite(text: &str, mapping: &IdentifierMapping) -> String {
    rewrite_counted(text, mapping).text
}

pub fn rewrite_counted(text: &str, mapping: &IdentifierMapping) -> Rewritten {
    if mapping.iter().all(|(from, to)| from == to) {
        return Rewritten {
            text: text.to_string(),
            replacements: 0,
        };
    }
    let tokens = tokenize(text);
    let sites = reference_sites(text, &tokens);

    let mut out = String::with_capacity(text.len());
    let mut replacements = 0;
    for tok in &tokens {
        let src = tok.text(text);
        let renamed = match tok.kind {
            TokenKind::Ident if sites.contains(&tok.span.start) => mapping.get(src),
            _ => None,
        };
        match renamed {
            Some(to) if to != src => {
                out.push_str(to);
                replacements += 1;
            }
            _ => out.push_str(src),
        }
    }
    Rewritten {
        text: out,
        replacements,
    }
}

/// Start offsets of identifier tokens in reference position.
fn reference_sites(src: &str, tokens: &[Token]) -> HashSet<usize> {
    let mut sites = HashSet::new();
    for stmt in statements(src, tokens) {
        let keyword_line = stmt
            .first()
            .is_some_and(|t| t.kind == TokenKind::Ident && KEYWORDS.contains(&t.text(src)));
        if keyword_line {
            continue;
        }
        for (i, tok) in stmt.iter().enumerate() {
            if tok.kind != TokenKind::Ident {
                continue;
            }
            let next = stmt.get(i + 1);
            let prev = i.checked_sub(1).and_then(|j| stmt.get(j));
            let defines = next.is_some_and(|t| {
                matches!(t.kind, TokenKind::Shape { .. }) && t.span.start == tok.span.end
            });
            let edge_source = next.is_some_and(|t| matches!(t.kind, TokenKind::Connector(_)));
            let edge_target = prev.is_some_and(|t| {
                matches!(t.kind, TokenKind::Connector(_) | TokenKind::EdgeLabel(_))
            });
            if defines || edge_source || edge_target {
                sites.insert(tok.span.start);
            }
        }
    }
    sites
}

// ─── Tests ───────────────────────────────────────────────────────────────────
