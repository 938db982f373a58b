//! Character-class tokenizer for flowchart text.
//!
//! Every byte of the input belongs to exactly one token, so concatenating
//! the token texts reproduces the source. The rewriter relies on this to
//! replace identifier bytes and leave everything else untouched.

use std::ops::Range;

use crate::syntax::types::{EdgeType, NodeShape};

// ─── Edge patterns ───────────────────────────────────────────────────────────

/// Edge connector tokens in priority order (longest-match first).
pub const EDGE_PATTERNS: &[(&str, EdgeType)] = &[
    ("<-.->", EdgeType::BidirDotted),
    ("<==>", EdgeType::BidirThick),
    ("<-->", EdgeType::BidirArrow),
    ("-.->", EdgeType::DottedArrow),
    ("==>", EdgeType::ThickArrow),
    ("-->", EdgeType::Arrow),
    ("-.-", EdgeType::DottedLine),
    ("===", EdgeType::ThickLine),
    ("---", EdgeType::Line),
];

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_-]*`, never swallowing a trailing connector.
    Ident,
    /// A bracketed node body such as `[Label]`, `([Start])` or `{"Yes?"}`.
    Shape { shape: NodeShape, label: String },
    Connector(EdgeType),
    /// `|text|` following a connector.
    EdgeLabel(String),
    /// `%% ...` up to (not including) the line break.
    Comment,
    Whitespace,
    Newline,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range into the source.
    pub span: Range<usize>,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.clone()]
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Byte cursor over the source text.
pub struct Cursor<'a> {
    pub src: &'a str,
    pub pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn bump(&mut self) {
        if let Some(ch) = self.current() {
            self.pos += ch.len_utf8();
        }
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.current() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current(), None | Some('\n') | Some('\r'))
    }

    /// Connector starting at the cursor, if any.
    pub fn peek_connector(&self) -> Option<(&'static str, EdgeType)> {
        EDGE_PATTERNS
            .iter()
            .find(|(token, _)| self.peek(token))
            .map(|(token, etype)| (*token, *etype))
    }

    /// Consume a newline (`\r\n`, `\n`, or `\r`). Returns true if consumed.
    pub fn consume_newline(&mut self) -> bool {
        self.consume("\r\n") || self.consume("\n") || self.consume("\r")
    }

    /// Match a node identifier. A `-` that begins a connector ends the
    /// identifier, so `job-offer-->next` yields `job-offer`.
    pub fn match_node_id(&mut self) -> bool {
        match self.current() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.pos += 1,
            _ => return false,
        }
        while let Some(ch) = self.current() {
            if ch == '-' && self.peek_connector().is_some() {
                break;
            }
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        true
    }

    /// Parse a double-quoted string, handling `\n`, `\"`, `\\` escapes.
    pub fn parse_quoted_string(&mut self) -> String {
        // Caller must have verified the current char is '"'
        self.pos += 1;
        let mut buf = String::new();
        while let Some(ch) = self.current() {
            if ch == '"' {
                self.pos += 1;
                break;
            }
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.bump();
            if ch == '\\' {
                match self.current() {
                    Some('n') => buf.push('\n'),
                    Some(other) => buf.push(other),
                    None => buf.push('\\'),
                }
                self.bump();
            } else {
                buf.push(ch);
            }
        }
        buf
    }

    /// Parse a node label up to `close` (quoted or bare).
    fn parse_node_label(&mut self, close: &str) -> String {
        self.bump_while(|c| c == ' ' || c == '\t');
        if self.current() == Some('"') {
            let label = self.parse_quoted_string();
            while !self.at_line_end() && !self.peek(close) {
                self.bump();
            }
            return label;
        }
        let start = self.pos;
        while !self.at_line_end() && !self.peek(close) {
            self.bump();
        }
        self.src[start..self.pos].trim().to_string()
    }

    /// Try to parse a node shape bracket. Returns `(NodeShape, label)` or None.
    pub fn parse_node_shape(&mut self) -> Option<(NodeShape, String)> {
        let (open, close, shape) = if self.peek("((") {
            ("((", "))", NodeShape::Circle)
        } else if self.peek("([") {
            ("([", "])", NodeShape::Stadium)
        } else if self.peek("(") {
            ("(", ")", NodeShape::Rounded)
        } else if self.peek("{") {
            ("{", "}", NodeShape::Diamond)
        } else if self.peek("[") {
            ("[", "]", NodeShape::Rectangle)
        } else {
            return None;
        };
        self.pos += open.len();
        let label = self.parse_node_label(close);
        self.consume(close);
        Some((shape, label))
    }

    /// Parse the body of an edge label after the opening `|`.
    fn parse_edge_label(&mut self) -> String {
        let start = self.pos;
        while !self.at_line_end() && self.current() != Some('|') {
            self.bump();
        }
        let text = self.src[start..self.pos].trim().to_string();
        self.consume("|");
        text
    }
}

// ─── Tokenizer ───────────────────────────────────────────────────────────────

/// Split `src` into spanned tokens.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut cur = Cursor::new(src);
    let mut tokens: Vec<Token> = Vec::new();
    // Kind of the last token that was neither whitespace nor a comment.
    let mut last_significant: Option<TokenKind> = None;

    while !cur.eof() {
        let start = cur.pos;
        let kind = if cur.consume_newline() {
            TokenKind::Newline
        } else if matches!(cur.current(), Some(' ') | Some('\t')) {
            cur.bump_while(|c| c == ' ' || c == '\t');
            TokenKind::Whitespace
        } else if cur.peek("%%") {
            while !cur.at_line_end() {
                cur.bump();
            }
            TokenKind::Comment
        } else if let Some((token, etype)) = cur.peek_connector() {
            cur.pos += token.len();
            TokenKind::Connector(etype)
        } else if cur.current() == Some('|')
            && matches!(last_significant, Some(TokenKind::Connector(_)))
        {
            cur.pos += 1;
            TokenKind::EdgeLabel(cur.parse_edge_label())
        } else if cur.match_node_id() {
            TokenKind::Ident
        } else if let Some((shape, label)) = cur.parse_node_shape() {
            TokenKind::Shape { shape, label }
        } else {
            cur.bump();
            TokenKind::Other
        };
        let token = Token {
            kind,
            span: start..cur.pos,
        };
        if !token.is_trivia() {
            last_significant = Some(token.kind.clone());
        }
        tokens.push(token);
    }
    tokens
}

// ─── Tests ───────────────────────────────────────────────────────────────────
