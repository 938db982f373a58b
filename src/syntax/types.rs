//! Parsed form of a flowchart diagram description.
//!
//! Only the subset that program diagrams use is modelled: a header with a
//! direction, node definitions with a shape and label, and edges with an
//! optional `|label|`.

// ─── Direction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    LR,
    RL,
    #[default]
    TD,
    BT,
}

impl Direction {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "TD" | "TB" => Some(Self::TD),
            "LR" => Some(Self::LR),
            "RL" => Some(Self::RL),
            "BT" => Some(Self::BT),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LR | Self::RL)
    }
}

// ─── NodeShape ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    #[default]
    Rectangle, // id[Label]
    Rounded,  // id(Label)
    Stadium,  // id([Label])
    Diamond,  // id{Label}
    Circle,   // id((Label))
}

impl NodeShape {
    /// Brace nodes are decision points.
    pub fn is_decision(self) -> bool {
        self == Self::Diamond
    }
}

// ─── EdgeType ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    Arrow,       // -->
    Line,        // ---
    DottedArrow, // -.->
    DottedLine,  // -.-
    ThickArrow,  // ==>
    ThickLine,   // ===
    BidirArrow,  // <-->
    BidirDotted, // <-.->
    BidirThick,  // <==>
}

impl EdgeType {
    pub fn is_dotted(self) -> bool {
        matches!(self, Self::DottedArrow | Self::DottedLine | Self::BidirDotted)
    }

    pub fn is_thick(self) -> bool {
        matches!(self, Self::ThickArrow | Self::ThickLine | Self::BidirThick)
    }

    pub fn has_arrow(self) -> bool {
        !matches!(self, Self::Line | Self::DottedLine | Self::ThickLine)
    }
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Diagram identifier (e.g. "Start", "job-offer", "CheckSalary").
    pub id: String,
    /// Display label. Defaults to the id for bare references.
    pub label: String,
    pub shape: NodeShape,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
        }
    }

    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        let label = id.clone();
        Self {
            id,
            label,
            shape: NodeShape::Rectangle,
        }
    }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    pub edge_type: EdgeType,
    /// Branch label from `-->|text|`.
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            edge_type,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_keywords() {
        assert_eq!(Direction::from_keyword("TB"), Some(Direction::TD));
        assert_eq!(Direction::from_keyword("LR"), Some(Direction::LR));
        assert_eq!(Direction::from_keyword("XY"), None);
        assert!(Direction::RL.is_horizontal());
        assert!(!Direction::default().is_horizontal());
    }

    #[test]
    fn test_node_bare_uses_id_as_label() {
        let n = Node::bare("job-offer");
        assert_eq!(n.label, "job-offer");
        assert_eq!(n.shape, NodeShape::Rectangle);
    }

    #[test]
    fn test_edge_type_predicates() {
        assert!(EdgeType::Arrow.has_arrow());
        assert!(!EdgeType::Line.has_arrow());
        assert!(EdgeType::BidirDotted.is_dotted());
        assert!(EdgeType::ThickLine.is_thick());
    }

    #[test]
    fn test_diamond_is_decision() {
        assert!(NodeShape::Diamond.is_decision());
        assert!(!NodeShape::Stadium.is_decision());
    }
}
