//! Configuration for the repair, layout and rendering pipelines.

use crate::renderers::charset::CharSet;

// ─── ReservedNames ───────────────────────────────────────────────────────────

/// Terminal node ids that never carry a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames {
    /// Ids reserved verbatim (`Start`, `End`, `Success`).
    pub exact: Vec<String>,
    /// Prefixes reserved when followed by one or more digits (`End1`, `End2`, ...).
    pub numbered: Vec<String>,
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self {
            exact: vec!["Start".into(), "End".into(), "Success".into()],
            numbered: vec!["End".into()],
        }
    }
}

impl ReservedNames {
    pub fn none() -> Self {
        Self {
            exact: Vec::new(),
            numbered: Vec::new(),
        }
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        if self.exact.iter().any(|r| r == id) {
            return true;
        }
        self.numbered.iter().any(|prefix| {
            id.strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        })
    }
}

// ─── RepairConfig ────────────────────────────────────────────────────────────

/// Settings for the diagram repair loop.
#[derive(Debug, Clone)]
pub struct RepairConfig {
    /// Upper bound on parse → reconcile → rewrite passes per diagram.
    pub max_iterations: usize,
    pub reserved: ReservedNames,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            reserved: ReservedNames::default(),
        }
    }
}

// ─── RenderConfig ────────────────────────────────────────────────────────────

/// Settings shared by the SVG generator and the interactive renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Visual node ids are `{prefix}-{stepId}-{n}`.
    pub node_id_prefix: String,
    pub hover_class: String,
    pub selected_class: String,
    pub interactive_class: String,
    /// Text of the inline element shown when generation fails.
    pub error_message: String,
    pub reserved: ReservedNames,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_id_prefix: "flowchart".into(),
            hover_class: "node-hover".into(),
            selected_class: "node-selected".into(),
            interactive_class: "node-interactive".into(),
            error_message: "Error rendering flowchart".into(),
            reserved: ReservedNames::default(),
        }
    }
}

// ─── TimelineConfig ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Branch header used when the edge into a branch has no label.
    pub fallback_branch_label: String,
    pub charset: CharSet,
    /// Horizontal gap between side-by-side branches, in characters.
    pub branch_gap: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            fallback_branch_label: "Path".into(),
            charset: CharSet::Unicode,
            branch_gap: 3,
        }
    }
}
