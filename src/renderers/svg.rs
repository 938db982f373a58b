//! SVG generation for flowchart diagram text.
//!
//! Nodes are placed with the layered layout and drawn as
//! `<g class="node" id="{prefix}-{id}-{seq}">` groups, `seq` counting nodes
//! in first-mention order. The interactive renderer recovers step ids from
//! those group ids.

use std::collections::HashMap;

use super::interactive::DiagramGenerator;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::layout::layered::{LayeredLayout, layered};
use crate::parsers::{FlowchartParser, Parser};
use crate::syntax::types::{Direction, Edge, EdgeType, Node, NodeShape};

// ─── Constants ───────────────────────────────────────────────────────────────

const CHAR_W: f64 = 8.0;
const FONT_SIZE: u32 = 14;
const FONT_FAMILY: &str = "sans-serif";
const NODE_H: f64 = 40.0;
const NODE_PAD_X: f64 = 16.0;
const MIN_NODE_W: f64 = 60.0;
const GAP_MAIN: f64 = 60.0;
const GAP_CROSS: f64 = 40.0;
const MARGIN: f64 = 20.0;

const FILL_STROKE: &str = r##"fill="#fff" stroke="#333" stroke-width="1.5""##;

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn font(size: u32) -> String {
    format!(r#"font-family="{FONT_FAMILY}" font-size="{size}""#)
}

fn node_width(node: &Node) -> f64 {
    let text = node.label.chars().count() as f64 * CHAR_W + 2.0 * NODE_PAD_X;
    let w = text.max(MIN_NODE_W);
    match node.shape {
        NodeShape::Diamond => w * 1.4,
        _ => w,
    }
}

#[derive(Debug, Clone, Copy)]
struct Geom {
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
}

impl Geom {
    /// Point where the segment from the center toward `(x, y)` leaves the box.
    fn clip_toward(&self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = (x - self.cx, y - self.cy);
        if dx == 0.0 && dy == 0.0 {
            return (self.cx, self.cy);
        }
        let tx = if dx == 0.0 { f64::INFINITY } else { (self.w / 2.0) / dx.abs() };
        let ty = if dy == 0.0 { f64::INFINITY } else { (self.h / 2.0) / dy.abs() };
        let t = tx.min(ty);
        (self.cx + dx * t, self.cy + dy * t)
    }
}

fn place(
    nodes: &[Node],
    layout: &LayeredLayout,
    direction: Direction,
) -> (HashMap<String, Geom>, f64, f64) {
    let widths: HashMap<&str, f64> = nodes.iter().map(|n| (n.id.as_str(), node_width(n))).collect();
    let slot_w = widths.values().copied().fold(MIN_NODE_W, f64::max) + GAP_CROSS;
    let slot_h = NODE_H + GAP_MAIN;
    let depth = layout.depth();
    let span = layout.width() as f64;

    let mut out = HashMap::new();
    let (mut max_x, mut max_y) = (0.0f64, 0.0f64);
    for (layer_idx, layer) in layout.layers.iter().enumerate() {
        let main = match direction {
            Direction::BT | Direction::RL => depth - 1 - layer_idx,
            Direction::TD | Direction::LR => layer_idx,
        } as f64;
        let shift = (span - layer.len() as f64) / 2.0;
        for (order, id) in layer.iter().enumerate() {
            let cross = order as f64 + shift;
            let w = widths.get(id.as_str()).copied().unwrap_or(MIN_NODE_W);
            let (cx, cy) = if direction.is_horizontal() {
                (MARGIN + main * slot_w + slot_w / 2.0, MARGIN + cross * slot_h + NODE_H / 2.0)
            } else {
                (MARGIN + (cross + 0.5) * slot_w, MARGIN + main * slot_h + NODE_H / 2.0)
            };
            max_x = max_x.max(cx + w / 2.0);
            max_y = max_y.max(cy + NODE_H / 2.0);
            out.insert(id.clone(), Geom { cx, cy, w, h: NODE_H });
        }
    }
    (out, max_x + MARGIN, max_y + MARGIN)
}

// ─── Shapes ──────────────────────────────────────────────────────────────────

fn render_shape(g: &Geom, shape: NodeShape) -> String {
    let (x, y) = (g.cx - g.w / 2.0, g.cy - g.h / 2.0);
    let (w, h) = (g.w, g.h);
    match shape {
        NodeShape::Rectangle => {
            format!(r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="0" {FILL_STROKE}/>"#)
        }
        NodeShape::Rounded => {
            format!(r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="8" {FILL_STROKE}/>"#)
        }
        NodeShape::Stadium => {
            let r = h / 2.0;
            format!(r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" {FILL_STROKE}/>"#)
        }
        NodeShape::Diamond => {
            let (cx, cy) = (g.cx, g.cy);
            format!(
                r#"<polygon points="{cx},{y} {},{cy} {cx},{} {x},{cy}" {FILL_STROKE}/>"#,
                x + w,
                y + h
            )
        }
        NodeShape::Circle => {
            let (cx, cy, rx, ry) = (g.cx, g.cy, w / 2.0, h / 2.0);
            format!(r#"<ellipse cx="{cx}" cy="{cy}" rx="{rx}" ry="{ry}" {FILL_STROKE}/>"#)
        }
    }
}

fn render_node(node: &Node, g: &Geom, group_id: &str) -> String {
    let (cx, cy) = (g.cx, g.cy);
    let f = font(FONT_SIZE);
    format!(
        "<g class=\"node\" id=\"{}\">\n{}\n<text x=\"{cx}\" y=\"{cy}\" dominant-baseline=\"central\" text-anchor=\"middle\" {f}>{}</text>\n</g>",
        escape(group_id),
        render_shape(g, node.shape),
        escape(&node.label)
    )
}

// ─── Edges ───────────────────────────────────────────────────────────────────

fn render_edge(edge: &Edge, from: &Geom, to: &Geom) -> String {
    let (x1, y1) = from.clip_toward(to.cx, to.cy);
    let (x2, y2) = to.clip_toward(from.cx, from.cy);
    let mut attrs = String::new();
    if edge.edge_type.is_dotted() {
        attrs.push_str(r#" stroke-dasharray="6 4""#);
    }
    let width = if edge.edge_type.is_thick() { 3.0 } else { 1.5 };
    if edge.edge_type.has_arrow() {
        attrs.push_str(r#" marker-end="url(#arrowhead)""#);
    }
    if matches!(
        edge.edge_type,
        EdgeType::BidirArrow | EdgeType::BidirDotted | EdgeType::BidirThick
    ) {
        attrs.push_str(r#" marker-start="url(#arrowhead-rev)""#);
    }
    let mut out = format!(
        r##"<path class="edge" d="M{x1},{y1} L{x2},{y2}" fill="none" stroke="#333" stroke-width="{width}"{attrs}/>"##
    );
    if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
        let (lx, ly) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        out.push_str(&format!(
            "\n<text class=\"edge-label\" x=\"{lx}\" y=\"{ly}\" text-anchor=\"middle\" {} fill=\"#333\">{}</text>",
            font(FONT_SIZE - 2),
            escape(label)
        ));
    }
    out
}

// ─── SvgGenerator ────────────────────────────────────────────────────────────

/// Generates SVG markup for diagram text.
#[derive(Debug, Clone, Default)]
pub struct SvgGenerator {
    pub config: RenderConfig,
    parser: FlowchartParser,
}

impl SvgGenerator {
    pub fn new(config: RenderConfig) -> Self {
        let parser = FlowchartParser::new(config.reserved.clone());
        Self { config, parser }
    }

    /// Render `source` to an `<svg id="{render_id}">` document.
    pub fn render(&self, render_id: &str, source: &str) -> Result<String, RenderError> {
        let diagram = self.parser.parse(source);
        if diagram.nodes.is_empty() {
            return Err(RenderError::Generation("diagram has no nodes".into()));
        }
        let direction = diagram.header.unwrap_or_default();
        let ids: Vec<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
        let pairs: Vec<(&str, &str)> = diagram
            .edges
            .iter()
            .map(|e| (e.from_id.as_str(), e.to_id.as_str()))
            .collect();
        let layout = layered(&ids, &pairs);
        let (geoms, w, h) = place(&diagram.nodes, &layout, direction);

        let mut parts = vec![
            format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" class="flowchart" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                escape(render_id)
            ),
            "<defs>".to_string(),
            r##"<marker id="arrowhead" markerWidth="10" markerHeight="7" refX="10" refY="3.5" orient="auto"><polygon points="0 0, 10 3.5, 0 7" fill="#333"/></marker>"##.to_string(),
            r##"<marker id="arrowhead-rev" markerWidth="10" markerHeight="7" refX="0" refY="3.5" orient="auto"><polygon points="10 0, 0 3.5, 10 7" fill="#333"/></marker>"##.to_string(),
            "</defs>".to_string(),
        ];

        for edge in &diagram.edges {
            if let (Some(from), Some(to)) = (geoms.get(&edge.from_id), geoms.get(&edge.to_id)) {
                parts.push(render_edge(edge, from, to));
            }
        }
        for (seq, node) in diagram.nodes.iter().enumerate() {
            if let Some(g) = geoms.get(&node.id) {
                let group_id = format!("{}-{}-{}", self.config.node_id_prefix, node.id, seq);
                parts.push(render_node(node, g, &group_id));
            }
        }
        parts.push("</svg>".to_string());
        Ok(parts.join("\n"))
    }
}

impl DiagramGenerator for SvgGenerator {
    async fn generate(&self, render_id: &str, source: &str) -> Result<String, RenderError> {
        self.render(render_id, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "flowchart TD
  Start([Start]) --> job-offer[Secure Job Offer]
  job-offer --> decision{Eligible?}
  decision -->|Yes| travel[Travel & Settle]
  decision -->|No| End([End])";

    fn doc(svg: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(svg).unwrap()
    }

    #[test]
    fn test_well_formed_and_rooted() {
        let svg = SvgGenerator::default().render("flowchart-germany-1", SRC).unwrap();
        let d = doc(&svg);
        let root = d.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.attribute("id"), Some("flowchart-germany-1"));
    }

    #[test]
    fn test_node_group_ids_follow_convention() {
        let svg = SvgGenerator::default().render("r", SRC).unwrap();
        let d = doc(&svg);
        let ids: Vec<&str> = d
            .descendants()
            .filter(|n| n.has_tag_name("g") && n.attribute("class") == Some("node"))
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(
            ids,
            vec![
                "flowchart-Start-0",
                "flowchart-job-offer-1",
                "flowchart-decision-2",
                "flowchart-travel-3",
                "flowchart-End-4",
            ]
        );
    }

    #[test]
    fn test_labels_escaped() {
        let svg = SvgGenerator::default().render("r", SRC).unwrap();
        assert!(svg.contains("Travel &amp; Settle"));
        let d = doc(&svg);
        assert!(d.descendants().any(|n| n.text() == Some("Travel & Settle")));
    }

    #[test]
    fn test_edges_and_labels() {
        let svg = SvgGenerator::default().render("r", SRC).unwrap();
        let d = doc(&svg);
        let edges = d
            .descendants()
            .filter(|n| n.attribute("class") == Some("edge"))
            .count();
        assert_eq!(edges, 4);
        let labels: Vec<&str> = d
            .descendants()
            .filter(|n| n.attribute("class") == Some("edge-label"))
            .filter_map(|n| n.text())
            .collect();
        assert_eq!(labels, vec!["Yes", "No"]);
    }

    #[test]
    fn test_decision_drawn_as_polygon() {
        let svg = SvgGenerator::default().render("r", SRC).unwrap();
        let d = doc(&svg);
        let decision = d
            .descendants()
            .find(|n| n.attribute("id") == Some("flowchart-decision-2"))
            .unwrap();
        assert!(decision.children().any(|c| c.has_tag_name("polygon")));
    }

    #[test]
    fn test_custom_prefix() {
        let config = RenderConfig {
            node_id_prefix: "visa".into(),
            ..RenderConfig::default()
        };
        let svg = SvgGenerator::new(config).render("r", "a[A] --> b[B]").unwrap();
        assert!(svg.contains(r#"id="visa-a-0""#));
        assert!(svg.contains(r#"id="visa-b-1""#));
    }

    #[test]
    fn test_empty_source_is_generation_error() {
        let err = SvgGenerator::default().render("r", "%% nothing here\n").unwrap_err();
        assert!(matches!(err, RenderError::Generation(_)));
    }

    #[test]
    fn test_horizontal_direction_spreads_along_x() {
        let svg = SvgGenerator::default().render("r", "flowchart LR\na[A] --> b[B]").unwrap();
        let d = doc(&svg);
        let x_of = |id: &str| -> f64 {
            d.descendants()
                .find(|n| n.attribute("id") == Some(id))
                .and_then(|g| g.children().find(|c| c.has_tag_name("text")))
                .and_then(|t| t.attribute("x"))
                .and_then(|x| x.parse().ok())
                .unwrap()
        };
        assert!(x_of("flowchart-b-1") > x_of("flowchart-a-0"));
    }
}
