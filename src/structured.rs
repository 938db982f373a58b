//! Diagram text → structured node/edge graph.
//!
//! Node types are inferred from shape and label:
//!
//! - stadium `([..])`: `start` when the label mentions "start", `end` when it
//!   mentions "end" or "complete"; otherwise `start` if nothing points at it
//!   and `end` if something does;
//! - brace `{..}`: `decision`;
//! - label mentioning document/gather/collect: `document`;
//! - anything else: `process`.
//!
//! Positions come from the layered layout, centered per layer.

use std::collections::HashSet;

use crate::layout::layered::layered;
use crate::model::{GraphEdge, GraphNode, NodeType, Position, StepRegistry, StructuredGraph};
use crate::parsers::ParsedDiagram;
use crate::syntax::types::{Node, NodeShape};

pub const H_SPACING: f64 = 250.0;
pub const V_SPACING: f64 = 120.0;

pub fn infer_node_type(node: &Node, has_incoming: bool) -> NodeType {
    let label = node.label.to_lowercase();
    match node.shape {
        NodeShape::Stadium => {
            if label.contains("start") {
                NodeType::Start
            } else if label.contains("end") || label.contains("complete") {
                NodeType::End
            } else if has_incoming {
                NodeType::End
            } else {
                NodeType::Start
            }
        }
        NodeShape::Diamond => NodeType::Decision,
        _ if ["document", "gather", "collect"]
            .iter()
            .any(|w| label.contains(w)) =>
        {
            NodeType::Document
        }
        _ => NodeType::Process,
    }
}

/// Build the structured graph of `diagram`. `step_id` is set on nodes whose
/// id is one of the program's steps.
pub fn to_structured(diagram: &ParsedDiagram, steps: StepRegistry<'_>) -> StructuredGraph {
    let targets: HashSet<&str> = diagram.edges.iter().map(|e| e.to_id.as_str()).collect();
    let ids: Vec<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
    let pairs: Vec<(&str, &str)> = diagram
        .edges
        .iter()
        .map(|e| (e.from_id.as_str(), e.to_id.as_str()))
        .collect();
    let layout = layered(&ids, &pairs);

    let nodes = diagram
        .nodes
        .iter()
        .map(|node| {
            let position = layout
                .node(&node.id)
                .map(|ln| {
                    let width = layout.layers[ln.layer].len() as f64;
                    Position {
                        x: (ln.order as f64 - (width - 1.0) / 2.0) * H_SPACING,
                        y: ln.layer as f64 * V_SPACING,
                    }
                })
                .unwrap_or_default();
            GraphNode {
                id: node.id.clone(),
                node_type: infer_node_type(node, targets.contains(node.id.as_str())),
                position,
                label: node.label.clone(),
                step_id: steps.contains(&node.id).then(|| node.id.clone()),
            }
        })
        .collect();

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let edges = diagram
        .edges
        .iter()
        .filter(|e| seen.insert((e.from_id.clone(), e.to_id.clone())))
        .map(|e| GraphEdge {
            id: format!("{}-{}", e.from_id, e.to_id),
            source: e.from_id.clone(),
            target: e.to_id.clone(),
            label: e.label.clone(),
        })
        .collect();

    StructuredGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;
    use crate::parsers::parse;

    const DIAGRAM: &str = "flowchart TD
  Start([Start Process]) --> job-offer[Secure Job Offer]
  job-offer --> gather-documents[Gather Required Documents]
  gather-documents --> decision{Decision}
  decision -->|Approved| travel[Travel to Germany]
  decision -->|Rejected| End2([Not Eligible])
  travel --> Success([Process Complete])";

    fn steps() -> Vec<Step> {
        ["job-offer", "gather-documents", "decision", "travel"]
            .iter()
            .map(|id| Step::new(*id, *id))
            .collect()
    }

    #[test]
    fn test_node_types() {
        let steps = steps();
        let g = to_structured(&parse(DIAGRAM), StepRegistry::new(&steps));
        let ty = |id: &str| g.node(id).unwrap().node_type;
        assert_eq!(ty("Start"), NodeType::Start);
        assert_eq!(ty("job-offer"), NodeType::Process);
        assert_eq!(ty("gather-documents"), NodeType::Document);
        assert_eq!(ty("decision"), NodeType::Decision);
        assert_eq!(ty("End2"), NodeType::End);
        assert_eq!(ty("Success"), NodeType::End);
    }

    #[test]
    fn test_step_back_references() {
        let steps = steps();
        let g = to_structured(&parse(DIAGRAM), StepRegistry::new(&steps));
        assert_eq!(g.node("travel").unwrap().step_id.as_deref(), Some("travel"));
        assert!(g.node("Start").unwrap().step_id.is_none());
        assert!(g.node("End2").unwrap().step_id.is_none());
    }

    #[test]
    fn test_edges_and_ids() {
        let steps = steps();
        let g = to_structured(&parse(DIAGRAM), StepRegistry::new(&steps));
        assert_eq!(g.edges.len(), 6);
        let approved = g.edges.iter().find(|e| e.id == "decision-travel").unwrap();
        assert_eq!(approved.label.as_deref(), Some("Approved"));
    }

    #[test]
    fn test_positions_layered_and_centered() {
        let steps = steps();
        let g = to_structured(&parse(DIAGRAM), StepRegistry::new(&steps));
        let pos = |id: &str| g.node(id).unwrap().position;
        assert_eq!(pos("Start").y, 0.0);
        assert_eq!(pos("Start").x, 0.0);
        assert_eq!(pos("job-offer").y, V_SPACING);
        assert_eq!(pos("travel").y, pos("End2").y);
        assert_eq!(pos("travel").x, -pos("End2").x);
    }

    #[test]
    fn test_unlabeled_stadium_without_parents_is_start() {
        let node = Node::new("Begin", "Go", NodeShape::Stadium);
        assert_eq!(infer_node_type(&node, false), NodeType::Start);
        assert_eq!(infer_node_type(&node, true), NodeType::End);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let g = to_structured(&parse("a[A] --> b[B]\na --> b"), StepRegistry::new(&[]));
        assert_eq!(g.edges.len(), 1);
    }
}
