//! Program records as stored in the flowchart data files.
//!
//! Field names follow the JSON files (camelCase). Records are plain data:
//! consistency between `diagram_text` and `steps` is checked by
//! [`crate::validate`] and restored by [`crate::repair`], never enforced here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Step ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Canonical kebab-case id, e.g. `job-offer`.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_conditional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Keys this struct does not model, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            estimated_duration: None,
            documents: None,
            notes: None,
            is_conditional: None,
            condition: None,
            extra: Map::new(),
        }
    }
}

// ─── Structured graph ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    End,
    Process,
    Decision,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    pub label: String,
    /// Back-reference into the program's steps; absent on decorative nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl StructuredGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ─── Program ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub program_id: String,
    pub country_code: String,
    pub program_name: String,
    #[serde(alias = "mermaidDiagram")]
    pub diagram_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_graph: Option<StructuredGraph>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Program {
    pub fn new(
        program_id: impl Into<String>,
        country_code: impl Into<String>,
        program_name: impl Into<String>,
        diagram_text: impl Into<String>,
    ) -> Self {
        Self {
            program_id: program_id.into(),
            country_code: country_code.into(),
            program_name: program_name.into(),
            diagram_text: diagram_text.into(),
            structured_graph: None,
            steps: Vec::new(),
            total_estimated_duration: None,
            complexity: None,
            success_rate: None,
            extra: Map::new(),
        }
    }

    pub fn registry(&self) -> StepRegistry<'_> {
        StepRegistry::new(&self.steps)
    }
}

// ─── StepRegistry ────────────────────────────────────────────────────────────

/// Read-only lookup over one program's steps, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct StepRegistry<'a> {
    steps: &'a [Step],
}

impl<'a> StepRegistry<'a> {
    pub fn new(steps: &'a [Step]) -> Self {
        Self { steps }
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&'a Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn steps(&self) -> &'a [Step] {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM_JSON: &str = r#"{
        "programId": "de_eu_blue_card",
        "countryCode": "DE",
        "programName": "EU Blue Card",
        "mermaidDiagram": "flowchart TD\n  Start([Start]) --> job-offer[Offer]",
        "steps": [
            {"id": "job-offer", "title": "Secure Job Offer", "description": "d",
             "estimatedDuration": "1-3 months", "documents": ["Contract"],
             "isConditional": false}
        ],
        "totalEstimatedDuration": "3-6 months",
        "complexity": "medium",
        "successRate": "85%"
    }"#;

    #[test]
    fn test_program_deserializes_legacy_diagram_field() {
        let p: Program = serde_json::from_str(PROGRAM_JSON).unwrap();
        assert!(p.diagram_text.starts_with("flowchart TD"));
        assert_eq!(p.complexity, Some(Complexity::Medium));
        assert_eq!(p.steps[0].estimated_duration.as_deref(), Some("1-3 months"));
        assert_eq!(p.steps[0].is_conditional, Some(false));
        assert!(p.structured_graph.is_none());
    }

    #[test]
    fn test_program_serializes_camel_case() {
        let p: Program = serde_json::from_str(PROGRAM_JSON).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("diagramText").is_some());
        assert!(v.get("totalEstimatedDuration").is_some());
        assert!(v.get("structuredGraph").is_none());
        assert!(v["steps"][0].get("notes").is_none());
    }

    #[test]
    fn test_graph_node_type_field() {
        let n: GraphNode = serde_json::from_str(
            r#"{"id":"a","type":"decision","position":{"x":1,"y":2},"label":"A?"}"#,
        )
        .unwrap();
        assert_eq!(n.node_type, NodeType::Decision);
        assert_eq!(n.position.y, 2.0);
        assert!(n.step_id.is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let steps = vec![Step::new("job-offer", "Offer"), Step::new("travel", "Travel")];
        let reg = StepRegistry::new(&steps);
        assert_eq!(reg.ids(), vec!["job-offer", "travel"]);
        assert!(reg.contains("travel"));
        assert!(!reg.contains("Travel"));
        assert_eq!(reg.get("job-offer").map(|s| s.title.as_str()), Some("Offer"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_unmodelled_keys_round_trip() {
        let src = r#"{"programId": "x", "countryCode": "X", "programName": "X",
            "diagramText": "flowchart TD", "officialUrl": "https://example.org",
            "steps": [{"id": "a", "title": "A", "tips": ["keep receipts"]}]}"#;
        let p: Program = serde_json::from_str(src).unwrap();
        assert_eq!(p.extra["officialUrl"], "https://example.org");
        assert_eq!(p.complexity, None);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["officialUrl"], "https://example.org");
        assert_eq!(v["steps"][0]["tips"][0], "keep receipts");
        assert!(v.get("complexity").is_none());
        assert!(v["steps"][0].get("documents").is_none());
    }
}
