//! Graph structures over a program's node/edge lists.
//!
//! [`GraphIndex`] is the adjacency view the timeline walk reads: children,
//! parents and edge labels, built in one pass over the edges.
//! [`GraphIR`] wraps a petgraph `DiGraph` for the structural checks behind
//! [`GraphDiagnostics`]: start nodes, cycles and reachability.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::{GraphEdge, NodeType, StructuredGraph};

// ─── GraphIndex ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphIndex {
    /// Source id → target ids, in edge order.
    pub children: HashMap<String, Vec<String>>,
    /// Target id → source ids, in edge order.
    pub parents: HashMap<String, Vec<String>>,
    /// Label of the edge `(source, target)`. Keyed by pair: ids contain `-`,
    /// so a joined `"source-target"` string would be ambiguous.
    pub edge_labels: HashMap<(String, String), String>,
}

impl GraphIndex {
    pub fn build<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, Option<&'a str>)>,
    {
        let mut index = Self::default();
        for (source, target, label) in edges {
            index
                .children
                .entry(source.to_string())
                .or_default()
                .push(target.to_string());
            index
                .parents
                .entry(target.to_string())
                .or_default()
                .push(source.to_string());
            if let Some(label) = label {
                index
                    .edge_labels
                    .insert((source.to_string(), target.to_string()), label.to_string());
            }
        }
        index
    }

    pub fn from_edges(edges: &[GraphEdge]) -> Self {
        Self::build(
            edges
                .iter()
                .map(|e| (e.source.as_str(), e.target.as_str(), e.label.as_deref())),
        )
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents_of(&self, id: &str) -> &[String] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_label(&self, source: &str, target: &str) -> Option<&str> {
        self.edge_labels
            .get(&(source.to_string(), target.to_string()))
            .map(String::as_str)
    }
}

// ─── GraphIR ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: String,
    pub node_type: NodeType,
}

/// Structural findings about a program graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDiagnostics {
    pub start_nodes: Vec<String>,
    /// Each entry is one strongly connected component with a cycle.
    pub cycles: Vec<Vec<String>>,
    /// Nodes not reachable from the single start node (empty unless there
    /// is exactly one start node).
    pub unreachable: Vec<String>,
    /// Edge endpoints with no matching node.
    pub dangling: Vec<String>,
}

impl GraphDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.start_nodes.len() == 1
            && self.cycles.is_empty()
            && self.unreachable.is_empty()
            && self.dangling.is_empty()
    }
}

pub struct GraphIR {
    pub digraph: DiGraph<NodeData, ()>,
    /// Maps node id → petgraph NodeIndex.
    pub node_index: HashMap<String, NodeIndex>,
    dangling: Vec<String>,
}

impl GraphIR {
    pub fn from_structured(graph: &StructuredGraph) -> Self {
        let mut digraph: DiGraph<NodeData, ()> = DiGraph::new();
        let mut node_index: HashMap<String, NodeIndex> = HashMap::new();
        for node in &graph.nodes {
            if node_index.contains_key(&node.id) {
                continue;
            }
            let idx = digraph.add_node(NodeData {
                id: node.id.clone(),
                node_type: node.node_type,
            });
            node_index.insert(node.id.clone(), idx);
        }
        let mut dangling = Vec::new();
        for edge in &graph.edges {
            let ends = (node_index.get(&edge.source), node_index.get(&edge.target));
            let (Some(&from), Some(&to)) = ends else {
                for end in [&edge.source, &edge.target] {
                    if !node_index.contains_key(end) && !dangling.contains(end) {
                        dangling.push(end.clone());
                    }
                }
                continue;
            };
            digraph.add_edge(from, to, ());
        }
        Self {
            digraph,
            node_index,
            dangling,
        }
    }

    /// Nodes typed `start`, in insertion order.
    pub fn start_nodes(&self) -> Vec<String> {
        self.digraph
            .node_indices()
            .filter(|&idx| self.digraph[idx].node_type == NodeType::Start)
            .map(|idx| self.digraph[idx].id.clone())
            .collect()
    }

    /// Ids reachable from `start` (inclusive).
    pub fn reachable_from(&self, start: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let Some(&root) = self.node_index.get(start) else {
            return seen;
        };
        let mut queue = VecDeque::from([root]);
        let mut visited: HashSet<NodeIndex> = HashSet::from([root]);
        while let Some(idx) = queue.pop_front() {
            seen.insert(self.digraph[idx].id.clone());
            for next in self.digraph.neighbors(idx) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Strongly connected components that contain a cycle.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = tarjan_scc(&self.digraph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.digraph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut ids: Vec<String> =
                    scc.into_iter().map(|idx| self.digraph[idx].id.clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        out.sort();
        out
    }

    pub fn diagnostics(&self) -> GraphDiagnostics {
        let start_nodes = self.start_nodes();
        let unreachable = match start_nodes.as_slice() {
            [start] => {
                let reached = self.reachable_from(start);
                self.digraph
                    .node_indices()
                    .map(|idx| &self.digraph[idx].id)
                    .filter(|id| !reached.contains(*id))
                    .cloned()
                    .collect()
            }
            _ => Vec::new(),
        };
        GraphDiagnostics {
            start_nodes,
            cycles: self.cycles(),
            unreachable,
            dangling: self.dangling.clone(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
