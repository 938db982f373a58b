//! Vertical timeline of a program graph.
//!
//! Levels come from a breadth-first walk from the start node (first
//! discovery wins). The render walk then emits one instruction list:
//!
//! - a node with more than one child opens [`TimelineItem::Branches`], one
//!   branch per child, headed by the edge label (or the fallback label);
//! - a node with one child emits [`TimelineItem::Connector`] and continues;
//! - a node with no children ends its branch.
//!
//! Each node is rendered once. An edge into an already rendered node
//! (a merge point or a back edge) becomes [`TimelineItem::Jump`].

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::graph::GraphIndex;
use crate::config::TimelineConfig;
use crate::error::LayoutError;
use crate::model::{GraphNode, NodeType, StructuredGraph};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineNode {
    pub id: String,
    pub label: String,
    pub node_type: NodeType,
    pub step_id: Option<String>,
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub label: String,
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineItem {
    Node(TimelineNode),
    Connector,
    Branches(Vec<Branch>),
    /// Continues at a node rendered elsewhere in the timeline.
    Jump(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub items: Vec<TimelineItem>,
    /// BFS level of every reachable node.
    pub levels: HashMap<String, usize>,
    /// Nodes not reachable from the start node, in input order.
    pub unreachable: Vec<String>,
    /// True when the walk met an edge back into its own path.
    pub cyclic: bool,
}

impl Timeline {
    /// Ids in render order.
    pub fn rendered_ids(&self) -> Vec<&str> {
        fn collect<'a>(items: &'a [TimelineItem], out: &mut Vec<&'a str>) {
            for item in items {
                match item {
                    TimelineItem::Node(n) => out.push(&n.id),
                    TimelineItem::Branches(branches) => {
                        for b in branches {
                            collect(&b.items, out);
                        }
                    }
                    TimelineItem::Connector | TimelineItem::Jump(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.items, &mut out);
        out
    }
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// BFS levels from `start`. The `visited` set makes this terminate on cycles.
pub fn bfs_levels(index: &GraphIndex, start: &str) -> HashMap<String, usize> {
    let mut levels = HashMap::from([(start.to_string(), 0)]);
    let mut visited = HashSet::from([start.to_string()]);
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(id) = queue.pop_front() {
        let level = levels.get(&id).copied().unwrap_or(0);
        for child in index.children_of(&id) {
            if visited.insert(child.clone()) {
                levels.insert(child.clone(), level + 1);
                queue.push_back(child.clone());
            }
        }
    }
    levels
}

pub fn layout(
    nodes: &[GraphNode],
    index: &GraphIndex,
    start: &str,
    config: &TimelineConfig,
) -> Result<Timeline, LayoutError> {
    let by_id: HashMap<&str, &GraphNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    if !by_id.contains_key(start) {
        return Err(LayoutError::UnknownStart(start.to_string()));
    }
    let levels = bfs_levels(index, start);

    let mut walk = Walk {
        by_id: &by_id,
        index,
        levels: &levels,
        fallback: &config.fallback_branch_label,
        rendered: HashSet::new(),
        on_path: Vec::new(),
        cyclic: false,
    };
    let mut items = Vec::new();
    walk.render(start, &mut items);

    let unreachable: Vec<String> = nodes
        .iter()
        .filter(|n| !levels.contains_key(&n.id))
        .map(|n| n.id.clone())
        .collect();
    if !unreachable.is_empty() {
        debug!(count = unreachable.len(), "nodes unreachable from start");
    }

    Ok(Timeline {
        items,
        cyclic: walk.cyclic,
        levels,
        unreachable,
    })
}

/// Lay out a structured graph from its single `start` node.
pub fn layout_graph(
    graph: &StructuredGraph,
    config: &TimelineConfig,
) -> Result<Timeline, LayoutError> {
    let starts: Vec<&GraphNode> = graph
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Start)
        .collect();
    match starts.as_slice() {
        [] => Err(LayoutError::NoStartNode),
        [start] => layout(&graph.nodes, &GraphIndex::from_edges(&graph.edges), &start.id, config),
        many => Err(LayoutError::MultipleStartNodes(
            many.iter().map(|n| n.id.clone()).collect(),
        )),
    }
}

struct Walk<'a> {
    by_id: &'a HashMap<&'a str, &'a GraphNode>,
    index: &'a GraphIndex,
    levels: &'a HashMap<String, usize>,
    fallback: &'a str,
    rendered: HashSet<String>,
    on_path: Vec<String>,
    cyclic: bool,
}

impl Walk<'_> {
    fn render(&mut self, id: &str, out: &mut Vec<TimelineItem>) {
        let Some(node) = self.by_id.get(id) else {
            return;
        };
        self.rendered.insert(id.to_string());
        self.on_path.push(id.to_string());
        out.push(TimelineItem::Node(TimelineNode {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type,
            step_id: node.step_id.clone(),
            level: self.levels.get(id).copied().unwrap_or(0),
        }));

        // Fan-out counts every edge, including edges to missing nodes.
        let children: Vec<&String> = self.index.children_of(id).iter().collect();
        match children.as_slice() {
            [] => {}
            [child] => {
                out.push(TimelineItem::Connector);
                self.follow(child, out);
            }
            many => {
                let mut branches = Vec::with_capacity(many.len());
                for child in many {
                    let label = self
                        .index
                        .edge_label(id, child)
                        .filter(|l| !l.is_empty())
                        .unwrap_or(self.fallback)
                        .to_string();
                    let mut items = Vec::new();
                    self.follow(child, &mut items);
                    branches.push(Branch { label, items });
                }
                out.push(TimelineItem::Branches(branches));
            }
        }
        self.on_path.pop();
    }

    /// Render `child` in place, or point at it with a `Jump` when it was
    /// already rendered or has no node.
    fn follow(&mut self, child: &str, out: &mut Vec<TimelineItem>) {
        if !self.by_id.contains_key(child) {
            out.push(TimelineItem::Jump(child.to_string()));
        } else if self.rendered.contains(child) {
            if self.on_path.iter().any(|p| p == child) {
                self.cyclic = true;
            }
            out.push(TimelineItem::Jump(child.to_string()));
        } else {
            self.render(child, out);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
