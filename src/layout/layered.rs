//! Layer assignment for drawing a program graph top to bottom.
//!
//! Longest-path layering over Kahn's topological order. When a cycle
//! blocks the queue, the first blocked node (in input order) is placed
//! below its already-placed parents and the walk resumes from it.

use std::collections::HashMap;

// ─── LayoutNode ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutNode {
    pub id: String,
    pub layer: usize,
    /// Position within the layer, left to right.
    pub order: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeredLayout {
    pub layers: Vec<Vec<String>>,
    pub nodes: HashMap<String, LayoutNode>,
}

impl LayeredLayout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    pub fn width(&self) -> usize {
        self.layers.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

// ─── Layering ────────────────────────────────────────────────────────────────

/// Assign every id in `ids` to a layer. Edge endpoints missing from `ids`
/// are ignored.
pub fn layered(ids: &[&str], edges: &[(&str, &str)]) -> LayeredLayout {
    let position: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let n = ids.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (s, t) in edges {
        if let (Some(&s), Some(&t)) = (position.get(s), position.get(t)) {
            children[s].push(t);
            parents[t].push(s);
        }
    }

    let mut indegree: Vec<usize> = parents.iter().map(Vec::len).collect();
    let mut layer: Vec<Option<usize>> = vec![None; n];
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut queue: std::collections::VecDeque<usize> =
        (0..n).filter(|&i| indegree[i] == 0).collect();

    while order.len() < n {
        let Some(v) = queue.pop_front().or_else(|| (0..n).find(|&i| layer[i].is_none())) else {
            break;
        };
        if layer[v].is_some() {
            continue;
        }
        let depth = parents[v]
            .iter()
            .filter_map(|&p| layer[p])
            .max()
            .map_or(0, |d| d + 1);
        layer[v] = Some(depth);
        order.push(v);
        for &c in &children[v] {
            indegree[c] = indegree[c].saturating_sub(1);
            if indegree[c] == 0 && layer[c].is_none() {
                queue.push_back(c);
            }
        }
    }

    let mut result = LayeredLayout::default();
    for v in order {
        let depth = layer[v].unwrap_or(0);
        if result.layers.len() <= depth {
            result.layers.resize_with(depth + 1, Vec::new);
        }
        let slot = result.layers[depth].len();
        result.layers[depth].push(ids[v].to_string());
        result.nodes.insert(
            ids[v].to_string(),
            LayoutNode {
                id: ids[v].to_string(),
                layer: depth,
                order: slot,
            },
        );
    }
    result
}
