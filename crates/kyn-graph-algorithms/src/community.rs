//! Connected components
//!
//! Union-find over the undirected view; feeds the structural metrics.

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

/// Result of the connected components algorithm
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComponentResult {
    /// Components as NodeId lists, largest first (ties: earliest member index)
    pub components: Vec<Vec<NodeId>>,
    /// Map of NodeId -> position in `components`
    pub node_component: HashMap<NodeId, usize>,
}

impl ComponentResult {
    /// Number of components
    pub fn count(&self) -> usize {
        self.components.len()
    }

    /// Size of the largest component (0 for an empty graph)
    pub fn largest_size(&self) -> usize {
        self.components.first().map_or(0, Vec::len)
    }

    /// Component sizes, largest first
    pub fn sizes(&self) -> Vec<usize> {
        self.components.iter().map(Vec::len).collect()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        // Path halving
        let mut i = i;
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Connected components of the undirected view.
///
/// Members of each component appear in dense index order.
pub fn connected_components(view: &GraphView) -> ComponentResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.neighbors(u_idx) {
            if u_idx < v_idx {
                uf.union(u_idx, v_idx);
            }
        }
    }

    // Group by root, remembering first-seen order
    let mut root_slot: HashMap<usize, usize> = HashMap::new();
    let mut grouped: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = uf.find(i);
        let slot = *root_slot.entry(root).or_insert_with(|| {
            grouped.push(Vec::new());
            grouped.len() - 1
        });
        grouped[slot].push(i);
    }

    // Stable sort keeps first-seen order among equal sizes
    grouped.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut node_component = HashMap::with_capacity(n);
    let components: Vec<Vec<NodeId>> = grouped
        .into_iter()
        .enumerate()
        .map(|(component_id, members)| {
            members
                .into_iter()
                .map(|idx| {
                    let node_id = view.index_to_node[idx];
                    node_component.insert(node_id, component_id);
                    node_id
                })
                .collect()
        })
        .collect();

    ComponentResult {
        components,
        node_component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        // Nodes: 1, 2, 3, 4, 5, 6
        // Edges: 1-2, 3-4-5, 6 (isolated)
        let view = GraphView::from_edges(
            vec![1, 2, 3, 4, 5, 6],
            &[(1, 2, 1.0), (3, 4, 1.0), (4, 5, 1.0)],
            false,
        );

        let result = connected_components(&view);

        assert_eq!(result.count(), 3);
        assert_eq!(result.largest_size(), 3);
        assert_eq!(result.sizes(), vec![3, 2, 1]);
        assert_eq!(result.components[0], vec![3, 4, 5]);

        let c1 = result.node_component[&1];
        let c2 = result.node_component[&2];
        assert_eq!(c1, c2);

        let c3 = result.node_component[&3];
        let c5 = result.node_component[&5];
        assert_eq!(c3, c5);
        assert_ne!(c1, c3);
        assert_eq!(result.node_component[&6], 2);
    }

    #[test]
    fn test_empty_view() {
        let view = GraphView::from_edges(vec![], &[], false);
        let result = connected_components(&view);
        assert_eq!(result.count(), 0);
        assert_eq!(result.largest_size(), 0);
    }
}
