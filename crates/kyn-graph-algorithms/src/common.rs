//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the undirected graph topology for
//! algorithm execution.

use rustc_hash::FxHashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of an undirected graph using Compressed Sparse Row (CSR) format.
///
/// Every undirected edge `{u, v}` is stored twice, once in the row of `u` and
/// once in the row of `v`. Parallel edges and self-loops are never stored;
/// callers collapse parallel interactions before building the view.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: FxHashMap<NodeId, usize>,

    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor indices
    pub targets: Vec<usize>,

    /// Edge weights: aligned with `targets`. `None` means every edge weighs 1.0
    pub weights: Option<Vec<f64>>,
}

impl GraphView {
    /// Build a view from a node list and an undirected edge list.
    ///
    /// Edges whose endpoints are not in `nodes`, self-loops, and edges with a
    /// non-positive weight are ignored. Neighbor rows keep the order in which
    /// edges were supplied. When `weighted` is false the weights are dropped.
    pub fn from_edges(nodes: Vec<NodeId>, edges: &[(NodeId, NodeId, f64)], weighted: bool) -> Self {
        let node_count = nodes.len();
        let mut node_to_index = FxHashMap::default();
        node_to_index.reserve(node_count);
        for (idx, &node_id) in nodes.iter().enumerate() {
            node_to_index.insert(node_id, idx);
        }

        let resolved: Vec<(usize, usize, f64)> = edges
            .iter()
            .filter_map(|&(u, v, w)| {
                let u_idx = *node_to_index.get(&u)?;
                let v_idx = *node_to_index.get(&v)?;
                if u_idx == v_idx || w <= 0.0 {
                    return None;
                }
                Some((u_idx, v_idx, w))
            })
            .collect();

        // Counting pass, then prefix sums
        let mut degree = vec![0usize; node_count];
        for &(u, v, _) in &resolved {
            degree[u] += 1;
            degree[v] += 1;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        let total = offsets[node_count];
        let mut targets = vec![0usize; total];
        let mut flat_weights = if weighted { Some(vec![0.0; total]) } else { None };
        let mut cursor: Vec<usize> = offsets[..node_count].to_vec();

        for &(u, v, w) in &resolved {
            for (from, to) in [(u, v), (v, u)] {
                let slot = cursor[from];
                targets[slot] = to;
                if let Some(ref mut wf) = flat_weights {
                    wf[slot] = w;
                }
                cursor[from] += 1;
            }
        }

        GraphView {
            node_count,
            index_to_node: nodes,
            node_to_index,
            offsets,
            targets,
            weights: flat_weights,
        }
    }

    /// Helper to create a GraphView from symmetric adjacency lists (test support)
    pub fn from_adjacency_list(adjacency: Vec<Vec<usize>>) -> Self {
        let node_count = adjacency.len();
        let index_to_node: Vec<NodeId> = (0..node_count as NodeId).collect();
        let mut edges = Vec::new();
        for (u, neighbors) in adjacency.iter().enumerate() {
            for &v in neighbors {
                if u < v {
                    edges.push((u as NodeId, v as NodeId, 1.0));
                }
            }
        }
        Self::from_edges(index_to_node, &edges, false)
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get neighbors of a node
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        &self.targets[start..end]
    }

    /// Get weights for the edges of a node
    pub fn weights(&self, idx: usize) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| {
            let start = self.offsets[idx];
            let end = self.offsets[idx + 1];
            &w[start..end]
        })
    }

    /// Iterate `(neighbor, weight)` pairs, substituting 1.0 in unweighted views
    pub fn weighted_neighbors(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let weights = self.weights(idx);
        self.neighbors(idx)
            .iter()
            .enumerate()
            .map(move |(i, &n)| (n, weights.map_or(1.0, |w| w[i])))
    }

    /// Sum of the weights of a node's edges (the degree in unweighted views)
    pub fn weighted_degree(&self, idx: usize) -> f64 {
        match self.weights(idx) {
            Some(w) => w.iter().sum(),
            None => self.degree(idx) as f64,
        }
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// Sum of all undirected edge weights (`m` in the modularity formula)
    pub fn total_weight(&self) -> f64 {
        match &self.weights {
            Some(w) => w.iter().sum::<f64>() / 2.0,
            None => self.edge_count() as f64,
        }
    }

    /// Dense index for a NodeId
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.node_to_index.get(&node).copied()
    }

    /// Whether an edge joins the two indices
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        let (small, other) = if self.degree(u) <= self.degree(v) { (u, v) } else { (v, u) };
        self.neighbors(small).contains(&other)
    }
}
