//! Unweighted shortest paths
//!
//! Breadth-first traversals over the undirected view. Hop counts are the
//! distance measure for closeness and betweenness.

use super::common::GraphView;
use std::collections::VecDeque;

/// Hop distances from `source` to every node; `None` for unreachable nodes
pub fn bfs_distances(view: &GraphView, source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; view.node_count];
    if source >= view.node_count {
        return dist;
    }

    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        let next_dist = dist[current].map(|d| d + 1);
        for &next in view.neighbors(current) {
            if dist[next].is_none() {
                dist[next] = next_dist;
                queue.push_back(next);
            }
        }
    }

    dist
}
