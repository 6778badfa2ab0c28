//! Centrality algorithms: Degree, Betweenness (Brandes), Closeness.
//!
//! All measures treat the view as undirected and unweighted (hop distances)
//! and are normalized to [0, 1].

use super::common::{GraphView, NodeId};
use super::pathfinding::bfs_distances;
use std::collections::{HashMap, VecDeque};

/// Degree centrality: `degree / (N - 1)`; 0 for every node when N <= 1.
pub fn degree_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let mut result = HashMap::with_capacity(n);
    if n <= 1 {
        for &node in &view.index_to_node {
            result.insert(node, 0.0);
        }
        return result;
    }

    let denom = (n - 1) as f64;
    for idx in 0..n {
        result.insert(view.index_to_node[idx], view.degree(idx) as f64 / denom);
    }
    result
}

/// Betweenness centrality via Brandes' algorithm.
///
/// Normalized by `(N-1)(N-2)/2`, the number of node pairs excluding the node
/// itself. All scores are 0 when N <= 2.
pub fn betweenness_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let mut bc = vec![0.0_f64; n];

    if n > 2 {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n]; // number of shortest paths
        let mut dist = vec![-1i64; n];
        let mut delta = vec![0.0_f64; n];
        let mut queue = VecDeque::new();

        for s in 0..n {
            stack.clear();
            for p in predecessors.iter_mut() {
                p.clear();
            }
            sigma.iter_mut().for_each(|x| *x = 0.0);
            dist.iter_mut().for_each(|d| *d = -1);
            delta.iter_mut().for_each(|d| *d = 0.0);

            sigma[s] = 1.0;
            dist[s] = 0;
            queue.push_back(s);

            while let Some(v) = queue.pop_front() {
                stack.push(v);
                for &w in view.neighbors(v) {
                    if dist[w] < 0 {
                        queue.push_back(w);
                        dist[w] = dist[v] + 1;
                    }
                    if dist[w] == dist[v] + 1 {
                        sigma[w] += sigma[v];
                        predecessors[w].push(v);
                    }
                }
            }

            // Back-propagation
            while let Some(w) = stack.pop() {
                for &v in &predecessors[w] {
                    delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                }
                if w != s {
                    bc[w] += delta[w];
                }
            }
        }

        // Every undirected pair was counted from both ends
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for b in bc.iter_mut() {
            *b *= scale;
        }
    }

    view.index_to_node.iter().copied().zip(bc).collect()
}

/// Closeness centrality with the Wasserman–Faust correction.
///
/// `(r - 1) / Σ d(u, v)` over the `r` nodes reachable from `u` (including
/// `u`), scaled by `(r - 1) / (N - 1)` so nodes in small components are
/// penalized. Isolated nodes score 0.
pub fn closeness_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let mut result = HashMap::with_capacity(n);

    for u in 0..n {
        let dist = bfs_distances(view, u);
        let (reachable, total) = dist
            .iter()
            .flatten()
            .fold((0usize, 0usize), |(r, t), &d| (r + 1, t + d));

        let closeness = if total > 0 && n > 1 {
            let others = (reachable - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        } else {
            0.0
        };
        result.insert(view.index_to_node[u], closeness);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star() -> GraphView {
        // Center 0 with leaves 1..=4
        GraphView::from_adjacency_list(vec![
            vec![1, 2, 3, 4],
            vec![0],
            vec![0],
            vec![0],
            vec![0],
        ])
    }

    fn path4() -> GraphView {
        GraphView::from_adjacency_list(vec![vec![1], vec![0, 2], vec![1, 3], vec![2]])
    }

    #[test]
    fn test_degree_centrality() {
        let scores = degree_centrality(&star());
        assert_eq!(scores[&0], 1.0);
        assert_eq!(scores[&1], 0.25);

        let single = GraphView::from_adjacency_list(vec![vec![]]);
        assert_eq!(degree_centrality(&single)[&0], 0.0);
    }

    #[test]
    fn test_betweenness_star() {
        let scores = betweenness_centrality(&star());
        assert!((scores[&0] - 1.0).abs() < 1e-12);
        for leaf in 1..=4 {
            assert_eq!(scores[&leaf], 0.0);
        }
    }

    #[test]
    fn test_betweenness_path() {
        // Inner nodes of a 4-path each sit on 2 of the 3 pairs that exclude them
        let scores = betweenness_centrality(&path4());
        assert!((scores[&1] - 2.0 / 3.0).abs() < 1e-12);
        assert!((scores[&2] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(scores[&0], 0.0);
    }

    #[test]
    fn test_betweenness_small_graphs_are_zero() {
        let pair = GraphView::from_adjacency_list(vec![vec![1], vec![0]]);
        let scores = betweenness_centrality(&pair);
        assert_eq!(scores[&0], 0.0);
        assert_eq!(scores[&1], 0.0);
    }

    #[test]
    fn test_closeness_path() {
        let scores = closeness_centrality(&path4());
        // End node: distances 1 + 2 + 3
        assert!((scores[&0] - 0.5).abs() < 1e-12);
        // Inner node: distances 1 + 1 + 2
        assert!((scores[&1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_closeness_disconnected_penalty() {
        // 0-1 and 2 isolated
        let view = GraphView::from_adjacency_list(vec![vec![1], vec![0], vec![]]);
        let scores = closeness_centrality(&view);
        // (1/1) * (1/2)
        assert!((scores[&0] - 0.5).abs() < 1e-12);
        assert_eq!(scores[&2], 0.0);
    }
}
