//! Greedy modularity community detection
//!
//! Clauset–Newman–Moore agglomeration: every node starts in its own
//! community and the pair with the largest modularity gain is merged until no
//! merge increases Q.

use super::common::{GraphView, NodeId};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Result of greedy modularity detection
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModularityResult {
    /// Communities as NodeId lists, largest first. Members are in dense index order.
    pub communities: Vec<Vec<NodeId>>,
    /// Modularity of the returned partition
    pub modularity: f64,
    /// Number of merges performed
    pub merges: usize,
}

/// Heap entry for a candidate merge of communities `i < j`
#[derive(Copy, Clone, PartialEq)]
struct MergeCandidate {
    gain: f64,
    i: usize,
    j: usize,
}

impl Eq for MergeCandidate {}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on gain; equal gains pop the lowest (i, j) first
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| other.i.cmp(&self.i))
            .then_with(|| other.j.cmp(&self.j))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl MergeCandidate {
    fn new(gain: f64, a: usize, b: usize) -> Self {
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        MergeCandidate { gain, i, j }
    }
}

/// Greedy modularity maximization (CNM).
///
/// Uses the view's weights when present. The lower-indexed community survives
/// each merge, so results are deterministic for a fixed node order. Isolated
/// nodes stay singletons. An empty view yields no communities and Q = 0.
pub fn greedy_modularity_communities(view: &GraphView) -> ModularityResult {
    let n = view.node_count;
    if n == 0 {
        return ModularityResult {
            communities: Vec::new(),
            modularity: 0.0,
            merges: 0,
        };
    }

    let m = view.total_weight();
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut merges = 0;

    if m > 0.0 {
        let two_m = 2.0 * m;
        // a[i]: fraction of edge ends attached to community i
        let mut a: Vec<f64> = (0..n).map(|i| view.weighted_degree(i) / two_m).collect();

        // dq[i][j] = 2 (e_ij - a_i a_j) for adjacent communities
        let mut dq: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for i in 0..n {
            for (j, w) in view.weighted_neighbors(i) {
                *dq[i].entry(j).or_insert(0.0) += w / m;
            }
        }
        let mut heap = BinaryHeap::new();
        for i in 0..n {
            for (&j, gain) in dq[i].iter_mut() {
                *gain -= 2.0 * a[i] * a[j];
                if i < j {
                    heap.push(MergeCandidate::new(*gain, i, j));
                }
            }
        }

        let mut alive = vec![true; n];

        while let Some(candidate) = heap.pop() {
            let MergeCandidate { gain, i, j } = candidate;
            if !alive[i] || !alive[j] {
                continue;
            }
            // Stale entries no longer match the current gain
            match dq[i].get(&j) {
                Some(&current) if current == gain => {}
                _ => continue,
            }
            if gain <= 0.0 {
                break;
            }

            // Merge j into i
            let row_i = std::mem::take(&mut dq[i]);
            let row_j = std::mem::take(&mut dq[j]);

            let mut merged = BTreeMap::new();
            let mut keys: Vec<usize> = row_i.keys().chain(row_j.keys()).copied().collect();
            keys.sort_unstable();
            keys.dedup();

            for k in keys {
                if k == i || k == j {
                    continue;
                }
                let updated = match (row_i.get(&k), row_j.get(&k)) {
                    (Some(&ik), Some(&jk)) => ik + jk,
                    (Some(&ik), None) => ik - 2.0 * a[j] * a[k],
                    (None, Some(&jk)) => jk - 2.0 * a[i] * a[k],
                    (None, None) => continue,
                };
                merged.insert(k, updated);
                dq[k].remove(&j);
                dq[k].insert(i, updated);
                heap.push(MergeCandidate::new(updated, i, k));
            }

            dq[i] = merged;
            a[i] += a[j];
            a[j] = 0.0;
            let moved = std::mem::take(&mut members[j]);
            members[i].extend(moved);
            alive[j] = false;
            merges += 1;
        }
    }

    let mut groups: Vec<Vec<usize>> = members.into_iter().filter(|g| !g.is_empty()).collect();
    for group in groups.iter_mut() {
        group.sort_unstable();
    }
    // Largest first; ties by earliest member
    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let modularity = modularity_of_indices(view, &groups);
    let communities = groups
        .into_iter()
        .map(|g| g.into_iter().map(|idx| view.index_to_node[idx]).collect())
        .collect();

    ModularityResult {
        communities,
        modularity,
        merges,
    }
}

/// Modularity Q of a partition given as NodeId lists.
///
/// Q = Σ_c [ L_c / m − (d_c / 2m)² ]. Nodes missing from every community are
/// scored as singletons. Returns 0 when the view has no edges.
pub fn modularity(view: &GraphView, communities: &[Vec<NodeId>]) -> f64 {
    let groups: Vec<Vec<usize>> = communities
        .iter()
        .map(|c| c.iter().filter_map(|&id| view.index_of(id)).collect())
        .collect();
    modularity_of_indices(view, &groups)
}

fn modularity_of_indices(view: &GraphView, groups: &[Vec<usize>]) -> f64 {
    let m = view.total_weight();
    if m <= 0.0 {
        return 0.0;
    }

    let n = view.node_count;
    let mut label: Vec<Option<usize>> = vec![None; n];
    for (c, group) in groups.iter().enumerate() {
        for &idx in group {
            label[idx] = Some(c);
        }
    }
    let mut next_label = groups.len();
    let label: Vec<usize> = label
        .into_iter()
        .map(|l| {
            l.unwrap_or_else(|| {
                next_label += 1;
                next_label - 1
            })
        })
        .collect();

    let mut degree_sum = vec![0.0; next_label];
    let mut internal = 0.0;
    for u in 0..n {
        degree_sum[label[u]] += view.weighted_degree(u);
        for (v, w) in view.weighted_neighbors(u) {
            if label[u] == label[v] {
                internal += w;
            }
        }
    }

    let two_m = 2.0 * m;
    // `internal` counts each intra-community edge from both ends
    let expected: f64 = degree_sum.iter().map(|d| (d / two_m) * (d / two_m)).sum();
    internal / two_m - expected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> GraphView {
        // 0-1-2 triangle, 3-4-5 triangle, no bridge
        GraphView::from_adjacency_list(vec![
            vec![1, 2],
            vec![0, 2],
            vec![0, 1],
            vec![4, 5],
            vec![3, 5],
            vec![3, 4],
        ])
    }

    #[test]
    fn test_disjoint_triangles_split() {
        let result = greedy_modularity_communities(&two_triangles());
        assert_eq!(result.communities, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert!((result.modularity - 0.5).abs() < 1e-9);
        assert_eq!(result.merges, 4);
    }

    #[test]
    fn test_bridged_triangles() {
        // Two triangles joined by 2-3
        let view = GraphView::from_adjacency_list(vec![
            vec![1, 2],
            vec![0, 2],
            vec![0, 1, 3],
            vec![2, 4, 5],
            vec![3, 5],
            vec![3, 4],
        ]);
        let result = greedy_modularity_communities(&view);
        assert_eq!(result.communities.len(), 2);
        // Q = 2 * (3/7 - (7/14)^2) = 5/14
        assert!((result.modularity - 5.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_nodes_are_singletons() {
        let view = GraphView::from_edges(vec![7, 8, 9], &[(7, 8, 1.0)], false);
        let result = greedy_modularity_communities(&view);
        assert_eq!(result.communities, vec![vec![7, 8], vec![9]]);
        assert!(result.modularity >= 0.0);
    }

    #[test]
    fn test_no_edges() {
        let view = GraphView::from_edges(vec![1, 2], &[], false);
        let result = greedy_modularity_communities(&view);
        assert_eq!(result.communities, vec![vec![1], vec![2]]);
        assert_eq!(result.modularity, 0.0);

        let empty = GraphView::from_edges(vec![], &[], false);
        let result = greedy_modularity_communities(&empty);
        assert!(result.communities.is_empty());
        assert_eq!(result.modularity, 0.0);
    }

    #[test]
    fn test_modularity_of_whole_graph_is_zero() {
        let view = two_triangles();
        let q = modularity(&view, &[vec![0, 1, 2, 3, 4, 5]]);
        assert!(q.abs() < 1e-12);

        let singletons: Vec<Vec<NodeId>> = (0..6).map(|i| vec![i]).collect();
        let q_single = modularity(&view, &singletons);
        // -Σ (2/12)^2 over six nodes
        assert!((q_single + 6.0 / 36.0).abs() < 1e-12);
        // Missing nodes behave as singletons
        assert!((modularity(&view, &[]) - q_single).abs() < 1e-12);
    }

    #[test]
    fn test_weights_shift_the_split() {
        // Path 0-1-2-3 where 0-1 and 2-3 are heavy
        let view = GraphView::from_edges(
            vec![0, 1, 2, 3],
            &[(0, 1, 10.0), (1, 2, 1.0), (2, 3, 10.0)],
            true,
        );
        let result = greedy_modularity_communities(&view);
        assert_eq!(result.communities, vec![vec![0, 1], vec![2, 3]]);
        assert!(result.modularity > 0.0);
    }
}
