//! Node similarity: Jaccard over neighbor sets.

use super::common::{GraphView, NodeId};
use rustc_hash::FxHashSet;

/// A scored pair of nodes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimilarityPair {
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub score: f64,
}

/// Jaccard similarity `|N(u) ∩ N(v)| / |N(u) ∪ N(v)|` between two indices.
///
/// Returns 0 when both neighbor sets are empty.
pub fn jaccard(view: &GraphView, u: usize, v: usize) -> f64 {
    let (small, large) = if view.degree(u) <= view.degree(v) { (u, v) } else { (v, u) };
    let large_set: FxHashSet<usize> = view.neighbors(large).iter().copied().collect();
    let intersection = view
        .neighbors(small)
        .iter()
        .filter(|n| large_set.contains(*n))
        .count();
    ratio(intersection, view.degree(u) + view.degree(v) - intersection)
}

/// Jaccard similarity between `source` and every node not adjacent to it.
///
/// The source itself is excluded. Pairs are returned in dense index order of
/// the candidate; `None` when `source` is not in the view.
pub fn jaccard_non_neighbors(view: &GraphView, source: NodeId) -> Option<Vec<SimilarityPair>> {
    let s = view.index_of(source)?;
    let source_set: FxHashSet<usize> = view.neighbors(s).iter().copied().collect();
    let source_degree = source_set.len();

    let mut pairs = Vec::with_capacity(view.node_count.saturating_sub(source_degree + 1));
    for candidate in 0..view.node_count {
        if candidate == s || source_set.contains(&candidate) {
            continue;
        }
        let intersection = view
            .neighbors(candidate)
            .iter()
            .filter(|n| source_set.contains(*n))
            .count();
        let union = source_degree + view.degree(candidate) - intersection;
        pairs.push(SimilarityPair {
            node_a: source,
            node_b: view.index_to_node[candidate],
            score: ratio(intersection, union),
        });
    }

    Some(pairs)
}

fn ratio(intersection: usize, union: usize) -> f64 {
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
