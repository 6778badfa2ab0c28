//! Graph analytics module
//!
//! The algorithms live in the `kyn-graph-algorithms` crate and run over a
//! dense `GraphView`. This module projects a `SocialGraph` into that view and
//! maps results back to user ids.
//!
//! View node ids are the users' insertion positions, so dense index order and
//! graph insertion order coincide.

pub mod aggregate;
pub mod centrality;
pub mod community;
pub mod metrics;
pub mod recommend;
pub mod segment;

use crate::graph::{SocialGraph, UserId};
use kyn_graph_algorithms::{GraphView, NodeId as AlgoNodeId};
use serde::{Deserialize, Serialize};

pub use aggregate::{
    aggregate_active_communities, aggregate_interaction_trends, aggregate_trending_interests,
    community_insights, geographic_distribution, CommunityActivity, CommunityInsight,
    InteractionTrend, InterestCount, LocationCount, TopMember, TrendGranularity,
};
pub use centrality::{
    analyze_centrality, influence_score, rank_influencers, top_influencers, user_influence,
    CentralityMap, CentralityMetrics, InfluenceRank, UserInfluence,
};
pub use community::{
    detect_communities, detect_communities_with, modularity, Community, CommunityConfig, Partition,
};
pub use metrics::{calculate_graph_metrics, GraphMetrics};
pub use recommend::{
    recommend_communities, recommend_communities_with, recommend_connections,
    recommend_connections_with, CommunityRecommendation, ConnectionRecommendation,
    RecommendationConfig,
};
pub use segment::{
    interest_segmentation, interest_segmentation_with, InterestSegmentation, SegmentationConfig,
};

/// How edge strength enters the algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Every edge counts as 1, the same hop structure centrality and
    /// recommendations see
    #[default]
    Unweighted,
    /// Use each edge's summed interaction weight
    Weighted,
}

/// Build a GraphView over the whole graph for algorithm execution
pub fn build_view(graph: &SocialGraph, weighting: Weighting) -> GraphView {
    let nodes: Vec<AlgoNodeId> = (0..graph.node_count() as AlgoNodeId).collect();
    GraphView::from_edges(nodes, &indexed_edges(graph), weighting == Weighting::Weighted)
}

/// One induced view per community, in partition order.
///
/// Edges are bucketed by community in a single pass, so each view is built
/// from its own edges only. Edges between communities belong to no view.
pub fn build_community_views(
    graph: &SocialGraph,
    partition: &Partition,
    weighting: Weighting,
) -> Vec<GraphView> {
    let mut buckets: Vec<Vec<(AlgoNodeId, AlgoNodeId, f64)>> = vec![Vec::new(); partition.len()];
    for edge in graph.edges() {
        let (Some(a), Some(b)) = (
            partition.community_of(&edge.source),
            partition.community_of(&edge.target),
        ) else {
            continue;
        };
        if a.id != b.id {
            continue;
        }
        let (Some(u), Some(v)) = (graph.user_index(&edge.source), graph.user_index(&edge.target))
        else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(a.id - 1) {
            bucket.push((u as AlgoNodeId, v as AlgoNodeId, edge.weight as f64));
        }
    }

    partition
        .communities()
        .iter()
        .zip(buckets)
        .map(|(community, edges)| {
            let nodes: Vec<AlgoNodeId> = community
                .members
                .iter()
                .filter_map(|id| graph.user_index(id))
                .map(|i| i as AlgoNodeId)
                .collect();
            GraphView::from_edges(nodes, &edges, weighting == Weighting::Weighted)
        })
        .collect()
}

/// Resolve a view node id back to its user
pub fn user_id_of(graph: &SocialGraph, node: AlgoNodeId) -> Option<&UserId> {
    graph.user_at(node as usize).map(|u| &u.id)
}

fn indexed_edges(graph: &SocialGraph) -> Vec<(AlgoNodeId, AlgoNodeId, f64)> {
    graph
        .edges()
        .filter_map(|edge| {
            let u = graph.user_index(&edge.source)?;
            let v = graph.user_index(&edge.target)?;
            Some((u as AlgoNodeId, v as AlgoNodeId, edge.weight as f64))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Interaction, User};

    #[test]
    fn test_build_view_follows_insertion_order() {
        let mut graph = SocialGraph::new();
        for id in ["C", "A", "B"] {
            graph.add_user(User::new(id));
        }
        graph
            .add_interaction(Interaction::new("A", "C").with_weight(5))
            .unwrap();

        let view = build_view(&graph, Weighting::Weighted);
        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 1);
        assert_eq!(view.neighbors(0), &[1]);
        assert_eq!(view.weighted_degree(1), 5.0);
        assert_eq!(user_id_of(&graph, 1).map(UserId::as_str), Some("A"));

        let unweighted = build_view(&graph, Weighting::Unweighted);
        assert_eq!(unweighted.weighted_degree(1), 1.0);
    }

    #[test]
    fn test_community_views_keep_internal_edges() {
        let mut graph = SocialGraph::new();
        for id in ["A", "B", "C", "D", "E", "F", "G"] {
            graph.add_user(User::new(id));
        }
        let edges = [
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("D", "E"),
            ("E", "F"),
            ("F", "D"),
            ("C", "D"),
        ];
        for (a, b) in edges {
            graph.add_interaction(Interaction::new(a, b)).unwrap();
        }
        let partition = detect_communities(&graph);
        let views = build_community_views(&graph, &partition, Weighting::Unweighted);

        assert_eq!(views.len(), partition.len());
        let shapes: Vec<(usize, usize)> =
            views.iter().map(|v| (v.node_count, v.edge_count())).collect();
        assert_eq!(shapes, vec![(3, 3), (3, 3), (1, 0)]);
        assert_eq!(views[2].index_to_node, vec![6]);
    }
}
