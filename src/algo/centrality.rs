//! Centrality and influence analysis
//!
//! Degree, betweenness and closeness are computed on hop distances over the
//! unweighted projection. The influence score is their arithmetic mean.

use super::{build_view, Weighting};
use crate::graph::{GraphError, GraphResult, SocialGraph, UserId};
use indexmap::IndexMap;
use kyn_graph_algorithms::{
    betweenness_centrality, closeness_centrality, degree_centrality, NodeId as AlgoNodeId,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::debug;

/// Normalized centralities of one user, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CentralityMetrics {
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
}

impl CentralityMetrics {
    /// Mean of the three centralities, in [0, 1]
    pub fn influence_score(&self) -> f64 {
        (self.degree + self.betweenness + self.closeness) / 3.0
    }
}

/// Per-user centralities in graph insertion order
pub type CentralityMap = IndexMap<UserId, CentralityMetrics>;

/// Compute degree, betweenness and closeness for every user
pub fn analyze_centrality(graph: &SocialGraph) -> CentralityMap {
    let started = Instant::now();
    let view = build_view(graph, Weighting::Unweighted);

    let degree = degree_centrality(&view);
    let betweenness = betweenness_centrality(&view);
    let closeness = closeness_centrality(&view);

    let map: CentralityMap = graph
        .user_ids()
        .enumerate()
        .map(|(idx, id)| {
            let node = idx as AlgoNodeId;
            let metrics = CentralityMetrics {
                degree: degree.get(&node).copied().unwrap_or(0.0),
                betweenness: betweenness.get(&node).copied().unwrap_or(0.0),
                closeness: closeness.get(&node).copied().unwrap_or(0.0),
            };
            (id.clone(), metrics)
        })
        .collect();

    debug!(
        users = map.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Computed centrality"
    );
    map
}

/// Influence score of one user from precomputed centralities
pub fn influence_score(user: &UserId, metrics: &CentralityMap) -> GraphResult<f64> {
    metrics
        .get(user)
        .map(CentralityMetrics::influence_score)
        .ok_or_else(|| GraphError::UserNotFound(user.clone()))
}

/// A user's position in the influence ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceRank {
    /// 1-based
    pub rank: usize,
    pub user: UserId,
    pub influence_score: f64,
    pub metrics: CentralityMetrics,
}

impl InfluenceRank {
    /// Score on a 0-100 scale
    pub fn as_percentage(&self) -> f64 {
        self.influence_score * 100.0
    }
}

/// Rank every user by influence, highest first, ties by user id
pub fn rank_influencers(metrics: &CentralityMap) -> Vec<InfluenceRank> {
    let mut scored: Vec<(&UserId, &CentralityMetrics, f64)> = metrics
        .iter()
        .map(|(user, m)| (user, m, m.influence_score()))
        .collect();
    scored.sort_by(|a, b| by_score_then_id(a.2, a.0, b.2, b.0));

    scored
        .into_iter()
        .enumerate()
        .map(|(pos, (user, m, score))| InfluenceRank {
            rank: pos + 1,
            user: user.clone(),
            influence_score: score,
            metrics: *m,
        })
        .collect()
}

/// The `limit` most influential users of `graph`
pub fn top_influencers(graph: &SocialGraph, limit: usize) -> Vec<InfluenceRank> {
    let mut ranking = rank_influencers(&analyze_centrality(graph));
    ranking.truncate(limit);
    ranking
}

/// One user's centralities, influence and rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfluence {
    pub user: UserId,
    pub metrics: CentralityMetrics,
    pub influence_score: f64,
    pub rank: usize,
    pub total_users: usize,
}

impl UserInfluence {
    pub fn as_percentage(&self) -> f64 {
        self.influence_score * 100.0
    }
}

/// Influence report for one user
pub fn user_influence(graph: &SocialGraph, user: &UserId) -> GraphResult<UserInfluence> {
    if !graph.contains_user(user) {
        return Err(GraphError::UserNotFound(user.clone()));
    }
    let metrics = analyze_centrality(graph);
    user_influence_from(&metrics, user)
}

pub(crate) fn user_influence_from(
    metrics: &CentralityMap,
    user: &UserId,
) -> GraphResult<UserInfluence> {
    let ranking = rank_influencers(metrics);
    ranking
        .iter()
        .find(|r| &r.user == user)
        .map(|r| UserInfluence {
            user: r.user.clone(),
            metrics: r.metrics,
            influence_score: r.influence_score,
            rank: r.rank,
            total_users: ranking.len(),
        })
        .ok_or_else(|| GraphError::UserNotFound(user.clone()))
}

fn by_score_then_id(score_a: f64, id_a: &UserId, score_b: f64, id_b: &UserId) -> Ordering {
    score_b.total_cmp(&score_a).then_with(|| id_a.cmp(id_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Interaction, User};

    fn star() -> SocialGraph {
        let mut graph = SocialGraph::new();
        for id in ["hub", "a", "b", "c", "d"] {
            graph.add_user(User::new(id));
        }
        for leaf in ["a", "b", "c", "d"] {
            graph.add_interaction(Interaction::new("hub", leaf)).unwrap();
        }
        graph
    }

    #[test]
    fn test_star_center() {
        let metrics = analyze_centrality(&star());
        let hub = metrics[&UserId::from("hub")];
        assert!((hub.degree - 1.0).abs() < 1e-12);
        assert!((hub.betweenness - 1.0).abs() < 1e-12);
        assert!((hub.closeness - 1.0).abs() < 1e-12);
        assert!((hub.influence_score() - 1.0).abs() < 1e-12);

        let leaf = metrics[&UserId::from("a")];
        assert!((leaf.degree - 0.25).abs() < 1e-12);
        assert_eq!(leaf.betweenness, 0.0);
        // distances 1 + 2 + 2 + 2 = 7 to the four other nodes
        assert!((leaf.closeness - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_ranking_breaks_ties_by_id() {
        let ranking = rank_influencers(&analyze_centrality(&star()));
        let order: Vec<&str> = ranking.iter().map(|r| r.user.as_str()).collect();
        assert_eq!(order, vec!["hub", "a", "b", "c", "d"]);
        assert_eq!(ranking[0].rank, 1);
        assert!((ranking[0].as_percentage() - 100.0).abs() < 1e-9);
        for pair in ranking.windows(2) {
            assert!(pair[0].influence_score >= pair[1].influence_score);
        }
    }

    #[test]
    fn test_influence_score_unknown_user() {
        let metrics = analyze_centrality(&star());
        assert!((influence_score(&UserId::from("hub"), &metrics).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            influence_score(&UserId::from("nobody"), &metrics),
            Err(GraphError::UserNotFound(UserId::from("nobody")))
        );
    }

    #[test]
    fn test_user_influence_and_top() {
        let graph = star();
        let report = user_influence(&graph, &UserId::from("c")).unwrap();
        assert_eq!(report.rank, 4);
        assert_eq!(report.total_users, 5);

        let top = top_influencers(&graph, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user.as_str(), "hub");

        assert!(user_influence(&graph, &UserId::from("zz")).is_err());
    }

    #[test]
    fn test_small_graphs_score_zero_betweenness() {
        let mut graph = SocialGraph::new();
        graph.add_user(User::new("a"));
        graph.add_user(User::new("b"));
        graph.add_interaction(Interaction::new("a", "b")).unwrap();
        let metrics = analyze_centrality(&graph);
        assert!(metrics.values().all(|m| m.betweenness == 0.0));
        assert!(metrics.values().all(|m| (m.degree - 1.0).abs() < 1e-12));
    }
}
