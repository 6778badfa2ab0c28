//! Connection and community recommendations

use super::community::Partition;
use super::{build_view, user_id_of, Weighting};
use crate::graph::{GraphError, GraphResult, SocialGraph, UserId};
use kyn_graph_algorithms::{jaccard_non_neighbors, NodeId as AlgoNodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Limits applied by the `_with` recommendation variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Keep at most this many connection suggestions
    pub max_connections: Option<usize>,
    /// Drop connection suggestions weaker than this
    pub min_connection_strength: f64,
    /// Keep at most this many community suggestions
    pub max_communities: Option<usize>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_connections: Some(10),
            min_connection_strength: 0.0,
            max_communities: Some(5),
        }
    }
}

/// A suggested connection for `user`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionRecommendation {
    pub user: UserId,
    pub candidate: UserId,
    /// Jaccard coefficient of the two neighbor sets
    pub strength: f64,
}

impl ConnectionRecommendation {
    pub fn strength_percentage(&self) -> f64 {
        self.strength * 100.0
    }
}

/// A community sharing interests with the subject user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityRecommendation {
    pub community_id: usize,
    pub shared_interest_count: usize,
    /// Shared tags, alphabetical
    pub shared_interests: Vec<String>,
}

/// Every user not yet connected to `user`, by Jaccard strength.
///
/// Sorted strongest first, ties by candidate id. Candidates with no common
/// neighbor are included with strength 0.
pub fn recommend_connections(
    graph: &SocialGraph,
    user: &UserId,
) -> GraphResult<Vec<ConnectionRecommendation>> {
    let source = graph
        .user_index(user)
        .ok_or_else(|| GraphError::UserNotFound(user.clone()))?;
    let view = build_view(graph, Weighting::Unweighted);

    let pairs = jaccard_non_neighbors(&view, source as AlgoNodeId)
        .ok_or_else(|| GraphError::UserNotFound(user.clone()))?;

    let mut recommendations: Vec<ConnectionRecommendation> = pairs
        .into_iter()
        .filter_map(|pair| {
            let candidate = user_id_of(graph, pair.node_b)?.clone();
            Some(ConnectionRecommendation {
                user: user.clone(),
                candidate,
                strength: pair.score,
            })
        })
        .collect();
    recommendations.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.candidate.cmp(&b.candidate))
    });

    debug!(user = %user, candidates = recommendations.len(), "Scored connection candidates");
    Ok(recommendations)
}

/// Connection suggestions filtered by strength and truncated
pub fn recommend_connections_with(
    graph: &SocialGraph,
    user: &UserId,
    config: &RecommendationConfig,
) -> GraphResult<Vec<ConnectionRecommendation>> {
    let mut recommendations = recommend_connections(graph, user)?;
    recommendations.retain(|r| r.strength >= config.min_connection_strength);
    if let Some(limit) = config.max_connections {
        recommendations.truncate(limit);
    }
    Ok(recommendations)
}

/// Communities whose members share interests with `user`.
///
/// The subject's own interests are left out of each community's interest
/// pool. Ranked by overlap size, ties by community id; communities with no
/// overlap are dropped.
pub fn recommend_communities(
    graph: &SocialGraph,
    partition: &Partition,
    user: &UserId,
) -> GraphResult<Vec<CommunityRecommendation>> {
    let subject = graph
        .user(user)
        .ok_or_else(|| GraphError::UserNotFound(user.clone()))?;
    if subject.interests.is_empty() {
        return Ok(Vec::new());
    }

    let mut recommendations: Vec<CommunityRecommendation> = partition
        .communities()
        .iter()
        .filter_map(|community| {
            let pool: BTreeSet<&str> = community
                .members
                .iter()
                .filter(|member| *member != user)
                .filter_map(|member| graph.user(member))
                .flat_map(|member| member.interests.iter().map(String::as_str))
                .collect();

            let shared: Vec<String> = subject
                .interests
                .iter()
                .filter(|tag| pool.contains(tag.as_str()))
                .cloned()
                .collect();
            if shared.is_empty() {
                return None;
            }
            Some(CommunityRecommendation {
                community_id: community.id,
                shared_interest_count: shared.len(),
                shared_interests: shared,
            })
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.shared_interest_count
            .cmp(&a.shared_interest_count)
            .then_with(|| a.community_id.cmp(&b.community_id))
    });
    Ok(recommendations)
}

/// Community suggestions truncated to `max_communities`
pub fn recommend_communities_with(
    graph: &SocialGraph,
    partition: &Partition,
    user: &UserId,
    config: &RecommendationConfig,
) -> GraphResult<Vec<CommunityRecommendation>> {
    let mut recommendations = recommend_communities(graph, partition, user)?;
    if let Some(limit) = config.max_communities {
        recommendations.truncate(limit);
    }
    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::community::detect_communities;
    use crate::graph::{Interaction, User};

    fn uid(s: &str) -> UserId {
        UserId::from(s)
    }

    fn square_with_tail() -> SocialGraph {
        // A-B, A-C, B-D, C-D, D-E
        let mut graph = SocialGraph::new();
        for id in ["A", "B", "C", "D", "E"] {
            graph.add_user(User::new(id));
        }
        for (a, b) in [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")] {
            graph.add_interaction(Interaction::new(a, b)).unwrap();
        }
        graph
    }

    #[test]
    fn test_connection_strengths() {
        let graph = square_with_tail();
        let recs = recommend_connections(&graph, &uid("A")).unwrap();
        let got: Vec<(&str, f64)> =
            recs.iter().map(|r| (r.candidate.as_str(), r.strength)).collect();

        // N(A) = {B, C}; N(D) = {B, C, E}; N(E) = {D}
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].0, "D");
        assert!((got[0].1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(got[1], ("E", 0.0));
    }

    #[test]
    fn test_connection_strength_is_symmetric() {
        let graph = square_with_tail();
        let from_a = recommend_connections(&graph, &uid("A")).unwrap();
        let from_d = recommend_connections(&graph, &uid("D")).unwrap();
        let a_to_d = from_a.iter().find(|r| r.candidate == uid("D")).unwrap();
        let d_to_a = from_d.iter().find(|r| r.candidate == uid("A")).unwrap();
        assert_eq!(a_to_d.strength, d_to_a.strength);
    }

    #[test]
    fn test_connection_config_limits() {
        let graph = square_with_tail();
        let config = RecommendationConfig {
            max_connections: Some(5),
            min_connection_strength: 0.1,
            max_communities: None,
        };
        let recs = recommend_connections_with(&graph, &uid("A"), &config).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].candidate.as_str(), "D");
    }

    #[test]
    fn test_unknown_user() {
        let graph = square_with_tail();
        assert_eq!(
            recommend_connections(&graph, &uid("Z")).unwrap_err(),
            GraphError::UserNotFound(uid("Z"))
        );
        let partition = detect_communities(&graph);
        assert!(recommend_communities(&graph, &partition, &uid("Z")).is_err());
    }

    #[test]
    fn test_community_recommendation_by_interest() {
        let mut graph = SocialGraph::new();
        graph.add_user(User::new("U1").with_interests(["music", "tech"]));
        graph.add_user(User::new("M1").with_interests(["music", "art"]));
        graph.add_user(User::new("M2").with_interests(["music"]));
        graph.add_user(User::new("S1").with_interests(["sports"]));
        graph.add_user(User::new("S2").with_interests(["sports"]));
        graph.add_interaction(Interaction::new("M1", "M2")).unwrap();
        graph.add_interaction(Interaction::new("S1", "S2")).unwrap();

        let partition = detect_communities(&graph);
        let recs = recommend_communities(&graph, &partition, &uid("U1")).unwrap();

        assert_eq!(recs.len(), 1);
        let music = partition.community(recs[0].community_id).unwrap();
        assert!(music.contains(&uid("M1")));
        assert_eq!(recs[0].shared_interests, vec!["music".to_string()]);
        assert!(recs.iter().all(|r| r.shared_interest_count >= 1));
    }

    #[test]
    fn test_subject_interests_do_not_count() {
        let mut graph = SocialGraph::new();
        graph.add_user(User::new("U1").with_interests(["chess"]));
        graph.add_user(User::new("U2").with_interests(["golf"]));
        graph.add_interaction(Interaction::new("U1", "U2")).unwrap();

        let partition = detect_communities(&graph);
        assert!(recommend_communities(&graph, &partition, &uid("U1"))
            .unwrap()
            .is_empty());
    }
}
