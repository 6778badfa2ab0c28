//! Community detection over the social graph
//!
//! Runs greedy modularity maximization on the CSR projection and maps the
//! resulting index groups back to user ids.

use super::{build_view, user_id_of, Weighting};
use crate::graph::{SocialGraph, UserId};
use indexmap::IndexSet;
use kyn_graph_algorithms::{greedy_modularity_communities, NodeId as AlgoNodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

/// Community detection settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    pub weighting: Weighting,
}

/// One community of a partition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Community {
    /// 1-based position in the partition
    pub id: usize,
    /// Members in graph insertion order
    pub members: IndexSet<UserId>,
}

impl Community {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }
}

/// A partition of every user into disjoint communities
///
/// Communities are ordered by size (largest first), ties by the insertion
/// position of their earliest member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    communities: Vec<Community>,
    modularity: f64,
    weighting: Weighting,
    #[serde(skip)]
    membership: HashMap<UserId, usize>,
}

impl Partition {
    fn new(communities: Vec<Community>, modularity: f64, weighting: Weighting) -> Self {
        let membership = communities
            .iter()
            .enumerate()
            .flat_map(|(pos, c)| c.members.iter().map(move |m| (m.clone(), pos)))
            .collect();
        Partition {
            communities,
            modularity,
            weighting,
            membership,
        }
    }

    /// The partition of an empty graph
    pub fn empty() -> Self {
        Partition::new(Vec::new(), 0.0, Weighting::default())
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    /// Community by 1-based id
    pub fn community(&self, id: usize) -> Option<&Community> {
        id.checked_sub(1).and_then(|pos| self.communities.get(pos))
    }

    pub fn community_of(&self, user: &UserId) -> Option<&Community> {
        self.membership
            .get(user)
            .and_then(|&pos| self.communities.get(pos))
    }

    pub fn modularity(&self) -> f64 {
        self.modularity
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Number of users assigned to some community
    pub fn covered_users(&self) -> usize {
        self.membership.len()
    }

    /// Member lists, for feeding back into `modularity`
    pub fn member_lists(&self) -> Vec<Vec<UserId>> {
        self.communities
            .iter()
            .map(|c| c.members.iter().cloned().collect())
            .collect()
    }
}

/// Detect communities on the unweighted graph
pub fn detect_communities(graph: &SocialGraph) -> Partition {
    detect_communities_with(graph, &CommunityConfig::default())
}

/// Detect communities with explicit settings
pub fn detect_communities_with(graph: &SocialGraph, config: &CommunityConfig) -> Partition {
    if graph.is_empty() {
        return Partition::new(Vec::new(), 0.0, config.weighting);
    }

    let started = Instant::now();
    let view = build_view(graph, config.weighting);
    let result = greedy_modularity_communities(&view);

    let communities: Vec<Community> = result
        .communities
        .iter()
        .enumerate()
        .map(|(pos, group)| Community {
            id: pos + 1,
            members: group
                .iter()
                .filter_map(|&node| user_id_of(graph, node).cloned())
                .collect(),
        })
        .collect();

    info!(
        communities = communities.len(),
        modularity = result.modularity,
        merges = result.merges,
        weighting = ?config.weighting,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Detected communities"
    );

    Partition::new(communities, result.modularity, config.weighting)
}

/// Modularity of an arbitrary grouping of users.
///
/// Unknown ids are ignored; users absent from every group count as
/// singletons. 0 for graphs without edges.
pub fn modularity(graph: &SocialGraph, communities: &[Vec<UserId>], weighting: Weighting) -> f64 {
    let view = build_view(graph, weighting);
    let groups: Vec<Vec<AlgoNodeId>> = communities
        .iter()
        .map(|group| {
            group
                .iter()
                .filter_map(|id| graph.user_index(id))
                .map(|idx| idx as AlgoNodeId)
                .collect()
        })
        .collect();
    kyn_graph_algorithms::modularity(&view, &groups)
}
