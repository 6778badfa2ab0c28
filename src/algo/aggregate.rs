//! Aggregate tabulations over records, graph and partition

use super::community::Partition;
use super::{build_community_views, Weighting};
use crate::graph::{parse_timestamp, InteractionRecord, SocialGraph, UserId, UserRecord};
use chrono::NaiveDateTime;
use kyn_graph_algorithms::{
    betweenness_centrality, closeness_centrality, degree_centrality, GraphView,
    NodeId as AlgoNodeId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterestCount {
    pub interest: String,
    pub count: usize,
}

/// Interest tag frequencies across valid user records.
///
/// A tag counts once per user. Records sharing an id count as the last valid
/// one, the same record the graph keeps. Most frequent first, ties alphabetical.
pub fn aggregate_trending_interests(users: &[UserRecord]) -> Vec<InterestCount> {
    let mut latest: HashMap<UserId, BTreeSet<String>> = HashMap::new();
    for user in users.iter().filter_map(|r| r.validate().ok()) {
        latest.insert(user.id, user.interests);
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for tag in latest.into_values().flatten() {
        *counts.entry(tag).or_insert(0) += 1;
    }
    sorted_counts(counts)
        .into_iter()
        .map(|(interest, count)| InterestCount { interest, count })
        .collect()
}

/// Time bucket size for interaction trends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendGranularity {
    Hour,
    #[default]
    Day,
    Month,
}

impl TrendGranularity {
    /// Bucket key: `YYYY-MM-DDTHH`, `YYYY-MM-DD` or `YYYY-MM`
    pub fn bucket(&self, at: &NaiveDateTime) -> String {
        let format = match self {
            TrendGranularity::Hour => "%Y-%m-%dT%H",
            TrendGranularity::Day => "%Y-%m-%d",
            TrendGranularity::Month => "%Y-%m",
        };
        at.format(format).to_string()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendGranularity::Hour => "hour",
            TrendGranularity::Day => "day",
            TrendGranularity::Month => "month",
        }
    }
}

impl fmt::Display for TrendGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" => Ok(TrendGranularity::Hour),
            "day" | "daily" => Ok(TrendGranularity::Day),
            "month" | "monthly" => Ok(TrendGranularity::Month),
            other => Err(format!("unknown granularity '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionTrend {
    pub bucket: String,
    pub count: usize,
}

/// Interaction records per time bucket, oldest bucket first.
///
/// Records without a parseable timestamp are not counted.
pub fn aggregate_interaction_trends(
    interactions: &[InteractionRecord],
    granularity: TrendGranularity,
) -> Vec<InteractionTrend> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for at in interactions
        .iter()
        .filter_map(|r| r.timestamp.as_deref())
        .filter_map(parse_timestamp)
    {
        *buckets.entry(granularity.bucket(&at)).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(bucket, count)| InteractionTrend { bucket, count })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityActivity {
    pub community_id: usize,
    pub size: usize,
    /// Sum of edge weights inside the community, saturating
    pub activity_score: u64,
    /// Interaction records collapsed onto those edges
    pub interaction_count: u64,
    pub internal_edges: usize,
}

/// Communities ranked by the interaction weight of their induced subgraph.
///
/// Highest score first, ties by community id.
pub fn aggregate_active_communities(
    graph: &SocialGraph,
    partition: &Partition,
) -> Vec<CommunityActivity> {
    let mut activity: Vec<CommunityActivity> = partition
        .communities()
        .iter()
        .map(|c| CommunityActivity {
            community_id: c.id,
            size: c.size(),
            activity_score: 0,
            interaction_count: 0,
            internal_edges: 0,
        })
        .collect();

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
        if let Some(entry) = activity.get_mut(a.id - 1) {
            entry.activity_score = entry.activity_score.saturating_add(edge.weight);
            entry.interaction_count = entry
                .interaction_count
                .saturating_add(u64::from(edge.interaction_count));
            entry.internal_edges += 1;
        }
    }

    activity.sort_by(|x, y| {
        y.activity_score
            .cmp(&x.activity_score)
            .then_with(|| x.community_id.cmp(&y.community_id))
    });
    activity
}

/// The highest scoring member for one centrality measure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMember {
    pub user: UserId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityInsight {
    pub community_id: usize,
    pub size: usize,
    pub top_degree: Option<TopMember>,
    pub top_betweenness: Option<TopMember>,
    pub top_closeness: Option<TopMember>,
    /// Purely alphabetic interest tags of the members, most frequent first
    pub interest_distribution: Vec<InterestCount>,
}

/// Key members and interests of every community.
///
/// Centralities are computed on each community's induced subgraph; the
/// top member is the highest scorer, ties by user id. A singleton's only
/// member tops every measure with score 0.
pub fn community_insights(graph: &SocialGraph, partition: &Partition) -> Vec<CommunityInsight> {
    let views = build_community_views(graph, partition, Weighting::Unweighted);
    partition
        .communities()
        .iter()
        .zip(views)
        .map(|(community, view)| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for user in community.members.iter().filter_map(|id| graph.user(id)) {
                for tag in user.interests.iter().filter(|t| is_word(t)) {
                    *counts.entry(tag.clone()).or_insert(0) += 1;
                }
            }

            let (top_degree, top_betweenness, top_closeness) = if community.size() == 1 {
                let only = community.members.first().map(|user| TopMember {
                    user: user.clone(),
                    score: 0.0,
                });
                (only.clone(), only.clone(), only)
            } else {
                (
                    top_member(graph, &view, degree_centrality),
                    top_member(graph, &view, betweenness_centrality),
                    top_member(graph, &view, closeness_centrality),
                )
            };

            CommunityInsight {
                community_id: community.id,
                size: community.size(),
                top_degree,
                top_betweenness,
                top_closeness,
                interest_distribution: sorted_counts(counts)
                    .into_iter()
                    .map(|(interest, count)| InterestCount { interest, count })
                    .collect(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

/// Users per location, most populated first, ties by name.
///
/// Users without a location are not counted.
pub fn geographic_distribution(graph: &SocialGraph) -> Vec<LocationCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for location in graph
        .users()
        .filter_map(|u| u.location.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        *counts.entry(location.to_string()).or_insert(0) += 1;
    }
    sorted_counts(counts)
        .into_iter()
        .map(|(location, count)| LocationCount { location, count })
        .collect()
}

fn top_member<F>(graph: &SocialGraph, view: &GraphView, measure: F) -> Option<TopMember>
where
    F: Fn(&GraphView) -> HashMap<AlgoNodeId, f64>,
{
    measure(view)
        .into_iter()
        .filter_map(|(node, score)| {
            let user = graph.user_at(node as usize)?;
            Some(TopMember {
                user: user.id.clone(),
                score,
            })
        })
        .min_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.user.cmp(&b.user)))
}

fn is_word(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(char::is_alphabetic)
}

fn sorted_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::community::detect_communities;
    use crate::graph::{Interaction, User};

    #[test]
    fn test_trending_interests() {
        let users = vec![
            UserRecord::new("U1").with_interests(["music", "tech", "music"]),
            UserRecord::new("U2").with_interests(["tech", " art "]),
            UserRecord::default().with_interests(["tech"]),
            UserRecord::new("U3").with_interests(["art", ""]),
        ];
        let trending = aggregate_trending_interests(&users);
        let got: Vec<(&str, usize)> =
            trending.iter().map(|t| (t.interest.as_str(), t.count)).collect();
        assert_eq!(got, vec![("art", 2), ("tech", 2), ("music", 1)]);
    }

    #[test]
    fn test_trending_counts_replaced_users_once() {
        let users = vec![
            UserRecord::new("U1").with_interests(["music", "tech"]),
            UserRecord::new("U2").with_interests(["music"]),
            UserRecord::new("U1").with_interests(["music"]),
            UserRecord::new("U2").with_interests(["golf"]).with_age(-1),
        ];
        let trending = aggregate_trending_interests(&users);
        let got: Vec<(&str, usize)> =
            trending.iter().map(|t| (t.interest.as_str(), t.count)).collect();
        assert_eq!(got, vec![("music", 2)]);
    }

    #[test]
    fn test_interaction_trends_by_granularity() {
        let interactions = vec![
            InteractionRecord::new("A", "B").with_timestamp("2024-03-01T10:15:00"),
            InteractionRecord::new("A", "B").with_timestamp("2024-03-01 22:00:00"),
            InteractionRecord::new("A", "B").with_timestamp("2024-02-28"),
            InteractionRecord::new("A", "B").with_timestamp("2024-03-05T01:00:00Z"),
            InteractionRecord::new("A", "B").with_timestamp("yesterday"),
            InteractionRecord::new("A", "B"),
        ];

        let daily = aggregate_interaction_trends(&interactions, TrendGranularity::Day);
        let got: Vec<(&str, usize)> = daily.iter().map(|t| (t.bucket.as_str(), t.count)).collect();
        assert_eq!(got, vec![("2024-02-28", 1), ("2024-03-01", 2), ("2024-03-05", 1)]);

        let monthly = aggregate_interaction_trends(&interactions, TrendGranularity::Month);
        let got: Vec<(&str, usize)> =
            monthly.iter().map(|t| (t.bucket.as_str(), t.count)).collect();
        assert_eq!(got, vec![("2024-02", 1), ("2024-03", 3)]);

        let hourly = aggregate_interaction_trends(&interactions, TrendGranularity::Hour);
        assert_eq!(hourly.len(), 4);
        assert_eq!(hourly[1].bucket, "2024-03-01T10");
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("Monthly".parse::<TrendGranularity>(), Ok(TrendGranularity::Month));
        assert_eq!(" hour".parse::<TrendGranularity>(), Ok(TrendGranularity::Hour));
        assert!("weekly".parse::<TrendGranularity>().is_err());
        assert_eq!(TrendGranularity::default(), TrendGranularity::Day);
    }

    fn two_groups() -> SocialGraph {
        let mut graph = SocialGraph::new();
        graph.add_user(User::new("A").with_interests(["music", "sci-fi"]).with_location("Lagos"));
        graph.add_user(User::new("B").with_interests(["music"]).with_location("Lagos"));
        graph.add_user(User::new("C").with_interests(["art"]).with_location("Accra"));
        graph.add_user(User::new("D").with_interests(["golf"]));
        graph.add_user(User::new("E").with_interests(["golf"]).with_location(" "));
        graph.add_user(User::new("F"));
        let edges = [
            ("A", "B", 3),
            ("B", "C", 1),
            ("C", "A", 1),
            ("D", "E", 4),
            ("E", "F", 4),
            ("F", "D", 4),
        ];
        for (a, b, w) in edges {
            graph.add_interaction(Interaction::new(a, b).with_weight(w)).unwrap();
        }
        graph
    }

    #[test]
    fn test_active_communities() {
        let graph = two_groups();
        let partition = detect_communities(&graph);
        let active = aggregate_active_communities(&graph, &partition);

        assert_eq!(active.len(), 2);
        assert_eq!(active[0].activity_score, 12);
        assert_eq!(active[0].internal_edges, 3);
        assert_eq!(active[1].activity_score, 5);
        let top = partition.community(active[0].community_id).unwrap();
        assert!(top.contains(&UserId::from("D")));
    }

    #[test]
    fn test_activity_score_saturates() {
        let mut graph = SocialGraph::new();
        for id in ["A", "B", "C"] {
            graph.add_user(User::new(id));
        }
        let heavy = i64::MAX as u64;
        for (a, b) in [("A", "B"), ("B", "C"), ("C", "A")] {
            graph.add_interaction(Interaction::new(a, b).with_weight(heavy)).unwrap();
        }
        let partition = detect_communities(&graph);
        let active = aggregate_active_communities(&graph, &partition);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].activity_score, u64::MAX);
        assert_eq!(active[0].interaction_count, 3);
    }

    #[test]
    fn test_community_insights() {
        let graph = two_groups();
        let partition = detect_communities(&graph);
        let insights = community_insights(&graph, &partition);
        assert_eq!(insights.len(), 2);

        let first = &insights[0];
        assert_eq!(first.size, 3);
        // Triangle: every member ties, lowest id wins
        assert_eq!(first.top_degree.as_ref().map(|t| t.user.as_str()), Some("A"));
        assert_eq!(first.top_closeness.as_ref().map(|t| t.user.as_str()), Some("A"));
        let tags: Vec<(&str, usize)> = first
            .interest_distribution
            .iter()
            .map(|i| (i.interest.as_str(), i.count))
            .collect();
        assert_eq!(tags, vec![("music", 2), ("art", 1)]);
    }

    #[test]
    fn test_insights_with_many_singletons() {
        let mut graph = two_groups();
        for i in 0..500 {
            graph.add_user(User::new(format!("loner{:03}", i)).with_interests(["chess"]));
        }
        let partition = detect_communities(&graph);
        let insights = community_insights(&graph, &partition);
        assert_eq!(insights.len(), 502);

        assert_eq!(insights[0].top_degree.as_ref().map(|t| t.user.as_str()), Some("A"));
        assert_eq!(insights[1].size, 3);

        let loner = &insights[2];
        assert_eq!(loner.size, 1);
        let top = loner.top_betweenness.as_ref().unwrap();
        assert_eq!(top.user.as_str(), "loner000");
        assert_eq!(top.score, 0.0);
        assert_eq!(loner.top_closeness, loner.top_degree);
        assert_eq!(loner.interest_distribution[0].interest, "chess");
    }

    #[test]
    fn test_geographic_distribution() {
        let dist = geographic_distribution(&two_groups());
        let got: Vec<(&str, usize)> = dist.iter().map(|l| (l.location.as_str(), l.count)).collect();
        assert_eq!(got, vec![("Lagos", 2), ("Accra", 1)]);
    }
}
