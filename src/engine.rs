//! Analytics engine facade
//!
//! Routes every analytics operation through the snapshot cache so repeated
//! requests over an unchanged dataset reuse the built graph, partition and
//! centralities.

use crate::algo::{
    self, CentralityMap, Community, CommunityActivity, CommunityInsight, CommunityRecommendation,
    ConnectionRecommendation, GraphMetrics, InfluenceRank, InteractionTrend, InterestCount,
    InterestSegmentation, LocationCount, Partition, UserInfluence,
};
use crate::cache::{AnalyticsCache, SnapshotKey};
use crate::config::{ConfigResult, EngineConfig};
use crate::graph::{
    BuildReport, Dataset, GraphError, GraphResult, Interaction, NodeLinkData, SocialGraph, UserId,
};
use std::sync::Arc;

#[derive(Debug)]
pub struct AnalyticsEngine {
    config: EngineConfig,
    cache: AnalyticsCache,
}

impl AnalyticsEngine {
    /// Create an engine after validating `config`
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        let cache = AnalyticsCache::new(config.cache.capacity);
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &AnalyticsCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AnalyticsCache {
        &mut self.cache
    }

    pub fn graph(&mut self, dataset: &Dataset) -> Arc<SocialGraph> {
        let key = SnapshotKey::for_dataset(dataset);
        self.cache.graph(&key, dataset)
    }

    pub fn build_report(&mut self, dataset: &Dataset) -> Arc<BuildReport> {
        let key = SnapshotKey::for_dataset(dataset);
        self.cache.report(&key, dataset)
    }

    pub fn metrics(&mut self, dataset: &Dataset) -> GraphMetrics {
        algo::calculate_graph_metrics(&self.graph(dataset))
    }

    pub fn communities(&mut self, dataset: &Dataset) -> Arc<Partition> {
        let key = SnapshotKey::for_dataset(dataset);
        self.cache.partition(&key, dataset, &self.config.community)
    }

    pub fn centrality(&mut self, dataset: &Dataset) -> Arc<CentralityMap> {
        let key = SnapshotKey::for_dataset(dataset);
        self.cache.centrality(&key, dataset)
    }

    /// Most influential users; `limit` defaults to `influence.top_k`
    pub fn top_influencers(
        &mut self,
        dataset: &Dataset,
        limit: Option<usize>,
    ) -> Vec<InfluenceRank> {
        let mut ranking = algo::rank_influencers(&self.centrality(dataset));
        ranking.truncate(limit.unwrap_or(self.config.influence.top_k));
        ranking
    }

    pub fn user_influence(
        &mut self,
        dataset: &Dataset,
        user: &UserId,
    ) -> GraphResult<UserInfluence> {
        algo::centrality::user_influence_from(&self.centrality(dataset), user)
    }

    /// Connection suggestions with the configured limits
    pub fn recommend_connections(
        &mut self,
        dataset: &Dataset,
        user: &UserId,
    ) -> GraphResult<Vec<ConnectionRecommendation>> {
        let graph = self.graph(dataset);
        algo::recommend_connections_with(&graph, user, &self.config.recommendation)
    }

    /// Community suggestions with the configured limits
    pub fn recommend_communities(
        &mut self,
        dataset: &Dataset,
        user: &UserId,
    ) -> GraphResult<Vec<CommunityRecommendation>> {
        let graph = self.graph(dataset);
        let partition = self.communities(dataset);
        algo::recommend_communities_with(&graph, &partition, user, &self.config.recommendation)
    }

    pub fn trending_interests(&self, dataset: &Dataset) -> Vec<InterestCount> {
        algo::aggregate_trending_interests(&dataset.users)
    }

    /// Interaction counts at the configured granularity
    pub fn interaction_trends(&self, dataset: &Dataset) -> Vec<InteractionTrend> {
        algo::aggregate_interaction_trends(&dataset.interactions, self.config.trends.granularity)
    }

    pub fn active_communities(&mut self, dataset: &Dataset) -> Vec<CommunityActivity> {
        let graph = self.graph(dataset);
        let partition = self.communities(dataset);
        algo::aggregate_active_communities(&graph, &partition)
    }

    pub fn community_insights(&mut self, dataset: &Dataset) -> Vec<CommunityInsight> {
        let graph = self.graph(dataset);
        let partition = self.communities(dataset);
        algo::community_insights(&graph, &partition)
    }

    pub fn geographic_distribution(&mut self, dataset: &Dataset) -> Vec<LocationCount> {
        algo::geographic_distribution(&self.graph(dataset))
    }

    /// Interest clusters with the configured k and seed
    pub fn interest_segmentation(&self, dataset: &Dataset) -> InterestSegmentation {
        algo::interest_segmentation_with(&dataset.users, &self.config.segmentation)
    }

    /// Collapsed interactions of one user, in edge insertion order
    pub fn user_interactions(
        &mut self,
        dataset: &Dataset,
        user: &UserId,
    ) -> GraphResult<Vec<Interaction>> {
        let graph = self.graph(dataset);
        let edges = graph.user_interactions(user)?;
        Ok(edges.into_iter().cloned().collect())
    }

    /// The community a user was placed in
    pub fn user_community(&mut self, dataset: &Dataset, user: &UserId) -> GraphResult<Community> {
        let partition = self.communities(dataset);
        partition
            .community_of(user)
            .cloned()
            .ok_or_else(|| GraphError::UserNotFound(user.clone()))
    }

    pub fn export_node_link(&mut self, dataset: &Dataset) -> NodeLinkData {
        self.graph(dataset).to_node_link()
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            cache: AnalyticsCache::new(config.cache.capacity),
            config,
        }
    }
}
