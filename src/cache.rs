//! Snapshot-keyed analytics cache
//!
//! Holds built graphs and their derived views for the most recently used
//! snapshots. The cache is owned by the caller and takes `&mut self`; sharing
//! it between threads means wrapping it in a lock.

use crate::algo::{
    analyze_centrality, detect_communities_with, CentralityMap, CommunityConfig, Partition,
    Weighting,
};
use crate::graph::{BuildReport, Dataset, GraphBuilder, SocialGraph};
use lru::LruCache;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Identity of a record snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    /// SHA-256 of the serialized dataset
    Fingerprint(String),
    /// Caller-maintained version counter
    Version(u64),
}

impl SnapshotKey {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        SnapshotKey::Fingerprint(dataset.fingerprint())
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKey::Fingerprint(hash) => {
                let short: String = hash.chars().take(12).collect();
                write!(f, "sha256:{}", short)
            }
            SnapshotKey::Version(v) => write!(f, "v{}", v),
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct SnapshotEntry {
    graph: Arc<SocialGraph>,
    report: Arc<BuildReport>,
    partitions: HashMap<Weighting, Arc<Partition>>,
    centrality: Option<Arc<CentralityMap>>,
}

pub struct AnalyticsCache {
    entries: LruCache<SnapshotKey, SnapshotEntry>,
    stats: CacheStats,
}

impl AnalyticsCache {
    /// Create a cache holding up to `capacity` snapshots (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Graph for the snapshot, built on first use
    pub fn graph(&mut self, key: &SnapshotKey, dataset: &Dataset) -> Arc<SocialGraph> {
        if let Some(entry) = self.entries.get(key) {
            self.stats.hits += 1;
            debug!(snapshot = %key, "Graph cache hit");
            return Arc::clone(&entry.graph);
        }

        self.stats.misses += 1;
        debug!(snapshot = %key, "Graph cache miss");
        let (graph, report) =
            GraphBuilder::build_with_report(&dataset.users, &dataset.interactions);
        let graph = Arc::new(graph);
        self.entries.put(
            key.clone(),
            SnapshotEntry {
                graph: Arc::clone(&graph),
                report: Arc::new(report),
                partitions: HashMap::new(),
                centrality: None,
            },
        );
        graph
    }

    /// Build report of the cached graph
    pub fn report(&mut self, key: &SnapshotKey, dataset: &Dataset) -> Arc<BuildReport> {
        self.graph(key, dataset);
        match self.entries.peek(key) {
            Some(entry) => Arc::clone(&entry.report),
            None => {
                let (_, report) =
                    GraphBuilder::build_with_report(&dataset.users, &dataset.interactions);
                Arc::new(report)
            }
        }
    }

    /// Partition for the snapshot, detected once per weighting
    pub fn partition(
        &mut self,
        key: &SnapshotKey,
        dataset: &Dataset,
        config: &CommunityConfig,
    ) -> Arc<Partition> {
        let graph = self.graph(key, dataset);
        if let Some(partition) = self
            .entries
            .peek(key)
            .and_then(|e| e.partitions.get(&config.weighting))
        {
            self.stats.hits += 1;
            return Arc::clone(partition);
        }

        self.stats.misses += 1;
        let partition = Arc::new(detect_communities_with(&graph, config));
        if let Some(entry) = self.entries.peek_mut(key) {
            entry
                .partitions
                .insert(config.weighting, Arc::clone(&partition));
        }
        partition
    }

    /// Centrality map for the snapshot
    pub fn centrality(&mut self, key: &SnapshotKey, dataset: &Dataset) -> Arc<CentralityMap> {
        let graph = self.graph(key, dataset);
        if let Some(metrics) = self.entries.peek(key).and_then(|e| e.centrality.as_ref()) {
            self.stats.hits += 1;
            return Arc::clone(metrics);
        }

        self.stats.misses += 1;
        let metrics = Arc::new(analyze_centrality(&graph));
        if let Some(entry) = self.entries.peek_mut(key) {
            entry.centrality = Some(Arc::clone(&metrics));
        }
        metrics
    }

    pub fn contains(&self, key: &SnapshotKey) -> bool {
        self.entries.contains(key)
    }

    /// Drop one snapshot; returns whether it was cached
    pub fn invalidate(&mut self, key: &SnapshotKey) -> bool {
        self.entries.pop(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl fmt::Debug for AnalyticsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{InteractionRecord, UserRecord};

    fn dataset(n: usize) -> Dataset {
        let users = (0..n).map(|i| UserRecord::new(format!("U{}", i))).collect();
        let interactions = (1..n)
            .map(|i| InteractionRecord::new(format!("U{}", i - 1), format!("U{}", i)))
            .collect();
        Dataset::new(users, interactions)
    }

    #[test]
    fn test_graph_is_shared_until_invalidated() {
        let data = dataset(4);
        let key = SnapshotKey::for_dataset(&data);
        let mut cache = AnalyticsCache::new(2);

        let first = cache.graph(&key, &data);
        let second = cache.graph(&key, &data);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        let third = cache.graph(&key, &data);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_snapshot_key_display() {
        assert_eq!(SnapshotKey::Version(3).to_string(), "v3");
        let data = dataset(2);
        let key = SnapshotKey::for_dataset(&data);
        assert_eq!(key.to_string(), format!("sha256:{}", &data.fingerprint()[..12]));
        assert_eq!(SnapshotKey::Fingerprint("ab".into()).to_string(), "sha256:ab");
        let wide = SnapshotKey::Fingerprint("ééééééééééééé".into());
        assert_eq!(wide.to_string(), "sha256:éééééééééééé");
    }

    #[test]
    fn test_derived_views_are_cached_per_weighting() {
        let data = dataset(5);
        let key = SnapshotKey::Version(1);
        let mut cache = AnalyticsCache::new(1);

        let unweighted = CommunityConfig::default();
        let weighted = CommunityConfig {
            weighting: Weighting::Weighted,
        };
        let p1 = cache.partition(&key, &data, &unweighted);
        let p2 = cache.partition(&key, &data, &unweighted);
        let p3 = cache.partition(&key, &data, &weighted);
        assert!(Arc::ptr_eq(&p1, &p2));
        assert!(!Arc::ptr_eq(&p1, &p3));
        assert_eq!(p3.weighting(), Weighting::Weighted);

        let c1 = cache.centrality(&key, &data);
        let c2 = cache.centrality(&key, &data);
        assert!(Arc::ptr_eq(&c1, &c2));
        assert_eq!(c1.len(), 5);
    }

    #[test]
    fn test_least_recently_used_snapshot_is_evicted() {
        let a = dataset(2);
        let b = dataset(3);
        let (ka, kb) = (SnapshotKey::for_dataset(&a), SnapshotKey::for_dataset(&b));
        assert_ne!(ka, kb);

        let mut cache = AnalyticsCache::new(1);
        cache.graph(&ka, &a);
        cache.graph(&kb, &b);
        assert!(!cache.contains(&ka));
        assert!(cache.contains(&kb));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = AnalyticsCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(SnapshotKey::Version(7).to_string(), "v7");
        let key = SnapshotKey::for_dataset(&dataset(1));
        assert!(key.to_string().starts_with("sha256:"));
    }
}
