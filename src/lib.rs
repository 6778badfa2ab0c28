//! KYN Social Graph Analytics
//!
//! Builds an undirected, weighted social graph from user and interaction
//! records and derives structural insight from it: connectivity metrics,
//! community partitions, influence rankings and recommendations.
//!
//! # Architecture
//!
//! - `graph`: snapshot records, validation, the `SocialGraph` store and its builder
//! - `algo`: analytics over a dense CSR projection (`kyn-graph-algorithms`)
//! - `cache`: snapshot-keyed cache of built graphs and derived views
//! - `engine`: facade routing every operation through the cache
//! - `config`: YAML-loadable engine settings
//!
//! ## Example Usage
//!
//! ```rust
//! use kyn::graph::{build_graph, InteractionRecord, UserRecord, UserId};
//! use kyn::algo::{detect_communities, recommend_connections};
//!
//! let users = vec![
//!     UserRecord::new("alice").with_interests(["music"]),
//!     UserRecord::new("bob"),
//!     UserRecord::new("carol"),
//! ];
//! let interactions = vec![
//!     InteractionRecord::new("alice", "bob"),
//!     InteractionRecord::new("bob", "carol"),
//! ];
//!
//! let graph = build_graph(&users, &interactions);
//! assert_eq!(graph.edge_count(), 2);
//!
//! let partition = detect_communities(&graph);
//! assert_eq!(partition.covered_users(), 3);
//!
//! let suggestions = recommend_connections(&graph, &UserId::from("alice")).unwrap();
//! assert_eq!(suggestions[0].candidate.as_str(), "carol");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod cache;
pub mod config;
pub mod engine;
pub mod graph;

// Re-export main types for convenience
pub use graph::{
    build_graph, BuildReport, Dataset, GraphBuilder, GraphError, GraphResult, Interaction,
    InteractionRecord, InteractionType, NodeLinkData, PropertyMap, PropertyValue, SocialGraph,
    User, UserId, UserRecord, ValidationError,
};

pub use algo::{
    aggregate_active_communities, aggregate_interaction_trends, aggregate_trending_interests,
    analyze_centrality, calculate_graph_metrics, detect_communities, influence_score,
    interest_segmentation, recommend_communities, recommend_connections, CentralityMap,
    CentralityMetrics, Community, GraphMetrics, InterestSegmentation, Partition,
    TrendGranularity, Weighting,
};

pub use cache::{AnalyticsCache, SnapshotKey};
pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use engine::AnalyticsEngine;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
