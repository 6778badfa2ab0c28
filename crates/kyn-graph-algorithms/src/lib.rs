pub mod common;
pub mod community;
pub mod modularity;
pub mod centrality;
pub mod pathfinding;
pub mod similarity;
pub mod topology;

pub use common::{GraphView, NodeId};
pub use community::{connected_components, ComponentResult};
pub use modularity::{greedy_modularity_communities, modularity, ModularityResult};
pub use centrality::{betweenness_centrality, closeness_centrality, degree_centrality};
pub use pathfinding::bfs_distances;
pub use similarity::{jaccard, jaccard_non_neighbors, SimilarityPair};
pub use topology::{average_degree, density, isolated_count};
