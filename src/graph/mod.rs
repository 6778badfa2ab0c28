//! Social graph data model
//!
//! - Raw snapshot records and their validation (`record`)
//! - Users and collapsed, undirected interactions (`node`, `edge`)
//! - The insertion-ordered `SocialGraph` store and its builder
//! - Node-link JSON import/export

pub mod builder;
pub mod edge;
pub mod node;
pub mod node_link;
pub mod property;
pub mod record;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::{build_graph, BuildReport, GraphBuilder, RecordKind, SkippedRecord};
pub use edge::Interaction;
pub use node::User;
pub use node_link::NodeLinkData;
pub use property::{PropertyMap, PropertyValue};
pub use record::{Dataset, InteractionRecord, UserRecord, ValidationError};
pub use store::{GraphError, GraphResult, SocialGraph};
pub use types::{parse_timestamp, ActivityLevel, EdgeKey, InteractionType, UserId};
