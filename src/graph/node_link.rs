//! Node-link JSON export and import
//!
//! The layout is the usual `{directed, multigraph, graph, nodes, links}`
//! document; nodes carry their `id` and links their `source`/`target`.

use super::edge::Interaction;
use super::node::User;
use super::property::PropertyMap;
use super::store::{GraphError, GraphResult, SocialGraph};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkData {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    /// Graph-level attributes
    #[serde(default)]
    pub graph: PropertyMap,
    pub nodes: Vec<User>,
    pub links: Vec<Interaction>,
}

impl NodeLinkData {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl SocialGraph {
    /// Export users and collapsed edges in insertion order
    pub fn to_node_link(&self) -> NodeLinkData {
        NodeLinkData {
            directed: false,
            multigraph: false,
            graph: PropertyMap::new(),
            nodes: self.users().cloned().collect(),
            links: self.edges().cloned().collect(),
        }
    }

    /// Rebuild a graph from a node-link document.
    ///
    /// Directed and multigraph documents are rejected, as are links whose
    /// endpoints are not listed among the nodes.
    pub fn from_node_link(data: NodeLinkData) -> GraphResult<SocialGraph> {
        if data.directed || data.multigraph {
            return Err(GraphError::InvalidEdge {
                source_user: String::new(),
                target_user: String::new(),
                reason: "only undirected simple graphs can be imported".to_string(),
            });
        }

        let mut graph = SocialGraph::new();
        for user in data.nodes {
            graph.add_user(user);
        }
        for link in data.links {
            for endpoint in [&link.source, &link.target] {
                if !graph.contains_user(endpoint) {
                    return Err(GraphError::InvalidEdge {
                        source_user: link.source.to_string(),
                        target_user: link.target.to_string(),
                        reason: format!("unknown node {}", endpoint),
                    });
                }
            }
            graph.add_interaction(link)?;
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{InteractionType, UserId};

    #[test]
    fn test_export_shape() {
        let mut graph = SocialGraph::new();
        graph.add_user(User::new("A").with_interests(["music"]));
        graph.add_user(User::new("B"));
        graph
            .add_interaction(Interaction::new("A", "B").with_type(InteractionType::Follow))
            .unwrap();

        let json = serde_json::to_value(graph.to_node_link()).unwrap();
        assert_eq!(json["directed"], false);
        assert_eq!(json["nodes"][0]["id"], "A");
        assert_eq!(json["nodes"][0]["interests"][0], "music");
        assert_eq!(json["links"][0]["source"], "A");
        assert_eq!(json["links"][0]["target"], "B");
        assert_eq!(json["links"][0]["interaction_type"], "follow");
        assert_eq!(json["links"][0]["weight"], 2);
    }

    #[test]
    fn test_import_rejects_dangling_links() {
        let data = NodeLinkData {
            directed: false,
            multigraph: false,
            graph: PropertyMap::new(),
            nodes: vec![User::new("A")],
            links: vec![Interaction::new("A", "B")],
        };
        let err = SocialGraph::from_node_link(data).unwrap_err();
        assert!(matches!(err, GraphError::InvalidEdge { .. }));
    }

    #[test]
    fn test_import_rejects_directed() {
        let data = NodeLinkData {
            directed: true,
            multigraph: false,
            graph: PropertyMap::new(),
            nodes: vec![User::new("A")],
            links: vec![],
        };
        assert!(SocialGraph::from_node_link(data).is_err());
    }

    #[test]
    fn test_import_from_json() {
        let json = r#"{
            "directed": false,
            "multigraph": false,
            "graph": {},
            "nodes": [{"id": "A", "email": "a@x.io"}, {"id": "B"}],
            "links": [{"source": "B", "target": "A", "weight": 7, "interaction_count": 3}]
        }"#;
        let graph = SocialGraph::from_node_link(NodeLinkData::from_json(json).unwrap()).unwrap();
        let edge = graph.edge(&UserId::from("A"), &UserId::from("B")).unwrap();
        assert_eq!(edge.weight, 7);
        assert_eq!(edge.interaction_count, 3);
        assert_eq!(
            graph
                .user(&UserId::from("A"))
                .and_then(|u| u.get_property("email"))
                .and_then(|v| v.as_string()),
            Some("a@x.io")
        );
    }
}
