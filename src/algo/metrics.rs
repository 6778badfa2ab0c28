//! Structural metrics of the whole graph

use super::{build_view, Weighting};
use crate::graph::SocialGraph;
use kyn_graph_algorithms::{average_degree, connected_components, density, isolated_count};
use serde::Serialize;

/// Whole-graph connectivity summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub number_of_nodes: usize,
    pub number_of_edges: usize,
    /// 2E / (N (N - 1)), 0 below two nodes
    pub density: f64,
    pub average_degree: f64,
    /// True when the graph has nodes and a single component
    pub is_connected: bool,
    pub number_of_components: usize,
    pub largest_component_size: usize,
    pub component_sizes: Vec<usize>,
    pub isolated_users: usize,
    pub total_interaction_weight: u64,
}

/// Density, connectivity and component sizing of `graph`
pub fn calculate_graph_metrics(graph: &SocialGraph) -> GraphMetrics {
    let view = build_view(graph, Weighting::Unweighted);
    let components = connected_components(&view);

    GraphMetrics {
        number_of_nodes: graph.node_count(),
        number_of_edges: graph.edge_count(),
        density: density(&view),
        average_degree: average_degree(&view),
        is_connected: components.count() == 1,
        number_of_components: components.count(),
        largest_component_size: components.largest_size(),
        component_sizes: components.sizes(),
        isolated_users: isolated_count(&view),
        total_interaction_weight: graph.total_weight(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Interaction, User};

    #[test]
    fn test_metrics_of_path_plus_isolate() {
        let mut graph = SocialGraph::new();
        for id in ["A", "B", "C", "D"] {
            graph.add_user(User::new(id));
        }
        graph.add_interaction(Interaction::new("A", "B").with_weight(2)).unwrap();
        graph.add_interaction(Interaction::new("B", "C")).unwrap();

        let metrics = calculate_graph_metrics(&graph);
        assert_eq!(metrics.number_of_nodes, 4);
        assert_eq!(metrics.number_of_edges, 2);
        assert!((metrics.density - 2.0 * 2.0 / 12.0).abs() < 1e-12);
        assert!((metrics.average_degree - 1.0).abs() < 1e-12);
        assert!(!metrics.is_connected);
        assert_eq!(metrics.number_of_components, 2);
        assert_eq!(metrics.component_sizes, vec![3, 1]);
        assert_eq!(metrics.largest_component_size, 3);
        assert_eq!(metrics.isolated_users, 1);
        assert_eq!(metrics.total_interaction_weight, 3);
    }

    #[test]
    fn test_total_weight_saturates() {
        let mut graph = SocialGraph::new();
        for id in ["A", "B", "C", "D"] {
            graph.add_user(User::new(id));
        }
        let heavy = i64::MAX as u64;
        for (a, b) in [("A", "B"), ("B", "C"), ("C", "D")] {
            graph.add_interaction(Interaction::new(a, b).with_weight(heavy)).unwrap();
        }

        let metrics = calculate_graph_metrics(&graph);
        assert_eq!(metrics.total_interaction_weight, u64::MAX);
    }

    #[test]
    fn test_metrics_of_empty_graph() {
        let metrics = calculate_graph_metrics(&SocialGraph::new());
        assert_eq!(metrics.number_of_nodes, 0);
        assert_eq!(metrics.density, 0.0);
        assert!(!metrics.is_connected);
        assert_eq!(metrics.largest_component_size, 0);
    }
}
