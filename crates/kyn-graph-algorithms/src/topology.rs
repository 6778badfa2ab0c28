//! Graph topology measures
//!
//! Whole-graph scalars for the structural metrics report.

use super::common::GraphView;

/// Undirected density `2E / (N (N - 1))`; 0 for graphs with fewer than two nodes.
pub fn density(view: &GraphView) -> f64 {
    let n = view.node_count;
    if n < 2 {
        return 0.0;
    }
    (2 * view.edge_count()) as f64 / (n as f64 * (n - 1) as f64)
}

/// Mean node degree `2E / N`; 0 for an empty graph.
pub fn average_degree(view: &GraphView) -> f64 {
    if view.node_count == 0 {
        return 0.0;
    }
    (2 * view.edge_count()) as f64 / view.node_count as f64
}

/// Number of nodes with no incident edge
pub fn isolated_count(view: &GraphView) -> usize {
    (0..view.node_count).filter(|&i| view.degree(i) == 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_graph_density() {
        // K4
        let mut adjacency = vec![vec![]; 4];
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    adjacency[i].push(j);
                }
            }
        }
        let view = GraphView::from_adjacency_list(adjacency);
        assert_eq!(view.edge_count(), 6);
        assert_eq!(density(&view), 1.0);
        assert_eq!(average_degree(&view), 3.0);
        assert_eq!(isolated_count(&view), 0);
    }

    #[test]
    fn test_degenerate_graphs() {
        let single = GraphView::from_adjacency_list(vec![vec![]]);
        assert_eq!(density(&single), 0.0);
        assert_eq!(isolated_count(&single), 1);

        let empty = GraphView::from_adjacency_list(vec![]);
        assert_eq!(average_degree(&empty), 0.0);
    }
}
