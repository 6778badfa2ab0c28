use kyn::graph::{
    build_graph, InteractionRecord, InteractionType, NodeLinkData, SocialGraph, UserRecord,
};

fn sample_graph() -> SocialGraph {
    let mut lagos = UserRecord::new("U1")
        .with_interests(["music", "tech"])
        .with_location("Lagos")
        .with_age(31);
    lagos.extra.insert("email".to_string(), "u1@example.com".into());
    let users = vec![
        lagos,
        UserRecord::new("U2").with_interests(["music"]),
        UserRecord::new("U3"),
        UserRecord::new("U4"),
    ];

    let mut tagged = InteractionRecord::new("U3", "U4")
        .with_type(InteractionType::Share)
        .with_shared_interests(["music"])
        .with_geographic_proximity(true);
    tagged.extra.insert("post_id".to_string(), 991i64.into());

    let interactions = vec![
        InteractionRecord::new("U1", "U2")
            .with_type(InteractionType::Like)
            .with_timestamp("2024-01-01T08:00:00"),
        InteractionRecord::new("U2", "U1")
            .with_type(InteractionType::Comment)
            .with_timestamp("2024-01-02T08:00:00"),
        InteractionRecord::new("U2", "U3").with_weight(5),
        tagged,
    ];
    build_graph(&users, &interactions)
}

fn assert_same_graph(a: &SocialGraph, b: &SocialGraph) {
    assert_eq!(a.node_count(), b.node_count());
    assert_eq!(a.edge_count(), b.edge_count());
    for (x, y) in a.users().zip(b.users()) {
        assert_eq!(x, y);
    }
    for (x, y) in a.edges().zip(b.edges()) {
        assert_eq!(x, y);
    }
}

#[test]
fn test_node_link_round_trip() {
    let graph = sample_graph();
    let rebuilt = SocialGraph::from_node_link(graph.to_node_link()).unwrap();
    assert_same_graph(&graph, &rebuilt);

    let collapsed = rebuilt.edge(&"U1".into(), &"U2".into()).unwrap();
    assert_eq!(collapsed.weight, 3);
    assert_eq!(collapsed.interaction_count, 2);
}

#[test]
fn test_node_link_json_round_trip() {
    let graph = sample_graph();
    let json = graph.to_node_link().to_json().unwrap();
    let data = NodeLinkData::from_json(&json).unwrap();
    assert!(!data.directed);
    assert_eq!(data.nodes.len(), 4);

    let rebuilt = SocialGraph::from_node_link(data).unwrap();
    assert_same_graph(&graph, &rebuilt);
}

#[test]
fn test_empty_graph_round_trip() {
    let graph = build_graph(&[], &[]);
    let rebuilt = SocialGraph::from_node_link(graph.to_node_link()).unwrap();
    assert_eq!(rebuilt.node_count(), 0);
    assert_eq!(rebuilt.edge_count(), 0);
}
