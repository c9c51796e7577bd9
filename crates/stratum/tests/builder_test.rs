use stratum::{
    ContainerSpec, EdgeSpec, Error, GraphBuilder, Justify, LayoutConfig, NodeSpec, RankDir, Shape,
};

#[test]
fn concurrent_container_adds_are_not_lost() {
    let builder = GraphBuilder::new();
    std::thread::scope(|s| {
        for i in 0..100 {
            let builder = &builder;
            s.spawn(move || {
                builder.add_container(
                    None,
                    ContainerSpec::bordered(format!("c{i}")).with_nodes([format!("n{i}")]),
                );
            });
        }
    });
    assert_eq!(builder.container_count(), 100);

    let first = builder.build().unwrap();
    let second = builder.build().unwrap();
    assert_eq!(first.containers().len(), 100);
    assert_eq!(second.containers().len(), 100);
    assert_eq!(first.node_count(), 100);
}

#[test]
fn concurrent_nodes_and_edges() {
    let builder = GraphBuilder::new();
    std::thread::scope(|s| {
        for t in 0..8 {
            let builder = &builder;
            s.spawn(move || {
                for i in 0..50 {
                    builder.add_node(NodeSpec::new(format!("t{t}n{i}")));
                    if i > 0 {
                        builder.add_edge(EdgeSpec::new(
                            format!("t{t}n{}", i - 1),
                            format!("t{t}n{i}"),
                        ));
                    }
                }
            });
        }
    });
    let snapshot = builder.build().unwrap();
    assert_eq!(snapshot.node_count(), 400);
    assert_eq!(snapshot.edges().len(), 392);
}

#[test]
fn clone_is_isolated() {
    let original = GraphBuilder::new();
    original.set_justify(Justify::Left);
    let copy = original.clone();
    copy.set_justify(Justify::Right);
    assert_eq!(original.justify(), Justify::Left);
    assert_eq!(copy.justify(), Justify::Right);
    assert_eq!(original.build().unwrap().config().justify, Justify::Left);
    assert_eq!(copy.build().unwrap().config().justify, Justify::Right);

    // And the other way round: changing the original leaves the copy's builds alone.
    original.set_justify(Justify::Center);
    assert_eq!(copy.build().unwrap().config().justify, Justify::Right);
    assert_eq!(original.build().unwrap().config().justify, Justify::Center);

    copy.add_node(NodeSpec::new("only-in-copy"));
    assert_eq!(original.node_count(), 0);
    assert_eq!(copy.node_count(), 1);
}

#[test]
fn snapshots_do_not_see_later_mutations() {
    let builder = GraphBuilder::new();
    builder.add_node(NodeSpec::new("a"));
    let before = builder.build().unwrap();
    builder.add_node(NodeSpec::new("b"));
    builder.set_config(LayoutConfig {
        rank_dir: RankDir::LR,
        ..Default::default()
    });
    assert_eq!(before.node_count(), 1);
    assert_eq!(before.config().rank_dir, RankDir::TB);
    assert_eq!(builder.build().unwrap().node_count(), 2);
}

#[test]
fn edges_create_missing_endpoints_and_get_ids() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b"));
    builder.add_edge(EdgeSpec::new("b", "c").with_id("named"));
    builder.add_edge(EdgeSpec::new("c", "a"));
    let snapshot = builder.build().unwrap();
    let ids: Vec<_> = snapshot
        .edges()
        .iter()
        .map(|e| e.id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["e0", "named", "e2"]);
    let nodes: Vec<_> = snapshot.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(nodes, vec!["a", "b", "c"]);
}

#[test]
fn container_endpoints_do_not_become_nodes() {
    let builder = GraphBuilder::new();
    builder.add_container(None, ContainerSpec::bordered("box").with_nodes(["x"]));
    builder.add_edge(EdgeSpec::new("a", "box"));
    let snapshot = builder.build().unwrap();
    assert!(snapshot.node("box").is_none());
    assert!(snapshot.node("x").is_some());
    assert!(snapshot.node("a").is_some());
}

#[test]
fn structural_errors_surface_at_build() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b").with_id("dup"));
    builder.add_edge(EdgeSpec::new("b", "c").with_id("dup"));
    assert!(matches!(builder.build(), Err(Error::InvalidStructure { .. })));

    let builder = GraphBuilder::new();
    builder.add_node(NodeSpec::new("x"));
    builder.add_container(None, ContainerSpec::loose("x").with_nodes(["y"]));
    assert!(matches!(builder.build(), Err(Error::InvalidStructure { .. })));

    let builder = GraphBuilder::new();
    builder.add_node(NodeSpec::new("r").with_shape(Shape::Record).with_label("{a|b"));
    assert!(matches!(builder.build(), Err(Error::LabelFormat { .. })));

    let builder = GraphBuilder::new();
    builder.add_container(None, ContainerSpec::loose("a").with_nodes(["n"]));
    builder.add_container(Some("a"), ContainerSpec::loose("b").with_nodes(["m"]));
    builder.attach_container(Some("b"), "a");
    assert!(matches!(builder.build(), Err(Error::CycleDependency { .. })));
}

#[test]
fn records_compile_at_build() {
    let builder = GraphBuilder::new();
    builder.add_node(
        NodeSpec::new("r")
            .with_shape(Shape::Record)
            .with_label("<in> left|{mid|<out> bottom}|right"),
    );
    let snapshot = builder.build().unwrap();
    let tree = snapshot.record("r").unwrap();
    assert_eq!(tree.leaf_count(), 4);
    assert!(tree.cell_by_port("out").is_some());
    assert!(snapshot.record("missing").is_none());
}

#[test]
fn merge_config_applies_json_overrides() {
    let builder = GraphBuilder::new();
    builder
        .merge_config(&serde_json::json!({"rankDir": "LR", "nodeSep": 12.5}))
        .unwrap();
    let config = builder.config();
    assert_eq!(config.rank_dir, RankDir::LR);
    assert_eq!(config.node_sep, 12.5);
    assert!(builder.merge_config(&serde_json::json!({"nodeSep": -1})).is_err());
    assert_eq!(builder.config().node_sep, 12.5);
}
