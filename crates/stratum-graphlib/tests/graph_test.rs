use stratum_graphlib::{EdgeKey, Graph, GraphOptions};

fn directed() -> Graph<(), (), ()> {
    Graph::new(GraphOptions::default())
}

#[test]
fn set_edge_creates_missing_endpoints() {
    let mut g = directed();
    g.set_edge("a", "b");
    assert!(g.has_node("a"));
    assert!(g.has_node("b"));
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn adjacent_follows_edge_insertion_order() {
    let mut g = directed();
    g.set_node("x", ());
    g.set_edge("x", "c");
    g.set_edge("a", "x");
    g.set_edge("x", "b");
    g.set_edge("d", "x");

    let adj: Vec<&str> = g.adjacent("x").collect();
    assert_eq!(adj, vec!["c", "a", "b", "d"]);
    assert_eq!(g.out_adjacent("x").collect::<Vec<_>>(), vec!["c", "b"]);
    assert_eq!(g.in_adjacent("x").collect::<Vec<_>>(), vec!["a", "d"]);
}

#[test]
fn adjacent_is_restartable() {
    let mut g = directed();
    g.set_path(&["a", "b", "c"]);
    let it = g.adjacent("b");
    let first: Vec<&str> = it.clone().collect();
    let second: Vec<&str> = it.collect();
    assert_eq!(first, second);
    assert_eq!(first, vec!["a", "c"]);
}

#[test]
fn adjacent_of_unknown_vertex_is_empty() {
    let g = directed();
    assert_eq!(g.adjacent("missing").count(), 0);
}

#[test]
fn self_loops_are_counted_separately() {
    let mut g = directed();
    g.set_edge("a", "a");
    g.set_edge("a", "b");

    assert_eq!(g.number_of_loops(), 1);
    assert_eq!(g.degree("a"), 3);
    assert_eq!(g.adjacent("a").collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(g.node_edges("a").len(), 2);

    g.remove_edge("a", "a", None);
    assert_eq!(g.number_of_loops(), 0);
    assert_eq!(g.degree("a"), 1);
}

#[test]
fn max_degree_tracks_insertions_and_removals() {
    let mut g = directed();
    assert_eq!(g.max_degree(), 0);
    g.set_edge("hub", "a");
    g.set_edge("hub", "b");
    g.set_edge("c", "hub");
    assert_eq!(g.max_degree(), 3);

    g.remove_node("hub");
    assert_eq!(g.max_degree(), 0);
    assert_eq!(g.edge_count(), 0);
    assert_eq!(g.node_count(), 3);
}

#[test]
fn remove_node_removes_touching_edges_only() {
    let mut g = directed();
    g.set_path(&["a", "b", "c"]);
    g.set_edge("a", "c");
    assert!(g.remove_node("b"));
    assert!(!g.remove_node("b"));

    let keys = g.edge_keys();
    assert_eq!(keys, vec![EdgeKey::unnamed("a", "c")]);
    assert_eq!(g.successors("a"), vec!["c"]);
    assert!(g.predecessors("c").contains(&"a"));
}

#[test]
fn multigraph_edges_are_distinguished_by_name() {
    let mut g: Graph<(), i32, ()> = Graph::new(GraphOptions::default().multigraph());
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    g.set_edge_named("a", "b", None::<String>, Some(3));

    assert_eq!(g.edge_count(), 3);
    assert_eq!(g.edge("a", "b", Some("y")), Some(&2));
    assert_eq!(g.adjacent("a").count(), 3);
    assert_eq!(g.successors("a"), vec!["b"]);
    assert_eq!(g.out_edges("a", Some("b")).len(), 3);
}

#[test]
fn non_multigraph_ignores_edge_names() {
    let mut g: Graph<(), i32, ()> = Graph::new(GraphOptions::default());
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.edge("a", "b", None), Some(&2));
}

#[test]
fn set_edge_keeps_position_when_relabelled() {
    let mut g: Graph<(), i32, ()> = Graph::new(GraphOptions::default());
    g.set_edge_with_label("a", "b", 1);
    g.set_edge_with_label("a", "c", 2);
    g.set_edge_with_label("a", "b", 3);
    assert_eq!(g.successors("a"), vec!["b", "c"]);
    assert_eq!(g.edge("a", "b", None), Some(&3));
}

#[test]
fn default_labels_are_used_for_implicit_entries() {
    let mut g: Graph<i32, i32, ()> = Graph::new(GraphOptions::default());
    g.set_default_node_label(|| 7);
    g.set_default_edge_label(|| 9);
    g.set_edge("a", "b");
    assert_eq!(g.node("a"), Some(&7));
    assert_eq!(g.edge("a", "b", None), Some(&9));
}

#[test]
fn heavy_churn_keeps_adjacency_consistent() {
    let mut g = directed();
    for i in 0..200 {
        g.set_edge(format!("n{i}"), format!("n{}", i + 1));
    }
    for i in (0..200).step_by(2) {
        g.remove_node(&format!("n{i}"));
    }
    // Only the last edge has no even endpoint below n200.
    assert_eq!(g.edge_count(), 1);
    assert!(g.has_edge("n199", "n200", None));
    g.set_edge("n1", "n3");
    g.set_edge("n3", "n5");
    assert_eq!(g.adjacent("n3").collect::<Vec<_>>(), vec!["n1", "n5"]);
    assert_eq!(g.degree("n3"), 2);
    assert_eq!(g.max_degree(), 2);
}

#[test]
fn sources_and_sinks() {
    let mut g = directed();
    g.set_path(&["a", "b", "c"]);
    g.set_node("lonely", ());
    assert_eq!(g.sources(), vec!["a", "lonely"]);
    assert_eq!(g.sinks(), vec!["c", "lonely"]);
}

#[test]
fn clone_is_independent() {
    let mut g: Graph<i32, (), ()> = Graph::new(GraphOptions::default());
    g.set_node("a", 1);
    let mut copy = g.clone();
    copy.set_node("a", 2);
    copy.set_edge("a", "b");
    assert_eq!(g.node("a"), Some(&1));
    assert_eq!(g.edge_count(), 0);
    assert_eq!(copy.edge_count(), 1);
}

#[test]
fn compound_children_follow_parent_changes() {
    let mut g: Graph<(), (), ()> = Graph::new(GraphOptions::default().compound());
    g.set_parent("a", "p");
    g.set_parent("b", "p");
    g.set_parent("b", "q");
    assert_eq!(g.children("p"), vec!["a"]);
    assert_eq!(g.children("q"), vec!["b"]);
    assert_eq!(g.parent("b"), Some("q"));
    assert_eq!(g.children_root(), vec!["p", "q"]);
    g.remove_node("q");
    assert_eq!(g.parent("b"), None);
}
