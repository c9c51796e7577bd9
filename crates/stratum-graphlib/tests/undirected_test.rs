use stratum_graphlib::{Graph, GraphOptions};

fn undirected() -> Graph<(), i32, ()> {
    Graph::new(GraphOptions::undirected())
}

#[test]
fn undirected_edges_are_symmetric() {
    let mut g = undirected();
    g.set_edge_with_label("b", "a", 7);

    assert!(g.has_edge("a", "b", None));
    assert!(g.has_edge("b", "a", None));
    assert_eq!(g.edge("a", "b", None), Some(&7));
    assert_eq!(g.edge("b", "a", None), Some(&7));
}

#[test]
fn undirected_in_and_out_views_match_adjacent() {
    let mut g = undirected();
    g.set_edge("a", "b");
    g.set_edge("b", "c");

    let all: Vec<&str> = g.adjacent("b").collect();
    assert_eq!(all, vec!["a", "c"]);
    assert_eq!(g.in_adjacent("b").collect::<Vec<_>>(), all);
    assert_eq!(g.out_adjacent("b").collect::<Vec<_>>(), all);
    assert_eq!(g.in_degree("b"), 2);
    assert_eq!(g.out_degree("b"), 2);
}

#[test]
fn undirected_edge_filters_match_either_endpoint() {
    let mut g = undirected();
    g.set_edge("a", "b");
    g.set_edge("b", "c");

    assert_eq!(g.out_edges("b", None).len(), 2);
    assert_eq!(g.in_edges("b", None).len(), 2);
    assert_eq!(g.out_edges("b", Some("a")).len(), 1);
    assert_eq!(g.in_edges("b", Some("c")).len(), 1);
}

#[test]
fn undirected_remove_edge_accepts_either_orientation() {
    let mut g = undirected();
    g.set_edge("a", "b");
    assert_eq!(g.remove_edge("b", "a", None), Some(0));
    assert_eq!(g.edge_count(), 0);
    assert_eq!(g.degree("a"), 0);
}
