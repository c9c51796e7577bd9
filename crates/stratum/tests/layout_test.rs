use std::sync::Arc;
use stratum::{
    ContainerSpec, CoordinateMode, EdgeSpec, Error, GraphBuilder, GraphSnapshot, LabelPos,
    LayoutConfig, LayoutResult, NodeSpec, Point, RankConstraint, RankDir, Ranker, Rect, Registry,
    RoutingMode, Shape, ShapeStrategy, Size, layout, layout_with_registry,
};

fn build(config: LayoutConfig, edges: &[(&str, &str)]) -> GraphSnapshot {
    let builder = GraphBuilder::with_config(config);
    for (t, h) in edges {
        builder.add_edge(EdgeSpec::new(*t, *h));
    }
    builder.build().unwrap()
}

fn rank(result: &LayoutResult, id: &str) -> i32 {
    result.nodes[id].rank
}

/// Same-rank node boxes must not overlap.
fn assert_no_overlap(result: &LayoutResult) {
    let nodes: Vec<_> = result.nodes.iter().collect();
    for (i, (a, ga)) in nodes.iter().enumerate() {
        for (b, gb) in &nodes[i + 1..] {
            if ga.rank != gb.rank {
                continue;
            }
            let (ra, rb) = (ga.rect().inflate(-1e-6, -1e-6), gb.rect().inflate(-1e-6, -1e-6));
            assert!(!ra.overlaps(&rb), "{a} {ra:?} overlaps {b} {rb:?}");
        }
    }
}

fn assert_finite(result: &LayoutResult) {
    for (id, n) in &result.nodes {
        assert!(n.center.is_finite() && n.rect().is_finite(), "node {id}");
    }
    for (id, e) in &result.edges {
        assert!(e.points.iter().all(Point::is_finite), "edge {id}");
    }
}

/// Deterministic pseudo-random edge lists, cycles included.
fn random_edges(seed: u64, nodes: usize, edges: usize) -> Vec<(String, String)> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    (0..edges)
        .map(|_| {
            let t = next() % nodes;
            let mut h = next() % nodes;
            if h == t {
                h = (h + 1) % nodes;
            }
            (format!("n{t}"), format!("n{h}"))
        })
        .collect()
}

#[test]
fn chain_goes_down_one_rank_per_edge() {
    let snapshot = build(LayoutConfig::default(), &[("a", "b"), ("b", "c")]);
    let result = layout(&snapshot).unwrap();
    assert_eq!(rank(&result, "a"), 0);
    assert_eq!(rank(&result, "b"), 1);
    assert_eq!(rank(&result, "c"), 2);
    assert!(result.nodes["a"].center.y < result.nodes["b"].center.y);
    assert!(result.nodes["b"].center.y < result.nodes["c"].center.y);
    for e in result.edges.values() {
        assert!(!e.reversed && !e.flat);
        assert!(e.points.len() >= 2);
    }
}

#[test]
fn rank_invariant_holds_on_random_graphs() {
    for ranker in [Ranker::NetworkSimplex, Ranker::TightTree, Ranker::LongestPath] {
        for seed in 1..6u64 {
            let config = LayoutConfig {
                ranker,
                ..Default::default()
            };
            let edges = random_edges(seed, 12, 20);
            let refs: Vec<(&str, &str)> =
                edges.iter().map(|(t, h)| (t.as_str(), h.as_str())).collect();
            let result = layout(&build(config, &refs)).unwrap();
            for (id, e) in &result.edges {
                let (rt, rh) = (rank(&result, &e.tail), rank(&result, &e.head));
                assert!(!e.flat, "{ranker:?} seed {seed}: {id} is flat");
                if e.reversed {
                    assert!(rt - rh >= 1, "{ranker:?} seed {seed}: {id}");
                } else {
                    assert!(rh - rt >= 1, "{ranker:?} seed {seed}: {id}");
                }
            }
            assert_no_overlap(&result);
            assert_finite(&result);
        }
    }
}

#[test]
fn cycles_are_broken_by_reversing_an_edge() {
    let snapshot = build(LayoutConfig::default(), &[("a", "b"), ("b", "c"), ("c", "a")]);
    let result = layout(&snapshot).unwrap();
    let reversed = result.edges.values().filter(|e| e.reversed).count();
    assert_eq!(reversed, 1);
    // Points still run from the declared tail to the declared head.
    for e in result.edges.values() {
        let tail = result.nodes[&e.tail].rect();
        let head = result.nodes[&e.head].rect();
        assert!(tail.inflate(1e-6, 1e-6).contains(e.tail_anchor));
        assert!(head.inflate(1e-6, 1e-6).contains(e.head_anchor));
    }
}

#[test]
fn minlen_stretches_edges() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b").with_minlen(3));
    builder.add_edge(EdgeSpec::new("a", "c"));
    let result = layout(&builder.build().unwrap()).unwrap();
    assert!(rank(&result, "b") - rank(&result, "a") >= 3);
    assert!(result.edges["e0"].points.len() >= 2);
}

#[test]
fn same_rank_constraint() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b"));
    builder.add_edge(EdgeSpec::new("a", "c"));
    builder.add_edge(EdgeSpec::new("c", "d"));
    builder.add_container(
        None,
        ContainerSpec::loose("same")
            .with_nodes(["b", "d"])
            .with_rank(RankConstraint::Same),
    );
    let result = layout(&builder.build().unwrap()).unwrap();
    assert_eq!(rank(&result, "b"), rank(&result, "d"));
    assert!(rank(&result, "d") > rank(&result, "c"));
}

#[test]
fn source_and_sink_constraints() {
    let builder = GraphBuilder::new();
    for (t, h) in [("a", "b"), ("b", "c"), ("x", "c"), ("c", "y")] {
        builder.add_edge(EdgeSpec::new(t, h));
    }
    builder.add_container(
        None,
        ContainerSpec::loose("top")
            .with_nodes(["x"])
            .with_rank(RankConstraint::Source),
    );
    builder.add_container(
        None,
        ContainerSpec::loose("bottom")
            .with_nodes(["y"])
            .with_rank(RankConstraint::Sink),
    );
    let result = layout(&builder.build().unwrap()).unwrap();
    let x = rank(&result, "x");
    let y = rank(&result, "y");
    for id in ["a", "b", "c"] {
        assert!(rank(&result, id) > x, "{id} shares or precedes the source rank");
        assert!(rank(&result, id) < y, "{id} shares or follows the sink rank");
    }
}

#[test]
fn opposite_rank_constraints_conflict() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b"));
    builder.add_edge(EdgeSpec::new("b", "c"));
    builder.add_container(
        None,
        ContainerSpec::loose("low")
            .with_nodes(["a", "b"])
            .with_rank(RankConstraint::Min),
    );
    builder.add_container(
        None,
        ContainerSpec::loose("high")
            .with_nodes(["b", "c"])
            .with_rank(RankConstraint::Max),
    );
    let err = layout(&builder.build().unwrap()).unwrap_err();
    match err {
        Error::OppositeRank {
            first,
            second,
            scope,
        } => {
            assert_eq!(first, "low");
            assert_eq!(second, "high");
            assert_eq!(scope, "root");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn layout_is_deterministic() {
    let edges = random_edges(42, 15, 30);
    let refs: Vec<(&str, &str)> = edges.iter().map(|(t, h)| (t.as_str(), h.as_str())).collect();
    let snapshot = build(LayoutConfig::default(), &refs);
    let first = layout(&snapshot).unwrap();
    let second = layout(&snapshot).unwrap();
    let rebuilt = layout(&build(LayoutConfig::default(), &refs)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json(), rebuilt.to_json());
    for (id, n) in &first.nodes {
        assert_eq!(n.order, second.nodes[id].order);
    }
}

#[test]
fn every_strategy_keeps_ranks_apart() {
    for mode in [
        CoordinateMode::Legacy,
        CoordinateMode::Default,
        CoordinateMode::Improved,
    ] {
        let config = LayoutConfig {
            coordinates: mode,
            ..Default::default()
        };
        let builder = GraphBuilder::with_config(config);
        builder.add_node(NodeSpec::new("wide").with_min_size(120.0, 30.0));
        for (t, h) in [
            ("root", "wide"),
            ("root", "b"),
            ("root", "c"),
            ("wide", "d"),
            ("b", "d"),
            ("c", "e"),
            ("root", "e"),
        ] {
            builder.add_edge(EdgeSpec::new(t, h));
        }
        builder.add_container(None, ContainerSpec::bordered("box").with_nodes(["b", "c"]));
        let result = layout(&builder.build().unwrap()).unwrap();
        assert_no_overlap(&result);
        assert_finite(&result);

        let boxed = result.containers["box"].rect;
        for id in ["b", "c"] {
            assert!(boxed.contains_rect(&result.nodes[id].rect()), "{mode:?}: {id}");
        }
        for id in ["root", "wide", "d", "e"] {
            let r = result.nodes[id].rect().inflate(-1e-6, -1e-6);
            assert!(!boxed.overlaps(&r), "{mode:?}: {id} intrudes into the container");
        }
    }
}

#[test]
fn nested_containers_nest_their_boxes() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b"));
    builder.add_edge(EdgeSpec::new("b", "c"));
    builder.add_edge(EdgeSpec::new("a", "d"));
    builder.add_container(
        None,
        ContainerSpec::bordered("outer")
            .with_label("Outer")
            .with_nodes(["b"]),
    );
    builder.add_container(
        Some("outer"),
        ContainerSpec::bordered("inner").with_nodes(["c"]),
    );
    let result = layout(&builder.build().unwrap()).unwrap();
    let outer = &result.containers["outer"];
    let inner = &result.containers["inner"];
    assert!(outer.bordered && inner.bordered);
    assert!(outer.rect.contains_rect(&inner.rect));
    assert!(outer.rect.contains_rect(&result.nodes["b"].rect()));
    assert!(inner.rect.contains_rect(&result.nodes["c"].rect()));
    assert!(outer.label_anchor.is_some());
    assert!(inner.label_anchor.is_none());
    assert!(result.bounds.contains_rect(&outer.rect));
}

#[test]
fn sized_empty_container_gets_its_box() {
    let builder = GraphBuilder::new();
    builder.add_node(NodeSpec::new("a"));
    builder.add_container(
        None,
        ContainerSpec::bordered("slot").with_min_size(Size::new(80.0, 60.0)),
    );
    builder.add_edge(EdgeSpec::new("a", "slot"));
    let result = layout(&builder.build().unwrap()).unwrap();
    let slot = result.containers["slot"].rect;
    assert!(slot.width >= 80.0 && slot.height >= 60.0);
    assert!(!result.nodes.contains_key("slot"));
    let edge = &result.edges["e0"];
    let end = edge.head_anchor;
    let on_border = (end.y - slot.y).abs() < 1e-6
        || (end.y - slot.bottom()).abs() < 1e-6
        || (end.x - slot.x).abs() < 1e-6
        || (end.x - slot.right()).abs() < 1e-6;
    assert!(on_border, "{end:?} is not on {slot:?}");
}

#[test]
fn edges_to_containers_stop_at_the_border() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("start", "group"));
    builder.add_container(
        None,
        ContainerSpec::bordered("group").with_nodes(["m1", "m2"]),
    );
    builder.add_edge(EdgeSpec::new("m1", "m2"));
    let result = layout(&builder.build().unwrap()).unwrap();
    let group = result.containers["group"].rect;
    let edge = &result.edges["e0"];
    assert_eq!(edge.head, "group");
    assert!(group.contains(edge.head_anchor));
    assert!(!group.contains_strictly(edge.head_anchor));
    assert!(edge.points.iter().all(|p| !group.contains_strictly(*p)));
}

#[test]
fn rank_directions() {
    let edges = [("a", "b")];
    let lr = layout(&build(
        LayoutConfig {
            rank_dir: RankDir::LR,
            ..Default::default()
        },
        &edges,
    ))
    .unwrap();
    assert!(lr.nodes["a"].center.x < lr.nodes["b"].center.x);
    assert!((lr.nodes["a"].center.y - lr.nodes["b"].center.y).abs() < 1e-6);

    let bt = layout(&build(
        LayoutConfig {
            rank_dir: RankDir::BT,
            ..Default::default()
        },
        &edges,
    ))
    .unwrap();
    assert!(bt.nodes["a"].center.y > bt.nodes["b"].center.y);

    let rl = layout(&build(
        LayoutConfig {
            rank_dir: RankDir::RL,
            ..Default::default()
        },
        &edges,
    ))
    .unwrap();
    assert!(rl.nodes["a"].center.x > rl.nodes["b"].center.x);
}

#[test]
fn margins_offset_the_drawing() {
    let config = LayoutConfig {
        margin_x: 30.0,
        margin_y: 20.0,
        ..Default::default()
    };
    let result = layout(&build(config, &[("a", "b"), ("a", "c")])).unwrap();
    let left = result
        .nodes
        .values()
        .map(|n| n.rect().x)
        .fold(f64::INFINITY, f64::min);
    let top = result
        .nodes
        .values()
        .map(|n| n.rect().y)
        .fold(f64::INFINITY, f64::min);
    assert!((left - 30.0).abs() < 1e-6);
    assert!((top - 20.0).abs() < 1e-6);
    let right = result
        .nodes
        .values()
        .map(|n| n.rect().right())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((result.bounds.width - (right + 30.0)).abs() < 1e-6);
}

#[test]
fn self_loops_and_labels() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "a").with_label("again"));
    builder.add_edge(EdgeSpec::new("a", "b").with_label("next"));
    builder.add_edge(
        EdgeSpec::new("a", "c")
            .with_label("side")
            .with_labelpos(LabelPos::Right),
    );
    let result = layout(&builder.build().unwrap()).unwrap();
    assert_finite(&result);

    let a = result.nodes["a"].rect();
    let looped = &result.edges["e0"];
    assert!(looped.points.len() >= 5);
    assert!(looped.points.iter().any(|p| p.x > a.right()));
    assert!(looped.label_anchor.is_some());

    let next = &result.edges["e1"];
    let anchor = next.label_anchor.unwrap();
    assert!(anchor.y > result.nodes["a"].center.y);
    assert!(anchor.y < result.nodes["b"].center.y);
    assert_eq!(rank(&result, "b") - rank(&result, "a"), 2);
    assert!(result.edges["e2"].label_size.is_some());
}

#[test]
fn flat_edges_are_straight() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b"));
    builder.add_edge(EdgeSpec::new("a", "c"));
    builder.add_edge(EdgeSpec::new("b", "c").with_constraint(false).with_id("flat"));
    builder.add_container(
        None,
        ContainerSpec::loose("row")
            .with_nodes(["b", "c"])
            .with_rank(RankConstraint::Same),
    );
    let result = layout(&builder.build().unwrap()).unwrap();
    let flat = &result.edges["flat"];
    assert!(flat.flat);
    assert_eq!(flat.points.len(), 2);
    assert!((flat.points[0].y - flat.points[1].y).abs() < 1e-6);
}

#[test]
fn orthogonal_edges_are_axis_aligned() {
    let config = LayoutConfig {
        routing: RoutingMode::Orthogonal,
        ..Default::default()
    };
    let builder = GraphBuilder::with_config(config);
    for (t, h) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("a", "d")] {
        builder.add_edge(EdgeSpec::new(t, h));
    }
    builder.add_container(None, ContainerSpec::bordered("left").with_nodes(["b"]));
    let result = layout(&builder.build().unwrap()).unwrap();
    for (id, e) in &result.edges {
        assert_eq!(e.routing, RoutingMode::Orthogonal);
        assert!(
            stratum::routing::is_axis_aligned(&e.points),
            "{id}: {:?}",
            e.points
        );
        let inner_points = &e.points[1..e.points.len() - 1];
        for (node, g) in &result.nodes {
            let inner = g.rect().inflate(-1e-6, -1e-6);
            assert!(
                inner_points.iter().all(|p| !inner.contains_strictly(*p)),
                "{id} bends inside {node}"
            );
        }
    }
}

#[test]
fn per_edge_routing_override() {
    let builder = GraphBuilder::new();
    builder.add_edge(EdgeSpec::new("a", "b").with_routing(RoutingMode::Orthogonal));
    builder.add_edge(EdgeSpec::new("a", "c"));
    let result = layout(&builder.build().unwrap()).unwrap();
    assert_eq!(result.edges["e0"].routing, RoutingMode::Orthogonal);
    assert_eq!(result.edges["e1"].routing, RoutingMode::Spline);
    assert!(stratum::routing::is_axis_aligned(&result.edges["e0"].points));
}

#[test]
fn record_ports_anchor_edges() {
    let builder = GraphBuilder::new();
    builder.add_node(
        NodeSpec::new("rec")
            .with_shape(Shape::Record)
            .with_label("<l> left|<m> middle|<r> right"),
    );
    builder.add_edge(EdgeSpec::new("rec", "x").with_ports(Some("r"), None));
    let result = layout(&builder.build().unwrap()).unwrap();
    let rec = &result.nodes["rec"];
    assert_eq!(rec.cells.len(), 4);
    let port = rec
        .cells
        .iter()
        .find(|c| c.port.as_deref() == Some("r"))
        .unwrap();
    for cell in &rec.cells {
        assert!(rec.rect().contains_rect(&cell.rect));
    }
    let tail = result.edges["e0"].tail_anchor;
    assert!(tail.x >= port.rect.x - 1e-6 && tail.x <= port.rect.right() + 1e-6);
    assert!((tail.y - rec.rect().bottom()).abs() < 1e-6);
}

#[test]
fn degenerate_sizes_are_clamped() {
    let builder = GraphBuilder::new();
    builder.add_node(
        NodeSpec::new("odd")
            .with_shape(Shape::Plaintext)
            .with_label("")
            .with_min_size(f64::NAN, -5.0),
    );
    builder.add_edge(EdgeSpec::new("odd", "b").with_weight(f64::NAN));
    let result = layout(&builder.build().unwrap()).unwrap();
    assert_finite(&result);
    assert_eq!(result.nodes["odd"].size, Size::new(0.0, 0.0));
}

#[test]
fn empty_plaintext_nodes_stack_without_error() {
    let builder = GraphBuilder::new();
    for id in ["a", "b"] {
        builder.add_node(NodeSpec::new(id).with_shape(Shape::Plaintext).with_label(""));
    }
    builder.add_edge(EdgeSpec::new("a", "b"));
    let result = layout(&builder.build().unwrap()).unwrap();
    assert_finite(&result);
    let edge = &result.edges["e0"];
    assert_eq!(edge.tail_anchor, result.nodes["a"].center);
    assert_eq!(edge.head_anchor, result.nodes["b"].center);
}

struct Tall;

impl ShapeStrategy for Tall {
    fn size_for_label(&self, label: Size, padding: f64) -> Size {
        Size::new(label.width + 2.0 * padding, 100.0)
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        stratum::util::intersect_rect(bounds, toward)
    }
}

#[test]
fn custom_shapes_come_from_the_registry() {
    let mut registry = Registry::with_defaults();
    registry.register_shape("tall", Arc::new(Tall));
    let builder = GraphBuilder::new();
    builder.add_node(NodeSpec::new("t").with_shape(Shape::Custom("tall".to_string())));
    builder.add_node(NodeSpec::new("u").with_shape(Shape::Custom("unknown".to_string())));
    let snapshot = builder.build().unwrap();
    let result = layout_with_registry(&snapshot, &registry).unwrap();
    assert_eq!(result.nodes["t"].size.height, 100.0);
    assert!(result.nodes["u"].size.height < 100.0);
}

#[test]
fn snapshots_lay_out_in_parallel() {
    let snapshot = build(LayoutConfig::default(), &[("a", "b"), ("b", "c"), ("a", "c")]);
    let expected = layout(&snapshot).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| layout(&snapshot).unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
