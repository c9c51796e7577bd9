//! Long-edge splitting.
//!
//! An edge spanning more than one rank becomes a chain of virtual nodes, one per intermediate
//! rank, so ordering and positioning only ever see rank-adjacent edges. [`undo`] folds each
//! chain back into bend points of the original edge.

use crate::graphlib::EdgeKey;
use crate::model::{DummyKind, EdgeLabel, NodeLabel, Point, WorkGraph};
use crate::util::add_dummy_node;

pub fn run(g: &mut WorkGraph) {
    g.graph_mut().dummy_chains.clear();
    for e in g.edge_keys() {
        normalize_edge(g, e);
    }
    tracing::trace!(chains = g.graph().dummy_chains.len(), "normalize");
}

fn common_prefix(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter()
        .zip(b)
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| *x)
        .collect()
}

fn normalize_edge(g: &mut WorkGraph, e: EdgeKey) {
    let (Some(vn), Some(wn)) = (g.node(&e.v), g.node(&e.w)) else {
        return;
    };
    let v_rank = vn.rank.unwrap_or(0);
    let w_rank = wn.rank.unwrap_or(0);
    if w_rank <= v_rank + 1 {
        return;
    }
    let cluster_path = common_prefix(&vn.cluster_path, &wn.cluster_path);
    let Some(mut edge_label) = g.remove_edge_key(&e) else {
        return;
    };
    edge_label.points.clear();
    let label_rank = edge_label.label_rank;

    let mut prev = e.v.clone();
    for r in (v_rank + 1)..w_rank {
        let mut dummy = NodeLabel {
            rank: Some(r),
            dummy: Some(DummyKind::Edge),
            edge_label: Some(edge_label.clone()),
            edge_obj: Some(e.clone()),
            cluster_path: cluster_path.clone(),
            ..Default::default()
        };
        if label_rank == Some(r) {
            dummy.width = edge_label.width;
            dummy.height = edge_label.height;
            dummy.dummy = Some(DummyKind::EdgeLabel);
            dummy.labelpos = Some(edge_label.labelpos);
        }
        let id = add_dummy_node(g, "_d", dummy);
        if r == v_rank + 1 {
            g.graph_mut().dummy_chains.push(id.clone());
        }
        g.set_edge_named(
            prev,
            id.clone(),
            e.name.clone(),
            Some(EdgeLabel {
                weight: edge_label.weight,
                ..Default::default()
            }),
        );
        prev = id;
    }
    g.set_edge_named(
        prev,
        e.w.clone(),
        e.name.clone(),
        Some(EdgeLabel {
            weight: edge_label.weight,
            ..Default::default()
        }),
    );
}

pub fn undo(g: &mut WorkGraph) {
    let chains = std::mem::take(&mut g.graph_mut().dummy_chains);
    for start in chains {
        let Some(node) = g.node(&start) else {
            continue;
        };
        let (Some(mut label), Some(edge_obj)) = (node.edge_label.clone(), node.edge_obj.clone())
        else {
            continue;
        };

        let mut v = start;
        loop {
            let Some(node) = g.node(&v) else {
                break;
            };
            if !node.is_dummy() {
                break;
            }
            let next = g.successors(&v).first().map(|s| s.to_string());
            if let (Some(x), Some(y)) = (node.x, node.y) {
                label.points.push(Point::new(x, y));
                if node.dummy == Some(DummyKind::EdgeLabel) {
                    label.x = Some(x);
                    label.y = Some(y);
                    label.width = node.width;
                    label.height = node.height;
                }
            }
            g.remove_node(&v);
            match next {
                Some(next) => v = next,
                None => break,
            }
        }
        g.set_edge_key(edge_obj, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphlib::{Graph, GraphOptions};

    #[test]
    fn long_edge_becomes_chain_and_back() {
        let mut g: WorkGraph = Graph::new(GraphOptions::directed().multigraph());
        g.set_node("a", NodeLabel { rank: Some(0), ..Default::default() });
        g.set_node("b", NodeLabel { rank: Some(3), ..Default::default() });
        g.set_edge_named("a", "b", Some("e0"), Some(EdgeLabel::default()));
        run(&mut g);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.graph().dummy_chains.len(), 1);

        g.for_each_node_mut(|_, n| {
            n.x = Some(0.0);
            n.y = Some(n.rank.unwrap_or(0) as f64 * 10.0);
        });
        undo(&mut g);
        assert_eq!(g.node_count(), 2);
        let e = g.edge("a", "b", Some("e0")).unwrap();
        assert_eq!(e.points, vec![Point::new(0.0, 10.0), Point::new(0.0, 20.0)]);
    }
}
