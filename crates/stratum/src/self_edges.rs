//! Self loops.
//!
//! Loops are taken out of the working graph before ranking, get a placeholder node right after
//! their node once ordering is done, and become a five-point loop around the node's right side
//! after positioning.

use crate::model::{DummyKind, NodeLabel, Point, SelfEdge, WorkGraph};
use crate::util::{add_dummy_node, build_layer_matrix};

pub fn remove_self_edges(g: &mut WorkGraph) {
    for e in g.edge_keys() {
        if !e.is_loop() {
            continue;
        }
        let Some(label) = g.remove_edge_key(&e) else {
            continue;
        };
        if let Some(n) = g.node_mut(&e.v) {
            n.self_edges.push(SelfEdge { edge_obj: e, label });
        }
    }
}

/// Inserts one placeholder per loop directly after its node and renumbers `order` in each rank.
pub fn insert_self_edges(g: &mut WorkGraph) {
    for layer in build_layer_matrix(g) {
        let mut extra = 0usize;
        for (idx, id) in layer.iter().enumerate() {
            let Some(node) = g.node_mut(id) else {
                continue;
            };
            node.order = Some(idx + extra);
            let rank = node.rank;
            let cluster_path = node.cluster_path.clone();
            let loops = std::mem::take(&mut node.self_edges);
            for se in loops {
                extra += 1;
                add_dummy_node(
                    g,
                    "_se",
                    NodeLabel {
                        width: se.label.width,
                        height: se.label.height,
                        rank,
                        order: Some(idx + extra),
                        dummy: Some(DummyKind::SelfEdge),
                        edge_label: Some(se.label),
                        edge_obj: Some(se.edge_obj),
                        cluster_path: cluster_path.clone(),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

/// Turns every placeholder into bend points of its loop and removes the placeholder.
pub fn position_self_edges(g: &mut WorkGraph) {
    for id in g.node_ids() {
        let Some(node) = g.node(&id) else {
            continue;
        };
        if node.dummy != Some(DummyKind::SelfEdge) {
            continue;
        }
        let (Some(x), Some(y)) = (node.x, node.y) else {
            continue;
        };
        let (Some(edge_obj), Some(mut label)) = (node.edge_obj.clone(), node.edge_label.clone())
        else {
            continue;
        };
        let Some(owner) = g.node(&edge_obj.v) else {
            continue;
        };
        let (Some(vx), Some(vy)) = (owner.x, owner.y) else {
            continue;
        };

        let right = vx + owner.width / 2.0;
        let dx = x - right;
        let dy = owner.height / 2.0;
        label.points = vec![
            Point::new(right + 2.0 * dx / 3.0, vy - dy),
            Point::new(right + 5.0 * dx / 6.0, vy - dy),
            Point::new(right + dx, vy),
            Point::new(right + 5.0 * dx / 6.0, vy + dy),
            Point::new(right + 2.0 * dx / 3.0, vy + dy),
        ];
        label.x = Some(x);
        label.y = Some(y);

        g.set_edge_key(edge_obj, label);
        g.remove_node(&id);
    }
}
