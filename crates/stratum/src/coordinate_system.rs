//! Rank direction.
//!
//! Layering and positioning always work top to bottom. For left-to-right drawings node sizes are
//! swapped before positioning and axes swapped back afterwards; bottom-to-top and right-to-left
//! drawings mirror the rank axis.

use crate::model::{RankDir, WorkGraph};

pub fn adjust(g: &mut WorkGraph) {
    if g.graph().rankdir.is_horizontal() {
        swap_width_height(g);
    }
}

pub fn undo(g: &mut WorkGraph) {
    let rankdir = g.graph().rankdir;
    if matches!(rankdir, RankDir::BT | RankDir::RL) {
        reverse_y(g);
    }
    if rankdir.is_horizontal() {
        swap_xy(g);
        swap_width_height(g);
    }
}

fn swap_width_height(g: &mut WorkGraph) {
    g.for_each_node_mut(|_, n| {
        (n.width, n.height) = (n.height, n.width);
        for se in &mut n.self_edges {
            (se.label.width, se.label.height) = (se.label.height, se.label.width);
        }
    });
    g.for_each_edge_mut(|_, e| {
        (e.width, e.height) = (e.height, e.width);
    });
}

fn reverse_y(g: &mut WorkGraph) {
    g.for_each_node_mut(|_, n| {
        if let Some(y) = n.y.as_mut() {
            *y = -*y;
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.y = -p.y;
        }
        if let Some(y) = e.y.as_mut() {
            *y = -*y;
        }
    });
}

fn swap_xy(g: &mut WorkGraph) {
    g.for_each_node_mut(|_, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(y);
            n.y = Some(x);
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            (p.x, p.y) = (p.y, p.x);
        }
        if let (Some(x), Some(y)) = (e.x, e.y) {
            e.x = Some(y);
            e.y = Some(x);
        }
    });
}
