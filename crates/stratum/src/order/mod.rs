//! Crossing minimization.
//!
//! Starts from a depth-first layering and alternates downward and upward median sweeps. After
//! each layer is reordered, bordered containers are regrouped so they stay contiguous, then a
//! transpose pass swaps neighbors while that removes crossings. The best layering seen is kept.

mod cross_count;
mod grouping;
mod init_order;
mod layers;
mod median;
mod transpose;

pub use cross_count::cross_count;
pub use layers::LayerGraph;
pub use median::weighted_median;

use crate::model::WorkGraph;
use layers::positions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderOptions {
    pub max_iterations: usize,
    /// Sweeps without improvement before giving up.
    pub stall_limit: usize,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            max_iterations: 24,
            stall_limit: 4,
        }
    }
}

/// Assigns `order` to every node of `g`. Returns the crossing count of the chosen layering.
pub fn order(g: &mut WorkGraph, options: &OrderOptions) -> f64 {
    let lg = LayerGraph::from_graph(g);
    let mut layering = init_order::init_order(&lg);
    for layer in layering.iter_mut() {
        grouping::group_by_cluster(&lg, layer);
    }

    let mut best = layering.clone();
    let mut best_cc = cross_count(&lg, &layering);
    let mut stall = 0usize;
    let mut sweeps = 0usize;

    for i in 0..options.max_iterations {
        if best_cc <= 0.0 || stall >= options.stall_limit {
            break;
        }
        sweeps += 1;
        sweep(&lg, &mut layering, i % 2 == 0);
        transpose::transpose(&lg, &mut layering);
        let cc = cross_count(&lg, &layering);
        if cc < best_cc {
            best = layering.clone();
            best_cc = cc;
            stall = 0;
        } else {
            stall += 1;
        }
    }
    tracing::debug!(crossings = best_cc, sweeps, "order");

    for layer in &best {
        for (i, &v) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(&lg.ids[v]) {
                n.order = Some(i);
            }
        }
    }
    best_cc
}

fn sweep(lg: &LayerGraph, layering: &mut [Vec<usize>], downward: bool) {
    let ranks: Vec<usize> = if downward {
        (1..layering.len()).collect()
    } else {
        (0..layering.len().saturating_sub(1)).rev().collect()
    };
    for r in ranks {
        let pos = positions(layering, lg.len());
        median::reorder_layer(lg, &mut layering[r], &pos, downward);
        grouping::group_by_cluster(lg, &mut layering[r]);
    }
}
