//! Network simplex ranking.
//!
//! Optimal layering for the weighted edge-length objective: start from a longest-path layering,
//! build a tight spanning forest, then pivot on forest edges with negative cut values until none
//! is left.

use super::feasible_tree::feasible_tree;
use super::tree::SpanningTree;
use super::util::{self, SimplexProblem};
use crate::error::Result;

const CUT_EPSILON: f64 = 1e-9;

pub fn network_simplex(p: &SimplexProblem) -> Result<Vec<i64>> {
    let mut ranks = util::longest_path(p)?;
    if p.n == 0 {
        return Ok(ranks);
    }
    let mut t = feasible_tree(p, &mut ranks);
    t.init_low_lim(p);
    init_cut_values(p, &mut t);

    let max_pivots = (p.n * 100).max(1000);
    let mut pivots = 0usize;
    while let Some(leave) = leave_edge(&t) {
        if pivots >= max_pivots {
            tracing::warn!(pivots, "network simplex stopped at the pivot cap");
            break;
        }
        let Some(enter) = enter_edge(p, &t, &ranks, leave) else {
            break;
        };
        exchange_edges(p, &mut t, &mut ranks, leave, enter);
        pivots += 1;
    }
    tracing::trace!(nodes = p.n, edges = p.edges.len(), pivots, "network simplex");

    util::normalize(&mut ranks);
    Ok(ranks)
}

/// Cut values for every forest edge, children before parents.
pub fn init_cut_values(p: &SimplexProblem, t: &mut SpanningTree) {
    let mut order = t.preorder(p);
    order.reverse();
    for v in order {
        if t.parent[v].is_some() {
            t.cut[v] = calc_cut_value(p, t, v);
        }
    }
}

/// Cut value of the forest edge between `child` and its parent, assuming every forest edge
/// below `child` already has its cut value.
fn calc_cut_value(p: &SimplexProblem, t: &SpanningTree, child: usize) -> f64 {
    let (Some(parent), Some(pe)) = (t.parent[child], t.parent_edge[child]) else {
        return 0.0;
    };
    let child_is_tail = p.edges[pe].tail == child;
    let mut cut = p.edges[pe].weight;

    for &e in &p.incident[child] {
        if e == pe {
            continue;
        }
        let edge = &p.edges[e];
        let is_out = edge.tail == child;
        let other = if is_out { edge.head } else { edge.tail };
        if other == parent {
            continue;
        }
        let points_to_head = is_out == child_is_tail;
        cut += if points_to_head { edge.weight } else { -edge.weight };
        if t.tree_edge[e] && t.parent[other] == Some(child) {
            let other_cut = t.cut[other];
            cut += if points_to_head { -other_cut } else { other_cut };
        }
    }
    cut
}

/// First forest edge (by child node) with a negative cut value, reported as that child.
fn leave_edge(t: &SpanningTree) -> Option<usize> {
    (0..t.parent.len()).find(|&v| t.parent[v].is_some() && t.cut[v] < -CUT_EPSILON)
}

/// Non-forest edge with minimal slack that reconnects the two halves left by removing the
/// forest edge above `child`.
fn enter_edge(p: &SimplexProblem, t: &SpanningTree, ranks: &[i64], child: usize) -> Option<usize> {
    let pe = t.parent_edge[child]?;
    // `flip` when the graph edge points from the parent side into the subtree.
    let flip = p.edges[pe].head == child;

    let mut best: Option<(i64, usize)> = None;
    for (e, edge) in p.edges.iter().enumerate() {
        if e == pe {
            continue;
        }
        let tail_in = t.is_descendant(edge.tail, child);
        let head_in = t.is_descendant(edge.head, child);
        if flip != tail_in || flip == head_in {
            continue;
        }
        let slack = p.slack(ranks, e);
        if best.is_none_or(|(s, _)| slack < s) {
            best = Some((slack, e));
        }
    }
    best.map(|(_, e)| e)
}

fn exchange_edges(
    p: &SimplexProblem,
    t: &mut SpanningTree,
    ranks: &mut [i64],
    child: usize,
    enter: usize,
) {
    if let Some(pe) = t.parent_edge[child] {
        t.tree_edge[pe] = false;
    }
    t.tree_edge[enter] = true;
    t.init_low_lim(p);
    init_cut_values(p, t);
    update_ranks(p, t, ranks);
}

/// Makes every forest edge tight again, walking down from the roots.
fn update_ranks(p: &SimplexProblem, t: &SpanningTree, ranks: &mut [i64]) {
    for v in t.preorder(p) {
        let (Some(parent), Some(e)) = (t.parent[v], t.parent_edge[v]) else {
            continue;
        };
        let edge = &p.edges[e];
        ranks[v] = if edge.tail == parent {
            ranks[parent] + edge.minlen
        } else {
            ranks[parent] - edge.minlen
        };
    }
}
