//! Tight spanning forest construction.
//!
//! Starting from any node, grow a tree of tight edges (slack 0). When it cannot grow, pick the
//! incident non-tree edge with the smallest slack and shift the whole tree so that edge becomes
//! tight. Components without edges between them get their own root.

use super::tree::SpanningTree;
use super::util::SimplexProblem;

pub fn feasible_tree(p: &SimplexProblem, ranks: &mut [i64]) -> SpanningTree {
    let mut t = SpanningTree::new(p);
    let mut component: Vec<usize> = Vec::new();

    for start in 0..p.n {
        if t.in_tree[start] {
            continue;
        }
        t.in_tree[start] = true;
        t.roots.push(start);
        component.clear();
        component.push(start);

        loop {
            tight_tree(p, ranks, &mut t, &mut component);
            let Some((e, in_tail)) = min_slack_edge(p, ranks, &t, &component) else {
                break;
            };
            let slack = p.slack(ranks, e);
            let delta = if in_tail { slack } else { -slack };
            for &v in &component {
                ranks[v] += delta;
            }
        }
    }
    t
}

/// Adds every node reachable from `component` through tight edges.
fn tight_tree(p: &SimplexProblem, ranks: &[i64], t: &mut SpanningTree, component: &mut Vec<usize>) {
    let mut stack: Vec<usize> = component.clone();
    while let Some(v) = stack.pop() {
        for &e in &p.incident[v] {
            let edge = &p.edges[e];
            let w = if edge.tail == v { edge.head } else { edge.tail };
            if t.in_tree[w] || p.slack(ranks, e) != 0 {
                continue;
            }
            t.in_tree[w] = true;
            t.tree_edge[e] = true;
            component.push(w);
            stack.push(w);
        }
    }
}

/// Non-tree edge with exactly one endpoint in the current component and the smallest slack.
/// The flag tells whether the tail is the endpoint inside.
fn min_slack_edge(
    p: &SimplexProblem,
    ranks: &[i64],
    t: &SpanningTree,
    component: &[usize],
) -> Option<(usize, bool)> {
    let mut best: Option<(i64, usize, bool)> = None;
    for &v in component {
        for &e in &p.incident[v] {
            let edge = &p.edges[e];
            let in_tail = t.in_tree[edge.tail];
            if in_tail == t.in_tree[edge.head] {
                continue;
            }
            let slack = p.slack(ranks, e);
            let better = match best {
                None => true,
                Some((s, ix, _)) => slack < s || (slack == s && e < ix),
            };
            if better {
                best = Some((slack, e, in_tail));
            }
        }
    }
    best.map(|(_, e, in_tail)| (e, in_tail))
}
