//! Layer assignment.
//!
//! Ranking runs on a separate graph over rank-class leaders (see [`constraints`]), so `same`,
//! `min` and `max` containers are honored by construction. Ranks are then copied back to every
//! member of the working graph.

pub mod constraints;
pub mod feasible_tree;
pub mod network_simplex;
pub mod tree;
pub mod util;

use crate::acyclic;
use crate::config::Ranker;
use crate::error::Result;
use crate::graphlib::{EdgeKey, Graph, GraphOptions};
use crate::model::{EdgeLabel, GraphLabel, NodeLabel, WorkGraph};
use constraints::MergePlan;
use util::SimplexProblem;

/// Ranks every node of an acyclic graph with the graph's configured ranker. The smallest rank
/// is zero.
pub fn rank(g: &mut WorkGraph) -> Result<()> {
    let (ids, p) = SimplexProblem::from_graph(g);
    let ranks = match g.graph().ranker {
        Ranker::NetworkSimplex => network_simplex::network_simplex(&p)?,
        Ranker::TightTree => {
            let mut r = util::longest_path(&p)?;
            feasible_tree::feasible_tree(&p, &mut r);
            util::normalize(&mut r);
            r
        }
        Ranker::LongestPath => {
            let mut r = util::longest_path(&p)?;
            util::normalize(&mut r);
            r
        }
    };
    for (id, r) in ids.iter().zip(ranks) {
        if let Some(n) = g.node_mut(id) {
            n.rank = Some(r as i32);
        }
    }
    Ok(())
}

/// Builds the leader graph for `w` under `plan`.
pub fn rank_graph(w: &WorkGraph, plan: &MergePlan) -> WorkGraph {
    let mut r: WorkGraph = Graph::new(GraphOptions::directed().multigraph());
    r.set_graph(GraphLabel {
        ranker: w.graph().ranker,
        acyclicer: w.graph().acyclicer,
        ..Default::default()
    });
    for leader in plan.leaders() {
        r.set_node(leader, NodeLabel::default());
    }

    let mut next = 0usize;
    let mut name = || {
        next += 1;
        format!("r{next}")
    };

    w.for_each_edge(|e, lbl| {
        if e.is_loop() || !lbl.constraint {
            return;
        }
        let (lv, lw) = (plan.leader(&e.v), plan.leader(&e.w));
        if lv == lw {
            return;
        }
        let reverse = (0..plan.scopes.len()).any(|i| {
            let s = &plan.scopes[i];
            let into_min = s.min.as_ref().is_some_and(|m| m.leader == lw) && plan.in_scope(i, &e.v);
            let out_of_max =
                s.max.as_ref().is_some_and(|m| m.leader == lv) && plan.in_scope(i, &e.w);
            into_min || out_of_max
        });
        let (t, h) = if reverse { (lw, lv) } else { (lv, lw) };
        let label = EdgeLabel {
            minlen: lbl.minlen,
            weight: lbl.weight,
            ..Default::default()
        };
        r.set_edge_named(t, h, Some(name()), Some(label));
    });

    for (i, scope) in plan.scopes.iter().enumerate() {
        let mut members: Vec<&str> = Vec::new();
        for node in plan.nodes() {
            if !plan.in_scope(i, node) {
                continue;
            }
            let leader = plan.leader(node);
            if !members.contains(&leader) {
                members.push(leader);
            }
        }
        for extreme in [&scope.min, &scope.max].into_iter().flatten() {
            let is_min = scope.min.as_ref() == Some(extreme);
            for &other in &members {
                if other == extreme.leader {
                    continue;
                }
                let label = EdgeLabel {
                    minlen: usize::from(extreme.exclusive),
                    weight: 0.0,
                    ..Default::default()
                };
                let (t, h) = if is_min {
                    (extreme.leader.as_str(), other)
                } else {
                    (other, extreme.leader.as_str())
                };
                r.set_edge_named(t, h, Some(name()), Some(label));
            }
        }
    }
    r
}

/// Ranks the working graph through its leader graph and copies ranks to every member.
pub fn assign_ranks(w: &mut WorkGraph, plan: &MergePlan) -> Result<()> {
    let mut r = rank_graph(w, plan);
    acyclic::run(&mut r);
    rank(&mut r)?;
    let ids = w.node_ids();
    for id in ids {
        let rank = r.node(plan.leader(&id)).and_then(|n| n.rank).unwrap_or(0);
        if let Some(n) = w.node_mut(&id) {
            n.rank = Some(rank);
        }
    }
    tracing::debug!(
        classes = r.node_count(),
        max_rank = crate::util::max_rank(w).unwrap_or(0),
        "ranks assigned"
    );
    Ok(())
}

/// Points every working edge downward: edges whose ranks ended up inverted are reversed and
/// same-rank edges are parked on the graph label as flat edges.
pub fn orient_edges(w: &mut WorkGraph) {
    let keys: Vec<EdgeKey> = w.edge_keys();
    for e in keys {
        if e.is_loop() {
            continue;
        }
        let rv = w.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
        let rw = w.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
        if rv > rw {
            acyclic::reverse_edge(w, &e);
        } else if rv == rw {
            if let Some(label) = w.remove_edge_key(&e) {
                w.graph_mut().flat_edges.push((e, label));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> WorkGraph {
        let mut g: WorkGraph = Graph::new(GraphOptions::directed().multigraph());
        for (v, w) in edges {
            g.set_edge_with_label(*v, *w, EdgeLabel::default());
        }
        g
    }

    #[test]
    fn each_ranker_respects_minlen() {
        for ranker in [Ranker::NetworkSimplex, Ranker::TightTree, Ranker::LongestPath] {
            let mut g = graph(&[("a", "b"), ("b", "c"), ("a", "c"), ("c", "d")]);
            g.graph_mut().ranker = ranker;
            rank(&mut g).unwrap();
            for e in g.edge_keys() {
                let rv = g.node(&e.v).unwrap().rank.unwrap();
                let rw = g.node(&e.w).unwrap().rank.unwrap();
                assert!(rw - rv >= 1, "{ranker:?} {e}");
            }
        }
    }

    #[test]
    fn flat_and_inverted_edges_are_oriented() {
        let mut g = graph(&[("a", "b"), ("b", "c")]);
        for (id, r) in [("a", 0), ("b", 0), ("c", 1)] {
            g.node_mut(id).unwrap().rank = Some(r);
        }
        g.set_edge_with_label("c", "a", EdgeLabel::default());
        orient_edges(&mut g);
        assert_eq!(g.graph().flat_edges.len(), 1);
        let reversed: Vec<_> = g
            .edge_keys()
            .into_iter()
            .filter(|e| g.edge_by_key(e).unwrap().reversed)
            .collect();
        assert_eq!(reversed.len(), 1);
        assert_eq!((reversed[0].v.as_str(), reversed[0].w.as_str()), ("a", "c"));
    }
}
