//! Index-based ranking problem shared by the rankers and the improved coordinate strategy.

use crate::error::{Error, Result};
use crate::model::WorkGraph;
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexEdge {
    pub tail: usize,
    pub head: usize,
    pub minlen: i64,
    pub weight: f64,
}

/// Nodes `0..n` and edges asking for `rank(head) - rank(tail) >= minlen`, minimizing
/// `sum(weight * (rank(head) - rank(tail)))`.
#[derive(Debug, Clone, Default)]
pub struct SimplexProblem {
    pub n: usize,
    pub edges: Vec<SimplexEdge>,
    /// Incident edge indices per node, in edge order.
    pub incident: Vec<Vec<usize>>,
}

impl SimplexProblem {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            edges: Vec::new(),
            incident: vec![Vec::new(); n],
        }
    }

    /// Adds a constraint; parallel edges merge into one (largest minlen, summed weight).
    /// Self loops are ignored.
    pub fn add_edge(&mut self, tail: usize, head: usize, minlen: i64, weight: f64) {
        if tail == head || tail >= self.n || head >= self.n {
            return;
        }
        let existing = self.incident[tail]
            .iter()
            .copied()
            .find(|&e| self.edges[e].tail == tail && self.edges[e].head == head);
        if let Some(e) = existing {
            let edge = &mut self.edges[e];
            edge.minlen = edge.minlen.max(minlen);
            edge.weight += weight;
            return;
        }
        let ix = self.edges.len();
        self.edges.push(SimplexEdge {
            tail,
            head,
            minlen,
            weight,
        });
        self.incident[tail].push(ix);
        self.incident[head].push(ix);
    }

    /// Problem over the nodes of `g` in insertion order. Returns the node ids alongside.
    pub fn from_graph(g: &WorkGraph) -> (Vec<String>, Self) {
        let ids: Vec<String> = g.node_ids();
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let mut p = Self::new(ids.len());
        g.for_each_edge(|e, lbl| {
            let (Some(&t), Some(&h)) = (index.get(e.v.as_str()), index.get(e.w.as_str())) else {
                return;
            };
            let weight = if lbl.weight.is_finite() { lbl.weight } else { 0.0 };
            p.add_edge(t, h, lbl.minlen as i64, weight);
        });
        (ids, p)
    }

    pub fn slack(&self, ranks: &[i64], e: usize) -> i64 {
        let edge = &self.edges[e];
        ranks[edge.head] - ranks[edge.tail] - edge.minlen
    }
}

/// Longest-path layering: sinks sit on rank 0 and every other node as low as its out edges
/// allow. A cycle is an execution error.
pub fn longest_path(p: &SimplexProblem) -> Result<Vec<i64>> {
    let mut out_left: Vec<usize> = vec![0; p.n];
    for e in &p.edges {
        out_left[e.tail] += 1;
    }
    let mut queue: VecDeque<usize> = (0..p.n).filter(|&v| out_left[v] == 0).collect();
    let mut rank: Vec<Option<i64>> = vec![None; p.n];
    let mut done = 0usize;
    while let Some(v) = queue.pop_front() {
        done += 1;
        let mut r: Option<i64> = None;
        for &e in &p.incident[v] {
            let edge = &p.edges[e];
            if edge.tail != v {
                continue;
            }
            let candidate = rank[edge.head].unwrap_or(0) - edge.minlen;
            r = Some(r.map_or(candidate, |cur| cur.min(candidate)));
        }
        rank[v] = Some(r.unwrap_or(0));
        for &e in &p.incident[v] {
            let edge = &p.edges[e];
            if edge.head != v {
                continue;
            }
            out_left[edge.tail] -= 1;
            if out_left[edge.tail] == 0 {
                queue.push_back(edge.tail);
            }
        }
    }
    if done < p.n {
        return Err(Error::execution("ranking graph still contains a cycle"));
    }
    Ok(rank.into_iter().map(|r| r.unwrap_or(0)).collect())
}

/// Shifts `ranks` so the smallest is zero.
pub fn normalize(ranks: &mut [i64]) {
    let Some(min) = ranks.iter().copied().min() else {
        return;
    };
    for r in ranks.iter_mut() {
        *r -= min;
    }
}
