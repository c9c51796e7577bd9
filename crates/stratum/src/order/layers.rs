//! Index-based view of the working graph used while ordering.

use crate::model::WorkGraph;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone)]
pub struct LayerGraph {
    pub ids: Vec<String>,
    pub rank: Vec<usize>,
    pub cluster_path: Vec<Vec<usize>>,
    /// Incoming `(tail, weight)` per node, in edge order.
    pub preds: Vec<Vec<(usize, f64)>>,
    /// Outgoing `(head, weight)` per node, in edge order.
    pub succs: Vec<Vec<(usize, f64)>>,
    pub rank_count: usize,
}

impl LayerGraph {
    pub fn from_graph(g: &WorkGraph) -> Self {
        let ids: Vec<String> = g.node_ids();
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let mut rank = vec![0usize; ids.len()];
        let mut cluster_path = vec![Vec::new(); ids.len()];
        let mut rank_count = 0usize;
        for (i, id) in ids.iter().enumerate() {
            if let Some(n) = g.node(id) {
                rank[i] = n.rank.unwrap_or(0).max(0) as usize;
                cluster_path[i] = n.cluster_path.clone();
                rank_count = rank_count.max(rank[i] + 1);
            }
        }
        let mut preds = vec![Vec::new(); ids.len()];
        let mut succs = vec![Vec::new(); ids.len()];
        g.for_each_edge(|e, lbl| {
            let (Some(&v), Some(&w)) = (index.get(e.v.as_str()), index.get(e.w.as_str())) else {
                return;
            };
            if v == w {
                return;
            }
            let weight = if lbl.weight.is_finite() { lbl.weight } else { 0.0 };
            succs[v].push((w, weight));
            preds[w].push((v, weight));
        });
        Self {
            ids,
            rank,
            cluster_path,
            preds,
            succs,
            rank_count,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Position of every node inside its layer.
pub fn positions(layering: &[Vec<usize>], n: usize) -> Vec<usize> {
    let mut pos = vec![0usize; n];
    for layer in layering {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }
    pos
}

#[cfg(test)]
pub(crate) fn two_layers(edges: &[(usize, usize)], cluster_path: Vec<Vec<usize>>) -> LayerGraph {
    let n = cluster_path.len();
    let mut preds = vec![Vec::new(); n];
    let mut succs = vec![Vec::new(); n];
    for &(u, v) in edges {
        succs[u].push((v, 1.0));
        preds[v].push((u, 1.0));
    }
    LayerGraph {
        ids: (0..n).map(|i| format!("n{i}")).collect(),
        rank: (0..n).map(|i| usize::from(i >= n / 2)).collect(),
        cluster_path,
        preds,
        succs,
        rank_count: 2,
    }
}
