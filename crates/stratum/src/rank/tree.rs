//! Spanning forest state for the network simplex.

use super::util::SimplexProblem;

#[derive(Debug, Clone, Default)]
pub struct SpanningTree {
    pub in_tree: Vec<bool>,
    /// Edge index -> whether it belongs to the forest.
    pub tree_edge: Vec<bool>,
    pub roots: Vec<usize>,
    pub parent: Vec<Option<usize>>,
    /// Forest edge linking a node to its parent.
    pub parent_edge: Vec<Option<usize>>,
    pub low: Vec<usize>,
    pub lim: Vec<usize>,
    /// Cut value of the forest edge above each non-root node.
    pub cut: Vec<f64>,
}

impl SpanningTree {
    pub fn new(p: &SimplexProblem) -> Self {
        Self {
            in_tree: vec![false; p.n],
            tree_edge: vec![false; p.edges.len()],
            roots: Vec::new(),
            parent: vec![None; p.n],
            parent_edge: vec![None; p.n],
            low: vec![0; p.n],
            lim: vec![0; p.n],
            cut: vec![0.0; p.n],
        }
    }

    pub fn edge_count(&self) -> usize {
        self.tree_edge.iter().filter(|t| **t).count()
    }

    /// Whether `v` lies in the subtree rooted at `root`.
    pub fn is_descendant(&self, v: usize, root: usize) -> bool {
        self.low[root] <= self.lim[v] && self.lim[v] <= self.lim[root]
    }

    /// Re-derives parents and postorder `low`/`lim` numbers from the forest edges. Numbers are
    /// unique across the whole forest.
    pub fn init_low_lim(&mut self, p: &SimplexProblem) {
        self.parent.iter_mut().for_each(|x| *x = None);
        self.parent_edge.iter_mut().for_each(|x| *x = None);
        let mut visited = vec![false; p.n];
        let mut next_lim = 1usize;
        let roots = self.roots.clone();
        for root in roots {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            self.low[root] = next_lim;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some(&mut (v, ref mut next)) = stack.last_mut() {
                let incident = &p.incident[v];
                let mut pushed = None;
                while *next < incident.len() {
                    let e = incident[*next];
                    *next += 1;
                    if !self.tree_edge[e] {
                        continue;
                    }
                    let edge = &p.edges[e];
                    let w = if edge.tail == v { edge.head } else { edge.tail };
                    if visited[w] {
                        continue;
                    }
                    visited[w] = true;
                    self.parent[w] = Some(v);
                    self.parent_edge[w] = Some(e);
                    self.low[w] = next_lim;
                    pushed = Some(w);
                    break;
                }
                match pushed {
                    Some(w) => stack.push((w, 0)),
                    None => {
                        self.lim[v] = next_lim;
                        next_lim += 1;
                        stack.pop();
                    }
                }
            }
        }
    }

    /// Nodes in preorder, forest by forest.
    pub fn preorder(&self, p: &SimplexProblem) -> Vec<usize> {
        let mut out = Vec::with_capacity(p.n);
        let mut stack: Vec<usize> = Vec::new();
        for &root in &self.roots {
            stack.push(root);
            while let Some(v) = stack.pop() {
                out.push(v);
                for &e in p.incident[v].iter().rev() {
                    if !self.tree_edge[e] {
                        continue;
                    }
                    let edge = &p.edges[e];
                    let w = if edge.tail == v { edge.head } else { edge.tail };
                    if self.parent[w] == Some(v) && self.parent_edge[w] == Some(e) {
                        stack.push(w);
                    }
                }
            }
        }
        out
    }
}
