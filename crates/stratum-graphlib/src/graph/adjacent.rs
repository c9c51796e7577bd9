//! Lazy neighbor iteration.

use super::entries::{EdgeEntry, NodeEntry};

/// Neighbors of one vertex, one item per touching edge, in edge insertion order.
///
/// The iterator merges the vertex's outgoing and incoming incidence lists. A self loop appears
/// in both lists under the same slot and is yielded once. Cloning an `Adjacent` restarts nothing
/// and allocates nothing; clone it before consuming to iterate again.
pub struct Adjacent<'a, N, E> {
    pub(in crate::graph) nodes: &'a [Option<NodeEntry<N>>],
    pub(in crate::graph) edges: &'a [Option<EdgeEntry<E>>],
    pub(in crate::graph) center: usize,
    pub(in crate::graph) out: &'a [usize],
    pub(in crate::graph) in_: &'a [usize],
}

impl<N, E> Clone for Adjacent<'_, N, E> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            edges: self.edges,
            center: self.center,
            out: self.out,
            in_: self.in_,
        }
    }
}

impl<'a, N, E> Adjacent<'a, N, E> {
    pub(in crate::graph) fn empty(
        nodes: &'a [Option<NodeEntry<N>>],
        edges: &'a [Option<EdgeEntry<E>>],
    ) -> Self {
        Self {
            nodes,
            edges,
            center: usize::MAX,
            out: &[],
            in_: &[],
        }
    }

    fn next_edge(&mut self) -> Option<usize> {
        match (self.out.split_first(), self.in_.split_first()) {
            (Some((&o, out_rest)), Some((&i, in_rest))) => {
                if o < i {
                    self.out = out_rest;
                    Some(o)
                } else if i < o {
                    self.in_ = in_rest;
                    Some(i)
                } else {
                    self.out = out_rest;
                    self.in_ = in_rest;
                    Some(o)
                }
            }
            (Some((&o, rest)), None) => {
                self.out = rest;
                Some(o)
            }
            (None, Some((&i, rest))) => {
                self.in_ = rest;
                Some(i)
            }
            (None, None) => None,
        }
    }
}

impl<'a, N, E> Iterator for Adjacent<'a, N, E> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slot = self.next_edge()?;
            let Some(edge) = self.edges.get(slot).and_then(Option::as_ref) else {
                continue;
            };
            let other = edge.opposite(self.center);
            if let Some(node) = self.nodes.get(other).and_then(Option::as_ref) {
                return Some(node.id.as_str());
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lo = self.out.len().max(self.in_.len());
        (lo, Some(self.out.len() + self.in_.len()))
    }
}
