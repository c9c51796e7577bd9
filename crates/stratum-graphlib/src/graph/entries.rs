//! Internal storage slots for [`Graph`](super::Graph).
//!
//! Slots are never reused; removal leaves a tombstone until the owning vector is compacted.
//! Incidence lists hold edge slot indices in ascending order, which is insertion order.

use super::EdgeKey;

#[derive(Debug, Clone)]
pub(in crate::graph) struct NodeEntry<N> {
    pub(in crate::graph) id: String,
    pub(in crate::graph) label: N,
    pub(in crate::graph) out_edges: Vec<usize>,
    pub(in crate::graph) in_edges: Vec<usize>,
}

impl<N> NodeEntry<N> {
    pub(in crate::graph) fn new(id: String, label: N) -> Self {
        Self {
            id,
            label,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Self loops sit in both lists, so they count twice.
    pub(in crate::graph) fn degree(&self) -> usize {
        self.out_edges.len() + self.in_edges.len()
    }
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct EdgeEntry<E> {
    pub(in crate::graph) key: EdgeKey,
    pub(in crate::graph) v_ix: usize,
    pub(in crate::graph) w_ix: usize,
    pub(in crate::graph) label: E,
}

impl<E> EdgeEntry<E> {
    pub(in crate::graph) fn opposite(&self, ix: usize) -> usize {
        if self.v_ix == ix { self.w_ix } else { self.v_ix }
    }
}
