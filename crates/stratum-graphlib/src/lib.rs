//! Graph container used by `stratum`.
//!
//! Vertices are keyed by string ids, edges by `(v, w, name)`. Every vertex keeps its own
//! incidence lists in edge insertion order, so adjacency queries cost O(degree) and iterate in a
//! stable, restartable order.

pub mod graph;

pub use graph::{Adjacent, EdgeKey, Graph, GraphOptions, alg};
