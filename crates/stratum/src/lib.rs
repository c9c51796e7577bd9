#![forbid(unsafe_code)]

//! Layered graph layout with nested containers, rank constraints, record labels and orthogonal
//! edge routing.
//!
//! Build a graph with [`GraphBuilder`], freeze it into a [`GraphSnapshot`] and hand the snapshot
//! to [`layout`]:
//!
//! ```
//! use stratum::{ContainerSpec, EdgeSpec, GraphBuilder, NodeSpec, RankConstraint};
//!
//! let builder = GraphBuilder::new();
//! builder.add_node(NodeSpec::new("a"));
//! builder.add_edge(EdgeSpec::new("a", "b"));
//! builder.add_edge(EdgeSpec::new("a", "c"));
//! builder.add_container(
//!     None,
//!     ContainerSpec::loose("peers").with_nodes(["b", "c"]).with_rank(RankConstraint::Same),
//! );
//! let snapshot = builder.build().unwrap();
//! let result = stratum::layout(&snapshot).unwrap();
//! assert_eq!(result.nodes["b"].rank, result.nodes["c"].rank);
//! ```

pub use stratum_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod acyclic;
pub mod builder;
pub mod cluster;
pub mod config;
pub mod coordinate_system;
pub mod error;
pub mod input;
pub mod model;
pub mod normalize;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod position;
pub mod rank;
pub mod record;
pub mod registry;
pub mod routing;
pub mod self_edges;
pub mod shape;
pub mod util;

pub use builder::{GraphBuilder, GraphSnapshot};
pub use cluster::{ContainerKind, ContainerSpec, ContainerTree, RankConstraint};
pub use config::{Acyclicer, CoordinateMode, Justify, LayoutConfig, Ranker, RoutingMode};
pub use error::{Error, Result};
pub use input::{EdgeSpec, NodeSpec};
pub use model::{LabelPos, Point, RankDir, Rect, Size};
pub use output::{CellGeometry, ContainerGeometry, EdgeGeometry, LayoutResult, NodeGeometry};
pub use pipeline::{layout, layout_with_registry};
pub use record::{Cell, CellTree, Direction};
pub use registry::Registry;
pub use shape::{FixedWidthMeasurer, Shape, ShapeStrategy, TextMeasurer};
