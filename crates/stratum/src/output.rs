//! Layout result geometry.
//!
//! Everything here is in the final drawing frame: rank direction applied and translated so the
//! drawing starts at the configured margins.

use crate::config::RoutingMode;
use crate::model::{Point, Rect, Size};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellGeometry {
    /// Absolute rectangle of the cell.
    pub rect: Rect,
    pub text: Option<String>,
    pub port: Option<String>,
    pub is_leaf: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGeometry {
    pub center: Point,
    pub size: Size,
    pub rank: i32,
    /// Position within the rank, counted from the left (or top for horizontal drawings).
    pub order: usize,
    pub label_anchor: Point,
    /// Record cells in arena order; empty for other shapes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<CellGeometry>,
}

impl NodeGeometry {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size.width, self.size.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeGeometry {
    pub tail: String,
    pub head: String,
    pub points: Vec<Point>,
    pub routing: RoutingMode,
    pub label_anchor: Option<Point>,
    pub label_size: Option<Size>,
    pub tail_anchor: Point,
    pub head_anchor: Point,
    /// The edge was drawn against its direction to break a cycle.
    pub reversed: bool,
    /// Tail and head share a rank.
    pub flat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerGeometry {
    pub rect: Rect,
    pub bordered: bool,
    pub label_anchor: Option<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub nodes: IndexMap<String, NodeGeometry>,
    pub edges: IndexMap<String, EdgeGeometry>,
    pub containers: IndexMap<String, ContainerGeometry>,
    pub bounds: Rect,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&NodeGeometry> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeGeometry> {
        self.edges.get(id)
    }

    pub fn container(&self, id: &str) -> Option<&ContainerGeometry> {
        self.containers.get(id)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
