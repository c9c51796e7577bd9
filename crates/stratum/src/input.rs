//! Caller-facing node and edge descriptions.

use crate::config::RoutingMode;
use crate::model::LabelPos;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub shape: Shape,
    /// Display text; record nodes fall back to the node id.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub min_width: Option<f64>,
    #[serde(default)]
    pub min_height: Option<f64>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shape: Shape::Box,
            label: None,
            min_width: None,
            min_height: None,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_min_size(mut self, width: f64, height: f64) -> Self {
        self.min_width = Some(width);
        self.min_height = Some(height);
        self
    }

    pub(crate) fn display_text(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

fn default_minlen() -> usize {
    1
}

fn default_weight() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSpec {
    /// Assigned as `e{n}` by the builder when left empty.
    #[serde(default)]
    pub id: Option<String>,
    /// Node id or container id.
    pub tail: String,
    /// Node id or container id.
    pub head: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub labelpos: LabelPos,
    #[serde(default = "default_minlen")]
    pub minlen: usize,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// `false` keeps the edge out of rank assignment.
    #[serde(default = "default_true")]
    pub constraint: bool,
    #[serde(default)]
    pub routing: Option<RoutingMode>,
    /// Record port the edge leaves from.
    #[serde(default)]
    pub tail_port: Option<String>,
    /// Record port the edge arrives at.
    #[serde(default)]
    pub head_port: Option<String>,
}

impl EdgeSpec {
    pub fn new(tail: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            id: None,
            tail: tail.into(),
            head: head.into(),
            label: None,
            labelpos: LabelPos::Center,
            minlen: 1,
            weight: 1.0,
            constraint: true,
            routing: None,
            tail_port: None,
            head_port: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_labelpos(mut self, pos: LabelPos) -> Self {
        self.labelpos = pos;
        self
    }

    pub fn with_minlen(mut self, minlen: usize) -> Self {
        self.minlen = minlen;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_constraint(mut self, constraint: bool) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_routing(mut self, routing: RoutingMode) -> Self {
        self.routing = Some(routing);
        self
    }

    pub fn with_ports(mut self, tail: Option<&str>, head: Option<&str>) -> Self {
        self.tail_port = tail.map(str::to_string);
        self.head_port = head.map(str::to_string);
        self
    }
}
