//! Layout configuration.
//!
//! `LayoutConfig` is a plain serde struct. Callers can start from the defaults and apply partial
//! JSON overrides, which are deep-merged onto the current values before being read back.

use crate::error::{Error, Result};
use crate::model::RankDir;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ranker {
    #[default]
    NetworkSimplex,
    TightTree,
    LongestPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acyclicer {
    #[default]
    Dfs,
    Greedy,
}

/// Which coordinate assignment strategy positions nodes within their rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateMode {
    /// Left packing, every rank centered on the widest one.
    Legacy,
    /// Brandes-Köpf alignment and compaction.
    #[default]
    Default,
    /// Network simplex over an auxiliary constraint graph.
    Improved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingMode {
    #[default]
    Spline,
    Polyline,
    Orthogonal,
}

/// Horizontal placement of a node's label inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub rank_dir: RankDir,
    pub node_sep: f64,
    pub rank_sep: f64,
    pub edge_sep: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub ranker: Ranker,
    pub acyclicer: Acyclicer,
    pub coordinates: CoordinateMode,
    pub routing: RoutingMode,
    pub justify: Justify,
    pub max_order_iterations: usize,
    pub cluster_padding: f64,
    /// Height of the band reserved for a bordered container's label.
    pub cluster_label_height: f64,
    pub node_padding: f64,
    pub record_padding: f64,
    /// Name of the text measurer looked up in the registry.
    pub measurer: String,
    pub bend_penalty: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_dir: RankDir::TB,
            node_sep: 50.0,
            rank_sep: 50.0,
            edge_sep: 20.0,
            margin_x: 0.0,
            margin_y: 0.0,
            ranker: Ranker::NetworkSimplex,
            acyclicer: Acyclicer::Dfs,
            coordinates: CoordinateMode::Default,
            routing: RoutingMode::Spline,
            justify: Justify::Center,
            max_order_iterations: 24,
            cluster_padding: 8.0,
            cluster_label_height: 16.0,
            node_padding: 8.0,
            record_padding: 4.0,
            measurer: crate::registry::DEFAULT_MEASURER.to_string(),
            bend_penalty: 40,
        }
    }
}

impl LayoutConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        let mut config = Self::default();
        config.merge_value(&value)?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Deep-merges `overrides` onto the current values. On error `self` is left untouched.
    pub fn merge_value(&mut self, overrides: &Value) -> Result<()> {
        if !overrides.is_object() {
            return Err(Error::Config {
                message: "configuration overrides must be a JSON object".to_string(),
            });
        }
        let mut base = self.to_value();
        deep_merge_value(&mut base, overrides);
        let merged: LayoutConfig = serde_json::from_value(base).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    pub fn get(&self, dotted_path: &str) -> Option<Value> {
        let root = self.to_value();
        let mut cur = &root;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur.clone())
    }

    fn validate(&self) -> Result<()> {
        let spacings = [
            ("nodeSep", self.node_sep),
            ("rankSep", self.rank_sep),
            ("edgeSep", self.edge_sep),
            ("clusterPadding", self.cluster_padding),
            ("clusterLabelHeight", self.cluster_label_height),
            ("nodePadding", self.node_padding),
            ("recordPadding", self.record_padding),
        ];
        for (name, value) in spacings {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config {
                    message: format!("`{name}` must be a finite, non-negative number"),
                });
            }
        }
        if !self.margin_x.is_finite() || !self.margin_y.is_finite() {
            return Err(Error::Config {
                message: "margins must be finite".to_string(),
            });
        }
        Ok(())
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_replaces_leaves_and_keeps_siblings() {
        let mut base = json!({"a": {"b": 1, "c": 2}, "d": 3});
        deep_merge_value(&mut base, &json!({"a": {"b": 9}}));
        assert_eq!(base, json!({"a": {"b": 9, "c": 2}, "d": 3}));
    }
}
