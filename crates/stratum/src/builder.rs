//! Concurrent graph construction.
//!
//! [`GraphBuilder`] accepts nodes, edges and containers from any number of threads through
//! `&self`. [`GraphBuilder::build`] validates a copy of the accumulated state into an immutable
//! [`GraphSnapshot`], which is what the layout pipeline consumes.

use crate::cluster::{ContainerSpec, ContainerTree};
use crate::config::{Justify, LayoutConfig};
use crate::error::{Error, Result};
use crate::input::{EdgeSpec, NodeSpec};
use crate::record::{self, CellTree, Direction};
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct BuilderState {
    directed: bool,
    config: LayoutConfig,
    nodes: Vec<NodeSpec>,
    edges: Vec<EdgeSpec>,
    containers: Vec<ContainerSpec>,
    attachments: Vec<(Option<String>, String)>,
}

impl Default for BuilderState {
    fn default() -> Self {
        Self {
            directed: true,
            config: LayoutConfig::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            containers: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GraphBuilder {
    state: RwLock<BuilderState>,
}

impl Clone for GraphBuilder {
    fn clone(&self) -> Self {
        Self {
            state: RwLock::new(self.read().clone()),
        }
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        let builder = Self::new();
        builder.set_config(config);
        builder
    }

    // Append-only state stays consistent across a poisoned lock.
    fn read(&self) -> RwLockReadGuard<'_, BuilderState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BuilderState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_directed(&self, directed: bool) {
        self.write().directed = directed;
    }

    pub fn set_config(&self, config: LayoutConfig) {
        self.write().config = config;
    }

    /// Applies JSON overrides onto the builder's current configuration.
    pub fn merge_config(&self, overrides: &serde_json::Value) -> Result<()> {
        self.write().config.merge_value(overrides)
    }

    pub fn set_justify(&self, justify: Justify) {
        self.write().config.justify = justify;
    }

    pub fn justify(&self) -> Justify {
        self.read().config.justify
    }

    pub fn config(&self) -> LayoutConfig {
        self.read().config.clone()
    }

    pub fn add_node(&self, node: NodeSpec) {
        self.write().nodes.push(node);
    }

    pub fn add_edge(&self, edge: EdgeSpec) {
        self.write().edges.push(edge);
    }

    /// Declares a container, attached under `parent` (`None` = top level).
    pub fn add_container(&self, parent: Option<&str>, container: ContainerSpec) {
        let mut state = self.write();
        if let Some(parent) = parent {
            state
                .attachments
                .push((Some(parent.to_string()), container.id.clone()));
        }
        state.containers.push(container);
    }

    /// Attaches an already declared container under `parent`. Validation happens at build time.
    pub fn attach_container(&self, parent: Option<&str>, child: &str) {
        self.write()
            .attachments
            .push((parent.map(str::to_string), child.to_string()));
    }

    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn container_count(&self) -> usize {
        self.read().containers.len()
    }

    pub fn build(&self) -> Result<GraphSnapshot> {
        let state = self.read().clone();
        GraphSnapshot::from_state(state)
    }
}

/// Validated, immutable input of one layout run.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    directed: bool,
    config: LayoutConfig,
    nodes: IndexMap<String, NodeSpec>,
    edges: Vec<EdgeSpec>,
    containers: ContainerTree,
    records: IndexMap<String, CellTree>,
}

impl GraphSnapshot {
    fn from_state(state: BuilderState) -> Result<Self> {
        let BuilderState {
            directed,
            config,
            nodes: node_specs,
            edges: edge_specs,
            containers,
            attachments,
        } = state;

        let containers = ContainerTree::resolve(containers, &attachments)?;

        let mut nodes: IndexMap<String, NodeSpec> = IndexMap::new();
        for node in node_specs {
            if containers.contains(&node.id) {
                return Err(Error::invalid_structure(format!(
                    "`{}` is used both as a node and as a container",
                    node.id
                )));
            }
            if nodes.contains_key(&node.id) {
                return Err(Error::invalid_structure(format!(
                    "node `{}` is defined twice",
                    node.id
                )));
            }
            nodes.insert(node.id.clone(), node);
        }

        for spec in containers.specs() {
            for member in &spec.nodes {
                if containers.contains(member) {
                    return Err(Error::invalid_structure(format!(
                        "container `{}` lists container `{member}` as a node",
                        spec.id
                    )));
                }
                nodes
                    .entry(member.clone())
                    .or_insert_with(|| NodeSpec::new(member.clone()));
            }
        }

        let mut edges: Vec<EdgeSpec> = Vec::with_capacity(edge_specs.len());
        let mut edge_ids: HashSet<String> = HashSet::default();
        for (i, mut edge) in edge_specs.into_iter().enumerate() {
            let id = edge.id.clone().unwrap_or_else(|| format!("e{i}"));
            if !edge_ids.insert(id.clone()) {
                return Err(Error::invalid_structure(format!(
                    "edge `{id}` is defined twice"
                )));
            }
            edge.id = Some(id);
            for end in [&edge.tail, &edge.head] {
                if !containers.contains(end) {
                    nodes
                        .entry(end.clone())
                        .or_insert_with(|| NodeSpec::new(end.clone()));
                }
            }
            edges.push(edge);
        }

        let root = if config.rank_dir.is_horizontal() {
            Direction::Vertical
        } else {
            Direction::Horizontal
        };
        let mut records: IndexMap<String, CellTree> = IndexMap::new();
        for (id, node) in &nodes {
            if node.shape.is_record() {
                let tree = record::compile_with_direction(Some(node.display_text()), root)?;
                records.insert(id.clone(), tree);
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            containers = containers.len(),
            records = records.len(),
            "graph snapshot built"
        );

        Ok(Self {
            directed,
            config,
            nodes,
            edges,
            containers,
            records,
        })
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Copy of this snapshot laid out with a different configuration.
    pub fn with_config(&self, config: LayoutConfig) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[EdgeSpec] {
        &self.edges
    }

    pub fn containers(&self) -> &ContainerTree {
        &self.containers
    }

    pub fn record(&self, node: &str) -> Option<&CellTree> {
        self.records.get(node)
    }
}
