//! Graph container APIs used by `stratum`.
//!
//! The container supports directed and undirected graphs, optional multigraph edges (edges
//! distinguished by name) and optional compound nesting (`set_parent`). Degree and loop counts
//! are maintained incrementally from the incidence lists, never stored per vertex.

mod adjacent;
pub mod alg;
mod edge_key;
mod entries;
mod options;

pub use adjacent::Adjacent;
pub use edge_key::EdgeKey;
pub use options::GraphOptions;

use edge_key::EdgeKeyView;
use entries::{EdgeEntry, NodeEntry};
use rustc_hash::FxBuildHasher;
use std::collections::BTreeMap;
use std::sync::Arc;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;
type LabelFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Tombstoned slots are compacted once they outnumber live ones past this size.
const COMPACT_MIN_SLOTS: usize = 64;

pub struct Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    options: GraphOptions,

    graph_label: G,
    default_node_label: LabelFn<N>,
    default_edge_label: LabelFn<E>,

    nodes: Vec<Option<NodeEntry<N>>>,
    node_index: HashMap<String, usize>,

    edges: Vec<Option<EdgeEntry<E>>>,
    edge_index: HashMap<EdgeKey, usize>,

    loops: usize,
    // degree -> number of vertices with that degree
    degrees: BTreeMap<usize, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
}

impl<N, E, G> Clone for Graph<N, E, G>
where
    N: Default + Clone + 'static,
    E: Default + Clone + 'static,
    G: Default + Clone,
{
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            graph_label: self.graph_label.clone(),
            default_node_label: Arc::clone(&self.default_node_label),
            default_edge_label: Arc::clone(&self.default_edge_label),
            nodes: self.nodes.clone(),
            node_index: self.node_index.clone(),
            edges: self.edges.clone(),
            edge_index: self.edge_index.clone(),
            loops: self.loops,
            degrees: self.degrees.clone(),
            parent: self.parent.clone(),
            children: self.children.clone(),
        }
    }
}

impl<N, E, G> Default for Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            default_node_label: Arc::new(N::default),
            default_edge_label: Arc::new(E::default),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            loops: 0,
            degrees: BTreeMap::new(),
            parent: HashMap::default(),
            children: HashMap::default(),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn is_compound(&self) -> bool {
        self.options.compound
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn set_default_node_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> N + Send + Sync + 'static,
    {
        self.default_node_label = Arc::new(f);
        self
    }

    pub fn set_default_edge_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.default_edge_label = Arc::new(f);
        self
    }

    // ---- vertices -------------------------------------------------------------------------

    fn node_ix(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    fn entry(&self, ix: usize) -> Option<&NodeEntry<N>> {
        self.nodes.get(ix).and_then(Option::as_ref)
    }

    fn entry_of(&self, id: &str) -> Option<&NodeEntry<N>> {
        self.node_ix(id).and_then(|ix| self.entry(ix))
    }

    fn insert_node(&mut self, id: String, label: N) -> usize {
        let ix = self.nodes.len();
        self.nodes.push(Some(NodeEntry::new(id.clone(), label)));
        self.node_index.insert(id, ix);
        *self.degrees.entry(0).or_insert(0) += 1;
        ix
    }

    fn ensure_node_ix(&mut self, id: String) -> usize {
        if let Some(ix) = self.node_ix(&id) {
            return ix;
        }
        let label = (self.default_node_label)();
        self.insert_node(id, label)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts `id` or replaces its label. Existing vertices keep their position.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        match self.node_ix(&id) {
            Some(ix) => {
                if let Some(entry) = self.nodes[ix].as_mut() {
                    entry.label = label;
                }
            }
            None => {
                self.insert_node(id, label);
            }
        }
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        self.ensure_node_ix(id.into());
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.entry_of(id).map(|n| &n.label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        let ix = self.node_ix(id)?;
        self.nodes[ix].as_mut().map(|n| &mut n.label)
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// Vertex ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().flatten().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes().map(str::to_string).collect()
    }

    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&str, &N),
    {
        for n in self.nodes.iter().flatten() {
            f(&n.id, &n.label);
        }
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in self.nodes.iter_mut().flatten() {
            f(&n.id, &mut n.label);
        }
    }

    /// Removes a vertex together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(ix) = self.node_ix(id) else {
            return false;
        };
        let slots = match self.entry(ix) {
            Some(n) => merge_slots(&n.out_edges, &n.in_edges),
            None => Vec::new(),
        };
        for slot in slots {
            self.remove_edge_slot(slot);
        }

        self.node_index.remove(id);
        if let Some(entry) = self.nodes[ix].take() {
            hist_remove(&mut self.degrees, entry.degree());
        }

        if self.options.compound {
            if let Some(p) = self.parent.remove(id) {
                if let Some(siblings) = self.children.get_mut(&p) {
                    siblings.retain(|c| c != id);
                }
            }
            if let Some(kids) = self.children.remove(id) {
                for kid in kids {
                    self.parent.remove(&kid);
                }
            }
        }

        self.maybe_compact();
        true
    }

    // ---- edges ----------------------------------------------------------------------------

    fn edge_key_view<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> EdgeKeyView<'a> {
        let (v, w) = if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        };
        let name = if self.options.multigraph { name } else { None };
        EdgeKeyView { v, w, name }
    }

    fn edge_slot(&self, view: EdgeKeyView<'_>) -> Option<usize> {
        self.edge_index.get(&view).copied()
    }

    fn edge_slot_of_key(&self, key: &EdgeKey) -> Option<usize> {
        self.edge_slot(self.edge_key_view(&key.v, &key.w, key.name.as_deref()))
    }

    fn edge_entry(&self, slot: usize) -> Option<&EdgeEntry<E>> {
        self.edges.get(slot).and_then(Option::as_ref)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// Edge keys in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().flatten().map(|e| &e.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges().cloned().collect()
    }

    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&EdgeKey, &E),
    {
        for e in self.edges.iter().flatten() {
            f(&e.key, &e.label);
        }
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for e in self.edges.iter_mut().flatten() {
            f(&e.key, &mut e.label);
        }
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    pub fn set_edge_key(&mut self, key: EdgeKey, label: E) -> &mut Self {
        self.set_edge_named(key.v, key.w, key.name, Some(label))
    }

    /// Adds an edge, creating missing endpoints. An existing edge keeps its position and only
    /// has its label replaced when `label` is `Some`.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let (mut v, mut w) = (v.into(), w.into());
        if !self.options.directed && v > w {
            std::mem::swap(&mut v, &mut w);
        }
        let name = if self.options.multigraph {
            name.map(Into::into)
        } else {
            None
        };

        if let Some(slot) = self.edge_slot(EdgeKeyView {
            v: v.as_str(),
            w: w.as_str(),
            name: name.as_deref(),
        }) {
            if let (Some(label), Some(entry)) = (label, self.edges[slot].as_mut()) {
                entry.label = label;
            }
            return self;
        }

        let v_ix = self.ensure_node_ix(v.clone());
        let w_ix = self.ensure_node_ix(w.clone());
        let slot = self.edges.len();
        let key = EdgeKey { v, w, name };
        let label = label.unwrap_or_else(|| (self.default_edge_label)());
        self.edges.push(Some(EdgeEntry {
            key: key.clone(),
            v_ix,
            w_ix,
            label,
        }));
        self.edge_index.insert(key, slot);
        if v_ix == w_ix {
            self.loops += 1;
        }
        self.touch_node(v_ix, |n| n.out_edges.push(slot));
        self.touch_node(w_ix, |n| n.in_edges.push(slot));
        self
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_slot(self.edge_key_view(v, w, name)).is_some()
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let slot = self.edge_slot(self.edge_key_view(v, w, name))?;
        self.edge_entry(slot).map(|e| &e.label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let slot = self.edge_slot(self.edge_key_view(v, w, name))?;
        self.edges[slot].as_mut().map(|e| &mut e.label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        let slot = self.edge_slot_of_key(key)?;
        self.edge_entry(slot).map(|e| &e.label)
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        let slot = self.edge_slot_of_key(key)?;
        self.edges[slot].as_mut().map(|e| &mut e.label)
    }

    pub fn remove_edge(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<E> {
        let slot = self.edge_slot(self.edge_key_view(v, w, name))?;
        let label = self.remove_edge_slot(slot);
        self.maybe_compact();
        label
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> Option<E> {
        let slot = self.edge_slot_of_key(key)?;
        let label = self.remove_edge_slot(slot);
        self.maybe_compact();
        label
    }

    fn remove_edge_slot(&mut self, slot: usize) -> Option<E> {
        let entry = self.edges.get_mut(slot)?.take()?;
        self.edge_index.remove(&entry.key);
        if entry.v_ix == entry.w_ix {
            self.loops -= 1;
        }
        self.touch_node(entry.v_ix, |n| remove_sorted(&mut n.out_edges, slot));
        self.touch_node(entry.w_ix, |n| remove_sorted(&mut n.in_edges, slot));
        Some(entry.label)
    }

    // ---- adjacency ------------------------------------------------------------------------

    /// Neighbors of `v`, one per touching edge, in edge insertion order.
    pub fn adjacent(&self, v: &str) -> Adjacent<'_, N, E> {
        match self.node_ix(v).and_then(|ix| self.entry(ix).map(|n| (ix, n))) {
            Some((ix, n)) => Adjacent {
                nodes: &self.nodes,
                edges: &self.edges,
                center: ix,
                out: &n.out_edges,
                in_: &n.in_edges,
            },
            None => Adjacent::empty(&self.nodes, &self.edges),
        }
    }

    /// Tails of edges entering `v`. Same as [`Graph::adjacent`] for undirected graphs.
    pub fn in_adjacent(&self, v: &str) -> Adjacent<'_, N, E> {
        let mut it = self.adjacent(v);
        if self.options.directed {
            it.out = &[];
        }
        it
    }

    /// Heads of edges leaving `v`. Same as [`Graph::adjacent`] for undirected graphs.
    pub fn out_adjacent(&self, v: &str) -> Adjacent<'_, N, E> {
        let mut it = self.adjacent(v);
        if self.options.directed {
            it.in_ = &[];
        }
        it
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        dedup_ids(self.out_adjacent(v))
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        dedup_ids(self.in_adjacent(v))
    }

    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        dedup_ids(self.adjacent(v))
    }

    fn keys_of(&self, slots: impl IntoIterator<Item = usize>) -> Vec<EdgeKey> {
        slots
            .into_iter()
            .filter_map(|s| self.edge_entry(s).map(|e| e.key.clone()))
            .collect()
    }

    /// Edges leaving `v`, optionally restricted to those ending at `w`.
    pub fn out_edges(&self, v: &str, w: Option<&str>) -> Vec<EdgeKey> {
        let Some(n) = self.entry_of(v) else {
            return Vec::new();
        };
        let slots = if self.options.directed {
            n.out_edges.clone()
        } else {
            merge_slots(&n.out_edges, &n.in_edges)
        };
        let mut keys = self.keys_of(slots);
        if let Some(w) = w {
            keys.retain(|k| k.other(v) == Some(w));
        }
        keys
    }

    /// Edges entering `v`, optionally restricted to those starting at `u`.
    pub fn in_edges(&self, v: &str, u: Option<&str>) -> Vec<EdgeKey> {
        let Some(n) = self.entry_of(v) else {
            return Vec::new();
        };
        let slots = if self.options.directed {
            n.in_edges.clone()
        } else {
            merge_slots(&n.out_edges, &n.in_edges)
        };
        let mut keys = self.keys_of(slots);
        if let Some(u) = u {
            keys.retain(|k| k.other(v) == Some(u));
        }
        keys
    }

    /// Every edge touching `v`, self loops once.
    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        match self.entry_of(v) {
            Some(n) => self.keys_of(merge_slots(&n.out_edges, &n.in_edges)),
            None => Vec::new(),
        }
    }

    /// Number of edge endpoints at `v`; a self loop contributes two.
    pub fn degree(&self, v: &str) -> usize {
        self.entry_of(v).map_or(0, NodeEntry::degree)
    }

    pub fn in_degree(&self, v: &str) -> usize {
        match self.entry_of(v) {
            Some(n) if self.options.directed => n.in_edges.len(),
            Some(n) => n.degree(),
            None => 0,
        }
    }

    pub fn out_degree(&self, v: &str) -> usize {
        match self.entry_of(v) {
            Some(n) if self.options.directed => n.out_edges.len(),
            Some(n) => n.degree(),
            None => 0,
        }
    }

    pub fn max_degree(&self) -> usize {
        self.degrees.keys().next_back().copied().unwrap_or(0)
    }

    pub fn number_of_loops(&self) -> usize {
        self.loops
    }

    pub fn sources(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .flatten()
            .filter(|n| n.in_edges.is_empty())
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn sinks(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .flatten()
            .filter(|n| n.out_edges.is_empty())
            .map(|n| n.id.as_str())
            .collect()
    }

    // ---- compound -------------------------------------------------------------------------

    /// Nests `child` under `parent`. No-op on non-compound graphs.
    pub fn set_parent(&mut self, child: impl Into<String>, parent: impl Into<String>) -> &mut Self {
        if !self.options.compound {
            return self;
        }
        let child = child.into();
        let parent = parent.into();
        self.ensure_node(child.clone());
        self.ensure_node(parent.clone());
        self.clear_parent(&child);
        self.children
            .entry(parent.clone())
            .or_default()
            .push(child.clone());
        self.parent.insert(child, parent);
        self
    }

    pub fn clear_parent(&mut self, child: &str) -> &mut Self {
        if let Some(old) = self.parent.remove(child) {
            if let Some(siblings) = self.children.get_mut(&old) {
                siblings.retain(|c| c != child);
            }
        }
        self
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(String::as_str)
    }

    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|c| c.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Vertices without a parent, in insertion order.
    pub fn children_root(&self) -> Vec<&str> {
        self.nodes()
            .filter(|id| !self.parent.contains_key(*id))
            .collect()
    }

    // ---- bookkeeping ----------------------------------------------------------------------

    fn touch_node<F>(&mut self, ix: usize, f: F)
    where
        F: FnOnce(&mut NodeEntry<N>),
    {
        let Some(node) = self.nodes.get_mut(ix).and_then(Option::as_mut) else {
            return;
        };
        let before = node.degree();
        f(node);
        let after = node.degree();
        if before != after {
            hist_remove(&mut self.degrees, before);
            *self.degrees.entry(after).or_insert(0) += 1;
        }
    }

    fn maybe_compact(&mut self) {
        if self.edges.len() > COMPACT_MIN_SLOTS && self.edge_index.len() * 2 < self.edges.len() {
            self.compact_edges();
        }
        if self.nodes.len() > COMPACT_MIN_SLOTS && self.node_index.len() * 2 < self.nodes.len() {
            self.compact_nodes();
        }
    }

    // Remapping is monotonic, so incidence lists stay sorted.
    fn compact_edges(&mut self) {
        let mut remap: Vec<usize> = vec![usize::MAX; self.edges.len()];
        let mut kept: Vec<Option<EdgeEntry<E>>> = Vec::with_capacity(self.edge_index.len());
        for (old, slot) in std::mem::take(&mut self.edges).into_iter().enumerate() {
            if let Some(entry) = slot {
                remap[old] = kept.len();
                kept.push(Some(entry));
            }
        }
        self.edges = kept;
        for slot in self.edge_index.values_mut() {
            *slot = remap[*slot];
        }
        for node in self.nodes.iter_mut().flatten() {
            for s in node.out_edges.iter_mut().chain(node.in_edges.iter_mut()) {
                *s = remap[*s];
            }
        }
    }

    fn compact_nodes(&mut self) {
        let mut remap: Vec<usize> = vec![usize::MAX; self.nodes.len()];
        let mut kept: Vec<Option<NodeEntry<N>>> = Vec::with_capacity(self.node_index.len());
        for (old, slot) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            if let Some(entry) = slot {
                remap[old] = kept.len();
                kept.push(Some(entry));
            }
        }
        self.nodes = kept;
        for ix in self.node_index.values_mut() {
            *ix = remap[*ix];
        }
        for edge in self.edges.iter_mut().flatten() {
            edge.v_ix = remap[edge.v_ix];
            edge.w_ix = remap[edge.w_ix];
        }
    }
}

fn hist_remove(degrees: &mut BTreeMap<usize, usize>, degree: usize) {
    if let Some(count) = degrees.get_mut(&degree) {
        *count -= 1;
        if *count == 0 {
            degrees.remove(&degree);
        }
    }
}

fn remove_sorted(slots: &mut Vec<usize>, slot: usize) {
    if let Ok(pos) = slots.binary_search(&slot) {
        slots.remove(pos);
    }
}

/// Union of two ascending slot lists, shared slots (self loops) once.
fn merge_slots(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

fn dedup_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: HashSet<&'a str> = HashSet::default();
    ids.filter(|id| seen.insert(*id)).collect()
}
