//! Grouping containers and their nesting.
//!
//! Containers come in two kinds: loose groupings that only carry a rank hint, and bordered
//! clusters that are drawn with a boundary. [`ContainerTree::resolve`] validates the attachment
//! forest once and precomputes father, effective-father and depth tables so later queries are
//! constant time.

use crate::error::{Error, Result};
use crate::model::Size;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Nesting beyond this many levels is rejected. Top-level containers have depth 1.
pub const MAX_NESTING_DEPTH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    #[default]
    Loose,
    Bordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankConstraint {
    /// All members share one rank.
    Same,
    /// Members sit on the minimum rank of the scope; other nodes may share it.
    Min,
    /// Members sit alone on the minimum rank of the scope.
    Source,
    /// Members sit on the maximum rank of the scope; other nodes may share it.
    Max,
    /// Members sit alone on the maximum rank of the scope.
    Sink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Min,
    Max,
}

impl RankConstraint {
    pub fn polarity(self) -> Option<Polarity> {
        match self {
            RankConstraint::Same => None,
            RankConstraint::Min | RankConstraint::Source => Some(Polarity::Min),
            RankConstraint::Max | RankConstraint::Sink => Some(Polarity::Max),
        }
    }

    pub fn is_exclusive(self) -> bool {
        matches!(self, RankConstraint::Source | RankConstraint::Sink)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub id: String,
    #[serde(default)]
    pub kind: ContainerKind,
    #[serde(default)]
    pub rank: Option<RankConstraint>,
    #[serde(default)]
    pub label: Option<String>,
    /// Nodes listed directly in this container.
    #[serde(default)]
    pub nodes: Vec<String>,
    /// Declared geometry; lets a bordered container exist without members.
    #[serde(default)]
    pub min_size: Option<Size>,
}

impl ContainerSpec {
    pub fn loose(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ContainerKind::Loose,
            rank: None,
            label: None,
            nodes: Vec::new(),
            min_size: None,
        }
    }

    pub fn bordered(id: impl Into<String>) -> Self {
        Self {
            kind: ContainerKind::Bordered,
            ..Self::loose(id)
        }
    }

    pub fn with_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn with_rank(mut self, rank: RankConstraint) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_min_size(mut self, size: Size) -> Self {
        self.min_size = Some(size);
        self
    }

    pub fn is_bordered(&self) -> bool {
        self.kind == ContainerKind::Bordered
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContainerTree {
    specs: Vec<ContainerSpec>,
    index: HashMap<String, usize>,
    father: Vec<Option<usize>>,
    effective_father: Vec<Option<usize>>,
    depth: Vec<usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    node_father: HashMap<String, usize>,
}

impl ContainerTree {
    /// Validates `specs` attached according to `attachments` (`(parent, child)`, `None` parent =
    /// root). Containers without any attachment are top-level.
    pub fn resolve(
        specs: Vec<ContainerSpec>,
        attachments: &[(Option<String>, String)],
    ) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::default();
        for (ix, spec) in specs.iter().enumerate() {
            if index.insert(spec.id.clone(), ix).is_some() {
                return Err(Error::invalid_structure(format!(
                    "container `{}` is defined twice",
                    spec.id
                )));
            }
        }
        let n = specs.len();

        // child -> every parent it was attached under, in attachment order
        let mut parents: Vec<Vec<Option<usize>>> = vec![Vec::new(); n];
        for (parent, child) in attachments {
            let Some(&c) = index.get(child) else {
                return Err(Error::invalid_structure(format!(
                    "attachment names unknown container `{child}`"
                )));
            };
            let p = match parent {
                Some(p) => match index.get(p) {
                    Some(&p) => Some(p),
                    None => {
                        return Err(Error::invalid_structure(format!(
                            "container `{child}` is attached under unknown container `{p}`"
                        )));
                    }
                },
                None => None,
            };
            if parents[c].contains(&p) {
                let where_ = p.map_or("the root graph", |p| specs[p].id.as_str());
                return Err(Error::invalid_structure(format!(
                    "container `{child}` is attached twice under {where_}"
                )));
            }
            parents[c].push(p);
        }

        if let Some(c) = find_father_cycle(&parents) {
            return Err(Error::CycleDependency {
                container: specs[c].id.clone(),
            });
        }

        let mut father: Vec<Option<usize>> = vec![None; n];
        for (c, ps) in parents.iter().enumerate() {
            match ps.as_slice() {
                [] => {}
                [p] => father[c] = *p,
                _ => {
                    return Err(Error::invalid_structure(format!(
                        "container `{}` is attached under more than one parent",
                        specs[c].id
                    )));
                }
            }
        }

        let depth = compute_depths(&father)?;
        if let Some(c) = (0..n).find(|&c| depth[c] > MAX_NESTING_DEPTH) {
            return Err(Error::invalid_structure(format!(
                "container `{}` is nested {} levels deep; the limit is {MAX_NESTING_DEPTH}",
                specs[c].id, depth[c]
            )));
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut roots: Vec<usize> = Vec::new();
        let mut placed = vec![false; n];
        for (_, child) in attachments {
            let c = index[child.as_str()];
            if std::mem::replace(&mut placed[c], true) {
                continue;
            }
            match father[c] {
                Some(p) => children[p].push(c),
                None => roots.push(c),
            }
        }
        roots.extend((0..n).filter(|&c| !placed[c]));

        // Deepest first, so every child is settled before its father.
        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let mut by_depth: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
        for c in 0..n {
            by_depth[depth[c]].push(c);
        }
        let mut non_empty: Vec<bool> = specs
            .iter()
            .map(|s| !s.nodes.is_empty() || (s.is_bordered() && s.min_size.is_some()))
            .collect();
        for level in by_depth.iter().rev() {
            for &c in level {
                if non_empty[c] {
                    if let Some(p) = father[c] {
                        non_empty[p] = true;
                    }
                }
            }
        }
        if let Some(c) = (0..n).find(|&c| !non_empty[c]) {
            return Err(Error::invalid_structure(format!(
                "container `{}` has no nodes and no non-empty sub-containers",
                specs[c].id
            )));
        }

        let mut effective_father: Vec<Option<usize>> = vec![None; n];
        for level in &by_depth {
            for &c in level {
                effective_father[c] = father[c].and_then(|f| {
                    if specs[f].is_bordered() {
                        Some(f)
                    } else {
                        effective_father[f]
                    }
                });
            }
        }

        // Innermost container listing the node; equal depth keeps the first.
        let mut node_father: HashMap<String, usize> = HashMap::default();
        for (c, spec) in specs.iter().enumerate() {
            for node in &spec.nodes {
                match node_father.get(node) {
                    Some(&prev) if depth[prev] >= depth[c] => {}
                    _ => {
                        node_father.insert(node.clone(), c);
                    }
                }
            }
        }

        tracing::debug!(containers = n, max_depth, "resolved container tree");
        Ok(Self {
            specs,
            index,
            father,
            effective_father,
            depth,
            children,
            roots,
            node_father,
        })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.id.as_str())
    }

    pub fn specs(&self) -> &[ContainerSpec] {
        &self.specs
    }

    pub fn get(&self, id: &str) -> Option<&ContainerSpec> {
        self.index_of(id).map(|ix| &self.specs[ix])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn spec(&self, ix: usize) -> &ContainerSpec {
        &self.specs[ix]
    }

    /// Top-level containers in attachment order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn father(&self, id: &str) -> Option<&str> {
        let ix = self.index_of(id)?;
        self.father[ix].map(|f| self.specs[f].id.as_str())
    }

    pub fn father_ix(&self, ix: usize) -> Option<usize> {
        self.father.get(ix).copied().flatten()
    }

    /// Nearest bordered strict ancestor; `None` means the root graph.
    pub fn effective_father(&self, id: &str) -> Option<&str> {
        let ix = self.index_of(id)?;
        self.effective_father[ix].map(|f| self.specs[f].id.as_str())
    }

    pub fn effective_father_ix(&self, ix: usize) -> Option<usize> {
        self.effective_father.get(ix).copied().flatten()
    }

    /// Scope of a rank constraint declared on `id`.
    pub fn closest_effective_container(&self, id: &str) -> Option<&str> {
        self.effective_father(id)
    }

    pub fn depth(&self, id: &str) -> Option<usize> {
        self.index_of(id).map(|ix| self.depth[ix])
    }

    pub fn children(&self, id: &str) -> Vec<&str> {
        match self.index_of(id) {
            Some(ix) => self.children[ix]
                .iter()
                .map(|&c| self.specs[c].id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn children_ix(&self, ix: usize) -> &[usize] {
        &self.children[ix]
    }

    pub fn node_father(&self, node: &str) -> Option<&str> {
        self.node_father_ix(node).map(|c| self.specs[c].id.as_str())
    }

    pub fn node_father_ix(&self, node: &str) -> Option<usize> {
        self.node_father.get(node).copied()
    }

    /// Nearest bordered container enclosing `node`.
    pub fn node_effective_father(&self, node: &str) -> Option<&str> {
        self.node_effective_father_ix(node)
            .map(|c| self.specs[c].id.as_str())
    }

    pub fn node_effective_father_ix(&self, node: &str) -> Option<usize> {
        let f = self.node_father_ix(node)?;
        if self.specs[f].is_bordered() {
            Some(f)
        } else {
            self.effective_father[f]
        }
    }

    /// Bordered containers enclosing `node`, outermost first.
    pub fn bordered_path(&self, node: &str) -> Vec<usize> {
        let mut path: Vec<usize> = Vec::new();
        let mut cur = self.node_effective_father_ix(node);
        while let Some(c) = cur {
            path.push(c);
            cur = self.effective_father[c];
        }
        path.reverse();
        path
    }

    /// Every node inside `ix` or one of its descendants, without duplicates.
    pub fn members_recursive_ix(&self, ix: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut seen: rustc_hash::FxHashSet<&str> = Default::default();
        let mut stack: Vec<usize> = vec![ix];
        while let Some(c) = stack.pop() {
            for node in &self.specs[c].nodes {
                if seen.insert(node.as_str()) {
                    out.push(node.clone());
                }
            }
            stack.extend(self.children[c].iter().rev().copied());
        }
        out
    }

    pub fn members_recursive(&self, id: &str) -> Vec<String> {
        self.index_of(id)
            .map(|ix| self.members_recursive_ix(ix))
            .unwrap_or_default()
    }

    /// Whether `ancestor` is `ix` or one of its ancestors.
    pub fn is_within(&self, ix: usize, ancestor: usize) -> bool {
        let mut cur = Some(ix);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.father[c];
        }
        false
    }
}

/// First container found on a cycle of the child -> parent relation.
fn find_father_cycle(parents: &[Vec<Option<usize>>]) -> Option<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }
    let mut mark = vec![Mark::New; parents.len()];
    for start in 0..parents.len() {
        if mark[start] != Mark::New {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        mark[start] = Mark::Active;
        while let Some((c, next)) = stack.last_mut() {
            let c = *c;
            let Some(p) = parents[c].get(*next).copied() else {
                mark[c] = Mark::Done;
                stack.pop();
                continue;
            };
            *next += 1;
            let Some(p) = p else {
                continue;
            };
            match mark[p] {
                Mark::Active => return Some(p),
                Mark::New => {
                    mark[p] = Mark::Active;
                    stack.push((p, 0));
                }
                Mark::Done => {}
            }
        }
    }
    None
}

/// Depth of every container in an acyclic single-father forest.
fn compute_depths(father: &[Option<usize>]) -> Result<Vec<usize>> {
    let mut depth: Vec<usize> = vec![0; father.len()];
    let mut chain: Vec<usize> = Vec::new();
    for start in 0..father.len() {
        let mut cur = Some(start);
        while let Some(c) = cur {
            if depth[c] != 0 {
                break;
            }
            chain.push(c);
            if chain.len() > father.len() {
                return Err(Error::execution("container father chain does not terminate"));
            }
            cur = father[c];
        }
        let mut d = cur.map_or(0, |c| depth[c]);
        while let Some(c) = chain.pop() {
            d += 1;
            depth[c] = d;
        }
    }
    Ok(depth)
}
