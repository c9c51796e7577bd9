//! Rank constraints declared on loose containers.
//!
//! Members of a `same` container collapse into one equivalence class. Within each scope (the
//! nearest bordered container, or the root graph) every `min`/`source` member joins a single min
//! class and every `max`/`sink` member a single max class. Ranking then runs over class leaders.

use crate::cluster::{ContainerTree, Polarity};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Extreme rank class of one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extreme {
    pub leader: String,
    /// No other node of the scope may share the rank.
    pub exclusive: bool,
    /// First container that declared this extreme.
    pub container: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePlan {
    /// Bordered container index; `None` is the root graph.
    pub scope: Option<usize>,
    pub min: Option<Extreme>,
    pub max: Option<Extreme>,
}

#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    leader_of: IndexMap<String, String>,
    pub scopes: Vec<ScopePlan>,
    scope_members: Vec<HashSet<String>>,
}

impl MergePlan {
    pub fn leader<'a>(&'a self, node: &'a str) -> &'a str {
        self.leader_of.get(node).map(String::as_str).unwrap_or(node)
    }

    /// Distinct leaders in first-member order.
    pub fn leaders(&self) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::default();
        self.leader_of
            .values()
            .map(String::as_str)
            .filter(|l| seen.insert(l))
            .collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.leader_of.keys().map(String::as_str)
    }

    /// Whether `node` belongs to scope `i` of [`MergePlan::scopes`].
    pub fn in_scope(&self, i: usize, node: &str) -> bool {
        match self.scopes[i].scope {
            None => true,
            Some(_) => self.scope_members[i].contains(node),
        }
    }

    pub fn is_min_leader(&self, leader: &str) -> bool {
        self.scopes
            .iter()
            .any(|s| s.min.as_ref().is_some_and(|m| m.leader == leader))
    }

    pub fn is_max_leader(&self, leader: &str) -> bool {
        self.scopes
            .iter()
            .any(|s| s.max.as_ref().is_some_and(|m| m.leader == leader))
    }

    pub fn class_count(&self) -> usize {
        self.leaders().len()
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut v: usize) -> usize {
        let mut root = v;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[v] != root {
            let next = self.parent[v];
            self.parent[v] = root;
            v = next;
        }
        root
    }

    /// The smaller index becomes the root, so leaders follow node order.
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[drop] = keep;
    }
}

struct ScopeAcc {
    scope: Option<usize>,
    min: Option<(usize, bool, String)>,
    max: Option<(usize, bool, String)>,
}

/// Computes the merge plan for `nodes` (working-graph node ids in order).
pub fn plan(nodes: &[String], tree: &ContainerTree) -> Result<MergePlan> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let mut uf = UnionFind::new(nodes.len());
    let mut scopes: Vec<ScopeAcc> = Vec::new();

    for (ix, spec) in tree.specs().iter().enumerate() {
        let Some(rank) = spec.rank else {
            continue;
        };
        if spec.is_bordered() {
            tracing::warn!(
                container = %spec.id,
                "rank constraint on a bordered container is ignored"
            );
            continue;
        }
        let members: Vec<usize> = tree
            .members_recursive_ix(ix)
            .iter()
            .filter_map(|m| index.get(m.as_str()).copied())
            .collect();
        let Some(&first) = members.first() else {
            continue;
        };
        for &m in &members[1..] {
            uf.union(first, m);
        }

        let Some(polarity) = rank.polarity() else {
            continue;
        };
        let scope = tree.effective_father_ix(ix);
        let acc = match scopes.iter().position(|s| s.scope == scope) {
            Some(i) => &mut scopes[i],
            None => {
                scopes.push(ScopeAcc {
                    scope,
                    min: None,
                    max: None,
                });
                let last = scopes.len() - 1;
                &mut scopes[last]
            }
        };
        let slot = match polarity {
            Polarity::Min => &mut acc.min,
            Polarity::Max => &mut acc.max,
        };
        if let Some((rep, exclusive, _)) = slot.as_mut() {
            uf.union(*rep, first);
            *exclusive |= rank.is_exclusive();
        } else {
            *slot = Some((first, rank.is_exclusive(), spec.id.clone()));
        }
    }

    let mut out_scopes: Vec<ScopePlan> = Vec::with_capacity(scopes.len());
    let mut scope_members: Vec<HashSet<String>> = Vec::with_capacity(scopes.len());
    for acc in &scopes {
        if let (Some((min_rep, _, min_c)), Some((max_rep, _, max_c))) = (&acc.min, &acc.max) {
            if uf.find(*min_rep) == uf.find(*max_rep) {
                return Err(Error::OppositeRank {
                    first: min_c.clone(),
                    second: max_c.clone(),
                    scope: acc
                        .scope
                        .map(|s| tree.spec(s).id.clone())
                        .unwrap_or_else(|| "root".to_string()),
                });
            }
        }
        let mut extreme = |e: &Option<(usize, bool, String)>| {
            e.as_ref().map(|(rep, exclusive, container)| Extreme {
                leader: nodes[uf.find(*rep)].clone(),
                exclusive: *exclusive,
                container: container.clone(),
            })
        };
        out_scopes.push(ScopePlan {
            scope: acc.scope,
            min: extreme(&acc.min),
            max: extreme(&acc.max),
        });
        scope_members.push(match acc.scope {
            Some(s) => tree.members_recursive_ix(s).into_iter().collect(),
            None => HashSet::default(),
        });
    }

    let mut leader_of: IndexMap<String, String> = IndexMap::with_capacity(nodes.len());
    for (i, id) in nodes.iter().enumerate() {
        leader_of.insert(id.clone(), nodes[uf.find(i)].clone());
    }

    let plan = MergePlan {
        leader_of,
        scopes: out_scopes,
        scope_members,
    };
    tracing::debug!(
        nodes = nodes.len(),
        classes = plan.class_count(),
        scopes = plan.scopes.len(),
        "rank constraints merged"
    );
    Ok(plan)
}
