//! Helper algorithms over [`Graph`].
//!
//! Every traversal uses an explicit stack so deep chains cannot overflow the call stack.

use super::Graph;
use rustc_hash::FxBuildHasher;
use std::collections::VecDeque;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Depth-first preorder over successors (neighbors for undirected graphs).
pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut visited: HashSet<&str> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for &root in roots {
        if !g.has_node(root) {
            continue;
        }
        let mut stack: Vec<&str> = vec![root];
        while let Some(v) = stack.pop() {
            if !visited.insert(v) {
                continue;
            }
            out.push(v.to_string());
            let succ = g.successors(v);
            for w in succ.into_iter().rev() {
                if !visited.contains(w) {
                    stack.push(w);
                }
            }
        }
    }
    out
}

/// Depth-first postorder over successors (neighbors for undirected graphs).
pub fn postorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut visited: HashSet<&str> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for &root in roots {
        if !g.has_node(root) || !visited.insert(root) {
            continue;
        }
        let mut stack: Vec<(&str, Vec<&str>, usize)> = vec![(root, g.successors(root), 0)];
        while let Some((v, succ, next)) = stack.last_mut() {
            if let Some(&w) = succ.get(*next) {
                *next += 1;
                if visited.insert(w) {
                    let succ_w = g.successors(w);
                    stack.push((w, succ_w, 0));
                }
                continue;
            }
            out.push(v.to_string());
            stack.pop();
        }
    }
    out
}

/// Weakly connected components, each listed in discovery order.
pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut seen: HashSet<&str> = HashSet::default();
    let mut out: Vec<Vec<String>> = Vec::new();

    for start in g.nodes() {
        if !seen.insert(start) {
            continue;
        }
        let mut comp: Vec<String> = Vec::new();
        let mut q: VecDeque<&str> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v.to_string());
            for n in g.adjacent(v) {
                if seen.insert(n) {
                    q.push_back(n);
                }
            }
        }
        out.push(comp);
    }

    out
}

/// Strongly connected components with more than one vertex, plus vertices with a self loop.
pub fn find_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    tarjan(g)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.first().is_some_and(|v| has_self_loop(g, v)))
        .collect()
}

pub fn is_acyclic<N, E, G>(g: &Graph<N, E, G>) -> bool
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    find_cycles(g).is_empty()
}

/// Kahn topological order with ties broken by insertion order, or `None` on a cycle.
pub fn topsort<N, E, G>(g: &Graph<N, E, G>) -> Option<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut remaining: HashMap<&str, usize> = g.nodes().map(|v| (v, g.in_degree(v))).collect();
    let mut ready: VecDeque<&str> = g.nodes().filter(|v| remaining[*v] == 0).collect();
    let mut out: Vec<String> = Vec::with_capacity(g.node_count());
    while let Some(v) = ready.pop_front() {
        out.push(v.to_string());
        for w in g.out_adjacent(v) {
            if let Some(d) = remaining.get_mut(w) {
                *d -= 1;
                if *d == 0 {
                    ready.push_back(w);
                }
            }
        }
    }
    (out.len() == g.node_count()).then_some(out)
}

fn has_self_loop<N, E, G>(g: &Graph<N, E, G>, v: &str) -> bool
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    g.out_edges(v, Some(v)).iter().any(|e| e.is_loop())
}

fn tarjan<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut index: HashMap<&str, usize> = HashMap::default();
    let mut lowlink: HashMap<&str, usize> = HashMap::default();
    let mut on_stack: HashSet<&str> = HashSet::default();
    let mut stack: Vec<&str> = Vec::new();
    let mut sccs: Vec<Vec<String>> = Vec::new();
    let mut counter = 0usize;

    for root in g.nodes() {
        if index.contains_key(root) {
            continue;
        }
        let mut work: Vec<(&str, Vec<&str>, usize)> = Vec::new();
        index.insert(root, counter);
        lowlink.insert(root, counter);
        counter += 1;
        stack.push(root);
        on_stack.insert(root);
        work.push((root, g.successors(root), 0));

        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            if let Some(&w) = frame.1.get(frame.2) {
                frame.2 += 1;
                if !index.contains_key(w) {
                    index.insert(w, counter);
                    lowlink.insert(w, counter);
                    counter += 1;
                    stack.push(w);
                    on_stack.insert(w);
                    work.push((w, g.successors(w), 0));
                } else if on_stack.contains(w) {
                    let low = lowlink[v].min(index[w]);
                    lowlink.insert(v, low);
                }
                continue;
            }

            work.pop();
            if let Some(parent) = work.last() {
                let low = lowlink[parent.0].min(lowlink[v]);
                lowlink.insert(parent.0, low);
            }
            if lowlink[v] == index[v] {
                let mut scc: Vec<String> = Vec::new();
                while let Some(x) = stack.pop() {
                    on_stack.remove(x);
                    scc.push(x.to_string());
                    if x == v {
                        break;
                    }
                }
                sccs.push(scc);
            }
        }
    }
    sccs
}
