//! Cycle breaking by reversing a feedback arc set.
//!
//! Reversed edges are re-inserted as `w -> v` under a fresh `rev{n}` name with `reversed` set;
//! [`undo`] puts them back under their original name and reverses their bend points.

use crate::config::Acyclicer;
use crate::graphlib::{EdgeKey, Graph};
use crate::model::{EdgeLabel, WorkGraph};
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

pub fn run(g: &mut WorkGraph) {
    let fas = match g.graph().acyclicer {
        Acyclicer::Greedy => greedy_fas_with_weight(g, |lbl: &EdgeLabel| {
            if lbl.weight.is_finite() {
                lbl.weight.round() as i64
            } else {
                0
            }
        }),
        Acyclicer::Dfs => dfs_fas(g),
    };
    tracing::trace!(reversed = fas.len(), "acyclic");

    for e in fas.into_iter().filter(|e| !e.is_loop()) {
        let Some(mut label) = g.remove_edge_key(&e) else {
            continue;
        };
        label.forward_name = e.name.clone();
        label.reversed = true;
        let name = unique_rev_name(g, &e.w, &e.v);
        g.set_edge_named(e.w, e.v, Some(name), Some(label));
    }
}

pub fn undo(g: &mut WorkGraph) {
    for e in g.edge_keys() {
        if !g.edge_by_key(&e).is_some_and(|l| l.reversed) {
            continue;
        }
        let Some(mut label) = g.remove_edge_key(&e) else {
            continue;
        };
        let forward_name = label.forward_name.take();
        label.reversed = false;
        label.points.reverse();
        g.set_edge_named(e.w, e.v, forward_name, Some(label));
    }
}

/// Reverses a single edge in place of cycle breaking, e.g. when ranks ended up inverted.
pub fn reverse_edge(g: &mut WorkGraph, e: &EdgeKey) {
    let Some(mut label) = g.remove_edge_key(e) else {
        return;
    };
    label.forward_name = e.name.clone();
    label.reversed = true;
    let name = unique_rev_name(g, &e.w, &e.v);
    g.set_edge_named(e.w.clone(), e.v.clone(), Some(name), Some(label));
}

fn unique_rev_name<N, E, G>(g: &Graph<N, E, G>, v: &str, w: &str) -> String
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut i = 1usize;
    loop {
        let candidate = format!("rev{i}");
        if !g.has_edge(v, w, Some(&candidate)) {
            return candidate;
        }
        i += 1;
    }
}

/// Back edges of a depth-first search started from every node in insertion order.
pub fn dfs_fas<N, E, G>(g: &Graph<N, E, G>) -> Vec<EdgeKey>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut fas: Vec<EdgeKey> = Vec::new();
    let mut visited: HashMap<String, bool> = HashMap::default();
    let mut on_stack: HashMap<String, bool> = HashMap::default();

    for root in g.nodes() {
        if visited.contains_key(root) {
            continue;
        }
        visited.insert(root.to_string(), true);
        on_stack.insert(root.to_string(), true);
        let mut stack: Vec<(String, Vec<EdgeKey>, usize)> =
            vec![(root.to_string(), g.out_edges(root, None), 0)];

        while let Some((v, edges, next)) = stack.last_mut() {
            let Some(e) = edges.get(*next).cloned() else {
                on_stack.insert(v.clone(), false);
                stack.pop();
                continue;
            };
            *next += 1;
            if e.is_loop() {
                continue;
            }
            if on_stack.get(&e.w).copied().unwrap_or(false) {
                fas.push(e);
            } else if !visited.contains_key(&e.w) {
                visited.insert(e.w.clone(), true);
                on_stack.insert(e.w.clone(), true);
                let out = g.out_edges(&e.w, None);
                stack.push((e.w, out, 0));
            }
        }
    }
    fas
}

/// Eades–Lin–Smyth greedy heuristic: repeatedly strip sinks and sources, then remove the node
/// maximizing `out - in` and keep its incoming edges as the feedback set.
pub fn greedy_fas_with_weight<N, E, G>(
    g: &Graph<N, E, G>,
    weight_fn: impl Fn(&E) -> i64,
) -> Vec<EdgeKey>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let ids: Vec<&str> = g.nodes().collect();
    let n = ids.len();
    if n <= 1 {
        return Vec::new();
    }
    let ix: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    // Parallel edges collapse into one weighted pair; pair order is first occurrence.
    let mut pair_ix: HashMap<(usize, usize), usize> = HashMap::default();
    let mut pairs: Vec<(usize, usize, i64)> = Vec::new();
    for e in g.edges() {
        if e.is_loop() {
            continue;
        }
        let (Some(&v), Some(&w)) = (ix.get(e.v.as_str()), ix.get(e.w.as_str())) else {
            continue;
        };
        let wt = g.edge_by_key(e).map(&weight_fn).unwrap_or(1);
        match pair_ix.get(&(v, w)) {
            Some(&p) => pairs[p].2 += wt,
            None => {
                pair_ix.insert((v, w), pairs.len());
                pairs.push((v, w, wt));
            }
        }
    }

    let mut in_w = vec![0i64; n];
    let mut out_w = vec![0i64; n];
    let mut ins: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut outs: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (p, &(v, w, wt)) in pairs.iter().enumerate() {
        out_w[v] += wt;
        in_w[w] += wt;
        outs[v].push(p);
        ins[w].push(p);
    }
    let max_out = out_w.iter().copied().max().unwrap_or(0).max(0);
    let max_in = in_w.iter().copied().max().unwrap_or(0).max(0);
    let zero = max_in + 1;
    let bucket_count = (max_out + max_in + 3) as usize;
    let mut buckets: Vec<VecDeque<usize>> = vec![VecDeque::new(); bucket_count];
    let mut alive = vec![true; n];
    // Buckets may hold stale entries; `placed[v]` is the one that counts.
    let mut placed = vec![0usize; n];

    let bucket_of = |v: usize, in_w: &[i64], out_w: &[i64]| -> usize {
        if out_w[v] == 0 {
            0
        } else if in_w[v] == 0 {
            bucket_count - 1
        } else {
            (out_w[v] - in_w[v] + zero).clamp(0, bucket_count as i64 - 1) as usize
        }
    };
    for v in 0..n {
        let b = bucket_of(v, &in_w, &out_w);
        placed[v] = b;
        buckets[b].push_front(v);
    }

    let mut fas_pairs: Vec<usize> = Vec::new();
    let mut remaining = n;
    while remaining > 0 {
        let mut removed: Option<(usize, bool)> = None;
        if let Some(v) = pop_alive(&mut buckets, 0, &alive, &placed) {
            removed = Some((v, false));
        } else if let Some(v) = pop_alive(&mut buckets, bucket_count - 1, &alive, &placed) {
            removed = Some((v, false));
        } else {
            for b in (1..bucket_count - 1).rev() {
                if let Some(v) = pop_alive(&mut buckets, b, &alive, &placed) {
                    removed = Some((v, true));
                    break;
                }
            }
        }
        let Some((v, collect)) = removed else {
            break;
        };
        alive[v] = false;
        remaining -= 1;
        for &p in &ins[v] {
            let (u, _, wt) = pairs[p];
            if !alive[u] {
                continue;
            }
            if collect {
                fas_pairs.push(p);
            }
            out_w[u] -= wt;
            let b = bucket_of(u, &in_w, &out_w);
            placed[u] = b;
            buckets[b].push_front(u);
        }
        for &p in &outs[v] {
            let (_, w, wt) = pairs[p];
            if !alive[w] {
                continue;
            }
            in_w[w] -= wt;
            let b = bucket_of(w, &in_w, &out_w);
            placed[w] = b;
            buckets[b].push_front(w);
        }
    }

    let mut out: Vec<EdgeKey> = Vec::new();
    for p in fas_pairs {
        let (v, w, _) = pairs[p];
        out.extend(g.out_edges(ids[v], Some(ids[w])));
    }
    out
}

fn pop_alive(
    buckets: &mut [VecDeque<usize>],
    b: usize,
    alive: &[bool],
    placed: &[usize],
) -> Option<usize> {
    while let Some(v) = buckets[b].pop_back() {
        if alive[v] && placed[v] == b {
            return Some(v);
        }
    }
    None
}
