//! Brandes & Köpf horizontal coordinate assignment.
//!
//! Four alignments (up/down × left/right) each build vertical blocks by aligning nodes with a
//! median neighbor, then compact the blocks against each other. The narrowest alignment is the
//! reference the others are shifted onto, and every node takes the mean of its two middle
//! candidate coordinates.

use super::{CoordinateStrategy, PositionContext};
use crate::error::Result;
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrandesKoepf;

impl CoordinateStrategy for BrandesKoepf {
    fn name(&self) -> &'static str {
        "brandes-koepf"
    }

    fn assign_x(&self, ctx: &PositionContext) -> Result<Vec<f64>> {
        Ok(position_x(ctx))
    }
}

type Conflicts = HashSet<(usize, usize)>;

fn add_conflict(conflicts: &mut Conflicts, v: usize, w: usize) {
    conflicts.insert((v.min(w), v.max(w)));
}

fn has_conflict(conflicts: &Conflicts, v: usize, w: usize) -> bool {
    conflicts.contains(&(v.min(w), v.max(w)))
}

fn order_of(ctx: &PositionContext) -> Vec<usize> {
    let mut order = vec![0usize; ctx.len()];
    for layer in &ctx.layering {
        for (i, &v) in layer.iter().enumerate() {
            order[v] = i;
        }
    }
    order
}

/// Virtual predecessor of a virtual node, i.e. the other end of an inner segment.
fn inner_segment_upper(ctx: &PositionContext, v: usize) -> Option<usize> {
    ctx.dummy[v]?;
    ctx.preds[v].iter().copied().find(|&u| ctx.dummy[u].is_some())
}

/// Type 1: a non-inner segment crossing an inner segment. The non-inner one is marked.
pub fn find_type1_conflicts(ctx: &PositionContext) -> Conflicts {
    let order = order_of(ctx);
    let mut conflicts = Conflicts::default();
    for i in 1..ctx.layering.len() {
        let prev_len = ctx.layering[i - 1].len();
        let layer = &ctx.layering[i];
        let mut k0 = 0usize;
        let mut scan_pos = 0usize;
        for (idx, &v) in layer.iter().enumerate() {
            let w = inner_segment_upper(ctx, v);
            let k1 = w.map_or(prev_len, |w| order[w]);
            if w.is_none() && idx + 1 != layer.len() {
                continue;
            }
            for &scan in &layer[scan_pos..=idx] {
                for &u in &ctx.preds[scan] {
                    let u_pos = order[u];
                    let both_dummy = ctx.dummy[u].is_some() && ctx.dummy[scan].is_some();
                    if (u_pos < k0 || k1 < u_pos) && !both_dummy {
                        add_conflict(&mut conflicts, u, scan);
                    }
                }
            }
            scan_pos = idx + 1;
            k0 = k1;
        }
    }
    conflicts
}

/// Type 2: two inner segments crossing each other. The later one (in layer order) is marked.
pub fn find_type2_conflicts(ctx: &PositionContext) -> Conflicts {
    let order = order_of(ctx);
    let mut conflicts = Conflicts::default();
    for layer in ctx.layering.iter().skip(1) {
        let mut rightmost: Option<usize> = None;
        for &v in layer {
            let Some(u) = inner_segment_upper(ctx, v) else {
                continue;
            };
            match rightmost {
                Some(r) if order[u] < r => add_conflict(&mut conflicts, u, v),
                _ => rightmost = Some(order[u]),
            }
        }
    }
    conflicts
}

struct Alignment {
    root: Vec<usize>,
    align: Vec<usize>,
}

fn vertical_alignment(
    n: usize,
    layering: &[Vec<usize>],
    conflicts: &Conflicts,
    neighbors: &[Vec<usize>],
) -> Alignment {
    let mut root: Vec<usize> = (0..n).collect();
    let mut align: Vec<usize> = (0..n).collect();
    let mut pos = vec![0usize; n];
    for layer in layering {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }

    for layer in layering {
        let mut prev_idx: isize = -1;
        for &v in layer {
            let mut ws = neighbors[v].clone();
            if ws.is_empty() {
                continue;
            }
            ws.sort_by_key(|&w| pos[w]);
            ws.dedup();
            let mp = (ws.len() - 1) as f64 / 2.0;
            let (i0, i1) = (mp.floor() as usize, mp.ceil() as usize);
            for &w in &ws[i0..=i1] {
                let w_pos = pos[w] as isize;
                if align[v] == v && prev_idx < w_pos && !has_conflict(conflicts, v, w) {
                    align[w] = v;
                    root[v] = root[w];
                    align[v] = root[v];
                    prev_idx = w_pos;
                }
            }
        }
    }
    Alignment { root, align }
}

fn horizontal_compaction(
    ctx: &PositionContext,
    layering: &[Vec<usize>],
    alignment: &Alignment,
    reverse: bool,
) -> Vec<f64> {
    let n = ctx.len();
    let root = &alignment.root;

    // Block graph over roots: left block -> right block with the required separation.
    let mut out: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut in_: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut is_block = vec![false; n];
    for layer in layering {
        for (i, &v) in layer.iter().enumerate() {
            is_block[root[v]] = true;
            if i == 0 {
                continue;
            }
            let u = layer[i - 1];
            let (ru, rv) = (root[u], root[v]);
            // Separation is physical: in a mirrored layering `v` is the left one.
            let sep = if reverse { ctx.sep(v, u) } else { ctx.sep(u, v) };
            match out[ru].iter_mut().find(|(t, _)| *t == rv) {
                Some(edge) => edge.1 = edge.1.max(sep),
                None => out[ru].push((rv, sep)),
            }
            match in_[rv].iter_mut().find(|(t, _)| *t == ru) {
                Some(edge) => edge.1 = edge.1.max(sep),
                None => in_[rv].push((ru, sep)),
            }
        }
    }

    // Topological order of blocks; leftover blocks (only possible on a malformed alignment)
    // are appended so every node still gets a coordinate.
    let mut indeg: Vec<usize> = (0..n).map(|b| in_[b].len()).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&b| is_block[b] && indeg[b] == 0).collect();
    let mut topo: Vec<usize> = Vec::with_capacity(n);
    let mut placed = vec![false; n];
    while let Some(b) = queue.pop_front() {
        topo.push(b);
        placed[b] = true;
        for &(c, _) in &out[b] {
            indeg[c] -= 1;
            if indeg[c] == 0 {
                queue.push_back(c);
            }
        }
    }
    topo.extend((0..n).filter(|&b| is_block[b] && !placed[b]));

    let mut xs = vec![0.0f64; n];
    for &b in &topo {
        xs[b] = in_[b]
            .iter()
            .map(|&(a, sep)| xs[a] + sep)
            .fold(0.0, f64::max);
    }
    for &b in topo.iter().rev() {
        let min = out[b]
            .iter()
            .map(|&(c, sep)| xs[c] - sep)
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            xs[b] = xs[b].max(min);
        }
    }

    (0..n).map(|v| xs[root[v]]).collect()
}

pub fn position_x(ctx: &PositionContext) -> Vec<f64> {
    let n = ctx.len();
    if n == 0 {
        return Vec::new();
    }
    let mut conflicts = find_type1_conflicts(ctx);
    conflicts.extend(find_type2_conflicts(ctx));

    // ul, ur, dl, dr
    let mut xss: Vec<Vec<f64>> = Vec::with_capacity(4);
    for up in [true, false] {
        let base: Vec<Vec<usize>> = if up {
            ctx.layering.clone()
        } else {
            ctx.layering.iter().rev().cloned().collect()
        };
        let neighbors = if up { &ctx.preds } else { &ctx.succs };
        for right in [false, true] {
            let layering: Vec<Vec<usize>> = if right {
                base.iter()
                    .map(|l| l.iter().rev().copied().collect())
                    .collect()
            } else {
                base.clone()
            };
            let alignment = vertical_alignment(n, &layering, &conflicts, neighbors);
            let mut xs = horizontal_compaction(ctx, &layering, &alignment, right);
            if right {
                xs.iter_mut().for_each(|x| *x = -*x);
            }
            xss.push(xs);
        }
    }

    let extent = |xs: &[f64]| {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in 0..n {
            min = min.min(xs[v] - ctx.width[v] / 2.0);
            max = max.max(xs[v] + ctx.width[v] / 2.0);
        }
        (min, max)
    };

    // Narrowest alignment, first on ties.
    let mut best = 0usize;
    let mut best_width = f64::INFINITY;
    for (i, xs) in xss.iter().enumerate() {
        let (min, max) = extent(xs);
        if max - min < best_width {
            best_width = max - min;
            best = i;
        }
    }
    let reference = xss[best].clone();
    let ref_min = reference.iter().copied().fold(f64::INFINITY, f64::min);
    let ref_max = reference.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    for (i, xs) in xss.iter_mut().enumerate() {
        let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let right = i % 2 == 1;
        let delta = if right { ref_max - max } else { ref_min - min };
        if delta != 0.0 {
            xs.iter_mut().for_each(|x| *x += delta);
        }
    }

    (0..n)
        .map(|v| {
            let mut vals = [xss[0][v], xss[1][v], xss[2][v], xss[3][v]];
            vals.sort_by(f64::total_cmp);
            (vals[1] + vals[2]) / 2.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DummyKind;

    fn ctx(layering: Vec<Vec<usize>>, edges: &[(usize, usize)], dummies: &[usize]) -> PositionContext {
        let n: usize = layering.iter().map(Vec::len).sum();
        let mut preds = vec![Vec::new(); n];
        let mut succs = vec![Vec::new(); n];
        for &(u, v) in edges {
            succs[u].push(v);
            preds[v].push(u);
        }
        let mut dummy = vec![None; n];
        for &d in dummies {
            dummy[d] = Some(DummyKind::Edge);
        }
        PositionContext {
            ids: (0..n).map(|i| format!("n{i}")).collect(),
            layering,
            width: vec![10.0; n],
            dummy,
            labelpos: vec![None; n],
            cluster_path: vec![Vec::new(); n],
            preds,
            succs,
            edges: edges.iter().map(|&(u, v)| (u, v, 1.0)).collect(),
            nodesep: 20.0,
            edgesep: 10.0,
            cluster_padding: 0.0,
        }
    }

    #[test]
    fn chain_is_straight() {
        let c = ctx(vec![vec![0], vec![1], vec![2]], &[(0, 1), (1, 2)], &[]);
        let xs = position_x(&c);
        assert_eq!(xs[0], xs[1]);
        assert_eq!(xs[1], xs[2]);
    }

    #[test]
    fn siblings_are_separated_and_parent_centered() {
        let c = ctx(vec![vec![0], vec![1, 2]], &[(0, 1), (0, 2)], &[]);
        let xs = position_x(&c);
        assert!(xs[2] - xs[1] >= 30.0 - 1e-9);
        assert!((xs[0] - (xs[1] + xs[2]) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn crossing_inner_segments_conflict() {
        // 0,1 on top; dummies 2,3 below cross each other.
        let c = ctx(vec![vec![0, 1], vec![2, 3]], &[(0, 3), (1, 2)], &[0, 1, 2, 3]);
        let t2 = find_type2_conflicts(&c);
        assert_eq!(t2.len(), 1);
    }
}
