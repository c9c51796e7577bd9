use super::layers::{LayerGraph, positions};

/// Crossings between the edges of `u` and `v` (with `u` left of `v`) toward one neighbor layer.
fn pair_crossings(nu: &[(usize, f64)], nv: &[(usize, f64)], pos: &[usize], rank: &[usize], r: usize) -> f64 {
    let mut c = 0.0;
    for &(a, wa) in nu {
        if rank[a] != r {
            continue;
        }
        for &(b, wb) in nv {
            if rank[b] == r && pos[a] > pos[b] {
                c += wa * wb;
            }
        }
    }
    c
}

fn local_crossings(lg: &LayerGraph, pos: &[usize], u: usize, v: usize) -> f64 {
    let r = lg.rank[u];
    let mut c = 0.0;
    if r > 0 {
        c += pair_crossings(&lg.preds[u], &lg.preds[v], pos, &lg.rank, r - 1);
    }
    c + pair_crossings(&lg.succs[u], &lg.succs[v], pos, &lg.rank, r + 1)
}

/// Swaps adjacent nodes of the same container while that strictly lowers local crossings.
pub fn transpose(lg: &LayerGraph, layering: &mut [Vec<usize>]) {
    let mut pos = positions(layering, lg.len());
    let max_passes = layering.iter().map(Vec::len).max().unwrap_or(0).max(1);
    for _ in 0..max_passes {
        let mut improved = false;
        for r in 0..layering.len() {
            for i in 1..layering[r].len() {
                let (u, v) = (layering[r][i - 1], layering[r][i]);
                if lg.cluster_path[u] != lg.cluster_path[v] {
                    continue;
                }
                let before = local_crossings(lg, &pos, u, v);
                let after = local_crossings(lg, &pos, v, u);
                if after < before {
                    layering[r].swap(i - 1, i);
                    pos[u] = i;
                    pos[v] = i - 1;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::cross_count;
    use crate::order::layers::two_layers;

    #[test]
    fn swaps_to_remove_a_crossing() {
        let lg = two_layers(&[(0, 3), (1, 2)], vec![Vec::new(); 4]);
        let mut layering = vec![vec![0, 1], vec![2, 3]];
        transpose(&lg, &mut layering);
        assert_eq!(cross_count(&lg, &layering), 0.0);
        assert_eq!(layering[0], vec![1, 0]);
        assert_eq!(layering[1], vec![2, 3]);
    }

    #[test]
    fn never_swaps_across_containers() {
        let lg = two_layers(
            &[(0, 3), (1, 2)],
            vec![vec![0], Vec::new(), vec![0], Vec::new()],
        );
        let mut layering = vec![vec![0, 1], vec![2, 3]];
        transpose(&lg, &mut layering);
        assert_eq!(layering, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn keeps_order_when_a_swap_does_not_help() {
        let lg = two_layers(&[(0, 2), (1, 3)], vec![Vec::new(); 4]);
        let mut layering = vec![vec![0, 1], vec![2, 3]];
        transpose(&lg, &mut layering);
        assert_eq!(layering, vec![vec![0, 1], vec![2, 3]]);
    }
}
