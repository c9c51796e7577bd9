use super::layers::LayerGraph;

/// Weighted crossings of the whole layering.
pub fn cross_count(lg: &LayerGraph, layering: &[Vec<usize>]) -> f64 {
    let mut pos = vec![0usize; lg.len()];
    for layer in layering {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }
    layering
        .windows(2)
        .map(|pair| two_layer_cross_count(lg, &pos, &pair[0], &pair[1]))
        .sum()
}

/// Accumulator tree count (Barth, Jünger, Mutzel) of crossings between two adjacent layers.
fn two_layer_cross_count(lg: &LayerGraph, pos: &[usize], north: &[usize], south: &[usize]) -> f64 {
    if south.is_empty() {
        return 0.0;
    }
    let south_rank = lg.rank[south[0]];

    let mut entries: Vec<(usize, f64)> = Vec::new();
    for &v in north {
        let start = entries.len();
        for &(w, weight) in &lg.succs[v] {
            if lg.rank[w] == south_rank {
                entries.push((pos[w], weight));
            }
        }
        entries[start..].sort_by_key(|(p, _)| *p);
    }

    let mut first_index = 1usize;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let mut tree = vec![0.0f64; 2 * first_index - 1];
    first_index -= 1;

    let mut cc = 0.0;
    for (p, weight) in entries {
        let mut index = p + first_index;
        tree[index] += weight;
        let mut sum = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += weight;
        }
        cc += weight * sum;
    }
    cc
}
