use super::layers::LayerGraph;

/// Weighted median of neighbor positions (Gansner et al.): the plain median for an odd count,
/// the mean of the two middle values for two, and otherwise the two middle values weighted
/// toward the denser side. `None` when there are no neighbors.
pub fn weighted_median(mut positions: Vec<f64>) -> Option<f64> {
    if positions.is_empty() {
        return None;
    }
    positions.sort_by(f64::total_cmp);
    let len = positions.len();
    let m = len / 2;
    if len % 2 == 1 {
        return Some(positions[m]);
    }
    if len == 2 {
        return Some((positions[0] + positions[1]) / 2.0);
    }
    let left = positions[m - 1] - positions[0];
    let right = positions[len - 1] - positions[m];
    if left + right <= 0.0 {
        return Some((positions[m - 1] + positions[m]) / 2.0);
    }
    Some((positions[m - 1] * right + positions[m] * left) / (left + right))
}

/// Reorders `layer` by the median position of each node's neighbors in the fixed layer.
/// Nodes without such neighbors keep their slot; the others fill the remaining slots sorted
/// by median. Equal medians keep input order (the node's index in the layer graph).
pub fn reorder_layer(lg: &LayerGraph, layer: &mut [usize], fixed_pos: &[usize], downward: bool) {
    let mut movable: Vec<(f64, usize)> = Vec::new();
    let mut slots: Vec<usize> = Vec::new();
    for (i, &v) in layer.iter().enumerate() {
        let neighbors = if downward { &lg.preds[v] } else { &lg.succs[v] };
        let positions: Vec<f64> = neighbors.iter().map(|&(u, _)| fixed_pos[u] as f64).collect();
        if let Some(m) = weighted_median(positions) {
            movable.push((m, v));
            slots.push(i);
        }
    }
    movable.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (slot, (_, v)) in slots.into_iter().zip(movable) {
        layer[slot] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_cases() {
        assert_eq!(weighted_median(vec![]), None);
        assert_eq!(weighted_median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(weighted_median(vec![1.0, 4.0]), Some(2.5));
        // left spread 1, right spread 4: pulled toward the tighter left pair
        assert_eq!(weighted_median(vec![0.0, 1.0, 2.0, 6.0]), Some((1.0 * 4.0 + 2.0 * 1.0) / 5.0));
    }

    #[test]
    fn equal_medians_fall_back_to_input_order() {
        let lg = crate::order::layers::two_layers(&[(0, 2), (0, 3)], vec![Vec::new(); 4]);
        let mut layer = vec![3, 2];
        reorder_layer(&lg, &mut layer, &[0, 1, 0, 1], true);
        assert_eq!(layer, vec![2, 3]);
    }
}
