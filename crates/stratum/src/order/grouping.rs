use super::layers::LayerGraph;

/// Regroups `layer` so the members of every bordered container are contiguous. Groups are
/// placed at the position of their first member; order inside a group is preserved.
pub fn group_by_cluster(lg: &LayerGraph, layer: &mut Vec<usize>) {
    if layer.iter().all(|&v| lg.cluster_path[v].is_empty()) {
        return;
    }
    let grouped = group(lg, std::mem::take(layer), 0);
    *layer = grouped;
}

fn group(lg: &LayerGraph, nodes: Vec<usize>, depth: usize) -> Vec<usize> {
    // Units in first-occurrence order: a lone node, or every node sharing the container at
    // `depth` of its path.
    let mut units: Vec<(Option<usize>, Vec<usize>)> = Vec::new();
    for v in nodes {
        match lg.cluster_path[v].get(depth).copied() {
            None => units.push((None, vec![v])),
            Some(c) => match units.iter_mut().find(|(k, _)| *k == Some(c)) {
                Some((_, members)) => members.push(v),
                None => units.push((Some(c), vec![v])),
            },
        }
    }
    let mut out = Vec::new();
    for (key, members) in units {
        match key {
            None => out.extend(members),
            Some(_) => out.extend(group(lg, members, depth + 1)),
        }
    }
    out
}
