use super::layers::LayerGraph;

/// Initial layering: a depth-first walk along out edges, started from every node in
/// `(rank, insertion)` order, appends each node to its rank on first visit.
pub fn init_order(lg: &LayerGraph) -> Vec<Vec<usize>> {
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); lg.rank_count];
    let mut visited = vec![false; lg.len()];
    let mut starts: Vec<usize> = (0..lg.len()).collect();
    starts.sort_by_key(|&v| (lg.rank[v], v));

    let mut stack: Vec<usize> = Vec::new();
    for start in starts {
        stack.push(start);
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            layers[lg.rank[v]].push(v);
            for &(w, _) in lg.succs[v].iter().rev() {
                if !visited[w] {
                    stack.push(w);
                }
            }
        }
    }
    layers
}
