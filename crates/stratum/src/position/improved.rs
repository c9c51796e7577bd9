//! Edge straightening with network simplex.
//!
//! x coordinates are the solution of an auxiliary layering problem: every edge `(u, v)` gets a
//! helper node pulling on both ends, weighted by how much a bend would hurt (1 between real
//! nodes, 2 next to a virtual node, 8 between two virtual nodes), and same-rank neighbors are
//! kept apart by their separation.

use super::{CoordinateStrategy, PositionContext};
use crate::error::Result;
use crate::rank::network_simplex::network_simplex;
use crate::rank::util::SimplexProblem;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexStrategy;

fn omega(ctx: &PositionContext, u: usize, v: usize) -> f64 {
    match (ctx.dummy[u].is_some(), ctx.dummy[v].is_some()) {
        (false, false) => 1.0,
        (true, true) => 8.0,
        _ => 2.0,
    }
}

impl CoordinateStrategy for SimplexStrategy {
    fn name(&self) -> &'static str {
        "improved"
    }

    fn assign_x(&self, ctx: &PositionContext) -> Result<Vec<f64>> {
        let n = ctx.len();
        let mut p = SimplexProblem::new(n + ctx.edges.len());
        for (i, &(u, v, weight)) in ctx.edges.iter().enumerate() {
            let helper = n + i;
            let w = omega(ctx, u, v) * if weight.is_finite() { weight.max(0.0) } else { 0.0 };
            p.add_edge(helper, u, 0, w);
            p.add_edge(helper, v, 0, w);
        }
        for layer in &ctx.layering {
            for pair in layer.windows(2) {
                let sep = ctx.sep(pair[0], pair[1]).ceil() as i64;
                p.add_edge(pair[0], pair[1], sep, 0.0);
            }
        }
        let ranks = network_simplex(&p)?;
        Ok(ranks[..n].iter().map(|&x| x as f64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DummyKind;

    fn ctx(dummies: &[usize]) -> PositionContext {
        let n = 4;
        let mut dummy = vec![None; n];
        for &d in dummies {
            dummy[d] = Some(DummyKind::Edge);
        }
        PositionContext {
            ids: (0..n).map(|i| format!("n{i}")).collect(),
            layering: vec![vec![0, 1], vec![2, 3]],
            width: vec![10.0; n],
            dummy,
            labelpos: vec![None; n],
            cluster_path: vec![Vec::new(); n],
            preds: vec![Vec::new(); n],
            succs: vec![Vec::new(); n],
            edges: Vec::new(),
            nodesep: 20.0,
            edgesep: 10.0,
            cluster_padding: 0.0,
        }
    }

    #[test]
    fn bend_weights_grow_with_virtual_ends() {
        let c = ctx(&[2, 3]);
        assert_eq!(omega(&c, 0, 1), 1.0);
        assert_eq!(omega(&c, 0, 2), 2.0);
        assert_eq!(omega(&c, 3, 1), 2.0);
        assert_eq!(omega(&c, 2, 3), 8.0);
    }

    #[test]
    fn chain_of_virtual_nodes_is_straightened() {
        let mut c = ctx(&[2]);
        c.layering = vec![vec![0, 1], vec![2], vec![3]];
        c.edges = vec![(0, 2, 1.0), (2, 3, 1.0)];
        let xs = SimplexStrategy.assign_x(&c).unwrap();
        assert_eq!(xs[0], xs[2]);
        assert_eq!(xs[2], xs[3]);
        assert!(xs[1] - xs[0] >= c.sep(0, 1));
    }
}
