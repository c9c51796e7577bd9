//! Left packing.
//!
//! Each rank is packed from the left with the minimum separation, then shifted so its center
//! lines up with the center of the widest rank.

use super::{CoordinateStrategy, PositionContext};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStrategy;

impl CoordinateStrategy for LegacyStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn assign_x(&self, ctx: &PositionContext) -> Result<Vec<f64>> {
        let mut xs = vec![0.0; ctx.len()];
        let mut extents: Vec<(f64, f64)> = Vec::with_capacity(ctx.layering.len());
        for layer in &ctx.layering {
            let Some(&first) = layer.first() else {
                extents.push((0.0, 0.0));
                continue;
            };
            xs[first] = ctx.width[first] / 2.0;
            for pair in layer.windows(2) {
                xs[pair[1]] = xs[pair[0]] + ctx.sep(pair[0], pair[1]);
            }
            let last = layer[layer.len() - 1];
            extents.push((0.0, xs[last] + ctx.width[last] / 2.0));
        }

        let widest = extents.iter().map(|(l, r)| r - l).fold(0.0, f64::max);
        for (layer, (left, right)) in ctx.layering.iter().zip(extents) {
            let shift = (widest - (right - left)) / 2.0;
            for &v in layer {
                xs[v] += shift;
            }
        }
        Ok(xs)
    }
}
