//! Coordinate assignment.
//!
//! y follows from ranks alone. x comes from one of three [`CoordinateStrategy`] implementations
//! and then goes through a separation pass, so whatever the strategy, nodes of one rank keep
//! their order and never overlap.

pub mod bk;
pub mod improved;
pub mod legacy;

use crate::config::CoordinateMode;
use crate::error::Result;
use crate::model::{DummyKind, LabelPos, RankDir, WorkGraph};
use crate::util::build_layer_matrix;
use rustc_hash::FxHashMap as HashMap;

/// Everything a strategy needs, indexed by node position in `ids`.
#[derive(Debug, Clone)]
pub struct PositionContext {
    pub ids: Vec<String>,
    /// Node indices per rank, in order.
    pub layering: Vec<Vec<usize>>,
    pub width: Vec<f64>,
    pub dummy: Vec<Option<DummyKind>>,
    pub labelpos: Vec<Option<LabelPos>>,
    pub cluster_path: Vec<Vec<usize>>,
    pub preds: Vec<Vec<usize>>,
    pub succs: Vec<Vec<usize>>,
    /// Edge weight of every `(tail, head)` pair.
    pub edges: Vec<(usize, usize, f64)>,
    pub nodesep: f64,
    pub edgesep: f64,
    pub cluster_padding: f64,
}

impl PositionContext {
    pub fn from_graph(g: &WorkGraph, cluster_padding: f64) -> Self {
        let layers = build_layer_matrix(g);
        let mut ids: Vec<String> = Vec::new();
        let mut layering: Vec<Vec<usize>> = Vec::with_capacity(layers.len());
        for layer in layers {
            let mut ixs = Vec::with_capacity(layer.len());
            for id in layer {
                ixs.push(ids.len());
                ids.push(id);
            }
            layering.push(ixs);
        }
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let n = ids.len();
        let mut width = vec![0.0; n];
        let mut dummy = vec![None; n];
        let mut labelpos = vec![None; n];
        let mut cluster_path = vec![Vec::new(); n];
        for (i, id) in ids.iter().enumerate() {
            if let Some(node) = g.node(id) {
                width[i] = node.width;
                dummy[i] = node.dummy;
                labelpos[i] = node.labelpos;
                cluster_path[i] = node.cluster_path.clone();
            }
        }
        let mut preds = vec![Vec::new(); n];
        let mut succs = vec![Vec::new(); n];
        let mut edges = Vec::new();
        g.for_each_edge(|e, lbl| {
            let (Some(&v), Some(&w)) = (index.get(e.v.as_str()), index.get(e.w.as_str())) else {
                return;
            };
            if v == w {
                return;
            }
            succs[v].push(w);
            preds[w].push(v);
            edges.push((v, w, lbl.weight));
        });

        let gl = g.graph();
        Self {
            ids,
            layering,
            width,
            dummy,
            labelpos,
            cluster_path,
            preds,
            succs,
            edges,
            nodesep: gl.nodesep,
            edgesep: gl.edgesep,
            cluster_padding,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn spacing(&self, v: usize) -> f64 {
        match self.dummy[v] {
            Some(DummyKind::Edge | DummyKind::EdgeLabel | DummyKind::SelfEdge) => self.edgesep,
            Some(DummyKind::Container) | None => self.nodesep,
        }
    }

    /// Container boundaries crossed between `u` and `v`.
    fn boundaries(&self, u: usize, v: usize) -> usize {
        let (a, b) = (&self.cluster_path[u], &self.cluster_path[v]);
        let common = a.iter().zip(b).take_while(|(x, y)| x == y).count();
        a.len() + b.len() - 2 * common
    }

    /// Minimum distance between the centers of `left` and `right` when `left` sits
    /// immediately left of `right`. A label dummy with a side label reserves its whole width
    /// on that side of the edge line.
    pub fn sep(&self, left: usize, right: usize) -> f64 {
        let mut sum = self.width[left] / 2.0 + self.width[right] / 2.0;
        match self.labelpos[left] {
            Some(LabelPos::Right) => sum += self.width[left] / 2.0,
            Some(LabelPos::Left) => sum -= self.width[left] / 2.0,
            _ => {}
        }
        match self.labelpos[right] {
            Some(LabelPos::Left) => sum += self.width[right] / 2.0,
            Some(LabelPos::Right) => sum -= self.width[right] / 2.0,
            _ => {}
        }
        sum += (self.spacing(left) + self.spacing(right)) / 2.0;
        sum + self.cluster_padding * self.boundaries(left, right) as f64
    }
}

/// Assigns an x coordinate to every node of a rank-ordered layering.
pub trait CoordinateStrategy {
    fn name(&self) -> &'static str;

    fn assign_x(&self, ctx: &PositionContext) -> Result<Vec<f64>>;
}

pub fn strategy_for(mode: CoordinateMode) -> Box<dyn CoordinateStrategy> {
    match mode {
        CoordinateMode::Legacy => Box::new(legacy::LegacyStrategy),
        CoordinateMode::Default => Box::new(bk::BrandesKoepf),
        CoordinateMode::Improved => Box::new(improved::SimplexStrategy),
    }
}

/// Pushes nodes right until every same-rank neighbor pair is at least `sep` apart.
pub fn enforce_separation(ctx: &PositionContext, xs: &mut [f64]) {
    for layer in &ctx.layering {
        for pair in layer.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            let min = xs[u] + ctx.sep(u, v);
            if xs[v] < min {
                xs[v] = min;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub mode: CoordinateMode,
    pub cluster_padding: f64,
    pub cluster_label_height: f64,
}

/// Sets `x` and `y` on every node of `g` in the top-to-bottom frame.
pub fn position(g: &mut WorkGraph, options: &PositionOptions, labeled: &[bool]) -> Result<()> {
    let ctx = PositionContext::from_graph(g, options.cluster_padding);
    let strategy = strategy_for(options.mode);
    let mut xs = strategy.assign_x(&ctx)?;
    if xs.len() != ctx.len() {
        xs.resize(ctx.len(), 0.0);
    }
    enforce_separation(&ctx, &mut xs);
    for (i, id) in ctx.ids.iter().enumerate() {
        if let Some(n) = g.node_mut(id) {
            n.x = Some(xs[i]);
        }
    }
    position_y(g, &ctx, options, labeled);
    tracing::debug!(strategy = strategy.name(), nodes = ctx.len(), "position");
    Ok(())
}

/// First and last rank touched by each bordered container.
fn cluster_spans(ctx: &PositionContext) -> HashMap<usize, (usize, usize)> {
    let mut spans: HashMap<usize, (usize, usize)> = HashMap::default();
    for (r, layer) in ctx.layering.iter().enumerate() {
        for &v in layer {
            for &c in &ctx.cluster_path[v] {
                let span = spans.entry(c).or_insert((r, r));
                span.0 = span.0.min(r);
                span.1 = span.1.max(r);
            }
        }
    }
    spans
}

fn position_y(g: &mut WorkGraph, ctx: &PositionContext, options: &PositionOptions, labeled: &[bool]) {
    let rankdir = g.graph().rankdir;
    let ranksep = g.graph().ranksep;
    let spans = cluster_spans(ctx);
    let label_band = |c: usize| {
        if labeled.get(c).copied().unwrap_or(false) && !rankdir.is_horizontal() {
            options.cluster_label_height
        } else {
            0.0
        }
    };
    // Label bands sit on the visual top, which is the last rank for bottom-to-top drawings.
    let label_on_first = rankdir != RankDir::BT;

    let heights: Vec<f64> = ctx
        .layering
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&v| g.node(&ctx.ids[v]).map_or(0.0, |n| n.height))
                .fold(0.0, f64::max)
        })
        .collect();

    let mut y = 0.0;
    for (r, layer) in ctx.layering.iter().enumerate() {
        if r > 0 {
            let mut below = 0.0f64;
            for &v in &ctx.layering[r - 1] {
                let ending = ctx.cluster_path[v]
                    .iter()
                    .filter(|c| spans.get(c).is_some_and(|s| s.1 == r - 1));
                let extra: f64 = ending
                    .map(|&c| {
                        options.cluster_padding + if label_on_first { 0.0 } else { label_band(c) }
                    })
                    .sum();
                below = below.max(extra);
            }
            let mut above = 0.0f64;
            for &v in layer {
                let starting = ctx.cluster_path[v]
                    .iter()
                    .filter(|c| spans.get(c).is_some_and(|s| s.0 == r));
                let extra: f64 = starting
                    .map(|&c| {
                        options.cluster_padding + if label_on_first { label_band(c) } else { 0.0 }
                    })
                    .sum();
                above = above.max(extra);
            }
            y += heights[r - 1] / 2.0 + ranksep + below + above + heights[r] / 2.0;
        } else {
            y = heights[0] / 2.0;
        }
        for &v in layer {
            if let Some(n) = g.node_mut(&ctx.ids[v]) {
                n.y = Some(y);
            }
        }
    }
}
