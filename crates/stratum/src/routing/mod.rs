//! Orthogonal edge routing.
//!
//! Edges are routed over the free-space [`Grid`] with Dijkstra on `(cell, heading)` states, so
//! a change of direction can be charged a bend penalty. The resulting cell chain is turned into
//! an axis-aligned polyline between the two endpoint boxes.

pub mod grid;

pub use grid::{Grid, GridVertex, Side, VertexId};

use crate::model::{Point, Rect};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    pub bend_penalty: f64,
    /// Boxes the route should stay out of, e.g. containers unrelated to either endpoint.
    pub avoid: Vec<Rect>,
    pub avoid_penalty: f64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            bend_penalty: 40.0,
            avoid: Vec::new(),
            avoid_penalty: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    cost: f64,
    vertex: VertexId,
    heading: Side,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heading_ix(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
        Side::Top => 2,
        Side::Bottom => 3,
    }
}

fn manhattan(a: Point, b: Point) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Point on `rect`'s border facing a cell lying against its `side`.
fn anchor(rect: &Rect, side: Side, cell: Point) -> Point {
    match side {
        Side::Left => Point::new(rect.x, cell.y),
        Side::Right => Point::new(rect.right(), cell.y),
        Side::Top => Point::new(cell.x, rect.y),
        Side::Bottom => Point::new(cell.x, rect.bottom()),
    }
}

/// Shortest axis-aligned route from `source` to `target`, or `None` when the grid offers no
/// connection.
pub fn route(grid: &Grid, source: &Rect, target: &Rect, options: &RouteOptions) -> Option<Vec<Point>> {
    let n = grid.len();
    if n == 0 {
        return None;
    }
    let penalty = |id: VertexId| {
        let c = grid.vertex(id).center();
        if options.avoid.iter().any(|r| r.contains_strictly(c)) {
            options.avoid_penalty
        } else {
            0.0
        }
    };

    let mut dist = vec![f64::INFINITY; n * 4];
    let mut prev: Vec<Option<(VertexId, Side)>> = vec![None; n * 4];
    let mut heap: BinaryHeap<State> = BinaryHeap::new();
    let mut goals: Vec<Option<Side>> = vec![None; n];
    for id in 0..n {
        goals[id] = grid.touching_side(id, target);
        let Some(side) = grid.touching_side(id, source) else {
            continue;
        };
        let c = grid.vertex(id).center();
        let cost = manhattan(anchor(source, side, c), c) + penalty(id);
        let s = id * 4 + heading_ix(side);
        if cost < dist[s] {
            dist[s] = cost;
            heap.push(State {
                cost,
                vertex: id,
                heading: side,
            });
        }
    }

    let mut best: Option<(f64, VertexId, Side)> = None;
    while let Some(State {
        cost,
        vertex,
        heading,
    }) = heap.pop()
    {
        if best.is_some_and(|(b, _, _)| cost >= b) {
            break;
        }
        if cost > dist[vertex * 4 + heading_ix(heading)] {
            continue;
        }
        let v = grid.vertex(vertex);
        if let Some(side) = goals[vertex] {
            // Arriving from the target's `side` means travelling toward the opposite one.
            let into = side.opposite();
            let bend = if heading == into { 0.0 } else { options.bend_penalty };
            let total = cost + manhattan(v.center(), anchor(target, side, v.center())) + bend;
            if best.is_none_or(|(b, _, _)| total < b) {
                best = Some((total, vertex, heading));
            }
        }
        for side in Side::ALL {
            let Some(next) = v.neighbor(side) else {
                continue;
            };
            let bend = if side == heading { 0.0 } else { options.bend_penalty };
            let step = manhattan(v.center(), grid.vertex(next).center()) + bend + penalty(next);
            let s = next * 4 + heading_ix(side);
            if cost + step < dist[s] {
                dist[s] = cost + step;
                prev[s] = Some((vertex, heading));
                heap.push(State {
                    cost: cost + step,
                    vertex: next,
                    heading: side,
                });
            }
        }
    }

    let (_, last, heading) = best?;
    let mut cells: Vec<VertexId> = vec![last];
    let mut cur = (last, heading);
    while let Some(p) = prev[cur.0 * 4 + heading_ix(cur.1)] {
        cells.push(p.0);
        cur = p;
    }
    cells.reverse();

    let first = cells[0];
    let first_side = grid.touching_side(first, source)?;
    let last_side = grid.touching_side(last, target)?;
    let mut points = vec![anchor(source, first_side, grid.vertex(first).center())];
    points.extend(cells.iter().map(|&c| grid.vertex(c).center()));
    points.push(anchor(target, last_side, grid.vertex(last).center()));
    Some(simplify(points))
}

/// Drops repeated points and interior points of straight runs.
pub fn simplify(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|q| manhattan(*q, p) < 1e-9) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let same_x = (a.x - b.x).abs() < 1e-9 && (b.x - p.x).abs() < 1e-9;
            let same_y = (a.y - b.y).abs() < 1e-9 && (b.y - p.y).abs() < 1e-9;
            if same_x || same_y {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// Whether consecutive points only ever differ along one axis.
pub fn is_axis_aligned(points: &[Point]) -> bool {
    points
        .windows(2)
        .all(|w| (w[0].x - w[1].x).abs() < 1e-6 || (w[0].y - w[1].y).abs() < 1e-6)
}
