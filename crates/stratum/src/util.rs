//! Geometry and layering helpers shared by the layout phases.
//!
//! Helpers are best-effort: degenerate input (coincident points, zero-sized boxes, missing
//! ranks) yields a deterministic answer instead of a panic.

use crate::model::{NodeLabel, Point, Rect, WorkGraph};

/// Where the segment from the center of `rect` toward `point` crosses its border.
pub fn intersect_rect(rect: &Rect, point: Point) -> Point {
    let c = rect.center();
    let dx = point.x - c.x;
    let dy = point.y - c.y;
    let mut w = rect.width / 2.0;
    let mut h = rect.height / 2.0;

    if dx == 0.0 && dy == 0.0 {
        return Point::new(c.x + w.max(0.0), c.y);
    }
    if !(w > 0.0 && h > 0.0) {
        return c;
    }

    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        if dy < 0.0 {
            h = -h;
        }
        (h * dx / dy, h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        (w, w * dy / dx)
    };

    Point::new(c.x + sx, c.y + sy)
}

/// Border crossing for the ellipse inscribed in `rect`.
pub fn intersect_ellipse(rect: &Rect, point: Point) -> Point {
    let c = rect.center();
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;
    let dx = point.x - c.x;
    let dy = point.y - c.y;
    if (dx == 0.0 && dy == 0.0) || rx <= 0.0 || ry <= 0.0 {
        return Point::new(c.x + rx.max(0.0), c.y);
    }
    let t = 1.0 / ((dx / rx).powi(2) + (dy / ry).powi(2)).sqrt();
    Point::new(c.x + dx * t, c.y + dy * t)
}

/// Border crossing for a convex polygon drawn inside `rect`. Falls back to the box when the ray
/// misses every side.
pub fn intersect_polygon(rect: &Rect, vertices: &[Point], point: Point) -> Point {
    let c = rect.center();
    let dir = Point::new(point.x - c.x, point.y - c.y);
    if dir.x == 0.0 && dir.y == 0.0 {
        return intersect_rect(rect, point);
    }
    let mut best: Option<(f64, Point)> = None;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let edge = Point::new(b.x - a.x, b.y - a.y);
        let denom = dir.x * edge.y - dir.y * edge.x;
        if denom.abs() < 1e-12 {
            continue;
        }
        let ac = Point::new(a.x - c.x, a.y - c.y);
        let t = (ac.x * edge.y - ac.y * edge.x) / denom;
        let u = (ac.x * dir.y - ac.y * dir.x) / denom;
        if t >= 0.0 && (-1e-9..=1.0 + 1e-9).contains(&u) && best.is_none_or(|(bt, _)| t < bt) {
            best = Some((t, Point::new(c.x + dir.x * t, c.y + dir.y * t)));
        }
    }
    best.map_or_else(|| intersect_rect(rect, point), |(_, p)| p)
}

/// Point where the segment from `inside` to `outside` leaves `rect`.
pub fn segment_exit(rect: &Rect, inside: Point, outside: Point) -> Point {
    let dx = outside.x - inside.x;
    let dy = outside.y - inside.y;
    let mut t: f64 = 1.0;
    if dx > 0.0 {
        t = t.min((rect.right() - inside.x) / dx);
    } else if dx < 0.0 {
        t = t.min((rect.x - inside.x) / dx);
    }
    if dy > 0.0 {
        t = t.min((rect.bottom() - inside.y) / dy);
    } else if dy < 0.0 {
        t = t.min((rect.y - inside.y) / dy);
    }
    let t = t.clamp(0.0, 1.0);
    Point::new(inside.x + dx * t, inside.y + dy * t)
}

/// Bounding box of a node label whose `x`/`y` are its center.
pub fn node_rect(n: &NodeLabel) -> Rect {
    Rect::from_center(
        Point::new(n.x.unwrap_or(0.0), n.y.unwrap_or(0.0)),
        n.width,
        n.height,
    )
}

/// Node ids grouped by rank (index = rank) and sorted by `order`, ties by insertion order.
pub fn build_layer_matrix(g: &WorkGraph) -> Vec<Vec<String>> {
    let mut entries: Vec<(usize, usize, usize, String)> = Vec::new();
    let mut max_rank: Option<usize> = None;
    for (seq, id) in g.nodes().enumerate() {
        let Some(node) = g.node(id) else {
            continue;
        };
        let Some(rank) = node.rank else {
            continue;
        };
        let rank = rank.max(0) as usize;
        max_rank = Some(max_rank.map_or(rank, |m| m.max(rank)));
        entries.push((rank, node.order.unwrap_or(usize::MAX), seq, id.to_string()));
    }
    let Some(max_rank) = max_rank else {
        return Vec::new();
    };
    entries.sort_by_key(|(r, o, seq, _)| (*r, *o, *seq));
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for (rank, _, _, id) in entries {
        layers[rank].push(id);
    }
    layers
}

/// Shifts ranks so the smallest one is zero.
pub fn normalize_ranks(g: &mut WorkGraph) {
    let mut min = i32::MAX;
    g.for_each_node(|_, n| {
        if let Some(r) = n.rank {
            min = min.min(r);
        }
    });
    if min == i32::MAX || min == 0 {
        return;
    }
    g.for_each_node_mut(|_, n| {
        if let Some(r) = n.rank.as_mut() {
            *r -= min;
        }
    });
}

pub fn max_rank(g: &WorkGraph) -> Option<i32> {
    let mut max: Option<i32> = None;
    g.for_each_node(|_, n| {
        if let Some(r) = n.rank {
            max = Some(max.map_or(r, |m| m.max(r)));
        }
    });
    max
}

/// Inserts `label` under the first free id of the form `{prefix}{n}`.
pub fn add_dummy_node(g: &mut WorkGraph, prefix: &str, label: NodeLabel) -> String {
    let mut i = g.node_count();
    loop {
        let id = format!("{prefix}{i}");
        if !g.has_node(&id) {
            g.set_node(id.clone(), label);
            return id;
        }
        i += 1;
    }
}
