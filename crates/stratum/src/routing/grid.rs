//! Free-space grid for orthogonal routing.
//!
//! Every obstacle edge extends into a grid line across the routing area. Cells not covered by
//! an obstacle become vertices, linked to their row and column neighbors.

use crate::model::{Point, Rect};

pub type VertexId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
            Side::Top => 2,
            Side::Bottom => 3,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridVertex {
    pub rect: Rect,
    links: [Option<VertexId>; 4],
}

impl GridVertex {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            links: [None; 4],
        }
    }

    pub fn neighbor(&self, side: Side) -> Option<VertexId> {
        self.links[side.index()]
    }

    pub fn left(&self) -> Option<VertexId> {
        self.neighbor(Side::Left)
    }

    pub fn right(&self) -> Option<VertexId> {
        self.neighbor(Side::Right)
    }

    pub fn top(&self) -> Option<VertexId> {
        self.neighbor(Side::Top)
    }

    pub fn bottom(&self) -> Option<VertexId> {
        self.neighbor(Side::Bottom)
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grid {
    vertices: Vec<GridVertex>,
    bounds: Rect,
}

impl Grid {
    pub fn new(bounds: Rect) -> Self {
        Self {
            vertices: Vec::new(),
            bounds,
        }
    }

    pub fn add_vertex(&mut self, rect: Rect) -> VertexId {
        self.vertices.push(GridVertex::new(rect));
        self.vertices.len() - 1
    }

    pub fn vertex(&self, id: VertexId) -> &GridVertex {
        &self.vertices[id]
    }

    pub fn vertices(&self) -> &[GridVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Links `a` on its `side` to `b` on the opposite side. Previous neighbors on those sides
    /// lose their back link.
    fn link(&mut self, a: VertexId, b: VertexId, side: Side) {
        let back = side.opposite();
        if let Some(old) = self.vertices[a].links[side.index()] {
            if self.vertices[old].links[back.index()] == Some(a) {
                self.vertices[old].links[back.index()] = None;
            }
        }
        if let Some(old) = self.vertices[b].links[back.index()] {
            if self.vertices[old].links[side.index()] == Some(b) {
                self.vertices[old].links[side.index()] = None;
            }
        }
        self.vertices[a].links[side.index()] = Some(b);
        self.vertices[b].links[back.index()] = Some(a);
    }

    /// `b` becomes the right neighbor of `a`.
    pub fn link_horizontal(&mut self, a: VertexId, b: VertexId) {
        self.link(a, b, Side::Right);
    }

    /// `b` becomes the bottom neighbor of `a`.
    pub fn link_vertical(&mut self, a: VertexId, b: VertexId) {
        self.link(a, b, Side::Bottom);
    }

    /// Partitions `bounds` along every obstacle edge and keeps the cells outside obstacles.
    pub fn build(bounds: Rect, obstacles: &[Rect]) -> Self {
        Self::build_with_guides(bounds, obstacles, &[])
    }

    /// Like [`Grid::build`], but `guides` also split the area without blocking it, so cells line
    /// up with their borders.
    pub fn build_with_guides(bounds: Rect, obstacles: &[Rect], guides: &[Rect]) -> Self {
        let mut xs = vec![bounds.x, bounds.right()];
        let mut ys = vec![bounds.y, bounds.bottom()];
        for o in obstacles.iter().chain(guides) {
            if o.width <= 0.0 || o.height <= 0.0 {
                continue;
            }
            for x in [o.x, o.right()] {
                if x > bounds.x && x < bounds.right() {
                    xs.push(x);
                }
            }
            for y in [o.y, o.bottom()] {
                if y > bounds.y && y < bounds.bottom() {
                    ys.push(y);
                }
            }
        }
        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        ys.sort_by(f64::total_cmp);
        ys.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        let mut grid = Grid::new(bounds);
        let cols = xs.len().saturating_sub(1);
        let rows = ys.len().saturating_sub(1);
        let mut cell: Vec<Option<VertexId>> = vec![None; cols * rows];
        for r in 0..rows {
            for c in 0..cols {
                let rect = Rect::new(xs[c], ys[r], xs[c + 1] - xs[c], ys[r + 1] - ys[r]);
                let center = rect.center();
                if obstacles.iter().any(|o| o.contains_strictly(center)) {
                    continue;
                }
                cell[r * cols + c] = Some(grid.add_vertex(rect));
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                let Some(a) = cell[r * cols + c] else {
                    continue;
                };
                if c + 1 < cols {
                    if let Some(b) = cell[r * cols + c + 1] {
                        grid.link_horizontal(a, b);
                    }
                }
                if r + 1 < rows {
                    if let Some(b) = cell[(r + 1) * cols + c] {
                        grid.link_vertical(a, b);
                    }
                }
            }
        }
        tracing::trace!(cols, rows, vertices = grid.len(), "routing grid");
        grid
    }

    /// Side of `rect` that vertex `id` lies against, if it touches `rect` along an edge.
    pub fn touching_side(&self, id: VertexId, rect: &Rect) -> Option<Side> {
        const EPS: f64 = 1e-6;
        let v = &self.vertices[id].rect;
        let overlaps_x = v.x < rect.right() - EPS && rect.x < v.right() - EPS;
        let overlaps_y = v.y < rect.bottom() - EPS && rect.y < v.bottom() - EPS;
        if overlaps_y && (v.right() - rect.x).abs() < EPS {
            Some(Side::Left)
        } else if overlaps_y && (v.x - rect.right()).abs() < EPS {
            Some(Side::Right)
        } else if overlaps_x && (v.bottom() - rect.y).abs() < EPS {
            Some(Side::Top)
        } else if overlaps_x && (v.y - rect.bottom()).abs() < EPS {
            Some(Side::Bottom)
        } else {
            None
        }
    }
}
