use stratum::routing::{self, Grid, RouteOptions, Side};
use stratum::{Point, Rect};

fn assert_symmetric(grid: &Grid) {
    for (id, v) in grid.vertices().iter().enumerate() {
        for side in Side::ALL {
            if let Some(n) = v.neighbor(side) {
                assert_eq!(
                    grid.vertex(n).neighbor(side.opposite()),
                    Some(id),
                    "{id} -> {n} on {side:?} has no back link"
                );
            }
        }
    }
}

/// Whether an axis-aligned segment runs through the interior of `r`.
fn crosses(a: Point, b: Point, r: &Rect) -> bool {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    x0 < r.right() && x1 > r.x && y0 < r.bottom() && y1 > r.y
}

#[test]
fn links_are_symmetric_and_relinking_replaces() {
    let mut grid = Grid::new(Rect::new(0.0, 0.0, 30.0, 20.0));
    let a = grid.add_vertex(Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = grid.add_vertex(Rect::new(10.0, 0.0, 10.0, 10.0));
    let c = grid.add_vertex(Rect::new(20.0, 0.0, 10.0, 10.0));
    let d = grid.add_vertex(Rect::new(0.0, 10.0, 10.0, 10.0));

    grid.link_horizontal(a, b);
    assert_eq!(grid.vertex(a).right(), Some(b));
    assert_eq!(grid.vertex(b).left(), Some(a));

    grid.link_horizontal(a, c);
    assert_eq!(grid.vertex(a).right(), Some(c));
    assert_eq!(grid.vertex(c).left(), Some(a));
    assert_eq!(grid.vertex(b).left(), None);

    grid.link_vertical(a, d);
    assert_eq!(grid.vertex(a).bottom(), Some(d));
    assert_eq!(grid.vertex(d).top(), Some(a));
    assert_eq!(grid.vertex(a).top(), None);
    assert_symmetric(&grid);
}

#[test]
fn built_grid_skips_obstacles() {
    let obstacle = Rect::new(40.0, 40.0, 20.0, 20.0);
    let grid = Grid::build(Rect::new(0.0, 0.0, 100.0, 100.0), &[obstacle]);
    assert_eq!(grid.len(), 8);
    for v in grid.vertices() {
        assert!(!obstacle.contains_strictly(v.center()));
    }
    assert_symmetric(&grid);
}

#[test]
fn route_is_axis_aligned_and_avoids_obstacles() {
    let source = Rect::new(10.0, 40.0, 20.0, 20.0);
    let target = Rect::new(70.0, 40.0, 20.0, 20.0);
    let wall = Rect::new(40.0, 20.0, 20.0, 60.0);
    let grid = Grid::build(Rect::new(0.0, 0.0, 100.0, 100.0), &[source, target, wall]);

    let points = routing::route(&grid, &source, &target, &RouteOptions::default()).unwrap();
    assert!(points.len() >= 2);
    assert!(routing::is_axis_aligned(&points));
    for w in points.windows(2) {
        for r in [&source, &target, &wall] {
            assert!(!crosses(w[0], w[1], r), "segment {w:?} crosses {r:?}");
        }
    }
    let first = points[0];
    let last = points[points.len() - 1];
    assert!(source.contains(first) && !source.contains_strictly(first));
    assert!(target.contains(last) && !target.contains_strictly(last));
}

#[test]
fn straight_route_when_nothing_is_in_the_way() {
    let source = Rect::new(10.0, 10.0, 20.0, 20.0);
    let target = Rect::new(10.0, 70.0, 20.0, 20.0);
    let grid = Grid::build(Rect::new(0.0, 0.0, 40.0, 100.0), &[source, target]);
    let points = routing::route(&grid, &source, &target, &RouteOptions::default()).unwrap();
    assert_eq!(points, vec![Point::new(20.0, 30.0), Point::new(20.0, 70.0)]);
}

#[test]
fn no_route_through_a_full_wall() {
    let source = Rect::new(10.0, 40.0, 20.0, 20.0);
    let target = Rect::new(70.0, 40.0, 20.0, 20.0);
    let wall = Rect::new(40.0, 0.0, 20.0, 100.0);
    let grid = Grid::build(Rect::new(0.0, 0.0, 100.0, 100.0), &[source, target, wall]);
    assert!(routing::route(&grid, &source, &target, &RouteOptions::default()).is_none());
}

#[test]
fn simplify_drops_collinear_points() {
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 5.0),
        Point::new(0.0, 10.0),
        Point::new(0.0, 10.0),
        Point::new(5.0, 10.0),
    ];
    assert_eq!(
        routing::simplify(points),
        vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(5.0, 10.0)]
    );
}
