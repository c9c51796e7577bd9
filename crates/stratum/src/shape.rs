//! Node shapes, shape strategies and text measurement.
//!
//! Built-in shapes are a closed enum. Anything else is `Shape::Custom(name)` and resolves through
//! the [`Registry`](crate::registry::Registry) to a [`ShapeStrategy`] trait object.

use crate::model::{Point, Rect, Size};
use crate::util;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    #[default]
    Box,
    Ellipse,
    Circle,
    Diamond,
    Plaintext,
    /// Label is a record description compiled into a cell tree.
    Record,
    Custom(String),
}

impl Shape {
    /// Registry key of the strategy drawing this shape.
    pub fn strategy_name(&self) -> &str {
        match self {
            Shape::Box => "box",
            Shape::Ellipse => "ellipse",
            Shape::Circle => "circle",
            Shape::Diamond => "diamond",
            Shape::Plaintext => "plaintext",
            Shape::Record => "record",
            Shape::Custom(name) => name.as_str(),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record)
    }
}

/// Measures label text. Implementations must be cheap to call repeatedly.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str) -> Size;
}

/// Every character has the same advance; lines split on `\n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMeasurer {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for FixedWidthMeasurer {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        Size::new(
            widest as f64 * self.char_width,
            lines as f64 * self.line_height,
        )
    }
}

/// Geometry of one node shape.
pub trait ShapeStrategy: Send + Sync {
    /// Outer size needed to hold a label of `label` size with `padding` on every side.
    fn size_for_label(&self, label: Size, padding: f64) -> Size;

    /// Point where the segment from the center of `bounds` toward `toward` leaves the outline.
    fn intersect(&self, bounds: &Rect, toward: Point) -> Point;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoxShape;

impl ShapeStrategy for BoxShape {
    fn size_for_label(&self, label: Size, padding: f64) -> Size {
        Size::new(label.width + 2.0 * padding, label.height + 2.0 * padding)
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        util::intersect_rect(bounds, toward)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextShape;

impl ShapeStrategy for PlaintextShape {
    fn size_for_label(&self, label: Size, _padding: f64) -> Size {
        label
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        util::intersect_rect(bounds, toward)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EllipseShape;

impl ShapeStrategy for EllipseShape {
    fn size_for_label(&self, label: Size, padding: f64) -> Size {
        let inner = BoxShape.size_for_label(label, padding);
        Size::new(
            inner.width * std::f64::consts::SQRT_2,
            inner.height * std::f64::consts::SQRT_2,
        )
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        util::intersect_ellipse(bounds, toward)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CircleShape;

impl ShapeStrategy for CircleShape {
    fn size_for_label(&self, label: Size, padding: f64) -> Size {
        let inner = BoxShape.size_for_label(label, padding);
        let d = inner.width.hypot(inner.height);
        Size::new(d, d)
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        util::intersect_ellipse(bounds, toward)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiamondShape;

impl ShapeStrategy for DiamondShape {
    fn size_for_label(&self, label: Size, padding: f64) -> Size {
        let inner = BoxShape.size_for_label(label, padding);
        Size::new(inner.width * 2.0, inner.height * 2.0)
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        let c = bounds.center();
        let (hw, hh) = (bounds.width / 2.0, bounds.height / 2.0);
        let vertices = [
            Point::new(c.x, c.y - hh),
            Point::new(c.x + hw, c.y),
            Point::new(c.x, c.y + hh),
            Point::new(c.x - hw, c.y),
        ];
        util::intersect_polygon(bounds, &vertices, toward)
    }
}

/// Regular-ish polygon with `sides` corners inscribed in the node box.
#[derive(Debug, Clone, Copy)]
pub struct PolygonShape {
    pub sides: usize,
}

impl PolygonShape {
    fn vertices(&self, bounds: &Rect) -> Vec<Point> {
        let c = bounds.center();
        let n = self.sides.max(3);
        let step = std::f64::consts::TAU / n as f64;
        // Flat top and bottom for even side counts.
        let start = if n % 2 == 0 { step / 2.0 } else { -std::f64::consts::FRAC_PI_2 };
        (0..n)
            .map(|i| {
                let a = start + step * i as f64;
                Point::new(
                    c.x + a.cos() * bounds.width / 2.0,
                    c.y + a.sin() * bounds.height / 2.0,
                )
            })
            .collect()
    }
}

impl ShapeStrategy for PolygonShape {
    fn size_for_label(&self, label: Size, padding: f64) -> Size {
        let inner = BoxShape.size_for_label(label, padding);
        let n = self.sides.max(3) as f64;
        // The inscribed box of a regular polygon shrinks by cos(pi / n).
        let k = 1.0 / (std::f64::consts::PI / n).cos();
        Size::new(inner.width * k * 1.2, inner.height * k)
    }

    fn intersect(&self, bounds: &Rect, toward: Point) -> Point {
        util::intersect_polygon(bounds, &self.vertices(bounds), toward)
    }
}
