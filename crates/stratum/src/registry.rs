//! Named measurement and shape backends.
//!
//! A [`Registry`] maps capability names to implementations. [`Registry::with_defaults`] fills it
//! from the fixed built-in tables below; callers may register extra entries or replace built-ins.

use crate::shape::{
    BoxShape, CircleShape, DiamondShape, EllipseShape, FixedWidthMeasurer, PlaintextShape,
    PolygonShape, Shape, ShapeStrategy, TextMeasurer,
};
use indexmap::IndexMap;
use std::sync::Arc;

pub const DEFAULT_MEASURER: &str = "fixed";

type ShapeFactory = fn() -> Arc<dyn ShapeStrategy>;
type MeasurerFactory = fn() -> Arc<dyn TextMeasurer>;

const BUILTIN_SHAPES: &[(&str, ShapeFactory)] = &[
    ("box", box_shape),
    ("rect", box_shape),
    ("record", box_shape),
    ("plaintext", plaintext_shape),
    ("ellipse", ellipse_shape),
    ("circle", circle_shape),
    ("diamond", diamond_shape),
    ("triangle", triangle_shape),
    ("hexagon", hexagon_shape),
    ("octagon", octagon_shape),
];

const BUILTIN_MEASURERS: &[(&str, MeasurerFactory)] = &[
    (DEFAULT_MEASURER, fixed_measurer),
    ("monospace-small", small_measurer),
];

fn box_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(BoxShape)
}

fn plaintext_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(PlaintextShape)
}

fn ellipse_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(EllipseShape)
}

fn circle_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(CircleShape)
}

fn diamond_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(DiamondShape)
}

fn triangle_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(PolygonShape { sides: 3 })
}

fn hexagon_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(PolygonShape { sides: 6 })
}

fn octagon_shape() -> Arc<dyn ShapeStrategy> {
    Arc::new(PolygonShape { sides: 8 })
}

fn fixed_measurer() -> Arc<dyn TextMeasurer> {
    Arc::new(FixedWidthMeasurer::default())
}

fn small_measurer() -> Arc<dyn TextMeasurer> {
    Arc::new(FixedWidthMeasurer {
        char_width: 6.0,
        line_height: 12.0,
    })
}

#[derive(Clone, Default)]
pub struct Registry {
    measurers: IndexMap<String, Arc<dyn TextMeasurer>>,
    shapes: IndexMap<String, Arc<dyn ShapeStrategy>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("measurers", &self.measurers.keys().collect::<Vec<_>>())
            .field("shapes", &self.shapes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// An empty registry. Lookups fall back to the box shape and the fixed-width measurer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, make) in BUILTIN_SHAPES {
            registry.shapes.insert((*name).to_string(), make());
        }
        for (name, make) in BUILTIN_MEASURERS {
            registry.measurers.insert((*name).to_string(), make());
        }
        registry
    }

    pub fn register_shape(
        &mut self,
        name: impl Into<String>,
        strategy: Arc<dyn ShapeStrategy>,
    ) -> &mut Self {
        self.shapes.insert(name.into(), strategy);
        self
    }

    pub fn register_measurer(
        &mut self,
        name: impl Into<String>,
        measurer: Arc<dyn TextMeasurer>,
    ) -> &mut Self {
        self.measurers.insert(name.into(), measurer);
        self
    }

    pub fn shape(&self, name: &str) -> Option<Arc<dyn ShapeStrategy>> {
        self.shapes.get(name).cloned()
    }

    pub fn measurer(&self, name: &str) -> Option<Arc<dyn TextMeasurer>> {
        self.measurers.get(name).cloned()
    }

    pub fn shape_names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Strategy for `shape`; unknown names degrade to a box.
    pub fn strategy_for(&self, shape: &Shape) -> Arc<dyn ShapeStrategy> {
        match self.shape(shape.strategy_name()) {
            Some(s) => s,
            None => {
                tracing::warn!(shape = shape.strategy_name(), "unknown shape, drawing a box");
                Arc::new(BoxShape)
            }
        }
    }

    /// Measurer registered as `name`; unknown names degrade to the fixed-width measurer.
    pub fn measurer_or_default(&self, name: &str) -> Arc<dyn TextMeasurer> {
        match self.measurer(name) {
            Some(m) => m,
            None => {
                tracing::warn!(measurer = name, "unknown text measurer, using fixed width");
                Arc::new(FixedWidthMeasurer::default())
            }
        }
    }
}
