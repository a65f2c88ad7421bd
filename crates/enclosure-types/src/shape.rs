use serde::{Deserialize, Serialize};

/// A 2D sketch primitive, centred on its placement point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape2D {
    /// Axis-aligned rectangle in sketch-plane coordinates.
    Rectangle { width: f64, height: f64 },
    /// Circle of the given radius.
    Circle { radius: f64 },
}

impl Shape2D {
    pub fn rectangle(width: f64, height: f64) -> Self {
        Shape2D::Rectangle { width, height }
    }

    pub fn circle(radius: f64) -> Self {
        Shape2D::Circle { radius }
    }

    /// Width and height of the shape's bounding box.
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            Shape2D::Rectangle { width, height } => (width, height),
            Shape2D::Circle { radius } => (2.0 * radius, 2.0 * radius),
        }
    }

    pub fn area(&self) -> f64 {
        match *self {
            Shape2D::Rectangle { width, height } => width * height,
            Shape2D::Circle { radius } => std::f64::consts::PI * radius * radius,
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Shape2D::Circle { .. })
    }
}

/// A shape positioned in sketch-plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedShape {
    pub shape: Shape2D,
    /// Centre in sketch-plane (u, v) coordinates.
    pub center: [f64; 2],
}

impl PlacedShape {
    pub fn new(shape: Shape2D, center: [f64; 2]) -> Self {
        Self { shape, center }
    }

    /// Bounding box as `[min_u, min_v, max_u, max_v]`.
    pub fn bounds(&self) -> [f64; 4] {
        let (w, h) = self.shape.extent();
        [
            self.center[0] - w / 2.0,
            self.center[1] - h / 2.0,
            self.center[0] + w / 2.0,
            self.center[1] + h / 2.0,
        ]
    }
}

/// A closed sketch region: one outer boundary with optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchProfile {
    pub outer: PlacedShape,
    #[serde(default)]
    pub holes: Vec<PlacedShape>,
}

impl SketchProfile {
    pub fn solid(outer: PlacedShape) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: PlacedShape, holes: Vec<PlacedShape>) -> Self {
        Self { outer, holes }
    }

    /// Net area of the region (outer minus holes).
    pub fn area(&self) -> f64 {
        self.outer.shape.area() - self.holes.iter().map(|h| h.shape.area()).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_area_subtracts_holes() {
        let ring = SketchProfile::with_holes(
            PlacedShape::new(Shape2D::rectangle(10.0, 10.0), [0.0, 0.0]),
            vec![PlacedShape::new(Shape2D::rectangle(6.0, 6.0), [0.0, 0.0])],
        );
        assert!((ring.area() - 64.0).abs() < 1e-12);
    }

    #[test]
    fn circle_bounds_are_square() {
        let hole = PlacedShape::new(Shape2D::circle(1.5), [2.0, -1.0]);
        assert_eq!(hole.bounds(), [0.5, -2.5, 3.5, 0.5]);
    }
}
