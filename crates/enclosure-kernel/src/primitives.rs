//! Wire builders on top of truck's sweep API.
//!
//! truck has no built-in rectangle/circle: outlines are lines between shared
//! vertices, circles are a vertex swept once around the plane normal.

use std::f64::consts::PI;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Wire};
use truck_modeling::{Point3, Rad, Vector3};

use crate::types::{PlacedShape, Shape2D, SketchPlane};

fn point(plane: &SketchPlane, u: f64, v: f64) -> Point3 {
    let p = plane.point(u, v);
    Point3::new(p[0], p[1], p[2])
}

/// Closed rectangle, counter-clockwise about the plane normal.
pub fn rectangle_wire(plane: &SketchPlane, placed: &PlacedShape) -> Wire {
    let [u0, v0, u1, v1] = placed.bounds();
    let corners = [(u0, v0), (u1, v0), (u1, v1), (u0, v1)];
    let vertices: Vec<_> = corners
        .iter()
        .map(|&(u, v)| builder::vertex(point(plane, u, v)))
        .collect();
    let edges: Vec<Edge> = (0..vertices.len())
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % vertices.len()]))
        .collect();
    Wire::from_iter(edges)
}

/// Closed circle, counter-clockwise about the plane normal.
pub fn circle_wire(plane: &SketchPlane, placed: &PlacedShape, radius: f64) -> Wire {
    let [cu, cv] = placed.center;
    let start = builder::vertex(point(plane, cu + radius, cv));
    let n = plane.normal;
    builder::rsweep(
        &start,
        point(plane, cu, cv),
        Vector3::new(n[0], n[1], n[2]),
        Rad(2.0 * PI),
    )
}

/// Outline of any placed shape.
pub fn shape_wire(plane: &SketchPlane, placed: &PlacedShape) -> Wire {
    match placed.shape {
        Shape2D::Rectangle { .. } => rectangle_wire(plane, placed),
        Shape2D::Circle { radius } => circle_wire(plane, placed, radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_wire_is_closed_with_four_edges() {
        let placed = PlacedShape::new(Shape2D::rectangle(2.0, 1.0), [0.0, 0.0]);
        let wire = rectangle_wire(&SketchPlane::xy(), &placed);
        assert_eq!(wire.len(), 4);
        assert!(wire.is_closed());
    }

    #[test]
    fn rectangle_wire_spans_bounds() {
        let placed = PlacedShape::new(Shape2D::rectangle(2.0, 3.0), [1.0, -1.0]);
        let wire = rectangle_wire(&SketchPlane::xy(), &placed);
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for v in wire.vertex_iter() {
            let p = v.point();
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        let eps = 1e-10;
        assert!((min[0] - 0.0).abs() < eps && (max[0] - 2.0).abs() < eps);
        assert!((min[1] + 2.5).abs() < eps && (max[1] - 0.5).abs() < eps);
    }

    #[test]
    fn circle_wire_is_closed() {
        let placed = PlacedShape::new(Shape2D::circle(1.5), [0.0, 0.0]);
        let wire = shape_wire(&SketchPlane::xy(), &placed);
        assert!(wire.is_closed());
        for v in wire.vertex_iter() {
            let p = v.point();
            assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 1.5).abs() < 1e-9);
        }
    }
}
