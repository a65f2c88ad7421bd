use nalgebra::{Isometry3, Point2, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;

/// Positional tolerance for frame comparisons, in millimetres.
/// Inputs are hand-measured to 0.1 mm, so anything below this is float noise.
pub const FRAME_TOLERANCE: f64 = 1e-9;

/// A named coordinate origin and orientation, expressed in the root system.
///
/// Local x and y span the frame's sketch plane; local z is the plane normal
/// (the direction a positive extrusion grows in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub name: String,
    iso: Isometry3<f64>,
}

impl ReferenceFrame {
    /// The root frame: identity placement.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iso: Isometry3::identity(),
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        origin: Point3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Result<Self, PlacementError> {
        let name = name.into();
        check_vector(&name, "origin", &origin.coords)?;
        check_rotation(&name, &rotation)?;
        Ok(Self {
            name,
            iso: Isometry3::from_parts(Translation3::from(origin.coords), rotation),
        })
    }

    /// Placement of the frame in root coordinates.
    pub fn iso(&self) -> &Isometry3<f64> {
        &self.iso
    }

    pub fn origin(&self) -> Point3<f64> {
        Point3::from(self.iso.translation.vector)
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    pub fn x_axis(&self) -> Vector3<f64> {
        self.iso.rotation * Vector3::x()
    }

    pub fn y_axis(&self) -> Vector3<f64> {
        self.iso.rotation * Vector3::y()
    }

    /// Plane normal (local z).
    pub fn normal(&self) -> Vector3<f64> {
        self.iso.rotation * Vector3::z()
    }

    pub fn to_world(&self, local: &Point3<f64>) -> Point3<f64> {
        self.iso * local
    }

    /// Map a point of the frame's sketch plane to root coordinates.
    pub fn to_world_2d(&self, local: &Point2<f64>) -> Point3<f64> {
        self.to_world(&Point3::new(local.x, local.y, 0.0))
    }

    pub fn to_local(&self, world: &Point3<f64>) -> Point3<f64> {
        self.iso.inverse_transform_point(world)
    }

    /// This frame's placement expressed in `other`'s coordinates.
    pub fn relative_to(&self, other: &ReferenceFrame) -> Isometry3<f64> {
        other.iso.inverse() * self.iso
    }

    /// A parallel frame moved `distance` along this frame's normal.
    pub fn offset_along_normal(
        &self,
        name: impl Into<String>,
        distance: f64,
    ) -> Result<ReferenceFrame, PlacementError> {
        frame_compose(
            self,
            name,
            Vector3::new(0.0, 0.0, distance),
            UnitQuaternion::identity(),
        )
    }

    /// Same origin and x axis, reversed normal.
    pub fn flipped(&self, name: impl Into<String>) -> ReferenceFrame {
        let half_turn = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
        ReferenceFrame {
            name: name.into(),
            iso: self.iso * Isometry3::from_parts(Translation3::identity(), half_turn),
        }
    }

    /// Signed distance of `point` from this frame's plane, along the normal.
    pub fn distance_along_normal(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin()).dot(&self.normal())
    }

    /// Same origin and orientation within `tolerance`.
    ///
    /// Orientation is compared on quaternion coordinates (q and -q are the
    /// same rotation); the angle form loses precision near zero.
    pub fn approx_eq(&self, other: &ReferenceFrame, tolerance: f64) -> bool {
        let a = self.rotation().into_inner().coords;
        let b = other.rotation().into_inner().coords;
        (self.origin() - other.origin()).norm() <= tolerance
            && ((a - b).norm() <= tolerance || (a + b).norm() <= tolerance)
    }
}

/// Build a child frame inside `parent`: rotate by `local_rotation`, then
/// translate by `local_offset` measured along the parent's axes.
///
/// Composition is associative: going A -> B -> C gives the same frame as the
/// direct A -> C offset, within [`FRAME_TOLERANCE`].
pub fn frame_compose(
    parent: &ReferenceFrame,
    name: impl Into<String>,
    local_offset: Vector3<f64>,
    local_rotation: UnitQuaternion<f64>,
) -> Result<ReferenceFrame, PlacementError> {
    let name = name.into();
    check_vector(&parent.name, "origin", &parent.iso.translation.vector)?;
    check_rotation(&parent.name, &parent.iso.rotation)?;
    check_vector(&name, "offset", &local_offset)?;
    check_rotation(&name, &local_rotation)?;
    let local = Isometry3::from_parts(Translation3::from(local_offset), local_rotation);
    Ok(ReferenceFrame {
        name,
        iso: parent.iso * local,
    })
}

fn check_vector(name: &str, what: &str, v: &Vector3<f64>) -> Result<(), PlacementError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(PlacementError::InvalidFrame {
            name: name.to_string(),
            reason: format!("{what} has non-finite components {v:?}"),
        })
    }
}

fn check_rotation(name: &str, q: &UnitQuaternion<f64>) -> Result<(), PlacementError> {
    if q.coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(PlacementError::InvalidFrame {
            name: name.to_string(),
            reason: "rotation has non-finite components".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn compose_rotates_then_translates_within_parent() {
        let root = ReferenceFrame::root("world");
        let turned = frame_compose(
            &root,
            "turned",
            Vector3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        )
        .unwrap();
        // Offset is measured along the parent's axes, rotation applies to children.
        let child = frame_compose(
            &turned,
            "child",
            Vector3::new(2.0, 0.0, 0.0),
            UnitQuaternion::identity(),
        )
        .unwrap();
        assert_relative_eq!(child.origin(), Point3::new(1.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn offset_along_normal_follows_orientation() {
        let front = frame_compose(
            &ReferenceFrame::root("world"),
            "front",
            Vector3::new(0.0, -10.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
        )
        .unwrap();
        assert_relative_eq!(front.normal(), Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        let outer = front.offset_along_normal("outer", 7.5).unwrap();
        assert_relative_eq!(outer.origin(), Point3::new(0.0, -17.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(front.distance_along_normal(&outer.origin()), 7.5, epsilon = 1e-12);
    }

    #[test]
    fn flipped_keeps_x_and_reverses_normal() {
        let base = ReferenceFrame::root("bottom");
        let up = base.flipped("bottom_flipped");
        assert_relative_eq!(up.x_axis(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(up.normal(), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn non_finite_offset_is_rejected_by_name() {
        let err = frame_compose(
            &ReferenceFrame::root("world"),
            "broken",
            Vector3::new(f64::NAN, 0.0, 0.0),
            UnitQuaternion::identity(),
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::InvalidFrame { ref name, .. } if name == "broken"));
    }

    #[test]
    fn non_finite_parent_is_rejected_by_name() {
        let parent = ReferenceFrame {
            name: "loaded".to_string(),
            iso: Isometry3::from_parts(
                Translation3::new(f64::INFINITY, 0.0, 0.0),
                UnitQuaternion::identity(),
            ),
        };
        let err = frame_compose(&parent, "child", Vector3::zeros(), UnitQuaternion::identity())
            .unwrap_err();
        assert!(matches!(err, PlacementError::InvalidFrame { ref name, .. } if name == "loaded"));
        assert!(parent.offset_along_normal("above", 1.0).is_err());
    }

    #[test]
    fn relative_to_recovers_placement_within_other_frame() {
        let a = ReferenceFrame::from_parts(
            "a",
            Point3::new(1.0, -4.0, 2.5),
            UnitQuaternion::from_euler_angles(0.4, 0.1, -0.7),
        )
        .unwrap();
        let b = frame_compose(
            &a,
            "b",
            Vector3::new(3.0, 0.5, -1.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
        )
        .unwrap();

        let b_in_a = b.relative_to(&a);
        assert_relative_eq!(
            b_in_a.translation.vector,
            Vector3::new(3.0, 0.5, -1.0),
            epsilon = FRAME_TOLERANCE
        );
        let rebuilt = ReferenceFrame::from_parts(
            "b_again",
            Point3::from((a.iso() * b_in_a).translation.vector),
            (a.iso() * b_in_a).rotation,
        )
        .unwrap();
        assert!(rebuilt.approx_eq(&b, FRAME_TOLERANCE));
        assert!(a.relative_to(&a).translation.vector.norm() <= FRAME_TOLERANCE);
    }

    #[test]
    fn to_local_inverts_to_world() {
        let frame = ReferenceFrame::from_parts(
            "f",
            Point3::new(3.0, -2.0, 5.0),
            UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1),
        )
        .unwrap();
        let p = Point3::new(0.5, 4.0, -1.0);
        assert_relative_eq!(frame.to_local(&frame.to_world(&p)), p, epsilon = 1e-12);
    }
}
