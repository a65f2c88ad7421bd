//! The reference frames every feature of the enclosure is laid out in.
//!
//! Frames are derived once per build from the configuration. Sketch planes
//! follow the frame axes: local x/y span the sketch, local z is the direction
//! a positive extrusion grows in. Wall frames look outwards with their local
//! y pointing up, so cutout heights read as heights.

use std::collections::BTreeMap;

use enclosure_kernel::SketchPlane;
use nalgebra::{Rotation3, UnitQuaternion, Vector3};
use placement::{FrameTree, PlacementError, ReferenceFrame};
use tracing::{debug, instrument};

use crate::config::EnclosureConfig;

pub const WORLD: &str = "world";
/// Centre of the board's bottom face.
pub const BOARD: &str = "board";
pub const BOARD_TOP: &str = "board.top";
/// Centre of the board's front edge, looking out of the front.
pub const BOARD_FRONT: &str = "board.front";
/// Centre of the board's left edge, looking out of the left side.
pub const BOARD_LEFT: &str = "board.left";
pub const FLOOR_BOTTOM: &str = "case.floor_bottom";
pub const FLOOR_TOP: &str = "case.floor_top";
/// Top of the case walls; the lid's bottom face.
pub const RIM: &str = "case.rim";
pub const LID_TOP: &str = "lid.top";
pub const FRONT_OUTER: &str = "case.front_outer";
pub const FRONT_INNER: &str = "case.front_inner";
pub const BACK_OUTER: &str = "case.back_outer";
pub const LEFT_OUTER: &str = "case.left_outer";
pub const LEFT_INNER: &str = "case.left_inner";
pub const RIGHT_OUTER: &str = "case.right_outer";
pub const HOLDER: &str = "hdmi_holder";
pub const HOLDER_TOP: &str = "hdmi_holder.top";
pub const PLANK: &str = "plank";

/// Every frame of one build, resolved.
#[derive(Debug, Clone)]
pub struct EnclosureFrames {
    tree: FrameTree,
    resolved: BTreeMap<String, ReferenceFrame>,
}

impl EnclosureFrames {
    /// Derive and resolve the frame tree for `config`.
    #[instrument(skip(config))]
    pub fn derive(config: &EnclosureConfig) -> Result<Self, PlacementError> {
        let tree = frame_tree(config)?;
        let resolved = tree.resolve_all()?;
        debug!(frames = resolved.len(), "derived enclosure frames");
        Ok(Self { tree, resolved })
    }

    pub fn get(&self, name: &str) -> Result<&ReferenceFrame, PlacementError> {
        self.resolved
            .get(name)
            .ok_or_else(|| PlacementError::UnknownFrame {
                name: name.to_string(),
            })
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceFrame)> {
        self.resolved.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// How far `to`'s plane lies in front of `from`, along `from`'s normal.
    /// This is the depth of an extrusion from `from` up to the face at `to`.
    pub fn depth_between(&self, from: &str, to: &str) -> Result<f64, PlacementError> {
        let start = self.get(from)?;
        let end = self.get(to)?;
        Ok(start.distance_along_normal(&end.origin()))
    }
}

/// Sketch plane coinciding with `frame`.
pub fn sketch_plane(frame: &ReferenceFrame) -> SketchPlane {
    let o = frame.origin();
    let n = frame.normal();
    let x = frame.x_axis();
    SketchPlane {
        origin: [o.x, o.y, o.z],
        normal: [n.x, n.y, n.z],
        x_axis: [x.x, x.y, x.z],
    }
}

/// Orientation whose local z is `normal` and local x is `x_axis`.
/// Both must be unit length and perpendicular.
fn looking(normal: Vector3<f64>, x_axis: Vector3<f64>) -> UnitQuaternion<f64> {
    let basis = Rotation3::from_basis_unchecked(&[x_axis, normal.cross(&x_axis), normal]);
    UnitQuaternion::from_rotation_matrix(&basis)
}

fn frame_tree(config: &EnclosureConfig) -> Result<FrameTree, PlacementError> {
    let board = &config.board;
    let case = &config.case;
    let holder = &config.hdmi_holder;

    let front = looking(-Vector3::y(), Vector3::x());
    let back = looking(Vector3::y(), -Vector3::x());
    let left = looking(-Vector3::x(), -Vector3::y());
    let right = looking(Vector3::x(), Vector3::y());

    let half_out_w = config.case_outer_width() / 2.0;
    let half_out_l = config.case_outer_length() / 2.0;
    // Walls are centred halfway between floor bottom and rim.
    let wall_mid = case.height / 2.0 - case.bottom_gap - case.shell_thickness;

    let mut tree = FrameTree::new(WORLD);
    tree.define_offset(BOARD, WORLD, Vector3::zeros())?;
    tree.define_offset(BOARD_TOP, BOARD, Vector3::new(0.0, 0.0, board.thickness))?;
    tree.define(
        BOARD_FRONT,
        BOARD,
        Vector3::new(0.0, -board.length / 2.0, board.thickness / 2.0),
        front,
    )?;
    tree.define(
        BOARD_LEFT,
        BOARD,
        Vector3::new(-board.width / 2.0, 0.0, board.thickness / 2.0),
        left,
    )?;

    tree.define_offset(
        FLOOR_BOTTOM,
        BOARD,
        Vector3::new(0.0, 0.0, -case.bottom_gap - case.shell_thickness),
    )?;
    tree.define_offset(FLOOR_TOP, BOARD, Vector3::new(0.0, 0.0, -case.bottom_gap))?;
    tree.define_offset(RIM, FLOOR_BOTTOM, Vector3::new(0.0, 0.0, case.height))?;
    tree.define_offset(LID_TOP, RIM, Vector3::new(0.0, 0.0, config.lid_thickness()))?;

    tree.define(FRONT_OUTER, BOARD, Vector3::new(0.0, -half_out_l, wall_mid), front)?;
    tree.define(BACK_OUTER, BOARD, Vector3::new(0.0, half_out_l, wall_mid), back)?;
    tree.define(LEFT_OUTER, BOARD, Vector3::new(-half_out_w, 0.0, wall_mid), left)?;
    tree.define(RIGHT_OUTER, BOARD, Vector3::new(half_out_w, 0.0, wall_mid), right)?;
    // Inner faces are the outer ones moved back through the shell.
    let inwards = Vector3::new(0.0, 0.0, -case.shell_thickness);
    tree.define_offset(FRONT_INNER, FRONT_OUTER, inwards)?;
    tree.define_offset(LEFT_INNER, LEFT_OUTER, inwards)?;

    tree.define_offset(HOLDER, WORLD, Vector3::zeros())?;
    tree.define_offset(HOLDER_TOP, HOLDER, Vector3::new(0.0, 0.0, holder.thickness))?;
    tree.define_offset(PLANK, WORLD, Vector3::zeros())?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn frames() -> EnclosureFrames {
        EnclosureFrames::derive(&EnclosureConfig::default()).unwrap()
    }

    #[test]
    fn board_front_looks_out_of_the_front_with_y_up() {
        let f = frames();
        let front = f.get(BOARD_FRONT).unwrap();
        assert_relative_eq!(front.origin(), Point3::new(0.0, -50.5, 0.84), epsilon = 1e-12);
        assert_relative_eq!(front.normal(), -Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(front.x_axis(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(front.y_axis(), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn every_wall_frame_has_y_up() {
        let f = frames();
        for name in [FRONT_OUTER, BACK_OUTER, LEFT_OUTER, RIGHT_OUTER, BOARD_LEFT] {
            assert_relative_eq!(f.get(name).unwrap().y_axis(), Vector3::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn case_heights() {
        let f = frames();
        assert_relative_eq!(f.get(FLOOR_BOTTOM).unwrap().origin().z, -10.0, epsilon = 1e-12);
        assert_relative_eq!(f.get(FLOOR_TOP).unwrap().origin().z, -5.0, epsilon = 1e-12);
        assert_relative_eq!(f.get(RIM).unwrap().origin().z, 40.0, epsilon = 1e-12);
        assert_relative_eq!(f.get(LID_TOP).unwrap().origin().z, 45.0, epsilon = 1e-12);
    }

    #[test]
    fn inner_wall_sits_one_shell_inside_outer() {
        let f = frames();
        assert_relative_eq!(f.get(FRONT_OUTER).unwrap().origin().y, -58.0, epsilon = 1e-12);
        assert_relative_eq!(f.get(FRONT_INNER).unwrap().origin().y, -53.0, epsilon = 1e-12);
        assert_relative_eq!(f.get(LEFT_INNER).unwrap().origin().x, -61.0, epsilon = 1e-12);
    }

    #[test]
    fn cutout_depths_reach_the_outer_walls() {
        let f = frames();
        assert_relative_eq!(f.depth_between(BOARD_FRONT, FRONT_OUTER).unwrap(), 7.5, epsilon = 1e-12);
        assert_relative_eq!(f.depth_between(BOARD_LEFT, LEFT_OUTER).unwrap(), 7.5, epsilon = 1e-12);
    }

    #[test]
    fn sketch_plane_matches_frame() {
        let f = frames();
        let plane = sketch_plane(f.get(BOARD_FRONT).unwrap());
        plane.validate().unwrap();
        let p = plane.point(2.0, 3.0);
        assert_relative_eq!(p[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], -50.5, epsilon = 1e-12);
        assert_relative_eq!(p[2], 3.84, epsilon = 1e-12);
    }

    #[test]
    fn unknown_frame_is_named() {
        assert_eq!(
            frames().get("case.ceiling").unwrap_err(),
            PlacementError::UnknownFrame {
                name: "case.ceiling".to_string()
            }
        );
    }
}
