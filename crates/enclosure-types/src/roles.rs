use serde::{Deserialize, Serialize};

/// Direction a side face points in, expressed in the sketch plane's local axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    PosU,
    NegU,
    PosV,
    NegV,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::PosU, Facing::NegU, Facing::PosV, Facing::NegV];

    /// Unit direction in sketch-plane (u, v) coordinates.
    pub fn local_direction(self) -> [f64; 2] {
        match self {
            Facing::PosU => [1.0, 0.0],
            Facing::NegU => [-1.0, 0.0],
            Facing::PosV => [0.0, 1.0],
            Facing::NegV => [0.0, -1.0],
        }
    }
}

/// Semantic role assigned to faces by the operation that created them.
/// Roles are how later steps find a face; nothing re-sorts faces by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Role {
    /// The face on the positive extrusion direction end.
    EndCapPositive,
    /// The face on the negative extrusion direction end (the sketch plane face).
    EndCapNegative,
    /// The outermost lateral face pointing along one sketch-plane axis.
    OuterWall { facing: Facing },
    /// Any other lateral face created by sweeping a profile edge.
    SideFace { index: usize },
    /// A face created by a fillet operation.
    FilletFace { index: usize },
    /// A face created by a chamfer operation.
    ChamferFace { index: usize },
}
