use enclosure_kernel::{KernelId, KernelSolidHandle, SketchPlane, TopoSignature};
use enclosure_types::{Facing, Role};

use crate::boolean::{execute_boolean, BooleanKind};
use crate::diff::{self, TopoSnapshot};
use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, OpError, OpResult, Provenance, SketchFace};

/// Execute an extrude operation, producing a new body.
///
/// The face is swept along its sketch plane normal; a negative `depth`
/// sweeps the other way. Every face of the result gets a role at creation
/// time (end caps, outer walls per sketch direction, other sides).
pub fn execute_extrude(
    kb: &mut dyn KernelBundle,
    face: &SketchFace,
    depth: f64,
) -> Result<OpResult, OpError> {
    if !depth.is_finite() || depth == 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("extrude depth must be finite and non-zero, got {depth}"),
        });
    }
    let n = face.plane.normal;
    let direction = if depth > 0.0 { n } else { [-n[0], -n[1], -n[2]] };

    let handle = kb.extrude_face(face.id, direction, depth.abs())?;

    let after = diff::snapshot(kb.as_introspect(), &handle);
    let diff_result = diff::diff(&TopoSnapshot::default(), &after);
    let role_assignments = assign_extrude_roles(&after.faces, &face.plane, direction);

    let mut diagnostics = Diagnostics::default();
    if !role_assignments
        .iter()
        .any(|(_, r)| *r == Role::EndCapPositive)
    {
        diagnostics
            .warnings
            .push("extrusion has no face facing the sweep direction".to_string());
    }

    Ok(OpResult {
        handle,
        provenance: Provenance {
            created: diff_result.created,
            deleted: diff_result.deleted,
            survived: diff_result.survived,
            role_assignments,
        },
        diagnostics,
    })
}

/// Extrude a face and immediately combine it with `target`: `Union` adds
/// material, `Subtract` cuts it away. Roles of the extruded tool body that
/// survive the boolean are carried onto the result.
pub fn execute_extrude_into(
    kb: &mut dyn KernelBundle,
    target: &KernelSolidHandle,
    face: &SketchFace,
    depth: f64,
    kind: BooleanKind,
) -> Result<OpResult, OpError> {
    let tool = execute_extrude(kb, face, depth)?;
    let mut combined = execute_boolean(kb, target, &tool.handle, kind)?;

    let successors = combined.provenance.successors();
    let carried: Vec<(KernelId, Role)> = tool
        .provenance
        .role_assignments
        .into_iter()
        .filter_map(|(id, role)| successors.get(&id).map(|new_id| (*new_id, role)))
        .collect();
    combined.provenance.role_assignments.extend(carried);
    combined.diagnostics.warnings.extend(tool.diagnostics.warnings);
    Ok(combined)
}

/// Where a face of an extruded prism points.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Forward,
    Backward,
    Side(Facing),
    Unknown,
}

/// Assign semantic roles to faces of an extruded solid.
///
/// Faces are classified by their normal against the sweep axis and the
/// sketch axes. Within each class only the face farthest out along the
/// class direction gets the distinguished role (end cap or outer wall);
/// the rest are numbered side faces. Inner walls of a ring profile therefore
/// never take the outer wall role.
fn assign_extrude_roles(
    faces: &[(KernelId, TopoSignature)],
    plane: &SketchPlane,
    axis: [f64; 3],
) -> Vec<(KernelId, Role)> {
    let y_axis = plane.y_axis();
    let classes: Vec<Orientation> = faces
        .iter()
        .map(|(_, sig)| classify(sig, axis, plane.x_axis, y_axis))
        .collect();

    let outermost = |class: Orientation, dir: [f64; 3]| -> Option<usize> {
        faces
            .iter()
            .enumerate()
            .filter(|(i, _)| classes[*i] == class)
            .filter_map(|(i, (_, sig))| sig.centroid.map(|c| (i, dot(c, dir))))
            .fold(None::<(usize, f64)>, |best, (i, reach)| match best {
                Some((_, r)) if r >= reach => best,
                _ => Some((i, reach)),
            })
            .map(|(i, _)| i)
    };

    let mut winners: Vec<(usize, Role)> = Vec::new();
    if let Some(i) = outermost(Orientation::Forward, axis) {
        winners.push((i, Role::EndCapPositive));
    }
    if let Some(i) = outermost(Orientation::Backward, scale(axis, -1.0)) {
        winners.push((i, Role::EndCapNegative));
    }
    for facing in Facing::ALL {
        let dir = facing_direction(plane.x_axis, y_axis, facing);
        if let Some(i) = outermost(Orientation::Side(facing), dir) {
            winners.push((i, Role::OuterWall { facing }));
        }
    }

    let mut side_index = 0;
    faces
        .iter()
        .enumerate()
        .map(|(i, (face_id, _))| {
            let role = match winners.iter().find(|(w, _)| *w == i) {
                Some((_, role)) => role.clone(),
                None => {
                    side_index += 1;
                    Role::SideFace {
                        index: side_index - 1,
                    }
                }
            };
            (*face_id, role)
        })
        .collect()
}

fn classify(sig: &TopoSignature, axis: [f64; 3], x: [f64; 3], y: [f64; 3]) -> Orientation {
    let Some(n) = sig.normal else {
        return Orientation::Unknown;
    };
    let along = dot(n, axis);
    if along > 0.5 {
        return Orientation::Forward;
    }
    if along < -0.5 {
        return Orientation::Backward;
    }
    let (nu, nv) = (dot(n, x), dot(n, y));
    if nu.abs().max(nv.abs()) <= 0.5 {
        return Orientation::Unknown;
    }
    let facing = if nu.abs() >= nv.abs() {
        if nu > 0.0 {
            Facing::PosU
        } else {
            Facing::NegU
        }
    } else if nv > 0.0 {
        Facing::PosV
    } else {
        Facing::NegV
    };
    Orientation::Side(facing)
}

/// World direction of a sketch-plane facing.
pub(crate) fn facing_direction(x: [f64; 3], y: [f64; 3], facing: Facing) -> [f64; 3] {
    let [lu, lv] = facing.local_direction();
    [
        lu * x[0] + lv * y[0],
        lu * x[1] + lv * y[1],
        lu * x[2] + lv * y[2],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}
