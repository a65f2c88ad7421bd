use enclosure_kernel::{KernelId, KernelSolidHandle};
use enclosure_types::{Role, TopoKind};

use crate::diff::{self, DiffResult};
use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, OpError, OpResult, Provenance};

/// Execute a fillet operation on specified edges of a solid.
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    radius: f64,
) -> Result<OpResult, OpError> {
    check_blend_input("fillet radius", radius, edges)?;

    let before = diff::snapshot(kb.as_introspect(), solid);
    let handle = kb.fillet_edges(solid, edges, radius)?;
    let after = diff::snapshot(kb.as_introspect(), &handle);
    let diff_result = diff::diff(&before, &after);

    Ok(blend_result(handle, diff_result, edges.len(), |index| {
        Role::FilletFace { index }
    }))
}

pub(crate) fn check_blend_input(what: &str, size: f64, edges: &[KernelId]) -> Result<(), OpError> {
    if !size.is_finite() || size <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("{what} must be positive, got {size}"),
        });
    }
    if edges.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: "no edges selected".to_string(),
        });
    }
    Ok(())
}

/// Package a fillet/chamfer result. Faces the diff reports as created are
/// the blend faces and are numbered in creation order; faces that survived
/// keep their identity through `survived`.
pub(crate) fn blend_result(
    handle: KernelSolidHandle,
    diff_result: DiffResult,
    edge_count: usize,
    role: impl Fn(usize) -> Role,
) -> OpResult {
    let role_assignments: Vec<(KernelId, Role)> = diff_result
        .created
        .iter()
        .filter(|e| e.kind == TopoKind::Face)
        .enumerate()
        .map(|(index, e)| (e.kernel_id, role(index)))
        .collect();

    let mut diagnostics = Diagnostics::default();
    if role_assignments.len() != edge_count {
        diagnostics.warnings.push(format!(
            "{} blend faces created for {edge_count} edges",
            role_assignments.len()
        ));
    }

    OpResult {
        handle,
        provenance: Provenance {
            created: diff_result.created,
            deleted: diff_result.deleted,
            survived: diff_result.survived,
            role_assignments,
        },
        diagnostics,
    }
}
