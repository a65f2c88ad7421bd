use enclosure_kernel::KernelSolidHandle;
use enclosure_types::TopoKind;

use crate::diff;
use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, OpError, OpResult, Provenance};

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    Union,
    Subtract,
}

/// Execute a boolean operation between two solids.
///
/// No roles are assigned here: a face keeps whatever role it had, and
/// callers follow it through `provenance.survived`.
pub fn execute_boolean(
    kb: &mut dyn KernelBundle,
    body_a: &KernelSolidHandle,
    body_b: &KernelSolidHandle,
    kind: BooleanKind,
) -> Result<OpResult, OpError> {
    let before = diff::snapshot(kb.as_introspect(), body_a)
        .merged(diff::snapshot(kb.as_introspect(), body_b));

    let handle = match kind {
        BooleanKind::Union => kb.boolean_union(body_a, body_b)?,
        BooleanKind::Subtract => kb.boolean_subtract(body_a, body_b)?,
    };

    let after = diff::snapshot(kb.as_introspect(), &handle);
    let diff_result = diff::diff(&before, &after);

    let mut diagnostics = Diagnostics::default();
    if after.faces.is_empty() {
        diagnostics
            .warnings
            .push(format!("{kind:?} produced a solid without faces"));
    }
    let lost_faces = diff_result
        .deleted
        .iter()
        .filter(|e| e.kind == TopoKind::Face)
        .count();
    if kind == BooleanKind::Union && lost_faces > 0 {
        diagnostics
            .warnings
            .push(format!("union lost track of {lost_faces} input faces"));
    }

    Ok(OpResult {
        handle,
        provenance: Provenance {
            created: diff_result.created,
            deleted: diff_result.deleted,
            survived: diff_result.survived,
            role_assignments: Vec::new(),
        },
        diagnostics,
    })
}
