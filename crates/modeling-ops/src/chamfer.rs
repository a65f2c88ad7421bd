use enclosure_kernel::{KernelId, KernelSolidHandle};
use enclosure_types::Role;

use crate::diff;
use crate::fillet::{blend_result, check_blend_input};
use crate::kernel_ext::KernelBundle;
use crate::types::{OpError, OpResult};

/// Execute a chamfer operation on specified edges of a solid.
pub fn execute_chamfer(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    distance: f64,
) -> Result<OpResult, OpError> {
    check_blend_input("chamfer distance", distance, edges)?;

    let before = diff::snapshot(kb.as_introspect(), solid);
    let handle = kb.chamfer_edges(solid, edges, distance)?;
    let after = diff::snapshot(kb.as_introspect(), &handle);
    let diff_result = diff::diff(&before, &after);

    Ok(blend_result(handle, diff_result, edges.len(), |index| {
        Role::ChamferFace { index }
    }))
}
