use enclosure_kernel::{SketchPlane, SketchProfile};

use crate::kernel_ext::KernelBundle;
use crate::types::{OpError, SketchFace};

/// Turn closed profiles drawn on `plane` into standalone planar faces, one
/// per profile, ready to be extruded.
pub fn execute_sketch(
    kb: &mut dyn KernelBundle,
    plane: &SketchPlane,
    profiles: &[SketchProfile],
) -> Result<Vec<SketchFace>, OpError> {
    if profiles.is_empty() {
        return Err(OpError::NoProfiles);
    }
    let ids = kb.make_faces_from_profiles(plane, profiles)?;
    Ok(ids
        .into_iter()
        .map(|id| SketchFace { id, plane: *plane })
        .collect())
}
