use std::collections::HashMap;

use enclosure_kernel::{KernelId, KernelSolidHandle, SketchPlane};
use enclosure_types::{Role, TopoKind, TopoSignature};

/// A planar face produced by a sketch, still remembering the plane it was
/// drawn on so an extrusion can name its side faces by sketch direction.
#[derive(Debug, Clone, Copy)]
pub struct SketchFace {
    pub id: KernelId,
    pub plane: SketchPlane,
}

/// Complete result of a modeling operation.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// Handle to the resulting solid. Runtime-only, not persisted.
    pub handle: KernelSolidHandle,
    /// What entities were created, deleted and carried over.
    pub provenance: Provenance,
    /// Non-fatal warnings.
    pub diagnostics: Diagnostics,
}

/// Provenance tracking: what happened to topology during an operation.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    /// Entities that exist in the result but not in the input.
    pub created: Vec<EntityRecord>,
    /// Entities that existed in the input but not in the result.
    pub deleted: Vec<EntityRecord>,
    /// Input entity -> result entity, for everything that carried over.
    pub survived: Vec<(KernelId, KernelId)>,
    /// Semantic role assignments for result faces.
    pub role_assignments: Vec<(KernelId, Role)>,
}

impl Provenance {
    /// Lookup table from input ids to the ids they became.
    pub fn successors(&self) -> HashMap<KernelId, KernelId> {
        self.survived.iter().copied().collect()
    }

    /// The result face holding `role`, if exactly one does.
    pub fn face_with_role(&self, role: &Role) -> Option<KernelId> {
        let mut matches = self
            .role_assignments
            .iter()
            .filter(|(_, r)| r == role)
            .map(|(id, _)| *id);
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }
}

/// Record of a topological entity with its kernel ID and signature.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    /// The kernel-internal ID. Runtime-only.
    pub kernel_id: KernelId,
    /// What kind of entity (Vertex, Edge, Face).
    pub kind: TopoKind,
    /// Geometric signature for fallback matching.
    pub signature: TopoSignature,
}

/// Non-fatal diagnostics from an operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] enclosure_kernel::KernelError),

    #[error("no profiles available for operation")]
    NoProfiles,

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}
