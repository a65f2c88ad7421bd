use serde::{Deserialize, Serialize};

// Re-export shared types from enclosure-types
pub use enclosure_types::{PlacedShape, Shape2D, SketchProfile, TopoKind, TopoSignature};

/// Opaque handle to a solid in the geometry kernel.
/// Valid only for the kernel session that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient kernel-internal entity identifier.
/// Stable within a single kernel session but NOT across rebuilds; faces are
/// found again through their roles, never through a stored id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelId(pub u64);

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid sketch profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("extrude failed: {reason}")]
    ExtrudeFailed { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("chamfer failed: {reason}")]
    ChamferFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
}

/// The plane a sketch is drawn on, in world coordinates.
///
/// Sketch coordinates (u, v) map to `origin + u * x_axis + v * y_axis()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    pub x_axis: [f64; 3],
}

impl SketchPlane {
    /// The world XY plane.
    pub fn xy() -> Self {
        Self {
            origin: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            x_axis: [1.0, 0.0, 0.0],
        }
    }

    /// normal x x_axis, completing a right-handed (u, v, n) basis.
    pub fn y_axis(&self) -> [f64; 3] {
        cross(self.normal, self.x_axis)
    }

    /// World position of sketch coordinates (u, v).
    pub fn point(&self, u: f64, v: f64) -> [f64; 3] {
        let y = self.y_axis();
        [
            self.origin[0] + u * self.x_axis[0] + v * y[0],
            self.origin[1] + u * self.x_axis[1] + v * y[1],
            self.origin[2] + u * self.x_axis[2] + v * y[2],
        ]
    }

    /// Reject degenerate planes before any geometry is built on them.
    pub fn validate(&self) -> Result<(), KernelError> {
        let finite = self
            .origin
            .iter()
            .chain(self.normal.iter())
            .chain(self.x_axis.iter())
            .all(|c| c.is_finite());
        let n = norm(self.normal);
        let x = norm(self.x_axis);
        if !finite || (n - 1.0).abs() > 1e-6 || (x - 1.0).abs() > 1e-6 {
            return Err(KernelError::InvalidProfile {
                reason: format!("sketch plane axes must be finite unit vectors: {self:?}"),
            });
        }
        if dot(self.normal, self.x_axis).abs() > 1e-6 {
            return Err(KernelError::InvalidProfile {
                reason: "sketch plane x axis is not perpendicular to its normal".to_string(),
            });
        }
        Ok(())
    }
}

/// Tessellated triangle mesh, the in-memory export of a solid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals [nx0, ny0, nz0, nx1, ny1, nz1, ...].
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
    /// Mapping from triangle ranges to logical faces.
    pub face_ranges: Vec<FaceRange>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Maps a contiguous range of triangles to a logical face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRange {
    /// The KernelId of the face this range belongs to.
    pub face_id: KernelId,
    /// Start index in the indices array (inclusive).
    pub start_index: u32,
    /// End index in the indices array (exclusive).
    pub end_index: u32,
}

// KernelId serializes as its bare number inside FaceRange.
impl Serialize for KernelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KernelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(KernelId)
    }
}

/// A profile both kernels accept: positive finite shapes, every hole strictly
/// inside the outer boundary's bounding box.
pub(crate) fn check_profile(profile: &SketchProfile) -> Result<(), KernelError> {
    for placed in std::iter::once(&profile.outer).chain(profile.holes.iter()) {
        let (w, h) = placed.shape.extent();
        let sane = [w, h].iter().all(|d| d.is_finite() && *d > 0.0)
            && placed.center.iter().all(|c| c.is_finite());
        if !sane {
            return Err(KernelError::InvalidProfile {
                reason: format!("degenerate shape {placed:?}"),
            });
        }
    }
    let [ou0, ov0, ou1, ov1] = profile.outer.bounds();
    for hole in &profile.holes {
        let [u0, v0, u1, v1] = hole.bounds();
        if u0 <= ou0 || v0 <= ov0 || u1 >= ou1 || v1 >= ov1 {
            return Err(KernelError::InvalidProfile {
                reason: format!("hole {hole:?} is not inside the outer boundary"),
            });
        }
    }
    Ok(())
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
