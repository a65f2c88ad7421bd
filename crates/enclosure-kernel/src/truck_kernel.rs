//! Real geometry kernel wrapping truck.

use crate::primitives;
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Face, Solid, Wire};
use truck_modeling::{InnerSpace, Vector3};

/// Tolerance handed to truck's boolean operations.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
    /// Standalone faces created by make_faces_from_profiles, awaiting extrude.
    standalone_faces: HashMap<u64, Face>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Option<&Solid> {
        self.solids.get(&handle.id())
    }

    fn cloned_solid(&self, handle: &KernelSolidHandle) -> Result<Solid, KernelError> {
        self.get_solid(handle)
            .cloned()
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn make_faces_from_profiles(
        &mut self,
        plane: &SketchPlane,
        profiles: &[SketchProfile],
    ) -> Result<Vec<KernelId>, KernelError> {
        plane.validate()?;
        for profile in profiles {
            check_profile(profile)?;
        }

        let mut face_ids = Vec::with_capacity(profiles.len());
        for profile in profiles {
            // Outer boundary counter-clockwise, holes clockwise.
            let mut wires: Vec<Wire> = vec![primitives::shape_wire(plane, &profile.outer)];
            wires.extend(
                profile
                    .holes
                    .iter()
                    .map(|hole| primitives::shape_wire(plane, hole).inverse()),
            );

            let face =
                builder::try_attach_plane(&wires).map_err(|e| KernelError::InvalidProfile {
                    reason: format!("failed to create planar face: {e}"),
                })?;

            let face_id = self.alloc_id();
            self.standalone_faces.insert(face_id.0, face);
            face_ids.push(face_id);
        }

        Ok(face_ids)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let dir = Vector3::new(direction[0], direction[1], direction[2]);
        if dir.magnitude() < 1e-12 {
            return Err(KernelError::ExtrudeFailed {
                reason: "extrude direction has zero length".to_string(),
            });
        }
        if !depth.is_finite() || depth == 0.0 {
            return Err(KernelError::ExtrudeFailed {
                reason: format!("extrude depth must be finite and non-zero, got {depth}"),
            });
        }
        let truck_face = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;

        let solid = builder::tsweep(&truck_face, dir.normalize() * depth);
        Ok(self.store_solid(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.cloned_solid(a)?;
        let solid_b = self.cloned_solid(b)?;

        let result = truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.cloned_solid(a)?;
        let mut solid_b = self.cloned_solid(b)?;

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn fillet_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet_edges".to_string(),
        })
    }

    fn chamfer_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _distance: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "chamfer_edges".to_string(),
        })
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(KernelError::TessellationFailed {
                reason: format!("tolerance must be positive, got {tolerance}"),
            });
        }
        let truck_solid = self
            .solids
            .get(&solid.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(solid.id()),
            })?;

        tessellation::tessellate_solid(truck_solid, tolerance, &mut self.next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KernelIntrospect;

    fn rect(w: f64, h: f64) -> SketchProfile {
        SketchProfile::solid(PlacedShape::new(Shape2D::rectangle(w, h), [0.0, 0.0]))
    }

    fn extrude(kernel: &mut TruckKernel, profile: SketchProfile, depth: f64) -> KernelSolidHandle {
        let face_ids = kernel
            .make_faces_from_profiles(&SketchPlane::xy(), &[profile])
            .unwrap();
        assert_eq!(face_ids.len(), 1);
        kernel.extrude_face(face_ids[0], [0.0, 0.0, 1.0], depth).unwrap()
    }

    #[test]
    fn extruded_rectangle_has_six_faces() {
        let mut kernel = TruckKernel::new();
        let handle = extrude(&mut kernel, rect(1.0, 1.0), 2.0);

        let solid = kernel.get_solid(&handle).unwrap();
        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].face_iter().count(), 6);
    }

    #[test]
    fn ring_profile_extrudes_to_tube() {
        let mut kernel = TruckKernel::new();
        let ring = SketchProfile::with_holes(
            PlacedShape::new(Shape2D::rectangle(10.0, 10.0), [0.0, 0.0]),
            vec![PlacedShape::new(Shape2D::rectangle(6.0, 6.0), [0.0, 0.0])],
        );
        let handle = extrude(&mut kernel, ring, 3.0);
        // 4 outer sides, 4 inner sides, 2 caps
        assert_eq!(kernel.list_faces(&handle).len(), 10);
    }

    #[test]
    fn extrude_rejects_zero_depth_without_consuming_face() {
        let mut kernel = TruckKernel::new();
        let face_ids = kernel
            .make_faces_from_profiles(&SketchPlane::xy(), &[rect(1.0, 1.0)])
            .unwrap();
        assert!(matches!(
            kernel.extrude_face(face_ids[0], [0.0, 0.0, 1.0], 0.0),
            Err(KernelError::ExtrudeFailed { .. })
        ));
        assert!(kernel.extrude_face(face_ids[0], [0.0, 0.0, 1.0], 1.0).is_ok());
    }

    #[test]
    fn tessellate_extruded_box() {
        let mut kernel = TruckKernel::new();
        let handle = extrude(&mut kernel, rect(1.0, 1.0), 1.0);

        let mesh = kernel.tessellate(&handle, 0.1).unwrap();

        assert!(!mesh.vertices.is_empty(), "Mesh should have vertices");
        assert!(!mesh.indices.is_empty(), "Mesh should have indices");
        assert!(!mesh.normals.is_empty(), "Mesh should have normals");
        assert_eq!(mesh.face_ranges.len(), 6, "Box should have 6 face ranges");

        let covered: u32 = mesh
            .face_ranges
            .iter()
            .map(|r| r.end_index - r.start_index)
            .sum();
        assert_eq!(covered, mesh.indices.len() as u32);
    }

    #[test]
    fn fillet_is_not_supported() {
        let mut kernel = TruckKernel::new();
        let handle = extrude(&mut kernel, rect(1.0, 1.0), 1.0);
        assert!(matches!(
            kernel.fillet_edges(&handle, &[], 0.1),
            Err(KernelError::NotSupported { .. })
        ));
    }
}
