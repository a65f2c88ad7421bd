//! KernelIntrospect for TruckKernel.
//!
//! truck has no stable integer ids, so entities are numbered per solid:
//! `handle * 10000 + index` for faces, `+ 1000 + index` for edges and
//! `+ 2000 + index` for vertices, in shell iteration order.

use std::collections::HashSet;

use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;

use truck_modeling::geometry::Surface;
use truck_modeling::topology::{Edge, Face, Solid, Vertex};

const STRIDE: u64 = 10000;
const EDGE_BASE: u64 = 1000;
const VERTEX_BASE: u64 = 2000;

/// Unique faces, edges and vertices of a solid in a fixed order.
struct Entities {
    faces: Vec<Face>,
    edges: Vec<Edge>,
    vertices: Vec<Vertex>,
}

fn entities(solid: &Solid) -> Entities {
    let mut faces = Vec::new();
    let mut edges = Vec::new();
    let mut vertices = Vec::new();
    let mut seen_edges = HashSet::new();
    let mut seen_vertices = HashSet::new();
    for shell in solid.boundaries().iter() {
        faces.extend(shell.face_iter().cloned());
        for edge in shell.edge_iter() {
            if seen_edges.insert(edge.id()) {
                edges.push(edge.clone());
            }
        }
        for vertex in shell.vertex_iter() {
            if seen_vertices.insert(vertex.id()) {
                vertices.push(vertex.clone());
            }
        }
    }
    Entities {
        faces,
        edges,
        vertices,
    }
}

fn encode(handle: u64, base: u64, index: usize) -> KernelId {
    KernelId(handle * STRIDE + base + index as u64)
}

/// Split an id into its solid handle and per-kind offset.
fn decode(id: KernelId, base: u64) -> (KernelSolidHandle, usize) {
    let local = (id.0 % STRIDE).saturating_sub(base);
    (KernelSolidHandle(id.0 / STRIDE), local as usize)
}

impl TruckKernel {
    fn entities_of(&self, handle: &KernelSolidHandle) -> Option<Entities> {
        self.get_solid(handle).map(entities)
    }
}

impl KernelIntrospect for TruckKernel {
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.entities_of(solid)
            .map(|e| (0..e.faces.len()).map(|i| encode(solid.id(), 0, i)).collect())
            .unwrap_or_default()
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.entities_of(solid)
            .map(|e| {
                (0..e.edges.len())
                    .map(|i| encode(solid.id(), EDGE_BASE, i))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn list_vertices(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.entities_of(solid)
            .map(|e| {
                (0..e.vertices.len())
                    .map(|i| encode(solid.id(), VERTEX_BASE, i))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        let (handle, index) = decode(face, 0);
        let Some(all) = self.entities_of(&handle) else {
            return Vec::new();
        };
        let Some(target) = all.faces.get(index) else {
            return Vec::new();
        };
        target
            .boundaries()
            .iter()
            .flat_map(|wire| wire.edge_iter())
            .filter_map(|edge| all.edges.iter().position(|e| e.id() == edge.id()))
            .map(|i| encode(handle.id(), EDGE_BASE, i))
            .collect()
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        let base = match kind {
            TopoKind::Face => 0,
            TopoKind::Edge => EDGE_BASE,
            TopoKind::Vertex => VERTEX_BASE,
        };
        let (handle, index) = decode(entity, base);
        let Some(all) = self.entities_of(&handle) else {
            return TopoSignature::empty();
        };
        let signature = match kind {
            TopoKind::Face => all.faces.get(index).map(face_signature),
            TopoKind::Edge => all.edges.get(index).map(edge_signature),
            TopoKind::Vertex => all.vertices.get(index).map(vertex_signature),
        };
        signature.unwrap_or_else(TopoSignature::empty)
    }
}

fn face_signature(face: &Face) -> TopoSignature {
    let surface = face.oriented_surface();
    let normal = match &surface {
        Surface::Plane(plane) => {
            let n = plane.normal();
            Some([n[0], n[1], n[2]])
        }
        _ => None,
    };
    TopoSignature {
        surface_type: Some(classify_surface(&surface).to_string()),
        area: None,
        centroid: boundary_centroid(face),
        normal,
        length: None,
    }
}

fn edge_signature(edge: &Edge) -> TopoSignature {
    let front = edge.front().point();
    let back = edge.back().point();
    let d = [back[0] - front[0], back[1] - front[1], back[2] - front[2]];
    TopoSignature {
        surface_type: Some("line".to_string()),
        area: None,
        centroid: Some([
            (front[0] + back[0]) / 2.0,
            (front[1] + back[1]) / 2.0,
            (front[2] + back[2]) / 2.0,
        ]),
        normal: None,
        length: Some(norm(d)),
    }
}

fn vertex_signature(vertex: &Vertex) -> TopoSignature {
    let p = vertex.point();
    TopoSignature {
        surface_type: Some("point".to_string()),
        area: None,
        centroid: Some([p[0], p[1], p[2]]),
        normal: None,
        length: None,
    }
}

fn classify_surface(surface: &Surface) -> &'static str {
    match surface {
        Surface::Plane(_) => "planar",
        Surface::RevolutedCurve(_) => "revolved",
        Surface::BSplineSurface(_) => "nurbs",
        Surface::NurbsSurface(_) => "nurbs",
    }
}

/// Average of the outer boundary's vertices.
fn boundary_centroid(face: &Face) -> Option<[f64; 3]> {
    let boundaries = face.boundaries();
    let outer = boundaries.first()?;
    let mut sum = [0.0; 3];
    let mut count = 0.0;
    for v in outer.vertex_iter() {
        let p = v.point();
        sum = [sum[0] + p[0], sum[1] + p[1], sum[2] + p[2]];
        count += 1.0;
    }
    (count > 0.0).then(|| [sum[0] / count, sum[1] / count, sum[2] / count])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Kernel;

    fn box_solid(kernel: &mut TruckKernel, w: f64, h: f64, d: f64) -> KernelSolidHandle {
        let profile =
            SketchProfile::solid(PlacedShape::new(Shape2D::rectangle(w, h), [w / 2.0, h / 2.0]));
        let faces = kernel
            .make_faces_from_profiles(&SketchPlane::xy(), &[profile])
            .unwrap();
        kernel.extrude_face(faces[0], [0.0, 0.0, 1.0], d).unwrap()
    }

    #[test]
    fn box_entity_counts() {
        let mut kernel = TruckKernel::new();
        let handle = box_solid(&mut kernel, 2.0, 3.0, 4.0);
        assert_eq!(kernel.list_faces(&handle).len(), 6);
        assert_eq!(kernel.list_edges(&handle).len(), 12);
        assert_eq!(kernel.list_vertices(&handle).len(), 8);
    }

    #[test]
    fn box_faces_have_four_edges() {
        let mut kernel = TruckKernel::new();
        let handle = box_solid(&mut kernel, 1.0, 1.0, 1.0);
        for face in kernel.list_faces(&handle) {
            assert_eq!(kernel.face_edges(face).len(), 4);
        }
    }

    #[test]
    fn box_face_signatures_are_planar_with_centroids() {
        let mut kernel = TruckKernel::new();
        let handle = box_solid(&mut kernel, 2.0, 2.0, 2.0);
        let sigs = kernel.compute_all_signatures(&handle, TopoKind::Face);
        assert_eq!(sigs.len(), 6);
        for (_, sig) in &sigs {
            assert_eq!(sig.surface_type.as_deref(), Some("planar"));
            let c = sig.centroid.unwrap();
            let n = sig.normal.unwrap();
            // Every face of the box centred on (1, 1, 1) sits one unit along its normal.
            let offset = (c[0] - 1.0) * n[0] + (c[1] - 1.0) * n[1] + (c[2] - 1.0) * n[2];
            assert!((offset - 1.0).abs() < 1e-9, "face {sig:?} not outward");
        }
    }

    #[test]
    fn unknown_entity_has_empty_signature() {
        let kernel = TruckKernel::new();
        assert_eq!(
            kernel.compute_signature(KernelId(42), TopoKind::Face),
            TopoSignature::empty()
        );
    }
}
