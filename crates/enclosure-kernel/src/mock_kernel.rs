//! Deterministic stand-in kernel for tests: every extruded profile becomes a box.
//!
//! Every extruded profile becomes a prism over the outer shape's bounding box
//! (8 vertices, 12 edges, 6 faces) placed in world coordinates, so normals,
//! centroids and areas are real even though the topology is simplified.
//! Holes only reduce cap area.

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, SQRT_2};

/// Face definition tuple: (edge_indices, normal, centroid, area, surface_type).
type FaceDef = (Vec<usize>, [f64; 3], [f64; 3], f64, &'static str);

#[derive(Debug, Clone)]
struct MockVertex {
    id: KernelId,
    position: [f64; 3],
}

#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    start: KernelId,
    end: KernelId,
    length: f64,
}

#[derive(Debug, Clone)]
struct MockFace {
    id: KernelId,
    edges: Vec<KernelId>,
    normal: [f64; 3],
    centroid: [f64; 3],
    area: f64,
    surface_type: String,
}

#[derive(Debug, Clone, Default)]
struct MockSolid {
    vertices: Vec<MockVertex>,
    edges: Vec<MockEdge>,
    faces: Vec<MockFace>,
}

impl MockSolid {
    fn vertex(&self, id: KernelId) -> Option<&MockVertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    fn edge_faces(&self, edge: KernelId) -> Vec<&MockFace> {
        self.faces.iter().filter(|f| f.edges.contains(&edge)).collect()
    }

    /// Unique vertex positions bounding a face, in edge order.
    fn face_polygon(&self, face: &MockFace) -> Vec<[f64; 3]> {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        for eid in &face.edges {
            let Some(edge) = self.edges.iter().find(|e| e.id == *eid) else {
                continue;
            };
            for vid in [edge.start, edge.end] {
                if seen.insert(vid) {
                    if let Some(v) = self.vertex(vid) {
                        points.push(v.position);
                    }
                }
            }
        }
        points
    }
}

/// A sketch face waiting to be extruded.
#[derive(Debug, Clone)]
struct MockSketchFace {
    plane: SketchPlane,
    profile: SketchProfile,
}

/// Edge treatment applied by [`MockKernel::bevel_edges`].
#[derive(Debug, Clone, Copy)]
enum Bevel {
    Fillet,
    Chamfer,
}

impl Bevel {
    fn error(self, reason: String) -> KernelError {
        match self {
            Bevel::Fillet => KernelError::FilletFailed { reason },
            Bevel::Chamfer => KernelError::ChamferFailed { reason },
        }
    }

    fn surface_type(self) -> &'static str {
        match self {
            Bevel::Fillet => "cylindrical",
            Bevel::Chamfer => "planar",
        }
    }

    /// Area of the blend face along an edge of `length`.
    fn area(self, length: f64, size: f64) -> f64 {
        match self {
            Bevel::Fillet => length * size * FRAC_PI_2,
            Bevel::Chamfer => length * size * SQRT_2,
        }
    }
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
    /// Faces created by make_faces_from_profiles, awaiting extrude.
    sketch_faces: HashMap<u64, MockSketchFace>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            sketch_faces: HashMap::new(),
        }
    }

    /// Number of solids currently held by the kernel.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn solid(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    /// Sweep the bounding box of a sketch profile by `sweep`.
    fn make_prism(&mut self, sketch: &MockSketchFace, sweep: [f64; 3]) -> MockSolid {
        let plane = &sketch.plane;
        let outer = sketch.profile.outer;
        let [u0, v0, u1, v1] = outer.bounds();
        let [uc, vc] = outer.center;
        let x = plane.x_axis;
        let y = plane.y_axis();
        let depth = norm(sweep);
        let along = if dot(sweep, plane.normal) >= 0.0 { 1.0 } else { -1.0 };

        let base = [
            plane.point(u0, v0),
            plane.point(u1, v0),
            plane.point(u1, v1),
            plane.point(u0, v1),
        ];
        let positions: Vec<[f64; 3]> = base
            .iter()
            .copied()
            .chain(base.iter().map(|p| add(*p, sweep)))
            .collect();

        let vertices: Vec<MockVertex> = positions
            .iter()
            .map(|&position| MockVertex {
                id: self.alloc_id(),
                position,
            })
            .collect();

        // 4 base, 4 top, 4 swept
        let edge_pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let edges: Vec<MockEdge> = edge_pairs
            .iter()
            .map(|&(si, ei)| MockEdge {
                id: self.alloc_id(),
                start: vertices[si].id,
                end: vertices[ei].id,
                length: norm(sub(positions[ei], positions[si])),
            })
            .collect();

        let half = scale(sweep, 0.5);
        let base_centroid = plane.point(uc, vc);
        let (side_type, u_side, v_side) = match outer.shape {
            Shape2D::Circle { radius } => ("cylindrical", FRAC_PI_2 * radius, FRAC_PI_2 * radius),
            Shape2D::Rectangle { width, height } => ("planar", width, height),
        };
        let cap_area = sketch.profile.area();

        let face_defs: Vec<FaceDef> = vec![
            (
                vec![0, 1, 2, 3],
                scale(plane.normal, -along),
                base_centroid,
                cap_area,
                "planar",
            ),
            (
                vec![4, 5, 6, 7],
                scale(plane.normal, along),
                add(base_centroid, sweep),
                cap_area,
                "planar",
            ),
            // -v side
            (
                vec![0, 9, 4, 8],
                scale(y, -1.0),
                add(plane.point(uc, v0), half),
                u_side * depth,
                side_type,
            ),
            // +v side
            (
                vec![2, 11, 6, 10],
                y,
                add(plane.point(uc, v1), half),
                u_side * depth,
                side_type,
            ),
            // -u side
            (
                vec![3, 8, 7, 11],
                scale(x, -1.0),
                add(plane.point(u0, vc), half),
                v_side * depth,
                side_type,
            ),
            // +u side
            (
                vec![1, 10, 5, 9],
                x,
                add(plane.point(u1, vc), half),
                v_side * depth,
                side_type,
            ),
        ];

        let faces = face_defs
            .into_iter()
            .map(|(edge_indices, normal, centroid, area, stype)| MockFace {
                id: self.alloc_id(),
                edges: edge_indices.iter().map(|&i| edges[i].id).collect(),
                normal,
                centroid,
                area,
                surface_type: stype.to_string(),
            })
            .collect();

        MockSolid {
            vertices,
            edges,
            faces,
        }
    }

    /// Copy `source` into `target` under freshly allocated ids, the way a
    /// real kernel renumbers everything after an operation.
    fn copy_renumbered(
        &mut self,
        source: &MockSolid,
        target: &mut MockSolid,
        skip_edges: &HashSet<KernelId>,
    ) -> HashMap<KernelId, KernelId> {
        let mut id_map = HashMap::new();
        for v in &source.vertices {
            let id = self.alloc_id();
            id_map.insert(v.id, id);
            target.vertices.push(MockVertex {
                id,
                position: v.position,
            });
        }
        for e in &source.edges {
            let id = self.alloc_id();
            id_map.insert(e.id, id);
            if !skip_edges.contains(&e.id) {
                target.edges.push(MockEdge {
                    id,
                    start: id_map[&e.start],
                    end: id_map[&e.end],
                    length: e.length,
                });
            }
        }
        for f in &source.faces {
            let id = self.alloc_id();
            id_map.insert(f.id, id);
            target.faces.push(MockFace {
                id,
                edges: f
                    .edges
                    .iter()
                    .filter(|eid| !skip_edges.contains(eid))
                    .map(|eid| id_map[eid])
                    .collect(),
                normal: f.normal,
                centroid: f.centroid,
                area: f.area,
                surface_type: f.surface_type.clone(),
            });
        }
        id_map
    }

    /// Replace each edge by a blend face: the edge goes away, each endpoint
    /// gains a pulled-back vertex joined by a new edge, and one face covers
    /// the blend. V + 2n, E + n, F + n.
    fn bevel_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        size: f64,
        bevel: Bevel,
    ) -> Result<KernelSolidHandle, KernelError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(bevel.error(format!("size must be positive, got {size}")));
        }
        let source = self.solid(solid)?.clone();
        for eid in edges {
            if !source.edges.iter().any(|e| e.id == *eid) {
                return Err(bevel.error(format!("edge {eid:?} not found in solid")));
            }
        }

        let skip: HashSet<KernelId> = edges.iter().copied().collect();
        let mut result = MockSolid::default();
        let id_map = self.copy_renumbered(&source, &mut result, &skip);

        for eid in edges {
            let Some(edge) = source.edges.iter().find(|e| e.id == *eid) else {
                continue;
            };
            let (Some(start), Some(end)) = (source.vertex(edge.start), source.vertex(edge.end))
            else {
                return Err(bevel.error(format!("edge {eid:?} has no end vertices")));
            };

            // Blend direction halves the angle between the two adjacent faces.
            let summed = source
                .edge_faces(*eid)
                .iter()
                .fold([0.0; 3], |acc, f| add(acc, f.normal));
            let blend_normal = normalized(summed).unwrap_or([0.0, 0.0, 1.0]);
            let pull = scale(blend_normal, -size);

            let v1 = MockVertex {
                id: self.alloc_id(),
                position: add(start.position, pull),
            };
            let v2 = MockVertex {
                id: self.alloc_id(),
                position: add(end.position, pull),
            };
            let e1 = MockEdge {
                id: self.alloc_id(),
                start: id_map[&edge.start],
                end: v1.id,
                length: size,
            };
            let e2 = MockEdge {
                id: self.alloc_id(),
                start: id_map[&edge.end],
                end: v2.id,
                length: size,
            };
            let midpoint = scale(add(start.position, end.position), 0.5);
            let face = MockFace {
                id: self.alloc_id(),
                edges: vec![e1.id, e2.id],
                normal: blend_normal,
                centroid: add(midpoint, scale(pull, 0.5)),
                area: bevel.area(edge.length, size),
                surface_type: bevel.surface_type().to_string(),
            };

            result.vertices.push(v1);
            result.vertices.push(v2);
            result.edges.push(e1);
            result.edges.push(e2);
            result.faces.push(face);
        }

        Ok(self.store(result))
    }

    /// Triangle fan per face over the face's boundary vertices.
    fn tessellate_faces(solid: &MockSolid) -> RenderMesh {
        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();
        let mut face_ranges = Vec::new();

        for face in &solid.faces {
            let mut polygon = solid.face_polygon(face);
            if polygon.len() < 3 {
                continue;
            }
            // Order counter-clockwise around the normal so the fan is not self-crossing.
            let (u, v) = tangent_vectors(face.normal);
            let c = face.centroid;
            polygon.sort_by(|a, b| {
                let da = sub(*a, c);
                let db = sub(*b, c);
                let ta = dot(da, v).atan2(dot(da, u));
                let tb = dot(db, v).atan2(dot(db, u));
                ta.total_cmp(&tb)
            });

            let start_index = indices.len() as u32;
            let base_vertex = (vertices.len() / 3) as u32;
            for p in &polygon {
                vertices.extend(p.iter().map(|&x| x as f32));
                normals.extend(face.normal.iter().map(|&x| x as f32));
            }
            for i in 1..polygon.len() as u32 - 1 {
                indices.extend_from_slice(&[base_vertex, base_vertex + i, base_vertex + i + 1]);
            }
            face_ranges.push(FaceRange {
                face_id: face.id,
                start_index,
                end_index: indices.len() as u32,
            });
        }

        RenderMesh {
            vertices,
            normals,
            indices,
            face_ranges,
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Two unit vectors spanning the plane orthogonal to `n`, with u x v = n.
fn tangent_vectors(n: [f64; 3]) -> ([f64; 3], [f64; 3]) {
    let up = if n[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let u = normalized(cross(up, n)).unwrap_or([1.0, 0.0, 0.0]);
    (u, cross(n, u))
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn normalized(a: [f64; 3]) -> Option<[f64; 3]> {
    let len = norm(a);
    (len > 1e-12).then(|| scale(a, 1.0 / len))
}

impl Kernel for MockKernel {
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
            let face_id = self.alloc_id();
            self.sketch_faces.insert(
                face_id.0,
                MockSketchFace {
                    plane: *plane,
                    profile: profile.clone(),
                },
            );
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
        let sketch = self
            .sketch_faces
            .get(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        let dir = normalized(direction).ok_or_else(|| KernelError::ExtrudeFailed {
            reason: "extrude direction has zero length".to_string(),
        })?;
        if !depth.is_finite() || depth == 0.0 {
            return Err(KernelError::ExtrudeFailed {
                reason: format!("extrude depth must be finite and non-zero, got {depth}"),
            });
        }
        if dot(dir, sketch.plane.normal).abs() < 1e-9 {
            return Err(KernelError::ExtrudeFailed {
                reason: "extrude direction lies in the sketch plane".to_string(),
            });
        }

        let sketch = sketch.clone();
        self.sketch_faces.remove(&face.0);
        let solid = self.make_prism(&sketch, scale(dir, depth));
        Ok(self.store(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?.clone();
        let solid_b = self.solid(b)?.clone();

        let mut merged = MockSolid::default();
        let none = HashSet::new();
        self.copy_renumbered(&solid_a, &mut merged, &none);
        self.copy_renumbered(&solid_b, &mut merged, &none);
        // The tool body is consumed; the target stays for provenance queries.
        self.solids.remove(&b.id());
        Ok(self.store(merged))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        // The tool body leaves no faces behind in the mock; A is renumbered.
        let solid_a = self.solid(a)?.clone();
        self.solid(b)?;

        let mut result = MockSolid::default();
        self.copy_renumbered(&solid_a, &mut result, &HashSet::new());
        self.solids.remove(&b.id());
        Ok(self.store(result))
    }

    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.bevel_edges(solid, edges, radius, Bevel::Fillet)
    }

    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        distance: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.bevel_edges(solid, edges, distance, Bevel::Chamfer)
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
        Ok(Self::tessellate_faces(self.solid(solid)?))
    }
}

impl KernelIntrospect for MockKernel {
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.faces.iter().map(|f| f.id).collect())
            .unwrap_or_default()
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.edges.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn list_vertices(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.vertices.iter().map(|v| v.id).collect())
            .unwrap_or_default()
    }

    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        self.solids
            .values()
            .flat_map(|s| s.faces.iter())
            .find(|f| f.id == face)
            .map(|f| f.edges.clone())
            .unwrap_or_default()
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        for solid in self.solids.values() {
            match kind {
                TopoKind::Face => {
                    if let Some(f) = solid.faces.iter().find(|f| f.id == entity) {
                        return TopoSignature {
                            surface_type: Some(f.surface_type.clone()),
                            area: Some(f.area),
                            centroid: Some(f.centroid),
                            normal: Some(f.normal),
                            length: None,
                        };
                    }
                }
                TopoKind::Edge => {
                    if let Some(e) = solid.edges.iter().find(|e| e.id == entity) {
                        let centroid = match (solid.vertex(e.start), solid.vertex(e.end)) {
                            (Some(s), Some(t)) => Some(scale(add(s.position, t.position), 0.5)),
                            _ => None,
                        };
                        return TopoSignature {
                            surface_type: Some("line".to_string()),
                            area: None,
                            centroid,
                            normal: None,
                            length: Some(e.length),
                        };
                    }
                }
                TopoKind::Vertex => {
                    if let Some(v) = solid.vertex(entity) {
                        return TopoSignature {
                            surface_type: Some("point".to_string()),
                            area: None,
                            centroid: Some(v.position),
                            normal: None,
                            length: None,
                        };
                    }
                }
            }
        }
        TopoSignature::empty()
    }
}
