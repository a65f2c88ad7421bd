//! Tessellation wrapper with face-range metadata.
//!
//! Wraps truck-meshalgo to produce a RenderMesh whose FaceRange entries map
//! triangle index ranges back to the faces they came from.

use crate::types::*;
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

type TruckSolid = truck_modeling::Solid;

/// Append one polygon mesh to the flat buffers, returning its index range.
fn append_mesh(mesh: &PolygonMesh, out: &mut RenderMesh) -> (u32, u32) {
    let start_index = out.indices.len() as u32;
    let base_vertex = (out.vertices.len() / 3) as u32;

    for pos in mesh.positions() {
        out.vertices.extend([pos[0] as f32, pos[1] as f32, pos[2] as f32]);
    }
    if mesh.normals().len() == mesh.positions().len() {
        for n in mesh.normals() {
            out.normals.extend([n[0] as f32, n[1] as f32, n[2] as f32]);
        }
    } else {
        // Flat fallback so normals stay parallel to vertices.
        for _ in mesh.positions() {
            out.normals.extend([0.0, 0.0, 1.0]);
        }
    }
    for tri in mesh.tri_faces() {
        out.indices
            .extend(tri.iter().map(|v| v.pos as u32 + base_vertex));
    }
    (start_index, out.indices.len() as u32)
}

/// Tessellate a truck Solid into a RenderMesh with per-face tracking.
pub fn tessellate_solid(
    solid: &TruckSolid,
    tolerance: f64,
    next_id: &mut u64,
) -> std::result::Result<RenderMesh, KernelError> {
    let meshed = solid.triangulation(tolerance);
    let mut out = RenderMesh {
        vertices: Vec::new(),
        normals: Vec::new(),
        indices: Vec::new(),
        face_ranges: Vec::new(),
    };

    for shell in meshed.boundaries().iter() {
        for face in shell.face_iter() {
            let face_id = KernelId(*next_id);
            *next_id += 1;

            let Some(mut face_mesh) = face.surface() else {
                continue;
            };
            if !face.orientation() {
                face_mesh.invert();
            }

            let (start_index, end_index) = append_mesh(&face_mesh, &mut out);
            if end_index > start_index {
                out.face_ranges.push(FaceRange {
                    face_id,
                    start_index,
                    end_index,
                });
            }
        }
    }

    if !out.indices.is_empty() {
        return Ok(out);
    }

    // Per-face meshing produced nothing: fall back to one merged mesh.
    let merged = meshed.to_polygon();
    let (start_index, end_index) = append_mesh(&merged, &mut out);
    if end_index == start_index {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced no triangles".to_string(),
        });
    }
    out.face_ranges.push(FaceRange {
        face_id: KernelId(*next_id),
        start_index,
        end_index,
    });
    *next_id += 1;
    Ok(out)
}
