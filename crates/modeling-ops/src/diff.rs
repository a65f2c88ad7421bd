use std::collections::HashSet;

use enclosure_kernel::{KernelId, KernelIntrospect, KernelSolidHandle};
use enclosure_types::{TopoKind, TopoSignature};

use crate::types::EntityRecord;

/// Minimum similarity for a renumbered entity to count as the same one.
pub const SURVIVAL_THRESHOLD: f64 = 0.7;

/// A snapshot of the topology of a solid at a point in time.
#[derive(Debug, Clone, Default)]
pub struct TopoSnapshot {
    pub faces: Vec<(KernelId, TopoSignature)>,
    pub edges: Vec<(KernelId, TopoSignature)>,
    pub vertices: Vec<(KernelId, TopoSignature)>,
}

impl TopoSnapshot {
    /// Concatenate two snapshots, e.g. both operands of a boolean.
    pub fn merged(mut self, other: TopoSnapshot) -> TopoSnapshot {
        self.faces.extend(other.faces);
        self.edges.extend(other.edges);
        self.vertices.extend(other.vertices);
        self
    }
}

/// Take a topology snapshot of a solid for diffing.
pub fn snapshot(introspect: &dyn KernelIntrospect, solid: &KernelSolidHandle) -> TopoSnapshot {
    TopoSnapshot {
        faces: introspect.compute_all_signatures(solid, TopoKind::Face),
        edges: introspect.compute_all_signatures(solid, TopoKind::Edge),
        vertices: introspect.compute_all_signatures(solid, TopoKind::Vertex),
    }
}

/// Result of diffing two topology snapshots.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Entities present in `after` but not in `before`.
    pub created: Vec<EntityRecord>,
    /// Entities present in `before` but not in `after`.
    pub deleted: Vec<EntityRecord>,
    /// Entities that correspond between before and after (same id, or by signature similarity).
    pub survived: Vec<(KernelId, KernelId)>,
}

/// Diff two topology snapshots to find created, deleted, and surviving entities.
/// For a fresh solid (no "before"), pass an empty snapshot as `before`.
pub fn diff(before: &TopoSnapshot, after: &TopoSnapshot) -> DiffResult {
    let mut result = DiffResult::default();
    diff_kind(&before.faces, &after.faces, TopoKind::Face, &mut result);
    diff_kind(&before.edges, &after.edges, TopoKind::Edge, &mut result);
    diff_kind(&before.vertices, &after.vertices, TopoKind::Vertex, &mut result);
    result
}

/// Diff a single kind of topology entity.
///
/// Walks `before` in order so the outcome does not depend on hash iteration.
/// Each gone entity greedily takes its most similar unclaimed new entity.
fn diff_kind(
    before: &[(KernelId, TopoSignature)],
    after: &[(KernelId, TopoSignature)],
    kind: TopoKind,
    out: &mut DiffResult,
) {
    let before_ids: HashSet<KernelId> = before.iter().map(|(id, _)| *id).collect();
    let after_ids: HashSet<KernelId> = after.iter().map(|(id, _)| *id).collect();

    let mut claimed: HashSet<KernelId> = HashSet::new();
    for (id, _) in before {
        if after_ids.contains(id) {
            out.survived.push((*id, *id));
            claimed.insert(*id);
        }
    }

    let new: Vec<&(KernelId, TopoSignature)> = after
        .iter()
        .filter(|(id, _)| !before_ids.contains(id))
        .collect();

    for (gone_id, gone_sig) in before.iter().filter(|(id, _)| !after_ids.contains(id)) {
        let best = new
            .iter()
            .filter(|(id, _)| !claimed.contains(id))
            .map(|(id, sig)| (*id, signature_similarity(gone_sig, sig)))
            .filter(|(_, sim)| *sim > SURVIVAL_THRESHOLD)
            .fold(None::<(KernelId, f64)>, |best, candidate| match best {
                Some((_, best_sim)) if best_sim >= candidate.1 => best,
                _ => Some(candidate),
            });

        match best {
            Some((matched, _)) => {
                out.survived.push((*gone_id, matched));
                claimed.insert(matched);
            }
            None => out.deleted.push(EntityRecord {
                kernel_id: *gone_id,
                kind,
                signature: gone_sig.clone(),
            }),
        }
    }

    for (new_id, sig) in new {
        if !claimed.contains(new_id) {
            out.created.push(EntityRecord {
                kernel_id: *new_id,
                kind,
                signature: sig.clone(),
            });
        }
    }
}

/// Compute similarity between two topology signatures (0.0 to 1.0).
/// Higher means more similar. Used for signature-based matching.
pub fn signature_similarity(a: &TopoSignature, b: &TopoSignature) -> f64 {
    let mut score = 0.0;
    let mut weight = 0.0;

    // Surface type match (high weight)
    if let (Some(st_a), Some(st_b)) = (&a.surface_type, &b.surface_type) {
        weight += 3.0;
        if st_a == st_b {
            score += 3.0;
        }
    }

    // Area similarity
    if let (Some(area_a), Some(area_b)) = (a.area, b.area) {
        weight += 2.0;
        score += 2.0 * relative_closeness(area_a, area_b);
    }

    // Centroid proximity: full match at zero distance, nothing beyond 10 mm
    if let (Some(c_a), Some(c_b)) = (a.centroid, b.centroid) {
        weight += 2.0;
        let dist =
            ((c_a[0] - c_b[0]).powi(2) + (c_a[1] - c_b[1]).powi(2) + (c_a[2] - c_b[2]).powi(2))
                .sqrt();
        score += 2.0 * (1.0 - (dist / 10.0).min(1.0));
    }

    // Normal alignment: 1 parallel, 0 anti-parallel
    if let (Some(n_a), Some(n_b)) = (a.normal, b.normal) {
        weight += 2.0;
        let dot = n_a[0] * n_b[0] + n_a[1] * n_b[1] + n_a[2] * n_b[2];
        score += 2.0 * ((dot + 1.0) / 2.0).max(0.0);
    }

    // Length similarity (for edges)
    if let (Some(len_a), Some(len_b)) = (a.length, b.length) {
        weight += 2.0;
        score += 2.0 * relative_closeness(len_a, len_b);
    }

    if weight > 0.0 {
        score / weight
    } else {
        0.0
    }
}

/// 1 for equal magnitudes, falling to 0 as their relative difference reaches 100 %.
fn relative_closeness(a: f64, b: f64) -> f64 {
    let max = a.abs().max(b.abs());
    if max > 1e-12 {
        1.0 - ((a - b).abs() / max).min(1.0)
    } else {
        1.0
    }
}
