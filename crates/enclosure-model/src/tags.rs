//! Named faces.
//!
//! A face is tagged by the operation that creates it, from that operation's
//! role assignments, and the tag is carried through every later operation
//! on the part via provenance. Faces are only ever looked up by tag.

use std::collections::BTreeMap;

use enclosure_kernel::{KernelId, KernelIntrospect, TopoKind};
use enclosure_types::Role;
use modeling_ops::Provenance;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::frames::{self, EnclosureFrames};
use crate::types::{EngineError, PartName};

/// How far a tagged face may sit from its frame's plane before it counts as
/// drifted, in millimetres.
pub const DRIFT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceTag {
    FloorBottom,
    FloorTop,
    FrontOuterWall,
    BackOuterWall,
    LeftOuterWall,
    RightOuterWall,
    LidBottom,
    LidTop,
    HolderTop,
    HolderBottom,
}

/// Whether a face's outward normal runs along or against its frame's normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Along,
    Against,
}

impl FaceTag {
    /// The frame the face lies on.
    pub fn anchor(self) -> (&'static str, Sense) {
        match self {
            FaceTag::FloorBottom => (frames::FLOOR_BOTTOM, Sense::Against),
            FaceTag::FloorTop => (frames::FLOOR_TOP, Sense::Along),
            FaceTag::FrontOuterWall => (frames::FRONT_OUTER, Sense::Along),
            FaceTag::BackOuterWall => (frames::BACK_OUTER, Sense::Along),
            FaceTag::LeftOuterWall => (frames::LEFT_OUTER, Sense::Along),
            FaceTag::RightOuterWall => (frames::RIGHT_OUTER, Sense::Along),
            FaceTag::LidBottom => (frames::RIM, Sense::Against),
            FaceTag::LidTop => (frames::LID_TOP, Sense::Along),
            FaceTag::HolderTop => (frames::HOLDER_TOP, Sense::Along),
            FaceTag::HolderBottom => (frames::HOLDER, Sense::Against),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceTag::FloorBottom => "floor_bottom",
            FaceTag::FloorTop => "floor_top",
            FaceTag::FrontOuterWall => "front_outer_wall",
            FaceTag::BackOuterWall => "back_outer_wall",
            FaceTag::LeftOuterWall => "left_outer_wall",
            FaceTag::RightOuterWall => "right_outer_wall",
            FaceTag::LidBottom => "lid_bottom",
            FaceTag::LidTop => "lid_top",
            FaceTag::HolderTop => "holder_top",
            FaceTag::HolderBottom => "holder_bottom",
        }
    }
}

impl std::fmt::Display for FaceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tagged faces of one part.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    part: PartName,
    faces: BTreeMap<FaceTag, KernelId>,
}

impl TagRegistry {
    pub fn new(part: PartName) -> Self {
        Self {
            part,
            faces: BTreeMap::new(),
        }
    }

    /// Tag the face the creating operation gave `role`.
    pub fn assign(
        &mut self,
        tag: FaceTag,
        role: &Role,
        provenance: &Provenance,
    ) -> Result<(), EngineError> {
        let face = provenance
            .face_with_role(role)
            .ok_or_else(|| EngineError::MissingTag {
                part: self.part,
                tag: format!("{tag} ({role:?} not assigned)"),
            })?;
        debug!(part = ?self.part, %tag, ?face, "tagged face");
        self.faces.insert(tag, face);
        Ok(())
    }

    /// Move every tag onto the face its face became in a later operation.
    /// Tags whose face did not survive are dropped; their names are returned.
    pub fn follow(&mut self, provenance: &Provenance) -> Vec<FaceTag> {
        let successors = provenance.successors();
        let mut lost = Vec::new();
        self.faces.retain(|tag, face| match successors.get(face) {
            Some(next) => {
                debug!(%tag, from = ?*face, to = ?next, "tag follows face");
                *face = *next;
                true
            }
            None => {
                lost.push(*tag);
                false
            }
        });
        for tag in &lost {
            warn!(part = ?self.part, %tag, "tagged face did not survive");
        }
        lost
    }

    pub fn face(&self, tag: FaceTag) -> Option<KernelId> {
        self.faces.get(&tag).copied()
    }

    pub fn require(&self, tag: FaceTag) -> Result<KernelId, EngineError> {
        self.face(tag).ok_or_else(|| EngineError::MissingTag {
            part: self.part,
            tag: tag.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceTag, KernelId)> + '_ {
        self.faces.iter().map(|(t, f)| (*t, *f))
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Compare every tagged face with the frame it should lie on. Returns one
    /// message per drifted face; nothing is changed.
    pub fn verify(&self, introspect: &dyn KernelIntrospect, frames: &EnclosureFrames) -> Vec<String> {
        let mut drift = Vec::new();
        for (tag, face) in self.iter() {
            let (frame_name, sense) = tag.anchor();
            let Ok(frame) = frames.get(frame_name) else {
                drift.push(format!("{tag}: frame {frame_name} is missing"));
                continue;
            };
            let sig = introspect.compute_signature(face, TopoKind::Face);
            if let Some(c) = sig.centroid {
                let offset = frame.distance_along_normal(&Point3::new(c[0], c[1], c[2]));
                if offset.abs() > DRIFT_TOLERANCE {
                    drift.push(format!("{tag}: {offset:.4} mm off {frame_name}"));
                }
            }
            if let Some(n) = sig.normal {
                let expected = match sense {
                    Sense::Along => frame.normal(),
                    Sense::Against => -frame.normal(),
                };
                let alignment = Vector3::new(n[0], n[1], n[2]).dot(&expected);
                if alignment < 1.0 - DRIFT_TOLERANCE {
                    drift.push(format!("{tag}: normal {n:?} does not face along {frame_name}"));
                }
            }
        }
        for message in &drift {
            warn!(part = ?self.part, "{message}");
        }
        drift
    }
}
