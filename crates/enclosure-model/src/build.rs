//! The build pipeline: configuration in, tagged solids out.
//!
//! Parts are built in a fixed order (board, case, lid, HDMI holder, plank).
//! Any failing step aborts the whole build; there is no partial model.

use std::collections::BTreeMap;

use enclosure_kernel::{KernelId, KernelIntrospect, KernelSolidHandle, RenderMesh, SketchProfile};
use enclosure_types::{Facing, Role};
use modeling_ops::{
    execute_extrude, execute_extrude_into, execute_fillet, execute_sketch, BooleanKind,
    KernelBundle, OpError, OpResult,
};
use placement::{FeaturePlacement, ReferenceFrame};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::EnclosureConfig;
use crate::frames::{sketch_plane, EnclosureFrames};
use crate::layout::{corner_name, EnclosureLayout};
use crate::tags::{FaceTag, TagRegistry};
use crate::types::{BuildStep, EngineError, PartName};

/// A built part: its solid and its named faces.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: PartName,
    pub handle: KernelSolidHandle,
    pub tags: TagRegistry,
}

/// The finished enclosure.
#[derive(Debug, Clone)]
pub struct EnclosureModel {
    pub config: EnclosureConfig,
    pub frames: EnclosureFrames,
    pub parts: BTreeMap<PartName, Part>,
    pub build_log: Vec<BuildStep>,
    /// Non-fatal findings: operation diagnostics, lost tags and tag drift.
    pub warnings: Vec<String>,
}

impl EnclosureModel {
    pub fn part(&self, name: PartName) -> Option<&Part> {
        self.parts.get(&name)
    }

    /// The kernel face carrying `tag` on `part`.
    pub fn face(&self, part: PartName, tag: FaceTag) -> Result<KernelId, EngineError> {
        self.parts
            .get(&part)
            .ok_or_else(|| EngineError::MissingTag {
                part,
                tag: tag.to_string(),
            })?
            .tags
            .require(tag)
    }

    /// Triangle meshes of every part.
    pub fn tessellate_all(
        &self,
        kb: &mut dyn KernelBundle,
        tolerance: f64,
    ) -> Result<BTreeMap<PartName, RenderMesh>, EngineError> {
        let mut meshes = BTreeMap::new();
        for (name, part) in &self.parts {
            meshes.insert(*name, kb.tessellate(&part.handle, tolerance)?);
        }
        Ok(meshes)
    }

    /// Check every tagged face against its frame again.
    pub fn verify_tags(&self, introspect: &dyn KernelIntrospect) -> Vec<String> {
        self.parts
            .values()
            .flat_map(|part| part.tags.verify(introspect, &self.frames))
            .collect()
    }
}

/// Builds an [`EnclosureModel`] from a validated configuration.
#[derive(Debug, Clone)]
pub struct EnclosureBuilder {
    config: EnclosureConfig,
}

impl EnclosureBuilder {
    pub fn new(config: EnclosureConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EnclosureConfig {
        &self.config
    }

    #[instrument(skip_all)]
    pub fn build(&self, kb: &mut dyn KernelBundle) -> Result<EnclosureModel, EngineError> {
        let frames = EnclosureFrames::derive(&self.config)?;
        let layout = EnclosureLayout::compute(&self.config, &frames)?;
        let mut run = BuildRun::default();

        let parts = vec![
            run.pcb(kb, &layout)?,
            run.case(kb, &layout)?,
            run.lid(kb, &layout, self.config.lid.edge_fillet)?,
            run.hdmi_holder(kb, &layout)?,
            run.plank(kb, &layout)?,
        ];

        let mut warnings = run.warnings;
        for part in &parts {
            warnings.extend(part.tags.verify(kb.as_introspect(), &frames));
            info!(
                part = ?part.name,
                faces = kb.list_faces(&part.handle).len(),
                tags = part.tags.len(),
                "built part"
            );
        }

        Ok(EnclosureModel {
            config: self.config.clone(),
            frames,
            parts: parts.into_iter().map(|p| (p.name, p)).collect(),
            build_log: run.log,
            warnings,
        })
    }
}

/// Build log and warnings collected while the parts are made.
#[derive(Debug, Default)]
struct BuildRun {
    log: Vec<BuildStep>,
    warnings: Vec<String>,
}

impl BuildRun {
    fn pcb(&mut self, kb: &mut dyn KernelBundle, layout: &EnclosureLayout) -> Result<Part, EngineError> {
        let holes: Vec<&FeaturePlacement> = layout.board_holes.iter().map(|(_, p)| p).collect();
        let (part, _) = self.create(
            kb,
            PartName::Pcb,
            "board",
            &layout.board,
            &holes,
            layout.board_thickness,
        )?;
        Ok(part)
    }

    #[instrument(skip_all)]
    fn case(&mut self, kb: &mut dyn KernelBundle, layout: &EnclosureLayout) -> Result<Part, EngineError> {
        let (mut case, floor) = self.create(
            kb,
            PartName::Case,
            "floor",
            &layout.floor,
            &[],
            layout.floor_thickness,
        )?;
        case.tags
            .assign(FaceTag::FloorBottom, &Role::EndCapNegative, &floor.provenance)?;
        case.tags
            .assign(FaceTag::FloorTop, &Role::EndCapPositive, &floor.provenance)?;

        for pillar in &layout.pillars {
            self.combine(
                kb,
                &mut case,
                &format!("pillar.{}", corner_name(pillar.corner)),
                &pillar.body,
                &[&pillar.bore],
                layout.pillar_height,
                BooleanKind::Union,
            )?;
        }

        let walls = self.combine(
            kb,
            &mut case,
            "walls",
            &layout.walls_outer,
            &[&layout.walls_inner],
            layout.wall_height,
            BooleanKind::Union,
        )?;
        for (tag, facing) in [
            (FaceTag::FrontOuterWall, Facing::NegV),
            (FaceTag::BackOuterWall, Facing::PosV),
            (FaceTag::LeftOuterWall, Facing::NegU),
            (FaceTag::RightOuterWall, Facing::PosU),
        ] {
            case.tags
                .assign(tag, &Role::OuterWall { facing }, &walls.provenance)?;
        }

        for cutout in layout.rca_video.iter().chain(&layout.rca_audio).chain([&layout.vga]) {
            self.combine(
                kb,
                &mut case,
                &cutout.label,
                cutout,
                &[],
                layout.front_cut_depth,
                BooleanKind::Subtract,
            )?;
        }
        self.combine(
            kb,
            &mut case,
            "scart",
            &layout.scart,
            &[],
            layout.left_cut_depth,
            BooleanKind::Subtract,
        )?;
        Ok(case)
    }

    fn lid(
        &mut self,
        kb: &mut dyn KernelBundle,
        layout: &EnclosureLayout,
        edge_fillet: Option<f64>,
    ) -> Result<Part, EngineError> {
        let (mut lid, created) =
            self.create(kb, PartName::Lid, "lid", &layout.lid, &[], layout.lid_thickness)?;
        lid.tags
            .assign(FaceTag::LidBottom, &Role::EndCapNegative, &created.provenance)?;
        lid.tags
            .assign(FaceTag::LidTop, &Role::EndCapPositive, &created.provenance)?;

        if let Some(radius) = edge_fillet {
            let step = "lid.edge_fillet";
            let top = lid.tags.require(FaceTag::LidTop)?;
            let edges = kb.face_edges(top);
            let filleted = execute_fillet(kb, &lid.handle, &edges, radius)
                .map_err(|e| step_failed(PartName::Lid, step, e.into()))?;
            self.absorb(&mut lid, step, filleted);
        }
        Ok(lid)
    }

    #[instrument(skip_all)]
    fn hdmi_holder(
        &mut self,
        kb: &mut dyn KernelBundle,
        layout: &EnclosureLayout,
    ) -> Result<Part, EngineError> {
        let (mut holder, block) = self.create(
            kb,
            PartName::HdmiHolder,
            "holder.block",
            &layout.holder_block,
            &[],
            layout.holder_thickness,
        )?;
        holder
            .tags
            .assign(FaceTag::HolderTop, &Role::EndCapPositive, &block.provenance)?;
        holder
            .tags
            .assign(FaceTag::HolderBottom, &Role::EndCapNegative, &block.provenance)?;

        self.combine(
            kb,
            &mut holder,
            "holder.hollow",
            &layout.holder_hollow,
            &[],
            layout.hollow_depth,
            BooleanKind::Subtract,
        )?;
        for ledge in &layout.neck_ledges {
            self.combine(
                kb,
                &mut holder,
                &ledge.label,
                ledge,
                &[],
                layout.neck_height,
                BooleanKind::Union,
            )?;
        }
        self.combine(
            kb,
            &mut holder,
            "holder.audio_block",
            &layout.audio_block,
            &[],
            layout.audio_depth,
            BooleanKind::Union,
        )?;
        Ok(holder)
    }

    fn plank(&mut self, kb: &mut dyn KernelBundle, layout: &EnclosureLayout) -> Result<Part, EngineError> {
        let (part, _) = self.create(
            kb,
            PartName::HdmiHolderPlank,
            "plank",
            &layout.plank,
            &[],
            layout.plank_thickness,
        )?;
        Ok(part)
    }

    /// Start a part from one extruded profile.
    fn create(
        &mut self,
        kb: &mut dyn KernelBundle,
        part: PartName,
        step: &str,
        outer: &FeaturePlacement,
        holes: &[&FeaturePlacement],
        depth: f64,
    ) -> Result<(Part, OpResult), EngineError> {
        let result = sketch_and_extrude(kb, outer, holes, depth)
            .map_err(|e| step_failed(part, step, e))?;
        let mut built = Part {
            name: part,
            handle: result.handle.clone(),
            tags: TagRegistry::new(part),
        };
        self.absorb(&mut built, step, result.clone());
        Ok((built, result))
    }

    /// Extrude one profile into an existing part, adding or removing material.
    #[allow(clippy::too_many_arguments)]
    fn combine(
        &mut self,
        kb: &mut dyn KernelBundle,
        part: &mut Part,
        step: &str,
        outer: &FeaturePlacement,
        holes: &[&FeaturePlacement],
        depth: f64,
        kind: BooleanKind,
    ) -> Result<OpResult, EngineError> {
        let result = extrude_into(kb, &part.handle, outer, holes, depth, kind)
            .map_err(|e| step_failed(part.name, step, e))?;
        self.absorb(part, step, result.clone());
        Ok(result)
    }

    /// Make `result` the part's current solid: tags follow their faces, the
    /// step is logged and its warnings kept.
    fn absorb(&mut self, part: &mut Part, step: &str, result: OpResult) {
        for tag in part.tags.follow(&result.provenance) {
            self.warnings
                .push(format!("{:?}/{step}: tag {tag} lost", part.name));
        }
        self.warnings.extend(
            result
                .diagnostics
                .warnings
                .into_iter()
                .map(|w| format!("{:?}/{step}: {w}", part.name)),
        );
        part.handle = result.handle;
        debug!(part = ?part.name, step, "build step done");
        self.log.push(BuildStep {
            id: Uuid::new_v4(),
            part: part.name,
            name: step.to_string(),
        });
    }
}

fn step_failed(part: PartName, step: &str, error: EngineError) -> EngineError {
    EngineError::BuildFailed {
        step: format!("{part:?}/{step}"),
        reason: error.to_string(),
    }
}

fn profile(outer: &FeaturePlacement, holes: &[&FeaturePlacement]) -> Result<SketchProfile, EngineError> {
    let shape = |p: &FeaturePlacement| {
        p.placed_shape().ok_or_else(|| EngineError::BuildFailed {
            step: p.label.clone(),
            reason: "placement has no outline".to_string(),
        })
    };
    Ok(SketchProfile::with_holes(
        shape(outer)?,
        holes.iter().map(|h| shape(*h)).collect::<Result<Vec<_>, _>>()?,
    ))
}

/// The sketch plane of `outer`'s frame. Holes must share it.
fn plane_of(outer: &FeaturePlacement, holes: &[&FeaturePlacement]) -> Result<ReferenceFrame, EngineError> {
    if let Some(stray) = holes.iter().find(|h| h.frame.name != outer.frame.name) {
        return Err(EngineError::BuildFailed {
            step: outer.label.clone(),
            reason: format!("{} is laid out on {}, not {}", stray.label, stray.frame.name, outer.frame.name),
        });
    }
    Ok(outer.frame.clone())
}

fn sketch_and_extrude(
    kb: &mut dyn KernelBundle,
    outer: &FeaturePlacement,
    holes: &[&FeaturePlacement],
    depth: f64,
) -> Result<OpResult, EngineError> {
    let frame = plane_of(outer, holes)?;
    let faces = execute_sketch(kb, &sketch_plane(&frame), &[profile(outer, holes)?])?;
    let face = faces.first().ok_or(OpError::NoProfiles)?;
    Ok(execute_extrude(kb, face, depth)?)
}

fn extrude_into(
    kb: &mut dyn KernelBundle,
    target: &KernelSolidHandle,
    outer: &FeaturePlacement,
    holes: &[&FeaturePlacement],
    depth: f64,
    kind: BooleanKind,
) -> Result<OpResult, EngineError> {
    let frame = plane_of(outer, holes)?;
    let faces = execute_sketch(kb, &sketch_plane(&frame), &[profile(outer, holes)?])?;
    let face = faces.first().ok_or(OpError::NoProfiles)?;
    Ok(execute_extrude_into(kb, target, face, depth, kind)?)
}
