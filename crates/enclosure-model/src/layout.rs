//! Where every feature of the enclosure goes.
//!
//! Pure placement arithmetic on top of the derived frames; no kernel calls.
//! The build consumes the placements straight away.

use enclosure_types::Shape2D;
use nalgebra::Point2;
use placement::{
    board_hole_locations, clearance_adjusted_size, connector_count, linear_connector_row,
    BoardOutline, Corner, FeaturePlacement, PlacementError, ReferenceFrame,
};
use tracing::{debug, instrument};

use crate::config::EnclosureConfig;
use crate::frames::{self, EnclosureFrames};
use crate::types::EngineError;

/// Subtractive tools run this far past the face they stop at, so they never
/// end flush with it.
pub const CUT_OVERSHOOT: f64 = 0.01;

/// A mounting pillar under one board hole.
#[derive(Debug, Clone)]
pub struct Pillar {
    pub corner: Corner,
    pub body: FeaturePlacement,
    pub bore: FeaturePlacement,
}

/// Placements for the board, case, lid, HDMI holder and plank.
#[derive(Debug, Clone)]
pub struct EnclosureLayout {
    pub board: FeaturePlacement,
    pub board_holes: Vec<(Corner, FeaturePlacement)>,
    pub board_thickness: f64,

    pub floor: FeaturePlacement,
    pub floor_thickness: f64,
    pub pillars: Vec<Pillar>,
    pub pillar_height: f64,
    pub walls_outer: FeaturePlacement,
    pub walls_inner: FeaturePlacement,
    pub wall_height: f64,

    pub rca_video: Vec<FeaturePlacement>,
    pub rca_audio: Vec<FeaturePlacement>,
    pub vga: FeaturePlacement,
    /// From the board front to just past the front outer wall.
    pub front_cut_depth: f64,
    pub scart: FeaturePlacement,
    /// From the board left edge to just past the left outer wall.
    pub left_cut_depth: f64,

    pub lid: FeaturePlacement,
    pub lid_thickness: f64,

    pub holder_block: FeaturePlacement,
    pub holder_thickness: f64,
    /// Drawn just above the holder top; cut downwards.
    pub holder_hollow: FeaturePlacement,
    pub hollow_depth: f64,
    pub neck_ledges: Vec<FeaturePlacement>,
    pub neck_height: f64,
    /// Drawn on the holder top; added downwards to the bottom.
    pub audio_block: FeaturePlacement,
    pub audio_depth: f64,

    pub plank: FeaturePlacement,
    pub plank_thickness: f64,
}

impl EnclosureLayout {
    #[instrument(skip_all)]
    pub fn compute(config: &EnclosureConfig, frames: &EnclosureFrames) -> Result<Self, EngineError> {
        let board = &config.board;
        let case = &config.case;

        let board_frame = frames.get(frames::BOARD)?;
        let outline = BoardOutline::new(board.width, board.length)?;
        let holes = board_hole_locations(&outline, board.hole_inset)?;
        let hole_radius = board.hole_diameter / 2.0;

        let board_placement = rect_at(board_frame, "board", 0.0, 0.0, board.width, board.length)?;
        let board_holes = holes
            .iter()
            .map(|h| {
                let label = format!("board_hole.{}", corner_name(h.corner));
                FeaturePlacement::on(board_frame, label, h.center, Some(Shape2D::circle(hole_radius)))
                    .map(|p| (h.corner, p))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Case
        let floor_bottom = frames.get(frames::FLOOR_BOTTOM)?;
        let floor_top = frames.get(frames::FLOOR_TOP)?;
        let outer_w = config.case_outer_width();
        let outer_l = config.case_outer_length();
        let floor = rect_at(floor_bottom, "floor", 0.0, 0.0, outer_w, outer_l)?;
        let floor_thickness = frames.depth_between(frames::FLOOR_BOTTOM, frames::FLOOR_TOP)?;

        // Pillars share the board's x/y axes, so hole centres carry over as is.
        let pillar_radius = config.pillar_radius();
        let pillars = holes
            .iter()
            .map(|h| -> Result<Pillar, PlacementError> {
                let name = corner_name(h.corner);
                Ok(Pillar {
                    corner: h.corner,
                    body: FeaturePlacement::on(
                        floor_top,
                        format!("pillar.{name}"),
                        h.center,
                        Some(Shape2D::circle(pillar_radius)),
                    )?,
                    bore: FeaturePlacement::on(
                        floor_top,
                        format!("pillar_bore.{name}"),
                        h.center,
                        Some(Shape2D::circle(hole_radius)),
                    )?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pillar_height = frames.depth_between(frames::FLOOR_TOP, frames::BOARD)?;

        let walls_outer = rect_at(floor_top, "walls.outer", 0.0, 0.0, outer_w, outer_l)?;
        let walls_inner = rect_at(
            floor_top,
            "walls.inner",
            0.0,
            0.0,
            config.case_inner_width(),
            config.case_inner_length(),
        )?;
        let wall_height = frames.depth_between(frames::FLOOR_TOP, frames::RIM)?;

        // Front connectors
        let front = frames.get(frames::BOARD_FRONT)?;
        let (rca_video, rca_audio) = rca_rows(config, front)?;
        let vga = vga_cutout(config, front)?;
        let front_cut_depth =
            frames.depth_between(frames::BOARD_FRONT, frames::FRONT_OUTER)? + CUT_OVERSHOOT;

        let left = frames.get(frames::BOARD_LEFT)?;
        let scart = rect_at(
            left,
            "scart",
            config.scart.horizontal_offset,
            config.scart.vertical_offset,
            config.scart.width,
            config.scart.height,
        )?;
        let left_cut_depth =
            frames.depth_between(frames::BOARD_LEFT, frames::LEFT_OUTER)? + CUT_OVERSHOOT;

        // Cutouts must stay between floor and rim and clear of the side walls.
        let v_min = floor_top.origin().z - front.origin().z;
        let v_max = frames.get(frames::RIM)?.origin().z - front.origin().z;
        let half_inner_w = config.case_inner_width() / 2.0;
        let half_inner_l = config.case_inner_length() / 2.0;
        for p in rca_video.iter().chain(&rca_audio).chain(std::iter::once(&vga)) {
            check_fits(p, frames::FRONT_OUTER, [-half_inner_w, v_min, half_inner_w, v_max])?;
        }
        check_fits(&scart, frames::LEFT_OUTER, [-half_inner_l, v_min, half_inner_l, v_max])?;

        let rim = frames.get(frames::RIM)?;
        let lid = rect_at(rim, "lid", 0.0, 0.0, outer_w, outer_l)?;
        let lid_thickness = frames.depth_between(frames::RIM, frames::LID_TOP)?;

        let holder = holder_layout(config, frames)?;

        debug!(
            rca = rca_video.len() + rca_audio.len(),
            front_cut_depth, left_cut_depth, "computed enclosure layout"
        );

        Ok(Self {
            board: board_placement,
            board_holes,
            board_thickness: frames.depth_between(frames::BOARD, frames::BOARD_TOP)?,
            floor,
            floor_thickness,
            pillars,
            pillar_height,
            walls_outer,
            walls_inner,
            wall_height,
            rca_video,
            rca_audio,
            vga,
            front_cut_depth,
            scart,
            left_cut_depth,
            lid,
            lid_thickness,
            holder_block: holder.block,
            holder_thickness: holder.thickness,
            holder_hollow: holder.hollow,
            hollow_depth: holder.hollow_depth,
            neck_ledges: holder.neck_ledges,
            neck_height: holder.neck_height,
            audio_block: holder.audio_block,
            audio_depth: holder.audio_depth,
            plank: holder.plank,
            plank_thickness: holder.plank_thickness,
        })
    }
}

pub fn corner_name(corner: Corner) -> &'static str {
    match corner {
        Corner::FrontLeft => "front_left",
        Corner::FrontRight => "front_right",
        Corner::RearLeft => "rear_left",
        Corner::RearRight => "rear_right",
    }
}

fn rect_at(
    frame: &ReferenceFrame,
    label: &str,
    u: f64,
    v: f64,
    width: f64,
    height: f64,
) -> Result<FeaturePlacement, PlacementError> {
    FeaturePlacement::on(
        frame,
        label,
        Point2::new(u, v),
        Some(Shape2D::rectangle(width, height)),
    )
}

/// Video jacks run left from the reference jack, audio jacks right of it.
fn rca_rows(
    config: &EnclosureConfig,
    front: &ReferenceFrame,
) -> Result<(Vec<FeaturePlacement>, Vec<FeaturePlacement>), PlacementError> {
    let board = &config.board;
    let rca = &config.rca;
    let radius = (rca.jack_diameter + rca.hole_margin) / 2.0;
    let ref_u = board.width / 2.0 - (rca.right_edge_inset - rca.jack_diameter / 2.0);
    let v = rca.top_height - rca.jack_diameter / 2.0 - board.thickness / 2.0;

    let video = linear_connector_row(
        ref_u,
        -rca.pitch,
        connector_count("rca.video_count", rca.video_count)?,
    )?;
    let audio = linear_connector_row(
        ref_u + rca.pitch,
        rca.pitch,
        connector_count("rca.audio_count", rca.audio_count)?,
    )?;

    let place = |kind: &str, row: Vec<f64>| {
        row.into_iter()
            .enumerate()
            .map(|(i, u)| {
                FeaturePlacement::on(
                    front,
                    format!("rca_{kind}_{i}"),
                    Point2::new(u, v),
                    Some(Shape2D::circle(radius)),
                )
            })
            .collect::<Result<Vec<_>, _>>()
    };
    Ok((place("video", video)?, place("audio", audio)?))
}

/// The VGA opening runs from the board top up to the socket top.
fn vga_cutout(config: &EnclosureConfig, front: &ReferenceFrame) -> Result<FeaturePlacement, PlacementError> {
    let board = &config.board;
    let vga = &config.vga;
    let height = vga.top_height - board.thickness;
    rect_at(
        front,
        "vga",
        vga.right_side_from_left_edge - vga.width / 2.0 - board.width / 2.0,
        board.thickness / 2.0 + height / 2.0,
        vga.width,
        height,
    )
}

/// Reject a cutout whose outline leaves `[u0, v0, u1, v1]` on its own frame.
fn check_fits(p: &FeaturePlacement, face: &str, allowed: [f64; 4]) -> Result<(), EngineError> {
    let Some(shape) = p.placed_shape() else {
        return Ok(());
    };
    let [u0, v0, u1, v1] = shape.bounds();
    if u0 <= allowed[0] || v0 <= allowed[1] || u1 >= allowed[2] || v1 >= allowed[3] {
        return Err(EngineError::FeatureOutsideFace {
            label: p.label.clone(),
            face: face.to_string(),
            reason: format!("outline [{u0}, {v0}, {u1}, {v1}] leaves {allowed:?}"),
        });
    }
    Ok(())
}

struct HolderLayout {
    block: FeaturePlacement,
    thickness: f64,
    hollow: FeaturePlacement,
    hollow_depth: f64,
    neck_ledges: Vec<FeaturePlacement>,
    neck_height: f64,
    audio_block: FeaturePlacement,
    audio_depth: f64,
    plank: FeaturePlacement,
    plank_thickness: f64,
}

fn holder_layout(config: &EnclosureConfig, frames: &EnclosureFrames) -> Result<HolderLayout, EngineError> {
    let h = &config.hdmi_holder;
    let base = frames.get(frames::HOLDER)?;
    let top = frames.get(frames::HOLDER_TOP)?;

    let block = rect_at(base, "holder.block", 0.0, 0.0, h.width, h.length)?;
    let thickness = frames.depth_between(frames::HOLDER, frames::HOLDER_TOP)?;

    // Hollow for the adapter body, open at both ends of the holder.
    let hollow_frame = top.offset_along_normal("hdmi_holder.hollow", CUT_OVERSHOOT)?;
    let hollow_width = clearance_adjusted_size(h.adapter_width, h.fit)?;
    let hollow = rect_at(
        &hollow_frame,
        "holder.hollow",
        0.0,
        0.0,
        hollow_width,
        h.length + 2.0 * CUT_OVERSHOOT,
    )?;

    // Two ledges either side of the neck narrow the hollow.
    let neck_v = h.neck_position - h.length / 2.0;
    let ledge_width = (h.width - h.neck_width) / 2.0;
    let ledge_u = h.neck_width / 2.0 + ledge_width / 2.0;
    let neck_ledges = [("left", -ledge_u), ("right", ledge_u)]
        .into_iter()
        .map(|(side, u)| {
            rect_at(
                base,
                &format!("holder.neck_ledge.{side}"),
                u,
                neck_v,
                ledge_width,
                h.neck_length,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let audio_u = h.width / 2.0
        - h.audio_near_pcb_width
        - h.audio_hole_width / 2.0
        - (h.width - h.adapter_width) / 2.0;
    let audio_block = rect_at(
        top,
        "holder.audio_block",
        audio_u,
        -h.length / 2.0,
        h.audio_hole_width,
        h.audio_hole_length,
    )?;
    let audio_depth = frames.depth_between(frames::HOLDER_TOP, frames::HOLDER)?;

    let plank = rect_at(
        frames.get(frames::PLANK)?,
        "plank",
        0.0,
        0.0,
        h.adapter_width - h.plank_margin,
        h.neck_length,
    )?;

    Ok(HolderLayout {
        block,
        thickness,
        hollow,
        hollow_depth: -(h.hollow_depth + CUT_OVERSHOOT),
        neck_ledges,
        neck_height: h.neck_height,
        audio_block,
        audio_depth,
        plank,
        plank_thickness: h.thickness - h.neck_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn layout_for(config: &EnclosureConfig) -> Result<EnclosureLayout, EngineError> {
        let frames = EnclosureFrames::derive(config)?;
        EnclosureLayout::compute(config, &frames)
    }

    fn layout() -> EnclosureLayout {
        layout_for(&EnclosureConfig::default()).unwrap()
    }

    #[test]
    fn pillars_sit_under_matching_board_holes() {
        let l = layout();
        assert_eq!(l.pillars.len(), 4);
        for (pillar, (corner, hole)) in l.pillars.iter().zip(&l.board_holes) {
            assert_eq!(pillar.corner, *corner);
            assert_relative_eq!(pillar.body.world.x, hole.world.x, epsilon = 1e-12);
            assert_relative_eq!(pillar.body.world.y, hole.world.y, epsilon = 1e-12);
            assert_relative_eq!(pillar.body.world.z, -5.0, epsilon = 1e-12);
        }
        assert_eq!(l.board_holes[0].0, Corner::FrontLeft);
        assert_relative_eq!(
            l.board_holes[0].1.world,
            Point3::new(-54.75, -46.75, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(l.pillar_height, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rca_rows_from_reference_jack() {
        let l = layout();
        let video: Vec<f64> = l.rca_video.iter().map(|p| p.local.x).collect();
        let audio: Vec<f64> = l.rca_audio.iter().map(|p| p.local.x).collect();
        assert_eq!(video.len(), 3);
        assert_eq!(audio.len(), 2);
        for (got, want) in video.iter().zip([23.05, 9.25, -4.55]) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
        for (got, want) in audio.iter().zip([36.85, 50.65]) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
        // Jack centres 8.05 mm above the board bottom, on the board front.
        assert_relative_eq!(l.rca_video[0].world.z, 8.05, epsilon = 1e-9);
        assert_relative_eq!(l.rca_video[0].world.y, -50.5, epsilon = 1e-9);
        match l.rca_video[0].shape {
            Some(Shape2D::Circle { radius }) => assert_relative_eq!(radius, 4.65, epsilon = 1e-12),
            other => panic!("unexpected jack shape {other:?}"),
        }
    }

    #[test]
    fn vga_spans_board_top_to_socket_top() {
        let l = layout();
        let [u0, v0, u1, v1] = l.vga.placed_shape().unwrap().bounds();
        assert_relative_eq!(u0, -45.0, epsilon = 1e-9);
        assert_relative_eq!(u1, -14.0, epsilon = 1e-9);
        // v is measured from mid board thickness.
        assert_relative_eq!(v0 + 0.84, 1.68, epsilon = 1e-9);
        assert_relative_eq!(v1 + 0.84, 14.2, epsilon = 1e-9);
    }

    #[test]
    fn cutouts_reach_just_past_the_outer_walls() {
        let l = layout();
        assert_relative_eq!(l.front_cut_depth, 7.5 + CUT_OVERSHOOT, epsilon = 1e-12);
        assert_relative_eq!(l.left_cut_depth, 7.5 + CUT_OVERSHOOT, epsilon = 1e-12);
        assert_relative_eq!(l.scart.world, Point3::new(-58.5, 0.0, 25.84), epsilon = 1e-9);
    }

    #[test]
    fn case_dimensions() {
        let l = layout();
        assert_relative_eq!(l.floor_thickness, 5.0, epsilon = 1e-12);
        assert_relative_eq!(l.wall_height, 45.0, epsilon = 1e-12);
        assert_relative_eq!(l.lid_thickness, 5.0, epsilon = 1e-12);
        assert_eq!(l.walls_inner.shape, Some(Shape2D::rectangle(122.0, 106.0)));
    }

    #[test]
    fn holder_features() {
        let l = layout();
        assert_relative_eq!(l.holder_thickness, 8.0, epsilon = 1e-12);
        match l.holder_hollow.shape {
            Some(Shape2D::Rectangle { width, .. }) => {
                assert_relative_eq!(width, 31.814, epsilon = 1e-9)
            }
            other => panic!("unexpected hollow shape {other:?}"),
        }
        assert_relative_eq!(l.holder_hollow.world.z, 8.0 + CUT_OVERSHOOT, epsilon = 1e-12);
        assert_relative_eq!(l.hollow_depth, -6.0 - CUT_OVERSHOOT, epsilon = 1e-12);

        assert_eq!(l.neck_ledges.len(), 2);
        assert_relative_eq!(l.neck_ledges[0].local.x, -12.275, epsilon = 1e-9);
        assert_relative_eq!(l.neck_ledges[1].local.y, 10.9, epsilon = 1e-9);

        assert_relative_eq!(l.audio_block.local.x, 9.72, epsilon = 1e-9);
        assert_relative_eq!(l.audio_depth, -8.0, epsilon = 1e-12);
        assert_relative_eq!(l.plank_thickness, 2.6, epsilon = 1e-9);
        assert_eq!(l.plank.shape, Some(Shape2D::rectangle(31.56 - 5.0, 9.0)));
    }

    #[test]
    fn zero_audio_jacks_is_an_empty_row() {
        let mut config = EnclosureConfig::default();
        config.rca.audio_count = 0;
        assert!(layout_for(&config).unwrap().rca_audio.is_empty());
    }

    #[test]
    fn scart_above_the_rim_is_rejected() {
        let mut config = EnclosureConfig::default();
        config.scart.vertical_offset = 40.0;
        match layout_for(&config) {
            Err(EngineError::FeatureOutsideFace { label, face, .. }) => {
                assert_eq!(label, "scart");
                assert_eq!(face, frames::LEFT_OUTER);
            }
            other => panic!("expected FeatureOutsideFace, got {other:?}"),
        }
    }

    #[test]
    fn too_many_rca_jacks_run_into_the_side_wall() {
        let mut config = EnclosureConfig::default();
        config.rca.audio_count = 3;
        assert!(matches!(
            layout_for(&config),
            Err(EngineError::FeatureOutsideFace { .. })
        ));
    }
}
