use approx::assert_relative_eq;
use enclosure_kernel::{KernelIntrospect, MockKernel, TopoKind};
use enclosure_model::*;

fn build_default() -> (MockKernel, EnclosureModel) {
    let mut kernel = MockKernel::new();
    let model = build_enclosure(EnclosureConfig::default(), &mut kernel).unwrap();
    (kernel, model)
}

fn steps_of(model: &EnclosureModel, part: PartName) -> Vec<&str> {
    model
        .build_log
        .iter()
        .filter(|s| s.part == part)
        .map(|s| s.name.as_str())
        .collect()
}

#[test]
fn default_config_builds_every_part() {
    let (kernel, model) = build_default();
    for name in PartName::ALL {
        let part = model.part(name).unwrap();
        assert_eq!(part.name, name);
        assert!(!kernel.list_faces(&part.handle).is_empty(), "{name:?} has no faces");
    }
}

#[test]
fn build_log_follows_build_order() {
    let (_, model) = build_default();
    assert_eq!(model.build_log.first().unwrap().name, "board");
    assert_eq!(model.build_log.last().unwrap().name, "plank");

    assert_eq!(
        steps_of(&model, PartName::Case),
        vec![
            "floor",
            "pillar.front_left",
            "pillar.front_right",
            "pillar.rear_left",
            "pillar.rear_right",
            "walls",
            "rca_video_0",
            "rca_video_1",
            "rca_video_2",
            "rca_audio_0",
            "rca_audio_1",
            "vga",
            "scart",
        ]
    );
    assert_eq!(
        steps_of(&model, PartName::HdmiHolder),
        vec![
            "holder.block",
            "holder.hollow",
            "holder.neck_ledge.left",
            "holder.neck_ledge.right",
            "holder.audio_block",
        ]
    );

    let mut ids: Vec<_> = model.build_log.iter().map(|s| s.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), model.build_log.len());
}

#[test]
fn tagged_faces_stay_on_their_frames() {
    let (kernel, model) = build_default();
    let tagged = [
        (PartName::Case, FaceTag::FloorBottom),
        (PartName::Case, FaceTag::FloorTop),
        (PartName::Case, FaceTag::FrontOuterWall),
        (PartName::Case, FaceTag::BackOuterWall),
        (PartName::Case, FaceTag::LeftOuterWall),
        (PartName::Case, FaceTag::RightOuterWall),
        (PartName::Lid, FaceTag::LidBottom),
        (PartName::Lid, FaceTag::LidTop),
        (PartName::HdmiHolder, FaceTag::HolderTop),
        (PartName::HdmiHolder, FaceTag::HolderBottom),
    ];
    for (part, tag) in tagged {
        model.face(part, tag).unwrap();
    }
    assert!(model.verify_tags(&kernel).is_empty());
    assert!(model.warnings.iter().all(|w| !w.contains("lost")));
}

#[test]
fn front_wall_tag_points_out_of_the_front() {
    let (kernel, model) = build_default();
    let face = model.face(PartName::Case, FaceTag::FrontOuterWall).unwrap();
    let sig = kernel.compute_signature(face, TopoKind::Face);
    let normal = sig.normal.unwrap();
    let centroid = sig.centroid.unwrap();
    assert_relative_eq!(normal[1], -1.0, epsilon = 1e-9);
    let front = model.frames.get(frames::FRONT_OUTER).unwrap();
    assert_relative_eq!(centroid[1], front.origin().y, epsilon = 1e-9);
}

#[test]
fn lid_and_holder_tops_sit_at_their_heights() {
    let (kernel, model) = build_default();
    let lid_top = model.face(PartName::Lid, FaceTag::LidTop).unwrap();
    let holder_top = model.face(PartName::HdmiHolder, FaceTag::HolderTop).unwrap();
    let z = |face| kernel.compute_signature(face, TopoKind::Face).centroid.unwrap()[2];
    assert_relative_eq!(z(lid_top), 45.0, epsilon = 1e-9);
    assert_relative_eq!(z(holder_top), 8.0, epsilon = 1e-9);
}

#[test]
fn pcb_and_plank_carry_no_tags() {
    let (_, model) = build_default();
    assert!(model.part(PartName::Pcb).unwrap().tags.is_empty());
    assert!(model.part(PartName::HdmiHolderPlank).unwrap().tags.is_empty());
    assert!(matches!(
        model.face(PartName::Pcb, FaceTag::FloorTop),
        Err(EngineError::MissingTag { part: PartName::Pcb, .. })
    ));
}

#[test]
fn lid_edge_fillet_rounds_the_top_edges() {
    let mut config = EnclosureConfig::default();
    config.lid.edge_fillet = Some(1.5);
    let mut kernel = MockKernel::new();
    let model = build_enclosure(config, &mut kernel).unwrap();

    let lid = model.part(PartName::Lid).unwrap();
    // Six prism faces plus one blend per top edge.
    assert_eq!(kernel.list_faces(&lid.handle).len(), 10);
    assert_eq!(steps_of(&model, PartName::Lid), vec!["lid", "lid.edge_fillet"]);

    let top = model.face(PartName::Lid, FaceTag::LidTop).unwrap();
    let blends = kernel
        .list_faces(&lid.handle)
        .into_iter()
        .filter(|f| {
            kernel.compute_signature(*f, TopoKind::Face).surface_type.as_deref() == Some("cylindrical")
        })
        .count();
    assert_eq!(blends, 4);
    assert!(kernel.list_faces(&lid.handle).contains(&top));
}

#[test]
fn invalid_config_is_rejected_before_building() {
    let mut config = EnclosureConfig::default();
    config.board.width = -117.0;
    let err = EnclosureBuilder::new(config).unwrap_err();
    assert!(err.to_string().contains("board.width"), "{err}");
}

#[test]
fn cutout_above_the_rim_is_reported_by_label() {
    let mut config = EnclosureConfig::default();
    config.scart.vertical_offset = 45.0;
    let mut kernel = MockKernel::new();
    let err = build_enclosure(config, &mut kernel).unwrap_err();
    match err {
        EngineError::FeatureOutsideFace { label, face, .. } => {
            assert_eq!(label, "scart");
            assert_eq!(face, frames::LEFT_OUTER);
        }
        other => panic!("expected FeatureOutsideFace, got {other:?}"),
    }
}

#[test]
fn tessellate_all_meshes_every_part() {
    let (mut kernel, model) = build_default();
    let meshes = model.tessellate_all(&mut kernel, 0.1).unwrap();
    assert_eq!(meshes.len(), PartName::ALL.len());
    for (name, mesh) in &meshes {
        assert!(!mesh.indices.is_empty(), "{name:?} mesh is empty");
    }
    assert!(model.tessellate_all(&mut kernel, 0.0).is_err());
}

#[test]
fn builds_are_repeatable() {
    let (k1, m1) = build_default();
    let (k2, m2) = build_default();
    let names = |m: &EnclosureModel| m.build_log.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&m1), names(&m2));
    for name in PartName::ALL {
        assert_eq!(
            k1.list_faces(&m1.part(name).unwrap().handle).len(),
            k2.list_faces(&m2.part(name).unwrap().handle).len()
        );
        let tags1: Vec<_> = m1.part(name).unwrap().tags.iter().map(|(t, _)| t).collect();
        let tags2: Vec<_> = m2.part(name).unwrap().tags.iter().map(|(t, _)| t).collect();
        assert_eq!(tags1, tags2);
    }
}

#[test]
fn config_from_json_builds() {
    let json = r#"{ "rca": { "audio_count": 0 }, "lid": { "thickness": 3.0 } }"#;
    let config = EnclosureConfig::from_json(json).unwrap();
    let mut kernel = MockKernel::new();
    let model = build_enclosure(config, &mut kernel).unwrap();
    assert!(steps_of(&model, PartName::Case).iter().all(|s| !s.starts_with("rca_audio")));
    let lid_top = model.face(PartName::Lid, FaceTag::LidTop).unwrap();
    let z = kernel.compute_signature(lid_top, TopoKind::Face).centroid.unwrap()[2];
    assert_relative_eq!(z, 43.0, epsilon = 1e-9);
}
