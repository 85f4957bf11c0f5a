use super::*;

#[test]
fn builder_produces_validated_project() {
    let project = ProjectBuilder::new(2000.0)
        .layer(
            LayerBuilder::new("main")
                .clip(
                    ClipBuilder::effect("c0", 0.0, 1000.0, [0, 1])
                        .effect_type(EffectType::Pulse, 2.0)
                        .fades(100.0, 100.0)
                        .build(),
                )
                .build(),
        )
        .build()
        .unwrap();

    assert_eq!(project.layers.len(), 1);
    let clip = &project.layers[0].clips[0];
    assert_eq!(clip.effect_type, EffectType::Pulse);
    assert_eq!(clip.speed, 2.0);
    assert_eq!(clip.channels, vec![0, 1]);
}

#[test]
fn builder_rejects_invalid_clip() {
    let err = ProjectBuilder::new(1000.0)
        .layer(
            LayerBuilder::new("main")
                .clip(ClipBuilder::effect("bad", 0.0, -5.0, [0]).build())
                .build(),
        )
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("clip 'bad'"));
}

#[test]
fn duplicate_asset_ids_are_rejected() {
    let asset = Asset {
        width: 1,
        height: 1,
        fps: 12.0,
        frame_duration_ms: None,
        frames: vec![],
    };
    let b = ProjectBuilder::new(1000.0).asset("a", asset.clone()).unwrap();
    assert!(b.asset("a", asset).is_err());
}

#[test]
fn pattern_builder_sets_kind_and_asset() {
    let clip = ClipBuilder::pattern("p", 0.0, 500.0, [3], "gif")
        .beat_timing(90.0, 0.5)
        .repetitions(3)
        .brightness(BrightnessMode::Binary, 64)
        .build_checked(48)
        .unwrap();
    assert_eq!(clip.kind, ClipKind::Pattern);
    assert_eq!(clip.asset_id.as_deref(), Some("gif"));
    assert_eq!(clip.timing_mode, TimingMode::Beat);
    assert_eq!(clip.repetitions, 3);
    assert_eq!(clip.brightness_threshold, 64);
}
