use super::*;

fn flash(id: &str, start: f64, duration: f64) -> Clip {
    Clip {
        start_time: start,
        duration,
        channels: vec![0],
        ..Clip::new(id)
    }
}

#[test]
fn clip_interval_is_half_open() {
    let c = flash("c", 100.0, 50.0);
    assert!(!c.contains(99.9));
    assert!(c.contains(100.0));
    assert!(c.contains(149.9));
    assert!(!c.contains(150.0));
}

#[test]
fn first_clip_in_stored_order_wins_on_overlap() {
    let layer = Layer {
        id: "l".to_owned(),
        name: "l".to_owned(),
        muted: false,
        clips: vec![flash("late", 0.0, 1000.0), flash("early", 0.0, 500.0)],
    };
    assert_eq!(layer.active_clip(100.0).unwrap().id, "late");
    assert!(layer.active_clip(1000.0).is_none());
}

#[test]
fn validate_rejects_non_positive_duration_and_pattern_speed() {
    let err = flash("a", 0.0, 0.0).validate(48).unwrap_err();
    assert!(err.to_string().contains("duration"));

    let mut c = flash("b", 0.0, 10.0);
    c.pattern_speed = 0.0;
    let err = c.validate(48).unwrap_err();
    assert!(err.to_string().contains("patternSpeed"));
}

#[test]
fn speed_is_only_checked_for_oscillating_effects() {
    let mut c = flash("s", 0.0, 10.0);
    c.speed = 0.0;
    c.validate(48).unwrap();

    c.effect_type = EffectType::Pulse;
    assert!(c.validate(48).unwrap_err().to_string().contains("speed"));
    c.effect_type = EffectType::Strobe;
    assert!(c.validate(48).is_err());
}

#[test]
fn validate_names_bad_channel_index() {
    let mut c = flash("c", 0.0, 10.0);
    c.channels = vec![0, 48];
    let err = c.validate(48).unwrap_err().to_string();
    assert!(err.contains("clip 'c'"));
    assert!(err.contains("48"));

    c.channels = vec![-1];
    assert!(c.validate(48).is_err());
}

#[test]
fn validate_pattern_timing_fields() {
    let mut c = flash("p", 0.0, 10.0);
    c.kind = ClipKind::Pattern;
    c.timing_mode = TimingMode::Beat;
    c.bpm = 0.0;
    assert!(c.validate(48).unwrap_err().to_string().contains("bpm"));

    c.bpm = 120.0;
    c.repetitions = 0;
    assert!(c.validate(48).unwrap_err().to_string().contains("repetitions"));
}

#[test]
fn json_uses_editor_field_names_and_defaults() {
    let json = r#"{
        "layers": [{
            "id": "layer-1",
            "name": "Main Track",
            "clips": [{
                "id": "c1",
                "startTime": 250,
                "type": "pattern",
                "channels": [0, 1],
                "patternDirection": "diagonal-left",
                "timingMode": "beat",
                "brightnessMode": "binary"
            }]
        }],
        "duration": 60000
    }"#;
    let p: Project = serde_json::from_str(json).unwrap();
    assert_eq!(p.channel_count, 48);
    let c = &p.layers[0].clips[0];
    assert_eq!(c.kind, ClipKind::Pattern);
    assert_eq!(c.duration, 1000.0);
    assert_eq!(c.pattern, SpatialPattern::Uniform);
    assert_eq!(c.pattern_direction, PatternDirection::DiagonalLeft);
    assert_eq!(c.timing_mode, TimingMode::Beat);
    assert_eq!(c.brightness_mode, BrightnessMode::Binary);
    assert_eq!(c.brightness_threshold, 128);
    assert_eq!(c.repetitions, 1);
    assert!(p.has_positional_clips());
    p.validate().unwrap();
}

#[test]
fn asset_frame_duration_by_timing_mode() {
    let mut c = Clip::new("p");
    c.frame_duration = 80.0;
    assert_eq!(c.asset_frame_duration(), 80.0);
    c.timing_mode = TimingMode::Beat;
    c.bpm = 120.0;
    c.beats_per_frame = 2.0;
    assert_eq!(c.asset_frame_duration(), 1000.0);
}

#[test]
fn fitted_duration_covers_all_frames_and_repetitions() {
    let frame = RasterFrame::new(1, 1, vec![0, 0, 0, 255]).unwrap();
    let asset = Asset {
        width: 1,
        height: 1,
        fps: 12.0,
        frame_duration_ms: None,
        frames: vec![frame.clone(), frame.clone(), frame],
    };
    let mut c = Clip::new("p");
    c.kind = ClipKind::Pattern;
    c.repetitions = 2;
    assert_eq!(c.fitted_duration(Some(&asset)), 600.0);
    assert_eq!(c.fitted_duration(None), 200.0);
}

#[test]
fn raster_pixel_bounds() {
    let f = RasterFrame::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(f.pixel(0, 1), Some([5, 6, 7, 8]));
    assert_eq!(f.pixel(1, 0), None);
    assert!(RasterFrame::new(2, 2, vec![0; 3]).is_err());
}
