use super::*;
use crate::project::{
    dsl::ClipBuilder,
    model::{Asset, TimingMode},
};

fn eval_at(project: &Project, clip: &Clip, local_ms: f64, cell: Option<(u32, u32)>) -> u8 {
    let mut out = FrameBuffer::new(4);
    evaluate_clip(project, clip, local_ms, cell, &mut out);
    out.get(0).unwrap()
}

fn checker_asset() -> Asset {
    // frame 0: white at (0,0), black at (0,1); frame 1: the reverse
    let white = [255, 255, 255, 255];
    let black = [0, 0, 0, 255];
    let f0 = RasterFrame::new(2, 1, [white, black].concat()).unwrap();
    let f1 = RasterFrame::new(2, 1, [black, white].concat()).unwrap();
    Asset {
        width: 2,
        height: 1,
        fps: 10.0,
        frame_duration_ms: Some(100.0),
        frames: vec![f0, f1],
    }
}

fn project_with_asset() -> Project {
    let mut p = Project::default();
    p.assets.insert("checker".to_owned(), checker_asset());
    p
}

#[test]
fn flash_fade_in_boundary_values() {
    let p = Project::default();
    let clip = ClipBuilder::effect("f", 0.0, 1000.0, [0]).fades(500.0, 0.0).build();
    assert_eq!(eval_at(&p, &clip, 0.0, None), 0);
    assert_eq!(eval_at(&p, &clip, 250.0, None), 127);
    assert_eq!(eval_at(&p, &clip, 500.0, None), 255);
}

#[test]
fn pulse_follows_one_period_of_the_sine() {
    let p = Project::default();
    let clip = ClipBuilder::effect("p", 0.0, 2000.0, [0])
        .effect_type(EffectType::Pulse, 1.0)
        .build();
    let values: Vec<u8> = [0.0, 250.0, 500.0, 750.0, 1000.0]
        .into_iter()
        .map(|t| eval_at(&p, &clip, t, None))
        .collect();
    assert_eq!(values, vec![127, 255, 127, 0, 127]);
}

#[test]
fn strobe_shares_the_pulse_law() {
    let pulse = ClipBuilder::effect("p", 0.0, 2000.0, [0])
        .effect_type(EffectType::Pulse, 3.0)
        .build();
    let strobe = ClipBuilder::effect("s", 0.0, 2000.0, [0])
        .effect_type(EffectType::Strobe, 3.0)
        .build();
    for t in [0.0, 40.0, 111.0, 333.0, 901.0] {
        assert_eq!(effect_level(&pulse, t, 0.8), effect_level(&strobe, t, 0.8));
    }
}

#[test]
fn pattern_samples_the_cell_pixel() {
    let p = project_with_asset();
    let clip = ClipBuilder::pattern("pat", 0.0, 1000.0, [0], "checker")
        .frame_timing(100.0)
        .build();
    assert_eq!(eval_at(&p, &clip, 50.0, Some((0, 0))), 255);
    assert_eq!(eval_at(&p, &clip, 50.0, Some((0, 1))), 0);
    assert_eq!(eval_at(&p, &clip, 150.0, Some((0, 0))), 0);
    assert_eq!(eval_at(&p, &clip, 150.0, Some((0, 1))), 255);
}

#[test]
fn pattern_holds_last_frame_after_repetitions() {
    let clip = ClipBuilder::pattern("pat", 0.0, 5000.0, [0], "checker")
        .frame_timing(100.0)
        .repetitions(2)
        .build();
    assert_eq!(asset_frame_index(&clip, 2, 250.0), Some(0));
    assert_eq!(asset_frame_index(&clip, 2, 350.0), Some(1));
    assert_eq!(asset_frame_index(&clip, 2, 4000.0), Some(1));
    assert_eq!(asset_frame_index(&clip, 0, 0.0), None);
}

#[test]
fn beat_timing_derives_frame_duration_from_bpm() {
    let clip = ClipBuilder::pattern("pat", 0.0, 5000.0, [0], "checker")
        .beat_timing(120.0, 2.0)
        .repetitions(5)
        .build();
    assert_eq!(clip.timing_mode, TimingMode::Beat);
    assert_eq!(asset_frame_index(&clip, 2, 999.0), Some(0));
    assert_eq!(asset_frame_index(&clip, 2, 1000.0), Some(1));
}

#[test]
fn pattern_outside_raster_or_without_asset_contributes_nothing() {
    let p = project_with_asset();
    let clip = ClipBuilder::pattern("pat", 0.0, 1000.0, [0], "checker").build();
    assert_eq!(eval_at(&p, &clip, 0.0, Some((1, 0))), 0);
    assert_eq!(eval_at(&p, &clip, 0.0, Some((0, 5))), 0);
    assert_eq!(eval_at(&p, &clip, 0.0, None), 0);

    let missing = ClipBuilder::pattern("pat", 0.0, 1000.0, [0], "nope").build();
    assert_eq!(eval_at(&p, &missing, 0.0, Some((0, 0))), 0);
}

#[test]
fn binary_mode_thresholds_brightness() {
    let mut p = Project::default();
    let grey = RasterFrame::new(1, 1, vec![100, 100, 100, 255]).unwrap();
    p.assets.insert(
        "grey".to_owned(),
        Asset {
            width: 1,
            height: 1,
            fps: 1.0,
            frame_duration_ms: None,
            frames: vec![grey],
        },
    );
    let gradient = ClipBuilder::pattern("g", 0.0, 1000.0, [0], "grey").build();
    let low = ClipBuilder::pattern("b", 0.0, 1000.0, [0], "grey")
        .brightness(BrightnessMode::Binary, 50)
        .build();
    let high = ClipBuilder::pattern("b", 0.0, 1000.0, [0], "grey")
        .brightness(BrightnessMode::Binary, 200)
        .build();
    assert_eq!(eval_at(&p, &gradient, 0.0, Some((0, 0))), 100);
    assert_eq!(eval_at(&p, &low, 0.0, Some((0, 0))), 255);
    assert_eq!(eval_at(&p, &high, 0.0, Some((0, 0))), 0);
}

#[test]
fn alpha_scales_brightness() {
    assert_eq!(pixel_brightness([255, 255, 255, 255]), 255);
    assert_eq!(pixel_brightness([255, 255, 255, 0]), 0);
    assert_eq!(pixel_brightness([200, 200, 200, 51]), 40);
}

#[test]
fn alpha_is_applied_as_a_fraction_before_flooring() {
    assert_eq!(pixel_brightness([0, 180, 35, 200]), 85);
    assert_eq!(pixel_brightness([3, 135, 147, 200]), 75);
    assert_eq!(pixel_brightness([9, 63, 77, 200]), 37);
}
