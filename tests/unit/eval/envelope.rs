use super::*;

fn clip(duration: f64, fade_in: f64, fade_out: f64) -> Clip {
    Clip {
        duration,
        fade_in,
        fade_out,
        ..Clip::new("c")
    }
}

#[test]
fn no_fades_is_full_intensity() {
    let c = clip(1000.0, 0.0, 0.0);
    assert_eq!(fade_intensity(&c, 0.0), 1.0);
    assert_eq!(fade_intensity(&c, 999.0), 1.0);
}

#[test]
fn fade_in_ramps_linearly() {
    let c = clip(1000.0, 500.0, 0.0);
    assert_eq!(fade_intensity(&c, 0.0), 0.0);
    assert_eq!(fade_intensity(&c, 250.0), 0.5);
    assert_eq!(fade_intensity(&c, 500.0), 1.0);
}

#[test]
fn fade_out_ramps_down_to_the_end() {
    let c = clip(1000.0, 0.0, 200.0);
    assert_eq!(fade_intensity(&c, 800.0), 1.0);
    assert_eq!(fade_intensity(&c, 900.0), 0.5);
    assert!(fade_intensity(&c, 999.0) < 0.01);
}

#[test]
fn out_of_interval_times_are_clamped() {
    let c = clip(1000.0, 100.0, 100.0);
    assert_eq!(fade_intensity(&c, -50.0), 0.0);
    assert_eq!(fade_intensity(&c, 1200.0), 0.0);
}
