use crate::project::model::Clip;

/// Linear fade envelope of `clip` at `local_ms` (time since clip start), in `[0, 1]`.
///
/// Fade-in wins over fade-out when both windows overlap. Zero-length fades are skipped, so a
/// clip without fades is at full intensity across its whole interval.
pub fn fade_intensity(clip: &Clip, local_ms: f64) -> f64 {
    let intensity = if local_ms < clip.fade_in {
        local_ms / clip.fade_in
    } else if local_ms > clip.duration - clip.fade_out {
        (clip.duration - local_ms) / clip.fade_out
    } else {
        1.0
    };
    if intensity.is_nan() {
        return 0.0;
    }
    intensity.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/eval/envelope.rs"]
mod tests;
