use std::f64::consts::TAU;

use crate::{
    eval::envelope::fade_intensity,
    foundation::core::FrameBuffer,
    project::model::{BrightnessMode, Clip, ClipKind, EffectType, Project, RasterFrame},
};

/// Add one clip's contribution at `local_ms` into `out`.
///
/// `cell` is the grid position for pattern clips. Pattern clips evaluated without a position
/// contribute nothing, as do pattern clips whose asset is missing or whose raster does not
/// cover the cell. Contributions are applied with channel-wise max.
pub fn evaluate_clip(
    project: &Project,
    clip: &Clip,
    local_ms: f64,
    cell: Option<(u32, u32)>,
    out: &mut FrameBuffer,
) {
    let intensity = fade_intensity(clip, local_ms);
    match clip.kind {
        ClipKind::Effect => {
            out.raise_channels(&clip.channels, effect_level(clip, local_ms, intensity));
        }
        ClipKind::Pattern => {
            let Some((row, col)) = cell else {
                return;
            };
            if let Some(level) = pattern_level(project, clip, local_ms, intensity, row, col) {
                out.raise_channels(&clip.channels, level);
            }
        }
    }
}

/// Level of an effect clip at `local_ms` for a given envelope `intensity`.
pub fn effect_level(clip: &Clip, local_ms: f64, intensity: f64) -> u8 {
    let level = match clip.effect_type {
        EffectType::Flash => 255.0 * intensity,
        EffectType::Pulse | EffectType::Strobe => {
            let phase = (local_ms / 1000.0 * TAU * clip.speed).sin();
            255.0 * intensity * ((phase + 1.0) / 2.0)
        }
    };
    to_level(level)
}

/// Index into the asset's frame list shown at `local_ms`.
///
/// The clip plays the asset `repetitions` times and then holds the last frame. Returns `None`
/// for an empty asset or a non-positive frame duration.
pub fn asset_frame_index(clip: &Clip, frame_count: usize, local_ms: f64) -> Option<usize> {
    let frame_ms = clip.asset_frame_duration();
    if frame_count == 0 || !frame_ms.is_finite() || frame_ms <= 0.0 {
        return None;
    }
    let total = frame_count.saturating_mul(clip.repetitions.max(1) as usize);
    let raw = (local_ms / frame_ms).floor();
    let clamped = if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as usize).min(total - 1)
    };
    Some(clamped % frame_count)
}

/// Brightness of an RGBA pixel: Rec.601 luminance scaled by alpha, floored.
pub fn pixel_brightness(px: [u8; 4]) -> u8 {
    let [r, g, b, a] = px.map(f64::from);
    let lum = 0.299 * r + 0.587 * g + 0.114 * b;
    to_level(lum * (a / 255.0))
}

fn pattern_level(
    project: &Project,
    clip: &Clip,
    local_ms: f64,
    intensity: f64,
    row: u32,
    col: u32,
) -> Option<u8> {
    let asset_id = clip.asset_id.as_deref()?;
    let Some(asset) = project.assets.get(asset_id) else {
        tracing::debug!(clip = %clip.id, asset = asset_id, "pattern clip references a missing asset");
        return None;
    };
    let index = asset_frame_index(clip, asset.frames.len(), local_ms)?;
    let frame: &RasterFrame = asset.frames.get(index)?;
    let brightness = pixel_brightness(frame.pixel(row, col)?);
    let brightness = match clip.brightness_mode {
        BrightnessMode::Gradient => brightness,
        BrightnessMode::Binary if brightness > clip.brightness_threshold => 255,
        BrightnessMode::Binary => 0,
    };
    Some(to_level(f64::from(brightness) * intensity))
}

fn to_level(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.floor().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/eval/clip.rs"]
mod tests;
