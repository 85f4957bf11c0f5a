use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::DEFAULT_CHANNEL_COUNT;
use crate::foundation::error::{ShowError, ShowResult};

/// A complete show: ordered layers over a shared asset table.
///
/// A `Project` is a plain value. Rendering borrows it immutably; edits produce a new value
/// (see [`crate::ProjectHistory`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Layers, bottom to top. Blending is order-independent (channel-wise max).
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Total show duration in milliseconds.
    #[serde(default)]
    pub duration: f64,
    /// Pre-computed audio analysis, if any.
    #[serde(default)]
    pub analysis: Option<Analysis>,
    /// Raster assets keyed by asset id.
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
    /// Channels per unit.
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            duration: 0.0,
            analysis: None,
            assets: BTreeMap::new(),
            channel_count: DEFAULT_CHANNEL_COUNT,
        }
    }
}

impl Project {
    /// Validate every clip and the project-level fields.
    pub fn validate(&self) -> ShowResult<()> {
        if self.channel_count == 0 {
            return Err(ShowError::validation("project channelCount must be > 0"));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ShowError::validation(
                "project duration must be finite and >= 0",
            ));
        }
        for layer in &self.layers {
            for clip in &layer.clips {
                clip.validate(self.channel_count)?;
            }
        }
        Ok(())
    }

    /// Find a clip anywhere in the project.
    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        self.layers
            .iter()
            .flat_map(|l| l.clips.iter())
            .find(|c| c.id == clip_id)
    }

    /// Find a layer by id.
    pub fn layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    /// Return `true` when any clip depends on grid position.
    pub fn has_positional_clips(&self) -> bool {
        self.layers
            .iter()
            .flat_map(|l| l.clips.iter())
            .any(Clip::is_positional)
    }
}

fn default_channel_count() -> usize {
    DEFAULT_CHANNEL_COUNT
}

/// Beat and onset timestamps supplied by an external audio analyzer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Audio length in seconds.
    pub duration: f64,
    /// Beat timestamps in seconds.
    #[serde(default)]
    pub beat_times: Vec<f64>,
    /// Onset timestamps in seconds.
    #[serde(default)]
    pub onset_times: Vec<f64>,
    /// Estimated tempo in BPM.
    #[serde(default)]
    pub tempo: Option<f64>,
}

/// An independently mutable track of clips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Stable layer id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Muted layers contribute nothing.
    #[serde(default)]
    pub muted: bool,
    /// Clips in stored order; the first one covering an instant wins.
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Layer {
    /// First clip whose half-open interval contains `t_ms`.
    pub fn active_clip(&self, t_ms: f64) -> Option<&Clip> {
        self.clips.iter().find(|c| c.contains(t_ms))
    }
}

/// What a clip draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    /// Channel effect (flash/pulse/strobe).
    #[default]
    Effect,
    /// Raster-driven pattern; each grid cell samples one pixel of an asset frame.
    Pattern,
}

/// Channel effect law for [`ClipKind::Effect`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectType {
    /// Constant on, shaped only by the fade envelope.
    #[default]
    Flash,
    /// Sine pulse at `speed` Hz.
    Pulse,
    /// Same sine law as [`EffectType::Pulse`].
    Strobe,
}

/// Spatial propagation law across the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialPattern {
    /// Every cell sees the same time.
    #[default]
    Uniform,
    /// Delay grows with distance along a direction.
    Wave,
    /// Delay steps per row or per column.
    Sequential,
    /// Delay grows with distance from (or towards) the grid center.
    Radial,
}

/// Direction parameter of a [`SpatialPattern`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternDirection {
    /// Wave along columns.
    #[default]
    Horizontal,
    /// Wave along rows.
    Vertical,
    /// Wave from the top-left corner.
    DiagonalRight,
    /// Wave from the top-right corner.
    DiagonalLeft,
    /// Sequential, one row at a time.
    RowByRow,
    /// Sequential, one column at a time.
    ColByCol,
    /// Radial, center first.
    Outward,
    /// Radial, corners first.
    Inward,
}

/// How a pattern clip advances through asset frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    /// Fixed `frame_duration` milliseconds per frame.
    #[default]
    Frame,
    /// `beats_per_frame` beats at `bpm` per frame.
    Beat,
}

/// How a sampled pixel becomes a channel level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrightnessMode {
    /// Luminance is used as the level.
    #[default]
    Gradient,
    /// Luminance above the threshold is full on, otherwise off.
    Binary,
}

/// A declarative timed effect over a channel subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Stable clip id.
    pub id: String,
    /// Start in milliseconds.
    #[serde(default)]
    pub start_time: f64,
    /// Length in milliseconds; the active interval is `[start, start + duration)`.
    #[serde(default = "default_clip_duration")]
    pub duration: f64,
    /// Effect or pattern.
    #[serde(rename = "type", default)]
    pub kind: ClipKind,
    /// Target channel indices.
    #[serde(default)]
    pub channels: Vec<i32>,
    /// Effect law.
    #[serde(default)]
    pub effect_type: EffectType,
    /// Effect frequency in Hz.
    #[serde(default = "default_one")]
    pub speed: f64,
    /// Spatial propagation law.
    #[serde(default)]
    pub pattern: SpatialPattern,
    /// Spatial propagation direction.
    #[serde(default)]
    pub pattern_direction: PatternDirection,
    /// Spatial propagation speed multiplier.
    #[serde(default = "default_one")]
    pub pattern_speed: f64,
    /// Fade-in length in milliseconds.
    #[serde(default)]
    pub fade_in: f64,
    /// Fade-out length in milliseconds.
    #[serde(default)]
    pub fade_out: f64,
    /// Asset sampled by a pattern clip.
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Frame advance mode of a pattern clip.
    #[serde(default)]
    pub timing_mode: TimingMode,
    /// Milliseconds per asset frame in [`TimingMode::Frame`].
    #[serde(default = "default_frame_duration")]
    pub frame_duration: f64,
    /// Tempo in [`TimingMode::Beat`].
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Beats per asset frame in [`TimingMode::Beat`].
    #[serde(default = "default_one")]
    pub beats_per_frame: f64,
    /// Times the asset plays before holding its last frame.
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    /// Pixel-to-level mapping.
    #[serde(default)]
    pub brightness_mode: BrightnessMode,
    /// Threshold for [`BrightnessMode::Binary`].
    #[serde(default = "default_threshold")]
    pub brightness_threshold: u8,
}

fn default_clip_duration() -> f64 {
    1000.0
}

fn default_one() -> f64 {
    1.0
}

fn default_frame_duration() -> f64 {
    100.0
}

fn default_bpm() -> f64 {
    120.0
}

fn default_repetitions() -> u32 {
    1
}

fn default_threshold() -> u8 {
    128
}

impl Clip {
    /// A 1-second flash clip with editor defaults.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_time: 0.0,
            duration: default_clip_duration(),
            kind: ClipKind::Effect,
            channels: Vec::new(),
            effect_type: EffectType::Flash,
            speed: 1.0,
            pattern: SpatialPattern::Uniform,
            pattern_direction: PatternDirection::Horizontal,
            pattern_speed: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            asset_id: None,
            timing_mode: TimingMode::Frame,
            frame_duration: default_frame_duration(),
            bpm: default_bpm(),
            beats_per_frame: 1.0,
            repetitions: 1,
            brightness_mode: BrightnessMode::Gradient,
            brightness_threshold: default_threshold(),
        }
    }

    /// Exclusive end of the active interval in milliseconds.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Return `true` when `t_ms` lies in `[start, start + duration)`.
    pub fn contains(&self, t_ms: f64) -> bool {
        t_ms >= self.start_time && t_ms < self.end_time()
    }

    /// Return `true` when the clip's output depends on grid position.
    pub fn is_positional(&self) -> bool {
        self.kind == ClipKind::Pattern || self.pattern != SpatialPattern::Uniform
    }

    /// Milliseconds each asset frame is shown.
    pub fn asset_frame_duration(&self) -> f64 {
        match self.timing_mode {
            TimingMode::Frame => self.frame_duration,
            TimingMode::Beat => (60_000.0 / self.bpm) * self.beats_per_frame,
        }
    }

    /// Clip length that plays every asset frame `repetitions` times, rounded to whole ms.
    ///
    /// A missing asset counts as one frame.
    pub fn fitted_duration(&self, asset: Option<&Asset>) -> f64 {
        let frames = asset.map(|a| a.frames.len()).filter(|&n| n > 0).unwrap_or(1);
        let reps = self.repetitions.max(1);
        (self.asset_frame_duration() * frames as f64 * f64::from(reps)).round()
    }

    /// Reject structurally invalid clips. This is the clip-creation boundary.
    ///
    /// `speed` is only checked for pulse and strobe effects, the only clips that read it.
    pub fn validate(&self, channel_count: usize) -> ShowResult<()> {
        let id = &self.id;
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(ShowError::validation(format!(
                "clip '{id}': startTime must be finite and >= 0"
            )));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ShowError::validation(format!(
                "clip '{id}': duration must be finite and > 0"
            )));
        }
        for (name, value) in [("fadeIn", self.fade_in), ("fadeOut", self.fade_out)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ShowError::validation(format!(
                    "clip '{id}': {name} must be finite and >= 0"
                )));
            }
        }
        let oscillates = self.kind == ClipKind::Effect
            && matches!(self.effect_type, EffectType::Pulse | EffectType::Strobe);
        if oscillates && (!self.speed.is_finite() || self.speed <= 0.0) {
            return Err(ShowError::validation(format!(
                "clip '{id}': speed must be finite and > 0"
            )));
        }
        if !self.pattern_speed.is_finite() || self.pattern_speed <= 0.0 {
            return Err(ShowError::validation(format!(
                "clip '{id}': patternSpeed must be finite and > 0"
            )));
        }
        if let Some(&bad) = self
            .channels
            .iter()
            .find(|&&ch| ch < 0 || ch as usize >= channel_count)
        {
            return Err(ShowError::validation(format!(
                "clip '{id}': channel index {bad} is outside [0, {channel_count})"
            )));
        }
        if self.kind == ClipKind::Pattern {
            match self.timing_mode {
                TimingMode::Frame => {
                    if !self.frame_duration.is_finite() || self.frame_duration <= 0.0 {
                        return Err(ShowError::validation(format!(
                            "clip '{id}': frameDuration must be finite and > 0"
                        )));
                    }
                }
                TimingMode::Beat => {
                    if !self.bpm.is_finite() || self.bpm <= 0.0 {
                        return Err(ShowError::validation(format!(
                            "clip '{id}': bpm must be finite and > 0"
                        )));
                    }
                    if !self.beats_per_frame.is_finite() || self.beats_per_frame <= 0.0 {
                        return Err(ShowError::validation(format!(
                            "clip '{id}': beatsPerFrame must be finite and > 0"
                        )));
                    }
                }
            }
            if self.repetitions == 0 {
                return Err(ShowError::validation(format!(
                    "clip '{id}': repetitions must be >= 1"
                )));
            }
        }
        Ok(())
    }
}

/// An animated raster: ordered RGBA frames of equal size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Nominal playback rate of the source.
    #[serde(default = "default_asset_fps")]
    pub fps: f64,
    /// Explicit per-frame duration of the source in milliseconds, when known.
    #[serde(default)]
    pub frame_duration_ms: Option<f64>,
    /// Frames in playback order.
    pub frames: Vec<RasterFrame>,
}

fn default_asset_fps() -> f64 {
    12.0
}

/// One straight-alpha RGBA8 image, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl RasterFrame {
    /// Create a frame, checking the buffer length.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> ShowResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ShowError::validation(format!(
                "raster frame {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// RGBA of the pixel at (`row`, `col`), or `None` outside the image.
    pub fn pixel(&self, row: u32, col: u32) -> Option<[u8; 4]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let i = (row as usize * self.width as usize + col as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
