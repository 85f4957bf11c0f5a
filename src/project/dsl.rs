use std::collections::BTreeMap;

use crate::{
    foundation::core::DEFAULT_CHANNEL_COUNT,
    foundation::error::{ShowError, ShowResult},
    project::model::{
        Analysis, Asset, BrightnessMode, Clip, ClipKind, EffectType, Layer, PatternDirection,
        Project, SpatialPattern, TimingMode,
    },
};

/// Fluent builder for a validated [`Project`].
pub struct ProjectBuilder {
    duration: f64,
    channel_count: usize,
    analysis: Option<Analysis>,
    assets: BTreeMap<String, Asset>,
    layers: Vec<Layer>,
}

impl ProjectBuilder {
    /// Start a project of `duration_ms` milliseconds.
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration: duration_ms,
            channel_count: DEFAULT_CHANNEL_COUNT,
            analysis: None,
            assets: BTreeMap::new(),
            layers: Vec::new(),
        }
    }

    /// Override the channel count.
    pub fn channel_count(mut self, n: usize) -> Self {
        self.channel_count = n;
        self
    }

    /// Attach pre-computed analysis.
    pub fn analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Register an asset under a unique id.
    pub fn asset(mut self, id: impl Into<String>, asset: Asset) -> ShowResult<Self> {
        let id = id.into();
        if self.assets.contains_key(&id) {
            return Err(ShowError::validation(format!("duplicate asset id '{id}'")));
        }
        self.assets.insert(id, asset);
        Ok(self)
    }

    /// Append a layer on top.
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Build and validate.
    pub fn build(self) -> ShowResult<Project> {
        let project = Project {
            layers: self.layers,
            duration: self.duration,
            analysis: self.analysis,
            assets: self.assets,
            channel_count: self.channel_count,
        };
        project.validate()?;
        Ok(project)
    }
}

/// Fluent builder for a [`Layer`].
pub struct LayerBuilder {
    id: String,
    name: String,
    muted: bool,
    clips: Vec<Clip>,
}

impl LayerBuilder {
    /// Start a layer; the name doubles as the id.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            muted: false,
            clips: Vec::new(),
        }
    }

    /// Override the layer id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Mute or unmute the layer.
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// Append a clip.
    pub fn clip(mut self, clip: Clip) -> Self {
        self.clips.push(clip);
        self
    }

    /// Finish the layer.
    pub fn build(self) -> Layer {
        Layer {
            id: self.id,
            name: self.name,
            muted: self.muted,
            clips: self.clips,
        }
    }
}

/// Fluent builder for a [`Clip`], starting from editor defaults.
pub struct ClipBuilder {
    clip: Clip,
}

impl ClipBuilder {
    /// Flash effect on `channels` over `[start_ms, start_ms + duration_ms)`.
    pub fn effect(
        id: impl Into<String>,
        start_ms: f64,
        duration_ms: f64,
        channels: impl IntoIterator<Item = i32>,
    ) -> Self {
        let mut clip = Clip::new(id);
        clip.start_time = start_ms;
        clip.duration = duration_ms;
        clip.channels = channels.into_iter().collect();
        Self { clip }
    }

    /// Raster pattern sampling `asset_id` onto `channels`.
    pub fn pattern(
        id: impl Into<String>,
        start_ms: f64,
        duration_ms: f64,
        channels: impl IntoIterator<Item = i32>,
        asset_id: impl Into<String>,
    ) -> Self {
        let mut b = Self::effect(id, start_ms, duration_ms, channels);
        b.clip.kind = ClipKind::Pattern;
        b.clip.asset_id = Some(asset_id.into());
        b
    }

    /// Effect law and frequency in Hz.
    pub fn effect_type(mut self, effect_type: EffectType, speed_hz: f64) -> Self {
        self.clip.effect_type = effect_type;
        self.clip.speed = speed_hz;
        self
    }

    /// Fade lengths in milliseconds.
    pub fn fades(mut self, fade_in_ms: f64, fade_out_ms: f64) -> Self {
        self.clip.fade_in = fade_in_ms;
        self.clip.fade_out = fade_out_ms;
        self
    }

    /// Spatial propagation law.
    pub fn spatial(
        mut self,
        pattern: SpatialPattern,
        direction: PatternDirection,
        speed: f64,
    ) -> Self {
        self.clip.pattern = pattern;
        self.clip.pattern_direction = direction;
        self.clip.pattern_speed = speed;
        self
    }

    /// Fixed milliseconds per asset frame.
    pub fn frame_timing(mut self, frame_duration_ms: f64) -> Self {
        self.clip.timing_mode = TimingMode::Frame;
        self.clip.frame_duration = frame_duration_ms;
        self
    }

    /// Beat-locked asset frames.
    pub fn beat_timing(mut self, bpm: f64, beats_per_frame: f64) -> Self {
        self.clip.timing_mode = TimingMode::Beat;
        self.clip.bpm = bpm;
        self.clip.beats_per_frame = beats_per_frame;
        self
    }

    /// Asset play count before holding the last frame.
    pub fn repetitions(mut self, n: u32) -> Self {
        self.clip.repetitions = n;
        self
    }

    /// Pixel-to-level mapping.
    pub fn brightness(mut self, mode: BrightnessMode, threshold: u8) -> Self {
        self.clip.brightness_mode = mode;
        self.clip.brightness_threshold = threshold;
        self
    }

    /// Finish without validation.
    pub fn build(self) -> Clip {
        self.clip
    }

    /// Finish and validate against `channel_count`.
    pub fn build_checked(self, channel_count: usize) -> ShowResult<Clip> {
        self.clip.validate(channel_count)?;
        Ok(self.clip)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/dsl.rs"]
mod tests;
