//! xLights `.xsq` export.
//!
//! Each named channel becomes a model element whose effect layer holds one `On` effect per
//! maximal run of nonzero frames. Levels are not carried over: a run at 40 exports the same as
//! a run at 255. The model table is always written in full; models past the unit's channel
//! count get an empty effect layer. Export-only.

use std::fmt;
use std::ops::Range;

use anyhow::Context;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ShowError, ShowResult};

/// xLights model names by channel index.
pub const XSQ_CHANNEL_NAMES: [&str; 46] = [
    "Left Outer Main Beam",
    "Right Outer Main Beam",
    "Left Inner Main Beam",
    "Right Inner Main Beam",
    "Left Signature",
    "Right Signature",
    "Left Channel 4",
    "Right Channel 4",
    "Left Channel 5",
    "Right Channel 5",
    "Left Channel 6",
    "Right Channel 6",
    "Left Front Turn",
    "Right Front Turn",
    "Left Front Fog",
    "Right Front Fog",
    "Left Aux Park",
    "Right Aux Park",
    "Left Side Marker",
    "Right Side Marker",
    "Left Side Repeater",
    "Right Side Repeater",
    "Left Rear Turn",
    "Right Rear Turn",
    "Brake Lights",
    "Left Tail",
    "Right Tail",
    "Reverse Lights",
    "Rear Fog Lights",
    "License Plate",
    "Left Falcon Door",
    "Right Falcon Door",
    "Left Front Door",
    "Right Front Door",
    "Left Mirror",
    "Right Mirror",
    "Left Front Window",
    "Left Rear Window",
    "Right Front Window",
    "Right Rear Door Handle",
    "Liftgate",
    "Left Front Door Handle",
    "Left Rear Door Handle",
    "Right Front Door Handle",
    "Right Rear Window",
    "Charge Port",
];

const XLIGHTS_VERSION: &str = "2022.24";
const TIMING_TRACK: &str = "New Timing";
const PALETTE: &str = "C_BUTTON_Palette1=#FFFFFF,C_BUTTON_Palette2=#FF0000,\
C_BUTTON_Palette3=#00FF00,C_BUTTON_Palette4=#0000FF,C_BUTTON_Palette5=#FFFF00,\
C_BUTTON_Palette6=#000000,C_BUTTON_Palette7=#00FFFF,C_BUTTON_Palette8=#FF00FF,\
C_CHECKBOX_Palette1=1,C_CHECKBOX_Palette2=1";

/// Free-text fields of the sequence head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XsqMetadata {
    /// Sequence author.
    pub author: String,
    /// Song title.
    pub song: String,
    /// Song artist.
    pub artist: String,
    /// Audio file the sequence is timed against.
    pub media_file: String,
}

impl Default for XsqMetadata {
    fn default() -> Self {
        Self {
            author: String::new(),
            song: String::new(),
            artist: String::new(),
            media_file: "lightshow.wav".to_owned(),
        }
    }
}

/// Information the export had to drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LossyConversion {
    /// The channel uses partial levels; only on/off survives.
    BrightnessDiscarded {
        /// Channel index.
        channel: usize,
    },
    /// The channel carries data but has no model name, so it is not exported.
    UnmappedChannel {
        /// Channel index.
        channel: usize,
    },
}

impl fmt::Display for LossyConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrightnessDiscarded { channel } => write!(
                f,
                "channel {channel}: brightness levels reduced to on/off"
            ),
            Self::UnmappedChannel { channel } => {
                write!(f, "channel {channel}: no xLights model, data dropped")
            }
        }
    }
}

/// Result of an export: the document plus everything it could not represent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XsqExport {
    /// XML text.
    pub xml: String,
    /// Lossy conversions, ordered by channel.
    pub warnings: Vec<LossyConversion>,
    /// Number of `On` effects written.
    pub effect_count: usize,
}

/// Maximal runs of frames where `channel` is nonzero, as frame index ranges.
pub fn on_runs<F: AsRef<[u8]>>(frames: &[F], channel: usize) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, frame) in frames.iter().enumerate() {
        let on = frame.as_ref().get(channel).is_some_and(|&v| v > 0);
        match (on, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..frames.len());
    }
    runs
}

/// Encode frames into an xLights sequence.
#[tracing::instrument(skip(frames, metadata), fields(frames = frames.len()))]
pub fn encode<F: AsRef<[u8]>>(
    frames: &[F],
    channel_count: usize,
    step_time_ms: u8,
    metadata: &XsqMetadata,
) -> ShowResult<XsqExport> {
    if step_time_ms == 0 {
        return Err(ShowError::validation("xsq step time must be >= 1 ms"));
    }
    if let Some((i, f)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.as_ref().len() != channel_count)
    {
        return Err(ShowError::validation(format!(
            "frame {i} has {} channels, expected {channel_count}",
            f.as_ref().len()
        )));
    }

    let warnings = lossy_conversions(frames, channel_count);
    for warning in &warnings {
        tracing::warn!(%warning, "lossy xsq conversion");
    }

    let step = u64::from(step_time_ms);
    let duration_secs = frames.len() as f64 * f64::from(step_time_ms) / 1000.0;

    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("write xsq declaration")?;
    w.write_event(Event::Start(BytesStart::new("xsequence").with_attributes([
        ("BaseChannel", "0"),
        ("ChanCtrlBasic", "0"),
        ("ChanCtrlColor", "0"),
        ("FixedPointTiming", "1"),
        ("ModelBlending", "true"),
    ])))
    .context("write xsq root")?;

    w.write_event(Event::Start(BytesStart::new("head")))
        .context("write xsq head")?;
    let timing = format!("{step_time_ms} ms");
    let duration = format!("{duration_secs:.3}");
    for (tag, value) in [
        ("version", XLIGHTS_VERSION),
        ("author", metadata.author.as_str()),
        ("song", metadata.song.as_str()),
        ("artist", metadata.artist.as_str()),
        ("mediaFile", metadata.media_file.as_str()),
        ("sequenceTiming", timing.as_str()),
        ("sequenceType", "Media"),
        ("sequenceDuration", duration.as_str()),
    ] {
        text_element(&mut w, tag, value)?;
    }
    w.write_event(Event::End(BytesEnd::new("head")))
        .context("write xsq head")?;

    text_element(&mut w, "nextid", "1")?;
    w.write_event(Event::Start(BytesStart::new("ColorPalettes")))
        .context("write xsq palettes")?;
    text_element(&mut w, "ColorPalette", PALETTE)?;
    w.write_event(Event::End(BytesEnd::new("ColorPalettes")))
        .context("write xsq palettes")?;

    w.write_event(Event::Start(BytesStart::new("EffectDB")))
        .context("write xsq effect db")?;
    text_element(&mut w, "Effect", "")?;
    w.write_event(Event::End(BytesEnd::new("EffectDB")))
        .context("write xsq effect db")?;

    w.write_event(Event::Start(BytesStart::new("DisplayElements")))
        .context("write xsq display elements")?;
    w.write_event(Event::Empty(BytesStart::new("Element").with_attributes([
        ("collapsed", "0"),
        ("type", "timing"),
        ("name", TIMING_TRACK),
        ("visible", "1"),
        ("active", "1"),
    ])))
    .context("write xsq display elements")?;
    for name in XSQ_CHANNEL_NAMES {
        w.write_event(Event::Empty(BytesStart::new("Element").with_attributes([
            ("collapsed", "0"),
            ("type", "model"),
            ("name", name),
            ("visible", "1"),
        ])))
        .context("write xsq display elements")?;
    }
    w.write_event(Event::End(BytesEnd::new("DisplayElements")))
        .context("write xsq display elements")?;

    w.write_event(Event::Start(BytesStart::new("ElementEffects")))
        .context("write xsq element effects")?;
    w.write_event(Event::Start(
        BytesStart::new("Element").with_attributes([("type", "timing"), ("name", TIMING_TRACK)]),
    ))
    .context("write xsq timing track")?;
    w.write_event(Event::Empty(BytesStart::new("EffectLayer")))
        .context("write xsq timing track")?;
    w.write_event(Event::End(BytesEnd::new("Element")))
        .context("write xsq timing track")?;

    let mut effect_count = 0;
    for (channel, name) in XSQ_CHANNEL_NAMES.into_iter().enumerate() {
        w.write_event(Event::Start(
            BytesStart::new("Element").with_attributes([("type", "model"), ("name", name)]),
        ))
        .with_context(|| format!("write xsq element '{name}'"))?;
        w.write_event(Event::Start(BytesStart::new("EffectLayer")))
            .with_context(|| format!("write xsq element '{name}'"))?;
        for run in on_runs(frames, channel) {
            let start = (run.start as u64 * step).to_string();
            let end = (run.end as u64 * step).to_string();
            w.write_event(Event::Empty(BytesStart::new("Effect").with_attributes([
                ("ref", "0"),
                ("name", "On"),
                ("startTime", start.as_str()),
                ("endTime", end.as_str()),
                ("palette", "0"),
            ])))
            .with_context(|| format!("write xsq effect on '{name}'"))?;
            effect_count += 1;
        }
        w.write_event(Event::End(BytesEnd::new("EffectLayer")))
            .with_context(|| format!("write xsq element '{name}'"))?;
        w.write_event(Event::End(BytesEnd::new("Element")))
            .with_context(|| format!("write xsq element '{name}'"))?;
    }
    w.write_event(Event::End(BytesEnd::new("ElementEffects")))
        .context("write xsq element effects")?;
    w.write_event(Event::End(BytesEnd::new("xsequence")))
        .context("write xsq root")?;

    let mut bytes = w.into_inner();
    bytes.push(b'\n');
    let xml = String::from_utf8(bytes).context("xsq output is not utf-8")?;
    Ok(XsqExport {
        xml,
        warnings,
        effect_count,
    })
}

fn text_element(w: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> ShowResult<()> {
    w.write_event(Event::Start(BytesStart::new(tag)))
        .with_context(|| format!("write xsq <{tag}>"))?;
    w.write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("write xsq <{tag}>"))?;
    w.write_event(Event::End(BytesEnd::new(tag)))
        .with_context(|| format!("write xsq <{tag}>"))?;
    Ok(())
}

fn lossy_conversions<F: AsRef<[u8]>>(frames: &[F], channel_count: usize) -> Vec<LossyConversion> {
    let mut out = Vec::new();
    for channel in 0..channel_count {
        let mut has_data = false;
        let mut partial = false;
        for frame in frames {
            if let Some(&v) = frame.as_ref().get(channel) {
                has_data |= v > 0;
                partial |= v > 0 && v < 255;
            }
        }
        if channel >= XSQ_CHANNEL_NAMES.len() {
            if has_data {
                out.push(LossyConversion::UnmappedChannel { channel });
            }
        } else if partial {
            out.push(LossyConversion::BrightnessDiscarded { channel });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/xsq.rs"]
mod tests;
