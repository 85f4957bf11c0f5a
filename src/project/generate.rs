use crate::{
    foundation::core::channels,
    project::model::{Analysis, Clip, Layer},
};

/// Flash length for each beat, in milliseconds.
pub const BEAT_FLASH_MS: f64 = 100.0;
/// Flash length for each onset, in milliseconds.
pub const ONSET_FLASH_MS: f64 = 60.0;

const BEAT_CHANNELS: [usize; 4] = [
    channels::LEFT_TAIL,
    channels::RIGHT_TAIL,
    channels::LEFT_SIGNATURE,
    channels::RIGHT_SIGNATURE,
];

const ONSET_CHANNELS: [usize; 4] = [
    channels::LEFT_BEAM,
    channels::RIGHT_BEAM,
    channels::LEFT_BEAM_2,
    channels::RIGHT_BEAM_2,
];

/// Build beat and onset layers from analyzed timestamps.
///
/// Beats flash the tail and signature lights, onsets flash the main beams. The two sets go to
/// separate layers so an onset is never hidden behind an overlapping beat. Timestamps at or past
/// the analyzed duration are dropped, and so are channels `>= channel_count`. Clip ids are
/// derived from the source timestamp index so the result is deterministic.
pub fn beat_sync_layers(analysis: &Analysis, channel_count: usize) -> Vec<Layer> {
    let beats = timestamp_layer(
        "beats",
        "Beats",
        &analysis.beat_times,
        analysis.duration,
        BEAT_FLASH_MS,
        &BEAT_CHANNELS,
        channel_count,
    );
    let onsets = timestamp_layer(
        "onsets",
        "Onsets",
        &analysis.onset_times,
        analysis.duration,
        ONSET_FLASH_MS,
        &ONSET_CHANNELS,
        channel_count,
    );
    tracing::debug!(
        beats = beats.clips.len(),
        onsets = onsets.clips.len(),
        "generated beat-sync layers"
    );
    vec![beats, onsets]
}

fn timestamp_layer(
    id: &str,
    name: &str,
    times_s: &[f64],
    duration_s: f64,
    flash_ms: f64,
    chans: &[usize],
    channel_count: usize,
) -> Layer {
    let limit_ms = duration_s * 1000.0;
    let channels: Vec<i32> = chans
        .iter()
        .filter(|&&c| c < channel_count)
        .map(|&c| c as i32)
        .collect();

    let mut clips = Vec::new();
    if !channels.is_empty() {
        for (i, &t) in times_s.iter().enumerate() {
            let start = t * 1000.0;
            if !start.is_finite() || start < 0.0 || start >= limit_ms {
                continue;
            }
            let mut clip = Clip::new(format!("{id}-{i}"));
            clip.start_time = start;
            clip.duration = flash_ms.min(limit_ms - start);
            clip.channels = channels.clone();
            clips.push(clip);
        }
    }
    clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    Layer {
        id: id.to_owned(),
        name: name.to_owned(),
        muted: false,
        clips,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/generate.rs"]
mod tests;
