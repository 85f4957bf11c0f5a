use super::*;

fn analysis() -> Analysis {
    Analysis {
        duration: 2.0,
        beat_times: vec![0.5, 1.0, 1.9375, 2.5],
        onset_times: vec![0.52],
        tempo: Some(120.0),
    }
}

#[test]
fn beats_and_onsets_land_on_separate_layers() {
    let layers = beat_sync_layers(&analysis(), 48);
    assert_eq!(layers.len(), 2);

    let beats = &layers[0];
    assert_eq!(beats.clips.len(), 3);
    assert_eq!(beats.clips[0].start_time, 500.0);
    assert_eq!(beats.clips[0].duration, BEAT_FLASH_MS);
    assert_eq!(beats.clips[0].channels, vec![25, 26, 4, 5]);

    let onsets = &layers[1];
    assert_eq!(onsets.clips.len(), 1);
    assert_eq!(onsets.clips[0].duration, ONSET_FLASH_MS);
    assert_eq!(onsets.clips[0].channels, vec![0, 1, 2, 3]);
}

#[test]
fn last_beat_is_trimmed_to_the_show_end() {
    let layers = beat_sync_layers(&analysis(), 48);
    let last = layers[0].clips.last().unwrap();
    assert_eq!(last.start_time, 1937.5);
    assert_eq!(last.duration, 62.5);
}

#[test]
fn channels_beyond_the_unit_are_dropped() {
    let layers = beat_sync_layers(&analysis(), 8);
    assert_eq!(layers[0].clips[0].channels, vec![4, 5]);
    for clip in layers.iter().flat_map(|l| l.clips.iter()) {
        clip.validate(8).unwrap();
    }
}
