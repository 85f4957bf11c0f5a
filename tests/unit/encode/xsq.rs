use super::*;
use quick_xml::Reader;

fn frames_with(channel_count: usize, on: &[(usize, Range<usize>, u8)], len: usize) -> Vec<Vec<u8>> {
    let mut frames = vec![vec![0u8; channel_count]; len];
    for (ch, range, level) in on {
        for f in range.clone() {
            frames[f][*ch] = *level;
        }
    }
    frames
}

fn effects_of(xml: &str, model: &str) -> Vec<(String, String)> {
    let marker = format!("<Element type=\"model\" name=\"{model}\">");
    let Some(start) = xml.find(&marker) else {
        return Vec::new();
    };
    let body = &xml[start..];
    let body = &body[..body.find("</Element>").unwrap()];
    body.match_indices("<Effect ")
        .map(|(i, _)| {
            let tag = &body[i..i + body[i..].find("/>").unwrap()];
            let attr = |name: &str| {
                let key = format!("{name}=\"");
                let from = tag.find(&key).unwrap() + key.len();
                tag[from..from + tag[from..].find('"').unwrap()].to_owned()
            };
            (attr("startTime"), attr("endTime"))
        })
        .collect()
}

#[test]
fn runs_are_maximal_and_closed_at_the_end() {
    let frames = frames_with(2, &[(0, 2..4, 255), (0, 6..8, 10)], 8);
    assert_eq!(on_runs(&frames, 0), vec![2..4, 6..8]);
    assert!(on_runs(&frames, 1).is_empty());
}

#[test]
fn level_changes_inside_a_run_do_not_split_it() {
    let frames = frames_with(1, &[(0, 0..2, 255), (0, 2..5, 40)], 6);
    assert_eq!(on_runs(&frames, 0), vec![0..5]);
}

#[test]
fn single_flash_exports_one_effect() {
    let frames = frames_with(48, &[(0, 0..50, 255)], 50);
    let out = encode(&frames, 48, 20, &XsqMetadata::default()).unwrap();
    assert_eq!(out.effect_count, 1);
    assert_eq!(
        effects_of(&out.xml, "Left Outer Main Beam"),
        vec![("0".to_owned(), "1000".to_owned())]
    );
    for name in &XSQ_CHANNEL_NAMES[1..] {
        assert!(effects_of(&out.xml, name).is_empty(), "{name}");
    }
    assert!(out.warnings.is_empty());
}

#[test]
fn head_carries_metadata_and_duration() {
    let frames = frames_with(48, &[], 75);
    let meta = XsqMetadata {
        author: "me".to_owned(),
        song: "Rock & Roll".to_owned(),
        ..XsqMetadata::default()
    };
    let out = encode(&frames, 48, 20, &meta).unwrap();
    assert!(out.xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(out.xml.contains("<author>me</author>"));
    assert!(out.xml.contains("<song>Rock &amp; Roll</song>"));
    assert!(out.xml.contains("<mediaFile>lightshow.wav</mediaFile>"));
    assert!(out.xml.contains("<sequenceTiming>20 ms</sequenceTiming>"));
    assert!(out.xml.contains("<sequenceDuration>1.500</sequenceDuration>"));
    assert!(out.xml.contains("<Effect></Effect>"));
}

#[test]
fn output_is_well_formed_and_lists_every_model() {
    let frames = frames_with(48, &[(3, 1..4, 255), (25, 0..2, 255)], 10);
    let out = encode(&frames, 48, 20, &XsqMetadata::default()).unwrap();

    let mut reader = Reader::from_str(&out.xml);
    let mut models = 0;
    let mut effects = 0;
    loop {
        match reader.read_event().unwrap() {
            quick_xml::events::Event::Eof => break,
            quick_xml::events::Event::Empty(e) if e.name().as_ref() == b"Element" => models += 1,
            quick_xml::events::Event::Empty(e) if e.name().as_ref() == b"Effect" => effects += 1,
            _ => {}
        }
    }
    // timing track plus one display element per named channel
    assert_eq!(models, 1 + XSQ_CHANNEL_NAMES.len());
    assert_eq!(effects, 2);
    assert_eq!(
        effects_of(&out.xml, "Left Tail"),
        vec![("0".to_owned(), "40".to_owned())]
    );
}

#[test]
fn partial_levels_and_unmapped_channels_are_reported() {
    let frames = frames_with(48, &[(2, 0..3, 128), (47, 0..1, 255)], 4);
    let out = encode(&frames, 48, 20, &XsqMetadata::default()).unwrap();
    assert_eq!(
        out.warnings,
        vec![
            LossyConversion::BrightnessDiscarded { channel: 2 },
            LossyConversion::UnmappedChannel { channel: 47 },
        ]
    );
    assert_eq!(effects_of(&out.xml, "Left Inner Main Beam").len(), 1);
}

#[test]
fn narrow_units_still_list_the_full_model_table() {
    let frames = frames_with(8, &[(0, 0..5, 255)], 10);
    let out = encode(&frames, 8, 20, &XsqMetadata::default()).unwrap();
    for name in XSQ_CHANNEL_NAMES {
        let marker = format!("<Element type=\"model\" name=\"{name}\">");
        assert!(out.xml.contains(&marker), "missing model {name}");
    }
    assert_eq!(
        effects_of(&out.xml, "Left Outer Main Beam"),
        vec![("0".to_owned(), "100".to_owned())]
    );
    assert!(effects_of(&out.xml, "Charge Port").is_empty());
    assert_eq!(out.effect_count, 1);
}

#[test]
fn inconsistent_frames_are_rejected() {
    let frames = vec![vec![0u8; 48], vec![0u8; 47]];
    assert!(encode(&frames, 48, 20, &XsqMetadata::default()).is_err());
    assert!(encode(&frames[..1], 48, 0, &XsqMetadata::default()).is_err());
}
