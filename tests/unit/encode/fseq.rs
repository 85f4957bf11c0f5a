use super::*;

fn sample_frames() -> Vec<Vec<u8>> {
    vec![vec![0, 1, 2], vec![255, 128, 0], vec![9, 9, 9]]
}

#[test]
fn header_layout_is_exact() {
    let bytes = encode(&sample_frames(), 3, 25).unwrap();
    assert_eq!(bytes.len(), HEADER_LEN + 9);
    assert_eq!(&bytes[0..4], b"PSEQ");
    assert_eq!(&bytes[4..6], &[24, 0]);
    assert_eq!(bytes[6], 0);
    assert_eq!(bytes[7], 2);
    assert_eq!(&bytes[8..10], &[0, 0]);
    assert_eq!(&bytes[10..14], &[3, 0, 0, 0]);
    assert_eq!(&bytes[14..18], &[3, 0, 0, 0]);
    assert_eq!(bytes[18], 25);
    assert_eq!(&bytes[19..24], &[0, 0, 0, 0, 0]);
    assert_eq!(&bytes[24..27], &[0, 1, 2]);
}

#[test]
fn decode_reads_back_frames() {
    let bytes = encode(&sample_frames(), 3, 20).unwrap();
    let seq = decode(&bytes).unwrap();
    assert_eq!(seq.header, FseqHeader::uncompressed(3, 3, 20));
    assert_eq!(seq.header.version(), "2.0");
    assert_eq!(seq.get_frame(1), Some(&[255u8, 128, 0][..]));
    assert_eq!(seq.get_frame(3), None);
    assert_eq!(seq.frames().count(), 3);
    assert!((seq.duration_secs() - 0.06).abs() < 1e-12);
}

#[test]
fn zero_step_time_defaults_to_20ms() {
    let mut bytes = encode(&sample_frames(), 3, 50).unwrap();
    bytes[18] = 0;
    assert_eq!(decode(&bytes).unwrap().header.step_time_ms, 20);
}

#[test]
fn bad_magic_is_a_format_error() {
    let mut bytes = encode(&sample_frames(), 3, 20).unwrap();
    bytes[0] = b'X';
    let err = decode(&bytes).unwrap_err();
    assert!(matches!(err, ShowError::Format(_)));
    assert!(err.to_string().contains("magic"));
}

#[test]
fn compressed_files_are_rejected_by_name() {
    let mut bytes = encode(&sample_frames(), 3, 20).unwrap();
    bytes[20] = 1;
    let err = decode(&bytes).unwrap_err();
    assert!(err.to_string().contains("unsupported compression type 1"));
}

#[test]
fn short_inputs_fail_without_panicking() {
    assert!(decode(&[]).is_err());
    assert!(decode(b"PSEQ").is_err());
    let bytes = encode(&sample_frames(), 3, 20).unwrap();
    let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(err.to_string().contains("truncated"));
}

#[test]
fn other_major_versions_and_sparse_ranges_are_rejected() {
    let bytes = encode(&sample_frames(), 3, 20).unwrap();
    let mut v1 = bytes.clone();
    v1[7] = 1;
    assert!(decode(&v1).is_err());
    let mut sparse = bytes;
    sparse[22] = 2;
    assert!(decode(&sparse).is_err());
}

#[test]
fn data_offset_past_the_header_is_honoured() {
    let mut bytes = encode(&sample_frames(), 3, 20).unwrap();
    bytes[4] = 28;
    bytes.splice(24..24, [0xAA; 4]);
    let seq = decode(&bytes).unwrap();
    assert_eq!(seq.get_frame(0), Some(&[0u8, 1, 2][..]));
}

#[test]
fn encode_rejects_inconsistent_input() {
    assert!(encode(&[vec![0u8; 3], vec![0u8; 2]], 3, 20).is_err());
    assert!(encode(&sample_frames(), 3, 0).is_err());
    assert!(encode::<Vec<u8>>(&[], 0, 20).is_err());
}

#[test]
fn empty_sequence_round_trips() {
    let bytes = encode::<FrameBuffer>(&[], 48, 20).unwrap();
    let seq = decode(&bytes).unwrap();
    assert_eq!(seq.header.frame_count, 0);
    assert_eq!(seq.header.channel_count, 48);
    assert!(seq.to_frame_buffers().is_empty());
}
