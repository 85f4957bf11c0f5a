use super::*;
use image::{Delay, Frame, Rgba, codecs::gif::GifEncoder};

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(px))
}

#[test]
fn png_decodes_to_single_frame() {
    let mut bytes = Vec::new();
    solid(3, 2, [255, 0, 0, 255])
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();

    let asset = decode_asset(&bytes).unwrap();
    assert_eq!((asset.width, asset.height), (3, 2));
    assert_eq!(asset.frames.len(), 1);
    assert_eq!(asset.fps, 1.0);
    assert_eq!(asset.frames[0].pixel(1, 2), Some([255, 0, 0, 255]));
}

#[test]
fn gif_frames_and_fps_come_from_delays() {
    let mut bytes = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut bytes);
        let frames = vec![
            Frame::from_parts(
                solid(4, 4, [255, 255, 255, 255]),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            ),
            Frame::from_parts(
                solid(4, 4, [0, 0, 0, 255]),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            ),
        ];
        enc.encode_frames(frames).unwrap();
    }

    let asset = decode_asset(&bytes).unwrap();
    assert_eq!(asset.frames.len(), 2);
    assert_eq!((asset.width, asset.height), (4, 4));
    assert_eq!(asset.fps, 10.0);
    assert_eq!(asset.frame_duration_ms, Some(100.0));
}

#[test]
fn garbage_is_an_error() {
    assert!(decode_asset(b"definitely not an image").is_err());
}
