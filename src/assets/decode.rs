use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::{AnimationDecoder, ImageFormat, RgbaImage, codecs::gif::GifDecoder};

use crate::{
    foundation::error::{ShowError, ShowResult},
    project::model::{Asset, RasterFrame},
};

/// Playback rate assumed for animations without usable frame delays.
pub const DEFAULT_ANIMATION_FPS: f64 = 12.0;
/// Upper bound on the playback rate derived from frame delays.
pub const MAX_ANIMATION_FPS: f64 = 30.0;

/// Decode PNG or GIF bytes into an [`Asset`].
///
/// GIF frames come out fully composited at canvas size. The nominal fps is derived from the mean
/// frame delay, capped at [`MAX_ANIMATION_FPS`]. Static images become a single frame at 1 fps.
pub fn decode_asset(bytes: &[u8]) -> ShowResult<Asset> {
    let format = image::guess_format(bytes).context("detect image format")?;
    if format == ImageFormat::Gif {
        decode_gif(bytes)
    } else {
        let img = image::load_from_memory(bytes)
            .context("decode image from memory")?
            .to_rgba8();
        let frame = raster_from_image(img)?;
        Ok(Asset {
            width: frame.width,
            height: frame.height,
            fps: 1.0,
            frame_duration_ms: None,
            frames: vec![frame],
        })
    }
}

/// Read and decode an image file.
pub fn decode_asset_file(path: &Path) -> ShowResult<Asset> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read asset '{}'", path.display()))?;
    decode_asset(&bytes)
}

/// Convert a decoded RGBA image into a raster frame.
pub fn raster_from_image(img: RgbaImage) -> ShowResult<RasterFrame> {
    let (width, height) = img.dimensions();
    RasterFrame::new(width, height, img.into_raw())
}

fn decode_gif(bytes: &[u8]) -> ShowResult<Asset> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).context("open gif stream")?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .context("decode gif frames")?;
    if frames.is_empty() {
        return Err(ShowError::validation("gif contains no frames"));
    }

    let mut total_delay_ms = 0.0;
    let mut rasters = Vec::with_capacity(frames.len());
    for frame in frames {
        let (num, den) = frame.delay().numer_denom_ms();
        if den > 0 {
            total_delay_ms += f64::from(num) / f64::from(den);
        }
        rasters.push(raster_from_image(frame.into_buffer())?);
    }

    let mean_delay_ms = total_delay_ms / rasters.len() as f64;
    let (fps, frame_duration_ms) = if mean_delay_ms > 0.0 {
        (
            (1000.0 / mean_delay_ms).round().min(MAX_ANIMATION_FPS),
            Some(mean_delay_ms),
        )
    } else {
        (DEFAULT_ANIMATION_FPS, None)
    };

    Ok(Asset {
        width: rasters[0].width,
        height: rasters[0].height,
        fps,
        frame_duration_ms,
        frames: rasters,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
