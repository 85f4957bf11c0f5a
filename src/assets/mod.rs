//! Raster asset decoding. All image I/O happens here, before rendering.

/// PNG/GIF decoding into [`crate::Asset`] frames.
pub mod decode;
