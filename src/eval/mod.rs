//! Timeline evaluation.
//!
//! Clips are resolved per layer, evaluated at their local time and max-blended into a
//! [`crate::FrameBuffer`]. Grid rendering shifts each cell's time by a spatial pattern delay.

/// Per-clip effect and raster pattern evaluation.
pub mod clip;
/// Layer resolution and blending.
pub mod compositor;
/// Fade envelope.
pub mod envelope;
/// Spatial pattern delays.
pub mod offset;
