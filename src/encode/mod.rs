//! Output formats and frame sinks.
//!
//! Sinks consume rendered frames in time order and are driven by
//! [`crate::render::pipeline::render_to_sink`].

/// Binary FSEQ v2 container.
pub mod fseq;
/// Frame sink trait and built-in sinks.
pub mod sink;
/// xLights XML sequence export.
pub mod xsq;
