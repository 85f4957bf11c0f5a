//! Deterministic light-show synthesis.
//!
//! A [`Project`] is an ordered set of layers holding timed clips (flash/pulse/strobe effects
//! and raster-driven patterns). The [`Compositor`] turns it into per-instant [`FrameBuffer`]s,
//! either for one unit or for every cell of a grid of units with spatial propagation delays.
//! Rendered sequences are written as binary FSEQ v2 files or as xLights `.xsq` timelines.
//!
//! - Build or load a [`Project`] ([`ProjectBuilder`], [`ProjectFile`])
//! - Render single instants with [`Compositor`]
//! - Stream a whole show into a [`FrameSink`] or export it with [`export_fseq`],
//!   [`export_xsq`] and [`export_matrix`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Raster asset decoding.
pub mod assets;
/// Output formats and frame sinks.
pub mod encode;
/// Timeline evaluation.
pub mod eval;
/// Core value types and errors.
pub mod foundation;
/// Grid layout model.
pub mod layout;
/// Project model and editing surface.
pub mod project;
/// Whole-show rendering.
pub mod render;

pub use crate::foundation::core::{FrameBuffer, GridConfig, GridFrame, cell_label};
pub use crate::foundation::error::{ShowError, ShowResult};

pub use crate::assets::decode::{decode_asset, decode_asset_file};
pub use crate::encode::fseq::{FseqHeader, FseqSequence};
pub use crate::encode::sink::{FrameSink, FseqSink, InMemorySink, SinkConfig, XsqSink};
pub use crate::encode::xsq::{LossyConversion, XsqExport, XsqMetadata};
pub use crate::eval::compositor::Compositor;
pub use crate::layout::grid::{GridLayout, LayoutCell, LayoutSpacing, Placement};
pub use crate::project::dsl::{ClipBuilder, LayerBuilder, ProjectBuilder};
pub use crate::project::file::ProjectFile;
pub use crate::project::history::ProjectHistory;
pub use crate::project::model::{
    Analysis, Asset, BrightnessMode, Clip, ClipKind, EffectType, Layer, PatternDirection,
    Project, RasterFrame, SpatialPattern, TimingMode,
};
pub use crate::render::pipeline::{
    CellExport, RenderStats, RenderTarget, RenderThreading, SequenceOpts, SequenceTiming,
    export_fseq, export_matrix, export_xsq, render_sequence, render_to_sink,
};
