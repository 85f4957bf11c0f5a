//! Whole-show rendering into sinks and files.

/// Sequence rendering, threading and export entry points.
pub mod pipeline;
