//! Core value types and the crate error type.

/// Frame buffers, grid dimensions, and shared constants.
pub mod core;
/// Crate error type.
pub mod error;
