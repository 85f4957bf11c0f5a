//! Show data model and the editing surface around it.
//!
//! Rendering only ever borrows a [`model::Project`]. Edits go through [`edit`] and produce new
//! values; [`history::ProjectHistory`] keeps the versioned snapshots for undo/redo.

/// Builder DSL for projects, layers and clips.
pub mod dsl;
/// Value-returning edit operations.
pub mod edit;
/// Saved project envelope and analysis input.
pub mod file;
/// Clip generation from audio analysis.
pub mod generate;
/// Versioned undo/redo snapshots.
pub mod history;
/// Core data types.
pub mod model;
