//! Physical arrangement of units on the grid.

/// Layout tables decoded from rasters.
pub mod grid;
