use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::GridConfig,
    error::{ShowError, ShowResult},
};

/// Physical spacing between neighbouring units, in world units.
///
/// Layout rasters encode offsets as a fraction of these spacings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSpacing {
    /// Distance between columns.
    pub col_spacing: f64,
    /// Distance between rows.
    pub row_spacing: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            col_spacing: 2.5,
            row_spacing: 6.0,
        }
    }
}

/// Existence, offset and yaw of one grid unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCell {
    /// Whether a unit stands at this cell.
    pub exists: bool,
    /// Offset along the column axis.
    pub offset_x: f64,
    /// Offset along the row axis.
    pub offset_y: f64,
    /// Yaw in degrees, `[0, 360]`.
    pub rotation_degrees: f64,
}

impl Default for LayoutCell {
    fn default() -> Self {
        Self {
            exists: true,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_degrees: 0.0,
        }
    }
}

impl LayoutCell {
    /// Decode a cell from one RGBA pixel.
    pub fn from_rgba([r, g, b, a]: [u8; 4], spacing: LayoutSpacing) -> Self {
        Self {
            exists: a > 0,
            offset_x: (f64::from(r) - 127.0) / 127.0 * spacing.col_spacing,
            offset_y: (f64::from(g) - 127.0) / 127.0 * spacing.row_spacing,
            rotation_degrees: f64::from(b) / 255.0 * 360.0,
        }
    }

    /// Return `true` when the unit faces backwards, i.e. yaw in (90°, 270°).
    pub fn is_flipped(&self) -> bool {
        let yaw = self.rotation_degrees.rem_euclid(360.0);
        yaw > 90.0 && yaw < 270.0
    }
}

/// World placement of one unit, with the grid centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Column-axis position.
    pub x: f64,
    /// Row-axis position.
    pub y: f64,
    /// Yaw in degrees.
    pub rotation_degrees: f64,
}

/// Row-major table of [`LayoutCell`]s covering a [`GridConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    /// Grid dimensions.
    pub grid: GridConfig,
    cells: Vec<LayoutCell>,
}

impl GridLayout {
    /// Every cell present with no offset or rotation.
    pub fn create_default_layout(cols: u32, rows: u32) -> ShowResult<Self> {
        let grid = GridConfig::new(rows, cols)?;
        Ok(Self {
            grid,
            cells: vec![LayoutCell::default(); grid.cell_count()],
        })
    }

    /// Decode a layout from raw RGBA8 pixels; the image size is the grid size.
    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: &[u8],
        spacing: LayoutSpacing,
    ) -> ShowResult<Self> {
        let grid = GridConfig::new(height, width)?;
        let expected = grid.cell_count() * 4;
        if rgba.len() != expected {
            return Err(ShowError::validation(format!(
                "layout raster {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        let cells = rgba
            .chunks_exact(4)
            .map(|px| LayoutCell::from_rgba([px[0], px[1], px[2], px[3]], spacing))
            .collect();
        Ok(Self { grid, cells })
    }

    /// Decode a layout from encoded image bytes (PNG and friends).
    pub fn from_image_bytes(bytes: &[u8], spacing: LayoutSpacing) -> ShowResult<Self> {
        let img = image::load_from_memory(bytes)
            .context("decode layout image")?
            .to_rgba8();
        let (w, h) = img.dimensions();
        Self::from_rgba(w, h, img.as_raw(), spacing)
    }

    /// Read and decode a layout image file.
    pub fn from_image_file(path: &Path, spacing: LayoutSpacing) -> ShowResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read layout image '{}'", path.display()))?;
        Self::from_image_bytes(&bytes, spacing)
    }

    /// Cell at (`row`, `col`), or `None` outside the grid.
    pub fn cell(&self, row: u32, col: u32) -> Option<&LayoutCell> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        self.cells
            .get(row as usize * self.grid.cols as usize + col as usize)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[LayoutCell] {
        &self.cells
    }

    /// Coordinates of cells holding a unit, row-major.
    pub fn existing_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.grid
            .cells()
            .filter(|&(r, c)| self.cell(r, c).is_some_and(|cell| cell.exists))
    }

    /// World placement of the unit at (`row`, `col`).
    ///
    /// Offsets only apply to multi-cell grids. Returns `None` for missing units.
    pub fn placement(&self, row: u32, col: u32, spacing: LayoutSpacing) -> Option<Placement> {
        let cell = self.cell(row, col).filter(|c| c.exists)?;
        let mut x = (f64::from(col) - f64::from(self.grid.cols) / 2.0) * spacing.col_spacing;
        let mut y = (f64::from(row) - f64::from(self.grid.rows) / 2.0) * spacing.row_spacing;
        if self.grid.is_multi_cell() {
            x += cell.offset_x;
            y += cell.offset_y;
        }
        Some(Placement {
            x,
            y,
            rotation_degrees: cell.rotation_degrees,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
