use crate::foundation::error::{ShowError, ShowResult};

/// Default number of addressable channels per unit.
pub const DEFAULT_CHANNEL_COUNT: usize = 48;

/// Default sequence step time in milliseconds (50 frames per second).
pub const DEFAULT_STEP_TIME_MS: u8 = 20;

/// Well-known channel indices of a standard unit.
pub mod channels {
    /// Left outer main beam.
    pub const LEFT_BEAM: usize = 0;
    /// Right outer main beam.
    pub const RIGHT_BEAM: usize = 1;
    /// Left inner main beam.
    pub const LEFT_BEAM_2: usize = 2;
    /// Right inner main beam.
    pub const RIGHT_BEAM_2: usize = 3;
    /// Left signature light.
    pub const LEFT_SIGNATURE: usize = 4;
    /// Right signature light.
    pub const RIGHT_SIGNATURE: usize = 5;
    /// Left front turn signal.
    pub const LEFT_TURN: usize = 12;
    /// Right front turn signal.
    pub const RIGHT_TURN: usize = 13;
    /// Left front fog light.
    pub const LEFT_FOG: usize = 14;
    /// Right front fog light.
    pub const RIGHT_FOG: usize = 15;
    /// Brake lights.
    pub const BRAKE: usize = 24;
    /// Left tail light.
    pub const LEFT_TAIL: usize = 25;
    /// Right tail light.
    pub const RIGHT_TAIL: usize = 26;
}

/// One instant's channel intensities (0-255).
///
/// The length is fixed at construction and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameBuffer(Vec<u8>);

impl FrameBuffer {
    /// All-dark buffer with `channel_count` channels.
    pub fn new(channel_count: usize) -> Self {
        Self(vec![0; channel_count])
    }

    /// Wrap existing channel values.
    pub fn from_vec(values: Vec<u8>) -> Self {
        Self(values)
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when the buffer has no channels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Channel values in index order.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Value of one channel, or `None` when out of range.
    pub fn get(&self, channel: usize) -> Option<u8> {
        self.0.get(channel).copied()
    }

    /// Raise `channel` to at least `value`. Out-of-range channels are ignored.
    pub fn raise(&mut self, channel: usize, value: u8) {
        if let Some(slot) = self.0.get_mut(channel) {
            *slot = (*slot).max(value);
        }
    }

    /// Raise every listed channel to at least `value`.
    ///
    /// Negative or out-of-range indices are skipped.
    pub fn raise_channels(&mut self, channels: &[i32], value: u8) {
        for &ch in channels {
            if let Ok(idx) = usize::try_from(ch) {
                self.raise(idx, value);
            }
        }
    }

    /// Channel-wise maximum with `other` (never additive).
    pub fn blend_max(&mut self, other: &FrameBuffer) {
        for (dst, src) in self.0.iter_mut().zip(other.0.iter()) {
            *dst = (*dst).max(*src);
        }
    }

    /// Consume the buffer and return its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Grid dimensions for matrix rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridConfig {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 10, cols: 10 }
    }
}

impl GridConfig {
    /// Create a validated grid (both dimensions must be > 0).
    pub fn new(rows: u32, cols: u32) -> ShowResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(ShowError::validation("grid rows and cols must be > 0"));
        }
        Ok(Self { rows, cols })
    }

    /// Total number of cells.
    pub fn cell_count(self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Return `true` when the grid has more than one cell in either direction.
    pub fn is_multi_cell(self) -> bool {
        self.rows > 1 || self.cols > 1
    }

    /// Iterate `(row, col)` in row-major order.
    pub fn cells(self) -> impl Iterator<Item = (u32, u32)> {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| (r, c)))
    }
}

/// Per-cell frame buffers for one instant, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridFrame {
    /// Grid dimensions.
    pub grid: GridConfig,
    cells: Vec<FrameBuffer>,
}

impl GridFrame {
    pub(crate) fn from_cells(grid: GridConfig, cells: Vec<FrameBuffer>) -> Self {
        debug_assert_eq!(cells.len(), grid.cell_count());
        Self { grid, cells }
    }

    /// Buffer of one cell, or `None` when outside the grid.
    pub fn cell(&self, row: u32, col: u32) -> Option<&FrameBuffer> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        self.cells.get(row as usize * self.grid.cols as usize + col as usize)
    }

    /// All buffers in row-major order.
    pub fn cells(&self) -> &[FrameBuffer] {
        &self.cells
    }

    /// Split into `[rows][cols]` nested vectors.
    pub fn into_rows(self) -> Vec<Vec<FrameBuffer>> {
        let cols = self.grid.cols as usize;
        let mut rows = Vec::with_capacity(self.grid.rows as usize);
        let mut it = self.cells.into_iter();
        for _ in 0..self.grid.rows {
            rows.push(it.by_ref().take(cols).collect());
        }
        rows
    }
}

/// File label of a grid cell: row letters followed by a two-digit 1-based column.
///
/// Row 0 is `A`, row 25 is `Z`, row 26 continues with `AA`.
pub fn cell_label(row: u32, col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = row as u64 + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    let row_part: String = letters.into_iter().rev().collect();
    format!("{row_part}{:02}", col as u64 + 1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
