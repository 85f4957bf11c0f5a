use crate::{
    foundation::core::GridConfig,
    foundation::error::{ShowError, ShowResult},
    project::model::{PatternDirection, SpatialPattern},
};

/// Milliseconds of delay per grid unit for a wave at speed 1.
pub const WAVE_STEP_MS: f64 = 100.0;
/// Milliseconds of delay per row/column for a sequential pattern at speed 1.
pub const SEQUENTIAL_STEP_MS: f64 = 200.0;
/// Milliseconds of delay per unit of distance for a radial pattern at speed 1.
pub const RADIAL_STEP_MS: f64 = 100.0;

/// Time offset in milliseconds of cell (`row`, `col`) under a spatial pattern.
///
/// Direction/pattern combinations that do not apply fall back as follows: a wave with a
/// non-wave direction has no delay; a sequential pattern steps by column unless the direction
/// is [`PatternDirection::RowByRow`]; a radial pattern runs inward unless the direction is
/// [`PatternDirection::Outward`].
///
/// Returns a validation error when `speed` is not a finite positive number.
pub fn pattern_offset_ms(
    pattern: SpatialPattern,
    direction: PatternDirection,
    speed: f64,
    row: u32,
    col: u32,
    grid: GridConfig,
) -> ShowResult<f64> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(ShowError::validation(format!(
            "patternSpeed must be finite and > 0, got {speed}"
        )));
    }
    let row = f64::from(row);
    let col = f64::from(col);

    let offset = match pattern {
        SpatialPattern::Uniform => 0.0,
        SpatialPattern::Wave => {
            let distance = match direction {
                PatternDirection::Horizontal => col,
                PatternDirection::Vertical => row,
                PatternDirection::DiagonalRight => row + col,
                PatternDirection::DiagonalLeft => row + (f64::from(grid.cols) - col - 1.0),
                _ => 0.0,
            };
            distance * (WAVE_STEP_MS / speed)
        }
        SpatialPattern::Sequential => {
            let index = if direction == PatternDirection::RowByRow {
                row
            } else {
                col
            };
            index * (SEQUENTIAL_STEP_MS / speed)
        }
        SpatialPattern::Radial => {
            let center_row = f64::from(grid.rows) / 2.0;
            let center_col = f64::from(grid.cols) / 2.0;
            let distance = (row - center_row).hypot(col - center_col);
            let max_distance = center_row.hypot(center_col);
            if direction == PatternDirection::Outward {
                distance * (RADIAL_STEP_MS / speed)
            } else {
                (max_distance - distance) * (RADIAL_STEP_MS / speed)
            }
        }
    };
    Ok(offset)
}

#[cfg(test)]
#[path = "../../tests/unit/eval/offset.rs"]
mod tests;
