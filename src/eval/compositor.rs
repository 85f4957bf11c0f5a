use rayon::prelude::*;

use crate::{
    eval::{clip::evaluate_clip, offset::pattern_offset_ms},
    foundation::core::{FrameBuffer, GridConfig, GridFrame},
    foundation::error::ShowResult,
    project::model::{Clip, Project, SpatialPattern},
    render::pipeline::{RenderThreading, build_thread_pool},
};

/// Resolves active clips per layer and max-blends their contributions.
///
/// Every entry point is a pure function of its arguments. A structurally valid [`Project`]
/// never makes rendering fail; malformed data that slips past validation is skipped.
pub struct Compositor;

impl Compositor {
    /// Render the position-free frame at `t_ms`.
    ///
    /// Pattern clips need a grid position and contribute nothing here.
    pub fn render_frame(project: &Project, t_ms: f64) -> FrameBuffer {
        let mut out = FrameBuffer::new(project.channel_count);
        for layer in project.layers.iter().filter(|l| !l.muted) {
            if let Some(clip) = layer.active_clip(t_ms) {
                evaluate_clip(project, clip, t_ms - clip.start_time, None, &mut out);
            }
        }
        out
    }

    /// Render the frame seen by grid cell (`row`, `col`) at `t_ms`.
    ///
    /// The active clip of each layer is resolved at `t_ms`. Clips with a non-uniform spatial
    /// pattern are then shifted by the cell's delay and only contribute while `t_ms + delay`
    /// stays inside their interval.
    pub fn render_frame_at(
        project: &Project,
        t_ms: f64,
        row: u32,
        col: u32,
        grid: GridConfig,
    ) -> FrameBuffer {
        let mut out = FrameBuffer::new(project.channel_count);
        for layer in project.layers.iter().filter(|l| !l.muted) {
            let Some(clip) = layer.active_clip(t_ms) else {
                continue;
            };
            let Some(delay) = cell_delay(clip, row, col, grid) else {
                continue;
            };
            let shifted = t_ms + delay;
            if clip.contains(shifted) {
                evaluate_clip(
                    project,
                    clip,
                    shifted - clip.start_time,
                    Some((row, col)),
                    &mut out,
                );
            }
        }
        out
    }

    /// Render every cell of `grid` at `t_ms`.
    ///
    /// When no clip depends on position the position-free frame is computed once and copied to
    /// every cell.
    #[tracing::instrument(skip(project), fields(layers = project.layers.len()))]
    pub fn render_grid(project: &Project, t_ms: f64, grid: GridConfig) -> GridFrame {
        if !project.has_positional_clips() {
            let base = Self::render_frame(project, t_ms);
            return GridFrame::from_cells(grid, vec![base; grid.cell_count()]);
        }
        let cells = grid
            .cells()
            .map(|(r, c)| Self::render_frame_at(project, t_ms, r, c, grid))
            .collect();
        GridFrame::from_cells(grid, cells)
    }

    /// Like [`Compositor::render_grid`], evaluating cells on a rayon pool when
    /// `threading.parallel` is set.
    #[tracing::instrument(skip(project, threading), fields(parallel = threading.parallel))]
    pub fn render_grid_with(
        project: &Project,
        t_ms: f64,
        grid: GridConfig,
        threading: &RenderThreading,
    ) -> ShowResult<GridFrame> {
        if !threading.parallel || !project.has_positional_clips() {
            return Ok(Self::render_grid(project, t_ms, grid));
        }
        let pool = build_thread_pool(threading.threads)?;
        let coords: Vec<(u32, u32)> = grid.cells().collect();
        let cells = pool.install(|| {
            coords
                .par_iter()
                .map(|&(r, c)| Self::render_frame_at(project, t_ms, r, c, grid))
                .collect()
        });
        Ok(GridFrame::from_cells(grid, cells))
    }
}

/// Delay of `clip` at a cell, or `None` when the clip's pattern parameters are unusable.
fn cell_delay(clip: &Clip, row: u32, col: u32, grid: GridConfig) -> Option<f64> {
    if clip.pattern == SpatialPattern::Uniform {
        return Some(0.0);
    }
    match pattern_offset_ms(
        clip.pattern,
        clip.pattern_direction,
        clip.pattern_speed,
        row,
        col,
        grid,
    ) {
        Ok(delay) => Some(delay),
        Err(err) => {
            tracing::debug!(clip = %clip.id, error = %err, "skipping clip with invalid pattern");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/compositor.rs"]
mod tests;
