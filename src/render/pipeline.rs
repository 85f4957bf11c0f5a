use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    encode::{
        sink::{FrameSink, FseqSink, InMemorySink, SinkConfig, XsqSink},
        xsq::{XsqExport, XsqMetadata},
    },
    eval::compositor::Compositor,
    foundation::{
        core::{DEFAULT_STEP_TIME_MS, FrameBuffer, GridConfig, cell_label},
        error::{ShowError, ShowResult},
    },
    layout::grid::GridLayout,
    project::model::Project,
};

/// Show length used when neither the project nor its analysis has one.
pub const FALLBACK_DURATION_MS: f64 = 10_000.0;

/// Parallelism knobs for whole-show rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderThreading {
    /// Render on a rayon pool.
    pub parallel: bool,
    /// Frames rendered per parallel batch before they are pushed to the sink.
    pub chunk_size: usize,
    /// Pool size; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Options for rendering a show into a frame sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceOpts {
    /// Milliseconds per frame.
    pub step_time_ms: u8,
    /// Parallelism.
    pub threading: RenderThreading,
}

impl Default for SequenceOpts {
    fn default() -> Self {
        Self {
            step_time_ms: DEFAULT_STEP_TIME_MS,
            threading: RenderThreading::default(),
        }
    }
}

/// Frame grid of a rendered show.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceTiming {
    /// Milliseconds per frame.
    pub step_time_ms: u8,
    /// Show length in milliseconds.
    pub duration_ms: f64,
    /// `floor(duration_ms / step_time_ms)`.
    pub frame_count: usize,
}

impl SequenceTiming {
    /// Timing for `project`: its duration, else the analysis duration, else 10 s.
    pub fn for_project(project: &Project, step_time_ms: u8) -> ShowResult<Self> {
        if step_time_ms == 0 {
            return Err(ShowError::validation("step time must be >= 1 ms"));
        }
        let duration_ms = if project.duration > 0.0 {
            project.duration
        } else if let Some(analysis) = &project.analysis
            && analysis.duration > 0.0
        {
            analysis.duration * 1000.0
        } else {
            FALLBACK_DURATION_MS
        };
        if !duration_ms.is_finite() {
            return Err(ShowError::validation("show duration must be finite"));
        }
        let frame_count = (duration_ms / f64::from(step_time_ms)).floor() as usize;
        Ok(Self {
            step_time_ms,
            duration_ms,
            frame_count,
        })
    }

    /// Render time of frame `index` in milliseconds.
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 * f64::from(self.step_time_ms)
    }
}

/// Counters reported by a sequence render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames with every channel off.
    pub frames_dark: u64,
}

/// Which unit a sequence is rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// The position-free frame.
    Unit,
    /// One grid cell.
    Cell {
        /// Row index.
        row: u32,
        /// Column index.
        col: u32,
        /// Grid the cell belongs to.
        grid: GridConfig,
    },
}

impl RenderTarget {
    fn frame(self, project: &Project, t_ms: f64) -> FrameBuffer {
        match self {
            Self::Unit => Compositor::render_frame(project, t_ms),
            Self::Cell { row, col, grid } => {
                Compositor::render_frame_at(project, t_ms, row, col, grid)
            }
        }
    }
}

/// Render the whole show for `target` into `sink`.
#[tracing::instrument(skip(project, opts, sink))]
pub fn render_to_sink(
    project: &Project,
    target: RenderTarget,
    opts: &SequenceOpts,
    sink: &mut dyn FrameSink,
) -> ShowResult<RenderStats> {
    let timing = SequenceTiming::for_project(project, opts.step_time_ms)?;
    let mut stats = RenderStats::default();
    sink.begin(SinkConfig {
        channel_count: project.channel_count,
        step_time_ms: timing.step_time_ms,
        frame_count: timing.frame_count,
    })?;

    let mut push = |idx: usize, frame: &FrameBuffer| -> ShowResult<()> {
        stats.frames_total += 1;
        if frame.as_slice().iter().all(|&v| v == 0) {
            stats.frames_dark += 1;
        }
        sink.push_frame(idx, frame)
    };

    if opts.threading.parallel {
        let pool = build_thread_pool(opts.threading.threads)?;
        let chunk = opts.threading.chunk_size.max(1);
        let mut start = 0;
        while start < timing.frame_count {
            let end = (start + chunk).min(timing.frame_count);
            let frames: Vec<FrameBuffer> = pool.install(|| {
                (start..end)
                    .into_par_iter()
                    .map(|i| target.frame(project, timing.time_of(i)))
                    .collect()
            });
            for (offset, frame) in frames.iter().enumerate() {
                push(start + offset, frame)?;
            }
            start = end;
        }
    } else {
        for i in 0..timing.frame_count {
            let frame = target.frame(project, timing.time_of(i));
            push(i, &frame)?;
        }
    }

    sink.end()?;
    Ok(stats)
}

/// Render the whole show for `target` into memory.
pub fn render_sequence(
    project: &Project,
    target: RenderTarget,
    opts: &SequenceOpts,
) -> ShowResult<Vec<FrameBuffer>> {
    let mut sink = InMemorySink::new();
    render_to_sink(project, target, opts, &mut sink)?;
    Ok(sink.into_frames())
}

/// Render the single-unit show and write it as FSEQ.
pub fn export_fseq(
    project: &Project,
    out_path: impl Into<PathBuf>,
    opts: &SequenceOpts,
) -> ShowResult<RenderStats> {
    let out_path = out_path.into();
    let mut sink = FseqSink::to_file(&out_path);
    let stats = render_to_sink(project, RenderTarget::Unit, opts, &mut sink)?;
    tracing::info!(
        path = %out_path.display(),
        frames = stats.frames_total,
        channels = project.channel_count,
        "wrote fseq"
    );
    Ok(stats)
}

/// Render the single-unit show and write it as an xLights sequence.
pub fn export_xsq(
    project: &Project,
    out_path: impl Into<PathBuf>,
    opts: &SequenceOpts,
    metadata: XsqMetadata,
) -> ShowResult<XsqExport> {
    let out_path = out_path.into();
    let mut sink = XsqSink::new(Some(out_path.clone()), metadata);
    let stats = render_to_sink(project, RenderTarget::Unit, opts, &mut sink)?;
    let export = sink
        .into_export()
        .ok_or_else(|| ShowError::validation("xsq sink finished without output"))?;
    tracing::info!(
        path = %out_path.display(),
        frames = stats.frames_total,
        effects = export.effect_count,
        warnings = export.warnings.len(),
        "wrote xsq"
    );
    Ok(export)
}

/// One per-cell file written by [`export_matrix`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellExport {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub col: u32,
    /// File stem, e.g. `A01`.
    pub label: String,
    /// Written file.
    pub path: PathBuf,
    /// Frames in the file.
    pub frame_count: u64,
}

/// Render one FSEQ file per existing layout cell into `out_dir`.
///
/// Files are named `<label>.fseq` (see [`cell_label`]). Cells are rendered on a rayon pool
/// when `opts.threading.parallel` is set; each cell's frames are then rendered serially.
#[tracing::instrument(skip(project, layout, opts), fields(rows = layout.grid.rows, cols = layout.grid.cols))]
pub fn export_matrix(
    project: &Project,
    layout: &GridLayout,
    out_dir: &Path,
    opts: &SequenceOpts,
) -> ShowResult<Vec<CellExport>> {
    let grid = layout.grid;
    let cells: Vec<(u32, u32)> = layout.existing_cells().collect();
    let cell_opts = SequenceOpts {
        threading: RenderThreading::default(),
        ..opts.clone()
    };

    let export_cell = |&(row, col): &(u32, u32)| -> ShowResult<CellExport> {
        let label = cell_label(row, col);
        let path = out_dir.join(format!("{label}.fseq"));
        let mut sink = FseqSink::to_file(&path);
        let stats = render_to_sink(
            project,
            RenderTarget::Cell { row, col, grid },
            &cell_opts,
            &mut sink,
        )?;
        Ok(CellExport {
            row,
            col,
            label,
            path,
            frame_count: stats.frames_total,
        })
    };

    let exports = if opts.threading.parallel {
        let pool = build_thread_pool(opts.threading.threads)?;
        pool.install(|| cells.par_iter().map(export_cell).collect::<ShowResult<Vec<_>>>())?
    } else {
        cells.iter().map(export_cell).collect::<ShowResult<Vec<_>>>()?
    };

    tracing::info!(
        dir = %out_dir.display(),
        files = exports.len(),
        "wrote matrix sequences"
    );
    Ok(exports)
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> ShowResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ShowError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ShowError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
