use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use lightshow::{
    Compositor, GridConfig, GridLayout, LayoutSpacing, ProjectFile, RenderThreading,
    SequenceOpts, XsqMetadata,
    foundation::core::DEFAULT_STEP_TIME_MS,
    project::{file::read_analysis, generate::beat_sync_layers, model::Project},
};

#[derive(Parser, Debug)]
#[command(name = "lightshow", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the single-unit show to an FSEQ file.
    Render(RenderArgs),
    /// Render one FSEQ file per grid cell.
    Matrix(MatrixArgs),
    /// Export the single-unit show as an xLights sequence.
    Xsq(XsqArgs),
    /// Print the header (and optionally one frame) of an FSEQ file.
    Inspect(InspectArgs),
    /// Print the channel values of one instant.
    Frame(FrameArgs),
    /// Build a beat-synced project from audio analysis JSON.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct ThreadingArgs {
    /// Render on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Thread pool size (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,
}

impl ThreadingArgs {
    fn to_threading(&self) -> RenderThreading {
        RenderThreading {
            parallel: self.parallel,
            threads: self.threads,
            ..RenderThreading::default()
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output FSEQ path.
    #[arg(long)]
    out: PathBuf,

    /// Milliseconds per frame.
    #[arg(long, default_value_t = DEFAULT_STEP_TIME_MS)]
    step_ms: u8,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct MatrixArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving one `<label>.fseq` per cell.
    #[arg(long)]
    out_dir: PathBuf,

    /// Grid rows (defaults to the project's matrix config).
    #[arg(long)]
    rows: Option<u32>,

    /// Grid columns (defaults to the project's matrix config).
    #[arg(long)]
    cols: Option<u32>,

    /// Layout image; its size sets the grid and transparent pixels mark missing units.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Column spacing used to scale layout offsets.
    #[arg(long, default_value_t = LayoutSpacing::default().col_spacing)]
    col_spacing: f64,

    /// Row spacing used to scale layout offsets.
    #[arg(long, default_value_t = LayoutSpacing::default().row_spacing)]
    row_spacing: f64,

    /// Milliseconds per frame.
    #[arg(long, default_value_t = DEFAULT_STEP_TIME_MS)]
    step_ms: u8,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct XsqArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output `.xsq` path.
    #[arg(long)]
    out: PathBuf,

    /// Milliseconds per frame.
    #[arg(long, default_value_t = DEFAULT_STEP_TIME_MS)]
    step_ms: u8,

    /// Song title.
    #[arg(long, default_value = "")]
    song: String,

    /// Song artist.
    #[arg(long, default_value = "")]
    artist: String,

    /// Sequence author.
    #[arg(long, default_value = "")]
    author: String,

    /// Audio file name recorded in the sequence head.
    #[arg(long)]
    media_file: Option<String>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input FSEQ file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Also print this frame's channel values.
    #[arg(long)]
    frame: Option<usize>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Instant to render, in milliseconds.
    #[arg(long)]
    time_ms: f64,

    /// Cell row; renders the position-free frame when omitted.
    #[arg(long, requires = "col")]
    row: Option<u32>,

    /// Cell column.
    #[arg(long, requires = "row")]
    col: Option<u32>,

    /// Grid rows for cell rendering.
    #[arg(long)]
    rows: Option<u32>,

    /// Grid columns for cell rendering.
    #[arg(long)]
    cols: Option<u32>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Analysis JSON (`duration`, `beatTimes`, `onsetTimes` in seconds).
    #[arg(long)]
    analysis: PathBuf,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// Channels per unit.
    #[arg(long, default_value_t = lightshow::foundation::core::DEFAULT_CHANNEL_COUNT)]
    channel_count: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Matrix(args) => cmd_matrix(args),
        Command::Xsq(args) => cmd_xsq(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lightshow=info"));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        tracing::subscriber::set_global_default(builder.with_target(false).finish()).ok();
    }
}

fn load_project(path: &Path) -> anyhow::Result<ProjectFile> {
    ProjectFile::load(path).with_context(|| format!("load project '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let file = load_project(&args.in_path)?;
    let opts = SequenceOpts {
        step_time_ms: args.step_ms,
        threading: args.threading.to_threading(),
    };
    let stats = lightshow::export_fseq(&file.project, &args.out, &opts)?;
    eprintln!(
        "wrote {} ({} frames, {} dark)",
        args.out.display(),
        stats.frames_total,
        stats.frames_dark
    );
    Ok(())
}

fn cmd_matrix(args: MatrixArgs) -> anyhow::Result<()> {
    let file = load_project(&args.in_path)?;
    let layout = match &args.layout {
        Some(path) => {
            let spacing = LayoutSpacing {
                col_spacing: args.col_spacing,
                row_spacing: args.row_spacing,
            };
            GridLayout::from_image_file(path, spacing)?
        }
        None => {
            let fallback = file.matrix_config.unwrap_or_default();
            GridLayout::create_default_layout(
                args.cols.unwrap_or(fallback.cols),
                args.rows.unwrap_or(fallback.rows),
            )?
        }
    };
    let opts = SequenceOpts {
        step_time_ms: args.step_ms,
        threading: args.threading.to_threading(),
    };
    let exports = lightshow::export_matrix(&file.project, &layout, &args.out_dir, &opts)?;
    eprintln!(
        "wrote {} sequences to {}",
        exports.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_xsq(args: XsqArgs) -> anyhow::Result<()> {
    let file = load_project(&args.in_path)?;
    let mut metadata = XsqMetadata {
        author: args.author,
        song: args.song,
        artist: args.artist,
        ..XsqMetadata::default()
    };
    if let Some(media) = args.media_file.or(file.audio_file_name) {
        metadata.media_file = media;
    }
    let opts = SequenceOpts {
        step_time_ms: args.step_ms,
        ..SequenceOpts::default()
    };
    let export = lightshow::export_xsq(&file.project, &args.out, &opts, metadata)?;
    for warning in &export.warnings {
        eprintln!("warning: {warning}");
    }
    eprintln!(
        "wrote {} ({} effects)",
        args.out.display(),
        export.effect_count
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read fseq '{}'", args.in_path.display()))?;
    let seq = lightshow::encode::fseq::decode(&bytes)?;
    let h = &seq.header;
    println!("version: {}", h.version());
    println!("channels: {}", h.channel_count);
    println!("frames: {}", h.frame_count);
    println!("step_ms: {}", h.step_time_ms);
    println!("duration_s: {:.3}", seq.duration_secs());
    if let Some(idx) = args.frame {
        let frame = seq
            .get_frame(idx)
            .with_context(|| format!("frame {idx} is out of range"))?;
        println!("frame {idx}: {}", join_levels(frame));
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let file = load_project(&args.in_path)?;
    let frame = match (args.row, args.col) {
        (Some(row), Some(col)) => {
            let fallback = file.matrix_config.unwrap_or_default();
            let grid = GridConfig::new(
                args.rows.unwrap_or(fallback.rows),
                args.cols.unwrap_or(fallback.cols),
            )?;
            Compositor::render_frame_at(&file.project, args.time_ms, row, col, grid)
        }
        _ => Compositor::render_frame(&file.project, args.time_ms),
    };
    println!("{}", join_levels(frame.as_slice()));
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let analysis = read_analysis(&args.analysis)?;
    let layers = beat_sync_layers(&analysis, args.channel_count);
    let mut project = Project {
        channel_count: args.channel_count,
        ..Project::default()
    }
    .with_analysis(analysis);
    project.layers = layers;
    project.validate()?;
    let clips: usize = project.layers.iter().map(|l| l.clips.len()).sum();
    ProjectFile::new(project).save(&args.out)?;
    eprintln!("wrote {} ({clips} clips)", args.out.display());
    Ok(())
}

fn join_levels(levels: &[u8]) -> String {
    levels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
