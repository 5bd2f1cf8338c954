use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use slidereel::{
    AspectPreset, DecodePolicy, FfmpegSink, FfmpegSinkOpts, FrameSize, RenderJob,
    RenderObserver, RenderOpts, SlideshowConfig,
};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version, about = "Turn still images into a slideshow video")]
struct Cli {
    /// Log render progress at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the slideshow as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Slideshow JSON; image paths inside are relative to its directory.
    #[arg(long, conflicts_with = "images")]
    config: Option<PathBuf>,

    /// Input image, in slide order. Repeat for more slides.
    #[arg(long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,

    /// Output aspect preset: 16:9, 9:16 or 1:1.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    aspect: Option<AspectPreset>,

    /// Output width in pixels (with --height).
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height in pixels (with --width).
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Seconds each image stays on screen.
    #[arg(long)]
    seconds: Option<f64>,

    /// Motion effect: none, zoom_in, zoom_out or slide_left.
    #[arg(long)]
    effect: Option<String>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Backdrop blur radius at a 1080-pixel short side.
    #[arg(long)]
    blur_radius: Option<f32>,

    /// Leave out images that fail to decode instead of failing the job.
    #[arg(long, default_value_t = false)]
    skip_undecodable: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// x264 preset.
    #[arg(long, default_value = "medium")]
    preset: String,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames rendered per chunk.
    #[arg(long, default_value_t = 48)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Timeline position in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_job(args: &JobArgs) -> anyhow::Result<RenderJob> {
    let (mut cfg, base_dir) = match &args.config {
        Some(path) => {
            let cfg = SlideshowConfig::from_path(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (cfg, base)
        }
        None => (
            SlideshowConfig {
                images: args.images.clone(),
                ..SlideshowConfig::default()
            },
            PathBuf::from("."),
        ),
    };

    if let Some(aspect) = args.aspect {
        cfg.aspect = Some(aspect);
        cfg.size = None;
    }
    if let (Some(width), Some(height)) = (args.width, args.height) {
        cfg.size = Some(FrameSize { width, height });
        cfg.aspect = None;
    }
    if let Some(seconds) = args.seconds {
        cfg.seconds_per_slide = seconds;
    }
    if let Some(effect) = &args.effect {
        cfg.effect = effect.clone();
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if let Some(radius) = args.blur_radius {
        cfg.blur_radius = radius;
    }
    if args.skip_undecodable {
        cfg.on_decode_error = DecodePolicy::Skip;
    }

    Ok(cfg.build_job(&base_dir)?)
}

struct ProgressPrinter;

impl RenderObserver for ProgressPrinter {
    fn on_slide_rendered(&mut self, index: usize, total: usize) {
        eprintln!("slide {}/{} rendered", index + 1, total);
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let job = load_job(&args.job)?;

    let opts = RenderOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        ..RenderOpts::default()
    };
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
        preset: args.preset,
    });

    let stats = slidereel::render_job_observed(&job, &opts, &mut sink, &mut ProgressPrinter)?;

    eprintln!(
        "wrote {} ({} frames, {} slides)",
        args.out.display(),
        stats.frames_total,
        stats.slides
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let job = load_job(&args.job)?;
    let frame = slidereel::render_frame_at(&job, args.time)?;

    slidereel::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
