use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::job::spec::RenderJob;
use crate::render::frame::FrameRgb8;
use crate::render::timeline::Timeline;

const MAX_CHUNK_BYTES: u64 = 128 * 1024 * 1024;
const ENCODER_GONE: &str = "encoder thread is not accepting frames";

/// Options controlling how a job is streamed into a sink.
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames rendered per scheduling chunk.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults (one per core).
    pub threads: Option<usize>,
    /// Bounded channel capacity between the renderer and the encoder thread.
    pub channel_capacity: usize,
    /// Cooperative cancellation, checked before every frame.
    pub cancel: Option<CancelToken>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 48,
            threads: None,
            channel_capacity: 4,
            cancel: None,
        }
    }
}

/// Job render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames delivered to the sink.
    pub frames_total: u64,
    /// Frames that needed a fresh render (static slides reuse their composite).
    pub frames_rendered: u64,
    /// Slides in the job.
    pub slides: usize,
}

/// Shared flag for cancelling a render between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the render stops before its next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress callbacks for a running job.
pub trait RenderObserver: Send {
    /// Called once per slide, in order, after its last frame reached the sink.
    ///
    /// Range renders report only the slides the range touches.
    fn on_slide_rendered(&mut self, index: usize, total: usize);
}

/// Observer that ignores all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RenderObserver for NoopObserver {
    fn on_slide_rendered(&mut self, _index: usize, _total: usize) {}
}

/// Render every frame of `job` into `sink`.
pub fn render_job(
    job: &RenderJob,
    opts: &RenderOpts,
    sink: &mut dyn FrameSink,
) -> ReelResult<RenderStats> {
    render_job_observed(job, opts, sink, &mut NoopObserver)
}

/// Render every frame of `job` into `sink`, reporting per-slide progress to `observer`.
///
/// The sink receives frames in strictly increasing index order. In parallel mode, frames of a
/// chunk are rendered on a rayon pool and handed to the sink in order. On any failure the
/// sink is aborted and the error returned; the stream is never silently truncated.
#[tracing::instrument(skip_all, fields(slides = job.slides().len(), size = %job.frame_size()))]
pub fn render_job_observed(
    job: &RenderJob,
    opts: &RenderOpts,
    sink: &mut dyn FrameSink,
    observer: &mut dyn RenderObserver,
) -> ReelResult<RenderStats> {
    let timeline = Timeline::new(job);
    let frames = 0..job.total_frames();
    let slides = 0..timeline.slide_count();
    finish(stream(job, timeline, frames, slides, opts, sink, observer), sink)
}

/// Render frames `range` of `job` into `sink`.
///
/// Frame indices keep their job-timeline values, so the first frame pushed is `range.start`.
/// The range must be non-empty and lie within the job.
#[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
pub fn render_range(
    job: &RenderJob,
    range: FrameRange,
    opts: &RenderOpts,
    sink: &mut dyn FrameSink,
) -> ReelResult<RenderStats> {
    if range.is_empty() {
        return Err(ReelError::invalid_config("render range must be non-empty"));
    }
    let total = job.total_frames();
    if range.end.0 > total {
        return Err(ReelError::invalid_config(format!(
            "render range end {} exceeds the job's {total} frames",
            range.end.0
        )));
    }
    let timeline = Timeline::new(job);
    let (first, _) = timeline.locate_frame(range.start)?;
    let (last, _) = timeline.locate_frame(FrameIndex(range.end.0 - 1))?;
    let res = stream(
        job,
        timeline,
        range.start.0..range.end.0,
        first..last + 1,
        opts,
        sink,
        &mut NoopObserver,
    );
    finish(res, sink)
}

fn finish(res: ReelResult<RenderStats>, sink: &mut dyn FrameSink) -> ReelResult<RenderStats> {
    match &res {
        Ok(stats) => tracing::info!(
            frames = stats.frames_total,
            rendered = stats.frames_rendered,
            "render finished"
        ),
        Err(e) => {
            tracing::warn!(error = %e, "render failed, discarding output");
            sink.abort();
        }
    }
    res
}

/// Render the single frame at global time `t` (seconds).
pub fn render_frame_at(job: &RenderJob, t: f64) -> ReelResult<Arc<FrameRgb8>> {
    Timeline::new(job).frame_at(t)
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    slide: usize,
    frame: Arc<FrameRgb8>,
}

struct Rendered {
    slide: usize,
    frame: Arc<FrameRgb8>,
    fresh: bool,
}

fn stream(
    job: &RenderJob,
    mut timeline: Timeline,
    frames: Range<u64>,
    report: Range<usize>,
    opts: &RenderOpts,
    sink: &mut dyn FrameSink,
    observer: &mut dyn RenderObserver,
) -> ReelResult<RenderStats> {
    let frame_count = frames.end - frames.start;
    let slide_count = timeline.slide_count();
    let fps = job.fps();
    let cfg = SinkConfig {
        size: job.frame_size(),
        fps,
    };
    tracing::info!(
        frames = frame_count,
        fps = fps.as_f64(),
        parallel = opts.parallel,
        "render started"
    );

    let bytes_per_frame = (cfg.size.pixel_count() as u64).saturating_mul(3).max(1);
    let max_chunk_by_mem = (MAX_CHUNK_BYTES / bytes_per_frame).max(1);
    let chunk_size = normalized_chunk_size(opts.chunk_size)
        .min(max_chunk_by_mem)
        .min(frame_count.max(1));
    let cap = opts.channel_capacity.max(1);

    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    std::thread::scope(|scope| -> ReelResult<RenderStats> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);

        // Encoder thread: the producer sends each chunk in frame order, so frames go straight
        // through to the sink.
        let (first_frame, end_frame) = (frames.start, frames.end);
        let (first_slide, end_slide) = (report.start, report.end);
        let enc = scope.spawn(move || -> ReelResult<()> {
            sink.begin(cfg)?;

            let mut next = first_frame;
            let mut next_slide = first_slide;
            while next < end_frame {
                let msg = rx
                    .recv()
                    .map_err(|_| ReelError::render("encoder channel disconnected unexpectedly"))?;
                if msg.idx.0 != next {
                    return Err(ReelError::render(format!(
                        "encoder expected frame {next}, got {}",
                        msg.idx.0
                    )));
                }

                while next_slide < msg.slide {
                    observer.on_slide_rendered(next_slide, slide_count);
                    next_slide += 1;
                }
                sink.push_frame(msg.idx, &msg.frame)?;
                next += 1;
            }

            sink.end()?;
            while next_slide < end_slide {
                observer.on_slide_rendered(next_slide, slide_count);
                next_slide += 1;
            }
            Ok(())
        });

        let mut stats = RenderStats {
            slides: slide_count,
            ..RenderStats::default()
        };
        let produce_res = (|| -> ReelResult<()> {
            let mut chunk_start = frames.start;
            while chunk_start < frames.end {
                let chunk_end = (chunk_start + chunk_size).min(frames.end);
                check_cancel(opts)?;

                let rendered = match pool.as_ref() {
                    Some(pool) => {
                        render_chunk_parallel(&timeline, opts, pool, chunk_start, chunk_end)?
                    }
                    None => {
                        render_chunk_sequential(&timeline, opts, chunk_start, chunk_end)?
                    }
                };

                let mut last_slide = 0;
                for (f, r) in (chunk_start..chunk_end).zip(rendered) {
                    stats.frames_total += 1;
                    if r.fresh {
                        stats.frames_rendered += 1;
                    }
                    last_slide = r.slide;
                    tx.send(FrameMsg {
                        idx: FrameIndex(f),
                        slide: r.slide,
                        frame: r.frame,
                    })
                    .map_err(|_| ReelError::render(ENCODER_GONE))?;
                }

                // Slides before the current one are never revisited.
                for k in 0..last_slide {
                    timeline.evict(k);
                }
                chunk_start = chunk_end;
            }
            Ok(())
        })();

        drop(tx);
        let enc_res = enc
            .join()
            .map_err(|_| ReelError::render("encoder thread panicked"))?;

        match (produce_res, enc_res) {
            (Ok(()), Ok(())) => Ok(stats),
            (Err(p), Err(e)) if is_encoder_gone(&p) => Err(e),
            (Err(p), _) => Err(p),
            (Ok(()), Err(e)) => Err(e),
        }
    })
}

fn render_chunk_sequential(
    timeline: &Timeline,
    opts: &RenderOpts,
    start: u64,
    end: u64,
) -> ReelResult<Vec<Rendered>> {
    let mut out = Vec::with_capacity((end - start) as usize);
    for f in start..end {
        check_cancel(opts)?;
        out.push(render_one(timeline, f)?);
    }
    Ok(out)
}

fn render_chunk_parallel(
    timeline: &Timeline,
    opts: &RenderOpts,
    pool: &rayon::ThreadPool,
    start: u64,
    end: u64,
) -> ReelResult<Vec<Rendered>> {
    // Build every slide this chunk touches up front so workers never race to build one.
    let (first, _) = timeline.locate_frame(FrameIndex(start))?;
    let (last, _) = timeline.locate_frame(FrameIndex(end - 1))?;
    for k in first..=last {
        timeline.renderer(k)?;
    }

    pool.install(|| {
        (start as usize..end as usize)
            .into_par_iter()
            .map(|f| {
                check_cancel(opts)?;
                render_one(timeline, f as u64)
            })
            .collect::<ReelResult<Vec<_>>>()
    })
}

fn render_one(timeline: &Timeline, f: u64) -> ReelResult<Rendered> {
    let (slide, t_local) = timeline.locate_frame(FrameIndex(f))?;
    let renderer = timeline.renderer(slide)?;
    Ok(Rendered {
        slide,
        frame: renderer.frame_at(t_local)?,
        fresh: !renderer.effect().is_static(),
    })
}

fn check_cancel(opts: &RenderOpts) -> ReelResult<()> {
    match &opts.cancel {
        Some(token) if token.is_cancelled() => Err(ReelError::Cancelled),
        _ => Ok(()),
    }
}

fn is_encoder_gone(err: &ReelError) -> bool {
    matches!(err, ReelError::Render(msg) if msg == ENCODER_GONE)
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::invalid_config(
            "render 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
