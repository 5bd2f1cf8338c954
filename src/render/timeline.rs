use std::sync::{Arc, OnceLock};

use crate::effects::background::BlurSettings;
use crate::foundation::core::{BOUNDARY_EPSILON_SECS, Fps, FrameIndex, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::job::spec::{RenderJob, SlideSpec};
use crate::render::frame::FrameRgb8;
use crate::render::slide::SlideRenderer;

/// Back-to-back sequence of slides on one continuous time axis.
///
/// Slide `k` owns the half-open interval `[start_k, start_k + duration_k)`, so a boundary time
/// always belongs to the later slide. Frame routing uses integer start frames, so float error in
/// the cumulative starts can never hand a boundary frame to the earlier slide. Slide renderers are built lazily on first use and can be
/// evicted once the timeline has moved past them.
#[derive(Debug)]
pub struct Timeline {
    frame_size: FrameSize,
    fps: Fps,
    blur: BlurSettings,
    slides: Vec<SlideSpec>,
    starts: Vec<f64>,
    start_frames: Vec<u64>,
    total_secs: f64,
    renderers: Vec<OnceLock<SlideRenderer>>,
}

impl Timeline {
    /// Lay out the slides of `job` end to end.
    pub fn new(job: &RenderJob) -> Self {
        let slides = job.slides().to_vec();
        let mut starts = Vec::with_capacity(slides.len());
        let mut acc = 0.0;
        for s in &slides {
            starts.push(acc);
            acc += s.duration_secs();
        }
        let fps = job.fps();
        let start_frames = starts.iter().map(|&s| fps.frames_within(s)).collect();
        let renderers = slides.iter().map(|_| OnceLock::new()).collect();
        Self {
            frame_size: job.frame_size(),
            fps,
            blur: job.blur(),
            slides,
            starts,
            start_frames,
            total_secs: acc,
            renderers,
        }
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// End of the timeline in seconds (exclusive).
    pub fn total_duration_secs(&self) -> f64 {
        self.total_secs
    }

    /// Timeline position where slide `k` begins.
    pub fn slide_start_secs(&self, k: usize) -> Option<f64> {
        self.starts.get(k).copied()
    }

    /// First output frame of slide `k`.
    pub fn slide_start_frame(&self, k: usize) -> Option<FrameIndex> {
        self.start_frames.get(k).copied().map(FrameIndex)
    }

    /// Map a global time to `(slide index, slide-local time)`.
    ///
    /// Times within [`BOUNDARY_EPSILON_SECS`] below a slide start belong to that slide.
    pub fn locate(&self, t_global: f64) -> ReelResult<(usize, f64)> {
        if !(t_global >= 0.0 && t_global < self.total_secs) {
            return Err(ReelError::render(format!(
                "timeline time {t_global}s outside [0, {})",
                self.total_secs
            )));
        }
        // starts[0] == 0.0 <= t_global, so the partition point is at least 1.
        let k = self
            .starts
            .partition_point(|&s| s <= t_global + BOUNDARY_EPSILON_SECS)
            - 1;
        Ok((k, self.local_time(k, t_global)))
    }

    /// Map an output frame to `(slide index, slide-local time)`.
    pub fn locate_frame(&self, idx: FrameIndex) -> ReelResult<(usize, f64)> {
        let total = self.fps.frames_within(self.total_secs);
        if idx.0 >= total {
            return Err(ReelError::render(format!(
                "frame {} outside [0, {total})",
                idx.0
            )));
        }
        // start_frames[0] == 0, so the partition point is at least 1.
        let k = self.start_frames.partition_point(|&f| f <= idx.0) - 1;
        Ok((k, self.local_time(k, self.fps.frame_time_secs(idx))))
    }

    fn local_time(&self, k: usize, t_global: f64) -> f64 {
        let duration = self.slides[k].duration_secs();
        (t_global - self.starts[k]).clamp(0.0, duration.next_down())
    }

    /// Renderer for slide `k`, building it on first use.
    pub fn renderer(&self, k: usize) -> ReelResult<&SlideRenderer> {
        let cell = self
            .renderers
            .get(k)
            .ok_or_else(|| ReelError::render(format!("slide index {k} out of range")))?;
        if let Some(r) = cell.get() {
            return Ok(r);
        }
        let spec = &self.slides[k];
        tracing::debug!(
            slide = k,
            image = spec.image().name(),
            effect = %spec.effect(),
            "building slide layers"
        );
        let built = SlideRenderer::new(spec, self.frame_size, self.blur)?;
        Ok(cell.get_or_init(|| built))
    }

    /// Drop the built layers of slide `k`; they are rebuilt if requested again.
    pub fn evict(&mut self, k: usize) {
        if let Some(cell) = self.renderers.get_mut(k) {
            cell.take();
        }
    }

    /// Return `true` when slide `k` currently holds built layers.
    pub fn is_built(&self, k: usize) -> bool {
        self.renderers.get(k).is_some_and(|c| c.get().is_some())
    }

    /// Frame at global time `t_global`.
    pub fn frame_at(&self, t_global: f64) -> ReelResult<Arc<FrameRgb8>> {
        let (k, t_local) = self.locate(t_global)?;
        self.renderer(k)?.frame_at(t_local)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/timeline.rs"]
mod tests;
