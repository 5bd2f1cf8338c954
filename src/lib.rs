//! Slidereel turns a sequence of still images into a slideshow video.
//!
//! Every image becomes a slide: a blurred, frame-filling copy of the image as the backdrop, the
//! whole image fitted and centred on top, and an optional motion effect. Slides are laid end to
//! end on one timeline and streamed, in frame order, into a [`FrameSink`] such as the
//! `ffmpeg`-backed [`FfmpegSink`].
//!
//! - Describe the work as a [`RenderJob`] (directly, or from a [`SlideshowConfig`])
//! - Stream it with [`render_job`], or preview one frame with [`render_frame_at`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod effects;
/// Encoding sinks.
pub mod encode;
pub(crate) mod job;
pub(crate) mod layout;
/// Frame production.
pub mod render;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRange, FrameSize};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::decode::{SourceImage, decode_image, load_image};
pub use crate::effects::background::{BlurSettings, REFERENCE_SHORT_SIDE, synthesize_background};
pub use crate::effects::composite::{Placement, SlideLayers, composite_slide};
pub use crate::effects::motion::{
    MotionEffect, MotionTransform, SLIDE_SPEED_PX_PER_SEC, ZOOM_OUT_MAX_DURATION_SECS,
    ZOOM_OUT_MIN_SCALE, ZOOM_OUT_START_SCALE, ZOOM_RATE_PER_SEC, apply_motion,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::job::config::{AspectPreset, DecodePolicy, SlideshowConfig, load_sources};
pub use crate::job::spec::{RenderJob, SlideSpec};
pub use crate::layout::fit::{FitDims, center_offset, scale_to_contain, scale_to_cover};
pub use crate::render::frame::FrameRgb8;
pub use crate::render::pipeline::{
    CancelToken, NoopObserver, RenderObserver, RenderOpts, RenderStats, render_frame_at,
    render_job, render_job_observed, render_range,
};
pub use crate::render::slide::SlideRenderer;
pub use crate::render::timeline::Timeline;
