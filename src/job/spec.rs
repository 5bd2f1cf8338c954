use crate::assets::decode::SourceImage;
use crate::effects::background::BlurSettings;
use crate::effects::motion::MotionEffect;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};

/// One input image with its on-screen duration and motion effect.
#[derive(Clone, Debug)]
pub struct SlideSpec {
    image: SourceImage,
    duration_secs: f64,
    effect: MotionEffect,
}

impl SlideSpec {
    /// Create a validated slide. Durations must be finite, positive, and within the effect's
    /// supported ceiling.
    pub fn new(image: SourceImage, duration_secs: f64, effect: MotionEffect) -> ReelResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(ReelError::invalid_config(format!(
                "slide '{}' duration must be > 0 seconds, got {duration_secs}",
                image.name()
            )));
        }
        if let Some(max) = effect.max_duration_secs()
            && duration_secs > max
        {
            return Err(ReelError::invalid_config(format!(
                "slide '{}' is {duration_secs}s long but effect '{effect}' supports at most {max}s",
                image.name()
            )));
        }
        Ok(Self {
            image,
            duration_secs,
            effect,
        })
    }

    /// Source pixels.
    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    /// On-screen duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Motion effect applied over the slide.
    pub fn effect(&self) -> MotionEffect {
        self.effect
    }
}

/// A validated unit of work: ordered slides rendered at one size and frame rate.
#[derive(Clone, Debug)]
pub struct RenderJob {
    frame_size: FrameSize,
    fps: Fps,
    slides: Vec<SlideSpec>,
    blur: BlurSettings,
}

impl RenderJob {
    /// Create a job from already validated slides.
    pub fn new(frame_size: FrameSize, fps: Fps, slides: Vec<SlideSpec>) -> ReelResult<Self> {
        // Values built through struct literals skip the constructors' checks.
        FrameSize::new(frame_size.width, frame_size.height)?;
        Fps::new(fps.num, fps.den)?;
        if slides.is_empty() {
            return Err(ReelError::invalid_config("a render job needs at least one image"));
        }
        Ok(Self {
            frame_size,
            fps,
            slides,
            blur: BlurSettings::default(),
        })
    }

    /// Build a job where every image shares one duration and effect.
    pub fn uniform(
        images: Vec<SourceImage>,
        frame_size: FrameSize,
        fps: Fps,
        duration_secs: f64,
        effect: MotionEffect,
    ) -> ReelResult<Self> {
        let slides = images
            .into_iter()
            .map(|img| SlideSpec::new(img, duration_secs, effect))
            .collect::<ReelResult<Vec<_>>>()?;
        Self::new(frame_size, fps, slides)
    }

    /// Override the backdrop blur.
    pub fn with_blur(mut self, blur: BlurSettings) -> ReelResult<Self> {
        if !blur.radius.is_finite() || blur.radius < 0.0 {
            return Err(ReelError::invalid_config(format!(
                "blur radius must be >= 0, got {}",
                blur.radius
            )));
        }
        self.blur = blur;
        Ok(self)
    }

    /// Output resolution.
    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Slides in timeline order.
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    /// Backdrop blur settings.
    pub fn blur(&self) -> BlurSettings {
        self.blur
    }

    /// Sum of all slide durations.
    pub fn total_duration_secs(&self) -> f64 {
        self.slides.iter().map(SlideSpec::duration_secs).sum()
    }

    /// Number of frames in the output stream.
    pub fn total_frames(&self) -> u64 {
        self.fps.frames_within(self.total_duration_secs())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/spec.rs"]
mod tests;
