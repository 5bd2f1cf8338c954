use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;

use crate::assets::decode::{SourceImage, load_image};
use crate::effects::background::BlurSettings;
use crate::effects::motion::MotionEffect;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::job::spec::RenderJob;

/// Named output resolutions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AspectPreset {
    /// 1920x1080.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 1080x1920.
    #[serde(rename = "9:16")]
    Portrait,
    /// 1080x1080.
    #[serde(rename = "1:1")]
    Square,
}

impl AspectPreset {
    /// Every preset.
    pub const ALL: [AspectPreset; 3] = [
        AspectPreset::Landscape,
        AspectPreset::Portrait,
        AspectPreset::Square,
    ];

    /// Ratio label, e.g. `"16:9"`.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectPreset::Landscape => "16:9",
            AspectPreset::Portrait => "9:16",
            AspectPreset::Square => "1:1",
        }
    }

    /// Output resolution of the preset.
    pub fn frame_size(self) -> FrameSize {
        let (width, height) = match self {
            AspectPreset::Landscape => (1920, 1080),
            AspectPreset::Portrait => (1080, 1920),
            AspectPreset::Square => (1080, 1080),
        };
        FrameSize { width, height }
    }
}

impl FromStr for AspectPreset {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "16:9" | "landscape" => Ok(AspectPreset::Landscape),
            "9:16" | "portrait" => Ok(AspectPreset::Portrait),
            "1:1" | "square" => Ok(AspectPreset::Square),
            _ => Err(ReelError::invalid_config(format!(
                "unknown aspect preset '{s}' (expected 16:9, 9:16 or 1:1)"
            ))),
        }
    }
}

/// What to do with an input image that cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Fail the whole job.
    #[default]
    Fail,
    /// Log a warning and leave the image out of the timeline.
    Skip,
}

fn default_seconds_per_slide() -> f64 {
    5.0
}

fn default_effect() -> String {
    MotionEffect::None.as_str().to_owned()
}

fn default_fps() -> u32 {
    24
}

fn default_blur_radius() -> f32 {
    BlurSettings::default().radius
}

/// JSON description of a slideshow.
///
/// ```json
/// {
///   "images": ["a.jpg", "b.png"],
///   "aspect": "9:16",
///   "seconds_per_slide": 3,
///   "effect": "zoom_in"
/// }
/// ```
///
/// Image paths are resolved against the directory passed to [`SlideshowConfig::build_job`]
/// (the config file's directory for the CLI). `aspect` and `size` are mutually exclusive; with
/// neither the output is 16:9.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlideshowConfig {
    /// Input images in slide order.
    pub images: Vec<PathBuf>,
    /// Named output resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<AspectPreset>,
    /// Explicit output resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FrameSize>,
    /// On-screen time of every slide.
    #[serde(default = "default_seconds_per_slide")]
    pub seconds_per_slide: f64,
    /// Motion effect identifier applied to every slide.
    #[serde(default = "default_effect")]
    pub effect: String,
    /// Output frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Backdrop blur radius at a 1080-pixel short side.
    #[serde(default = "default_blur_radius")]
    pub blur_radius: f32,
    /// Handling of undecodable images.
    #[serde(default)]
    pub on_decode_error: DecodePolicy,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            aspect: None,
            size: None,
            seconds_per_slide: default_seconds_per_slide(),
            effect: default_effect(),
            fps: default_fps(),
            blur_radius: default_blur_radius(),
            on_decode_error: DecodePolicy::default(),
        }
    }
}

impl SlideshowConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::invalid_config(format!("parse slideshow JSON: {e}")))
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open slideshow config '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Resolved output resolution.
    pub fn frame_size(&self) -> ReelResult<FrameSize> {
        match (self.size, self.aspect) {
            (Some(_), Some(_)) => Err(ReelError::invalid_config(
                "set either 'aspect' or 'size', not both",
            )),
            (Some(size), None) => FrameSize::new(size.width, size.height),
            (None, aspect) => Ok(aspect.unwrap_or_default().frame_size()),
        }
    }

    /// Parsed motion effect.
    pub fn motion_effect(&self) -> ReelResult<MotionEffect> {
        self.effect.parse()
    }

    /// Check every setting that does not need the images themselves.
    pub fn validate(&self) -> ReelResult<()> {
        if self.images.is_empty() {
            return Err(ReelError::invalid_config("no images supplied"));
        }
        self.frame_size()?;
        self.motion_effect()?;
        Fps::integer(self.fps)?;
        if !self.seconds_per_slide.is_finite() || self.seconds_per_slide <= 0.0 {
            return Err(ReelError::invalid_config(format!(
                "seconds_per_slide must be > 0, got {}",
                self.seconds_per_slide
            )));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(ReelError::invalid_config(format!(
                "blur_radius must be >= 0, got {}",
                self.blur_radius
            )));
        }
        Ok(())
    }

    /// Decode the images (relative paths resolved against `base_dir`) and build the job.
    ///
    /// Settings are validated before any image is read.
    #[tracing::instrument(skip_all, fields(images = self.images.len()))]
    pub fn build_job(&self, base_dir: &Path) -> ReelResult<RenderJob> {
        self.validate()?;
        let paths: Vec<PathBuf> = self.images.iter().map(|p| base_dir.join(p)).collect();
        let sources = load_sources(&paths, self.on_decode_error)?;
        self.job_from_sources(sources)
    }

    /// Build the job from already decoded images.
    pub fn job_from_sources(&self, sources: Vec<SourceImage>) -> ReelResult<RenderJob> {
        RenderJob::uniform(
            sources,
            self.frame_size()?,
            Fps::integer(self.fps)?,
            self.seconds_per_slide,
            self.motion_effect()?,
        )?
        .with_blur(BlurSettings {
            radius: self.blur_radius,
        })
    }
}

/// Decode every path in order, applying `policy` to failures.
///
/// With [`DecodePolicy::Skip`] the result may be shorter than `paths`, but never empty.
pub fn load_sources(paths: &[PathBuf], policy: DecodePolicy) -> ReelResult<Vec<SourceImage>> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        match load_image(path) {
            Ok(img) => out.push(img),
            Err(e @ ReelError::DecodeFailure { .. }) if policy == DecodePolicy::Skip => {
                tracing::warn!(error = %e, "skipping undecodable image");
            }
            Err(e) => return Err(e),
        }
    }
    if out.is_empty() {
        return Err(ReelError::invalid_config(format!(
            "none of the {} images could be decoded",
            paths.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/job/config.rs"]
mod tests;
