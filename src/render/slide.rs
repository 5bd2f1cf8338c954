use std::sync::Arc;

use crate::effects::background::BlurSettings;
use crate::effects::composite::{SlideLayers, composite_slide};
use crate::effects::motion::{MotionEffect, apply_motion};
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};
use crate::job::spec::SlideSpec;
use crate::render::frame::FrameRgb8;

/// Time-varying frame generator for one slide.
///
/// The backdrop and foreground composite are built once at construction; [`frame_at`] is then a
/// pure function of slide-local time.
///
/// [`frame_at`]: SlideRenderer::frame_at
#[derive(Debug)]
pub struct SlideRenderer {
    duration_secs: f64,
    effect: MotionEffect,
    layers: SlideLayers,
}

impl SlideRenderer {
    /// Build the static layers for `spec` at `size`.
    pub fn new(spec: &SlideSpec, size: FrameSize, blur: BlurSettings) -> ReelResult<Self> {
        let layers = composite_slide(spec.image(), size, blur)?;
        Ok(Self {
            duration_secs: spec.duration_secs(),
            effect: spec.effect(),
            layers,
        })
    }

    /// Slide duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Motion effect applied by [`SlideRenderer::frame_at`].
    pub fn effect(&self) -> MotionEffect {
        self.effect
    }

    /// Static layers (backdrop and composite).
    pub fn layers(&self) -> &SlideLayers {
        &self.layers
    }

    /// Frame at slide-local time `t_local`, which must lie in `[0, duration)`.
    ///
    /// Static effects return the shared composite.
    pub fn frame_at(&self, t_local: f64) -> ReelResult<Arc<FrameRgb8>> {
        if !(t_local >= 0.0 && t_local < self.duration_secs) {
            return Err(ReelError::render(format!(
                "slide time {t_local}s outside [0, {})",
                self.duration_secs
            )));
        }
        if self.effect.is_static() {
            return Ok(self.layers.composite.clone());
        }
        apply_motion(&self.layers, self.effect.transform_at(t_local))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/slide.rs"]
mod tests;
