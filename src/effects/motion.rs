//! Parametric motion effects evaluated as pure functions of slide-local time.

use std::str::FromStr;
use std::sync::Arc;

use kurbo::{Affine, Point, Vec2};
use rayon::prelude::*;

use crate::effects::composite::SlideLayers;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::{FrameRgb8, RGB8_CHANNELS};

/// Scale change per second for the zoom effects.
pub const ZOOM_RATE_PER_SEC: f64 = 0.04;
/// Scale at `t = 0` for [`MotionEffect::ZoomOut`].
pub const ZOOM_OUT_START_SCALE: f64 = 1.2;
/// Smallest scale [`MotionEffect::ZoomOut`] may reach.
pub const ZOOM_OUT_MIN_SCALE: f64 = 0.2;
/// Longest [`MotionEffect::ZoomOut`] slide, the time at which its scale reaches
/// [`ZOOM_OUT_MIN_SCALE`].
pub const ZOOM_OUT_MAX_DURATION_SECS: f64 = 25.0;
/// Horizontal speed of [`MotionEffect::SlideLeft`] in pixels per second.
pub const SLIDE_SPEED_PX_PER_SEC: f64 = 20.0;

/// Closed set of motion effects applied to a slide's composite.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MotionEffect {
    /// Static composite.
    #[default]
    None,
    /// Grow from 1.0 by [`ZOOM_RATE_PER_SEC`], anchored at the centre.
    ZoomIn,
    /// Shrink from [`ZOOM_OUT_START_SCALE`] by [`ZOOM_RATE_PER_SEC`], anchored at the centre.
    ZoomOut,
    /// Drift left at [`SLIDE_SPEED_PX_PER_SEC`].
    SlideLeft,
}

impl MotionEffect {
    /// Every recognised effect.
    pub const ALL: [MotionEffect; 4] = [
        MotionEffect::None,
        MotionEffect::ZoomIn,
        MotionEffect::ZoomOut,
        MotionEffect::SlideLeft,
    ];

    /// Canonical identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            MotionEffect::None => "none",
            MotionEffect::ZoomIn => "zoom_in",
            MotionEffect::ZoomOut => "zoom_out",
            MotionEffect::SlideLeft => "slide_left",
        }
    }

    /// Longest slide this effect supports, if bounded.
    ///
    /// `ZoomOut` would reach a zero scale at 30 s; it is capped where the scale hits
    /// [`ZOOM_OUT_MIN_SCALE`].
    pub fn max_duration_secs(self) -> Option<f64> {
        match self {
            MotionEffect::ZoomOut => Some(ZOOM_OUT_MAX_DURATION_SECS),
            MotionEffect::None | MotionEffect::ZoomIn | MotionEffect::SlideLeft => None,
        }
    }

    /// Return `true` when every frame equals the static composite.
    pub fn is_static(self) -> bool {
        self == MotionEffect::None
    }

    /// Transform to apply at slide-local time `t` (seconds).
    pub fn transform_at(self, t: f64) -> MotionTransform {
        let t = t.max(0.0);
        match self {
            MotionEffect::None => MotionTransform::IDENTITY,
            MotionEffect::ZoomIn => MotionTransform::scale(1.0 + ZOOM_RATE_PER_SEC * t),
            MotionEffect::ZoomOut => MotionTransform::scale(
                (ZOOM_OUT_START_SCALE - ZOOM_RATE_PER_SEC * t).max(ZOOM_OUT_MIN_SCALE),
            ),
            // Whole-pixel steps, truncated toward zero, keep the content sharp.
            MotionEffect::SlideLeft => {
                MotionTransform::translate(Vec2::new((-SLIDE_SPEED_PX_PER_SEC * t).trunc(), 0.0))
            }
        }
    }
}

impl std::fmt::Display for MotionEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionEffect {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        MotionEffect::ALL
            .into_iter()
            .find(|e| e.as_str() == key)
            .ok_or_else(|| {
                ReelError::invalid_config(format!(
                    "unknown motion effect '{s}' (expected one of: none, zoom_in, zoom_out, slide_left)"
                ))
            })
    }
}

/// Uniform scale about the frame centre followed by a translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionTransform {
    /// Uniform scale factor, `> 0`.
    pub scale: f64,
    /// Translation in frame pixels.
    pub offset: Vec2,
}

impl MotionTransform {
    /// No scaling, no movement.
    pub const IDENTITY: MotionTransform = MotionTransform {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    /// Pure centre-anchored scale.
    pub fn scale(scale: f64) -> Self {
        Self {
            scale,
            offset: Vec2::ZERO,
        }
    }

    /// Pure translation.
    pub fn translate(offset: Vec2) -> Self {
        Self { scale: 1.0, offset }
    }

    /// Return `true` when applying the transform would not move any pixel.
    pub fn is_identity(self) -> bool {
        self.scale == 1.0 && self.offset == Vec2::ZERO
    }

    /// Map from composite coordinates to output frame coordinates.
    pub fn to_affine(self, size: FrameSize) -> Affine {
        let center = Vec2::new(f64::from(size.width) / 2.0, f64::from(size.height) / 2.0);
        Affine::translate(self.offset + center)
            * Affine::scale(self.scale)
            * Affine::translate(-center)
    }
}

/// Render one frame of a slide by applying `transform` to its composite.
///
/// Output pixels whose source position falls outside the composite show the backdrop at the
/// same output position, so vacated or uncovered areas are never empty.
pub fn apply_motion(layers: &SlideLayers, transform: MotionTransform) -> ReelResult<Arc<FrameRgb8>> {
    if transform.is_identity() {
        return Ok(layers.composite.clone());
    }
    if !transform.scale.is_finite() || transform.scale <= 0.0 {
        return Err(ReelError::render(format!(
            "motion scale must be positive, got {}",
            transform.scale
        )));
    }

    let composite = layers.composite.as_ref();
    let background = layers.background.as_ref();
    let size = composite.size();
    let inv = transform.to_affine(size).inverse();
    let (w, h) = (f64::from(size.width), f64::from(size.height));

    let stride = composite.stride();
    let mut data = vec![0u8; composite.data.len()];
    data.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..size.width as usize {
                let p = inv * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let out = &mut row[x * RGB8_CHANNELS..(x + 1) * RGB8_CHANNELS];
                if p.x >= 0.0 && p.x < w && p.y >= 0.0 && p.y < h {
                    out.copy_from_slice(&sample_bilinear(composite, p.x - 0.5, p.y - 0.5));
                } else {
                    out.copy_from_slice(&background.pixel(x as u32, y as u32));
                }
            }
        });

    Ok(Arc::new(FrameRgb8 {
        width: size.width,
        height: size.height,
        data,
    }))
}

fn sample_bilinear(frame: &FrameRgb8, sx: f64, sy: f64) -> [u8; 3] {
    let max_x = f64::from(frame.width - 1);
    let max_y = f64::from(frame.height - 1);
    let sx = sx.clamp(0.0, max_x);
    let sy = sy.clamp(0.0, max_y);
    let (x0, y0) = (sx.floor(), sy.floor());
    let (fx, fy) = (sx - x0, sy - y0);
    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(frame.width - 1);
    let y1 = (y0 + 1).min(frame.height - 1);

    let p00 = frame.pixel(x0, y0);
    let p10 = frame.pixel(x1, y0);
    let p01 = frame.pixel(x0, y1);
    let p11 = frame.pixel(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/motion.rs"]
mod tests;
