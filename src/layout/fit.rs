//! Scale/crop/position math for fitting a source image into a frame.
//!
//! Pure integer geometry, no pixels involved. Both fits preserve the source aspect ratio up to
//! rounding to whole pixels.

use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};

/// Pixel dimensions of a resampled image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitDims {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Dimensions that cover `target`: both sides `>=` the target, one side equal.
///
/// A source wider than the target matches the target height and overflows horizontally;
/// otherwise it matches the target width and overflows vertically.
pub fn scale_to_cover(src_width: u32, src_height: u32, target: FrameSize) -> ReelResult<FitDims> {
    let ratio = source_ratio(src_width, src_height)?;
    if ratio > target.aspect() {
        let width = (f64::from(target.height) * ratio).round() as u32;
        Ok(FitDims {
            width: width.max(target.width),
            height: target.height,
        })
    } else {
        let height = (f64::from(target.width) / ratio).round() as u32;
        Ok(FitDims {
            width: target.width,
            height: height.max(target.height),
        })
    }
}

/// Dimensions contained in `target`: both sides `<=` the target, one side equal.
pub fn scale_to_contain(
    src_width: u32,
    src_height: u32,
    target: FrameSize,
) -> ReelResult<FitDims> {
    let ratio = source_ratio(src_width, src_height)?;
    if ratio > target.aspect() {
        let height = (f64::from(target.width) / ratio).round() as u32;
        Ok(FitDims {
            width: target.width,
            height: height.clamp(1, target.height),
        })
    } else {
        let width = (f64::from(target.height) * ratio).round() as u32;
        Ok(FitDims {
            width: width.clamp(1, target.width),
            height: target.height,
        })
    }
}

/// Offset that centres a span of `inner` pixels inside `outer`.
///
/// Odd margins put the extra pixel after the inner span (floor split). When `inner` is larger
/// than `outer` this is the crop origin instead, computed the same way.
pub fn center_offset(outer: u32, inner: u32) -> u32 {
    outer.abs_diff(inner) / 2
}

fn source_ratio(width: u32, height: u32) -> ReelResult<f64> {
    if height == 0 || width == 0 {
        return Err(ReelError::invalid_config(format!(
            "source image must have positive dimensions, got {width}x{height}"
        )));
    }
    Ok(f64::from(width) / f64::from(height))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
