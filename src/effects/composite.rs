use std::sync::Arc;

use image::imageops::{self, FilterType};

use crate::assets::decode::SourceImage;
use crate::effects::background::{BlurSettings, synthesize_background};
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::fit::{center_offset, scale_to_contain};
use crate::render::frame::{FrameRgb8, RGB8_CHANNELS};

/// Where the fitted foreground landed inside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Left edge in frame pixels.
    pub x: u32,
    /// Top edge in frame pixels.
    pub y: u32,
    /// Foreground width after resampling.
    pub width: u32,
    /// Foreground height after resampling.
    pub height: u32,
}

/// The static layers of one slide.
#[derive(Clone, Debug)]
pub struct SlideLayers {
    /// Blurred, frame-filling backdrop.
    pub background: Arc<FrameRgb8>,
    /// Backdrop with the fitted foreground on top.
    pub composite: Arc<FrameRgb8>,
    /// Foreground rectangle within `composite`.
    pub placement: Placement,
}

/// Build the backdrop and the centred, uncropped foreground composite for `src`.
pub fn composite_slide(
    src: &SourceImage,
    size: FrameSize,
    blur: BlurSettings,
) -> ReelResult<SlideLayers> {
    let background = synthesize_background(src, size, blur)?;

    let fit = scale_to_contain(src.width(), src.height(), size)?;
    let fg = if (fit.width, fit.height) == (src.width(), src.height()) {
        src.pixels().clone()
    } else {
        imageops::resize(src.pixels(), fit.width, fit.height, FilterType::Lanczos3)
    };
    let placement = Placement {
        x: center_offset(size.width, fit.width),
        y: center_offset(size.height, fit.height),
        width: fit.width,
        height: fit.height,
    };
    let composite = place_opaque(&background, &fg, placement.x, placement.y)?;

    Ok(SlideLayers {
        background: Arc::new(background),
        composite: Arc::new(composite),
        placement,
    })
}

/// Copy `fg` over `base` at `(x, y)`; covered pixels are replaced, not blended.
pub fn place_opaque(base: &FrameRgb8, fg: &image::RgbImage, x: u32, y: u32) -> ReelResult<FrameRgb8> {
    let (fw, fh) = fg.dimensions();
    if x + fw > base.width || y + fh > base.height {
        return Err(ReelError::render(format!(
            "foreground {fw}x{fh} at ({x},{y}) does not fit in {}x{} frame",
            base.width, base.height
        )));
    }

    let mut out = base.clone();
    let stride = out.stride();
    let fg_stride = (fw as usize) * RGB8_CHANNELS;
    let fg_raw = fg.as_raw();
    for row in 0..fh as usize {
        let dst = (y as usize + row) * stride + (x as usize) * RGB8_CHANNELS;
        let src = row * fg_stride;
        out.data[dst..dst + fg_stride].copy_from_slice(&fg_raw[src..src + fg_stride]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
