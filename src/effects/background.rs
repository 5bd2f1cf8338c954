use image::imageops::{self, FilterType};

use crate::assets::decode::SourceImage;
use crate::effects::blur::{blur_rgb8, kernel_radius};
use crate::foundation::core::FrameSize;
use crate::foundation::error::ReelResult;
use crate::layout::fit::{center_offset, scale_to_cover};
use crate::render::frame::{FrameRgb8, RGB8_CHANNELS};

/// Frame short side at which [`BlurSettings::radius`] is specified.
pub const REFERENCE_SHORT_SIDE: u32 = 1080;

/// Backdrop blur strength.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlurSettings {
    /// Gaussian radius (standard deviation) in pixels at a 1080-pixel short side. Scaled
    /// proportionally for other resolutions.
    pub radius: f32,
}

impl Default for BlurSettings {
    fn default() -> Self {
        Self { radius: 20.0 }
    }
}

impl BlurSettings {
    /// Effective Gaussian sigma for frames of `size`.
    pub fn sigma_for(self, size: FrameSize) -> f32 {
        self.radius.max(0.0) * size.short_side() as f32 / REFERENCE_SHORT_SIDE as f32
    }
}

/// Build the blurred, frame-filling backdrop for `src`.
///
/// The source is resampled to cover the frame (Lanczos3), blurred, and centre-cropped to exactly
/// `size`. Only the crop window plus one kernel radius is blurred, which gives the same pixels
/// as blurring the whole cover image.
pub fn synthesize_background(
    src: &SourceImage,
    size: FrameSize,
    blur: BlurSettings,
) -> ReelResult<FrameRgb8> {
    let cover = scale_to_cover(src.width(), src.height(), size)?;
    let resized = if (cover.width, cover.height) == (src.width(), src.height()) {
        src.pixels().clone()
    } else {
        imageops::resize(src.pixels(), cover.width, cover.height, FilterType::Lanczos3)
    };

    let crop_x = center_offset(cover.width, size.width);
    let crop_y = center_offset(cover.height, size.height);

    let sigma = blur.sigma_for(size);
    let margin = kernel_radius(sigma);
    let win_x0 = crop_x.saturating_sub(margin);
    let win_y0 = crop_y.saturating_sub(margin);
    let win_x1 = (crop_x + size.width + margin).min(cover.width);
    let win_y1 = (crop_y + size.height + margin).min(cover.height);
    let (win_w, win_h) = (win_x1 - win_x0, win_y1 - win_y0);

    let window = imageops::crop_imm(&resized, win_x0, win_y0, win_w, win_h).to_image();
    let blurred = blur_rgb8(window.as_raw(), win_w, win_h, sigma)?;

    Ok(crop_rgb8(
        &blurred,
        win_w,
        crop_x - win_x0,
        crop_y - win_y0,
        size,
    ))
}

/// Copy a `size` window starting at `(x, y)` out of an RGB8 buffer `src_width` pixels wide.
pub(crate) fn crop_rgb8(src: &[u8], src_width: u32, x: u32, y: u32, size: FrameSize) -> FrameRgb8 {
    let src_stride = (src_width as usize) * RGB8_CHANNELS;
    let row_len = (size.width as usize) * RGB8_CHANNELS;
    let mut data = Vec::with_capacity(row_len * size.height as usize);
    for row in 0..size.height as usize {
        let start = (y as usize + row) * src_stride + (x as usize) * RGB8_CHANNELS;
        data.extend_from_slice(&src[start..start + row_len]);
    }
    FrameRgb8 {
        width: size.width,
        height: size.height,
        data,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/background.rs"]
mod tests;
