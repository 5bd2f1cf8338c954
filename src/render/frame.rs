use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};

/// Bytes per pixel of every frame the pipeline produces.
pub const RGB8_CHANNELS: usize = 3;

/// A rendered frame as opaque RGB8 pixels.
///
/// Frames are produced once and then shared read-only (usually behind an `Arc`); every
/// rendering step builds a new frame instead of editing an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb8 {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRgb8 {
    /// Wrap an existing buffer, checking that it matches `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        let expected = rgb8_len(width, height)?;
        if data.len() != expected {
            return Err(ReelError::render(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} rgb8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame of `size` filled with one colour.
    pub fn filled(size: FrameSize, rgb: [u8; 3]) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: rgb.repeat(size.pixel_count()),
        }
    }

    /// Frame dimensions as a [`FrameSize`].
    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Read the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = self.offset(x, y);
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Row length in bytes.
    pub fn stride(&self) -> usize {
        (self.width as usize) * RGB8_CHANNELS
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        ((y as usize) * (self.width as usize) + (x as usize)) * RGB8_CHANNELS
    }
}

impl From<image::RgbImage> for FrameRgb8 {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

pub(crate) fn rgb8_len(width: u32, height: u32) -> ReelResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(RGB8_CHANNELS))
        .ok_or_else(|| ReelError::render("frame buffer size overflow"))
}
