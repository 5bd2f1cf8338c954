use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

/// A decoded still image, ready to be fitted into frames.
///
/// Pixels are opaque RGB8; any alpha channel in the encoded file is dropped on decode. Clones
/// share the same pixel buffer, so one image can be handed to many render workers.
#[derive(Clone, Debug)]
pub struct SourceImage {
    name: Arc<str>,
    pixels: Arc<image::RgbImage>,
}

impl SourceImage {
    /// Wrap an already decoded RGB8 image.
    pub fn from_rgb_image(name: impl Into<String>, img: image::RgbImage) -> ReelResult<Self> {
        let name = name.into();
        if img.width() == 0 || img.height() == 0 {
            return Err(ReelError::decode(name, "image has no pixels"));
        }
        Ok(Self {
            name: name.into(),
            pixels: Arc::new(img),
        })
    }

    /// Wrap a tightly packed RGB8 buffer.
    pub fn from_raw_rgb8(
        name: impl Into<String>,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> ReelResult<Self> {
        let name = name.into();
        let Some(img) = image::RgbImage::from_raw(width, height, data) else {
            return Err(ReelError::decode(
                name,
                format!("buffer does not hold {width}x{height} rgb8 pixels"),
            ));
        };
        Self::from_rgb_image(name, img)
    }

    /// Label used in logs and errors (usually the file path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Native height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the decoded pixels.
    pub fn pixels(&self) -> &image::RgbImage {
        &self.pixels
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into an RGB8 [`SourceImage`].
pub fn decode_image(name: impl Into<String>, bytes: &[u8]) -> ReelResult<SourceImage> {
    let name = name.into();
    let dyn_img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => return Err(ReelError::decode(name, e.to_string())),
    };
    SourceImage::from_rgb_image(name, dyn_img.to_rgb8())
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> ReelResult<SourceImage> {
    let name = path.display().to_string();
    let bytes = std::fs::read(path)
        .map_err(|e| ReelError::decode(name.clone(), format!("read failed: {e}")))?;
    decode_image(name, &bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
