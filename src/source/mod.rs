//! Pixel sources and input adapters.
//!
//! Everything the scanner consumes satisfies one contract: yield, on
//! demand, a single still grayscale frame with known dimensions. Live
//! video streams satisfy it by snapshotting their current frame; the
//! adapters here satisfy it for static inputs (raw buffers, image
//! files, encoded bytes, base64 strings).

mod adapters;

pub use adapters::{decode_base64_image, decode_image_bytes, load_image_file};

use crate::error::ScanError;

/// A single still frame: 8-bit grayscale pixels, row-major.
#[derive(Clone)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Creates a frame from raw pixel data and dimensions.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == (self.width as usize) * (self.height as usize)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

/// Anything able to yield one still frame on demand.
pub trait PixelSource {
    /// Produces the source's current frame.
    fn frame(&mut self) -> Result<Frame, ScanError>;
}

/// A raw gray buffer is itself a pixel source. Mismatched dimensions
/// surface as a frame-source error at scan time.
impl PixelSource for Frame {
    fn frame(&mut self) -> Result<Frame, ScanError> {
        if !self.is_valid() {
            return Err(ScanError::FrameSource(format!(
                "buffer size {} does not match {}x{}",
                self.pixels.len(),
                self.width,
                self.height
            )));
        }
        Ok(self.clone())
    }
}
