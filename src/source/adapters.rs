//! Format-conversion adapters for static inputs.
//!
//! Pure glue: each adapter turns one input shape into a [`Frame`].
//! Failures are scoped to the one call that produced them.

use super::Frame;
use crate::error::ScanError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::Path;

/// Loads an image file and converts it to a grayscale frame.
pub fn load_image_file(path: impl AsRef<Path>) -> Result<Frame, ScanError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| ScanError::FrameSource(format!("{}: {e}", path.display())))?;
    Ok(luma_frame(img))
}

/// Converts encoded image bytes (PNG, JPEG) to a grayscale frame.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<Frame, ScanError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ScanError::FrameSource(e.to_string()))?;
    Ok(luma_frame(img))
}

/// Converts a base64-encoded image to a grayscale frame.
///
/// Accepts bare base64 or a full `data:<mime>;base64,` URL.
pub fn decode_base64_image(encoded: &str) -> Result<Frame, ScanError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| ScanError::FrameSource(format!("invalid base64: {e}")))?;
    decode_image_bytes(&bytes)
}

fn luma_frame(img: image::DynamicImage) -> Frame {
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    Frame::new(gray.into_raw(), width, height)
}
