//! Resizing by percentage.

use image::imageops::{self, FilterType};

use crate::decode::{DecodeError, DecodedImage};

pub const MIN_RESIZE_PERCENT: u32 = 1;
pub const MAX_RESIZE_PERCENT: u32 = 200;

/// Target size for a resize by `percent`, clamped to `[1, 200]`.
///
/// Each side is truncated and kept at least one pixel.
pub fn resized_dimensions(width: u32, height: u32, percent: u32) -> (u32, u32) {
    let percent = percent.clamp(MIN_RESIZE_PERCENT, MAX_RESIZE_PERCENT) as u64;
    let scale = |side: u32| ((side as u64 * percent / 100) as u32).max(1);
    (scale(width), scale(height))
}

/// Resample to `percent` of the current size with a Lanczos3 filter.
///
/// # Errors
///
/// `CorruptedFile` if the pixel buffer does not match the dimensions.
pub fn resize_by_percent(image: &DecodedImage, percent: u32) -> Result<DecodedImage, DecodeError> {
    let (width, height) = resized_dimensions(image.width, image.height, percent);
    if (width, height) == (image.width, image.height) {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;
    let resized = imageops::resize(&rgba, width, height, FilterType::Lanczos3);
    Ok(DecodedImage::from_rgba_image(resized))
}
