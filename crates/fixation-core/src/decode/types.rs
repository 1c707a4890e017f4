//! Decoded image buffer, EXIF orientation and decode errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not an image, or a format this build cannot read
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// Recognized format but truncated or malformed data
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// How the stored pixels must be turned to display upright, from the EXIF
/// `Orientation` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Tag 1: stored upright
    #[default]
    Normal,
    /// Tag 2: mirrored left to right
    FlipHorizontal,
    /// Tag 3: upside down
    Rotate180,
    /// Tag 4: mirrored top to bottom
    FlipVertical,
    /// Tag 5: mirrored across the main diagonal
    Transpose,
    /// Tag 6: needs a quarter turn clockwise
    Rotate90CW,
    /// Tag 7: mirrored across the anti-diagonal
    Transverse,
    /// Tag 8: needs a quarter turn counter-clockwise
    Rotate270CW,
}

impl Orientation {
    /// Tag values 1 to 8 in order; anything else reads as upright.
    const BY_TAG: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90CW,
        Orientation::Transverse,
        Orientation::Rotate270CW,
    ];

    /// Whether displaying upright exchanges width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        Self::BY_TAG[4..].contains(&self)
    }
}

impl From<u32> for Orientation {
    fn from(tag: u32) -> Self {
        tag.checked_sub(1)
            .and_then(|i| Self::BY_TAG.get(i as usize).copied())
            .unwrap_or_default()
    }
}

/// A decoded raster with straight (non-premultiplied) RGBA pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "RGBA buffer does not match {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// `None` if the buffer length does not match the dimensions.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Zero-sized or without pixel data.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// True if any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] != 255)
    }

    /// Composite over an opaque white background, returning RGB data
    /// (3 bytes per pixel).
    ///
    /// Formats without an alpha channel would otherwise render transparent
    /// regions black.
    pub fn flatten_onto_white(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for px in self.pixels.chunks_exact(4) {
            let alpha = px[3] as u32;
            let inv = 255 - alpha;
            for &c in &px[..3] {
                rgb.push(((c as u32 * alpha + 255 * inv + 127) / 255) as u8);
            }
        }
        rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid;

    #[test]
    fn test_orientation_tags() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(3), Orientation::Rotate180);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(8), Orientation::Rotate270CW);
        // Out-of-range tags read as upright
        assert_eq!(Orientation::from(0), Orientation::Normal);
        assert_eq!(Orientation::from(9), Orientation::Normal);
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        let swapping: Vec<u32> = (1..=8)
            .filter(|&tag| Orientation::from(tag).swaps_dimensions())
            .collect();
        assert_eq!(swapping, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_buffer_sizes() {
        let img = DecodedImage::new(30, 20, vec![0u8; 30 * 20 * 4]);
        assert_eq!(img.pixel_count(), 600);
        assert_eq!(img.byte_size(), 2400);
        assert!(!img.is_empty());
        assert!(DecodedImage::new(0, 4, vec![]).is_empty());
    }

    #[test]
    fn test_flatten_opaque_is_unchanged() {
        let img = DecodedImage::new(2, 1, vec![200, 100, 50, 255, 0, 0, 0, 255]);
        assert_eq!(img.flatten_onto_white(), vec![200, 100, 50, 0, 0, 0]);
    }

    #[test]
    fn test_flatten_transparent_becomes_white() {
        let img = DecodedImage::new(1, 1, vec![0, 0, 0, 0]);
        assert!(img.has_transparency());
        assert_eq!(img.flatten_onto_white(), vec![255, 255, 255]);
    }

    #[test]
    fn test_flatten_half_alpha() {
        let img = DecodedImage::new(1, 1, vec![0, 0, 0, 128]);
        let rgb = img.flatten_onto_white();
        // 255 * 127 / 255 = 127
        assert!((rgb[0] as i32 - 127).abs() <= 1);
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let img = solid(3, 2, [1, 2, 3]);
        let rgba = img.to_rgba_image().unwrap();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(DecodedImage::from_rgba_image(rgba), img);
    }

    #[test]
    fn test_corrupted_message_carries_detail() {
        let err = DecodeError::CorruptedFile("truncated".to_string());
        assert!(err.to_string().ends_with(": truncated"));
    }
}
