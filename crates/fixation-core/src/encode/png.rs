//! PNG encoding for export.
//!
//! PNG is lossless and keeps full alpha, so it is the container used for the
//! downloaded result.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate, EncodeError};

/// Encode RGBA pixel data (4 bytes per pixel) to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    write_png(pixels, width, height, 4, ExtendedColorType::Rgba8)
}

/// Encode RGB pixel data (3 bytes per pixel) to PNG bytes.
pub fn encode_png_rgb(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    write_png(pixels, width, height, 3, ExtendedColorType::Rgb8)
}

fn write_png(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    color: ExtendedColorType,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, channels)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, color)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_rgba() {
        let pixels = vec![10u8, 20, 30, 40].repeat(6);
        let png = encode_png(&pixels, 3, 2).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);

        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn test_encode_png_rgb() {
        let pixels = vec![1u8, 2, 3].repeat(4);
        let png = encode_png_rgb(&pixels, 2, 2).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_wrong_length() {
        let result = encode_png(&[0u8; 12], 2, 2);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidPixelData {
                expected: 16,
                actual: 12,
                channels: 4
            })
        ));
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        assert!(matches!(
            encode_png(&[], 0, 0),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}
