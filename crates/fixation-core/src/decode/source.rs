//! Decoding of uploaded image bytes with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode uploaded bytes into upright RGBA pixels at native resolution.
///
/// # Errors
///
/// `InvalidFormat` when the format is not recognized or not compiled in,
/// `CorruptedFile` when the data is truncated or malformed.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = read_orientation(bytes);
    let img = guessed_reader(bytes)?.decode().map_err(map_image_error)?;
    Ok(DecodedImage::from_rgba_image(
        upright(img, orientation).into_rgba8(),
    ))
}

/// Upright dimensions, read from the header only.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let (width, height) = guessed_reader(bytes)?
        .into_dimensions()
        .map_err(map_image_error)?;
    Ok(if read_orientation(bytes).swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    })
}

/// EXIF orientation of the primary image; upright when the tag is absent or
/// the container carries no EXIF at all.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)?
                .value
                .get_uint(0)
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    match reader.format() {
        Some(_) => Ok(reader),
        None => Err(DecodeError::InvalidFormat),
    }
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

fn upright(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
