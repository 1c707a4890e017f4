//! Rasterization pipeline.
//!
//! Each operation is a single pass from encoded bytes to encoded bytes:
//!
//! 1. Decode the source at native resolution
//! 2. Apply the operation (filter chain, crop rectangle, geometry, or nothing)
//! 3. Composite over opaque white where the output format needs it
//! 4. Encode
//!
//! Failures abort the operation with no partial output; nothing is retried.

use log::debug;
use thiserror::Error;

use crate::compress::{CompressionOutcome, CompressionQuality, CompressionStats};
use crate::config::CropFormat;
use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode_jpeg, encode_png, encode_png_rgb, EncodeError};
use crate::filter_chain::FilterChain;
use crate::filters::apply_filter_chain;
use crate::transform::{apply_crop, CropRegion, DisplaySize, Geometry};

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";

/// Errors raised by a pipeline operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Encoded output of a pipeline operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

/// Apply a filter chain for export.
///
/// The result is a PNG with exactly the source's width and height, painted
/// over white.
pub fn render_filtered(source: &[u8], chain: &FilterChain) -> Result<RenderedImage, PipelineError> {
    let mut image = decode_image(source)?;
    debug!(
        "Rendering {}x{} image with filter chain: {}",
        image.width, image.height, chain
    );

    apply_filter_chain(&mut image, chain);
    let rgb = image.flatten_onto_white();
    let bytes = encode_png_rgb(&rgb, image.width, image.height)?;

    Ok(RenderedImage {
        bytes,
        width: image.width,
        height: image.height,
        mime_type: PNG_MIME,
    })
}

/// Crop a region given in displayed coordinates.
///
/// `display` is the size the image was shown at while the region was drawn;
/// the region is scaled per axis by `natural / displayed`.
pub fn crop_image(
    source: &[u8],
    region: &CropRegion,
    display: DisplaySize,
    format: CropFormat,
    jpeg_quality: u8,
) -> Result<RenderedImage, PipelineError> {
    let image = decode_image(source)?;
    let rect = region.to_native(display, image.width, image.height);
    debug!(
        "Cropping {}x{} image to {}x{} at ({}, {})",
        image.width, image.height, rect.width, rect.height, rect.x, rect.y
    );

    let cropped = apply_crop(&image, rect);
    let (bytes, mime_type) = match format {
        CropFormat::Jpeg => {
            let rgb = cropped.flatten_onto_white();
            (
                encode_jpeg(&rgb, cropped.width, cropped.height, jpeg_quality)?,
                JPEG_MIME,
            )
        }
        CropFormat::Png => (
            encode_png(&cropped.pixels, cropped.width, cropped.height)?,
            PNG_MIME,
        ),
    };

    Ok(RenderedImage {
        bytes,
        width: cropped.width,
        height: cropped.height,
        mime_type,
    })
}

/// Rotate, mirror or resize the whole image.
///
/// The result is a PNG so transparent canvas corners from a free rotation
/// survive until export paints them white.
pub fn transform_image(source: &[u8], geometry: Geometry) -> Result<RenderedImage, PipelineError> {
    let image = decode_image(source)?;
    let transformed = geometry.apply(&image)?;
    debug!(
        "Applied {} to {}x{} image: now {}x{}",
        geometry, image.width, image.height, transformed.width, transformed.height
    );

    let bytes = encode_png(&transformed.pixels, transformed.width, transformed.height)?;
    Ok(RenderedImage {
        bytes,
        width: transformed.width,
        height: transformed.height,
        mime_type: PNG_MIME,
    })
}

/// Re-encode as JPEG at the given quality and report the size change.
pub fn compress_image(
    source: &[u8],
    quality: CompressionQuality,
) -> Result<CompressionOutcome, PipelineError> {
    let image = decode_image(source)?;
    let rgb = image.flatten_onto_white();
    let bytes = encode_jpeg(&rgb, image.width, image.height, quality.get())?;

    let stats = CompressionStats::new(quality, source.len(), bytes.len());
    debug!(
        "Compressed {}x{} image at quality {}: {} -> {} bytes ({:.1}%)",
        image.width,
        image.height,
        quality.get(),
        stats.original_size,
        stats.compressed_size,
        stats.ratio
    );

    Ok(CompressionOutcome {
        image: RenderedImage {
            bytes,
            width: image.width,
            height: image.height,
            mime_type: JPEG_MIME,
        },
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_image, DecodedImage};
    use crate::filter_chain::compile;
    use crate::params::FilterParameters;
    use crate::test_support::{checkerboard, encode_png as png_bytes, encode_test_jpeg, gradient};
    use crate::transform::{AspectRatio, FlipDirection};

    // ===== Filter Apply =====

    #[test]
    fn test_identity_render_matches_source() {
        let source = gradient(12, 9);
        let bytes = png_bytes(&source);

        let out = render_filtered(&bytes, &compile(&FilterParameters::default())).unwrap();
        assert_eq!(out.mime_type, "image/png");
        assert_eq!((out.width, out.height), (12, 9));

        let decoded = decode_image(&out.bytes).unwrap();
        assert_eq!(decoded.pixels, source.pixels);
    }

    #[test]
    fn test_render_paints_transparency_white() {
        let transparent = DecodedImage::new(2, 1, vec![0, 0, 0, 0, 10, 20, 30, 255]);
        let out = render_filtered(
            &png_bytes(&transparent),
            &compile(&FilterParameters::default()),
        )
        .unwrap();

        let decoded = decode_image(&out.bytes).unwrap();
        assert_eq!(decoded.pixels, vec![255, 255, 255, 255, 10, 20, 30, 255]);
    }

    #[test]
    fn test_render_preserves_dimensions_with_blur() {
        let mut params = FilterParameters::default();
        params.blur = 4.0;
        params.sepia = 60.0;
        let bytes = encode_test_jpeg(&checkerboard(31, 17), 90);

        let out = render_filtered(&bytes, &compile(&params)).unwrap();
        assert_eq!((out.width, out.height), (31, 17));
    }

    #[test]
    fn test_render_rejects_garbage() {
        let result = render_filtered(b"not an image", &compile(&FilterParameters::default()));
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    // ===== Crop =====

    #[test]
    fn test_crop_scales_display_coordinates() {
        let bytes = png_bytes(&gradient(400, 200));
        // Shown at half size
        let region = CropRegion::new(10.0, 20.0, 100.0, 50.0);
        let out = crop_image(
            &bytes,
            &region,
            DisplaySize::new(200.0, 100.0),
            CropFormat::Jpeg,
            92,
        )
        .unwrap();

        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!((out.width, out.height), (200, 100));
        let decoded = decode_image(&out.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (200, 100));
    }

    #[test]
    fn test_crop_png_keeps_exact_pixels() {
        let source = gradient(10, 10);
        let region = CropRegion::new(2.0, 3.0, 4.0, 5.0);
        let out = crop_image(
            &png_bytes(&source),
            &region,
            DisplaySize::new(10.0, 10.0),
            CropFormat::Png,
            92,
        )
        .unwrap();

        let decoded = decode_image(&out.bytes).unwrap();
        let src = (3 * 10 + 2) * 4;
        assert_eq!(&decoded.pixels[..4], &source.pixels[src..src + 4]);
        assert_eq!((decoded.width, decoded.height), (4, 5));
    }

    #[test]
    fn test_crop_with_aspect_region() {
        let bytes = png_bytes(&gradient(160, 90));
        let display = DisplaySize::new(160.0, 90.0);
        let region = CropRegion::centered(AspectRatio::Square, display, 0.9).unwrap();
        let out = crop_image(&bytes, &region, display, CropFormat::Jpeg, 92).unwrap();
        assert!((out.width as i64 - out.height as i64).abs() <= 1);
    }

    // ===== Geometry =====

    #[test]
    fn test_transform_rotate_quarter_turn() {
        let bytes = encode_test_jpeg(&gradient(30, 12), 95);
        let out = transform_image(&bytes, Geometry::Rotate(-90.0)).unwrap();
        assert_eq!(out.mime_type, "image/png");
        assert_eq!((out.width, out.height), (12, 30));
    }

    #[test]
    fn test_transform_free_rotation_keeps_transparent_corners() {
        let out = transform_image(&png_bytes(&gradient(20, 20)), Geometry::Rotate(45.0)).unwrap();
        let decoded = decode_image(&out.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (28, 28));
        assert_eq!(decoded.pixels[3], 0);
    }

    #[test]
    fn test_transform_flip_is_exact() {
        let source = gradient(5, 4);
        let out = transform_image(&png_bytes(&source), Geometry::Flip(FlipDirection::Horizontal))
            .unwrap();
        let decoded = decode_image(&out.bytes).unwrap();
        assert_eq!(&decoded.pixels[..4], &source.pixels[16..20]);
    }

    #[test]
    fn test_transform_resize() {
        let out = transform_image(&png_bytes(&gradient(40, 30)), Geometry::Resize(50)).unwrap();
        assert_eq!((out.width, out.height), (20, 15));
    }

    #[test]
    fn test_transform_rejects_garbage() {
        let result = transform_image(b"nope", Geometry::Resize(50));
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    // ===== Compression =====

    #[test]
    fn test_compress_reports_ratio() {
        let source = encode_test_jpeg(&gradient(64, 64), 100);
        let outcome = compress_image(&source, CompressionQuality::new(50)).unwrap();

        assert_eq!(outcome.stats.original_size, source.len());
        assert_eq!(outcome.stats.compressed_size, outcome.image.bytes.len());
        let expected = outcome.image.bytes.len() as f64 / source.len() as f64 * 100.0;
        assert!((outcome.stats.ratio - expected).abs() < 1e-9);
        assert_eq!((outcome.image.width, outcome.image.height), (64, 64));
    }

    #[test]
    fn test_compress_lower_quality_is_not_larger() {
        let source = encode_test_jpeg(&gradient(64, 64), 100);
        let low = compress_image(&source, CompressionQuality::new(20)).unwrap();
        let high = compress_image(&source, CompressionQuality::new(90)).unwrap();
        assert!(low.stats.compressed_size <= high.stats.compressed_size);
    }

    #[test]
    fn test_compress_rejects_garbage() {
        let result = compress_image(&[1, 2, 3], CompressionQuality::DEFAULT);
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }
}
