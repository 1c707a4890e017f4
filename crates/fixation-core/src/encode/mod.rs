//! Image encoding.
//!
//! This module provides functionality for:
//! - Encoding RGB pixels to JPEG with a quality setting (crop and compression)
//! - Encoding RGBA pixels to PNG (export)
//!
//! All operations are synchronous and single-threaded.

mod jpeg;
mod png;

use thiserror::Error;

pub use jpeg::encode_jpeg;
pub use png::{encode_png, encode_png_rgb};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * {channels}), got {actual}")]
    InvalidPixelData {
        expected: usize,
        actual: usize,
        channels: usize,
    },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Check dimensions and buffer length before handing pixels to an encoder.
fn validate(pixels: &[u8], width: u32, height: u32, channels: usize) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
            channels,
        });
    }
    Ok(())
}
