//! Source image decoding.
//!
//! This module provides functionality for:
//! - Decoding any raster format the `image` crate is built with (JPEG, PNG,
//!   GIF, WebP) into RGBA pixels at native resolution
//! - Honouring EXIF orientation, as a browser does when drawing an `<img>`
//! - Reading dimensions without a full decode
//!
//! # Architecture
//!
//! Decoding is synchronous and single-threaded. Callers that need to keep an
//! event loop responsive run it in a worker and hand the result back.

mod source;
mod types;

pub use source::{decode_image, image_dimensions, read_orientation};
pub use types::{DecodeError, DecodedImage, Orientation};
