//! Geometric transforms.
//!
//! Crop selection happens in displayed coordinates and is mapped to native
//! pixels when applied. Rotation, mirroring and resizing work on the whole
//! image in native pixels.

use std::fmt;

use crate::decode::{DecodeError, DecodedImage};

mod crop;
mod resize;
mod rotation;

pub use crop::{
    apply_crop, AspectRatio, CropRegion, DisplaySize, PixelRect, UnknownAspectRatio,
};
pub use resize::{resize_by_percent, resized_dimensions, MAX_RESIZE_PERCENT, MIN_RESIZE_PERCENT};
pub use rotation::{
    clamp_rotation, flip, rotate, rotated_bounds, FlipDirection, UnknownFlipDirection,
    MAX_ROTATION,
};

/// A whole-image geometry operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Counter-clockwise, in degrees
    Rotate(f64),
    /// Mirror across one axis
    Flip(FlipDirection),
    /// Percentage of the current size
    Resize(u32),
}

impl Geometry {
    pub fn apply(&self, image: &DecodedImage) -> Result<DecodedImage, DecodeError> {
        match *self {
            Geometry::Rotate(degrees) => rotate(image, degrees),
            Geometry::Flip(direction) => flip(image, direction),
            Geometry::Resize(percent) => resize_by_percent(image, percent),
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Rotate(degrees) => write!(f, "rotate {}deg", degrees),
            Geometry::Flip(direction) => write!(f, "flip {}", direction),
            Geometry::Resize(percent) => write!(f, "resize {}%", percent),
        }
    }
}
