//! Free rotation and mirroring.
//!
//! Rotation turns the image around its center and grows the canvas so no
//! corner is clipped. Positive angles turn counter-clockwise on screen.
//! Canvas area not covered by the source is left transparent.
//!
//! Exact quarter turns are remapped pixel for pixel; any other angle is
//! resampled by inverse mapping:
//!
//! ```text
//! src_x = dx * cos(θ) - dy * sin(θ) + src_cx
//! src_y = dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//!
//! where `(dx, dy)` is the output pixel center relative to the output center.

use std::fmt;
use std::str::FromStr;

use image::imageops;
use serde::{Deserialize, Serialize};

use crate::decode::{DecodeError, DecodedImage};

/// Largest rotation, in degrees, either way.
pub const MAX_ROTATION: f64 = 180.0;

/// Axis to mirror across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    /// Mirror left to right
    Horizontal,
    /// Mirror top to bottom
    Vertical,
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlipDirection::Horizontal => "horizontal",
            FlipDirection::Vertical => "vertical",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown flip direction: {0}")]
pub struct UnknownFlipDirection(pub String);

impl FromStr for FlipDirection {
    type Err = UnknownFlipDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(FlipDirection::Horizontal),
            "vertical" => Ok(FlipDirection::Vertical),
            other => Err(UnknownFlipDirection(other.to_string())),
        }
    }
}

/// Clamp to `[-180, 180]`; non-finite angles become 0.
pub fn clamp_rotation(degrees: f64) -> f64 {
    if degrees.is_finite() {
        degrees.clamp(-MAX_ROTATION, MAX_ROTATION)
    } else {
        0.0
    }
}

/// Number of counter-clockwise quarter turns, if the angle is a whole number
/// of them.
fn quarter_turns(degrees: f64) -> Option<u8> {
    let turns = degrees / 90.0;
    if (turns - turns.round()).abs() < 1e-6 {
        Some((turns.round() as i64).rem_euclid(4) as u8)
    } else {
        None
    }
}

/// Canvas size that holds the whole image after rotating by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    match quarter_turns(degrees) {
        Some(0) | Some(2) => (width, height),
        Some(_) => (height, width),
        None => {
            let radians = degrees.to_radians();
            let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
            let (w, h) = (width as f64, height as f64);
            (
                ((w * cos + h * sin).round() as u32).max(1),
                ((w * sin + h * cos).round() as u32).max(1),
            )
        }
    }
}

fn rgba_of(image: &DecodedImage) -> Result<image::RgbaImage, DecodeError> {
    image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))
}

/// Rotate counter-clockwise by `degrees`, clamped to `[-180, 180]`.
pub fn rotate(image: &DecodedImage, degrees: f64) -> Result<DecodedImage, DecodeError> {
    let degrees = clamp_rotation(degrees);
    let turned = match quarter_turns(degrees) {
        Some(0) => return Ok(image.clone()),
        Some(1) => imageops::rotate270(&rgba_of(image)?),
        Some(2) => imageops::rotate180(&rgba_of(image)?),
        Some(_) => imageops::rotate90(&rgba_of(image)?),
        None => return Ok(rotate_sampled(image, degrees)),
    };
    Ok(DecodedImage::from_rgba_image(turned))
}

/// Mirror the image across one axis.
pub fn flip(image: &DecodedImage, direction: FlipDirection) -> Result<DecodedImage, DecodeError> {
    let rgba = rgba_of(image)?;
    let flipped = match direction {
        FlipDirection::Horizontal => imageops::flip_horizontal(&rgba),
        FlipDirection::Vertical => imageops::flip_vertical(&rgba),
    };
    Ok(DecodedImage::from_rgba_image(flipped))
}

fn rotate_sampled(image: &DecodedImage, degrees: f64) -> DecodedImage {
    let (dst_w, dst_h) = rotated_bounds(image.width, image.height, degrees);
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut pixels = vec![0u8; dst_w as usize * dst_h as usize * 4];
    for (i, out) in pixels.chunks_exact_mut(4).enumerate() {
        let dst_x = (i % dst_w as usize) as f64;
        let dst_y = (i / dst_w as usize) as f64;
        let dx = dst_x + 0.5 - dst_cx;
        let dy = dst_y + 0.5 - dst_cy;

        // Back to pixel-index space of the source
        let src_x = dx * cos - dy * sin + src_cx - 0.5;
        let src_y = dx * sin + dy * cos + src_cy - 0.5;

        if let Some(px) = sample_bilinear(image, src_x, src_y) {
            out.copy_from_slice(&px);
        }
    }

    DecodedImage::new(dst_w, dst_h, pixels)
}

/// Bilinear sample in premultiplied space. `None` outside the source.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 4]> {
    if image.is_empty() {
        return None;
    }
    let (w, h) = (image.width as f64, image.height as f64);
    if x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
        return None;
    }

    let x = x.clamp(0.0, w - 1.0);
    let y = y.clamp(0.0, h - 1.0);
    let (x0, y0) = (x.floor() as usize, y.floor() as usize);
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);
    let (fx, fy) = (x - x0 as f64, y - y0 as f64);

    let corners = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x1, y0, fx * (1.0 - fy)),
        (x0, y1, (1.0 - fx) * fy),
        (x1, y1, fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (px, py, weight) in corners {
        let idx = (py * image.width as usize + px) * 4;
        let p = &image.pixels[idx..idx + 4];
        let alpha = p[3] as f64 * weight;
        acc[0] += p[0] as f64 * alpha;
        acc[1] += p[1] as f64 * alpha;
        acc[2] += p[2] as f64 * alpha;
        acc[3] += alpha;
    }

    if acc[3] <= 0.0 {
        return Some([0, 0, 0, 0]);
    }
    let channel = |v: f64| (v / acc[3]).round().clamp(0.0, 255.0) as u8;
    Some([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        acc[3].round().clamp(0.0, 255.0) as u8,
    ])
}
