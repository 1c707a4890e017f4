//! Raster implementation of the CSS filter functions.
//!
//! Applies a compiled [`FilterChain`] to straight-alpha RGBA pixels, following
//! the Filter Effects definitions of the shorthand functions:
//!
//! - `brightness`, `contrast`, `invert`: linear transfer functions
//! - `saturate`, `grayscale`, `sepia`, `hue-rotate`: 3x3 colour matrices
//! - `blur`: Gaussian blur with the given standard deviation
//!
//! Each function clamps its result to [0, 1]. Consecutive colour functions are
//! evaluated in a single pass per pixel and rounded once; `blur` flushes the
//! pending colour functions before running. Functions at their identity value
//! are skipped, so the default chain leaves pixels bit-identical.

use image::imageops;

use crate::decode::DecodedImage;
use crate::filter_chain::{FilterChain, FilterOp};

type Matrix3 = [[f32; 3]; 3];

/// A per-pixel colour operation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorOp {
    /// `c' = c * slope + intercept`, same for every channel
    Linear { slope: f32, intercept: f32 },
    /// `rgb' = M * rgb`
    Matrix(Matrix3),
}

impl ColorOp {
    #[inline]
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match *self {
            ColorOp::Linear { slope, intercept } => {
                rgb.map(|c| (c * slope + intercept).clamp(0.0, 1.0))
            }
            ColorOp::Matrix(m) => {
                let [r, g, b] = rgb;
                [
                    (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0),
                    (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0),
                    (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0),
                ]
            }
        }
    }
}

/// Apply a filter chain to an image in place.
pub fn apply_filter_chain(image: &mut DecodedImage, chain: &FilterChain) {
    // Early exit if no adjustments
    if chain.is_identity() {
        return;
    }

    let mut pending: Vec<ColorOp> = Vec::new();
    for op in chain.ops().iter().filter(|op| !op.is_identity()) {
        match *op {
            FilterOp::Blur(sigma) => {
                apply_color_ops(&mut image.pixels, &pending);
                pending.clear();
                apply_blur(image, sigma);
            }
            other => pending.extend(color_op(other)),
        }
    }
    apply_color_ops(&mut image.pixels, &pending);
}

/// Translate a filter function to its colour operation.
///
/// Returns `None` for `blur`, which is spatial rather than per-pixel.
fn color_op(op: FilterOp) -> Option<ColorOp> {
    let op = match op {
        FilterOp::Brightness(percent) => ColorOp::Linear {
            slope: amount(percent),
            intercept: 0.0,
        },
        FilterOp::Contrast(percent) => {
            let k = amount(percent);
            ColorOp::Linear {
                slope: k,
                intercept: 0.5 - 0.5 * k,
            }
        }
        FilterOp::Invert(percent) => {
            let i = unit_amount(percent);
            ColorOp::Linear {
                slope: 1.0 - 2.0 * i,
                intercept: i,
            }
        }
        FilterOp::Saturate(percent) => ColorOp::Matrix(saturate_matrix(amount(percent))),
        FilterOp::Grayscale(percent) => {
            ColorOp::Matrix(grayscale_matrix(1.0 - unit_amount(percent)))
        }
        FilterOp::Sepia(percent) => ColorOp::Matrix(sepia_matrix(1.0 - unit_amount(percent))),
        FilterOp::HueRotate(degrees) => ColorOp::Matrix(hue_rotate_matrix(degrees)),
        FilterOp::Blur(_) => return None,
    };
    Some(op)
}

/// Percentage to a non-negative multiplier.
#[inline]
fn amount(percent: f32) -> f32 {
    (percent / 100.0).max(0.0)
}

/// Percentage to a proportion; values above 100% saturate at 1.
#[inline]
fn unit_amount(percent: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0)
}

fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

/// `keep` is the proportion of the original colour retained (1 - amount).
fn grayscale_matrix(keep: f32) -> Matrix3 {
    [
        [0.2126 + 0.7874 * keep, 0.7152 - 0.7152 * keep, 0.0722 - 0.0722 * keep],
        [0.2126 - 0.2126 * keep, 0.7152 + 0.2848 * keep, 0.0722 - 0.0722 * keep],
        [0.2126 - 0.2126 * keep, 0.7152 - 0.7152 * keep, 0.0722 + 0.9278 * keep],
    ]
}

fn sepia_matrix(keep: f32) -> Matrix3 {
    [
        [0.393 + 0.607 * keep, 0.769 - 0.769 * keep, 0.189 - 0.189 * keep],
        [0.349 - 0.349 * keep, 0.686 + 0.314 * keep, 0.168 - 0.168 * keep],
        [0.272 - 0.272 * keep, 0.534 - 0.534 * keep, 0.131 + 0.869 * keep],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Run a batch of colour operations over RGBA pixels. Alpha is untouched.
fn apply_color_ops(pixels: &mut [u8], ops: &[ColorOp]) {
    if ops.is_empty() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(4) {
        let mut rgb = [
            chunk[0] as f32 / 255.0,
            chunk[1] as f32 / 255.0,
            chunk[2] as f32 / 255.0,
        ];
        for op in ops {
            rgb = op.apply(rgb);
        }
        chunk[0] = (rgb[0] * 255.0).round() as u8;
        chunk[1] = (rgb[1] * 255.0).round() as u8;
        chunk[2] = (rgb[2] * 255.0).round() as u8;
    }
}

/// Gaussian blur in premultiplied space so transparent pixels don't bleed
/// their (meaningless) colour into neighbours.
fn apply_blur(image: &mut DecodedImage, sigma: f32) {
    if sigma <= 0.0 || !sigma.is_finite() || image.is_empty() {
        return;
    }

    let premultiply = image.has_transparency();
    if premultiply {
        for px in image.pixels.chunks_exact_mut(4) {
            let a = px[3] as u32;
            for c in &mut px[..3] {
                *c = ((*c as u32 * a + 127) / 255) as u8;
            }
        }
    }

    let Some(rgba) = image.to_rgba_image() else {
        return;
    };
    let mut blurred = imageops::blur(&rgba, sigma).into_raw();

    if premultiply {
        for px in blurred.chunks_exact_mut(4) {
            let a = px[3] as u32;
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            for c in &mut px[..3] {
                *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }

    image.pixels = blurred;
}
