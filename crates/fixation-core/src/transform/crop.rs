//! Crop selection and extraction.
//!
//! The crop UI works in *displayed* coordinates: the image is usually shown
//! scaled down, and the user drags a rectangle over that scaled view. When the
//! crop is applied, the rectangle is multiplied per axis by
//! `natural / displayed` to find the source rectangle in native pixels.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner of the displayed image
//! - x, y, width, height are in displayed pixels (fractional allowed)
//! - Native rectangles are whole pixels, clamped to the source bounds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Aspect ratio presets offered by the crop tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Unconstrained
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "1:1", alias = "square")]
    Square,
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 6] = [
        AspectRatio::Free,
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Standard,
        AspectRatio::Portrait,
        AspectRatio::Tall,
    ];

    /// Width divided by height, or `None` for free-form selection.
    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectRatio::Free => None,
            AspectRatio::Square => Some(1.0),
            AspectRatio::Widescreen => Some(16.0 / 9.0),
            AspectRatio::Standard => Some(4.0 / 3.0),
            AspectRatio::Portrait => Some(3.0 / 4.0),
            AspectRatio::Tall => Some(9.0 / 16.0),
        }
    }

    /// Name used by the front end, same as the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Free => "free",
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Tall => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown aspect ratio name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown aspect ratio: {0}")]
pub struct UnknownAspectRatio(pub String);

impl FromStr for AspectRatio {
    type Err = UnknownAspectRatio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(AspectRatio::Free),
            "square" | "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Widescreen),
            "4:3" => Ok(AspectRatio::Standard),
            "3:4" => Ok(AspectRatio::Portrait),
            "9:16" => Ok(AspectRatio::Tall),
            other => Err(UnknownAspectRatio(other.to_string())),
        }
    }
}

/// Size of the image as shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Per-axis factor from displayed to native pixels.
    ///
    /// A non-positive displayed extent is treated as unscaled.
    pub fn scale_to(&self, natural_width: u32, natural_height: u32) -> (f64, f64) {
        let axis = |natural: u32, shown: f64| {
            if shown > 0.0 && shown.is_finite() {
                natural as f64 / shown
            } else {
                1.0
            }
        };
        (
            axis(natural_width, self.width),
            axis(natural_height, self.height),
        )
    }
}

/// A crop rectangle in displayed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Constraint the region was drawn under
    #[serde(default)]
    pub aspect: AspectRatio,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            aspect: AspectRatio::Free,
        }
    }

    /// Default selection for an aspect preset: `coverage` of the displayed
    /// width (shrunk to fit the height when needed), centered.
    ///
    /// Returns `None` for [`AspectRatio::Free`], which starts with no
    /// selection.
    pub fn centered(aspect: AspectRatio, bounds: DisplaySize, coverage: f64) -> Option<Self> {
        let ratio = aspect.ratio()?;
        let mut width = bounds.width * coverage.clamp(0.0, 1.0);
        let mut height = width / ratio;
        if height > bounds.height {
            height = bounds.height * coverage.clamp(0.0, 1.0);
            width = height * ratio;
        }
        Some(Self {
            x: (bounds.width - width) / 2.0,
            y: (bounds.height - height) / 2.0,
            width,
            height,
            aspect,
        })
    }

    /// Fit the region to its aspect constraint, a minimum height and the
    /// displayed bounds.
    ///
    /// The width is kept where possible; the height follows from the aspect
    /// ratio. When the result would overflow, the region shrinks and is then
    /// moved back inside the bounds.
    pub fn constrained(self, bounds: DisplaySize, min_height: f64) -> Self {
        let mut width = self.width.abs().min(bounds.width);
        let mut height = self.height.abs().min(bounds.height);
        let min_height = min_height.min(bounds.height).max(0.0);

        if let Some(ratio) = self.aspect.ratio() {
            height = width / ratio;
            if height < min_height {
                height = min_height;
                width = height * ratio;
            }
            if width > bounds.width {
                width = bounds.width;
                height = width / ratio;
            }
            if height > bounds.height {
                height = bounds.height;
                width = height * ratio;
            }
        } else {
            height = height.max(min_height);
        }

        let x = self.x.clamp(0.0, (bounds.width - width).max(0.0));
        let y = self.y.clamp(0.0, (bounds.height - height).max(0.0));
        Self {
            x,
            y,
            width,
            height,
            aspect: self.aspect,
        }
    }

    /// Convert to a native-pixel rectangle for an image of the given size.
    pub fn to_native(&self, display: DisplaySize, natural_width: u32, natural_height: u32) -> PixelRect {
        let (scale_x, scale_y) = display.scale_to(natural_width, natural_height);
        PixelRect::clamped(
            self.x * scale_x,
            self.y * scale_y,
            self.width * scale_x,
            self.height * scale_y,
            natural_width,
            natural_height,
        )
    }
}

#[cfg(test)]
impl CropRegion {
    /// Whether the region lies entirely inside the bounds.
    pub fn is_within(&self, bounds: DisplaySize) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= bounds.width + f64::EPSILON
            && self.y + self.height <= bounds.height + f64::EPSILON
    }

    /// Whether width/height matches the aspect constraint within `tolerance`
    /// (relative). Free-form regions always match.
    pub fn matches_aspect(&self, tolerance: f64) -> bool {
        match self.aspect.ratio() {
            None => true,
            Some(_) if self.height <= 0.0 => false,
            Some(ratio) => ((self.width / self.height) / ratio - 1.0).abs() <= tolerance,
        }
    }
}

/// A rectangle in whole native pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Round a fractional rectangle to pixels and clamp it to the image.
    ///
    /// - Coordinates beyond the bounds are clamped
    /// - Minimum output size is 1x1
    pub fn clamped(x: f64, y: f64, width: f64, height: f64, bound_w: u32, bound_h: u32) -> Self {
        let px = |v: f64| if v.is_finite() { v.round().max(0.0) as u32 } else { 0 };

        let left = px(x).min(bound_w.saturating_sub(1));
        let top = px(y).min(bound_h.saturating_sub(1));
        let right = left.saturating_add(px(width)).min(bound_w);
        let bottom = top.saturating_add(px(height)).min(bound_h);

        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left).max(1),
            height: bottom.saturating_sub(top).max(1),
        }
    }
}

/// Extract a native-pixel rectangle from an image.
///
/// The rectangle is expected to lie inside the image (see
/// [`PixelRect::clamped`]); any part outside is clipped.
pub fn apply_crop(image: &DecodedImage, rect: PixelRect) -> DecodedImage {
    let left = rect.x.min(image.width.saturating_sub(1));
    let top = rect.y.min(image.height.saturating_sub(1));
    let out_width = rect.width.min(image.width - left).max(1);
    let out_height = rect.height.min(image.height - top).max(1);

    // Fast path: full crop returns a clone
    if left == 0 && top == 0 && out_width == image.width && out_height == image.height {
        return image.clone();
    }

    let src_stride = image.width as usize * 4;
    let row_bytes = out_width as usize * 4;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in 0..out_height as usize {
        let start = (top as usize + y) * src_stride + left as usize * 4;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage {
        width: out_width,
        height: out_height,
        pixels: output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gradient;
    use proptest::prelude::*;
    use serde::de::value::{self, StrDeserializer};
    use serde::de::IntoDeserializer;

    fn display(w: f64, h: f64) -> DisplaySize {
        DisplaySize::new(w, h)
    }

    // ===== Aspect Ratios =====

    #[test]
    fn test_aspect_parse() {
        assert_eq!("square".parse::<AspectRatio>(), Ok(AspectRatio::Square));
        assert_eq!("16:9".parse::<AspectRatio>(), Ok(AspectRatio::Widescreen));
        assert_eq!("free".parse::<AspectRatio>(), Ok(AspectRatio::Free));
        assert!("2:1".parse::<AspectRatio>().is_err());
        for aspect in AspectRatio::ALL {
            assert_eq!(aspect.label().parse::<AspectRatio>(), Ok(aspect));
        }
    }

    #[test]
    fn test_display_matches_serialized_name() {
        assert_eq!(AspectRatio::Free.to_string(), "free");
        assert_eq!(AspectRatio::Widescreen.to_string(), "16:9");
        for aspect in AspectRatio::ALL {
            let name: StrDeserializer<'_, value::Error> = aspect.label().into_deserializer();
            assert_eq!(AspectRatio::deserialize(name).ok(), Some(aspect));
        }
    }

    #[test]
    fn test_default_aspect_is_widescreen() {
        assert_eq!(AspectRatio::default(), AspectRatio::Widescreen);
    }

    // ===== Centered Defaults =====

    #[test]
    fn test_centered_widescreen() {
        let region = CropRegion::centered(AspectRatio::Widescreen, display(800.0, 600.0), 0.9).unwrap();
        assert!((region.width - 720.0).abs() < 1e-9);
        assert!((region.height - 405.0).abs() < 1e-9);
        assert!((region.x - 40.0).abs() < 1e-9);
        assert!((region.y - 97.5).abs() < 1e-9);
        assert!(region.matches_aspect(1e-9));
    }

    #[test]
    fn test_centered_tall_fits_height() {
        let bounds = display(800.0, 600.0);
        let region = CropRegion::centered(AspectRatio::Tall, bounds, 0.9).unwrap();
        assert!(region.is_within(bounds));
        assert!(region.matches_aspect(1e-9));
        assert!((region.height - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_centered_free_has_no_region() {
        assert!(CropRegion::centered(AspectRatio::Free, display(100.0, 100.0), 0.9).is_none());
    }

    // ===== Constraining =====

    #[test]
    fn test_constrain_applies_aspect() {
        let mut region = CropRegion::new(10.0, 10.0, 200.0, 50.0);
        region.aspect = AspectRatio::Square;
        let fitted = region.constrained(display(400.0, 300.0), 50.0);
        assert_eq!(fitted.width, 200.0);
        assert_eq!(fitted.height, 200.0);
        assert!(fitted.matches_aspect(1e-9));
    }

    #[test]
    fn test_constrain_moves_inside_bounds() {
        let region = CropRegion::new(350.0, 280.0, 100.0, 100.0);
        let bounds = display(400.0, 300.0);
        let fitted = region.constrained(bounds, 0.0);
        assert!(fitted.is_within(bounds));
        assert_eq!((fitted.x, fitted.y), (300.0, 200.0));
    }

    #[test]
    fn test_constrain_enforces_min_height() {
        let region = CropRegion::new(0.0, 0.0, 100.0, 10.0);
        let fitted = region.constrained(display(400.0, 300.0), 50.0);
        assert_eq!(fitted.height, 50.0);
    }

    #[test]
    fn test_constrain_shrinks_oversized_aspect_region() {
        let mut region = CropRegion::new(0.0, 0.0, 400.0, 400.0);
        region.aspect = AspectRatio::Tall;
        let bounds = display(400.0, 300.0);
        let fitted = region.constrained(bounds, 50.0);
        assert!(fitted.is_within(bounds));
        assert!(fitted.matches_aspect(1e-9));
    }

    // ===== Native Mapping =====

    #[test]
    fn test_to_native_scales_per_axis() {
        // 1000x500 image shown at 500x250: scale 2
        let region = CropRegion::new(50.0, 25.0, 100.0, 50.0);
        let rect = region.to_native(display(500.0, 250.0), 1000, 500);
        assert_eq!(
            rect,
            PixelRect {
                x: 100,
                y: 50,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn test_to_native_clamps_to_bounds() {
        let region = CropRegion::new(90.0, 90.0, 50.0, 50.0);
        let rect = region.to_native(display(100.0, 100.0), 100, 100);
        assert_eq!((rect.width, rect.height), (10, 10));
    }

    #[test]
    fn test_zero_display_means_unscaled() {
        let region = CropRegion::new(0.0, 0.0, 10.0, 10.0);
        let rect = region.to_native(display(0.0, 0.0), 100, 100);
        assert_eq!((rect.width, rect.height), (10, 10));
    }

    #[test]
    fn test_pixel_rect_minimum_size() {
        let rect = PixelRect::clamped(5.0, 5.0, 0.0, 0.2, 10, 10);
        assert_eq!((rect.width, rect.height), (1, 1));
    }

    #[test]
    fn test_pixel_rect_negative_coords() {
        let rect = PixelRect::clamped(-10.0, -10.0, 50.0, 50.0, 100, 100);
        assert_eq!((rect.x, rect.y), (0, 0));
        assert_eq!((rect.width, rect.height), (50, 50));
    }

    // ===== Extraction =====

    #[test]
    fn test_full_crop() {
        let img = gradient(20, 10);
        let result = apply_crop(&img, PixelRect { x: 0, y: 0, width: 20, height: 10 });
        assert_eq!(result, img);
    }

    #[test]
    fn test_center_crop_copies_right_pixels() {
        let img = gradient(10, 10);
        let result = apply_crop(&img, PixelRect { x: 2, y: 3, width: 4, height: 5 });

        assert_eq!((result.width, result.height), (4, 5));
        assert_eq!(result.pixels.len(), 4 * 5 * 4);
        // First output pixel comes from (2, 3) in the source
        let src = (3 * 10 + 2) * 4;
        assert_eq!(&result.pixels[..4], &img.pixels[src..src + 4]);
        // Last output pixel comes from (5, 7)
        let src = (7 * 10 + 5) * 4;
        let last = result.pixels.len() - 4;
        assert_eq!(&result.pixels[last..], &img.pixels[src..src + 4]);
    }

    #[test]
    fn test_crop_clips_oversized_rect() {
        let img = gradient(10, 10);
        let result = apply_crop(&img, PixelRect { x: 8, y: 8, width: 5, height: 5 });
        assert_eq!((result.width, result.height), (2, 2));
    }

    proptest! {
        #[test]
        fn prop_native_dimensions_follow_scale(
            natural_w in 10u32..400,
            natural_h in 10u32..400,
            shown_frac in 0.2f64..1.0,
            fx in 0.0f64..0.5,
            fy in 0.0f64..0.5,
            fw in 0.05f64..0.5,
            fh in 0.05f64..0.5,
        ) {
            let shown = display(natural_w as f64 * shown_frac, natural_h as f64 * shown_frac);
            let region = CropRegion::new(
                fx * shown.width,
                fy * shown.height,
                fw * shown.width,
                fh * shown.height,
            );
            let rect = region.to_native(shown, natural_w, natural_h);
            let expected_w = (region.width / shown_frac).round() as i64;
            let expected_h = (region.height / shown_frac).round() as i64;
            prop_assert!((rect.width as i64 - expected_w).abs() <= 1);
            prop_assert!((rect.height as i64 - expected_h).abs() <= 1);
            prop_assert!(rect.x + rect.width <= natural_w);
            prop_assert!(rect.y + rect.height <= natural_h);
        }
    }
}
