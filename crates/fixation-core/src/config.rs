//! Editor configuration.
//!
//! Every field has a default, so a partial (or empty) object deserializes into
//! a usable config. The front end passes it as a plain JS object.

use serde::{Deserialize, Serialize};

use crate::compress::CompressionQuality;
use crate::transform::AspectRatio;

/// Container format for the output of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropFormat {
    /// Flatten over white and encode as JPEG
    #[default]
    Jpeg,
    /// Keep alpha and encode as PNG
    Png,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quality the compression slider starts at
    pub default_quality: CompressionQuality,
    /// Aspect preset selected when entering crop mode
    pub default_aspect: AspectRatio,
    /// Fraction of the displayed width a default crop region covers
    pub crop_coverage: f64,
    /// Smallest selectable crop height, in displayed pixels
    pub min_crop_height: f64,
    pub crop_format: CropFormat,
    /// JPEG quality used for crop output
    pub crop_quality: u8,
    /// Download file name without extension
    pub export_file_stem: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_quality: CompressionQuality::DEFAULT,
            default_aspect: AspectRatio::Widescreen,
            crop_coverage: 0.9,
            min_crop_height: 50.0,
            crop_format: CropFormat::Jpeg,
            crop_quality: 92,
            export_file_stem: "filtered-image".to_string(),
        }
    }
}

impl EditorConfig {
    /// Full export file name, e.g. `filtered-image.png`.
    pub fn export_file_name(&self) -> String {
        format!("{}.png", self.export_file_stem)
    }
}
