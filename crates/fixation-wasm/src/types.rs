//! WASM-compatible wrapper types for session results.
//!
//! Byte buffers cross the boundary as `Uint8Array` copies; everything else is
//! exposed through getters so JavaScript never sees core types directly.

use fixation_core::compress::{format_byte_size, CompressionOutcome, CompressionStats};
use fixation_core::session::ExportedImage;
use fixation_core::transform::CropRegion;
use wasm_bindgen::prelude::*;

/// A crop selection in displayed coordinates.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsCropRegion {
    inner: CropRegion,
}

#[wasm_bindgen]
impl JsCropRegion {
    /// Create a free-form region.
    #[wasm_bindgen(constructor)]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> JsCropRegion {
        Self {
            inner: CropRegion::new(x, y, width, height),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f64 {
        self.inner.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f64 {
        self.inner.y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.inner.height
    }

    /// Aspect constraint label, e.g. `"16:9"` or `"free"`.
    #[wasm_bindgen(getter)]
    pub fn aspect(&self) -> String {
        self.inner.aspect.to_string()
    }
}

impl JsCropRegion {
    pub(crate) fn from_region(inner: CropRegion) -> Self {
        Self { inner }
    }

    pub(crate) fn region(&self) -> CropRegion {
        self.inner
    }
}

/// Size statistics of a compression.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsCompressionStats {
    inner: CompressionStats,
}

#[wasm_bindgen]
impl JsCompressionStats {
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u8 {
        self.inner.quality.get()
    }

    #[wasm_bindgen(getter)]
    pub fn original_size(&self) -> usize {
        self.inner.original_size
    }

    #[wasm_bindgen(getter)]
    pub fn compressed_size(&self) -> usize {
        self.inner.compressed_size
    }

    /// Compressed size as a percentage of the original.
    #[wasm_bindgen(getter)]
    pub fn ratio(&self) -> f64 {
        self.inner.ratio
    }

    #[wasm_bindgen(getter)]
    pub fn saved_percent(&self) -> f64 {
        self.inner.saved_percent()
    }

    /// Whether the compressed image is smaller than the original.
    #[wasm_bindgen(getter)]
    pub fn is_smaller(&self) -> bool {
        self.inner.is_smaller()
    }

    /// Original size for display, e.g. `"1.5 MB"`.
    pub fn original_size_label(&self) -> String {
        format_byte_size(self.inner.original_size)
    }

    pub fn compressed_size_label(&self) -> String {
        format_byte_size(self.inner.compressed_size)
    }
}

impl JsCompressionStats {
    pub(crate) fn from_stats(inner: CompressionStats) -> Self {
        Self { inner }
    }
}

/// A compressed candidate, tagged with the request it answers.
///
/// The handle belongs to the module instance that created it. To hand a
/// worker's result to the main thread, post `sequence`, `bytes()`, `width`,
/// `height` and the quality, then call `JsEditingSession.commit_compression`.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsCompressionResult {
    sequence: u32,
    outcome: CompressionOutcome,
}

#[wasm_bindgen]
impl JsCompressionResult {
    /// Request number this result answers.
    #[wasm_bindgen(getter)]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Compressed JPEG bytes as a `Uint8Array` copy.
    pub fn bytes(&self) -> Vec<u8> {
        self.outcome.image.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn stats(&self) -> JsCompressionStats {
        JsCompressionStats::from_stats(self.outcome.stats)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.outcome.image.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.outcome.image.height
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.outcome.image.mime_type.to_string()
    }
}

impl JsCompressionResult {
    pub(crate) fn new(sequence: u32, outcome: CompressionOutcome) -> Self {
        Self { sequence, outcome }
    }
}

/// An exported image ready for download.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsExportedImage {
    inner: ExportedImage,
}

#[wasm_bindgen]
impl JsExportedImage {
    /// Encoded bytes as a `Uint8Array` copy.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.bytes.len()
    }
}

impl JsExportedImage {
    pub(crate) fn from_exported(inner: ExportedImage) -> Self {
        Self { inner }
    }
}
