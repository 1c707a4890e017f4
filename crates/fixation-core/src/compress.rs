//! JPEG re-compression: quality setting, size statistics and request
//! sequencing.
//!
//! Compression runs asynchronously on the host side. Every request carries a
//! sequence number and only the result of the newest request is accepted;
//! older results that arrive late are discarded.

use serde::{Deserialize, Serialize};

use crate::pipeline::{compress_image, PipelineError, RenderedImage};

/// JPEG quality for re-compression, always a multiple of 5 in `[5, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct CompressionQuality(u8);

impl CompressionQuality {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 100;
    pub const STEP: u8 = 5;
    pub const DEFAULT: CompressionQuality = CompressionQuality(80);

    /// Snap to the nearest step and clamp to the valid range.
    pub fn new(quality: u32) -> Self {
        let step = Self::STEP as u32;
        let snapped = quality.saturating_add(step / 2) / step * step;
        Self(snapped.clamp(Self::MIN as u32, Self::MAX as u32) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for CompressionQuality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for CompressionQuality {
    fn from(quality: u32) -> Self {
        Self::new(quality)
    }
}

impl From<CompressionQuality> for u32 {
    fn from(quality: CompressionQuality) -> Self {
        quality.0 as u32
    }
}

/// Size comparison between the uploaded bytes and a compressed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    pub quality: CompressionQuality,
    pub original_size: usize,
    pub compressed_size: usize,
    /// `compressed / original * 100`. May exceed 100.
    pub ratio: f64,
}

impl CompressionStats {
    pub fn new(quality: CompressionQuality, original_size: usize, compressed_size: usize) -> Self {
        let ratio = if original_size == 0 {
            100.0
        } else {
            compressed_size as f64 / original_size as f64 * 100.0
        };
        Self {
            quality,
            original_size,
            compressed_size,
            ratio,
        }
    }

    /// Percentage saved, or 0 when the candidate is not smaller.
    pub fn saved_percent(&self) -> f64 {
        if self.is_smaller() {
            100.0 - self.ratio
        } else {
            0.0
        }
    }

    pub fn is_smaller(&self) -> bool {
        self.compressed_size < self.original_size
    }
}

/// A compressed candidate together with its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOutcome {
    pub image: RenderedImage,
    pub stats: CompressionStats,
}

/// One compression job, tagged with the sequence number it was issued under.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    pub sequence: u64,
    pub quality: CompressionQuality,
    pub source: Vec<u8>,
}

impl CompressionRequest {
    /// Run the job synchronously.
    pub fn run(&self) -> Result<CompressionOutcome, PipelineError> {
        compress_image(&self.source, self.quality)
    }
}

/// Hands out increasing sequence numbers and remembers the newest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSequencer {
    latest: u64,
    /// The latest request has not been answered yet
    outstanding: bool,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number. It becomes the only current one.
    pub fn next_sequence(&mut self) -> u64 {
        self.latest += 1;
        self.outstanding = true;
        self.latest
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest
    }

    /// Whether a result for `sequence` should still be applied.
    ///
    /// Only the latest request qualifies, and only until it is answered.
    pub fn is_current(&self, sequence: u64) -> bool {
        self.outstanding && sequence == self.latest
    }

    /// Mark the latest request as answered. Older sequences are ignored.
    pub fn settle(&mut self, sequence: u64) {
        if self.is_current(sequence) {
            self.outstanding = false;
        }
    }

    pub fn has_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Invalidate every outstanding request.
    ///
    /// Numbering only moves when a request is still waiting for its result;
    /// answered and superseded sequences are already stale.
    pub fn invalidate(&mut self) {
        if self.outstanding {
            self.latest += 1;
            self.outstanding = false;
        }
    }
}

const SIZE_UNITS: [&str; 3] = ["Bytes", "KB", "MB"];

/// Human-readable byte count: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`.
///
/// Base 1024, at most two decimals with trailing zeros dropped. Sizes of a
/// gigabyte or more are still shown in MB.
pub fn format_byte_size(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}
