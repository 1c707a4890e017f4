//! Editing session controller.
//!
//! An [`EditingSession`] owns everything one uploaded image needs: the
//! original bytes, the current (possibly cropped or compressed) bytes, the
//! filter parameters, the active preset and the editing mode with its
//! sub-state.
//!
//! Mode transitions:
//!
//! ```text
//!            enter          complete / cancel
//! Filter ──────────► Crop ──────────────────► Filter
//! Filter ──────────► Compress ──────────────► Filter
//! ```
//!
//! Entering a mode never touches the image. Completing replaces the current
//! image; cancelling discards the mode's sub-state. Rotation, mirroring and
//! resizing replace the current image directly from Filter mode.

use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compress::{
    CompressionOutcome, CompressionQuality, CompressionRequest, CompressionStats, RequestSequencer,
};
use crate::config::EditorConfig;
use crate::decode::{image_dimensions, DecodeError};
use crate::encode::EncodeError;
use crate::filter_chain::{compile, compile_filter_string, FilterChain};
use crate::params::{Channel, FilterParameters};
use crate::pipeline::{
    compress_image, crop_image, render_filtered, transform_image, PipelineError, RenderedImage,
    JPEG_MIME,
};
use crate::presets::find_preset;
use crate::transform::{AspectRatio, CropRegion, DisplaySize, FlipDirection, Geometry};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Operation requires {expected} mode, session is in {actual} mode")]
    WrongMode {
        expected: EditingMode,
        actual: EditingMode,
    },
}

impl From<PipelineError> for EditError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode(e) => EditError::Decode(e),
            PipelineError::Encode(e) => EditError::Encode(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingMode {
    /// Sliders, presets and whole-image geometry
    #[default]
    Filter,
    /// Selecting a region to keep
    Crop,
    /// Choosing a JPEG quality with a live size preview
    Compress,
}

impl fmt::Display for EditingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditingMode::Filter => "filter",
            EditingMode::Crop => "crop",
            EditingMode::Compress => "compress",
        })
    }
}

/// Crop mode sub-state.
#[derive(Debug, Clone, PartialEq)]
pub struct CropState {
    pub aspect: AspectRatio,
    /// Selection being dragged
    pub selection: Option<CropRegion>,
    /// Selection released by the user, used by apply
    pub finalized: Option<CropRegion>,
}

impl CropState {
    fn new(aspect: AspectRatio) -> Self {
        Self {
            aspect,
            selection: None,
            finalized: None,
        }
    }
}

/// Compress mode sub-state.
#[derive(Debug, Clone)]
pub struct CompressState {
    pub quality: CompressionQuality,
    sequencer: RequestSequencer,
    preview: Option<CompressionOutcome>,
}

impl CompressState {
    fn new(quality: CompressionQuality) -> Self {
        Self {
            quality,
            sequencer: RequestSequencer::new(),
            preview: None,
        }
    }

    pub fn preview(&self) -> Option<&CompressionOutcome> {
        self.preview.as_ref()
    }

    pub fn latest_sequence(&self) -> u64 {
        self.sequencer.latest_sequence()
    }
}

/// Encoded export ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// State of one uploaded image.
#[derive(Debug, Clone)]
pub struct EditingSession {
    original: Vec<u8>,
    current: Vec<u8>,
    dimensions: (u32, u32),
    params: FilterParameters,
    active_preset: Option<&'static str>,
    mode: EditingMode,
    compression_ratio: Option<f64>,
    crop: CropState,
    compress: CompressState,
    config: EditorConfig,
}

impl EditingSession {
    /// Start a session with the default configuration.
    pub fn new(bytes: Vec<u8>) -> Result<Self, EditError> {
        Self::with_config(bytes, EditorConfig::default())
    }

    /// Start a session from uploaded bytes.
    ///
    /// Only the header is read here; the image must at least report its
    /// dimensions to be accepted.
    pub fn with_config(bytes: Vec<u8>, config: EditorConfig) -> Result<Self, EditError> {
        let dimensions = image_dimensions(&bytes).inspect_err(|e| {
            warn!("Rejected upload of {} bytes: {}", bytes.len(), e);
        })?;
        info!(
            "Image uploaded: {}x{}, {} bytes",
            dimensions.0,
            dimensions.1,
            bytes.len()
        );

        Ok(Self {
            current: bytes.clone(),
            original: bytes,
            dimensions,
            params: FilterParameters::default(),
            active_preset: None,
            mode: EditingMode::Filter,
            compression_ratio: None,
            crop: CropState::new(config.default_aspect),
            compress: CompressState::new(config.default_quality),
            config,
        })
    }

    /// Replace the whole session with a new upload.
    ///
    /// On failure the session is left as it was.
    pub fn upload(&mut self, bytes: Vec<u8>) -> Result<(), EditError> {
        let config = self.config.clone();
        *self = Self::with_config(bytes, config)?;
        Ok(())
    }

    pub fn original_bytes(&self) -> &[u8] {
        &self.original
    }

    pub fn current_bytes(&self) -> &[u8] {
        &self.current
    }

    /// Natural dimensions of the current image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    pub fn active_preset(&self) -> Option<&'static str> {
        self.active_preset
    }

    pub fn mode(&self) -> EditingMode {
        self.mode
    }

    /// Ratio reported by the last completed compression.
    pub fn compression_ratio(&self) -> Option<f64> {
        self.compression_ratio
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn crop_state(&self) -> &CropState {
        &self.crop
    }

    pub fn compress_state(&self) -> &CompressState {
        &self.compress
    }

    // ===== Filters =====

    /// Replace all parameters with a preset's values.
    pub fn apply_preset(&mut self, id: &str) -> Result<(), EditError> {
        let preset = find_preset(id).ok_or_else(|| EditError::UnknownPreset(id.to_string()))?;
        self.params = preset.values;
        self.active_preset = Some(preset.id);
        info!("{} applied", preset.name);
        Ok(())
    }

    /// Set one channel from a slider. Returns the stored value.
    ///
    /// The value is clamped to the channel's range; any manual adjustment
    /// clears the active preset.
    pub fn set_channel(&mut self, channel: Channel, value: f32) -> f32 {
        let clamped = channel.clamp(value);
        self.params.set(channel, clamped);
        self.active_preset = None;
        clamped
    }

    /// Restore one channel to its default. Like any slider change, this
    /// clears the active preset.
    pub fn reset_channel(&mut self, channel: Channel) {
        self.params.set(channel, channel.default_value());
        self.active_preset = None;
        debug!("{} reset", channel.label());
    }

    /// Restore every channel to its default and clear the active preset.
    pub fn reset_filters(&mut self) {
        self.params = FilterParameters::default();
        self.active_preset = None;
        info!("Filters reset");
    }

    pub fn filter_chain(&self) -> FilterChain {
        compile(&self.params)
    }

    /// CSS filter string for the live preview.
    pub fn filter_string(&self) -> String {
        compile_filter_string(&self.params)
    }

    // ===== Modes =====

    /// Switch mode without touching the image.
    ///
    /// Leaving Crop or Compress discards its sub-state, as does re-entering
    /// it.
    pub fn set_mode(&mut self, mode: EditingMode) {
        if self.mode != mode {
            debug!("Mode {} -> {}", self.mode, mode);
        }
        self.crop = CropState::new(self.config.default_aspect);
        self.reset_compress_state();
        self.mode = mode;
    }

    /// Leave the current mode without applying anything.
    pub fn cancel(&mut self) {
        self.set_mode(EditingMode::Filter);
    }

    fn require_mode(&self, expected: EditingMode) -> Result<(), EditError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(EditError::WrongMode {
                expected,
                actual: self.mode,
            })
        }
    }

    fn reset_compress_state(&mut self) {
        // Keep numbering monotonic so a late result for a request still in
        // flight counts as stale.
        let mut sequencer = self.compress.sequencer;
        sequencer.invalidate();
        self.compress = CompressState {
            sequencer,
            ..CompressState::new(self.config.default_quality)
        };
    }

    // ===== Geometry =====

    /// Rotate counter-clockwise by `degrees`, clamped to `[-180, 180]`.
    /// Returns the new dimensions.
    pub fn rotate(&mut self, degrees: f64) -> Result<(u32, u32), EditError> {
        self.apply_geometry(Geometry::Rotate(degrees))
    }

    pub fn flip(&mut self, direction: FlipDirection) -> Result<(u32, u32), EditError> {
        self.apply_geometry(Geometry::Flip(direction))
    }

    /// Resize to `percent` of the current size, clamped to `[1, 200]`.
    pub fn resize(&mut self, percent: u32) -> Result<(u32, u32), EditError> {
        self.apply_geometry(Geometry::Resize(percent))
    }

    fn apply_geometry(&mut self, geometry: Geometry) -> Result<(u32, u32), EditError> {
        self.require_mode(EditingMode::Filter)?;
        let rendered = transform_image(&self.current, geometry)
            .inspect_err(|e| warn!("{} failed: {}", geometry, e))?;
        let dimensions = (rendered.width, rendered.height);
        self.current = rendered.bytes;
        self.dimensions = dimensions;
        info!("Applied {}: now {}x{}", geometry, dimensions.0, dimensions.1);
        Ok(dimensions)
    }

    // ===== Crop =====

    /// Pick an aspect preset. Returns the new default selection.
    ///
    /// Fixed ratios get a centered selection; Free clears it.
    pub fn set_crop_aspect(
        &mut self,
        aspect: AspectRatio,
        display: DisplaySize,
    ) -> Result<Option<CropRegion>, EditError> {
        self.require_mode(EditingMode::Crop)?;
        let region = CropRegion::centered(aspect, display, self.config.crop_coverage);
        self.crop = CropState {
            aspect,
            selection: region,
            finalized: region,
        };
        Ok(region)
    }

    /// Track a selection drag. Returns the selection after constraining it.
    pub fn update_crop_selection(
        &mut self,
        region: CropRegion,
        display: DisplaySize,
    ) -> Result<CropRegion, EditError> {
        self.require_mode(EditingMode::Crop)?;
        let constrained = CropRegion {
            aspect: self.crop.aspect,
            ..region
        }
        .constrained(display, self.config.min_crop_height);
        self.crop.selection = Some(constrained);
        Ok(constrained)
    }

    /// Finalize the current selection, as on pointer release.
    pub fn complete_crop_selection(&mut self) -> Result<Option<CropRegion>, EditError> {
        self.require_mode(EditingMode::Crop)?;
        self.crop.finalized = self.crop.selection;
        Ok(self.crop.finalized)
    }

    /// Crop the current image to the finalized selection.
    ///
    /// Without a finalized selection nothing happens and `Ok(None)` is
    /// returned. On success the cropped image becomes current, the session
    /// returns to Filter mode and the new dimensions are returned.
    pub fn apply_crop(&mut self, display: DisplaySize) -> Result<Option<(u32, u32)>, EditError> {
        self.require_mode(EditingMode::Crop)?;
        let Some(region) = self.crop.finalized else {
            debug!("Crop applied without a selection; ignoring");
            return Ok(None);
        };

        let rendered = crop_image(
            &self.current,
            &region,
            display,
            self.config.crop_format,
            self.config.crop_quality,
        )
        .inspect_err(|e| warn!("Crop failed: {}", e))?;

        let dimensions = (rendered.width, rendered.height);
        self.current = rendered.bytes;
        self.dimensions = dimensions;
        self.set_mode(EditingMode::Filter);
        info!("Image cropped to {}x{}", dimensions.0, dimensions.1);
        Ok(Some(dimensions))
    }

    // ===== Compression =====

    /// Change the quality slider and issue a fresh request for it.
    pub fn set_compression_quality(
        &mut self,
        quality: CompressionQuality,
    ) -> Result<CompressionRequest, EditError> {
        self.require_mode(EditingMode::Compress)?;
        self.compress.quality = quality;
        self.request_compression()
    }

    /// Issue a request for the current image at the current quality.
    ///
    /// Any earlier request becomes stale.
    pub fn request_compression(&mut self) -> Result<CompressionRequest, EditError> {
        self.require_mode(EditingMode::Compress)?;
        Ok(CompressionRequest {
            sequence: self.compress.sequencer.next_sequence(),
            quality: self.compress.quality,
            source: self.current.clone(),
        })
    }

    /// Hand back the result of a request.
    ///
    /// Returns `Ok(false)` when a newer request has been issued since (or the
    /// mode was left) and the result was dropped; `Ok(true)` when it became
    /// the preview. A failure of the latest request is returned as an error.
    pub fn receive_compression(
        &mut self,
        sequence: u64,
        result: Result<CompressionOutcome, PipelineError>,
    ) -> Result<bool, EditError> {
        if self.mode != EditingMode::Compress || !self.compress.sequencer.is_current(sequence) {
            warn!(
                "Discarding stale compression result #{} (latest #{})",
                sequence,
                self.compress.sequencer.latest_sequence()
            );
            return Ok(false);
        }
        self.compress.sequencer.settle(sequence);

        let outcome = result.inspect_err(|e| warn!("Compression failed: {}", e))?;
        debug!(
            "Compression preview #{}: {:.1}% of original",
            sequence, outcome.stats.ratio
        );
        self.compress.preview = Some(outcome);
        Ok(true)
    }

    /// Hand back JPEG bytes encoded elsewhere (e.g. in a Web Worker).
    ///
    /// Statistics are rebuilt against the current image, so only the
    /// encoded bytes and their dimensions need to travel back.
    pub fn receive_compressed_bytes(
        &mut self,
        sequence: u64,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        quality: CompressionQuality,
    ) -> Result<bool, EditError> {
        let stats = CompressionStats::new(quality, self.current.len(), bytes.len());
        let outcome = CompressionOutcome {
            image: RenderedImage {
                bytes,
                width,
                height,
                mime_type: JPEG_MIME,
            },
            stats,
        };
        self.receive_compression(sequence, Ok(outcome))
    }

    /// Request and run a preview synchronously.
    pub fn refresh_compression_preview(&mut self) -> Result<CompressionStats, EditError> {
        let request = self.request_compression()?;
        let result = request.run();
        self.compress.sequencer.settle(request.sequence);
        let outcome = result.inspect_err(|e| warn!("Compression failed: {}", e))?;
        let stats = outcome.stats;
        self.compress.preview = Some(outcome);
        Ok(stats)
    }

    pub fn compression_preview(&self) -> Option<&CompressionOutcome> {
        self.compress.preview.as_ref()
    }

    /// Replace the current image with its compressed version.
    ///
    /// Uses the preview when it was produced at the current quality,
    /// otherwise compresses now. Records the ratio and returns to Filter
    /// mode.
    pub fn apply_compression(&mut self) -> Result<CompressionStats, EditError> {
        self.require_mode(EditingMode::Compress)?;
        let quality = self.compress.quality;

        let outcome = match self.compress.preview.take() {
            Some(preview) if preview.stats.quality == quality => preview,
            _ => compress_image(&self.current, quality)
                .inspect_err(|e| warn!("Compression failed: {}", e))?,
        };

        let stats = outcome.stats;
        self.current = outcome.image.bytes;
        self.dimensions = (outcome.image.width, outcome.image.height);
        self.compression_ratio = Some(stats.ratio);
        self.set_mode(EditingMode::Filter);
        if stats.is_smaller() {
            info!("Image compressed: reduced to {:.1}% of original size", stats.ratio);
        } else {
            warn!("Compressed image is {:.1}% of original size", stats.ratio);
        }
        Ok(stats)
    }

    // ===== Whole image =====

    /// Restore the uploaded image and default parameters.
    ///
    /// Idempotent; the original bytes are never modified.
    pub fn revert_to_original(&mut self) {
        if self.current != self.original {
            self.current = self.original.clone();
            if let Ok(dimensions) = image_dimensions(&self.original) {
                self.dimensions = dimensions;
            }
        }
        self.params = FilterParameters::default();
        self.active_preset = None;
        self.compression_ratio = None;
        self.crop = CropState::new(self.config.default_aspect);
        self.reset_compress_state();
        info!("Reverted to original");
    }

    /// Render the current image with the current parameters as PNG.
    pub fn export(&self) -> Result<ExportedImage, EditError> {
        let rendered = render_filtered(&self.current, &self.filter_chain())
            .inspect_err(|e| warn!("Export failed: {}", e))?;
        info!("Image exported: {}x{}", rendered.width, rendered.height);

        Ok(ExportedImage {
            bytes: rendered.bytes,
            file_name: self.config.export_file_name(),
            mime_type: rendered.mime_type,
            width: rendered.width,
            height: rendered.height,
        })
    }
}
