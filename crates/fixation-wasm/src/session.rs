//! Editing session WASM bindings.
//!
//! `JsEditingSession` wraps the core session one-to-one. Display sizes are
//! passed as separate width/height numbers; channel, mode and aspect names use
//! the same strings as the front end (`"hueRotate"`, `"crop"`, `"16:9"`,
//! `"horizontal"`).

use fixation_core::compress::CompressionQuality;
use fixation_core::config::EditorConfig;
use fixation_core::params::Channel;
use fixation_core::session::{EditingMode, EditingSession};
use fixation_core::transform::{AspectRatio, DisplaySize, FlipDirection};
use wasm_bindgen::prelude::*;

use crate::download::object_url;
use crate::types::{JsCompressionResult, JsCompressionStats, JsCropRegion, JsExportedImage};

/// One uploaded image and everything done to it.
#[wasm_bindgen]
pub struct JsEditingSession {
    inner: EditingSession,
}

fn parse_channel(name: &str) -> Result<Channel, JsValue> {
    name.parse::<Channel>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_mode(name: &str) -> Result<EditingMode, JsValue> {
    match name {
        "filter" => Ok(EditingMode::Filter),
        "crop" => Ok(EditingMode::Crop),
        "compress" => Ok(EditingMode::Compress),
        other => Err(JsValue::from_str(&format!("Unknown editing mode: {}", other))),
    }
}

fn js_sequence(sequence: u64) -> Result<u32, JsValue> {
    u32::try_from(sequence).map_err(|_| JsValue::from_str("Compression request sequence overflowed"))
}

#[wasm_bindgen]
impl JsEditingSession {
    /// Start a session from uploaded bytes with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: Vec<u8>) -> Result<JsEditingSession, JsValue> {
        let inner = EditingSession::new(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Start a session with an `EditorConfig` object. Missing fields take
    /// their defaults; `undefined` or `null` means all defaults.
    pub fn with_config(bytes: Vec<u8>, config: JsValue) -> Result<JsEditingSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let inner = EditingSession::with_config(bytes, config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Replace the session with a new upload. A rejected upload leaves the
    /// session unchanged.
    pub fn upload(&mut self, bytes: Vec<u8>) -> Result<(), JsValue> {
        self.inner
            .upload(bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Natural width of the current image
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.dimensions().0
    }

    /// Natural height of the current image
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.dimensions().1
    }

    /// Current image bytes as a `Uint8Array` copy.
    pub fn current_bytes(&self) -> Vec<u8> {
        self.inner.current_bytes().to_vec()
    }

    pub fn original_bytes(&self) -> Vec<u8> {
        self.inner.original_bytes().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn active_preset(&self) -> Option<String> {
        self.inner.active_preset().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn compression_ratio(&self) -> Option<f64> {
        self.inner.compression_ratio()
    }

    /// All parameters as a plain object (`{ brightness, ..., hueRotate }`).
    pub fn parameters(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.parameters())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ===== Channels =====

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.parameters().brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.set_channel(Channel::Brightness, value);
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.parameters().contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.set_channel(Channel::Contrast, value);
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.parameters().saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.set_channel(Channel::Saturation, value);
    }

    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> f32 {
        self.inner.parameters().grayscale
    }

    #[wasm_bindgen(setter)]
    pub fn set_grayscale(&mut self, value: f32) {
        self.inner.set_channel(Channel::Grayscale, value);
    }

    #[wasm_bindgen(getter)]
    pub fn sepia(&self) -> f32 {
        self.inner.parameters().sepia
    }

    #[wasm_bindgen(setter)]
    pub fn set_sepia(&mut self, value: f32) {
        self.inner.set_channel(Channel::Sepia, value);
    }

    #[wasm_bindgen(getter = hueRotate)]
    pub fn hue_rotate(&self) -> f32 {
        self.inner.parameters().hue_rotate
    }

    #[wasm_bindgen(setter = hueRotate)]
    pub fn set_hue_rotate(&mut self, value: f32) {
        self.inner.set_channel(Channel::HueRotate, value);
    }

    #[wasm_bindgen(getter)]
    pub fn blur(&self) -> f32 {
        self.inner.parameters().blur
    }

    #[wasm_bindgen(setter)]
    pub fn set_blur(&mut self, value: f32) {
        self.inner.set_channel(Channel::Blur, value);
    }

    #[wasm_bindgen(getter)]
    pub fn invert(&self) -> f32 {
        self.inner.parameters().invert
    }

    #[wasm_bindgen(setter)]
    pub fn set_invert(&mut self, value: f32) {
        self.inner.set_channel(Channel::Invert, value);
    }

    /// Set a channel by name. Returns the clamped value that was stored.
    pub fn set_channel(&mut self, channel: &str, value: f32) -> Result<f32, JsValue> {
        let channel = parse_channel(channel)?;
        Ok(self.inner.set_channel(channel, value))
    }

    pub fn reset_channel(&mut self, channel: &str) -> Result<(), JsValue> {
        let channel = parse_channel(channel)?;
        self.inner.reset_channel(channel);
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.inner.reset_filters();
    }

    pub fn apply_preset(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner
            .apply_preset(id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// CSS `filter` value for the live preview.
    pub fn filter_string(&self) -> String {
        self.inner.filter_string()
    }

    // ===== Geometry =====

    /// Rotate counter-clockwise by `degrees` (clamped to -180..=180).
    /// Returns `[width, height]` of the result.
    pub fn rotate(&mut self, degrees: f64) -> Result<Vec<u32>, JsValue> {
        let (width, height) = self
            .inner
            .rotate(degrees)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(vec![width, height])
    }

    /// Mirror the image: `"horizontal"` or `"vertical"`.
    pub fn flip(&mut self, direction: &str) -> Result<(), JsValue> {
        let direction = direction
            .parse::<FlipDirection>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner
            .flip(direction)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Resize to `percent` of the current size (clamped to 1..=200).
    /// Returns `[width, height]` of the result.
    pub fn resize(&mut self, percent: u32) -> Result<Vec<u32>, JsValue> {
        let (width, height) = self
            .inner
            .resize(percent)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(vec![width, height])
    }

    // ===== Modes =====

    /// `"filter"`, `"crop"` or `"compress"`
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode().to_string()
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = parse_mode(mode)?;
        self.inner.set_mode(mode);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.inner.cancel();
    }

    // ===== Crop =====

    /// Pick an aspect preset (`"free"`, `"1:1"`, `"16:9"`, `"4:3"`, `"3:4"`,
    /// `"9:16"`). Returns the new default selection, or `undefined` for free.
    pub fn set_crop_aspect(
        &mut self,
        aspect: &str,
        display_width: f64,
        display_height: f64,
    ) -> Result<Option<JsCropRegion>, JsValue> {
        let aspect = aspect
            .parse::<AspectRatio>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let region = self
            .inner
            .set_crop_aspect(aspect, DisplaySize::new(display_width, display_height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(region.map(JsCropRegion::from_region))
    }

    /// Track a drag. Returns the selection after constraints were applied.
    pub fn update_crop_selection(
        &mut self,
        region: &JsCropRegion,
        display_width: f64,
        display_height: f64,
    ) -> Result<JsCropRegion, JsValue> {
        let region = self
            .inner
            .update_crop_selection(region.region(), DisplaySize::new(display_width, display_height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(JsCropRegion::from_region(region))
    }

    /// Finalize the selection on pointer release.
    pub fn complete_crop_selection(&mut self) -> Result<Option<JsCropRegion>, JsValue> {
        let region = self
            .inner
            .complete_crop_selection()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(region.map(JsCropRegion::from_region))
    }

    /// Crop to the finalized selection. Returns `false` when there was none.
    pub fn apply_crop(&mut self, display_width: f64, display_height: f64) -> Result<bool, JsValue> {
        let applied = self
            .inner
            .apply_crop(DisplaySize::new(display_width, display_height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(applied.is_some())
    }

    // ===== Compression =====

    #[wasm_bindgen(getter)]
    pub fn compression_quality(&self) -> u8 {
        self.inner.compress_state().quality.get()
    }

    /// Set the quality slider and compress at it.
    ///
    /// The returned result is also the new preview. Use this when compressing
    /// on the main thread; from a worker, use `commit_compression` instead.
    pub fn run_compression(&mut self, quality: u32) -> Result<JsCompressionResult, JsValue> {
        let request = self
            .inner
            .set_compression_quality(CompressionQuality::new(quality))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let outcome = request.run().map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner
            .receive_compression(request.sequence, Ok(outcome.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(JsCompressionResult::new(js_sequence(request.sequence)?, outcome))
    }

    /// Set the quality slider and issue a request for a worker to run.
    ///
    /// Returns the sequence number to pass to `compress_image` along with
    /// `current_bytes()`. Earlier requests become stale.
    pub fn request_compression(&mut self, quality: u32) -> Result<u32, JsValue> {
        let request = self
            .inner
            .set_compression_quality(CompressionQuality::new(quality))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        js_sequence(request.sequence)
    }

    /// Offer JPEG bytes compressed elsewhere, e.g. posted back from a worker.
    ///
    /// Size statistics are recomputed against the current image. Returns
    /// `false` when a newer request was issued in the meantime (or this one
    /// was already answered) and the bytes were dropped.
    pub fn commit_compression(
        &mut self,
        sequence: u32,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        quality: u32,
    ) -> Result<bool, JsValue> {
        self.inner
            .receive_compressed_bytes(
                sequence as u64,
                bytes,
                width,
                height,
                CompressionQuality::new(quality),
            )
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stats of the current preview, if any.
    pub fn compression_preview(&self) -> Option<JsCompressionStats> {
        self.inner
            .compression_preview()
            .map(|outcome| JsCompressionStats::from_stats(outcome.stats))
    }

    /// Replace the current image with the compressed one and return to
    /// filter mode.
    pub fn apply_compression(&mut self) -> Result<JsCompressionStats, JsValue> {
        let stats = self
            .inner
            .apply_compression()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(JsCompressionStats::from_stats(stats))
    }

    // ===== Whole image =====

    pub fn revert_to_original(&mut self) {
        self.inner.revert_to_original();
    }

    /// Render the filtered image as PNG.
    pub fn export(&self) -> Result<JsExportedImage, JsValue> {
        let exported = self
            .inner
            .export()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(JsExportedImage::from_exported(exported))
    }

    /// Render the filtered image and wrap it in a `blob:` URL for a download
    /// link. The caller revokes the URL when done.
    pub fn export_object_url(&self) -> Result<String, JsValue> {
        let exported = self
            .inner
            .export()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        object_url(&exported.bytes, exported.mime_type)
    }
}

impl JsEditingSession {
    /// Session access for bindings that run outside the class.
    #[cfg(test)]
    pub(crate) fn inner(&self) -> &EditingSession {
        &self.inner
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use fixation_core::encode::encode_png;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png_bytes() -> Vec<u8> {
        encode_png(&[200, 100, 50, 255].repeat(16), 4, 4).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_rejects_garbage() {
        assert!(JsEditingSession::new(vec![1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_unknown_names_are_errors() {
        let mut session = JsEditingSession::new(png_bytes()).unwrap();
        assert!(session.apply_preset("sparkle").is_err());
        assert!(session.set_channel("exposure", 1.0).is_err());
        assert!(session.set_mode("paint").is_err());
        assert!(session.flip("diagonal").is_err());
        assert!(session.apply_compression().is_err());
    }

    #[wasm_bindgen_test]
    fn test_with_config_object() {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &"exportFileStem".into(), &"holiday".into()).unwrap();
        let session = JsEditingSession::with_config(png_bytes(), config.into()).unwrap();
        assert_eq!(session.export().unwrap().file_name(), "holiday.png");

        let defaults = JsEditingSession::with_config(png_bytes(), JsValue::UNDEFINED).unwrap();
        assert_eq!(defaults.export().unwrap().file_name(), "filtered-image.png");
    }

    #[wasm_bindgen_test]
    fn test_parameters_object() {
        let mut session = JsEditingSession::new(png_bytes()).unwrap();
        session.set_hue_rotate(45.0);
        let params = session.parameters().unwrap();
        let hue = js_sys::Reflect::get(&params, &"hueRotate".into()).unwrap();
        assert_eq!(hue.as_f64(), Some(45.0));
    }

    #[wasm_bindgen_test]
    fn test_export_object_url() {
        let session = JsEditingSession::new(png_bytes()).unwrap();
        let url = session.export_object_url().unwrap();
        assert!(url.starts_with("blob:"));
        web_sys::Url::revoke_object_url(&url).unwrap();
    }
}
