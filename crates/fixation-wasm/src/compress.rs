//! Stand-alone compression bindings.
//!
//! Meant for a Web Worker: the worker compresses, the main thread commits
//! the result to its session.

use fixation_core::compress::{self, CompressionQuality};
use fixation_core::pipeline;
use wasm_bindgen::prelude::*;

use crate::types::JsCompressionResult;

/// Re-encode image bytes as JPEG at `quality` (snapped to a multiple of 5 in
/// 5..=100).
///
/// `sequence` is the request number handed out by the session; pass it
/// through unchanged so the session can drop superseded results. Post the
/// result's plain fields back to the main thread for `commit_compression`.
#[wasm_bindgen]
pub fn compress_image(bytes: &[u8], quality: u32, sequence: u32) -> Result<JsCompressionResult, JsValue> {
    let outcome = pipeline::compress_image(bytes, CompressionQuality::new(quality))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(JsCompressionResult::new(sequence, outcome))
}

/// Human-readable byte size, e.g. `"1.5 MB"`.
#[wasm_bindgen]
pub fn format_byte_size(bytes: usize) -> String {
    compress::format_byte_size(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixation_core::encode::encode_jpeg;

    #[test]
    fn test_compress_image() {
        let pixels = vec![120u8; 16 * 16 * 3];
        let source = encode_jpeg(&pixels, 16, 16, 100).unwrap();

        let result = compress_image(&source, 41, 3).unwrap();
        assert_eq!(result.sequence(), 3);
        assert_eq!(result.stats().quality(), 40);
        assert_eq!(result.stats().original_size(), source.len());
        assert_eq!((result.width(), result.height()), (16, 16));
        assert_eq!(result.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_format_byte_size() {
        assert_eq!(format_byte_size(0), "0 Bytes");
        assert_eq!(format_byte_size(1536), "1.5 KB");
    }
}
