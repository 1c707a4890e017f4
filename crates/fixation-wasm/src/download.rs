//! Browser download support.
//!
//! Wraps encoded bytes in a `Blob` and hands out a `blob:` URL that can be
//! put on an `<a download>` link.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Url};

/// Create a `blob:` URL for encoded bytes.
///
/// The URL stays valid until the caller passes it to
/// `URL.revokeObjectURL`.
pub(crate) fn object_url(bytes: &[u8], mime_type: &str) -> Result<String, JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));

    let options = BlobPropertyBag::new();
    options.set_type(mime_type);

    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    Url::create_object_url_with_blob(&blob)
}

/// Wrap arbitrary bytes in a `blob:` URL.
#[wasm_bindgen]
pub fn create_object_url(bytes: &[u8], mime_type: &str) -> Result<String, JsValue> {
    object_url(bytes, mime_type)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_object_url() {
        let url = create_object_url(&[1, 2, 3], "image/png").unwrap();
        assert!(url.starts_with("blob:"));
        Url::revoke_object_url(&url).unwrap();
    }
}
