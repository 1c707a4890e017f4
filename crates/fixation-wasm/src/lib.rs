//! Fixation WASM - WebAssembly bindings for Filter Fixation
//!
//! This crate exposes the fixation-core editing session, preset catalog,
//! filter string compiler and compression pipeline to the browser.
//!
//! # Module Structure
//!
//! - `session` - `JsEditingSession`, the per-upload editing state
//! - `presets` - Preset and channel catalogs, CSS filter string compiler
//! - `compress` - Stand-alone JPEG compression for Web Workers
//! - `download` - `blob:` URLs for download links
//! - `types` - WASM-compatible wrappers for session results
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditingSession } from '@filter-fixation/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = new JsEditingSession(bytes);
//! session.apply_preset('vintage');
//! img.style.filter = session.filter_string();
//!
//! link.href = session.export_object_url();
//! link.download = 'filtered-image.png';
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod download;
mod presets;
mod session;
mod types;

pub use compress::{compress_image, format_byte_size};
pub use download::create_object_url;
pub use presets::{compile_filter_string, format_channel_value, list_channels, list_presets};
pub use session::JsEditingSession;
pub use types::{JsCompressionResult, JsCompressionStats, JsCropRegion, JsExportedImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) finds the logger already installed
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
    log::info!("Filter Fixation WASM v{} ready", version());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
