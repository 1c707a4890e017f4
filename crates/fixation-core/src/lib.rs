//! Fixation Core - photo filter and editing library
//!
//! This crate provides the image side of Filter Fixation: filter parameters
//! and presets, the CSS filter string compiler, the rasterization pipeline
//! (export, crop, geometry, compression) and the editing session that ties them
//! together.

pub mod compress;
pub mod config;
pub mod decode;
pub mod encode;
pub mod filter_chain;
pub mod filters;
pub mod params;
pub mod pipeline;
pub mod presets;
pub mod session;
pub mod transform;

pub use compress::{format_byte_size, CompressionQuality, CompressionRequest, CompressionStats};
pub use config::{CropFormat, EditorConfig};
pub use filter_chain::{compile, compile_filter_string, FilterChain, FilterOp};
pub use params::{Channel, FilterParameters};
pub use pipeline::{
    compress_image, crop_image, render_filtered, transform_image, PipelineError, RenderedImage,
};
pub use presets::{find_preset, Preset, PRESETS};
pub use session::{EditError, EditingMode, EditingSession, ExportedImage};
pub use transform::{AspectRatio, CropRegion, DisplaySize, FlipDirection, Geometry};
