//! Preset catalog and filter string WASM bindings.

use fixation_core::filter_chain;
use fixation_core::params::{Channel, ChannelGroup, FilterParameters, Unit};
use fixation_core::presets::PRESETS;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Slider metadata for one channel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChannelInfo {
    key: &'static str,
    label: &'static str,
    min: f32,
    max: f32,
    step: f32,
    default_value: f32,
    unit: Unit,
    group: ChannelGroup,
}

impl From<Channel> for ChannelInfo {
    fn from(channel: Channel) -> Self {
        Self {
            key: channel.key(),
            label: channel.label(),
            min: channel.min(),
            max: channel.max(),
            step: channel.step(),
            default_value: channel.default_value(),
            unit: channel.unit(),
            group: channel.group(),
        }
    }
}

fn channel_infos() -> Vec<ChannelInfo> {
    Channel::ALL.into_iter().map(ChannelInfo::from).collect()
}

/// All presets as `{ id, name, preview, values }` objects, in display order.
#[wasm_bindgen]
pub fn list_presets() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&PRESETS).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Slider metadata for every channel, in filter-chain order.
#[wasm_bindgen]
pub fn list_channels() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&channel_infos()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compile a parameters object (`{ brightness, ..., hueRotate }`) to a CSS
/// `filter` value.
#[wasm_bindgen]
pub fn compile_filter_string(params: JsValue) -> Result<String, JsValue> {
    let params: FilterParameters =
        serde_wasm_bindgen::from_value(params).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(filter_chain::compile_filter_string(&params))
}

/// Format a channel value for its slider label, e.g. `"1.5px"` or `"20°"`.
#[wasm_bindgen]
pub fn format_channel_value(channel: &str, value: f32) -> Result<String, JsValue> {
    let channel = channel
        .parse::<Channel>()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(channel.format_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_infos() {
        let infos = channel_infos();
        assert_eq!(infos.len(), 8);
        assert_eq!(infos[0].key, "brightness");
        assert_eq!(infos[5].key, "hueRotate");
        assert_eq!(infos[5].max, 360.0);
        assert_eq!(infos[6].step, 0.1);
        assert_eq!(infos[3].group, ChannelGroup::Basic);
        assert_eq!(infos[4].group, ChannelGroup::Advanced);
    }

    #[test]
    fn test_format_channel_value() {
        assert_eq!(format_channel_value("blur", 1.5).unwrap(), "1.5px");
        assert_eq!(format_channel_value("hueRotate", 20.0).unwrap(), "20°");
        assert_eq!(format_channel_value("brightness", 110.0).unwrap(), "110%");
    }
}
