//! Built-in filter presets.
//!
//! Presets are static data: each one is a complete [`FilterParameters`]
//! record that replaces the session's parameters wholesale when applied.

use serde::Serialize;

use crate::params::FilterParameters;

/// A named, fixed combination of filter channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    /// Thumbnail shown in the preset strip
    pub preview: Option<&'static str>,
    pub values: FilterParameters,
}

const PLACEHOLDER_PREVIEW: Option<&str> = Some("/placeholder.svg");

/// Shorthand for the table below; arguments follow filter-chain order.
#[allow(clippy::too_many_arguments)]
const fn values(
    brightness: f32,
    contrast: f32,
    saturation: f32,
    grayscale: f32,
    sepia: f32,
    hue_rotate: f32,
    blur: f32,
    invert: f32,
) -> FilterParameters {
    FilterParameters {
        brightness,
        contrast,
        saturation,
        grayscale,
        sepia,
        hue_rotate,
        blur,
        invert,
    }
}

/// The preset catalog, in display order.
pub const PRESETS: &[Preset] = &[
    Preset {
        id: "normal",
        name: "Normal",
        preview: PLACEHOLDER_PREVIEW,
        values: values(100.0, 100.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0),
    },
    Preset {
        id: "mono",
        name: "Mono",
        preview: PLACEHOLDER_PREVIEW,
        values: values(100.0, 100.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0),
    },
    Preset {
        id: "vintage",
        name: "Vintage",
        preview: PLACEHOLDER_PREVIEW,
        values: values(90.0, 110.0, 85.0, 0.0, 40.0, 0.0, 0.0, 0.0),
    },
    Preset {
        id: "vivid",
        name: "Vivid",
        preview: PLACEHOLDER_PREVIEW,
        values: values(105.0, 120.0, 130.0, 0.0, 0.0, 0.0, 0.0, 0.0),
    },
    Preset {
        id: "muted",
        name: "Muted",
        preview: PLACEHOLDER_PREVIEW,
        values: values(100.0, 90.0, 80.0, 10.0, 10.0, 0.0, 0.0, 0.0),
    },
    Preset {
        id: "warm",
        name: "Warm",
        preview: PLACEHOLDER_PREVIEW,
        values: values(102.0, 105.0, 110.0, 0.0, 30.0, 20.0, 0.0, 0.0),
    },
    Preset {
        id: "cool",
        name: "Cool",
        preview: PLACEHOLDER_PREVIEW,
        values: values(100.0, 105.0, 95.0, 0.0, 0.0, 180.0, 0.0, 0.0),
    },
    Preset {
        id: "dramatic",
        name: "Dramatic",
        preview: PLACEHOLDER_PREVIEW,
        values: values(90.0, 140.0, 90.0, 40.0, 0.0, 0.0, 0.0, 0.0),
    },
    Preset {
        id: "dream",
        name: "Dream",
        preview: PLACEHOLDER_PREVIEW,
        values: values(110.0, 85.0, 90.0, 0.0, 15.0, 0.0, 1.5, 0.0),
    },
];

/// Look up a preset by id.
pub fn find_preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = PRESETS.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PRESETS.len());
        assert_eq!(PRESETS.len(), 9);
    }

    #[test]
    fn test_find_preset() {
        let mono = find_preset("mono").unwrap();
        assert_eq!(mono.name, "Mono");
        assert_eq!(mono.values.saturation, 0.0);
        assert_eq!(mono.values.grayscale, 100.0);
        assert!(find_preset("sparkle").is_none());
        assert!(find_preset("Mono").is_none(), "lookup is case-sensitive");
    }

    #[test]
    fn test_normal_is_identity() {
        assert!(find_preset("normal").unwrap().values.is_default());
    }

    #[test]
    fn test_dream_has_fractional_blur() {
        assert_eq!(find_preset("dream").unwrap().values.blur, 1.5);
    }

    #[test]
    fn test_presets_within_channel_ranges() {
        use crate::params::Channel;
        for preset in PRESETS {
            for channel in Channel::ALL {
                let v = preset.values.get(channel);
                assert_eq!(channel.clamp(v), v, "{} {}", preset.id, channel);
            }
        }
    }

    #[test]
    fn test_every_preset_has_preview() {
        assert!(PRESETS.iter().all(|p| p.preview == Some("/placeholder.svg")));
    }
}
