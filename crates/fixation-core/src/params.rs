//! Filter parameter model.
//!
//! A [`FilterParameters`] record holds the eight adjustment channels the
//! editor exposes. Each [`Channel`] describes its own range, identity value,
//! slider step and unit.
//!
//! The record itself never validates: any `f32` can be stored. Clamping is
//! the job of whoever accepts user input (see
//! [`EditingSession::set_channel`](crate::session::EditingSession::set_channel)).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit a channel value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Unit {
    /// Percentage (100 = unchanged for multiplicative channels)
    Percent,
    /// Angle in degrees
    Degrees,
    /// Length in CSS pixels
    Pixels,
}

impl Unit {
    /// Suffix used in the CSS filter function syntax.
    pub fn css_suffix(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Degrees => "deg",
            Unit::Pixels => "px",
        }
    }

    /// Suffix used when showing a value to the user.
    pub fn display_suffix(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Degrees => "°",
            Unit::Pixels => "px",
        }
    }
}

/// Which control panel tab a channel lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelGroup {
    /// Brightness, contrast and saturation
    Basic,
    /// Colour effects, blur and inversion
    Advanced,
}

/// One of the eight adjustment channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    /// Linear gain, 0-200%
    Brightness,
    /// Scale around mid-grey, 0-200%
    Contrast,
    /// 0% is fully desaturated, 200% doubles saturation
    Saturation,
    /// Blend toward luminance, 0-100%
    Grayscale,
    /// Blend toward the sepia tone matrix, 0-100%
    Sepia,
    /// Hue rotation, 0-360 degrees
    HueRotate,
    /// Gaussian blur radius, 0-20px
    Blur,
    /// Blend toward the negative, 0-100%
    Invert,
}

impl Channel {
    /// All channels in filter-chain order.
    pub const ALL: [Channel; 8] = [
        Channel::Brightness,
        Channel::Contrast,
        Channel::Saturation,
        Channel::Grayscale,
        Channel::Sepia,
        Channel::HueRotate,
        Channel::Blur,
        Channel::Invert,
    ];

    /// Lowest accepted value.
    pub fn min(self) -> f32 {
        0.0
    }

    /// Highest accepted value.
    pub fn max(self) -> f32 {
        match self {
            Channel::Brightness | Channel::Contrast | Channel::Saturation => 200.0,
            Channel::Grayscale | Channel::Sepia | Channel::Invert => 100.0,
            Channel::HueRotate => 360.0,
            Channel::Blur => 20.0,
        }
    }

    /// Identity value: the channel has no visible effect at this setting.
    pub fn default_value(self) -> f32 {
        match self {
            Channel::Brightness | Channel::Contrast | Channel::Saturation => 100.0,
            _ => 0.0,
        }
    }

    /// Slider step.
    pub fn step(self) -> f32 {
        match self {
            Channel::Blur => 0.1,
            _ => 1.0,
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Channel::HueRotate => Unit::Degrees,
            Channel::Blur => Unit::Pixels,
            _ => Unit::Percent,
        }
    }

    pub fn group(self) -> ChannelGroup {
        match self {
            Channel::Brightness | Channel::Contrast | Channel::Saturation | Channel::Grayscale => {
                ChannelGroup::Basic
            }
            Channel::Sepia | Channel::HueRotate | Channel::Blur | Channel::Invert => {
                ChannelGroup::Advanced
            }
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Brightness => "Brightness",
            Channel::Contrast => "Contrast",
            Channel::Saturation => "Saturation",
            Channel::Grayscale => "Grayscale",
            Channel::Sepia => "Sepia",
            Channel::HueRotate => "Hue Rotate",
            Channel::Blur => "Blur",
            Channel::Invert => "Invert",
        }
    }

    /// Identifier used across the WASM boundary (`hueRotate`, `blur`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Channel::Brightness => "brightness",
            Channel::Contrast => "contrast",
            Channel::Saturation => "saturation",
            Channel::Grayscale => "grayscale",
            Channel::Sepia => "sepia",
            Channel::HueRotate => "hueRotate",
            Channel::Blur => "blur",
            Channel::Invert => "invert",
        }
    }

    /// Clamp a value into this channel's range.
    ///
    /// Non-finite input (NaN, infinities) falls back to the identity value.
    pub fn clamp(self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default_value();
        }
        value.clamp(self.min(), self.max())
    }

    /// Format a value for display next to its slider (e.g. `"1.5px"`, `"20°"`).
    pub fn format_value(self, value: f32) -> String {
        let decimals = if self == Channel::Blur { 1 } else { 0 };
        format!(
            "{:.*}{}",
            decimals,
            value,
            self.unit().display_suffix()
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown channel name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown filter channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    /// Accepts the camelCase key, the CSS function name and snake_case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brightness" => Ok(Channel::Brightness),
            "contrast" => Ok(Channel::Contrast),
            "saturation" | "saturate" => Ok(Channel::Saturation),
            "grayscale" => Ok(Channel::Grayscale),
            "sepia" => Ok(Channel::Sepia),
            "hueRotate" | "hue-rotate" | "hue_rotate" => Ok(Channel::HueRotate),
            "blur" => Ok(Channel::Blur),
            "invert" => Ok(Channel::Invert),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}

/// The eight filter channels applied to the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParameters {
    /// Brightness in percent (0 to 200, identity 100)
    pub brightness: f32,
    /// Contrast in percent (0 to 200, identity 100)
    pub contrast: f32,
    /// Saturation in percent (0 to 200, identity 100)
    pub saturation: f32,
    /// Grayscale amount in percent (0 to 100)
    pub grayscale: f32,
    /// Sepia amount in percent (0 to 100)
    pub sepia: f32,
    /// Hue rotation in degrees (0 to 360)
    pub hue_rotate: f32,
    /// Gaussian blur radius in pixels (0 to 20)
    pub blur: f32,
    /// Inversion amount in percent (0 to 100)
    pub invert: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            grayscale: 0.0,
            sepia: 0.0,
            hue_rotate: 0.0,
            blur: 0.0,
            invert: 0.0,
        }
    }
}

impl FilterParameters {
    /// Create a record with every channel at its identity value
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Brightness => self.brightness,
            Channel::Contrast => self.contrast,
            Channel::Saturation => self.saturation,
            Channel::Grayscale => self.grayscale,
            Channel::Sepia => self.sepia,
            Channel::HueRotate => self.hue_rotate,
            Channel::Blur => self.blur,
            Channel::Invert => self.invert,
        }
    }

    /// Store a raw value. No clamping happens here.
    pub fn set(&mut self, channel: Channel, value: f32) {
        let slot = match channel {
            Channel::Brightness => &mut self.brightness,
            Channel::Contrast => &mut self.contrast,
            Channel::Saturation => &mut self.saturation,
            Channel::Grayscale => &mut self.grayscale,
            Channel::Sepia => &mut self.sepia,
            Channel::HueRotate => &mut self.hue_rotate,
            Channel::Blur => &mut self.blur,
            Channel::Invert => &mut self.invert,
        };
        *slot = value;
    }

    /// Whether a single channel sits at its identity value.
    pub fn is_channel_default(&self, channel: Channel) -> bool {
        self.get(channel) == channel.default_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_identity() {
        let params = FilterParameters::new();
        assert!(params.is_default());
        for channel in Channel::ALL {
            assert_eq!(params.get(channel), channel.default_value());
            assert!(params.is_channel_default(channel));
        }
    }

    #[test]
    fn test_set_and_get_every_channel() {
        let mut params = FilterParameters::new();
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            params.set(channel, i as f32 + 0.5);
        }
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            assert_eq!(params.get(channel), i as f32 + 0.5);
        }
        assert!(!params.is_default());
    }

    #[test]
    fn test_set_does_not_clamp() {
        let mut params = FilterParameters::new();
        params.set(Channel::Brightness, 999.0);
        assert_eq!(params.brightness, 999.0);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(Channel::Brightness.max(), 200.0);
        assert_eq!(Channel::Sepia.max(), 100.0);
        assert_eq!(Channel::HueRotate.max(), 360.0);
        assert_eq!(Channel::Blur.max(), 20.0);
        assert_eq!(Channel::Blur.step(), 0.1);
        for channel in Channel::ALL {
            assert_eq!(channel.min(), 0.0);
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Channel::Brightness.clamp(250.0), 200.0);
        assert_eq!(Channel::Invert.clamp(-5.0), 0.0);
        assert_eq!(Channel::Blur.clamp(2.5), 2.5);
        assert_eq!(Channel::Contrast.clamp(f32::NAN), 100.0);
        assert_eq!(Channel::HueRotate.clamp(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_groups() {
        let basic: Vec<_> = Channel::ALL
            .into_iter()
            .filter(|c| c.group() == ChannelGroup::Basic)
            .collect();
        assert_eq!(
            basic,
            vec![
                Channel::Brightness,
                Channel::Contrast,
                Channel::Saturation,
                Channel::Grayscale
            ]
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(Channel::Brightness.format_value(105.0), "105%");
        assert_eq!(Channel::HueRotate.format_value(20.0), "20°");
        assert_eq!(Channel::Blur.format_value(1.5), "1.5px");
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!("hueRotate".parse::<Channel>(), Ok(Channel::HueRotate));
        assert_eq!("hue-rotate".parse::<Channel>(), Ok(Channel::HueRotate));
        assert_eq!("saturate".parse::<Channel>(), Ok(Channel::Saturation));
        assert_eq!(
            "gamma".parse::<Channel>(),
            Err(UnknownChannel("gamma".to_string()))
        );
        for channel in Channel::ALL {
            assert_eq!(channel.key().parse::<Channel>(), Ok(channel));
        }
    }
}
