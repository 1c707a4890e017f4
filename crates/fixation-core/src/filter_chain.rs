//! Filter string compiler.
//!
//! Turns a [`FilterParameters`] record into an ordered [`FilterChain`]. The
//! chain renders to a CSS `filter` value for live preview and is consumed
//! directly by the rasterizer in [`crate::filters`], so the preview and the
//! exported pixels are driven by the same data.
//!
//! ## Chain Order
//! 1. brightness
//! 2. contrast
//! 3. saturate
//! 4. grayscale
//! 5. sepia
//! 6. hue-rotate
//! 7. blur
//! 8. invert

use std::fmt;

use crate::params::{Channel, FilterParameters, Unit};

/// A single filter function with its value in native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Percent, 100 = unchanged
    Brightness(f32),
    /// Percent, 100 = unchanged
    Contrast(f32),
    /// Percent, 100 = unchanged
    Saturate(f32),
    /// Percent, 0 = unchanged
    Grayscale(f32),
    /// Percent, 0 = unchanged
    Sepia(f32),
    /// Degrees, 0 = unchanged
    HueRotate(f32),
    /// Standard deviation in pixels, 0 = unchanged
    Blur(f32),
    /// Percent, 0 = unchanged
    Invert(f32),
}

impl FilterOp {
    /// Build the op for a channel from its stored value.
    pub fn from_channel(channel: Channel, value: f32) -> Self {
        match channel {
            Channel::Brightness => FilterOp::Brightness(value),
            Channel::Contrast => FilterOp::Contrast(value),
            Channel::Saturation => FilterOp::Saturate(value),
            Channel::Grayscale => FilterOp::Grayscale(value),
            Channel::Sepia => FilterOp::Sepia(value),
            Channel::HueRotate => FilterOp::HueRotate(value),
            Channel::Blur => FilterOp::Blur(value),
            Channel::Invert => FilterOp::Invert(value),
        }
    }

    pub fn channel(self) -> Channel {
        match self {
            FilterOp::Brightness(_) => Channel::Brightness,
            FilterOp::Contrast(_) => Channel::Contrast,
            FilterOp::Saturate(_) => Channel::Saturation,
            FilterOp::Grayscale(_) => Channel::Grayscale,
            FilterOp::Sepia(_) => Channel::Sepia,
            FilterOp::HueRotate(_) => Channel::HueRotate,
            FilterOp::Blur(_) => Channel::Blur,
            FilterOp::Invert(_) => Channel::Invert,
        }
    }

    pub fn value(self) -> f32 {
        match self {
            FilterOp::Brightness(v)
            | FilterOp::Contrast(v)
            | FilterOp::Saturate(v)
            | FilterOp::Grayscale(v)
            | FilterOp::Sepia(v)
            | FilterOp::HueRotate(v)
            | FilterOp::Blur(v)
            | FilterOp::Invert(v) => v,
        }
    }

    /// CSS function name.
    pub fn css_name(self) -> &'static str {
        match self {
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
            FilterOp::HueRotate(_) => "hue-rotate",
            FilterOp::Blur(_) => "blur",
            FilterOp::Invert(_) => "invert",
        }
    }

    pub fn unit(self) -> Unit {
        self.channel().unit()
    }

    /// Whether applying this op leaves every pixel untouched.
    pub fn is_identity(self) -> bool {
        match self {
            FilterOp::HueRotate(deg) => deg % 360.0 == 0.0,
            op => op.value() == op.channel().default_value(),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}{})",
            self.css_name(),
            self.value(),
            self.unit().css_suffix()
        )
    }
}

/// Ordered list of filter functions.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    /// True when every op is a no-op.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.is_identity())
    }
}

/// Renders the CSS `filter` property value.
impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// Compile a parameter record into its filter chain.
///
/// Pure and infallible: values are taken as-is, without range checks.
pub fn compile(params: &FilterParameters) -> FilterChain {
    let ops = Channel::ALL
        .into_iter()
        .map(|channel| FilterOp::from_channel(channel, params.get(channel)))
        .collect();
    FilterChain { ops }
}

/// Compile a parameter record straight to its CSS filter string.
pub fn compile_filter_string(params: &FilterParameters) -> String {
    compile(params).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_string() {
        assert_eq!(
            compile_filter_string(&FilterParameters::default()),
            "brightness(100%) contrast(100%) saturate(100%) grayscale(0%) sepia(0%) \
             hue-rotate(0deg) blur(0px) invert(0%)"
        );
    }

    #[test]
    fn test_default_is_identity() {
        assert!(compile(&FilterParameters::default()).is_identity());
    }

    #[test]
    fn test_fractional_values() {
        let mut params = FilterParameters::default();
        params.blur = 1.5;
        params.hue_rotate = 20.0;
        let css = compile_filter_string(&params);
        assert!(css.contains("blur(1.5px)"));
        assert!(css.contains("hue-rotate(20deg)"));
        assert!(!compile(&params).is_identity());
    }

    #[test]
    fn test_order_is_fixed() {
        let chain = compile(&FilterParameters::default());
        let names: Vec<_> = chain.ops().iter().map(|op| op.css_name()).collect();
        assert_eq!(
            names,
            vec![
                "brightness",
                "contrast",
                "saturate",
                "grayscale",
                "sepia",
                "hue-rotate",
                "blur",
                "invert"
            ]
        );
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let mut params = FilterParameters::default();
        params.brightness = 500.0;
        params.invert = -3.0;
        let css = compile_filter_string(&params);
        assert!(css.starts_with("brightness(500%)"));
        assert!(css.ends_with("invert(-3%)"));
    }

    #[test]
    fn test_full_turn_hue_is_identity() {
        assert!(FilterOp::HueRotate(360.0).is_identity());
        assert!(!FilterOp::HueRotate(180.0).is_identity());
    }

    #[test]
    fn test_op_round_trips_channel() {
        for channel in Channel::ALL {
            let op = FilterOp::from_channel(channel, 7.0);
            assert_eq!(op.channel(), channel);
            assert_eq!(op.value(), 7.0);
        }
    }

    proptest! {
        #[test]
        fn prop_compiler_is_deterministic(
            values in proptest::collection::vec(-1000.0f32..1000.0, 8)
        ) {
            let mut params = FilterParameters::default();
            for (channel, value) in Channel::ALL.into_iter().zip(values) {
                params.set(channel, value);
            }
            prop_assert_eq!(compile_filter_string(&params), compile_filter_string(&params));
            prop_assert_eq!(compile(&params).ops().len(), 8);
        }
    }
}
