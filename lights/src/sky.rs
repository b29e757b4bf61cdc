//! Sky luminance models

use photosynthesis_core::common::{clamp, Float};
use std::fmt;

/// Relative luminance of the sky as a function of elevation.
pub trait SkyModel: fmt::Debug + Send + Sync {
    /// Returns the luminance in `[0, 1]` of the sky patch at the given
    /// elevation.
    ///
    /// * `sin_elevation` - Sine of the angle above the horizon.
    fn luminance(&self, sin_elevation: Float) -> Float;
}

/// The standard overcast sky: three times brighter at the zenith than at
/// the horizon, `(1 + 2 sin θ) / 3`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StandardOvercastSky;

impl SkyModel for StandardOvercastSky {
    fn luminance(&self, sin_elevation: Float) -> Float {
        (1.0 + 2.0 * clamp(sin_elevation, 0.0, 1.0)) / 3.0
    }
}

/// A sky of equal luminance in every direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct UniformSky;

impl SkyModel for UniformSky {
    fn luminance(&self, _sin_elevation: Float) -> Float {
        1.0
    }
}
