//! RGB colour

use crate::common::Float;

/// A linear RGB colour.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: Float,

    /// Green.
    pub g: Float,

    /// Blue.
    pub b: Float,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    /// White.
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Creates a new colour.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub const fn new(r: Float, g: Float, b: Float) -> Self {
        Self { r, g, b }
    }

    /// Returns the colour as an opaque RGBA texel.
    pub fn to_rgba(&self) -> [Float; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}
