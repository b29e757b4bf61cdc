//! Common numeric types, constants and helpers

use num_traits::Num;
use std::ops::Neg;

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Simulation timestamps need more precision than `Float` to label a year of
/// seconds, so they are kept as 64-bit values.
pub type Timestamp = f64;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// PI (π)
pub const PI: Float = std::f32::consts::PI;

/// PI/2 (π/2)
pub const PI_OVER_TWO: Float = PI * 0.5;

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Clamp the given value to the inclusive range `[low, high]`.
///
/// * `val`  - Value to clamp.
/// * `low`  - Low end of range.
/// * `high` - High end of range.
#[inline(always)]
pub fn clamp<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Round to the nearest integer with halves rounded up, matching
/// `floor(f + 0.5)` in a shader.
///
/// * `f` - The value to round.
#[inline(always)]
pub fn round_half_up(f: Float) -> Float {
    (f + 0.5).floor()
}
