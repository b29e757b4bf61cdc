//! ID to colour encoding
//!
//! The low byte of an ID goes into the red channel and the high byte into
//! green, each scaled to `[0, 1]`. Blue carries the contribution weight and
//! is 1 for every ID colour. Decoding rounds to the nearest level so small
//! resampling errors do not change the ID, but ID-bearing targets must still
//! be sampled with nearest filtering: interpolated colours between two IDs
//! decode to a third, unrelated ID.

use super::ObjectId;
use crate::common::{round_half_up, Float};
use crate::scene::Color;

/// Number of levels per 8-bit colour channel.
pub const CHANNEL_LEVELS: u32 = 256;

/// Largest ID representable with two 8-bit channels.
pub const MAX_OBJECT_ID: u32 = CHANNEL_LEVELS * CHANNEL_LEVELS - 1;

const CHANNEL_MAX: Float = (CHANNEL_LEVELS - 1) as Float;

/// Returns the colour that paints `id` into an ID buffer.
///
/// * `id` - The object ID. Must not exceed `MAX_OBJECT_ID`.
pub fn encode_id(id: ObjectId) -> Color {
    let id = id.get();
    debug_assert!(id <= MAX_OBJECT_ID);
    Color::new(
        (id % CHANNEL_LEVELS) as Float / CHANNEL_MAX,
        (id / CHANNEL_LEVELS) as Float / CHANNEL_MAX,
        1.0,
    )
}

/// Recovers the raw ID from the red and green channels of an ID buffer texel.
///
/// * `r` - Red channel in `[0, 1]`.
/// * `g` - Green channel in `[0, 1]`.
#[inline]
pub fn decode_id(r: Float, g: Float) -> u32 {
    round_half_up(r * CHANNEL_MAX) as u32 + round_half_up(g * CHANNEL_MAX) as u32 * CHANNEL_LEVELS
}
