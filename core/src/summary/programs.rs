//! Reduction programs

use super::{HISTORY_SCALE, TILE_HEIGHT};
use crate::common::Float;
use crate::gpu::{FragmentProgram, TexelSource, TextureHandle};
use crate::id::{decode_id, ObjectId};

/// Sums the lit pixels of one tile of an ID buffer per object ID.
///
/// The output has one row per ID of the block. Column `x` receives the
/// weighted count of texels in source column `offset.0 + x` of the tile
/// whose ID matches the row, added to the previous totals unless the pass
/// starts from zero.
pub(super) struct PixelReduction<'a> {
    /// ID buffer.
    pub source: TextureHandle,

    /// `(width, height)` of the ID buffer.
    pub source_size: (u32, u32),

    /// Top left texel of the tile.
    pub offset: (u32, u32),

    /// Totals to add to; `None` starts from zero.
    pub previous: Option<TextureHandle>,

    /// IDs of the block, one per output row.
    pub ids: &'a [ObjectId],

    /// Pixel area times sample weight.
    pub scale: Float,
}

impl FragmentProgram for PixelReduction<'_> {
    fn inputs(&self) -> Vec<TextureHandle> {
        let mut inputs = vec![self.source];
        inputs.extend(self.previous);
        inputs
    }

    fn shade(&self, x: u32, y: u32, texels: &dyn TexelSource) -> Float {
        let total = self
            .previous
            .map_or(0.0, |p| texels.fetch(p, x as i64, y as i64)[0]);
        let id = match self.ids.get(y as usize) {
            Some(id) => id,
            None => return total,
        };

        let (width, height) = self.source_size;
        let sx = self.offset.0 + x;
        if sx >= width {
            return total;
        }
        let rows = TILE_HEIGHT.min(height.saturating_sub(self.offset.1));

        let mut lit = 0.0;
        for row in 0..rows {
            let texel = texels.fetch(self.source, sx as i64, (self.offset.1 + row) as i64);
            if decode_id(texel[0], texel[1]) == id.get() {
                lit += texel[2];
            }
        }
        total + lit * self.scale
    }
}

/// Writes the row sums of the totals into one column of the history and
/// copies every other column.
pub(super) struct TimestepReduction {
    /// Per-ID totals of the closing timestep.
    pub totals: TextureHandle,

    /// History before this timestep.
    pub history: TextureHandle,

    /// Column receiving the new values.
    pub column: u32,
}

impl FragmentProgram for TimestepReduction {
    fn inputs(&self) -> Vec<TextureHandle> {
        vec![self.totals, self.history]
    }

    fn shade(&self, x: u32, y: u32, texels: &dyn TexelSource) -> Float {
        if x != self.column {
            return texels.fetch(self.history, x as i64, y as i64)[0];
        }
        let (width, _) = texels.size(self.totals);
        let sum: Float = (0..width)
            .map(|tx| texels.fetch(self.totals, tx as i64, y as i64)[0])
            .sum();
        sum / HISTORY_SCALE
    }
}
