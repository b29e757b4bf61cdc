//! Per-block reduction state

use super::programs::{PixelReduction, TimestepReduction};
use super::{BLOCK_CAPACITY, BLOCK_TIMESTEPS, TOTALS_WIDTH};
use crate::common::Float;
use crate::error::Result;
use crate::gpu::{Device, PingPong, TextureDescriptor, TextureFormat, TextureHandle};
use crate::id::ObjectId;

/// Reduction textures for up to `BLOCK_CAPACITY` object IDs.
///
/// Row `i` of both textures belongs to `ids[i]`. The totals hold per-ID sums
/// of the open timestep, the history holds one column per buffered
/// timestep.
#[derive(Debug)]
pub struct IdBlock {
    /// IDs of this block in row order.
    ids: Vec<ObjectId>,

    /// `TOTALS_WIDTH x ids.len()` per-ID sums.
    totals: PingPong<TextureHandle>,

    /// `BLOCK_TIMESTEPS x ids.len()` ring buffer.
    history: PingPong<TextureHandle>,
}

impl IdBlock {
    /// Allocates the textures of a new block.
    ///
    /// * `device` - The device.
    /// * `ids`    - Between 1 and `BLOCK_CAPACITY` IDs.
    /// * `format` - Data texture format.
    pub fn new(device: &mut dyn Device, ids: &[ObjectId], format: TextureFormat) -> Result<Self> {
        debug_assert!(!ids.is_empty() && ids.len() <= BLOCK_CAPACITY);

        let rows = ids.len() as u32;
        let descs = [
            TextureDescriptor::new(TOTALS_WIDTH, rows, format),
            TextureDescriptor::new(TOTALS_WIDTH, rows, format),
            TextureDescriptor::new(BLOCK_TIMESTEPS as u32, rows, format),
            TextureDescriptor::new(BLOCK_TIMESTEPS as u32, rows, format),
        ];
        let mut textures = Vec::with_capacity(descs.len());
        for desc in descs.iter() {
            match device.create_texture(desc) {
                Ok(t) => textures.push(t),
                Err(e) => {
                    for t in textures {
                        device.destroy_texture(t);
                    }
                    return Err(e);
                }
            }
        }

        Ok(Self {
            ids: ids.to_vec(),
            totals: PingPong::new(textures[0], textures[1]),
            history: PingPong::new(textures[2], textures[3]),
        })
    }

    /// Returns the IDs in row order.
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Returns the number of IDs.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the block holds no IDs.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the totals textures.
    pub fn totals(&self) -> &PingPong<TextureHandle> {
        &self.totals
    }

    /// Returns the history textures.
    pub fn history(&self) -> &PingPong<TextureHandle> {
        &self.history
    }

    /// Replaces the IDs with a list of the same length. The textures are
    /// kept; their contents become meaningless.
    ///
    /// * `ids` - New IDs.
    pub fn set_ids(&mut self, ids: &[ObjectId]) {
        debug_assert_eq!(ids.len(), self.ids.len());
        self.ids = ids.to_vec();
    }

    /// Adds one tile of an ID buffer to the totals.
    ///
    /// * `device`    - The device.
    /// * `source`    - ID buffer.
    /// * `size`      - `(width, height)` of the ID buffer.
    /// * `offset`    - Top left texel of the tile.
    /// * `scale`     - Pixel area times sample weight.
    /// * `from_zero` - Discard the previous totals.
    pub fn reduce_tile(
        &mut self,
        device: &mut dyn Device,
        source: TextureHandle,
        size: (u32, u32),
        offset: (u32, u32),
        scale: Float,
        from_zero: bool,
    ) -> Result<()> {
        self.totals.swap();
        let program = PixelReduction {
            source,
            source_size: size,
            offset,
            previous: if from_zero {
                None
            } else {
                Some(*self.totals.previous())
            },
            ids: &self.ids,
            scale,
        };
        device.draw_fragments(*self.totals.active(), &program)
    }

    /// Zeroes the current totals.
    ///
    /// * `device` - The device.
    pub fn clear_totals(&mut self, device: &mut dyn Device) -> Result<()> {
        device.clear(*self.totals.active(), [0.0, 0.0, 0.0, 1.0])
    }

    /// Writes the current totals into `column` of the history.
    ///
    /// * `device` - The device.
    /// * `column` - Ring buffer column.
    pub fn close_timestep(&mut self, device: &mut dyn Device, column: usize) -> Result<()> {
        self.history.swap();
        let program = TimestepReduction {
            totals: *self.totals.active(),
            history: *self.history.previous(),
            column: column as u32,
        };
        device.draw_fragments(*self.history.active(), &program)
    }

    /// Reads the history back; row-major, `BLOCK_TIMESTEPS` values per ID.
    ///
    /// * `device` - The device.
    pub fn read_history(&self, device: &mut dyn Device) -> Result<Vec<Float>> {
        let mut buf = vec![0.0; BLOCK_TIMESTEPS * self.ids.len()];
        device.read_pixels(*self.history.active(), &mut buf)?;
        Ok(buf)
    }

    /// Releases the textures.
    ///
    /// * `device` - The device.
    pub fn release(self, device: &mut dyn Device) {
        for t in self.totals.into_inner().into_iter().chain(self.history.into_inner()) {
            device.destroy_texture(t);
        }
    }
}
