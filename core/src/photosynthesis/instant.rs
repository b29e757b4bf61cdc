//! Immediate light measurement

use crate::common::Float;
use crate::error::Result;
use crate::gpu::{
    BlendMode, Device, PointOutput, PointProgram, TexelSource, TextureDescriptor, TextureFormat,
    TextureHandle,
};
use crate::id::{decode_id, ObjectId, CHANNEL_LEVELS};
use crate::light::LightAccumulator;
use std::collections::BTreeMap;

/// Side length of the ID buffer tile scattered by one draw.
pub const SCATTER_TILE_SIZE: u32 = 512;

/// Columns of the summary texture; ID `i` lands in column `i % 256` of row
/// `i / 256`.
pub const SUMMARY_WIDTH: u32 = CHANNEL_LEVELS;

/// Emits one point per lit ID buffer pixel at the summary cell of its ID.
struct ScatterProgram {
    source: TextureHandle,
    source_size: (u32, u32),
    offset: (u32, u32),
    tile: (u32, u32),
    scale: Float,
}

impl PointProgram for ScatterProgram {
    fn inputs(&self) -> Vec<TextureHandle> {
        vec![self.source]
    }

    fn vertex(&self, index: usize, texels: &dyn TexelSource) -> Option<PointOutput> {
        let x = self.offset.0 + index as u32 % self.tile.0;
        let y = self.offset.1 + index as u32 / self.tile.0;
        if x >= self.source_size.0 || y >= self.source_size.1 {
            return None;
        }
        let texel = texels.fetch(self.source, x as i64, y as i64);
        let id = decode_id(texel[0], texel[1]);
        if id == 0 {
            return None;
        }
        Some(PointOutput {
            x: id % SUMMARY_WIDTH,
            y: id / SUMMARY_WIDTH,
            value: texel[2] * self.scale,
        })
    }
}

/// Per-ID light totals of a single moment, read back immediately.
#[derive(Debug)]
pub(super) struct InstantSummary {
    /// Summary texture format.
    format: TextureFormat,

    /// Summary texture and its row count.
    texture: Option<(TextureHandle, u32)>,
}

impl InstantSummary {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            texture: None,
        }
    }

    /// Prepares a zeroed summary able to hold IDs up to `max_id`.
    ///
    /// * `device` - The device.
    /// * `max_id` - Largest ID.
    pub fn begin(&mut self, device: &mut dyn Device, max_id: u32) -> Result<()> {
        let rows = (max_id + 1 + SUMMARY_WIDTH - 1) / SUMMARY_WIDTH;
        let texture = match self.texture {
            Some((texture, r)) if r == rows && device.texture_size(texture).is_ok() => texture,
            _ => {
                self.release(device);
                let desc = TextureDescriptor::new(SUMMARY_WIDTH, rows, self.format);
                let texture = device.create_texture(&desc)?;
                debug!("Allocated {SUMMARY_WIDTH}x{rows} instant summary");
                self.texture = Some((texture, rows));
                texture
            }
        };
        device.clear(texture, [0.0, 0.0, 0.0, 1.0])
    }

    /// Reads the totals of `ids` back.
    ///
    /// * `device` - The device.
    /// * `ids`    - IDs to report.
    pub fn read(
        &self,
        device: &mut dyn Device,
        ids: impl IntoIterator<Item = ObjectId>,
    ) -> Result<BTreeMap<ObjectId, Float>> {
        let mut values = BTreeMap::new();
        if let Some((texture, rows)) = self.texture {
            let mut buf = vec![0.0; (SUMMARY_WIDTH * rows) as usize];
            device.read_pixels(texture, &mut buf)?;
            for id in ids {
                values.insert(id, buf.get(id.get() as usize).copied().unwrap_or(0.0));
            }
        }
        Ok(values)
    }

    /// Releases the summary texture.
    ///
    /// * `device` - The device.
    pub fn release(&mut self, device: &mut dyn Device) {
        if let Some((texture, _)) = self.texture.take() {
            device.destroy_texture(texture);
        }
    }
}

impl LightAccumulator for InstantSummary {
    fn add_light(
        &mut self,
        device: &mut dyn Device,
        texture: TextureHandle,
        width: u32,
        height: u32,
        scale: Float,
    ) -> Result<()> {
        let target = match self.texture {
            Some((t, _)) => t,
            None => return Ok(()),
        };
        for oy in (0..height).step_by(SCATTER_TILE_SIZE as usize) {
            for ox in (0..width).step_by(SCATTER_TILE_SIZE as usize) {
                let tile = (
                    SCATTER_TILE_SIZE.min(width - ox),
                    SCATTER_TILE_SIZE.min(height - oy),
                );
                let program = ScatterProgram {
                    source: texture,
                    source_size: (width, height),
                    offset: (ox, oy),
                    tile,
                    scale,
                };
                let count = (tile.0 * tile.1) as usize;
                device.draw_points(target, &program, count, BlendMode::Additive)?;
            }
        }
        Ok(())
    }
}
