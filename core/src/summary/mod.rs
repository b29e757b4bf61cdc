//! Light summary
//!
//! Reduces ID buffers to per-ID light totals in two GPU passes. The pixel
//! reduction sums every rendered light sample into a totals texture with one
//! row per ID. When a timestep closes, the timestep reduction folds the row
//! sums into one column of a ring buffer holding `BLOCK_TIMESTEPS` columns.
//! Only full ring buffers (or explicit flushes) are read back to the host.
//!
//! IDs are partitioned into blocks of at most `BLOCK_CAPACITY` IDs, each
//! with its own textures.

mod block;
mod programs;

// Re-export
pub use block::*;

use crate::common::{Float, Timestamp};
use crate::error::{Error, Result};
use crate::gpu::{Device, TextureFormat, TextureHandle};
use crate::id::ObjectId;
use crate::light::LightAccumulator;
use std::collections::BTreeMap;

/// Width of an ID buffer tile reduced by one pass.
pub const TILE_WIDTH: u32 = 256;

/// Height of an ID buffer tile reduced by one pass.
pub const TILE_HEIGHT: u32 = 256;

/// Columns of a totals texture; one per tile column.
pub const TOTALS_WIDTH: u32 = TILE_WIDTH;

/// Maximum number of IDs per block.
pub const BLOCK_CAPACITY: usize = 256;

/// Number of timesteps buffered on the GPU before they are read back.
pub const BLOCK_TIMESTEPS: usize = 64;

/// History values are stored divided by this factor so that they stay in
/// the precise range of half float textures.
pub const HISTORY_SCALE: Float = 1000.0;

/// One flushed timestep: its timestamp and the light received per ID.
pub type Timestep = (Timestamp, BTreeMap<ObjectId, Float>);

/// Accumulates light samples per ID and buffers closed timesteps.
#[derive(Debug)]
pub struct Summarizer {
    /// Format of the totals and history textures.
    format: TextureFormat,

    /// Tracked IDs in block order.
    ids: Vec<ObjectId>,

    /// Reduction state, `BLOCK_CAPACITY` IDs each.
    blocks: Vec<IdBlock>,

    /// Timestamps of closed timesteps not yet read back; index is the ring
    /// buffer column.
    pending: Vec<Timestamp>,

    /// Flushed timesteps in call order.
    series: Vec<Timestep>,

    /// No light sample was added since the current timestep opened.
    from_zero: bool,
}

impl Summarizer {
    /// Returns a summarizer without tracked IDs.
    ///
    /// * `format` - Format of the totals and history textures.
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            ids: vec![],
            blocks: vec![],
            pending: vec![],
            series: vec![],
            from_zero: true,
        }
    }

    /// Returns the tracked IDs.
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Returns the current blocks.
    pub fn blocks(&self) -> &[IdBlock] {
        &self.blocks
    }

    /// Returns the number of closed timesteps buffered on the GPU.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Switches to a new list of tracked IDs.
    ///
    /// Does nothing if the list is unchanged. Otherwise buffered timesteps
    /// are flushed first. Blocks keeping their length keep their textures,
    /// the others are reallocated and surplus blocks are released.
    ///
    /// * `device` - The device.
    /// * `ids`    - Tracked IDs.
    pub fn reconfigure(&mut self, device: &mut dyn Device, ids: &[ObjectId]) -> Result<()> {
        if ids == self.ids.as_slice() {
            return Ok(());
        }
        self.flush(device)?;

        if let Err(e) = self.layout_blocks(device, ids) {
            self.release(device);
            return Err(e);
        }
        self.ids = ids.to_vec();
        Ok(())
    }

    fn layout_blocks(&mut self, device: &mut dyn Device, ids: &[ObjectId]) -> Result<()> {
        let chunks: Vec<&[ObjectId]> = ids.chunks(BLOCK_CAPACITY).collect();

        while self.blocks.len() > chunks.len() {
            if let Some(block) = self.blocks.pop() {
                debug!("Releasing block {} of {} IDs", self.blocks.len(), block.len());
                block.release(device);
            }
        }

        for (i, chunk) in chunks.iter().enumerate() {
            if i < self.blocks.len() {
                let block = &mut self.blocks[i];
                if block.len() == chunk.len() {
                    if block.ids() != *chunk {
                        debug!("Block {i} keeps its textures for {} new IDs", chunk.len());
                        block.set_ids(chunk);
                    }
                    continue;
                }
                debug!("Reallocating block {i}: {} -> {} IDs", block.len(), chunk.len());
                let new_block = IdBlock::new(device, chunk, self.format)?;
                std::mem::replace(block, new_block).release(device);
            } else {
                debug!("Allocating block {i} for {} IDs", chunk.len());
                self.blocks.push(IdBlock::new(device, chunk, self.format)?);
            }
        }
        Ok(())
    }

    /// Closes the current timestep and stores its totals under `time`.
    /// Flushes automatically once `BLOCK_TIMESTEPS` timesteps are buffered.
    ///
    /// A timestep without light samples records zeros.
    ///
    /// * `device` - The device.
    /// * `time`   - Timestamp of the timestep.
    pub fn end_timestep(&mut self, device: &mut dyn Device, time: Timestamp) -> Result<()> {
        let unlit = self.from_zero;
        self.from_zero = true;

        let column = self.pending.len();
        for block in self.blocks.iter_mut() {
            if unlit {
                block.clear_totals(device)?;
            }
            block.close_timestep(device, column)?;
        }
        self.pending.push(time);

        if self.pending.len() >= BLOCK_TIMESTEPS {
            debug!("Ring buffer full after {} timesteps", self.pending.len());
            self.flush(device)?;
        }
        Ok(())
    }

    /// Discards the light added since the last closed timestep. Closed
    /// timesteps stay buffered.
    pub fn abort_timestep(&mut self) {
        if !self.from_zero {
            debug!("Discarding partial timestep");
        }
        self.from_zero = true;
    }

    /// Reads buffered timesteps back and appends them to the series. Does
    /// nothing when no timestep is buffered. On failure the buffered
    /// timesteps are kept.
    ///
    /// * `device` - The device.
    pub fn flush(&mut self, device: &mut dyn Device) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        if device.is_context_lost() {
            error!("Cannot flush {} timesteps: rendering context lost", self.pending.len());
            return Err(Error::ContextLost);
        }

        let mut entries = vec![BTreeMap::new(); self.pending.len()];
        for block in self.blocks.iter() {
            let values = block.read_history(device)?;
            for (row, id) in block.ids().iter().enumerate() {
                let history = &values[row * BLOCK_TIMESTEPS..(row + 1) * BLOCK_TIMESTEPS];
                for (entry, value) in entries.iter_mut().zip(history.iter()) {
                    entry.insert(*id, value * HISTORY_SCALE);
                }
            }
        }

        debug!("Flushed {} timesteps of {} IDs", self.pending.len(), self.ids.len());
        self.series.extend(self.pending.drain(..).zip(entries));
        Ok(())
    }

    /// Flushes and returns every timestep since the last
    /// `clear_timesteps()`.
    ///
    /// * `device` - The device.
    pub fn timesteps(&mut self, device: &mut dyn Device) -> Result<&[Timestep]> {
        self.flush(device)?;
        Ok(&self.series)
    }

    /// Removes and returns the flushed series.
    pub fn clear_timesteps(&mut self) -> Vec<Timestep> {
        std::mem::take(&mut self.series)
    }

    /// Releases every block and forgets the tracked IDs and buffered
    /// timesteps.
    ///
    /// * `device` - The device.
    pub fn release(&mut self, device: &mut dyn Device) {
        for block in self.blocks.drain(..) {
            block.release(device);
        }
        self.ids.clear();
        self.pending.clear();
        self.from_zero = true;
    }
}

impl LightAccumulator for Summarizer {
    fn add_light(
        &mut self,
        device: &mut dyn Device,
        texture: TextureHandle,
        width: u32,
        height: u32,
        scale: Float,
    ) -> Result<()> {
        let tiles_x = (width + TILE_WIDTH - 1) / TILE_WIDTH;
        let tiles_y = (height + TILE_HEIGHT - 1) / TILE_HEIGHT;

        for block in self.blocks.iter_mut() {
            let mut from_zero = self.from_zero;
            for ty in 0..tiles_y {
                for tx in 0..tiles_x {
                    let offset = (tx * TILE_WIDTH, ty * TILE_HEIGHT);
                    block.reduce_tile(device, texture, (width, height), offset, scale, from_zero)?;
                    from_zero = false;
                }
            }
        }
        self.from_zero = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{point3, vector3};
    use crate::gpu::{DeviceCapabilities, SoftwareDevice};
    use crate::id::encode_id;
    use crate::light::LightTarget;
    use crate::scene::fixtures::*;
    use crate::scene::{Material, Side};
    use float_cmp::*;

    fn id(i: u32) -> ObjectId {
        ObjectId::new(i)
    }

    fn id_quad(i: u32, x: Float, z: Float, size: Float) -> Quad {
        Quad::horizontal(point3(x, 0.0, z), size)
            .with_id(id(i))
            .with_material(Material::basic("id", encode_id(id(i))).with_side(Side::Double))
    }

    fn sun(
        device: &mut SoftwareDevice,
        summarizer: &mut Summarizer,
        scene: &TestScene,
        view: Float,
        res: u32,
    ) {
        let mut target = LightTarget::new(res);
        target
            .render(device, scene, &vector3(0.0, 1.0, 0.0), view, 1.0, summarizer)
            .unwrap();
        target.release(device);
    }

    fn last_value(summarizer: &mut Summarizer, device: &mut SoftwareDevice, i: u32) -> Float {
        let series = summarizer.timesteps(device).unwrap();
        series.last().unwrap().1[&id(i)]
    }

    #[test]
    fn totals_equal_lit_area() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, -0.5, 0.0, 0.5), id_quad(2, 0.5, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1), id(2), id(3)]).unwrap();

        sun(&mut device, &mut summarizer, &scene, 4.0, 64);
        summarizer.end_timestep(&mut device, 10.0).unwrap();

        let series = summarizer.timesteps(&mut device).unwrap();
        assert_eq!(series.len(), 1);
        let (time, values) = &series[0];
        assert_eq!(*time, 10.0);
        assert!(approx_eq!(Float, values[&id(1)], 0.25, epsilon = 0.001));
        assert!(approx_eq!(Float, values[&id(2)], 1.0, epsilon = 0.001));
        assert!(approx_eq!(Float, values[&id(3)], 0.0, epsilon = 0.001));
    }

    #[test]
    fn images_larger_than_a_tile_are_reduced_tile_by_tile() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();

        sun(&mut device, &mut summarizer, &scene, 2.0, 600);
        summarizer.end_timestep(&mut device, 0.0).unwrap();

        let value = last_value(&mut summarizer, &mut device, 1);
        assert!(approx_eq!(Float, value, 1.0, epsilon = 0.001));
    }

    #[test]
    fn samples_of_one_timestep_add_up() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();

        sun(&mut device, &mut summarizer, &scene, 2.0, 64);
        sun(&mut device, &mut summarizer, &scene, 2.0, 32);
        summarizer.end_timestep(&mut device, 0.0).unwrap();
        sun(&mut device, &mut summarizer, &scene, 2.0, 64);
        summarizer.end_timestep(&mut device, 1.0).unwrap();

        let series = summarizer.timesteps(&mut device).unwrap();
        assert!(approx_eq!(Float, series[0].1[&id(1)], 2.0, epsilon = 0.001));
        assert!(approx_eq!(Float, series[1].1[&id(1)], 1.0, epsilon = 0.001));
    }

    #[test]
    fn aborted_timestep_is_discarded() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();

        sun(&mut device, &mut summarizer, &scene, 2.0, 64);
        summarizer.end_timestep(&mut device, 0.0).unwrap();
        sun(&mut device, &mut summarizer, &scene, 2.0, 64);
        summarizer.abort_timestep();
        assert_eq!(summarizer.pending_count(), 1);

        sun(&mut device, &mut summarizer, &scene, 2.0, 32);
        summarizer.end_timestep(&mut device, 1.0).unwrap();
        summarizer.abort_timestep();
        summarizer.end_timestep(&mut device, 2.0).unwrap();

        let series = summarizer.timesteps(&mut device).unwrap();
        assert_eq!(series.len(), 3);
        assert!(approx_eq!(Float, series[0].1[&id(1)], 1.0, epsilon = 0.001));
        assert!(approx_eq!(Float, series[1].1[&id(1)], 1.0, epsilon = 0.001));
        assert_eq!(series[2].1[&id(1)], 0.0);
    }

    #[test]
    fn timestep_without_light_records_zero() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();

        sun(&mut device, &mut summarizer, &scene, 2.0, 64);
        summarizer.end_timestep(&mut device, 0.0).unwrap();
        summarizer.end_timestep(&mut device, 1.0).unwrap();

        let series = summarizer.timesteps(&mut device).unwrap();
        assert!(approx_eq!(Float, series[0].1[&id(1)], 1.0, epsilon = 0.001));
        assert_eq!(series[1].1[&id(1)], 0.0);
    }

    #[test]
    fn full_ring_buffer_flushes_automatically() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();

        for step in 0..BLOCK_TIMESTEPS {
            sun(&mut device, &mut summarizer, &scene, 2.0, 16);
            summarizer.end_timestep(&mut device, step as Timestamp).unwrap();
        }
        assert_eq!(summarizer.pending_count(), 0);

        sun(&mut device, &mut summarizer, &scene, 2.0, 16);
        summarizer.end_timestep(&mut device, 64.0).unwrap();
        assert_eq!(summarizer.pending_count(), 1);

        let series = summarizer.timesteps(&mut device).unwrap();
        assert_eq!(series.len(), BLOCK_TIMESTEPS + 1);
        for (i, (time, values)) in series.iter().enumerate() {
            assert_eq!(*time, i as Timestamp);
            assert!(approx_eq!(Float, values[&id(1)], 1.0, epsilon = 0.001));
        }
    }

    #[test]
    fn identical_ids_keep_everything() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        summarizer.reconfigure(&mut device, &[id(1), id(2)]).unwrap();
        summarizer.end_timestep(&mut device, 0.0).unwrap();
        let totals = *summarizer.blocks()[0].totals();

        summarizer.reconfigure(&mut device, &[id(1), id(2)]).unwrap();
        assert_eq!(*summarizer.blocks()[0].totals(), totals);
        assert_eq!(summarizer.pending_count(), 1);
    }

    #[test]
    fn same_length_keeps_textures_with_new_ids() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, -0.5, 0.0, 1.0), id_quad(3, 0.5, 0.0, 0.5)]);
        summarizer.reconfigure(&mut device, &[id(1), id(2)]).unwrap();
        summarizer.end_timestep(&mut device, 0.0).unwrap();
        let history = *summarizer.blocks()[0].history();

        summarizer.reconfigure(&mut device, &[id(1), id(3)]).unwrap();
        assert_eq!(summarizer.pending_count(), 0);
        assert_eq!(summarizer.blocks()[0].ids(), &[id(1), id(3)]);
        assert_eq!(*summarizer.blocks()[0].history(), history);

        sun(&mut device, &mut summarizer, &scene, 4.0, 64);
        summarizer.end_timestep(&mut device, 1.0).unwrap();
        let value = last_value(&mut summarizer, &mut device, 3);
        assert!(approx_eq!(Float, value, 0.25, epsilon = 0.001));
    }

    #[test]
    fn changed_length_flushes_and_reallocates() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();
        for step in 0..3 {
            sun(&mut device, &mut summarizer, &scene, 2.0, 32);
            summarizer.end_timestep(&mut device, step as Timestamp).unwrap();
        }
        let totals = *summarizer.blocks()[0].totals();

        summarizer.reconfigure(&mut device, &[id(1), id(2)]).unwrap();
        assert_eq!(summarizer.pending_count(), 0);
        assert_ne!(*summarizer.blocks()[0].totals(), totals);
        assert_eq!(device.texture_count(), 4);

        let series = summarizer.timesteps(&mut device).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|(_, v)| approx_eq!(Float, v[&id(1)], 1.0, epsilon = 0.001)));
    }

    #[test]
    fn ids_beyond_one_block_get_their_own_block() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        let mut quads = vec![];
        for i in 0..300u32 {
            let x = (i % 20) as Float - 9.5;
            let z = (i / 20) as Float - 9.5;
            quads.push(id_quad(i + 1, x, z, 0.6));
        }
        let scene = TestScene::new(quads);
        let ids: Vec<ObjectId> = (1..=300).map(id).collect();
        summarizer.reconfigure(&mut device, &ids).unwrap();
        assert_eq!(summarizer.blocks().len(), 2);
        assert_eq!(summarizer.blocks()[0].len(), BLOCK_CAPACITY);
        assert_eq!(summarizer.blocks()[1].len(), 44);

        sun(&mut device, &mut summarizer, &scene, 20.0, 200);
        summarizer.end_timestep(&mut device, 0.0).unwrap();

        let series = summarizer.timesteps(&mut device).unwrap();
        for i in 1..=300 {
            assert!(
                approx_eq!(Float, series[0].1[&id(i)], 0.36, epsilon = 0.001),
                "ID {i}: {}",
                series[0].1[&id(i)]
            );
        }

        summarizer.reconfigure(&mut device, &ids[..10]).unwrap();
        assert_eq!(summarizer.blocks().len(), 1);
        assert_eq!(device.texture_count(), 4);
    }

    #[test]
    fn flush_after_context_loss_fails_and_keeps_data() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();
        summarizer.end_timestep(&mut device, 0.0).unwrap();

        device.lose_context();
        assert_eq!(summarizer.flush(&mut device), Err(Error::ContextLost));
        assert_eq!(summarizer.pending_count(), 1);
    }

    #[test]
    fn empty_flush_is_a_no_op() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        device.lose_context();
        assert_eq!(summarizer.flush(&mut device), Ok(()));
        assert!(summarizer.clear_timesteps().is_empty());
    }

    #[test]
    fn half_float_history_keeps_three_digits() {
        let mut device = SoftwareDevice::with_capabilities(DeviceCapabilities {
            float_render_targets: false,
            half_float_render_targets: true,
            max_texture_size: 1024,
        });
        let mut summarizer = Summarizer::new(TextureFormat::R16Float);
        let scene = TestScene::new(vec![id_quad(1, 0.0, 0.0, 1.0)]);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();

        sun(&mut device, &mut summarizer, &scene, 2.0, 128);
        summarizer.end_timestep(&mut device, 0.0).unwrap();

        let value = last_value(&mut summarizer, &mut device, 1);
        assert!(approx_eq!(Float, value, 1.0, epsilon = 0.01));
    }

    #[test]
    fn clear_timesteps_drains_the_series() {
        let mut device = SoftwareDevice::new();
        let mut summarizer = Summarizer::new(TextureFormat::R32Float);
        summarizer.reconfigure(&mut device, &[id(1)]).unwrap();
        summarizer.end_timestep(&mut device, 0.0).unwrap();
        summarizer.end_timestep(&mut device, 1.0).unwrap();

        assert_eq!(summarizer.timesteps(&mut device).unwrap().len(), 2);
        assert_eq!(summarizer.clear_timesteps().len(), 2);
        assert!(summarizer.timesteps(&mut device).unwrap().is_empty());
    }
}
