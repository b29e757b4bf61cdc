//! Light sources

use crate::camera::OrthographicProjection;
use crate::common::Float;
use crate::error::{Error, Result};
use crate::geometry::Vector3f;
use crate::gpu::{Device, TextureDescriptor, TextureFormat, TextureHandle};
use crate::scene::Scene;

/// Receives rendered ID buffers, one per light sample.
pub trait LightAccumulator {
    /// Reduces an ID buffer into per-ID totals.
    ///
    /// * `device`  - The device owning `texture`.
    /// * `texture` - ID buffer.
    /// * `width`   - Width of `texture`.
    /// * `height`  - Height of `texture`.
    /// * `scale`   - Area of one pixel times the sample weight.
    fn add_light(
        &mut self,
        device: &mut dyn Device,
        texture: TextureHandle,
        width: u32,
        height: u32,
        scale: Float,
    ) -> Result<()>;
}

/// A source of light samples.
pub trait LightSource {
    /// Renders every sample of this light and feeds it to `accumulator`.
    ///
    /// * `device`      - The device.
    /// * `scene`       - Scene with ID materials installed.
    /// * `accumulator` - Receives one ID buffer per sample.
    fn render(
        &mut self,
        device: &mut dyn Device,
        scene: &dyn Scene,
        accumulator: &mut dyn LightAccumulator,
    ) -> Result<()>;

    /// Releases device resources held by the light.
    ///
    /// * `device` - The device.
    fn release(&mut self, _device: &mut dyn Device) {}
}

/// A square ID buffer owned by a light source.
#[derive(Debug, Default)]
pub struct LightTarget {
    /// Side length in pixels.
    resolution: u32,

    /// The render target once allocated.
    texture: Option<TextureHandle>,
}

impl LightTarget {
    /// Returns a new unallocated target.
    ///
    /// * `resolution` - Side length in pixels.
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            texture: None,
        }
    }

    /// Returns the side length in pixels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Changes the side length. The texture is reallocated on next use.
    ///
    /// * `resolution` - Side length in pixels.
    pub fn set_resolution(&mut self, resolution: u32) {
        self.resolution = resolution;
    }

    /// Returns the texture, allocating it if it is missing, lost or of the
    /// wrong size.
    ///
    /// * `device` - The device.
    pub fn ensure(&mut self, device: &mut dyn Device) -> Result<TextureHandle> {
        if let Some(texture) = self.texture {
            match device.texture_size(texture) {
                Ok((w, h)) if w == self.resolution && h == self.resolution => return Ok(texture),
                Ok(_) => device.destroy_texture(texture),
                Err(Error::UnknownTexture(_)) => {}
                Err(e) => return Err(e),
            }
            self.texture = None;
        }

        let desc =
            TextureDescriptor::new(self.resolution, self.resolution, TextureFormat::Rgba8Unorm);
        let texture = device.create_texture(&desc)?;
        debug!("Allocated {}x{} light target", self.resolution, self.resolution);
        self.texture = Some(texture);
        Ok(texture)
    }

    /// Renders one light sample and feeds it to `accumulator`.
    ///
    /// * `device`         - The device.
    /// * `scene`          - Scene with ID materials installed.
    /// * `towards_source` - Direction from the scene to the light.
    /// * `view_size`      - Side length of the lit region.
    /// * `weight`         - Sample weight.
    /// * `accumulator`    - Receives the ID buffer.
    pub fn render(
        &mut self,
        device: &mut dyn Device,
        scene: &dyn Scene,
        towards_source: &Vector3f,
        view_size: Float,
        weight: Float,
        accumulator: &mut dyn LightAccumulator,
    ) -> Result<()> {
        let texture = self.ensure(device)?;
        let projection =
            OrthographicProjection::from_direction(towards_source, view_size, self.resolution);
        device.render_scene(scene, &projection, texture)?;
        accumulator.add_light(
            device,
            texture,
            self.resolution,
            self.resolution,
            projection.pixel_area() * weight,
        )
    }

    /// Releases the texture.
    ///
    /// * `device` - The device.
    pub fn release(&mut self, device: &mut dyn Device) {
        if let Some(texture) = self.texture.take() {
            device.destroy_texture(texture);
        }
    }
}
