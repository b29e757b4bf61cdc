//! Diffuse skylight

use crate::sky::{SkyModel, StandardOvercastSky};
use photosynthesis_core::common::{Float, PI};
use photosynthesis_core::geometry::*;
use photosynthesis_core::gpu::Device;
use photosynthesis_core::light::*;
use photosynthesis_core::scene::Scene;
use photosynthesis_core::Result;

/// One direction of the sky.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SkySample {
    /// Unit vector pointing towards the sky patch, in the light's frame.
    pub direction: Vector3f,

    /// Sky luminance of the patch.
    pub weight: Float,
}

/// Light from the whole upper hemisphere, approximated by parallel light
/// from a fixed set of directions.
///
/// The directions follow a golden angle spiral from the zenith towards the
/// horizon so that they cover the hemisphere evenly. Each direction is
/// weighted by the sky model and the weights are normalized, so the result
/// does not depend on the number of directions.
#[derive(Debug)]
pub struct DiffuseLight {
    /// ID buffer shared by all samples.
    target: LightTarget,

    /// Sky directions.
    samples: Vec<SkySample>,

    /// Side length of the lit square around the origin.
    view_size: Float,

    /// Rotation from the light's frame to the world, e.g. the inclination of
    /// a sloped field.
    orientation: Transform,

    /// Sky luminance distribution.
    sky: Box<dyn SkyModel>,
}

impl DiffuseLight {
    /// Returns a new `DiffuseLight` under a standard overcast sky.
    ///
    /// * `count`       - Number of directions.
    /// * `view_size`   - Side length of the lit square around the origin.
    /// * `render_size` - Resolution of the ID buffer.
    pub fn new(count: usize, view_size: Float, render_size: u32) -> Self {
        let mut light = Self {
            target: LightTarget::new(render_size),
            samples: vec![],
            view_size,
            orientation: Transform::identity(),
            sky: Box::new(StandardOvercastSky),
        };
        light.set_count(count);
        light
    }

    /// Regenerates the sky directions.
    ///
    /// * `count` - Number of directions.
    pub fn set_count(&mut self, count: usize) {
        let golden_angle = PI * (3.0 - (5.0 as Float).sqrt());
        let n = count as Float;

        self.samples = (1..=count)
            .map(|i| {
                let i = i as Float;
                let sin_lat = 1.0 - i / (n + 1.0);
                let cos_lat = (1.0 - sin_lat * sin_lat).sqrt();
                let (sin_lon, cos_lon) = (golden_angle * i).sin_cos();
                SkySample {
                    direction: vector3(cos_lon * cos_lat, sin_lat, sin_lon * cos_lat),
                    weight: self.sky.luminance(sin_lat),
                }
            })
            .collect();
        debug!("Diffuse light with {count} directions");
    }

    /// Returns the number of directions.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Returns the sky directions.
    pub fn samples(&self) -> &[SkySample] {
        &self.samples
    }

    /// Replaces the sky model and reweights the directions.
    ///
    /// * `sky` - Sky luminance distribution.
    pub fn set_sky_model(&mut self, sky: Box<dyn SkyModel>) {
        self.sky = sky;
        let count = self.samples.len();
        self.set_count(count);
    }

    /// Sets the rotation from the light's frame to the world.
    ///
    /// * `orientation` - Rotation.
    pub fn set_orientation(&mut self, orientation: Transform) {
        self.orientation = orientation;
    }

    /// Sets the side length of the lit square.
    ///
    /// * `view_size` - Side length.
    pub fn set_view_size(&mut self, view_size: Float) {
        self.view_size = view_size;
    }

    /// Sets the resolution of the ID buffer.
    ///
    /// * `render_size` - Side length in pixels.
    pub fn set_render_size(&mut self, render_size: u32) {
        self.target.set_resolution(render_size);
    }
}

impl LightSource for DiffuseLight {
    fn render(
        &mut self,
        device: &mut dyn Device,
        scene: &dyn Scene,
        accumulator: &mut dyn LightAccumulator,
    ) -> Result<()> {
        let total: Float = self.samples.iter().map(|s| s.weight).sum();
        if total <= 0.0 {
            return Ok(());
        }
        for sample in self.samples.iter() {
            let direction = self.orientation.transform_vector(&sample.direction);
            self.target.render(
                device,
                scene,
                &direction,
                self.view_size,
                sample.weight / total,
                accumulator,
            )?;
        }
        Ok(())
    }

    fn release(&mut self, device: &mut dyn Device) {
        self.target.release(device);
    }
}
