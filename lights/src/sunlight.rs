//! Sunlight

use photosynthesis_core::common::Float;
use photosynthesis_core::geometry::*;
use photosynthesis_core::gpu::Device;
use photosynthesis_core::light::*;
use photosynthesis_core::scene::Scene;
use photosynthesis_core::Result;

/// Parallel light from a single direction, rendered as one sample.
#[derive(Debug)]
pub struct Sunlight {
    /// ID buffer.
    target: LightTarget,

    /// Unit vector pointing towards the sun.
    direction: Vector3f,

    /// Side length of the lit square around the origin.
    view_size: Float,

    /// Weight of the sample.
    intensity: Float,
}

impl Sunlight {
    /// Returns a new `Sunlight` shining straight down.
    ///
    /// * `view_size`   - Side length of the lit square around the origin.
    /// * `render_size` - Resolution of the ID buffer.
    pub fn new(view_size: Float, render_size: u32) -> Self {
        Self {
            target: LightTarget::new(render_size),
            direction: vector3(0.0, 1.0, 0.0),
            view_size,
            intensity: 1.0,
        }
    }

    /// Sets the direction towards the sun.
    ///
    /// * `direction` - Direction; need not be normalized. A zero or
    ///                 non-finite vector leaves the direction unchanged.
    pub fn set_direction(&mut self, direction: &Vector3f) {
        let length = direction.length();
        if length > 0.0 && length.is_finite() {
            self.direction = *direction / length;
        } else {
            warn!("Ignoring sun direction {direction:?}");
        }
    }

    /// Returns the unit vector pointing towards the sun.
    pub fn direction(&self) -> Vector3f {
        self.direction
    }

    /// Sets the side length of the lit square.
    ///
    /// * `view_size` - Side length.
    pub fn set_view_size(&mut self, view_size: Float) {
        self.view_size = view_size;
    }

    /// Returns the side length of the lit square.
    pub fn view_size(&self) -> Float {
        self.view_size
    }

    /// Sets the resolution of the ID buffer.
    ///
    /// * `render_size` - Side length in pixels.
    pub fn set_render_size(&mut self, render_size: u32) {
        self.target.set_resolution(render_size);
    }

    /// Sets the weight of the sample.
    ///
    /// * `intensity` - Weight; 1 reports lit area.
    pub fn set_intensity(&mut self, intensity: Float) {
        self.intensity = intensity;
    }
}

impl LightSource for Sunlight {
    fn render(
        &mut self,
        device: &mut dyn Device,
        scene: &dyn Scene,
        accumulator: &mut dyn LightAccumulator,
    ) -> Result<()> {
        self.target.render(
            device,
            scene,
            &self.direction,
            self.view_size,
            self.intensity,
            accumulator,
        )
    }

    fn release(&mut self, device: &mut dyn Device) {
        self.target.release(device);
    }
}
