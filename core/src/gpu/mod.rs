//! GPU device abstraction
//!
//! The engine talks to the GPU only through the `Device` trait: it creates
//! textures, rasterises a scene into an ID buffer, runs fragment and point
//! programs and reads results back. `SoftwareDevice` is a CPU reference
//! implementation of the same contract.

mod ping_pong;
mod program;
mod software;

// Re-export
pub use ping_pong::*;
pub use program::*;
pub use software::*;

use crate::camera::OrthographicProjection;
use crate::common::Float;
use crate::error::{Error, Result};
use crate::scene::Scene;

/// Opaque reference to a texture owned by a `Device`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Wraps a raw device texture name.
    ///
    /// * `id` - Raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Texel storage formats. All textures are sampled with nearest filtering.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    /// 8-bit normalised RGBA; used for ID buffers.
    Rgba8Unorm,

    /// 32-bit float RGBA.
    Rgba32Float,

    /// Single channel 32-bit float.
    R32Float,

    /// Single channel 16-bit float.
    R16Float,
}

impl TextureFormat {
    /// Returns the number of stored channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Rgba8Unorm | Self::Rgba32Float => 4,
            Self::R32Float | Self::R16Float => 1,
        }
    }

    /// Returns true for floating point formats.
    pub fn is_float(&self) -> bool {
        !matches!(self, Self::Rgba8Unorm)
    }
}

/// Parameters for `Device::create_texture`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in texels.
    pub width: u32,

    /// Height in texels.
    pub height: u32,

    /// Storage format.
    pub format: TextureFormat,
}

impl TextureDescriptor {
    /// Returns a new texture descriptor.
    ///
    /// * `width`  - Width in texels.
    /// * `height` - Height in texels.
    /// * `format` - Storage format.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }
}

/// Render target support of a device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// 32-bit float textures can be rendered into.
    pub float_render_targets: bool,

    /// 16-bit float textures can be rendered into.
    pub half_float_render_targets: bool,

    /// Largest texture side length.
    pub max_texture_size: u32,
}

impl DeviceCapabilities {
    /// Returns the most precise single channel format the device can render
    /// into. Integer formats cannot hold accumulated light values.
    pub fn data_format(&self) -> Result<TextureFormat> {
        if self.float_render_targets {
            info!("Using 32-bit float render targets");
            Ok(TextureFormat::R32Float)
        } else if self.half_float_render_targets {
            info!("Using 16-bit float render targets");
            Ok(TextureFormat::R16Float)
        } else {
            error!("Device supports neither float nor half float render targets");
            Err(Error::UnsupportedFormat)
        }
    }
}

/// Operations the engine requires from a GPU.
///
/// Every method fails with `Error::ContextLost` after the underlying context
/// was lost; all textures are gone at that point.
pub trait Device {
    /// Returns the render target support of this device.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Returns true if the context was lost.
    fn is_context_lost(&self) -> bool;

    /// Allocates a texture with undefined contents.
    ///
    /// * `desc` - Texture parameters.
    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<TextureHandle>;

    /// Releases a texture. Unknown handles are ignored.
    ///
    /// * `texture` - The texture.
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Returns the `(width, height)` of a texture.
    ///
    /// * `texture` - The texture.
    fn texture_size(&self, texture: TextureHandle) -> Result<(u32, u32)>;

    /// Fills a texture with a constant RGBA value.
    ///
    /// * `target` - The texture.
    /// * `color`  - Fill value.
    fn clear(&mut self, target: TextureHandle, color: [Float; 4]) -> Result<()>;

    /// Rasterises a scene into `target`, which is first cleared to the scene
    /// background.
    ///
    /// * `scene`      - The scene.
    /// * `projection` - Camera projection.
    /// * `target`     - An `Rgba8Unorm` texture.
    fn render_scene(
        &mut self,
        scene: &dyn Scene,
        projection: &OrthographicProjection,
        target: TextureHandle,
    ) -> Result<()>;

    /// Runs a fragment program for every texel of `target` and stores the
    /// result in its first channel.
    ///
    /// * `target`  - Output texture.
    /// * `program` - The program.
    fn draw_fragments(
        &mut self,
        target: TextureHandle,
        program: &dyn FragmentProgram,
    ) -> Result<()>;

    /// Runs a point program `count` times and blends the emitted points into
    /// `target`.
    ///
    /// * `target`  - Output texture.
    /// * `program` - The program.
    /// * `count`   - Number of vertices.
    /// * `blend`   - Blend mode.
    fn draw_points(
        &mut self,
        target: TextureHandle,
        program: &dyn PointProgram,
        count: usize,
        blend: BlendMode,
    ) -> Result<()>;

    /// Copies a texture back to the host. `buf` receives one value per texel
    /// and channel in row-major order and must be exactly that long.
    ///
    /// * `texture` - The texture.
    /// * `buf`     - Destination buffer.
    fn read_pixels(&mut self, texture: TextureHandle, buf: &mut [Float]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_format_prefers_full_float() {
        let caps = DeviceCapabilities {
            float_render_targets: true,
            half_float_render_targets: true,
            max_texture_size: 1024,
        };
        assert_eq!(caps.data_format(), Ok(TextureFormat::R32Float));
    }

    #[test]
    fn data_format_falls_back_to_half_float() {
        let caps = DeviceCapabilities {
            float_render_targets: false,
            half_float_render_targets: true,
            max_texture_size: 1024,
        };
        assert_eq!(caps.data_format(), Ok(TextureFormat::R16Float));
    }

    #[test]
    fn data_format_requires_float_support() {
        let caps = DeviceCapabilities {
            float_render_targets: false,
            half_float_render_targets: false,
            max_texture_size: 1024,
        };
        assert_eq!(caps.data_format(), Err(Error::UnsupportedFormat));
    }

    #[test]
    fn channel_counts() {
        assert_eq!(TextureFormat::Rgba8Unorm.channels(), 4);
        assert_eq!(TextureFormat::R16Float.channels(), 1);
        assert!(!TextureFormat::Rgba8Unorm.is_float());
        assert!(TextureFormat::R32Float.is_float());
    }
}
