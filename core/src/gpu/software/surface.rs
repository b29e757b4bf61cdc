//! Texel storage

use crate::common::{clamp, Float};
use crate::error::{Error, Result};
use crate::gpu::{TextureDescriptor, TextureFormat};
use half::f16;

/// Texture contents kept as four channels per texel. Every write is
/// quantised to the precision of the texture format.
#[derive(Clone, Debug)]
pub(super) struct Surface {
    /// Width in texels.
    pub width: u32,

    /// Height in texels.
    pub height: u32,

    /// Storage format.
    pub format: TextureFormat,

    /// RGBA values in row-major order.
    data: Vec<Float>,
}

impl Surface {
    /// Allocates a zero filled surface.
    ///
    /// * `desc` - Texture parameters.
    pub fn new(desc: &TextureDescriptor) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            data: vec![0.0; 4 * desc.width as usize * desc.height as usize],
        }
    }

    /// Returns the texel at `(x, y)` or zeros outside the surface.
    ///
    /// * `x` - Column.
    /// * `y` - Row.
    pub fn texel(&self, x: i64, y: i64) -> [Float; 4] {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return [0.0; 4];
        }
        let i = 4 * (y as usize * self.width as usize + x as usize);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Stores a texel.
    ///
    /// * `x`     - Column.
    /// * `y`     - Row.
    /// * `texel` - RGBA value.
    pub fn write(&mut self, x: u32, y: u32, texel: [Float; 4]) {
        let i = 4 * (y as usize * self.width as usize + x as usize);
        self.data[i..i + 4].copy_from_slice(&quantize(self.format, texel));
    }

    /// Fills the whole surface.
    ///
    /// * `texel` - RGBA value.
    pub fn fill(&mut self, texel: [Float; 4]) {
        let q = quantize(self.format, texel);
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&q);
        }
    }

    /// Copies the stored channels into `buf`.
    ///
    /// * `buf` - Destination; one value per texel and stored channel.
    pub fn read(&self, buf: &mut [Float]) -> Result<()> {
        let channels = self.format.channels();
        let expected = channels * self.width as usize * self.height as usize;
        if buf.len() != expected {
            return Err(Error::InvalidTarget(format!(
                "read buffer holds {} values, texture has {}",
                buf.len(),
                expected
            )));
        }
        for (dst, src) in buf.chunks_exact_mut(channels).zip(self.data.chunks_exact(4)) {
            dst.copy_from_slice(&src[..channels]);
        }
        Ok(())
    }
}

/// Rounds a texel to what `format` can store.
///
/// * `format` - Storage format.
/// * `texel`  - RGBA value.
pub(super) fn quantize(format: TextureFormat, texel: [Float; 4]) -> [Float; 4] {
    match format {
        TextureFormat::Rgba8Unorm => texel.map(|c| (clamp(c, 0.0, 1.0) * 255.0).round() / 255.0),
        TextureFormat::Rgba32Float => texel,
        TextureFormat::R32Float => [texel[0], 0.0, 0.0, 1.0],
        TextureFormat::R16Float => [f16::from_f32(texel[0]).to_f32(), 0.0, 0.0, 1.0],
    }
}
