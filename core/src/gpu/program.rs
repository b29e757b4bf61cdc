//! Shader programs
//!
//! Programs are plain Rust types executed by a `Device`. They only see
//! their inputs through a `TexelSource`, the equivalent of sampler uniforms
//! with nearest filtering.

use super::TextureHandle;
use crate::common::Float;

/// Read access to the input textures of a program.
pub trait TexelSource: Sync {
    /// Returns the RGBA texel at `(x, y)`. Single channel textures return
    /// `[r, 0, 0, 1]`; coordinates outside the texture return zeros.
    ///
    /// * `texture` - The texture.
    /// * `x`       - Column.
    /// * `y`       - Row.
    fn fetch(&self, texture: TextureHandle, x: i64, y: i64) -> [Float; 4];

    /// Returns the `(width, height)` of an input texture, or `(0, 0)` if it
    /// is not an input.
    ///
    /// * `texture` - The texture.
    fn size(&self, texture: TextureHandle) -> (u32, u32);
}

/// A program evaluated once per output texel.
pub trait FragmentProgram: Sync {
    /// Returns the textures the program reads.
    fn inputs(&self) -> Vec<TextureHandle>;

    /// Returns the value written to the first channel of texel `(x, y)`.
    ///
    /// * `x`      - Column.
    /// * `y`      - Row.
    /// * `texels` - Input textures.
    fn shade(&self, x: u32, y: u32, texels: &dyn TexelSource) -> Float;
}

/// One point primitive covering a single texel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointOutput {
    /// Column.
    pub x: u32,

    /// Row.
    pub y: u32,

    /// Value blended into the first channel.
    pub value: Float,
}

/// A program evaluated once per vertex, emitting at most one point.
pub trait PointProgram: Sync {
    /// Returns the textures the program reads.
    fn inputs(&self) -> Vec<TextureHandle>;

    /// Returns the point emitted by vertex `index`, or `None` when the
    /// vertex is culled.
    ///
    /// * `index`  - Vertex index.
    /// * `texels` - Input textures.
    fn vertex(&self, index: usize, texels: &dyn TexelSource) -> Option<PointOutput>;
}

/// How point values are combined with the target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite.
    Replace,

    /// `dst = src + dst` (source and destination factors are one).
    Additive,
}
