//! Materials

use super::Color;
use std::sync::Arc;

/// How a material reacts to scene lights.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Flat colour, ignores lights.
    Unlit,

    /// Shaded by scene lights.
    Lit,
}

/// Which triangle faces are rasterised.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Only counter-clockwise faces as seen by the camera.
    Front,

    /// Both faces.
    Double,
}

/// Surface appearance of a renderable object.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Descriptive name.
    pub name: String,

    /// Shading model.
    pub shading: Shading,

    /// Base colour.
    pub color: Color,

    /// Rasterised faces.
    pub side: Side,

    /// Use per-instance colours instead of `color` when the object provides
    /// them.
    pub instance_colors: bool,

    /// Colour texture.
    pub map: Option<String>,

    /// Ambient occlusion texture.
    pub ao_map: Option<String>,

    /// Environment texture.
    pub env_map: Option<String>,
}

/// Atomic reference counted `Material`. Materials are compared by pointer
/// identity when they are swapped in and out of objects.
pub type ArcMaterial = Arc<Material>;

impl Material {
    /// Returns a new flat, front-sided material.
    ///
    /// * `name`  - Descriptive name.
    /// * `color` - Base colour.
    pub fn basic(name: &str, color: Color) -> Self {
        Self {
            name: String::from(name),
            shading: Shading::Unlit,
            color,
            side: Side::Front,
            instance_colors: false,
            map: None,
            ao_map: None,
            env_map: None,
        }
    }

    /// Returns a new shaded material.
    ///
    /// * `name`  - Descriptive name.
    /// * `color` - Base colour.
    pub fn lit(name: &str, color: Color) -> Self {
        Self {
            shading: Shading::Lit,
            ..Self::basic(name, color)
        }
    }

    /// Returns the material with the given side.
    ///
    /// * `side` - Rasterised faces.
    pub fn with_side(self, side: Side) -> Self {
        Self { side, ..self }
    }

    /// Returns the material with per-instance colours enabled.
    pub fn with_instance_colors(self) -> Self {
        Self {
            instance_colors: true,
            ..self
        }
    }

    /// Returns the material with a colour texture.
    ///
    /// * `map` - Texture name.
    pub fn with_map(self, map: &str) -> Self {
        Self {
            map: Some(String::from(map)),
            ..self
        }
    }

    /// Wraps the material for sharing.
    pub fn into_arc(self) -> ArcMaterial {
        Arc::new(self)
    }
}
