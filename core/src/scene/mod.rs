//! Scene interface
//!
//! The scene graph is owned by the caller. The engine only needs to walk the
//! visible objects, swap their materials for one pass and hand the scene to
//! a `Device` for rasterisation.

mod color;
mod material;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export
pub use color::*;
pub use material::*;

use crate::geometry::Triangle;
use crate::id::ObjectId;

/// An object that can be rasterised and carries a swappable material.
pub trait Renderable {
    /// Returns the ID of the whole object, if it is tracked.
    fn photosynthesis_id(&self) -> Option<ObjectId> {
        None
    }

    /// Returns every ID this object paints. Instanced objects paint one ID
    /// per instance.
    fn tracked_ids(&self) -> Vec<ObjectId> {
        self.photosynthesis_id().into_iter().collect()
    }

    /// Returns the current material.
    fn material(&self) -> ArcMaterial;

    /// Replaces the current material.
    ///
    /// * `material` - The new material.
    fn set_material(&mut self, material: ArcMaterial);

    /// Returns a precomputed ID material. When present the engine uses it as
    /// is instead of deriving one from `material()`.
    fn id_material(&self) -> Option<ArcMaterial> {
        None
    }

    /// Calls `visitor` with every world space triangle and the colour of the
    /// instance it belongs to, if the object is instanced.
    ///
    /// * `visitor` - Callback.
    fn for_each_triangle(&self, visitor: &mut dyn FnMut(&Triangle, Option<Color>));
}

/// A collection of renderable objects.
///
/// Both visitors must visit the same visible objects in the same order as
/// long as the scene is not modified in between.
pub trait Scene {
    /// Returns the colour of pixels not covered by any object.
    fn background(&self) -> Color;

    /// Sets the background colour.
    ///
    /// * `color` - The colour.
    fn set_background(&mut self, color: Color);

    /// Visits every visible object.
    ///
    /// * `visitor` - Callback.
    fn visit_visible(&self, visitor: &mut dyn FnMut(&dyn Renderable));

    /// Visits every visible object mutably.
    ///
    /// * `visitor` - Callback.
    fn visit_visible_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn Renderable));
}
