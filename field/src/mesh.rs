//! Meshes

use crate::geometry::Geometry;
use photosynthesis_core::geometry::*;
use photosynthesis_core::id::ObjectId;
use photosynthesis_core::scene::*;

/// A triangle mesh with a single material placed in the world.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Name used in diagnostics.
    pub name: String,

    /// Tracked ID; `None` for occluders.
    pub id: Option<ObjectId>,

    /// Object space triangles.
    pub geometry: Geometry,

    /// Object to world transformation.
    pub transform: Transform,

    /// Current material.
    material: ArcMaterial,
}

impl Mesh {
    /// Returns a new untracked mesh at the origin.
    ///
    /// * `name`     - Name used in diagnostics.
    /// * `geometry` - Object space triangles.
    /// * `material` - Display material.
    pub fn new(name: &str, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.to_owned(),
            id: None,
            geometry,
            transform: Transform::identity(),
            material: material.into_arc(),
        }
    }

    /// Tracks the mesh under `id`.
    ///
    /// * `id` - Object ID issued by the engine.
    pub fn with_id(self, id: ObjectId) -> Self {
        Self { id: Some(id), ..self }
    }

    /// Places the mesh in the world.
    ///
    /// * `transform` - Object to world transformation.
    pub fn with_transform(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }
}

impl Renderable for Mesh {
    fn photosynthesis_id(&self) -> Option<ObjectId> {
        self.id
    }

    fn material(&self) -> ArcMaterial {
        ArcMaterial::clone(&self.material)
    }

    fn set_material(&mut self, material: ArcMaterial) {
        self.material = material;
    }

    fn for_each_triangle(&self, visitor: &mut dyn FnMut(&Triangle, Option<Color>)) {
        for t in self.geometry.triangles.iter() {
            visitor(&t.transform(&self.transform), None);
        }
    }
}
