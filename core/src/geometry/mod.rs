//! Geometry

mod matrix4x4;
mod point3;
mod transform;
mod vector3;

// Re-export
pub use matrix4x4::*;
pub use point3::*;
pub use transform::*;
pub use vector3::*;

/// A triangle in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    /// The three vertices.
    pub p: [Point3f; 3],
}

impl Triangle {
    /// Creates a new triangle.
    ///
    /// * `p0` - First vertex.
    /// * `p1` - Second vertex.
    /// * `p2` - Third vertex.
    pub fn new(p0: Point3f, p1: Point3f, p2: Point3f) -> Self {
        Self { p: [p0, p1, p2] }
    }

    /// Returns the triangle transformed by `t`.
    ///
    /// * `t` - The transformation.
    pub fn transform(&self, t: &Transform) -> Self {
        Self::new(
            t.transform_point(&self.p[0]),
            t.transform_point(&self.p[1]),
            t.transform_point(&self.p[2]),
        )
    }

    /// Returns the surface area.
    pub fn area(&self) -> crate::common::Float {
        0.5 * (self.p[1] - self.p[0]).cross(&(self.p[2] - self.p[0])).length()
    }
}
