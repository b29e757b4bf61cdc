//! Triangle lists

use photosynthesis_core::common::Float;
use photosynthesis_core::geometry::*;

/// Triangles in object space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    /// The triangles, counter-clockwise seen from the front.
    pub triangles: Vec<Triangle>,
}

impl Geometry {
    /// Returns a horizontal rectangle centred on the origin facing +y.
    ///
    /// * `width` - Extent along x.
    /// * `depth` - Extent along z.
    pub fn plane(width: Float, depth: Float) -> Self {
        let mut geometry = Self::default();
        geometry.push_face(
            zero_point3(),
            vector3(0.0, 0.0, 0.5 * depth),
            vector3(0.5 * width, 0.0, 0.0),
        );
        geometry
    }

    /// Returns a box centred on the origin with outward facing sides.
    ///
    /// * `size` - Extents along x, y and z.
    pub fn cuboid(size: &Vector3f) -> Self {
        let h = *size * 0.5;
        let x = vector3(h.x, 0.0, 0.0);
        let y = vector3(0.0, h.y, 0.0);
        let z = vector3(0.0, 0.0, h.z);

        let mut geometry = Self::default();
        for (n, u, v) in [(x, y, z), (y, z, x), (z, x, y)] {
            geometry.push_face(Point3f::from(n), u, v);
            geometry.push_face(Point3f::from(-n), v, u);
        }
        geometry
    }

    /// Adds a parallelogram facing `u x v`.
    ///
    /// * `center` - Centre of the face.
    /// * `u`      - Half of the first edge.
    /// * `v`      - Half of the second edge.
    fn push_face(&mut self, center: Point3f, u: Vector3f, v: Vector3f) {
        let p0 = center - u - v;
        let p1 = center + u - v;
        let p2 = center + u + v;
        let p3 = center - u + v;
        self.triangles.push(Triangle::new(p0, p1, p2));
        self.triangles.push(Triangle::new(p0, p2, p3));
    }

    /// Returns the total surface area.
    pub fn area(&self) -> Float {
        self.triangles.iter().map(|t| t.area()).sum()
    }

    /// Returns the geometry transformed by `t`.
    ///
    /// * `t` - The transformation.
    pub fn transform(&self, t: &Transform) -> Self {
        Self {
            triangles: self.triangles.iter().map(|tri| tri.transform(t)).collect(),
        }
    }
}

/// Returns the normal of a counter-clockwise triangle.
///
/// * `t` - The triangle.
pub fn face_normal(t: &Triangle) -> Vector3f {
    (t.p[1] - t.p[0]).cross(&(t.p[2] - t.p[0])).normalize()
}
