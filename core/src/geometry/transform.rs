//! Transformations

use super::{matrix4x4, point3, vector3, Matrix4x4, Point3f, Vector3f, IDENTITY_MATRIX};
use crate::common::Float;
use std::ops::Mul;

/// A transformation for mapping from points to points and vectors to vectors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    /// The transformation matrix.
    pub m: Matrix4x4,

    /// The inverse transformation matrix.
    pub m_inv: Matrix4x4,
}

/// Create a transformation representing a translation.
///
/// * `delta` -  Translation.
#[rustfmt::skip]
pub fn translate(delta: &Vector3f) -> Transform {
    Transform {
        m: matrix4x4(
            1.0, 0.0, 0.0, delta.x,
            0.0, 1.0, 0.0, delta.y,
            0.0, 0.0, 1.0, delta.z,
            0.0, 0.0, 0.0, 1.0,
        ),
        m_inv: matrix4x4(
            1.0, 0.0, 0.0, -delta.x,
            0.0, 1.0, 0.0, -delta.y,
            0.0, 0.0, 1.0, -delta.z,
            0.0, 0.0, 0.0,  1.0,
        ),
    }
}

/// Create a transformation representing a scale.
///
/// * `x` -  Scaling factor in x-axis.
/// * `y` -  Scaling factor in y-axis.
/// * `z` -  Scaling factor in z-axis.
#[rustfmt::skip]
pub fn scale(x: Float, y: Float, z: Float) -> Transform {
    Transform {
        m: matrix4x4(
            x,   0.0, 0.0, 0.0,
            0.0, y,   0.0, 0.0,
            0.0, 0.0, z,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ),
        m_inv: matrix4x4(
            1.0 / x, 0.0,     0.0,     0.0,
            0.0,     1.0 / y, 0.0,     0.0,
            0.0,     0.0,     1.0 / z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        ),
    }
}

/// Create a transformation representing rotation about the x-axis.
///
/// * `theta` -  Angle in radians.
#[rustfmt::skip]
pub fn rotate_x(theta: Float) -> Transform {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let m = matrix4x4(
        1.0, 0.0,        0.0,       0.0,
        0.0, cos_theta, -sin_theta, 0.0,
        0.0, sin_theta,  cos_theta, 0.0,
        0.0, 0.0,        0.0,       1.0,
    );
    Transform { m, m_inv: m.transpose() }
}

/// Create a transformation representing rotation about the y-axis.
///
/// * `theta` -  Angle in radians.
#[rustfmt::skip]
pub fn rotate_y(theta: Float) -> Transform {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let m = matrix4x4(
         cos_theta, 0.0, sin_theta, 0.0,
         0.0,       1.0, 0.0,       0.0,
        -sin_theta, 0.0, cos_theta, 0.0,
         0.0,       0.0, 0.0,       1.0,
    );
    Transform { m, m_inv: m.transpose() }
}

/// Create a transformation representing rotation about the z-axis.
///
/// * `theta` -  Angle in radians.
#[rustfmt::skip]
pub fn rotate_z(theta: Float) -> Transform {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let m = matrix4x4(
        cos_theta, -sin_theta, 0.0, 0.0,
        sin_theta,  cos_theta, 0.0, 0.0,
        0.0,        0.0,       1.0, 0.0,
        0.0,        0.0,       0.0, 1.0,
    );
    Transform { m, m_inv: m.transpose() }
}

/// Create a transformation representing rotation about an axis.
///
/// * `theta` - Angle in radians.
/// * `axis`  - Axis of rotation.
pub fn rotate_axis(theta: Float, axis: &Vector3f) -> Transform {
    let a = axis.normalize();
    let (sin_theta, cos_theta) = theta.sin_cos();
    let mut m = IDENTITY_MATRIX;

    // Compute rotation of first basis vector
    m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
    m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
    m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;

    // Compute rotations of second and third basis vectors
    m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
    m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
    m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;

    m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
    m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
    m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;

    Transform {
        m,
        m_inv: m.transpose(),
    }
}

/// Generate the world to camera transformation of a camera placed at `pos`
/// looking towards `look`. The camera looks down its +z axis.
///
/// `up` must not be parallel to the viewing direction.
///
/// * `pos`  - Position of camera.
/// * `look` - Position to point towards.
/// * `up`   - Used to orient the camera's viewing direction implied by `pos`
///            and `look`.
#[rustfmt::skip]
pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Transform {
    let dir = (*look - *pos).normalize();
    let right = up.normalize().cross(&dir).normalize();
    let new_up = dir.cross(&right);

    let camera_to_world = matrix4x4(
        right.x, new_up.x, dir.x, pos.x,
        right.y, new_up.y, dir.y, pos.y,
        right.z, new_up.z, dir.z, pos.z,
        0.0,     0.0,      0.0,   1.0,
    );

    Transform {
        m: camera_to_world.inverse(),
        m_inv: camera_to_world,
    }
}

impl Transform {
    /// Returns the identity transformation.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Returns the orthographic projection that maps camera space z in
    /// `[near, far]` to `[0, 1]` and leaves x and y unchanged.
    ///
    /// * `near` - Near plane.
    /// * `far`  - Far plane.
    pub fn orthographic(near: Float, far: Float) -> Transform {
        scale(1.0, 1.0, 1.0 / (far - near)) * translate(&vector3(0.0, 0.0, -near))
    }

    /// Returns the inverse transformation.
    pub fn inverse(&self) -> Transform {
        Transform {
            m: self.m_inv,
            m_inv: self.m,
        }
    }

    /// Applies transformation to a given point.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m;
        let xp = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let yp = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let zp = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let wp = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];

        debug_assert!(wp != 0.0, "Transformation<Point3f>: wp is zero");

        if wp == 1.0 {
            point3(xp, yp, zp)
        } else {
            point3(xp, yp, zp) / wp
        }
    }

    /// Applies transformation to a given vector.
    ///
    /// * `v` - The vector.
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m;
        vector3(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    /// Composes this transformation with another one. The resulting transform
    /// applies `rhs` first and then `self`.
    ///
    /// * `rhs` - The transformation to compose.
    fn mul(self, rhs: Self) -> Self {
        Transform {
            m: self.m * rhs.m,
            m_inv: rhs.m_inv * self.m_inv,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
