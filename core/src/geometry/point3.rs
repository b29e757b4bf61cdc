//! 3-D Points

use super::Vector3;
use crate::common::Float;
use num_traits::{Num, Zero};
use std::ops::{Add, Div, Sub};

/// A 3-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D point containing `Float` values.
pub type Point3f = Point3<Float>;

/// Creates a new 3-D point.
///
/// * `x`: X-coordinate.
/// * `y`: Y-coordinate.
/// * `z`: Z-coordinate.
pub fn point3<T>(x: T, y: T, z: T) -> Point3<T> {
    Point3 { x, y, z }
}

/// Creates a new 3-D zero point.
pub fn zero_point3<T: Zero>() -> Point3<T> {
    point3(T::zero(), T::zero(), T::zero())
}

impl<T: Num> Add<Vector3<T>> for Point3<T> {
    type Output = Point3<T>;

    /// Offsets the point by the given vector.
    fn add(self, v: Vector3<T>) -> Self::Output {
        point3(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl<T: Num> Sub<Vector3<T>> for Point3<T> {
    type Output = Point3<T>;

    /// Offsets the point by the negated vector.
    fn sub(self, v: Vector3<T>) -> Self::Output {
        point3(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl<T: Num> Sub<Point3<T>> for Point3<T> {
    type Output = Vector3<T>;

    /// Returns the vector between two points.
    fn sub(self, p: Point3<T>) -> Self::Output {
        Vector3::new(self.x - p.x, self.y - p.y, self.z - p.z)
    }
}

impl<T: Num + Copy> Div<T> for Point3<T> {
    type Output = Point3<T>;

    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());
        point3(self.x / f, self.y / f, self.z / f)
    }
}

impl<T> From<Vector3<T>> for Point3<T> {
    fn from(v: Vector3<T>) -> Self {
        point3(v.x, v.y, v.z)
    }
}

impl<T> From<Point3<T>> for Vector3<T> {
    fn from(p: Point3<T>) -> Self {
        Vector3 {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}
