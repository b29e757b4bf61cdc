//! Orthographic light projections

use crate::common::Float;
use crate::geometry::*;

/// Near/far planes are placed this many view sizes in front of and behind the
/// camera so that the whole scene is always inside the depth range.
const DEPTH_RANGE: Float = 10.0;

/// A parallel projection of a square region of the scene onto a square render
/// target. Light travels along the camera's +z axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrthographicProjection {
    /// World to raster transformation; x and y in pixels, z in `[0, 1]`.
    world_to_raster: Transform,

    /// Side length of the projected region in world units.
    view_size: Float,

    /// Side length of the render target in pixels.
    resolution: u32,
}

impl OrthographicProjection {
    /// Returns a new projection.
    ///
    /// * `world_to_camera` - World to camera transformation.
    /// * `view_size`       - Side length of the projected region.
    /// * `resolution`      - Side length of the render target in pixels.
    pub fn new(world_to_camera: Transform, view_size: Float, resolution: u32) -> Self {
        let half = 0.5 * view_size;
        let res = resolution as Float;
        let camera_to_ndc = scale(1.0 / half, 1.0 / half, 1.0)
            * Transform::orthographic(-DEPTH_RANGE * view_size, DEPTH_RANGE * view_size);
        let ndc_to_raster = scale(0.5 * res, 0.5 * res, 1.0) * translate(&vector3(1.0, 1.0, 0.0));
        Self {
            world_to_raster: ndc_to_raster * camera_to_ndc * world_to_camera,
            view_size,
            resolution,
        }
    }

    /// Returns a projection looking at the origin from `towards_source`, the
    /// direction pointing from the scene to the light.
    ///
    /// * `towards_source` - Direction to the light source.
    /// * `view_size`      - Side length of the projected region.
    /// * `resolution`     - Side length of the render target in pixels.
    pub fn from_direction(towards_source: &Vector3f, view_size: Float, resolution: u32) -> Self {
        let dir = towards_source.normalize();
        // Fall back to another up vector when looking straight down the y axis.
        let up = if dir.y.abs() > 0.999 {
            vector3(0.0, 0.0, 1.0)
        } else {
            vector3(0.0, 1.0, 0.0)
        };
        let eye = Point3f::from(dir);
        let world_to_camera = look_at(&eye, &zero_point3(), &up);
        Self::new(world_to_camera, view_size, resolution)
    }

    /// Returns the world area covered by one pixel.
    pub fn pixel_area(&self) -> Float {
        let side = self.view_size / self.resolution as Float;
        side * side
    }

    /// Returns the side length of the projected region.
    pub fn view_size(&self) -> Float {
        self.view_size
    }

    /// Returns the side length of the render target in pixels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Maps a world space point to raster space: x and y in pixels, z is the
    /// depth in `[0, 1]` growing away from the light.
    ///
    /// * `p` - World space point.
    pub fn to_raster(&self, p: &Point3f) -> Point3f {
        self.world_to_raster.transform_point(p)
    }
}
