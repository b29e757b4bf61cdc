//! Triangle rasterisation

use super::surface::Surface;
use crate::camera::OrthographicProjection;
use crate::common::{Float, INFINITY};
use crate::geometry::{Point3f, Triangle};
use crate::scene::{Color, Scene, Side};

/// Draws every visible object of `scene` into `surface`.
///
/// Pixels are sampled at their centres without anti-aliasing. The nearest
/// surface along the light direction wins. Lit materials are drawn with
/// their base colour since there are no scene lights in this pass.
///
/// * `scene`      - The scene.
/// * `projection` - Camera projection matching the surface size.
/// * `surface`    - Render target.
pub(super) fn rasterize(
    scene: &dyn Scene,
    projection: &OrthographicProjection,
    surface: &mut Surface,
) {
    surface.fill(scene.background().to_rgba());

    let mut depth = DepthBuffer::new(surface.width, surface.height);
    scene.visit_visible(&mut |object| {
        let material = object.material();
        object.for_each_triangle(&mut |triangle, instance_color| {
            let color = match instance_color {
                Some(c) if material.instance_colors => c,
                _ => material.color,
            };
            draw_triangle(triangle, projection, material.side, color, surface, &mut depth);
        });
    });
}

/// Per pixel depth of the nearest surface drawn so far.
struct DepthBuffer {
    width: usize,
    depth: Vec<Float>,
}

impl DepthBuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            depth: vec![INFINITY; width as usize * height as usize],
        }
    }

    /// Stores `z` at `(x, y)` and returns true if it is nearer than the
    /// stored depth.
    fn test_and_set(&mut self, x: u32, y: u32, z: Float) -> bool {
        let d = &mut self.depth[y as usize * self.width + x as usize];
        if z < *d {
            *d = z;
            true
        } else {
            false
        }
    }
}

/// Twice the signed area of `(a, b, c)` in the xy-plane; positive when
/// counter-clockwise.
fn edge(a: &Point3f, b: &Point3f, cx: Float, cy: Float) -> Float {
    (b.x - a.x) * (cy - a.y) - (b.y - a.y) * (cx - a.x)
}

/// Returns true if samples lying exactly on the edge `a -> b` of a
/// counter-clockwise triangle belong to it. Of two triangles sharing an
/// edge exactly one owns it.
fn owns_edge(a: &Point3f, b: &Point3f) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dy > 0.0 || (dy == 0.0 && dx < 0.0)
}

fn draw_triangle(
    triangle: &Triangle,
    projection: &OrthographicProjection,
    side: Side,
    color: Color,
    surface: &mut Surface,
    depth: &mut DepthBuffer,
) {
    let mut p = triangle.p.map(|v| projection.to_raster(&v));

    // The camera looks down +z, so a face whose normal points back at the
    // light winds clockwise in raster space.
    let area = edge(&p[0], &p[1], p[2].x, p[2].y);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    if area > 0.0 && side == Side::Front {
        return;
    }
    if area < 0.0 {
        p.swap(1, 2);
    }
    let area = area.abs();

    let width = surface.width as Float;
    let height = surface.height as Float;
    let x_min = p.iter().map(|v| v.x).fold(INFINITY, Float::min).floor().max(0.0);
    let y_min = p.iter().map(|v| v.y).fold(INFINITY, Float::min).floor().max(0.0);
    let x_max = p.iter().map(|v| v.x).fold(-INFINITY, Float::max).ceil().min(width);
    let y_max = p.iter().map(|v| v.y).fold(-INFINITY, Float::max).ceil().min(height);
    if x_min >= x_max || y_min >= y_max {
        return;
    }

    let owns = [owns_edge(&p[1], &p[2]), owns_edge(&p[2], &p[0]), owns_edge(&p[0], &p[1])];
    let texel = color.to_rgba();

    for y in y_min as u32..y_max as u32 {
        let cy = y as Float + 0.5;
        for x in x_min as u32..x_max as u32 {
            let cx = x as Float + 0.5;
            let w = [
                edge(&p[1], &p[2], cx, cy),
                edge(&p[2], &p[0], cx, cy),
                edge(&p[0], &p[1], cx, cy),
            ];
            let inside = w
                .iter()
                .zip(owns.iter())
                .all(|(&wi, &owned)| wi > 0.0 || (wi == 0.0 && owned));
            if !inside {
                continue;
            }

            let z = (w[0] * p[0].z + w[1] * p[1].z + w[2] * p[2].z) / area;
            if !(0.0..=1.0).contains(&z) {
                continue;
            }
            if depth.test_and_set(x, y, z) {
                surface.write(x, y, texel);
            }
        }
    }
}
