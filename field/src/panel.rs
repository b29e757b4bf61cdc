//! Shade panels

use crate::config::PanelParameters;
use crate::geometry::Geometry;
use crate::mesh::Mesh;
use photosynthesis_core::geometry::*;
use photosynthesis_core::scene::*;

const PANEL_COLOR: Color = Color::new(0.35, 0.35, 0.4);

impl Mesh {
    /// Returns an untracked panel standing on a possibly sloped ground. The
    /// panel stays level regardless of the slope.
    ///
    /// * `parameters` - Position, size and height of the panel.
    /// * `ground`     - Ground to world transformation.
    /// * `slope`      - Rotation of the ground relative to level.
    pub fn panel(parameters: &PanelParameters, ground: &Transform, slope: &Transform) -> Self {
        let [x, z] = parameters.position;
        let [width, depth] = parameters.size;
        let geometry = if parameters.thickness > 0.0 {
            Geometry::cuboid(&vector3(width, parameters.thickness, depth))
        } else {
            Geometry::plane(width, depth)
        };

        let transform = *ground
            * translate(&vector3(x, 0.0, z))
            * slope.inverse()
            * translate(&vector3(0.0, parameters.height, 0.0));

        Mesh::new("panel", geometry, Material::basic("panel", PANEL_COLOR).with_side(Side::Double))
            .with_transform(transform)
    }
}
