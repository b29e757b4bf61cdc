//! Field scene

use crate::mesh::Mesh;
use crate::sensor_grid::SensorGrid;
use photosynthesis_core::scene::*;

/// Ground, sensors and shade panels of one field.
#[derive(Clone, Debug)]
pub struct FieldScene {
    /// The ground; untracked.
    pub ground: Mesh,

    /// The sensors, if a field is loaded.
    pub sensors: Option<SensorGrid>,

    /// Shade panels; untracked.
    pub panels: Vec<Mesh>,

    /// Background colour.
    background: Color,
}

impl FieldScene {
    /// Returns a scene with only the given ground.
    ///
    /// * `ground` - The ground.
    pub fn new(ground: Mesh) -> Self {
        Self {
            ground,
            sensors: None,
            panels: vec![],
            background: Color::new(0.9, 0.9, 0.9),
        }
    }
}

impl Scene for FieldScene {
    fn background(&self) -> Color {
        self.background
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn visit_visible(&self, visitor: &mut dyn FnMut(&dyn Renderable)) {
        visitor(&self.ground);
        if let Some(sensors) = self.sensors.as_ref() {
            visitor(sensors);
        }
        for panel in self.panels.iter() {
            visitor(panel);
        }
    }

    fn visit_visible_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn Renderable)) {
        visitor(&mut self.ground);
        if let Some(sensors) = self.sensors.as_mut() {
            visitor(sensors);
        }
        for panel in self.panels.iter_mut() {
            visitor(panel);
        }
    }
}
