//! A single square on the ground for light tests

use photosynthesis_core::common::Float;
use photosynthesis_core::geometry::*;
use photosynthesis_core::gpu::SoftwareDevice;
use photosynthesis_core::id::ObjectId;
use photosynthesis_core::scene::*;
use photosynthesis_core::Photosynthesis;

pub(crate) struct Plane {
    id: ObjectId,
    material: ArcMaterial,
    triangles: [Triangle; 2],
}

impl Renderable for Plane {
    fn photosynthesis_id(&self) -> Option<ObjectId> {
        Some(self.id)
    }

    fn material(&self) -> ArcMaterial {
        ArcMaterial::clone(&self.material)
    }

    fn set_material(&mut self, material: ArcMaterial) {
        self.material = material;
    }

    fn for_each_triangle(&self, visitor: &mut dyn FnMut(&Triangle, Option<Color>)) {
        for t in self.triangles.iter() {
            visitor(t, None);
        }
    }
}

pub(crate) struct PlaneScene {
    planes: Vec<Plane>,
    background: Color,
}

impl Scene for PlaneScene {
    fn background(&self) -> Color {
        self.background
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn visit_visible(&self, visitor: &mut dyn FnMut(&dyn Renderable)) {
        for p in self.planes.iter() {
            visitor(p);
        }
    }

    fn visit_visible_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn Renderable)) {
        for p in self.planes.iter_mut() {
            visitor(p);
        }
    }
}

/// Returns an engine on the reference device and a horizontal 1x1 square
/// centred on the origin.
pub(crate) fn unit_plane() -> (Photosynthesis<SoftwareDevice>, PlaneScene, ObjectId) {
    let mut engine = Photosynthesis::new(SoftwareDevice::new()).unwrap();
    let id = engine.next_id().unwrap();

    let h: Float = 0.5;
    let a = point3(-h, 0.0, -h);
    let b = point3(-h, 0.0, h);
    let c = point3(h, 0.0, h);
    let d = point3(h, 0.0, -h);

    let plane = Plane {
        id,
        material: Material::basic("plane", Color::WHITE).into_arc(),
        triangles: [Triangle::new(a, b, c), Triangle::new(a, c, d)],
    };
    let scene = PlaneScene {
        planes: vec![plane],
        background: Color::BLACK,
    };
    (engine, scene, id)
}
