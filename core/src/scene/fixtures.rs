//! Minimal scene content for unit tests

use super::*;
use crate::common::Float;
use crate::geometry::{point3, Point3f, Triangle};

/// A horizontal square facing +y.
#[derive(Clone, Debug)]
pub(crate) struct Quad {
    pub id: Option<ObjectId>,
    pub material: ArcMaterial,
    pub id_material: Option<ArcMaterial>,
    pub instance_color: Option<Color>,
    pub triangles: [Triangle; 2],
}

impl Quad {
    pub fn horizontal(center: Point3f, size: Float) -> Self {
        let h = 0.5 * size;
        let a = point3(center.x - h, center.y, center.z - h);
        let b = point3(center.x - h, center.y, center.z + h);
        let c = point3(center.x + h, center.y, center.z + h);
        let d = point3(center.x + h, center.y, center.z - h);
        Self {
            id: None,
            material: Material::basic("quad", Color::WHITE).into_arc(),
            id_material: None,
            instance_color: None,
            triangles: [Triangle::new(a, b, c), Triangle::new(a, c, d)],
        }
    }

    pub fn with_id(self, id: ObjectId) -> Self {
        Self { id: Some(id), ..self }
    }

    pub fn with_material(self, material: Material) -> Self {
        Self {
            material: material.into_arc(),
            ..self
        }
    }

    pub fn with_id_material(self, material: ArcMaterial) -> Self {
        Self {
            id_material: Some(material),
            ..self
        }
    }

    pub fn with_instance_color(self, color: Color) -> Self {
        Self {
            instance_color: Some(color),
            ..self
        }
    }
}

impl Renderable for Quad {
    fn photosynthesis_id(&self) -> Option<ObjectId> {
        self.id
    }

    fn material(&self) -> ArcMaterial {
        ArcMaterial::clone(&self.material)
    }

    fn set_material(&mut self, material: ArcMaterial) {
        self.material = material;
    }

    fn id_material(&self) -> Option<ArcMaterial> {
        self.id_material.clone()
    }

    fn for_each_triangle(&self, visitor: &mut dyn FnMut(&Triangle, Option<Color>)) {
        for t in self.triangles.iter() {
            visitor(t, self.instance_color);
        }
    }
}

/// A flat list of quads.
#[derive(Clone, Debug)]
pub(crate) struct TestScene {
    pub objects: Vec<Quad>,
    pub background: Color,
}

impl TestScene {
    pub fn new(objects: Vec<Quad>) -> Self {
        Self {
            objects,
            background: Color::BLACK,
        }
    }
}

impl Scene for TestScene {
    fn background(&self) -> Color {
        self.background
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn visit_visible(&self, visitor: &mut dyn FnMut(&dyn Renderable)) {
        for object in self.objects.iter() {
            visitor(object);
        }
    }

    fn visit_visible_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn Renderable)) {
        for object in self.objects.iter_mut() {
            visitor(object);
        }
    }
}

/// A single directional light sample of weight 1.
pub(crate) struct TestSun {
    pub target: crate::light::LightTarget,
    pub direction: crate::geometry::Vector3f,
    pub view_size: Float,
}

impl TestSun {
    pub fn overhead(view_size: Float, resolution: u32) -> Self {
        Self {
            target: crate::light::LightTarget::new(resolution),
            direction: crate::geometry::vector3(0.0, 1.0, 0.0),
            view_size,
        }
    }
}

impl crate::light::LightSource for TestSun {
    fn render(
        &mut self,
        device: &mut dyn crate::gpu::Device,
        scene: &dyn Scene,
        accumulator: &mut dyn crate::light::LightAccumulator,
    ) -> crate::error::Result<()> {
        self.target
            .render(device, scene, &self.direction, self.view_size, 1.0, accumulator)
    }

    fn release(&mut self, device: &mut dyn crate::gpu::Device) {
        self.target.release(device);
    }
}
