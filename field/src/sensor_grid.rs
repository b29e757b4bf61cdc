//! Sensor grid

use crate::geometry::Geometry;
use crate::Result;
use photosynthesis_core::common::Float;
use photosynthesis_core::geometry::*;
use photosynthesis_core::gpu::Device;
use photosynthesis_core::id::ObjectId;
use photosynthesis_core::scene::*;
use photosynthesis_core::Photosynthesis;

/// Display colour of the sensors.
const SENSOR_COLOR: Color = Color::new(0.9, 0.9, 0.6);

/// One cell of the grid.
#[derive(Clone, Debug)]
struct Sensor {
    /// Tracked ID.
    id: ObjectId,

    /// ID colour painted by this instance.
    color: Color,

    /// Cell to grid transformation.
    offset: Transform,
}

/// A horizontal rectangle divided into equally sized sensors, rendered as
/// one instanced object with one ID per cell.
#[derive(Clone, Debug)]
pub struct SensorGrid {
    /// Geometry of one cell centred on the origin.
    cell: Geometry,

    /// The cells, x major.
    sensors: Vec<Sensor>,

    /// Display names of the cells.
    names: Vec<String>,

    /// Grid to world transformation.
    transform: Transform,

    /// Current material.
    material: ArcMaterial,

    /// Material painting the instance colours.
    id_material: ArcMaterial,
}

impl SensorGrid {
    /// Returns a new grid centred on the origin, issuing one ID per cell.
    ///
    /// * `engine`    - Engine issuing the IDs.
    /// * `count`     - Number of cells along x and z.
    /// * `size`      - Extent of the grid along x and z.
    /// * `transform` - Grid to world transformation.
    pub fn new<D: Device>(
        engine: &mut Photosynthesis<D>,
        count: [u32; 2],
        size: [Float; 2],
        transform: Transform,
    ) -> Result<Self> {
        let [nx, ny] = count;
        let dx = size[0] / nx as Float;
        let dy = size[1] / ny as Float;

        let mut sensors = Vec::with_capacity((nx * ny) as usize);
        let mut names = Vec::with_capacity(sensors.capacity());
        for i in 0..nx {
            let x = dx * (i as Float + 0.5 - 0.5 * nx as Float);
            for j in 0..ny {
                let y = dy * (j as Float + 0.5 - 0.5 * ny as Float);

                let id = engine.next_id()?;
                sensors.push(Sensor {
                    id,
                    color: engine.color_for(Some(id)),
                    offset: translate(&vector3(x, 0.0, y)),
                });
                names.push(format!("S{id} {x:.6}|{y:.6}"));
            }
        }
        debug!("Sensor grid with {} cells", sensors.len());

        Ok(Self {
            cell: Geometry::plane(dx, dy),
            sensors,
            names,
            transform,
            material: Material::basic("sensors", SENSOR_COLOR)
                .with_side(Side::Double)
                .into_arc(),
            id_material: Material::basic("sensor ids", Color::WHITE)
                .with_side(Side::Double)
                .with_instance_colors()
                .into_arc(),
        })
    }

    /// Returns the display names of the cells, x major.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the IDs of the cells, x major.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.sensors.iter().map(|s| s.id).collect()
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns true if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Returns the area of one cell.
    pub fn cell_area(&self) -> Float {
        self.cell.area()
    }
}

impl Renderable for SensorGrid {
    fn tracked_ids(&self) -> Vec<ObjectId> {
        self.ids()
    }

    fn material(&self) -> ArcMaterial {
        ArcMaterial::clone(&self.material)
    }

    fn set_material(&mut self, material: ArcMaterial) {
        self.material = material;
    }

    fn id_material(&self) -> Option<ArcMaterial> {
        Some(ArcMaterial::clone(&self.id_material))
    }

    fn for_each_triangle(&self, visitor: &mut dyn FnMut(&Triangle, Option<Color>)) {
        for sensor in self.sensors.iter() {
            let t = self.transform * sensor.offset;
            for triangle in self.cell.triangles.iter() {
                visitor(&triangle.transform(&t), Some(sensor.color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use photosynthesis_core::gpu::SoftwareDevice;
    use photosynthesis_core::id::encode_id;

    #[test]
    fn cells_get_consecutive_ids_and_names() {
        let mut engine = Photosynthesis::new(SoftwareDevice::new()).unwrap();
        let grid = SensorGrid::new(&mut engine, [2, 3], [4.0, 3.0], Transform::identity()).unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(engine.id_count(), 6);
        assert!(approx_eq!(Float, grid.cell_area(), 2.0, ulps = 2));
        assert_eq!(grid.ids(), (1..=6).map(ObjectId::new).collect::<Vec<_>>());
        assert_eq!(grid.names()[0], "S1 -1.000000|-1.000000");
        assert_eq!(grid.names()[1], "S2 -1.000000|0.000000");
        assert_eq!(grid.names()[5], "S6 1.000000|1.000000");
    }

    #[test]
    fn instances_paint_their_id_colors() {
        let mut engine = Photosynthesis::new(SoftwareDevice::new()).unwrap();
        let transform = translate(&vector3(0.0, 0.1, 0.0));
        let grid = SensorGrid::new(&mut engine, [2, 1], [2.0, 1.0], transform).unwrap();

        let mut seen = vec![];
        grid.for_each_triangle(&mut |t, color| {
            assert!(t.p.iter().all(|p| approx_eq!(Float, p.y, 0.1)));
            seen.push(color);
        });
        let first = Some(encode_id(ObjectId::new(1)));
        let second = Some(encode_id(ObjectId::new(2)));
        assert_eq!(seen, vec![first, first, second, second]);

        let id_material = grid.id_material().unwrap();
        assert!(id_material.instance_colors);
        assert_eq!(id_material.side, Side::Double);
        assert_eq!(grid.photosynthesis_id(), None);
    }
}
