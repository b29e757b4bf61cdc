//! Field calculations

use crate::config::FieldParameters;
use crate::geometry::Geometry;
use crate::mesh::Mesh;
use crate::scene::FieldScene;
use crate::sensor_grid::SensorGrid;
use crate::{Error, Result};
use lights::*;
use photosynthesis_core::common::{Float, Timestamp};
use photosynthesis_core::geometry::*;
use photosynthesis_core::gpu::Device;
use photosynthesis_core::id::ObjectId;
use photosynthesis_core::scene::*;
use photosynthesis_core::summary::Timestep;
use photosynthesis_core::Photosynthesis;
use std::collections::BTreeMap;

const GROUND_COLOR: Color = Color::new(0.54, 0.46, 0.23);

/// Ground extent relative to the sensor grid.
const GROUND_MARGIN: Float = 1.5;

/// Height of the sensors above the ground.
const SENSOR_HEIGHT: Float = 0.1;

/// Light on every sensor at one moment, in sensor order.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentResult {
    /// Lit area from the sun.
    pub sunlight: Vec<Float>,

    /// Lit area from the sky, normalized over all sky directions.
    pub diffuse: Vec<Float>,
}

/// Sunlight on every sensor at one time of day.
#[derive(Clone, Debug, PartialEq)]
pub struct SunlightRow {
    /// Day of the year, starting at 21 December.
    pub day: u32,

    /// Seconds since midnight.
    pub time: u32,

    /// Lit area per sensor.
    pub values: Vec<Float>,
}

/// Sky light on every sensor on one day.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffuseRow {
    /// Day of the year, starting at 21 December.
    pub day: u32,

    /// Lit area per sensor.
    pub values: Vec<Float>,
}

/// Light on every sensor over a number of days.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YearResult {
    /// One row per time step.
    pub sunlight: Vec<SunlightRow>,

    /// One row per day.
    pub diffuse: Vec<DiffuseRow>,
}

/// Seconds per calendar day.
pub const DAY_SECONDS: u32 = 24 * 60 * 60;

/// Builds a field scene from `FieldParameters` and measures the light on
/// its sensors.
pub struct FieldManager<D: Device> {
    /// The engine owning the device.
    engine: Photosynthesis<D>,

    /// Ground, sensors and panels.
    scene: FieldScene,

    /// Astronomical sun position.
    sun: SunPosition,

    /// Direct light.
    sunlight: Sunlight,

    /// Sky light following the slope of the ground.
    diffuse: DiffuseLight,

    /// Ground to world transformation.
    ground: Transform,
}

impl<D: Device> FieldManager<D> {
    /// Returns a manager with no field loaded.
    ///
    /// * `device` - The device to render with.
    pub fn new(device: D) -> Result<Self> {
        let ground = Mesh::new(
            "ground",
            Geometry::plane(1.0, 1.0),
            Material::basic("ground", GROUND_COLOR).with_side(Side::Double),
        );
        Ok(Self {
            engine: Photosynthesis::new(device)?,
            scene: FieldScene::new(ground),
            sun: SunPosition::new(10.0),
            sunlight: Sunlight::new(1.0, 1),
            diffuse: DiffuseLight::new(1, 1.0, 1),
            ground: Transform::identity(),
        })
    }

    /// Returns the engine.
    pub fn engine(&self) -> &Photosynthesis<D> {
        &self.engine
    }

    /// Returns the scene.
    pub fn scene(&self) -> &FieldScene {
        &self.scene
    }

    /// Returns the sun position.
    pub fn sun(&self) -> &SunPosition {
        &self.sun
    }

    /// Returns the sensor names in sensor order.
    pub fn sensor_names(&self) -> &[String] {
        match self.scene.sensors.as_ref() {
            Some(sensors) => sensors.names(),
            None => &[],
        }
    }

    /// Replaces the field. Every ID of the previous field is invalidated.
    ///
    /// * `parameters` - The field description.
    pub fn load_field(&mut self, parameters: &FieldParameters) -> Result<()> {
        parameters.validate()?;
        self.engine.clear()?;

        let geography = &parameters.field;
        let sensors = &parameters.sensors;
        let field_rotation = rotate_y(geography.rotation.to_radians());
        let slope_direction = geography.inclination_rotation.to_radians();
        let slope_axis = vector3(slope_direction.sin(), 0.0, -slope_direction.cos());
        let slope = rotate_axis(geography.inclination.to_radians(), &slope_axis);
        self.ground = field_rotation * slope;

        let [width, depth] = sensors.size;
        self.scene.ground.geometry = Geometry::plane(GROUND_MARGIN * width, GROUND_MARGIN * depth);
        self.scene.ground.transform = self.ground;

        let grid_transform = self.ground * translate(&vector3(0.0, SENSOR_HEIGHT, 0.0));
        self.scene.sensors = Some(SensorGrid::new(
            &mut self.engine,
            sensors.count,
            sensors.size,
            grid_transform,
        )?);

        self.scene.panels = parameters
            .panels
            .iter()
            .map(|p| Mesh::panel(p, &self.ground, &slope))
            .collect();

        let diameter = parameters.diameter();
        self.sun.set_latitude(geography.latitude as Timestamp);
        self.sunlight.set_view_size(diameter);
        self.sunlight.set_render_size(sensors.render_size);
        self.diffuse.set_count(sensors.diffuse_light_count);
        self.diffuse.set_view_size(diameter);
        self.diffuse.set_render_size(sensors.render_size);
        self.diffuse.set_orientation(self.ground);

        info!(
            "Loaded field with {} sensors and {} panels at latitude {}",
            sensors.count[0] * sensors.count[1],
            parameters.panels.len(),
            geography.latitude
        );
        Ok(())
    }

    /// Moves the sun.
    ///
    /// * `seconds` - Seconds since midnight on 21 December.
    pub fn set_seconds(&mut self, seconds: Timestamp) {
        self.sun.set_seconds(seconds);
        self.sunlight.set_direction(&self.sun.direction());
    }

    /// Returns true if the sun is below the ground plane.
    pub fn is_night(&self) -> bool {
        let up = self.ground.transform_vector(&vector3(0.0, 1.0, 0.0));
        self.sun.direction().dot(&up) < 0.0
    }

    /// Measures sunlight and sky light on every sensor at one moment.
    ///
    /// * `hour` - Hour of the day.
    /// * `day`  - Day of the year, starting at 21 December.
    pub fn calculate_moment(&mut self, hour: Timestamp, day: u32) -> Result<MomentResult> {
        let ids = self.sensor_ids()?;
        self.set_seconds(3600.0 * (24.0 * day as Timestamp + hour));

        let sunlight = if self.is_night() {
            vec![0.0; ids.len()]
        } else {
            let values = self.engine.measure(&mut self.scene, &mut [&mut self.sunlight])?;
            in_sensor_order(&ids, &values)
        };
        let values = self.engine.measure(&mut self.scene, &mut [&mut self.diffuse])?;
        let diffuse = in_sensor_order(&ids, &values);

        Ok(MomentResult { sunlight, diffuse })
    }

    /// Records the sunlight at every step of every day as a time series and
    /// measures the sky light once per day.
    ///
    /// * `step`     - Seconds between two sunlight timesteps.
    /// * `days`     - Number of days from 21 December.
    /// * `progress` - Called with the number of finished days and `days`.
    pub fn calculate_year(
        &mut self,
        step: u32,
        days: u32,
        progress: &mut dyn FnMut(u32, u32),
    ) -> Result<YearResult> {
        if step == 0 {
            return Err(Error::InvalidConfiguration("time step must be positive".to_owned()));
        }
        let ids = self.sensor_ids()?;
        self.engine.flush()?;
        self.engine.clear_timesteps();

        let mut result = YearResult::default();
        for day in 0..days {
            for time in (0..DAY_SECONDS).step_by(step as usize) {
                let seconds = (day * DAY_SECONDS + time) as Timestamp;
                self.set_seconds(seconds);

                if self.is_night() {
                    self.engine.calculate(seconds, &mut self.scene, &mut [])?;
                } else {
                    self.engine
                        .calculate(seconds, &mut self.scene, &mut [&mut self.sunlight])?;
                }
            }

            let values = self.engine.measure(&mut self.scene, &mut [&mut self.diffuse])?;
            result.diffuse.push(DiffuseRow {
                day,
                values: in_sensor_order(&ids, &values),
            });

            progress(day + 1, days);
            debug!("Day {day} done");
        }

        self.engine.flush()?;
        result.sunlight = self
            .engine
            .clear_timesteps()
            .into_iter()
            .map(|(seconds, values): Timestep| {
                let seconds = seconds as u32;
                SunlightRow {
                    day: seconds / DAY_SECONDS,
                    time: seconds % DAY_SECONDS,
                    values: in_sensor_order(&ids, &values),
                }
            })
            .collect();
        Ok(result)
    }

    /// Returns the sensor IDs or an error if no field is loaded.
    fn sensor_ids(&self) -> Result<Vec<ObjectId>> {
        match self.scene.sensors.as_ref() {
            Some(sensors) => Ok(sensors.ids()),
            None => Err(Error::InvalidConfiguration("no field loaded".to_owned())),
        }
    }
}

/// Returns the values of `ids` in order; missing IDs received no light.
///
/// * `ids`    - Sensor IDs.
/// * `values` - Values per ID.
fn in_sensor_order(ids: &[ObjectId], values: &BTreeMap<ObjectId, Float>) -> Vec<Float> {
    ids.iter().map(|id| values.get(id).copied().unwrap_or(0.0)).collect()
}
