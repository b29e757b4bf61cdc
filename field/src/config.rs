//! Field configuration

use crate::{Error, Result};
use photosynthesis_core::common::Float;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Location and orientation of the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGeography {
    /// Latitude in degrees, positive north.
    #[serde(default = "default_latitude")]
    pub latitude: Float,

    /// Rotation of the field about the vertical axis in degrees.
    #[serde(default)]
    pub rotation: Float,

    /// Slope of the ground in degrees.
    #[serde(default)]
    pub inclination: Float,

    /// Direction of the slope in degrees.
    #[serde(default)]
    pub inclination_rotation: Float,
}

impl Default for FieldGeography {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            rotation: 0.0,
            inclination: 0.0,
            inclination_rotation: 0.0,
        }
    }
}

/// Layout of the sensor grid and render settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorParameters {
    /// Extent of the grid along x and z.
    pub size: [Float; 2],

    /// Number of sensors along x and z.
    pub count: [u32; 2],

    /// Resolution of the light ID buffers.
    #[serde(default = "default_render_size")]
    pub render_size: u32,

    /// Number of sky directions.
    #[serde(default = "default_diffuse_light_count")]
    pub diffuse_light_count: usize,
}

/// A horizontal shade panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelParameters {
    /// Centre on the ground along x and z.
    pub position: [Float; 2],

    /// Extent along x and z.
    pub size: [Float; 2],

    /// Height above the ground.
    pub height: Float,

    /// Thickness of the panel.
    #[serde(default = "default_panel_thickness")]
    pub thickness: Float,
}

/// A complete field scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldParameters {
    /// Location and orientation.
    #[serde(default)]
    pub field: FieldGeography,

    /// Sensor grid.
    pub sensors: SensorParameters,

    /// Shade panels.
    #[serde(default)]
    pub panels: Vec<PanelParameters>,
}

fn default_latitude() -> Float {
    10.0
}

fn default_render_size() -> u32 {
    1024
}

fn default_diffuse_light_count() -> usize {
    13
}

fn default_panel_thickness() -> Float {
    0.02
}

impl FieldParameters {
    /// Returns a flat, unshaded field with default settings.
    ///
    /// * `size`  - Extent of the sensor grid along x and z.
    /// * `count` - Number of sensors along x and z.
    pub fn new(size: [Float; 2], count: [u32; 2]) -> Self {
        Self {
            field: FieldGeography::default(),
            sensors: SensorParameters {
                size,
                count,
                render_size: default_render_size(),
                diffuse_light_count: default_diffuse_light_count(),
            },
            panels: vec![],
        }
    }

    /// Parses and validates a JSON field description.
    ///
    /// * `json` - The JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let parameters: Self = serde_json::from_str(json)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Reads, parses and validates a JSON field file.
    ///
    /// * `path` - Path to the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns the diagonal of the sensor grid.
    pub fn diameter(&self) -> Float {
        self.sensors.size[0].hypot(self.sensors.size[1])
    }

    /// Checks that the field can be built.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sensors;
        if s.size.iter().any(|v| !(*v > 0.0)) {
            return Err(invalid(format!("sensor area {:?} must be positive", s.size)));
        }
        if s.count.iter().any(|n| *n == 0) {
            return Err(invalid(format!("sensor count {:?} must be positive", s.count)));
        }
        if s.render_size == 0 {
            return Err(invalid("render size must be positive".to_owned()));
        }
        if !(-90.0..=90.0).contains(&self.field.latitude) {
            return Err(invalid(format!("latitude {} out of range", self.field.latitude)));
        }
        for p in self.panels.iter() {
            if p.size.iter().any(|v| !(*v > 0.0)) || p.thickness < 0.0 {
                return Err(invalid(format!("panel at {:?} has no extent", p.position)));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfiguration(message)
}
