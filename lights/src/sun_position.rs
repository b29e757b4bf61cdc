//! Astronomical sun position

use photosynthesis_core::common::{Float, Timestamp};
use photosynthesis_core::geometry::*;
use std::f64::consts::PI;

/// Length of a sidereal day in seconds (23h 56m 4.1s).
pub const SIDEREAL_DAY: Timestamp = ((23 * 60 + 56) * 60) as Timestamp + 4.1;

/// Solar days per tropical year.
pub const DAYS_PER_YEAR: Timestamp = 365.242199;

/// Obliquity of the ecliptic in degrees.
pub const AXIAL_TILT: Timestamp = 23.4392811;

/// Seconds per solar day.
pub const SECONDS_PER_DAY: Timestamp = 24.0 * 60.0 * 60.0;

/// Direction of the sun at a point on earth.
///
/// The local frame has +y pointing up and the sun travelling from east to
/// west through the sky. Time is counted in seconds since midnight of the
/// 21st of December.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SunPosition {
    /// Rotation from the pole to the latitude in radians.
    latitude_rotation: Timestamp,

    /// Seconds since the 21st of December at midnight.
    seconds: Timestamp,
}

impl SunPosition {
    /// Returns the sun at midnight of the 21st of December.
    ///
    /// * `latitude` - Latitude in degrees, positive north.
    pub fn new(latitude: Timestamp) -> Self {
        let mut sun = Self {
            latitude_rotation: 0.0,
            seconds: 0.0,
        };
        sun.set_latitude(latitude);
        sun
    }

    /// Sets the latitude.
    ///
    /// * `latitude` - Latitude in degrees, positive north.
    pub fn set_latitude(&mut self, latitude: Timestamp) {
        self.latitude_rotation = (90.0 - latitude).to_radians();
    }

    /// Returns the latitude in degrees.
    pub fn latitude(&self) -> Timestamp {
        90.0 - self.latitude_rotation.to_degrees()
    }

    /// Sets the time.
    ///
    /// * `seconds` - Seconds since the 21st of December at midnight.
    pub fn set_seconds(&mut self, seconds: Timestamp) {
        self.seconds = seconds;
    }

    /// Returns the time in seconds since the 21st of December at midnight.
    pub fn seconds(&self) -> Timestamp {
        self.seconds
    }

    /// Returns the rotation from the sun frame, where the sun lies along -x,
    /// to the local frame.
    pub fn rotation(&self) -> Transform {
        let in_day = (self.seconds - 0.5 * SECONDS_PER_DAY) / SIDEREAL_DAY;
        let day = 2.0 * PI * in_day;
        let year = 2.0 * PI * in_day / DAYS_PER_YEAR;

        rotate_z(-self.latitude_rotation as Float)
            * rotate_y(-day.rem_euclid(2.0 * PI) as Float)
            * rotate_z(AXIAL_TILT.to_radians() as Float)
            * rotate_y(year.rem_euclid(2.0 * PI) as Float)
    }

    /// Returns the unit vector pointing from the ground to the sun.
    pub fn direction(&self) -> Vector3f {
        self.rotation()
            .transform_vector(&vector3(-1.0, 0.0, 0.0))
            .normalize()
    }
}
