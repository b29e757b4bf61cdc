//! Field
//!
//! A rectangular field of light sensors on a possibly sloped ground, shaded
//! by panels, lit by the sun and the sky.

#[macro_use]
extern crate log;

mod config;
mod error;
mod geometry;
mod manager;
mod mesh;
mod panel;
mod scene;
mod sensor_grid;

// Re-export.
pub use config::*;
pub use error::*;
pub use geometry::*;
pub use manager::*;
pub use mesh::*;
pub use panel::*;
pub use scene::*;
pub use sensor_grid::*;
