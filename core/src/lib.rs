//! Core
//!
//! GPU light accumulation: attributes the light reaching a scene from a set
//! of light sources to tracked objects and collects the results as per-object
//! time series.

#[macro_use]
extern crate log;

// Re-export.
pub mod camera;
pub mod common;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod id;
pub mod light;
pub mod photosynthesis;
pub mod scene;
pub mod summary;

pub use error::{Error, Result};
pub use photosynthesis::Photosynthesis;
