//! Lights

#[macro_use]
extern crate log;

mod diffuse;
mod sky;
mod sun_position;
mod sunlight;

// Re-export.
pub use diffuse::*;
pub use sky::*;
pub use sun_position::*;
pub use sunlight::*;

#[cfg(test)]
pub(crate) mod test_scene;
