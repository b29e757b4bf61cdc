//! Object IDs and their colour encoding

mod encoding;
mod registry;

// Re-export
pub use encoding::*;
pub use registry::*;

use std::fmt;

/// Identifies one trackable surface (a sensor cell, a leaf batch, a ground
/// patch). ID 0 is reserved for the untracked background.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// The reserved background ID.
    pub const BACKGROUND: ObjectId = ObjectId(0);

    /// Wraps a raw ID value.
    ///
    /// * `id` - Raw value.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true for the reserved background ID.
    pub const fn is_background(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
