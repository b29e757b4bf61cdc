//! Errors

use crate::gpu::TextureHandle;

/// Errors reported by the light accumulation engine and its devices.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// More objects were registered than the ID colour encoding can represent.
    #[error("object ID {id} exceeds the largest encodable ID {max}")]
    CapacityExceeded { id: u32, max: u32 },

    /// The rendering context was lost and its resources are gone.
    #[error("rendering context lost")]
    ContextLost,

    /// A texture handle does not name a live texture on this device.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),

    /// A texture dimension exceeds the device limit.
    #[error("texture of {width}x{height} exceeds the maximum size {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    /// A pass reads from the texture it renders into.
    #[error("texture {0:?} is both read and written by one pass")]
    FeedbackLoop(TextureHandle),

    /// The target cannot be used for the requested operation.
    #[error("invalid render target: {0}")]
    InvalidTarget(String),

    /// The device cannot render to any data format precise enough.
    #[error("no floating point render target format is supported")]
    UnsupportedFormat,

    /// Driver or worker failure.
    #[error("device error: {0}")]
    Device(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
