//! Errors

use thiserror::Error;

/// Errors raised while loading or calculating a field.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] photosynthesis_core::Error),

    #[error("unable to read field file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid field file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid field configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type of field operations.
pub type Result<T> = std::result::Result<T, Error>;
