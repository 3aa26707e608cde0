//! Error types for overview generation.

use thiserror::Error;

/// Errors that can occur while building overviews.
#[derive(Error, Debug)]
pub enum OverviewError {
    /// The input raster shape, buffer or zoom level is malformed.
    #[error("invalid overview input: {0}")]
    Shape(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl OverviewError {
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}

/// Result type for overview operations.
pub type Result<T> = std::result::Result<T, OverviewError>;
