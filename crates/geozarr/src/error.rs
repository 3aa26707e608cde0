//! Error types for GeoZarr datasets.

use grid_mapping::GridMappingError;
use thiserror::Error;

/// Errors that can occur while building, writing or reading a dataset.
#[derive(Error, Debug)]
pub enum GeoZarrError {
    /// The grid CRS could not be resolved.
    #[error("{operation} of '{entity}': {source}")]
    InvalidCrs {
        entity: String,
        operation: String,
        #[source]
        source: GridMappingError,
    },

    /// The operation is not allowed in the dataset's open mode.
    #[error("cannot {operation} a dataset opened in mode '{mode}'")]
    Mode { operation: String, mode: String },

    /// Declared and supplied shapes or lengths disagree.
    #[error("{operation} on '{entity}': expected shape {expected}, got {actual}")]
    ShapeMismatch {
        entity: String,
        operation: String,
        expected: String,
        actual: String,
    },

    /// An insert selector value is absent from its coordinate array.
    #[error("{operation} on '{array}': value {value} not found in coordinate array '{dimension}'")]
    IndexNotFound {
        array: String,
        operation: String,
        dimension: String,
        value: String,
    },

    /// A selector names a path that is not a dimension of the array.
    #[error("{operation} on '{array}': '{dimension}' is not a dimension of the array")]
    UnknownDimension {
        array: String,
        operation: String,
        dimension: String,
    },

    /// The schema is malformed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Zarr format error.
    #[error("Zarr format error: {0}")]
    Zarr(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking task failed to complete.
    #[error("task error: {0}")]
    Task(String),
}

impl GeoZarrError {
    /// Create an InvalidCrs error.
    pub fn invalid_crs(
        entity: impl Into<String>,
        operation: impl Into<String>,
        source: GridMappingError,
    ) -> Self {
        Self::InvalidCrs {
            entity: entity.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a Mode error.
    pub fn mode(operation: impl Into<String>, mode: impl std::fmt::Display) -> Self {
        Self::Mode {
            operation: operation.into(),
            mode: mode.to_string(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        entity: impl Into<String>,
        operation: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            entity: entity.into(),
            operation: operation.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an IndexNotFound error.
    pub fn index_not_found(
        array: impl Into<String>,
        operation: impl Into<String>,
        dimension: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::IndexNotFound {
            array: array.into(),
            operation: operation.into(),
            dimension: dimension.into(),
            value: value.to_string(),
        }
    }

    /// Create an UnknownDimension error.
    pub fn unknown_dimension(
        array: impl Into<String>,
        operation: impl Into<String>,
        dimension: impl Into<String>,
    ) -> Self {
        Self::UnknownDimension {
            array: array.into(),
            operation: operation.into(),
            dimension: dimension.into(),
        }
    }

    /// Create an InvalidSchema error.
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    /// Create a Zarr error.
    pub fn zarr_error(msg: impl std::fmt::Display) -> Self {
        Self::Zarr(msg.to_string())
    }

    /// Create a Storage error.
    pub fn storage_error(msg: impl std::fmt::Display) -> Self {
        Self::Storage(msg.to_string())
    }
}

impl From<std::io::Error> for GeoZarrError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for GeoZarrError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSchema(err.to_string())
    }
}

impl From<serde_yaml::Error> for GeoZarrError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidSchema(err.to_string())
    }
}

/// Result type for GeoZarr operations.
pub type Result<T> = std::result::Result<T, GeoZarrError>;
