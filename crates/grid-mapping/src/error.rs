//! Error types for CRS resolution and grid-mapping encoding.

use thiserror::Error;

/// Longest slice of a CRS input echoed back in error messages.
const MAX_ECHO_LEN: usize = 64;

/// Errors that can occur while resolving a CRS.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridMappingError {
    /// The CRS specification could not be resolved by the geodesy service.
    #[error("invalid CRS '{input}': {reason}")]
    InvalidCrs { input: String, reason: String },
}

impl GridMappingError {
    /// Create an InvalidCrs error, abbreviating long WKT inputs.
    pub fn invalid_crs(input: impl AsRef<str>, reason: impl Into<String>) -> Self {
        Self::InvalidCrs {
            input: abbreviate(input.as_ref()),
            reason: reason.into(),
        }
    }
}

fn abbreviate(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() <= MAX_ECHO_LEN {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(MAX_ECHO_LEN).collect();
    format!("{head}...")
}

/// Result type for grid-mapping operations.
pub type Result<T> = std::result::Result<T, GridMappingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_input_is_abbreviated() {
        let wkt = format!("PROJCS[\"{}\"]", "x".repeat(200));
        let err = GridMappingError::invalid_crs(&wkt, "boom");
        let GridMappingError::InvalidCrs { input, .. } = err;
        assert!(input.ends_with("..."));
        assert_eq!(input.chars().count(), MAX_ECHO_LEN + 3);
    }

    #[test]
    fn test_message_names_input() {
        let err = GridMappingError::invalid_crs("EPSG:99999", "unknown EPSG code");
        assert_eq!(err.to_string(), "invalid CRS 'EPSG:99999': unknown EPSG code");
    }
}
