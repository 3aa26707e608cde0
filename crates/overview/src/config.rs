//! Configuration for pyramid generation.

use serde::{Deserialize, Serialize};

use crate::error::{OverviewError, Result};

/// Largest supported zoom level; `2^zoom` must fit the sampling step.
pub const MAX_ZOOM_LIMIT: u32 = 30;

/// Pyramid generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidConfig {
    /// Deepest zoom level to generate (levels `1..=max_zoom`).
    pub max_zoom: u32,

    /// Compute output rows on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            max_zoom: 4,
            parallel: true,
        }
    }
}

impl PyramidConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OVERVIEW_MAX_ZOOM") {
            if let Ok(zoom) = val.parse() {
                config.max_zoom = zoom;
            }
        }

        if let Ok(val) = std::env::var("OVERVIEW_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_zoom == 0 || self.max_zoom > MAX_ZOOM_LIMIT {
            return Err(OverviewError::Config(format!(
                "max_zoom must be 1-{MAX_ZOOM_LIMIT}, got {}",
                self.max_zoom
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PyramidConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.parallel);
    }

    #[test]
    fn test_zero_zoom_rejected() {
        let config = PyramidConfig {
            max_zoom: 0,
            ..PyramidConfig::default()
        };
        assert!(matches!(config.validate(), Err(OverviewError::Config(_))));
    }
}
