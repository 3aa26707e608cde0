//! Factory for opening GeoZarr datasets with shared settings.
//!
//! The `GeoZarrFactory` holds:
//! - The `DatasetConfig` applied to every dataset it creates
//! - A shared `GeodesyService` for CRS resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use geozarr::{GeoZarrFactory, Schema};
//!
//! let factory = GeoZarrFactory::from_env()?;
//! let dataset = factory.create(store.clone(), &Schema::from_yaml(&text)?)?;
//! dataset.insert("/swe/SWE", plane, vec![selector("/swe/time", t)]).await?;
//!
//! let reader = factory.open(store, "r")?;
//! let linkage = reader.linkage("/swe/SWE")?;
//! ```

use std::sync::Arc;

use grid_mapping::{GeodesyService, WktGeodesy};
use tracing::debug;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};

use crate::config::DatasetConfig;
use crate::dataset::{GeoZarrDataset, OpenMode};
use crate::error::Result;
use crate::schema::Schema;

/// Opens datasets that share a configuration and geodesy service.
#[derive(Clone)]
pub struct GeoZarrFactory {
    config: DatasetConfig,
    geodesy: Arc<dyn GeodesyService>,
}

impl Default for GeoZarrFactory {
    fn default() -> Self {
        Self {
            config: DatasetConfig::default(),
            geodesy: Arc::new(WktGeodesy),
        }
    }
}

impl GeoZarrFactory {
    /// Create a factory with a validated configuration.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Create a factory configured from `GEOZARR_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(DatasetConfig::from_env())
    }

    /// Replace the geodesy service.
    pub fn with_geodesy(mut self, geodesy: Arc<dyn GeodesyService>) -> Self {
        self.geodesy = geodesy;
        self
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Open a dataset in mode `r` or `x`.
    pub fn open<S: ?Sized>(&self, store: Arc<S>, mode: &str) -> Result<GeoZarrDataset<S>> {
        let mode: OpenMode = mode.parse()?;
        debug!(mode = %mode, "Opening GeoZarr dataset");
        Ok(GeoZarrDataset::with_config(store, mode, self.config.clone())
            .with_geodesy(self.geodesy.clone()))
    }

    /// Open `store` in create mode and assign `schema`.
    pub fn create<S>(&self, store: Arc<S>, schema: &Schema) -> Result<GeoZarrDataset<S>>
    where
        S: ReadableStorageTraits + WritableStorageTraits + 'static,
    {
        let dataset = self.open(store, OpenMode::Create.as_str())?;
        dataset.build(schema)?;
        Ok(dataset)
    }
}
