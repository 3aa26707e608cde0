//! GeoZarr datasets on Zarr V3
//!
//! This crate layers CF-convention metadata on a `zarrs` store:
//!
//! - **Schema building**: groups, coordinate arrays, grid-mapping records and
//!   data arrays created from a declarative [`Schema`]
//! - **Linkage**: every array lists its coordinate arrays in `_ARRAY_DIMENSIONS`,
//!   and data arrays reference their `grid_mapping` record
//! - **Sparse writes**: inserts address a slab by coordinate value instead of
//!   by offset
//!
//! # Architecture
//!
//! ```text
//! Schema (JSON / YAML)
//!      │
//!      ▼
//! GeoZarrDataset::build
//!      │
//!      ├─► grid_mapping::encode_with(crs)  ──► crs_grid attributes
//!      │
//!      └─► SchemaBuilder: /V, /V/D..., /V/crs_grid, /V/N
//!
//! GeoZarrDataset::insert(path, data, [(dimension, value), ...])
//!      │
//!      ├─► resolve_selection: value ──► offset per selected axis
//!      │
//!      └─► store_array_subset_elements
//! ```
//!
//! # Example
//!
//! ```ignore
//! use geozarr::{selector, GeoZarrDataset, OpenMode, Schema};
//!
//! let dataset = GeoZarrDataset::new(store, OpenMode::Create);
//! dataset.build(&Schema::from_json(&text)?)?;
//! dataset.set_index("/swe/time", &timestamps)?;
//!
//! dataset
//!     .insert("/swe/SWE", plane, vec![selector("/swe/time", timestamps[2])])
//!     .await?;
//! ```

pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod factory;
pub mod index;
pub mod schema;
pub mod types;

// Re-export commonly used types at crate root
pub use builder::{BuildPlan, SchemaBuilder, ARRAY_DIMENSIONS, GRID_MAPPING};
pub use config::{DatasetConfig, ZarrCompression};
pub use dataset::{
    selector, CoordinateLink, GeoZarrDataset, GridMappingLink, Linkage, OpenMode, Selector,
};
pub use error::{GeoZarrError, Result};
pub use factory::GeoZarrFactory;
pub use index::{read_coordinates, resolve_selection, AxisSelection, CoordinateValues, Selection};
pub use schema::{array_path, group_path, DimensionSpec, Grid, Schema, Variable, CRS_GRID};
pub use types::{DimensionKind, ElementType, IndexValue};

pub use grid_mapping::{GeodesyService, GridMapping, WktGeodesy};
