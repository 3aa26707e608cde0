//! CF Grid-Mapping Encoding
//!
//! Turns a CRS specification (nothing, an `EPSG:<code>` identifier, or a WKT
//! string) into the CF-convention grid-mapping attributes stored alongside
//! GeoZarr variables.
//!
//! # Architecture
//!
//! ```text
//! encode(crs_spec)
//!      │
//!      ├─► None: EPSG:4326 default (spatial_ref only)
//!      │
//!      └─► GeodesyService::resolve(crs_spec)
//!               │
//!               ├─► EPSG database  ──► canonical WKT
//!               ├─► WKT parser     ──► CRS tree
//!               │
//!               ▼
//!          CrsDefinition ──► GridMapping ──► attribute map
//! ```
//!
//! # Example
//!
//! ```
//! use grid_mapping::encode;
//!
//! let mapping = encode(Some("EPSG:32618")).unwrap();
//! assert_eq!(mapping.false_easting, Some(500000.0));
//! assert_eq!(mapping.longitude_of_central_meridian, Some(-75.0));
//! ```

pub mod encoder;
pub mod epsg;
pub mod error;
pub mod geodesy;
pub mod wkt;

pub use encoder::{encode, encode_with, GridMapping};
pub use error::{GridMappingError, Result};
pub use geodesy::{CrsDefinition, CrsKind, Ellipsoid, GeodesyService, OperationParameter, WktGeodesy};
