//! Overview tiles for raster pyramids
//!
//! Derives coarser zoom levels from a `(height, width, bands)` raster by
//! averaging the non-zero samples of a 2x2 neighbourhood per output pixel.
//!
//! # Example
//!
//! ```
//! use ndarray::Array3;
//! use overview::{create_overview, downsample, RasterType};
//!
//! let tile = Array3::<u8>::from_elem((256, 256, 3), 7);
//! let half = downsample(tile.view(), 1).unwrap();
//! assert_eq!(half.dim(), (128, 128, 3));
//!
//! let bytes = vec![0u8; 64 * 64 * 3];
//! let quarter = create_overview(&[64, 64, 3], RasterType::U8, &bytes, 2).unwrap();
//! assert_eq!(quarter.shape, [16, 16, 3]);
//! ```

pub mod config;
pub mod downsample;
pub mod error;
pub mod pyramid;
pub mod raster;
pub mod sample;

pub use config::PyramidConfig;
pub use downsample::{downsample, downsample_with, zoom_geometry};
pub use error::{OverviewError, Result};
pub use pyramid::{generate_pyramid, PyramidLevel};
pub use raster::{create_overview, create_overview_with, Overview};
pub use sample::{RasterType, Sample};
