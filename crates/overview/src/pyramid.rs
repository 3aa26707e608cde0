//! Overview pyramids.

use ndarray::{Array3, ArrayView3};
use tracing::{debug, info};

use crate::config::PyramidConfig;
use crate::downsample::{downsample_with, zoom_geometry};
use crate::error::Result;
use crate::sample::Sample;

/// One overview level.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidLevel<T> {
    /// Zoom level (1 = half resolution).
    pub zoom: u32,
    /// Scale factor relative to native (2, 4, 8, ...).
    pub scale: usize,
    pub image: Array3<T>,
}

/// Generate overview levels `1..=config.max_zoom` from the native image.
///
/// Every level samples the native image directly. Generation stops at the
/// first level that would have a zero dimension.
pub fn generate_pyramid<T: Sample>(
    image: ArrayView3<'_, T>,
    config: &PyramidConfig,
) -> Result<Vec<PyramidLevel<T>>> {
    config.validate()?;
    let (height, width, _) = image.dim();

    let mut levels = Vec::new();
    for zoom in 1..=config.max_zoom {
        let (step, _) = zoom_geometry(zoom)?;
        if height / step == 0 || width / step == 0 {
            debug!(zoom, height, width, "Stopping pyramid: level would be empty");
            break;
        }

        let level = downsample_with(image, zoom, config.parallel)?;
        debug!(zoom, shape = ?level.dim(), "Generated pyramid level");
        levels.push(PyramidLevel {
            zoom,
            scale: step,
            image: level,
        });
    }

    info!(
        levels = levels.len(),
        height,
        width,
        max_zoom = config.max_zoom,
        "Generated overview pyramid"
    );
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pyramid() {
        let image = Array3::<u8>::ones((16, 16, 3));
        let levels = generate_pyramid(image.view(), &PyramidConfig::default()).unwrap();

        // 8x8, 4x4, 2x2, 1x1
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0].zoom, 1);
        assert_eq!(levels[0].scale, 2);
        assert_eq!(levels[0].image.dim(), (8, 8, 3));
        assert_eq!(levels[3].scale, 16);
        assert_eq!(levels[3].image.dim(), (1, 1, 3));
    }

    #[test]
    fn test_generate_pyramid_stops_early() {
        let image = Array3::<u8>::ones((8, 32, 1));
        let config = PyramidConfig {
            max_zoom: 6,
            parallel: false,
        };
        let levels = generate_pyramid(image.view(), &config).unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[2].image.dim(), (1, 4, 1));
    }
}
