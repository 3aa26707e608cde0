//! Zoom-level downsampling of `(height, width, bands)` rasters.
//!
//! Each output pixel averages the 2x2 neighbourhood anchored at
//! `start + index * step` with `step = 2^zoom` and `start = 2^(zoom-1) - 1`.
//! Zero (and negative) samples carry no weight, so sparse imagery does not
//! darken towards the background.
//!
//! Only that 2x2 neighbourhood is read, even when `step > 2`: at zoom 2 and
//! deeper most of each `step x step` source block is skipped.

use ndarray::{s, Array3, ArrayView3};
use rayon::prelude::*;

use crate::error::{OverviewError, Result};
use crate::sample::Sample;

/// Sampling step and neighbourhood offset for a zoom level.
pub fn zoom_geometry(zoom: u32) -> Result<(usize, usize)> {
    if zoom == 0 {
        return Err(OverviewError::shape("zoom level must be at least 1"));
    }
    let step = 1usize
        .checked_shl(zoom)
        .ok_or_else(|| OverviewError::shape(format!("zoom level {zoom} is too deep")))?;
    Ok((step, step / 2 - 1))
}

/// Downsample on the rayon thread pool.
pub fn downsample<T: Sample>(image: ArrayView3<'_, T>, zoom: u32) -> Result<Array3<T>> {
    downsample_with(image, zoom, true)
}

/// Downsample `image` to `zoom`, optionally computing rows in parallel.
///
/// Output shape is `(height / 2^zoom, width / 2^zoom, bands)`; remainders are
/// truncated.
pub fn downsample_with<T: Sample>(
    image: ArrayView3<'_, T>,
    zoom: u32,
    parallel: bool,
) -> Result<Array3<T>> {
    let (height, width, bands) = image.dim();
    if bands == 0 {
        return Err(OverviewError::shape("raster must have at least one band"));
    }
    let (step, start) = zoom_geometry(zoom)?;
    let (out_height, out_width) = (height / step, width / step);

    let row = |r: usize| -> Vec<T> {
        let mut pixels = Vec::with_capacity(out_width * bands);
        for c in 0..out_width {
            average_neighbourhood(&image, start + r * step, start + c * step, &mut pixels);
        }
        pixels
    };

    let rows: Vec<Vec<T>> = if parallel {
        (0..out_height).into_par_iter().map(row).collect()
    } else {
        (0..out_height).map(row).collect()
    };

    Array3::from_shape_vec((out_height, out_width, bands), rows.concat())
        .map_err(|e| OverviewError::shape(e.to_string()))
}

/// Append the weighted average of the 2x2 neighbourhood at `(row, col)`.
fn average_neighbourhood<T: Sample>(
    image: &ArrayView3<'_, T>,
    row: usize,
    col: usize,
    out: &mut Vec<T>,
) {
    let (height, width, bands) = image.dim();
    let block = image.slice(s![row..(row + 2).min(height), col..(col + 2).min(width), ..]);

    // NaN anywhere poisons the maximum, as with an array max.
    let max = block.iter().fold(f64::NEG_INFINITY, |max, &v| {
        let v = v.to_f64();
        if max.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            max.max(v)
        }
    });
    if max.is_nan() || max <= 0.0 {
        out.extend(std::iter::repeat(T::ZERO).take(bands));
        return;
    }

    for band in 0..bands {
        let (sum, count) = block
            .slice(s![.., .., band])
            .iter()
            .map(|&v| v.to_f64())
            .filter(|&v| v > 0.0)
            .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            out.push(T::ZERO);
        } else {
            out.push(T::from_f64((sum / f64::from(count)).round_ties_even()));
        }
    }
}
