//! Byte-buffer overview API.
//!
//! Buffers hold samples in native byte order, laid out row-major as
//! `(height, width, bands)`.

use ndarray::{Array3, ArrayView3};
use tracing::debug;

use crate::downsample::downsample_with;
use crate::error::{OverviewError, Result};
use crate::sample::{RasterType, Sample};

/// A downsampled raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    /// `(height, width, bands)`.
    pub shape: [usize; 3],
    pub dtype: RasterType,
    pub data: Vec<u8>,
}

impl Overview {
    /// Copy the samples into a typed array.
    pub fn to_array<T: Sample>(&self) -> Result<Array3<T>> {
        if T::TYPE != self.dtype {
            return Err(OverviewError::shape(format!(
                "overview holds {} samples, requested {}",
                self.dtype,
                T::TYPE
            )));
        }
        let samples: Vec<T> = bytemuck::pod_collect_to_vec(self.data.as_slice());
        let [height, width, bands] = self.shape;
        Array3::from_shape_vec((height, width, bands), samples)
            .map_err(|e| OverviewError::shape(e.to_string()))
    }
}

/// Build the zoom-level overview of a raw raster buffer.
pub fn create_overview(
    shape: &[usize],
    dtype: RasterType,
    content: &[u8],
    zoom_level: u32,
) -> Result<Overview> {
    create_overview_with(shape, dtype, content, zoom_level, true)
}

/// [`create_overview`] with explicit control over row parallelism.
pub fn create_overview_with(
    shape: &[usize],
    dtype: RasterType,
    content: &[u8],
    zoom_level: u32,
    parallel: bool,
) -> Result<Overview> {
    let &[height, width, bands] = shape else {
        return Err(OverviewError::shape(format!(
            "expected a (height, width, bands) shape, got {shape:?}"
        )));
    };
    if bands == 0 {
        return Err(OverviewError::shape("raster must have at least one band"));
    }

    let expected = height
        .checked_mul(width)
        .and_then(|n| n.checked_mul(bands))
        .and_then(|n| n.checked_mul(dtype.size()))
        .ok_or_else(|| OverviewError::shape(format!("shape {shape:?} overflows")))?;
    if content.len() != expected {
        return Err(OverviewError::shape(format!(
            "buffer of {} bytes does not match shape {shape:?} of {dtype} ({expected} bytes)",
            content.len()
        )));
    }

    let dims = (height, width, bands);
    let (data, out) = match dtype {
        RasterType::U8 => overview_bytes::<u8>(dims, content, zoom_level, parallel)?,
        RasterType::U16 => overview_bytes::<u16>(dims, content, zoom_level, parallel)?,
        RasterType::I16 => overview_bytes::<i16>(dims, content, zoom_level, parallel)?,
        RasterType::U32 => overview_bytes::<u32>(dims, content, zoom_level, parallel)?,
        RasterType::I32 => overview_bytes::<i32>(dims, content, zoom_level, parallel)?,
        RasterType::F32 => overview_bytes::<f32>(dims, content, zoom_level, parallel)?,
        RasterType::F64 => overview_bytes::<f64>(dims, content, zoom_level, parallel)?,
    };

    debug!(
        input = ?shape,
        output = ?out,
        dtype = %dtype,
        zoom = zoom_level,
        "Created overview"
    );

    Ok(Overview {
        shape: out,
        dtype,
        data,
    })
}

fn overview_bytes<T: Sample>(
    dims: (usize, usize, usize),
    content: &[u8],
    zoom: u32,
    parallel: bool,
) -> Result<(Vec<u8>, [usize; 3])> {
    let samples: Vec<T> = bytemuck::pod_collect_to_vec(content);
    let image = ArrayView3::from_shape(dims, samples.as_slice())
        .map_err(|e| OverviewError::shape(e.to_string()))?;
    let overview = downsample_with(image, zoom, parallel)?;

    let (height, width, bands) = overview.dim();
    let out: Vec<T> = overview.iter().copied().collect();
    Ok((bytemuck::cast_slice::<T, u8>(&out).to_vec(), [height, width, bands]))
}
