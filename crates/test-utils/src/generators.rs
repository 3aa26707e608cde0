//! Test data generators for creating synthetic rasters and time series.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Nanoseconds in one hour.
pub const HOUR_NS: i64 = 3_600_000_000_000;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// One plane of a time series: [`create_test_grid`] offset by `step * 1_000_000`.
///
/// Planes for different steps never share a value, so a misplaced write shows up
/// as a wrong plane rather than a plausible one.
pub fn create_time_plane(width: usize, height: usize, step: usize) -> Vec<f32> {
    let offset = (step * 1_000_000) as f32;
    create_test_grid(width, height)
        .into_iter()
        .map(|v| v + offset)
        .collect()
}

/// Hourly timestamps in nanoseconds since the Unix epoch.
///
/// # Example
///
/// ```
/// use test_utils::{hourly_timestamps, HOUR_NS};
///
/// let times = hourly_timestamps(0, 3);
/// assert_eq!(times, vec![0, HOUR_NS, 2 * HOUR_NS]);
/// ```
pub fn hourly_timestamps(start_ns: i64, count: usize) -> Vec<i64> {
    (0..count as i64).map(|i| start_ns + i * HOUR_NS).collect()
}

/// Regularly spaced coordinates `origin + unit * i`.
pub fn coordinate_sequence(origin: f64, unit: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| origin + unit * i as f64).collect()
}

/// Creates a sparse `u8` raster of shape `(height, width, bands)`.
///
/// Roughly one pixel in four carries data (values 1..=255 in every band); the
/// rest are zero background. Deterministic for a given seed.
pub fn create_sparse_raster(height: usize, width: usize, bands: usize, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(height * width * bands);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            for band in 0..bands {
                let value = if hash % 4 == 0 {
                    (((hash >> (8 * (band % 4))) % 255) + 1) as u8
                } else {
                    0
                };
                data.push(value);
            }
        }
    }
    data
}

/// Creates a dense `u8` raster of shape `(height, width, bands)` with a
/// diagonal gradient; every sample is nonzero.
pub fn create_gradient_raster(height: usize, width: usize, bands: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(height * width * bands);
    for row in 0..height {
        for col in 0..width {
            for band in 0..bands {
                data.push(((row + col + band * 16) % 255 + 1) as u8);
            }
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
        assert_eq!(grid[11], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_time_planes_are_distinct() {
        let a = create_time_plane(4, 4, 0);
        let b = create_time_plane(4, 4, 1);
        assert!(a.iter().all(|v| !b.contains(v)));
        assert_eq!(b[0], 1_000_000.0);
    }

    #[test]
    fn test_coordinate_sequence() {
        assert_eq!(
            coordinate_sequence(100.0, 10.0, 5),
            vec![100.0, 110.0, 120.0, 130.0, 140.0]
        );
    }

    #[test]
    fn test_sparse_raster_has_background() {
        let raster = create_sparse_raster(64, 64, 3, 42);
        assert_eq!(raster.len(), 64 * 64 * 3);
        let zeros = raster.iter().filter(|&&v| v == 0).count();
        assert!(zeros > raster.len() / 2);
        assert!(zeros < raster.len());
    }

    #[test]
    fn test_sparse_raster_deterministic() {
        let a = create_sparse_raster(32, 32, 1, 7);
        let b = create_sparse_raster(32, 32, 1, 7);
        assert_eq!(a, b, "Same seed should produce same data");

        let c = create_sparse_raster(32, 32, 1, 8);
        assert_ne!(a, c, "Different seed should produce different data");
    }

    #[test]
    fn test_gradient_raster_is_dense() {
        let raster = create_gradient_raster(16, 16, 3);
        assert_eq!(raster.len(), 16 * 16 * 3);
        assert!(raster.iter().all(|&v| v > 0));
    }
}
