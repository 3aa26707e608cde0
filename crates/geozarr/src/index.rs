//! Index resolution for partial writes.
//!
//! An insert names target positions by coordinate value. The resolver walks
//! the data array's dimension linkage in axis order and turns each axis into
//! an [`AxisSelection`]: an exact offset when a selector names the axis, the
//! full extent otherwise. The resulting [`Selection`] maps directly onto a
//! Zarr array subset.

use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs::storage::ReadableStorageTraits;

use crate::error::{GeoZarrError, Result};
use crate::types::{ElementType, IndexValue};

/// Selection along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSelection {
    /// A single position; the axis is dropped from the data shape.
    Exact(u64),
    /// The whole axis of the given extent.
    Full(u64),
}

/// Per-axis selection for a data array, in axis order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    axes: Vec<AxisSelection>,
}

impl Selection {
    pub fn new(axes: Vec<AxisSelection>) -> Self {
        Self { axes }
    }

    pub fn axes(&self) -> &[AxisSelection] {
        &self.axes
    }

    /// Shape the written data must have: full extents only, exact axes dropped.
    pub fn data_shape(&self) -> Vec<usize> {
        self.axes
            .iter()
            .filter_map(|axis| match axis {
                AxisSelection::Full(extent) => Some(*extent as usize),
                AxisSelection::Exact(_) => None,
            })
            .collect()
    }

    /// Array subset covered by the selection.
    pub fn subset(&self) -> Result<ArraySubset> {
        let (start, shape): (Vec<u64>, Vec<u64>) = self
            .axes
            .iter()
            .map(|axis| match *axis {
                AxisSelection::Exact(offset) => (offset, 1),
                AxisSelection::Full(extent) => (0, extent),
            })
            .unzip();
        ArraySubset::new_with_start_shape(start, shape).map_err(GeoZarrError::zarr_error)
    }
}

/// Materialized values of a coordinate array, widened per element family.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateValues {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
}

impl CoordinateValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::UInt(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the first element equal to `value`.
    pub fn position(&self, value: &IndexValue) -> Option<usize> {
        match self {
            Self::Bool(values) => match value {
                IndexValue::Bool(b) => values.iter().position(|v| v == b),
                _ => None,
            },
            Self::Int(values) => {
                let target = value.as_i128()?;
                values.iter().position(|&v| i128::from(v) == target)
            }
            Self::UInt(values) => {
                let target = value.as_i128()?;
                values.iter().position(|&v| i128::from(v) == target)
            }
            Self::Float(values) => {
                let target = value.as_f64()?;
                values.iter().position(|&v| v == target)
            }
        }
    }
}

/// Read a coordinate array in full.
pub fn read_coordinates<S>(array: &Array<S>) -> Result<CoordinateValues>
where
    S: ReadableStorageTraits + ?Sized + 'static,
{
    let element_type = ElementType::from_data_type(array.data_type()).ok_or_else(|| {
        GeoZarrError::zarr_error(format!(
            "unsupported coordinate data type {:?}",
            array.data_type()
        ))
    })?;
    let subset = array.subset_all();

    macro_rules! widen {
        ($ty:ty, $variant:ident, $target:ty) => {
            CoordinateValues::$variant(
                array
                    .retrieve_array_subset_elements::<$ty>(&subset)
                    .map_err(GeoZarrError::zarr_error)?
                    .into_iter()
                    .map(<$target>::from)
                    .collect(),
            )
        };
    }

    Ok(match element_type {
        ElementType::Bool => widen!(bool, Bool, bool),
        ElementType::Int8 => widen!(i8, Int, i64),
        ElementType::Int16 => widen!(i16, Int, i64),
        ElementType::Int32 => widen!(i32, Int, i64),
        ElementType::Int64 | ElementType::DateTime64Ns => widen!(i64, Int, i64),
        ElementType::UInt8 => widen!(u8, UInt, u64),
        ElementType::UInt16 => widen!(u16, UInt, u64),
        ElementType::UInt32 => widen!(u32, UInt, u64),
        ElementType::UInt64 => widen!(u64, UInt, u64),
        ElementType::Float32 => widen!(f32, Float, f64),
        ElementType::Float64 => widen!(f64, Float, f64),
    })
}

/// Resolve named selectors against a data array's dimension linkage.
///
/// `operation` names the caller in errors. `dimensions` and `shape` describe
/// the data array in axis order;
/// `lookup` materializes the coordinate array at a dimension path. Selectors
/// may come in any order; the first selector for an axis wins. Only selected
/// axes are looked up.
pub fn resolve_selection<F>(
    array: &str,
    operation: &str,
    dimensions: &[String],
    shape: &[u64],
    selectors: &[(String, IndexValue)],
    mut lookup: F,
) -> Result<Selection>
where
    F: FnMut(&str) -> Result<CoordinateValues>,
{
    if dimensions.len() != shape.len() {
        return Err(GeoZarrError::shape_mismatch(
            array,
            operation,
            format!("{} linked dimensions", shape.len()),
            format!("{} linked dimensions", dimensions.len()),
        ));
    }

    if let Some((unknown, _)) = selectors
        .iter()
        .find(|(path, _)| !dimensions.iter().any(|d| d == path))
    {
        return Err(GeoZarrError::unknown_dimension(array, operation, unknown.clone()));
    }

    let mut axes = Vec::with_capacity(dimensions.len());
    for (dimension, &extent) in dimensions.iter().zip(shape) {
        let selector = selectors.iter().find(|(path, _)| path == dimension);
        let axis = match selector {
            Some((_, value)) => {
                let coordinates = lookup(dimension)?;
                let offset = coordinates
                    .position(value)
                    .filter(|&offset| (offset as u64) < extent)
                    .ok_or_else(|| {
                        GeoZarrError::index_not_found(array, operation, dimension.clone(), value)
                    })?;
                AxisSelection::Exact(offset as u64)
            }
            None => AxisSelection::Full(extent),
        };
        axes.push(axis);
    }

    Ok(Selection::new(axes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Vec<String> {
        vec!["/swe/time".to_string(), "/swe/y".to_string(), "/swe/x".to_string()]
    }

    fn lookup(path: &str) -> Result<CoordinateValues> {
        match path {
            "/swe/time" => Ok(CoordinateValues::Int(vec![0, 3600, 7200, 10800])),
            "/swe/y" => Ok(CoordinateValues::Float(vec![200.0, 210.0, 220.0])),
            _ => panic!("unexpected lookup of {path}"),
        }
    }

    #[test]
    fn test_resolves_exact_and_full_axes() {
        let selection = resolve_selection(
            "/swe/SWE",
            "insert",
            &dims(),
            &[4, 3, 5],
            &[("/swe/time".to_string(), IndexValue::from(7200i64))],
            lookup,
        )
        .unwrap();

        assert_eq!(
            selection.axes(),
            &[AxisSelection::Exact(2), AxisSelection::Full(3), AxisSelection::Full(5)]
        );
        assert_eq!(selection.data_shape(), vec![3, 5]);

        let subset = selection.subset().unwrap();
        assert_eq!(subset.start(), &[2, 0, 0]);
        assert_eq!(subset.shape(), &[1, 3, 5]);
    }

    #[test]
    fn test_selector_order_is_irrelevant() {
        let selectors = vec![
            ("/swe/y".to_string(), IndexValue::from(220.0)),
            ("/swe/time".to_string(), IndexValue::from(0u32)),
        ];
        let selection =
            resolve_selection("/swe/SWE", "insert", &dims(), &[4, 3, 5], &selectors, lookup).unwrap();
        assert_eq!(
            selection.axes(),
            &[AxisSelection::Exact(0), AxisSelection::Exact(2), AxisSelection::Full(5)]
        );
        assert_eq!(selection.data_shape(), vec![5]);
    }

    #[test]
    fn test_no_selectors_selects_everything() {
        let selection =
            resolve_selection("/swe/SWE", "insert", &dims(), &[4, 3, 5], &[], lookup).unwrap();
        assert_eq!(selection.data_shape(), vec![4, 3, 5]);
    }

    #[test]
    fn test_missing_value() {
        let err = resolve_selection(
            "/swe/SWE",
            "insert",
            &dims(),
            &[4, 3, 5],
            &[("/swe/time".to_string(), IndexValue::from(1i64))],
            lookup,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GeoZarrError::IndexNotFound { ref array, ref operation, ref dimension, .. }
                if array == "/swe/SWE" && operation == "insert" && dimension == "/swe/time"
        ));
    }

    #[test]
    fn test_unknown_dimension() {
        let err = resolve_selection(
            "/swe/SWE",
            "insert",
            &dims(),
            &[4, 3, 5],
            &[("/other/time".to_string(), IndexValue::from(0i64))],
            lookup,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GeoZarrError::UnknownDimension { ref operation, ref dimension, .. }
                if operation == "insert" && dimension == "/other/time"
        ));
    }

    #[test]
    fn test_first_match_wins() {
        let values = CoordinateValues::Float(vec![1.0, 2.0, 2.0]);
        assert_eq!(values.position(&IndexValue::from(2.0)), Some(1));
        assert_eq!(values.position(&IndexValue::from(2i32)), Some(1));
        assert_eq!(values.position(&IndexValue::from(true)), None);
    }

    #[test]
    fn test_integer_coordinates_reject_fractional_values() {
        let values = CoordinateValues::UInt(vec![1, 2, 3]);
        assert_eq!(values.position(&IndexValue::from(3.0)), Some(2));
        assert_eq!(values.position(&IndexValue::from(2.5)), None);
        assert_eq!(values.position(&IndexValue::from(-1i64)), None);
    }
}
