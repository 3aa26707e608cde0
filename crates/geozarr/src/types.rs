//! Element types, dimension kinds and index values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zarrs::array::{DataType, FillValue};

use crate::error::{GeoZarrError, Result};

/// Element type of a data or coordinate array.
///
/// `DateTime64Ns` is stored as `int64` nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    DateTime64Ns,
}

impl ElementType {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::DateTime64Ns => "datetime64[ns]",
        }
    }

    /// Zarr data type used to store this element type.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool => DataType::Bool,
            Self::Int8 => DataType::Int8,
            Self::Int16 => DataType::Int16,
            Self::Int32 => DataType::Int32,
            Self::Int64 | Self::DateTime64Ns => DataType::Int64,
            Self::UInt8 => DataType::UInt8,
            Self::UInt16 => DataType::UInt16,
            Self::UInt32 => DataType::UInt32,
            Self::UInt64 => DataType::UInt64,
            Self::Float32 => DataType::Float32,
            Self::Float64 => DataType::Float64,
        }
    }

    /// Element type for a stored Zarr data type, if supported.
    ///
    /// `int64` maps to [`ElementType::Int64`]; timestamps are not distinguishable
    /// from plain integers once stored.
    pub fn from_data_type(data_type: &DataType) -> Option<Self> {
        Some(match data_type {
            DataType::Bool => Self::Bool,
            DataType::Int8 => Self::Int8,
            DataType::Int16 => Self::Int16,
            DataType::Int32 => Self::Int32,
            DataType::Int64 => Self::Int64,
            DataType::UInt8 => Self::UInt8,
            DataType::UInt16 => Self::UInt16,
            DataType::UInt32 => Self::UInt32,
            DataType::UInt64 => Self::UInt64,
            DataType::Float32 => Self::Float32,
            DataType::Float64 => Self::Float64,
            _ => return None,
        })
    }

    /// Fill value: NaN for floats, zero for integers and timestamps, false for bool.
    pub fn fill_value(&self) -> FillValue {
        match self {
            Self::Bool => FillValue::from(false),
            Self::Int8 => FillValue::from(0i8),
            Self::Int16 => FillValue::from(0i16),
            Self::Int32 => FillValue::from(0i32),
            Self::Int64 | Self::DateTime64Ns => FillValue::from(0i64),
            Self::UInt8 => FillValue::from(0u8),
            Self::UInt16 => FillValue::from(0u16),
            Self::UInt32 => FillValue::from(0u32),
            Self::UInt64 => FillValue::from(0u64),
            Self::Float32 => FillValue::from(f32::NAN),
            Self::Float64 => FillValue::from(f64::NAN),
        }
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::DateTime64Ns => 8,
        }
    }
}

impl FromStr for ElementType {
    type Err = GeoZarrError;

    /// Accepts canonical names and numpy-style spellings (`<f8`, `<M8[ns]`, `float`, ...).
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_start_matches(['<', '>', '=', '|']);
        Ok(match name.to_ascii_lowercase().as_str() {
            "bool" | "b1" | "?" => Self::Bool,
            "int8" | "i1" => Self::Int8,
            "int16" | "i2" => Self::Int16,
            "int32" | "i4" => Self::Int32,
            "int64" | "i8" | "int" => Self::Int64,
            "uint8" | "u1" => Self::UInt8,
            "uint16" | "u2" => Self::UInt16,
            "uint32" | "u4" => Self::UInt32,
            "uint64" | "u8" => Self::UInt64,
            "float32" | "f4" => Self::Float32,
            "float64" | "f8" | "float" | "double" => Self::Float64,
            "datetime64[ns]" | "m8[ns]" => Self::DateTime64Ns,
            _ => {
                return Err(GeoZarrError::invalid_schema(format!(
                    "unsupported dtype '{s}'"
                )))
            }
        })
    }
}

impl TryFrom<String> for ElementType {
    type Error = GeoZarrError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(value: ElementType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a dimension's coordinate array is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionKind {
    /// Values supplied after creation through `set_index`.
    DimensionValue,
    /// Generated from the grid X origin.
    CoordinateX,
    /// Generated from the grid Y origin.
    CoordinateY,
    /// Vertical axis; left as a placeholder.
    CoordinateZ,
}

/// A value used to select a position along a coordinate array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

impl IndexValue {
    /// Integral value, including timestamps as epoch nanoseconds and integral floats.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Int(v) => Some(i128::from(v)),
            Self::UInt(v) => Some(i128::from(v)),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 1e38 => Some(v as i128),
            Self::Timestamp(t) => t.timestamp_nanos_opt().map(i128::from),
            Self::Float(_) | Self::Bool(_) => None,
        }
    }

    /// Floating-point value of any numeric selector.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Timestamp(t) => t.timestamp_nanos_opt().map(|n| n as f64),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

macro_rules! index_value_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for IndexValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

index_value_from!(
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
);

impl From<DateTime<Utc>> for IndexValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_numpy_aliases() {
        assert_eq!("<f8".parse::<ElementType>().unwrap(), ElementType::Float64);
        assert_eq!("<M8[ns]".parse::<ElementType>().unwrap(), ElementType::DateTime64Ns);
        assert_eq!("datetime64[ns]".parse::<ElementType>().unwrap(), ElementType::DateTime64Ns);
        assert_eq!("|u1".parse::<ElementType>().unwrap(), ElementType::UInt8);
        assert_eq!("float32".parse::<ElementType>().unwrap(), ElementType::Float32);
        assert!("complex128".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_datetime_is_stored_as_int64() {
        assert_eq!(ElementType::DateTime64Ns.data_type(), DataType::Int64);
        assert_eq!(ElementType::from_data_type(&DataType::Int64), Some(ElementType::Int64));
        assert_eq!(ElementType::DateTime64Ns.size(), 8);
    }

    #[test]
    fn test_element_type_serde() {
        let t: ElementType = serde_json::from_str("\"<i4\"").unwrap();
        assert_eq!(t, ElementType::Int32);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"int32\"");
    }

    #[test]
    fn test_dimension_kind_names() {
        let kind: DimensionKind = serde_json::from_str("\"COORDINATE_X\"").unwrap();
        assert_eq!(kind, DimensionKind::CoordinateX);
        let kind: DimensionKind = serde_json::from_str("\"DIMENSION_VALUE\"").unwrap();
        assert_eq!(kind, DimensionKind::DimensionValue);
    }

    #[test]
    fn test_index_value_conversions() {
        assert_eq!(IndexValue::from(3u8).as_i128(), Some(3));
        assert_eq!(IndexValue::from(2.0f64).as_i128(), Some(2));
        assert_eq!(IndexValue::from(2.5f64).as_i128(), None);
        assert_eq!(IndexValue::from(true).as_f64(), None);

        let t = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let nanos = t.timestamp_nanos_opt().unwrap();
        assert_eq!(IndexValue::from(t).as_i128(), Some(i128::from(nanos)));
        assert_eq!(IndexValue::from(t).to_string(), "2024-01-15T12:00:00+00:00");
    }
}
