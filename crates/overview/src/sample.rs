//! Raster element types.

use std::fmt;
use std::str::FromStr;

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::error::OverviewError;

/// Element type of a raw raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterType {
    U8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl RasterType {
    /// Size of one sample in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::I16 => "int16",
            Self::U32 => "uint32",
            Self::I32 => "int32",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }
}

impl FromStr for RasterType {
    type Err = OverviewError;

    /// Accepts type names (`uint8`), short names (`u8`) and native-order
    /// numpy type strings (`|u1`, `<f4`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches(|c| matches!(c, '<' | '=' | '|'));
        match name.to_lowercase().as_str() {
            "uint8" | "u8" | "u1" => Ok(Self::U8),
            "uint16" | "u16" | "u2" => Ok(Self::U16),
            "int16" | "i16" | "i2" => Ok(Self::I16),
            "uint32" | "u32" | "u4" => Ok(Self::U32),
            "int32" | "i32" | "i4" => Ok(Self::I32),
            "float32" | "f32" | "f4" => Ok(Self::F32),
            "float64" | "f64" | "f8" => Ok(Self::F64),
            _ => Err(OverviewError::shape(format!("unsupported raster dtype '{s}'"))),
        }
    }
}

impl fmt::Display for RasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raster sample that can be averaged.
pub trait Sample: Pod + PartialOrd + Send + Sync + 'static {
    const TYPE: RasterType;
    const ZERO: Self;

    fn to_f64(self) -> f64;

    /// Convert an already-rounded average back; integer targets saturate.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty => $variant:ident, $zero:expr);* $(;)?) => {
        $(
            impl Sample for $ty {
                const TYPE: RasterType = RasterType::$variant;
                const ZERO: Self = $zero;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_sample! {
    u8 => U8, 0;
    u16 => U16, 0;
    i16 => I16, 0;
    u32 => U32, 0;
    i32 => I32, 0;
    f32 => F32, 0.0;
    f64 => F64, 0.0;
}
