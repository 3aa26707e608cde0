//! Declarative dataset schema.
//!
//! A [`Schema`] is consumed once, at create time, by the schema builder. It
//! deserializes from the nested-mapping layout used by GeoZarr producers:
//!
//! ```text
//! {
//!   "global_attributes": { ... },            // optional, stored on the root group
//!   "grid": { "crs": ..., "upperLeft": [x, y], "unitSize": s },   // optional
//!   "<variable key>": { "name", "dtype", "shape", "chunks"?, "attributes"?, "dimensions" },
//!   ...
//! }
//! ```
//!
//! Dimensions may be written as objects or as
//! `[name, standard_name, units, dtype, kind]` tuples.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GeoZarrError, Result};
use crate::types::{DimensionKind, ElementType};

/// Create-time description of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub global_attributes: Map<String, Value>,

    /// Variables keyed by their group name.
    #[serde(flatten)]
    pub variables: BTreeMap<String, Variable>,
}

/// Regular grid description shared by all variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// `EPSG:<code>` or WKT; geographic EPSG:4326 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,

    /// Origin coordinate pair `(x, y)`.
    #[serde(rename = "upperLeft", alias = "upper_left")]
    pub upper_left: [f64; 2],

    /// Ground distance per index step.
    #[serde(rename = "unitSize", alias = "unit_size")]
    pub unit_size: f64,
}

/// A variable: one data array plus its coordinate arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Name of the data array inside the variable group.
    pub name: String,
    pub dtype: ElementType,
    pub shape: Vec<u64>,

    /// Chunk shape; a single chunk spanning `shape` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<u64>>,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// One entry per axis of `shape`, in axis order.
    pub dimensions: Vec<DimensionSpec>,
}

/// Description of one axis and its coordinate array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    pub standard_name: String,
    pub units: String,
    pub dtype: ElementType,
    pub kind: DimensionKind,
}

impl DimensionSpec {
    pub fn new(
        name: impl Into<String>,
        standard_name: impl Into<String>,
        units: impl Into<String>,
        dtype: ElementType,
        kind: DimensionKind,
    ) -> Self {
        Self {
            name: name.into(),
            standard_name: standard_name.into(),
            units: units.into(),
            dtype,
            kind,
        }
    }
}

impl Schema {
    /// Parse a schema from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a schema from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check every variable before anything is written.
    ///
    /// A schema without variables is valid and builds an empty root group.
    pub fn validate(&self) -> Result<()> {
        if let Some(grid) = &self.grid {
            if !grid.unit_size.is_finite() || grid.upper_left.iter().any(|v| !v.is_finite()) {
                return Err(GeoZarrError::invalid_schema(
                    "grid upperLeft and unitSize must be finite",
                ));
            }
        }

        for (key, variable) in &self.variables {
            variable.validate(key)?;
            if let Some(grid) = &self.grid {
                grid.check_generated_axes(key, variable)?;
            }
        }
        Ok(())
    }
}

impl Grid {
    /// Generated X/Y coordinates must be representable in the axis dtype.
    fn check_generated_axes(&self, key: &str, variable: &Variable) -> Result<()> {
        for (dim, &extent) in variable.dimensions.iter().zip(&variable.shape) {
            let origin = match dim.kind {
                DimensionKind::CoordinateX => self.upper_left[0],
                DimensionKind::CoordinateY => self.upper_left[1],
                DimensionKind::DimensionValue | DimensionKind::CoordinateZ => continue,
            };
            if dim.dtype == ElementType::Bool {
                return Err(GeoZarrError::invalid_schema(format!(
                    "grid axis '{}' of '{key}' cannot have dtype bool",
                    dim.name
                )));
            }
            let Some((min, max)) = integer_range(dim.dtype) else {
                continue;
            };
            if extent == 0 {
                continue;
            }
            let last = origin + self.unit_size * (extent - 1) as f64;
            let (low, high) = (origin.min(last), origin.max(last));
            if low < min || high > max {
                return Err(GeoZarrError::invalid_schema(format!(
                    "grid axis '{}' of '{key}' spans [{low}, {high}], outside the range of {}",
                    dim.name, dim.dtype
                )));
            }
        }
        Ok(())
    }
}

/// Representable range of an integer element type.
fn integer_range(dtype: ElementType) -> Option<(f64, f64)> {
    macro_rules! range {
        ($ty:ty) => {
            Some((<$ty>::MIN as f64, <$ty>::MAX as f64))
        };
    }
    match dtype {
        ElementType::Int8 => range!(i8),
        ElementType::Int16 => range!(i16),
        ElementType::Int32 => range!(i32),
        ElementType::Int64 | ElementType::DateTime64Ns => range!(i64),
        ElementType::UInt8 => range!(u8),
        ElementType::UInt16 => range!(u16),
        ElementType::UInt32 => range!(u32),
        ElementType::UInt64 => range!(u64),
        ElementType::Bool | ElementType::Float32 | ElementType::Float64 => None,
    }
}

impl Variable {
    fn validate(&self, key: &str) -> Result<()> {
        check_node_name("variable", key)?;
        check_node_name(&format!("data array of '{key}'"), &self.name)?;

        if self.dimensions.len() != self.shape.len() {
            return Err(GeoZarrError::shape_mismatch(
                key,
                "schema validation",
                format!("{} dimensions", self.shape.len()),
                format!("{} dimensions", self.dimensions.len()),
            ));
        }

        if let Some(chunks) = &self.chunks {
            if chunks.len() != self.shape.len() {
                return Err(GeoZarrError::shape_mismatch(
                    key,
                    "schema validation",
                    format!("chunks of rank {}", self.shape.len()),
                    format!("chunks {chunks:?}"),
                ));
            }
            if chunks.contains(&0) {
                return Err(GeoZarrError::invalid_schema(format!(
                    "variable '{key}' has a zero chunk extent"
                )));
            }
        }

        let mut seen = Vec::with_capacity(self.dimensions.len());
        for dim in &self.dimensions {
            check_node_name(&format!("dimension of '{key}'"), &dim.name)?;
            if dim.name == self.name || dim.name == CRS_GRID {
                return Err(GeoZarrError::invalid_schema(format!(
                    "dimension '{}' of '{key}' collides with another array name",
                    dim.name
                )));
            }
            if seen.contains(&dim.name.as_str()) {
                return Err(GeoZarrError::invalid_schema(format!(
                    "dimension '{}' repeated in '{key}'",
                    dim.name
                )));
            }
            seen.push(dim.name.as_str());
        }

        if self.name == CRS_GRID {
            return Err(GeoZarrError::invalid_schema(format!(
                "data array of '{key}' may not be named '{CRS_GRID}'"
            )));
        }
        Ok(())
    }

    /// Declared chunk shape, or the full shape.
    pub fn chunk_shape(&self) -> Vec<u64> {
        self.chunks.clone().unwrap_or_else(|| self.shape.clone())
    }
}

/// Name of the grid-mapping record inside each variable group.
pub const CRS_GRID: &str = "crs_grid";

fn check_node_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.starts_with("__") || name == "." || name == ".." {
        return Err(GeoZarrError::invalid_schema(format!(
            "{what} has invalid name '{name}'"
        )));
    }
    Ok(())
}

/// Group path of a variable.
pub fn group_path(variable: &str) -> String {
    format!("/{variable}")
}

/// Path of an array inside a variable group.
pub fn array_path(variable: &str, name: &str) -> String {
    format!("/{variable}/{name}")
}
