//! Schema builder: materializes a [`Schema`] as groups, coordinate arrays,
//! grid-mapping records and data arrays.
//!
//! Layout for a variable keyed `V` with data array `N` and dimension `D`:
//!
//! ```text
//! /                 root group, global attributes
//! /V                variable group
//! /V/D              coordinate array, _ARRAY_DIMENSIONS = ["/V/D"]
//! /V/crs_grid       zero-length record holding grid-mapping attributes
//! /V/N              data array, _ARRAY_DIMENSIONS = ["/V/D", ...], grid_mapping = "/V/crs_grid"
//! ```
//!
//! Building is not transactional. [`SchemaBuilder::prepare`] checks the
//! schema, the config and the CRS without writing; a failure in
//! [`SchemaBuilder::write`] leaves the store partially populated.

use std::collections::HashMap;
use std::sync::Arc;

use grid_mapping::{encode_with, GeodesyService};
use serde_json::{Map, Value};
use tracing::{debug, info};
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::codec::BytesToBytesCodecTraits;
use zarrs::array::{Array, ArrayBuilder, ChunkGrid, DataType, FillValue};
use zarrs::group::GroupBuilder;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};

use crate::config::{DatasetConfig, ZarrCompression};
use crate::error::{GeoZarrError, Result};
use crate::schema::{array_path, group_path, Grid, Schema, Variable, CRS_GRID};
use crate::types::{DimensionKind, ElementType};

/// Attribute listing the coordinate-array paths of an array, in axis order.
pub const ARRAY_DIMENSIONS: &str = "_ARRAY_DIMENSIONS";
/// Attribute on data arrays naming their grid-mapping record.
pub const GRID_MAPPING: &str = "grid_mapping";

/// Everything resolved from a schema before the first write.
pub struct BuildPlan {
    grid_mapping: Option<Map<String, Value>>,
    /// Data-array codec per variable key; empty when uncompressed.
    codecs: HashMap<String, Arc<dyn BytesToBytesCodecTraits>>,
}

impl BuildPlan {
    /// Attributes of every `crs_grid` record, when the schema has a grid.
    pub fn grid_mapping(&self) -> Option<&Map<String, Value>> {
        self.grid_mapping.as_ref()
    }
}

/// Populates a store from a schema.
pub struct SchemaBuilder<'a, S> {
    store: &'a Arc<S>,
    config: &'a DatasetConfig,
    geodesy: &'a dyn GeodesyService,
}

impl<'a, S: ReadableStorageTraits + WritableStorageTraits + 'static> SchemaBuilder<'a, S> {
    pub fn new(store: &'a Arc<S>, config: &'a DatasetConfig, geodesy: &'a dyn GeodesyService) -> Self {
        Self {
            store,
            config,
            geodesy,
        }
    }

    /// Build the full hierarchy described by `schema`.
    pub fn build(&self, schema: &Schema) -> Result<()> {
        let plan = self.prepare(schema)?;
        self.write(schema, &plan)
    }

    /// Check the schema and config, resolve the CRS and set up codecs.
    ///
    /// Writes nothing; a failure here leaves the store untouched.
    pub fn prepare(&self, schema: &Schema) -> Result<BuildPlan> {
        schema.validate()?;
        self.config.validate()?;

        let grid_mapping = schema.grid.as_ref().map(|grid| self.grid_mapping(grid)).transpose()?;

        let mut codecs = HashMap::new();
        if self.config.compression != ZarrCompression::None {
            for (key, variable) in &schema.variables {
                codecs.insert(key.clone(), self.create_compression_codec(variable.dtype)?);
            }
        }

        Ok(BuildPlan { grid_mapping, codecs })
    }

    /// Write the groups and arrays of a prepared schema.
    ///
    /// A failure part-way leaves the store partially populated.
    pub fn write(&self, schema: &Schema, plan: &BuildPlan) -> Result<()> {
        info!(
            variables = schema.variables.len(),
            grid = schema.grid.is_some(),
            compression = %self.config.compression,
            "Building GeoZarr dataset"
        );

        GroupBuilder::new()
            .attributes(schema.global_attributes.clone())
            .build(self.store.clone(), "/")
            .map_err(GeoZarrError::zarr_error)?
            .store_metadata()
            .map_err(GeoZarrError::storage_error)?;

        for (key, variable) in &schema.variables {
            self.build_variable(
                key,
                variable,
                schema.grid.as_ref(),
                plan.grid_mapping.as_ref(),
                plan.codecs.get(key).cloned(),
            )?;
        }

        Ok(())
    }

    /// Grid-mapping attributes plus the grid origin.
    fn grid_mapping(&self, grid: &Grid) -> Result<Map<String, Value>> {
        let mut attrs = encode_with(self.geodesy, grid.crs.as_deref())
            .map_err(|e| GeoZarrError::invalid_crs("grid", "build", e))?
            .to_attributes();
        attrs.insert("projection_x_coordinate".to_string(), Value::from(grid.upper_left[0]));
        attrs.insert("projection_y_coordinate".to_string(), Value::from(grid.upper_left[1]));
        Ok(attrs)
    }

    fn build_variable(
        &self,
        key: &str,
        variable: &Variable,
        grid: Option<&Grid>,
        grid_mapping: Option<&Map<String, Value>>,
        codec: Option<Arc<dyn BytesToBytesCodecTraits>>,
    ) -> Result<()> {
        let group = group_path(key);
        GroupBuilder::new()
            .build(self.store.clone(), &group)
            .map_err(GeoZarrError::zarr_error)?
            .store_metadata()
            .map_err(GeoZarrError::storage_error)?;
        debug!(variable = %key, path = %group, "Created variable group");

        let mut dimension_paths = Vec::with_capacity(variable.dimensions.len());
        for (dim, &extent) in variable.dimensions.iter().zip(&variable.shape) {
            let path = array_path(key, &dim.name);

            let mut attrs = Map::new();
            attrs.insert(ARRAY_DIMENSIONS.to_string(), Value::from(vec![path.clone()]));
            attrs.insert("standard_name".to_string(), Value::from(dim.standard_name.clone()));
            attrs.insert("units".to_string(), Value::from(dim.units.clone()));

            let array = self.create_array(&path, dim.dtype, vec![extent], vec![extent], attrs, None)?;

            let generated = match (dim.kind, grid) {
                (DimensionKind::CoordinateX, Some(grid)) => {
                    Some(regular_axis(grid.upper_left[0], grid.unit_size, extent))
                }
                (DimensionKind::CoordinateY, Some(grid)) => {
                    Some(regular_axis(grid.upper_left[1], grid.unit_size, extent))
                }
                (DimensionKind::CoordinateX | DimensionKind::CoordinateY, None)
                | (DimensionKind::DimensionValue, _)
                | (DimensionKind::CoordinateZ, _) => None,
            };
            if let Some(values) = generated {
                store_as(&array, dim.dtype, &values)?;
            }

            debug!(
                path = %path,
                kind = ?dim.kind,
                dtype = %dim.dtype,
                extent,
                generated = grid.is_some() && matches!(dim.kind, DimensionKind::CoordinateX | DimensionKind::CoordinateY),
                "Created coordinate array"
            );
            dimension_paths.push(path);
        }

        let crs_path = array_path(key, CRS_GRID);
        let record_attrs = grid_mapping.cloned().unwrap_or_default();
        let record = ArrayBuilder::new(vec![0], DataType::UInt8, chunk_grid(&[1])?, FillValue::from(0u8))
            .attributes(record_attrs)
            .build(self.store.clone(), &crs_path)
            .map_err(GeoZarrError::zarr_error)?;
        record.store_metadata().map_err(GeoZarrError::storage_error)?;

        let data_path = array_path(key, &variable.name);
        let mut attrs = variable.attributes.clone();
        attrs.insert(ARRAY_DIMENSIONS.to_string(), Value::from(dimension_paths));
        if grid_mapping.is_some() {
            attrs.insert(GRID_MAPPING.to_string(), Value::from(crs_path));
        }
        self.create_array(
            &data_path,
            variable.dtype,
            variable.shape.clone(),
            variable.chunk_shape(),
            attrs,
            codec,
        )?;
        debug!(variable = %key, path = %data_path, shape = ?variable.shape, "Created data array");

        Ok(())
    }

    /// Create an array and store its metadata.
    fn create_array(
        &self,
        path: &str,
        dtype: ElementType,
        shape: Vec<u64>,
        chunks: Vec<u64>,
        attrs: Map<String, Value>,
        codec: Option<Arc<dyn BytesToBytesCodecTraits>>,
    ) -> Result<Array<S>> {
        let mut binding = ArrayBuilder::new(shape, dtype.data_type(), chunk_grid(&chunks)?, dtype.fill_value());
        let mut builder = binding.attributes(attrs);

        if let Some(codec) = codec {
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        let array = builder
            .build(self.store.clone(), path)
            .map_err(GeoZarrError::zarr_error)?;
        array.store_metadata().map_err(GeoZarrError::storage_error)?;
        Ok(array)
    }

    /// Create the compression codec based on configuration.
    fn create_compression_codec(&self, dtype: ElementType) -> Result<Arc<dyn BytesToBytesCodecTraits>> {
        let level = BloscCompressionLevel::try_from(self.config.compression_level)
            .map_err(|_| GeoZarrError::Config("Invalid compression level".to_string()))?;

        let shuffle = if self.config.shuffle {
            BloscShuffleMode::Shuffle
        } else {
            BloscShuffleMode::NoShuffle
        };

        // typesize is required when shuffle is enabled
        let typesize = self.config.shuffle.then(|| dtype.size());

        let compressor = match self.config.compression {
            ZarrCompression::None => {
                return Err(GeoZarrError::Config("No compression configured".to_string()))
            }
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| GeoZarrError::Config(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}

/// Regular chunk grid; zero extents get a unit chunk.
fn chunk_grid(chunks: &[u64]) -> Result<ChunkGrid> {
    let chunks: Vec<u64> = chunks.iter().map(|&c| c.max(1)).collect();
    chunks
        .try_into()
        .map_err(|e| GeoZarrError::Config(format!("{:?}", e)))
}

/// `origin + unit * i` for `i` in `0..extent`.
fn regular_axis(origin: f64, unit: f64, extent: u64) -> Vec<f64> {
    (0..extent).map(|i| origin + unit * i as f64).collect()
}

/// Write generated coordinates, cast to the array's element type.
fn store_as<S>(array: &Array<S>, dtype: ElementType, values: &[f64]) -> Result<()>
where
    S: ReadableStorageTraits + WritableStorageTraits + 'static,
{
    if values.is_empty() {
        return Ok(());
    }
    let subset = array.subset_all();

    macro_rules! store {
        ($ty:ty) => {{
            let cast: Vec<$ty> = values.iter().map(|&v| v as $ty).collect();
            array
                .store_array_subset_elements(&subset, &cast)
                .map_err(GeoZarrError::storage_error)
        }};
    }

    match dtype {
        ElementType::Float64 => array
            .store_array_subset_elements(&subset, values)
            .map_err(GeoZarrError::storage_error),
        ElementType::Float32 => store!(f32),
        ElementType::Int8 => store!(i8),
        ElementType::Int16 => store!(i16),
        ElementType::Int32 => store!(i32),
        ElementType::Int64 | ElementType::DateTime64Ns => store!(i64),
        ElementType::UInt8 => store!(u8),
        ElementType::UInt16 => store!(u16),
        ElementType::UInt32 => store!(u32),
        ElementType::UInt64 => store!(u64),
        ElementType::Bool => Err(GeoZarrError::invalid_schema(
            "cannot generate boolean coordinates",
        )),
    }
}
