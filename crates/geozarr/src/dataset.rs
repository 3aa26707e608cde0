//! GeoZarr dataset handle: schema assignment, index population, sparse
//! inserts and linkage readers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use grid_mapping::{GeodesyService, WktGeodesy};
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use zarrs::array::{Array, Element, ElementOwned};
use zarrs::array_subset::ArraySubset;
use zarrs::group::Group;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};

use crate::builder::{SchemaBuilder, ARRAY_DIMENSIONS, GRID_MAPPING};
use crate::config::DatasetConfig;
use crate::error::{GeoZarrError, Result};
use crate::index::{read_coordinates, resolve_selection, CoordinateValues};
use crate::schema::Schema;
use crate::types::{ElementType, IndexValue};

/// How a dataset was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// `r`: read-only.
    Read,
    /// `x`: create; the schema may be assigned once.
    Create,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Create => "x",
        }
    }
}

impl FromStr for OpenMode {
    type Err = GeoZarrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(Self::Read),
            "x" => Ok(Self::Create),
            other => Err(GeoZarrError::Config(format!(
                "unsupported open mode '{other}' (expected 'r' or 'x')"
            ))),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(dimension path, value)` insert selector.
pub type Selector = (String, IndexValue);

/// Build a selector.
pub fn selector(dimension: impl Into<String>, value: impl Into<IndexValue>) -> Selector {
    (dimension.into(), value.into())
}

/// One coordinate array linked to a data array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateLink {
    pub path: String,
    pub extent: u64,
    pub dtype: Option<ElementType>,
    pub standard_name: Option<String>,
    pub units: Option<String>,
}

/// The grid-mapping record referenced by a data array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridMappingLink {
    pub path: String,
    pub attributes: Map<String, Value>,
}

/// Dimension and CRS linkage of a data array, reconstructed from stored attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Linkage {
    pub array: String,
    pub shape: Vec<u64>,
    /// Coordinate arrays in axis order.
    pub coordinates: Vec<CoordinateLink>,
    pub grid_mapping: Option<GridMappingLink>,
}

/// Write locks keyed by array path and chunk indices.
///
/// A partial chunk write reads, modifies and stores the whole chunk, so two
/// writers touching the same chunk must not interleave.
#[derive(Debug, Default)]
struct ChunkLocks(Mutex<HashMap<(String, Vec<u64>), Arc<Mutex<()>>>>);

impl ChunkLocks {
    /// Lock handles for `chunks` of `path`, in a fixed order.
    fn handles(&self, path: &str, mut chunks: Vec<Vec<u64>>) -> Vec<Arc<Mutex<()>>> {
        chunks.sort_unstable();
        chunks.dedup();
        let mut locks = self.0.lock();
        chunks
            .into_iter()
            .map(|chunk| locks.entry((path.to_string(), chunk)).or_default().clone())
            .collect()
    }
}

/// An open GeoZarr dataset backed by a Zarr store.
///
/// Clones share the schema-assignment flag and the chunk write locks.
pub struct GeoZarrDataset<S: ?Sized> {
    store: Arc<S>,
    mode: OpenMode,
    config: DatasetConfig,
    geodesy: Arc<dyn GeodesyService>,
    schema_assigned: Arc<AtomicBool>,
    chunk_locks: Arc<ChunkLocks>,
}

impl<S: ?Sized> Clone for GeoZarrDataset<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            mode: self.mode,
            config: self.config.clone(),
            geodesy: self.geodesy.clone(),
            schema_assigned: self.schema_assigned.clone(),
            chunk_locks: self.chunk_locks.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for GeoZarrDataset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoZarrDataset")
            .field("mode", &self.mode)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: ?Sized> GeoZarrDataset<S> {
    /// Wrap a store with the default configuration and geodesy service.
    pub fn new(store: Arc<S>, mode: OpenMode) -> Self {
        Self::with_config(store, mode, DatasetConfig::default())
    }

    pub fn with_config(store: Arc<S>, mode: OpenMode, config: DatasetConfig) -> Self {
        Self {
            store,
            mode,
            config,
            geodesy: Arc::new(WktGeodesy),
            schema_assigned: Arc::new(AtomicBool::new(false)),
            chunk_locks: Arc::new(ChunkLocks::default()),
        }
    }

    /// Use a different geodesy service for CRS resolution.
    pub fn with_geodesy(mut self, geodesy: Arc<dyn GeodesyService>) -> Self {
        self.geodesy = geodesy;
        self
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn require_create(&self, operation: &str) -> Result<()> {
        match self.mode {
            OpenMode::Create => Ok(()),
            OpenMode::Read => Err(GeoZarrError::mode(operation, self.mode)),
        }
    }
}

impl<S: ReadableStorageTraits + ?Sized + 'static> GeoZarrDataset<S> {
    fn open_array(&self, path: &str) -> Result<Array<S>> {
        Array::open(self.store.clone(), path)
            .map_err(|e| GeoZarrError::zarr_error(format!("failed to open '{path}': {e}")))
    }

    /// Ordered coordinate-array paths of an array.
    pub fn dimensions(&self, path: &str) -> Result<Vec<String>> {
        let array = self.open_array(path)?;
        dimensions_of(path, array.attributes())
    }

    /// Attributes of an array.
    pub fn attributes(&self, path: &str) -> Result<Map<String, Value>> {
        Ok(self.open_array(path)?.attributes().clone())
    }

    /// Attributes of the root group.
    pub fn root_attributes(&self) -> Result<Map<String, Value>> {
        let group = Group::open(self.store.clone(), "/")
            .map_err(|e| GeoZarrError::zarr_error(format!("failed to open root group: {e}")))?;
        Ok(group.attributes().clone())
    }

    /// Read a coordinate array in full.
    pub fn coordinates(&self, path: &str) -> Result<CoordinateValues> {
        read_coordinates(&self.open_array(path)?)
    }

    /// Read an array in full.
    pub fn read_array<T: ElementOwned>(&self, path: &str) -> Result<ArrayD<T>> {
        let array = self.open_array(path)?;
        let shape: Vec<usize> = array.shape().iter().map(|&s| s as usize).collect();
        let elements = array
            .retrieve_array_subset_elements::<T>(&array.subset_all())
            .map_err(GeoZarrError::zarr_error)?;
        ArrayD::from_shape_vec(IxDyn(&shape), elements).map_err(GeoZarrError::zarr_error)
    }

    /// Reconstruct the dimension and grid-mapping linkage of a data array.
    pub fn linkage(&self, path: &str) -> Result<Linkage> {
        let array = self.open_array(path)?;
        let dimensions = dimensions_of(path, array.attributes())?;
        let shape = array.shape().to_vec();
        if dimensions.len() != shape.len() {
            return Err(GeoZarrError::shape_mismatch(
                path,
                "linkage",
                format!("{} linked dimensions", shape.len()),
                format!("{} linked dimensions", dimensions.len()),
            ));
        }

        let mut coordinates = Vec::with_capacity(dimensions.len());
        for (dimension, &axis_extent) in dimensions.iter().zip(&shape) {
            let coordinate = self.open_array(dimension)?;
            let extent: u64 = coordinate.shape().iter().product();
            if extent != axis_extent {
                return Err(GeoZarrError::shape_mismatch(
                    dimension.as_str(),
                    "linkage",
                    format!("[{axis_extent}]"),
                    format!("{:?}", coordinate.shape()),
                ));
            }
            let attrs = coordinate.attributes();
            coordinates.push(CoordinateLink {
                path: dimension.clone(),
                extent,
                dtype: ElementType::from_data_type(coordinate.data_type()),
                standard_name: string_attribute(attrs, "standard_name"),
                units: string_attribute(attrs, "units"),
            });
        }

        let grid_mapping = match string_attribute(array.attributes(), GRID_MAPPING) {
            Some(record) => Some(GridMappingLink {
                attributes: self.open_array(&record)?.attributes().clone(),
                path: record,
            }),
            None => None,
        };

        Ok(Linkage {
            array: path.to_string(),
            shape,
            coordinates,
            grid_mapping,
        })
    }
}

impl<S: ReadableStorageTraits + WritableStorageTraits + 'static> GeoZarrDataset<S> {
    /// Assign the schema: create every group and array it describes.
    ///
    /// Allowed once, in create mode.
    pub fn build(&self, schema: &Schema) -> Result<()> {
        self.require_create("build")?;
        if self.schema_assigned.swap(true, Ordering::SeqCst) {
            return Err(GeoZarrError::invalid_schema("schema already assigned"));
        }

        let builder = SchemaBuilder::new(&self.store, &self.config, self.geodesy.as_ref());
        let plan = match builder.prepare(schema) {
            Ok(plan) => plan,
            Err(e) => {
                // Nothing written yet; the schema may be assigned again.
                self.schema_assigned.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        builder.write(schema, &plan)?;
        info!(variables = schema.variables.len(), "Schema assigned");
        Ok(())
    }

    /// Overwrite a coordinate array in full.
    ///
    /// `path` must name a coordinate array, i.e. one whose
    /// `_ARRAY_DIMENSIONS` is exactly `[path]`.
    pub fn set_index<T: Element>(&self, path: &str, values: &[T]) -> Result<()> {
        self.require_create("set index")?;
        let array = self.open_array(path)?;

        let is_coordinate = dimensions_of(path, array.attributes())
            .is_ok_and(|dimensions| dimensions.len() == 1 && dimensions[0] == path);
        if !is_coordinate {
            return Err(GeoZarrError::unknown_dimension(path, "set index", path));
        }

        let extent: u64 = array.shape().iter().product();
        if values.len() as u64 != extent {
            return Err(GeoZarrError::shape_mismatch(
                path,
                "set index",
                format!("[{extent}]"),
                format!("[{}]", values.len()),
            ));
        }

        if extent > 0 {
            array
                .store_array_subset_elements(&array.subset_all(), values)
                .map_err(GeoZarrError::storage_error)?;
        }
        debug!(path = %path, extent, "Set index");
        Ok(())
    }

    /// Overwrite a `datetime64[ns]` coordinate array from timestamps.
    pub fn set_time_index(&self, path: &str, times: &[DateTime<Utc>]) -> Result<()> {
        let nanos = times
            .iter()
            .map(|t| {
                t.timestamp_nanos_opt().ok_or_else(|| {
                    GeoZarrError::invalid_schema(format!(
                        "timestamp {t} for '{path}' is outside the datetime64[ns] range"
                    ))
                })
            })
            .collect::<Result<Vec<i64>>>()?;
        self.set_index(path, &nanos)
    }

    /// Write `data` at the position named by `selectors` (blocking).
    ///
    /// Every selector names one of the array's dimension paths and a value
    /// looked up in that coordinate array; axes without a selector are written
    /// in full. `data` has the full extents of the unselected axes only.
    pub fn insert_sync<T: Element + Clone>(
        &self,
        path: &str,
        data: ArrayViewD<'_, T>,
        selectors: &[Selector],
    ) -> Result<()> {
        self.require_create("insert")?;
        let array = self.open_array(path)?;
        let dimensions = dimensions_of(path, array.attributes())?;

        let selection = resolve_selection(
            path,
            "insert",
            &dimensions,
            array.shape(),
            selectors,
            |dimension| self.coordinates(dimension),
        )?;

        let expected = selection.data_shape();
        if data.shape() != expected.as_slice() {
            return Err(GeoZarrError::shape_mismatch(
                path,
                "insert",
                format!("{expected:?}"),
                format!("{:?}", data.shape()),
            ));
        }

        let subset = selection.subset()?;
        let elements: Vec<T> = data.iter().cloned().collect();

        let handles = self.chunk_locks.handles(path, touched_chunks(&array, &subset)?);
        let _guards: Vec<_> = handles.iter().map(|lock| lock.lock()).collect();
        array
            .store_array_subset_elements(&subset, &elements)
            .map_err(GeoZarrError::storage_error)?;

        debug!(path = %path, selection = ?selection.axes(), "Inserted data");
        Ok(())
    }

    /// Write `data` at the position named by `selectors`.
    ///
    /// Runs on the blocking pool. Concurrent inserts through clones of this
    /// handle are serialized per chunk; overlapping selections land in
    /// completion order.
    pub async fn insert<T>(
        &self,
        path: impl Into<String>,
        data: ArrayD<T>,
        selectors: Vec<Selector>,
    ) -> Result<()>
    where
        T: Element + Clone + Send + Sync + 'static,
    {
        let dataset = self.clone();
        let path = path.into();
        tokio::task::spawn_blocking(move || dataset.insert_sync(&path, data.view(), &selectors))
            .await
            .map_err(|e| GeoZarrError::Task(e.to_string()))?
    }
}

fn dimensions_of(path: &str, attrs: &Map<String, Value>) -> Result<Vec<String>> {
    let value = attrs.get(ARRAY_DIMENSIONS).ok_or_else(|| {
        GeoZarrError::zarr_error(format!("'{path}' has no {ARRAY_DIMENSIONS} attribute"))
    })?;
    serde_json::from_value(value.clone()).map_err(|e| {
        GeoZarrError::zarr_error(format!("'{path}' has an invalid {ARRAY_DIMENSIONS} attribute: {e}"))
    })
}

/// Indices of the chunks a subset touches; the whole array when unknown.
fn touched_chunks<S: ?Sized>(array: &Array<S>, subset: &ArraySubset) -> Result<Vec<Vec<u64>>> {
    let chunks = array
        .chunks_in_array_subset(subset)
        .map_err(GeoZarrError::zarr_error)?;
    Ok(match chunks {
        Some(chunks) => chunks.indices().iter().collect(),
        None => vec![Vec::new()],
    })
}

fn string_attribute(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    attrs.get(key).and_then(Value::as_str).map(str::to_string)
}
