//! CF grid-mapping encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::epsg;
use crate::error::Result;
use crate::geodesy::{CrsDefinition, GeodesyService, WktGeodesy};

/// Projection method that gets CF projection parameters.
const TRANSVERSE_MERCATOR: &str = "transverse mercator";

/// CF grid-mapping attributes derived from a CRS.
///
/// Fields that are `None` are omitted from [`GridMapping::to_attributes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridMapping {
    pub grid_mapping_name: Option<String>,
    pub spatial_ref: String,
    pub inverse_flattening: Option<f64>,
    pub longitude_of_prime_meridian: Option<f64>,
    pub false_easting: Option<f64>,
    pub false_northing: Option<f64>,
    pub scale_factor_at_central_meridian: Option<f64>,
    pub longitude_of_central_meridian: Option<f64>,
    pub latitude_of_projection_origin: Option<f64>,
    pub semi_major_axis: Option<f64>,
    pub semi_minor_axis: Option<f64>,
}

impl GridMapping {
    /// Attribute map in a fixed key order, ready to store on a Zarr node.
    pub fn to_attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        if let Some(name) = &self.grid_mapping_name {
            attrs.insert("grid_mapping_name".to_string(), Value::from(name.clone()));
        }
        attrs.insert("spatial_ref".to_string(), Value::from(self.spatial_ref.clone()));

        let numeric = [
            ("inverse_flattening", self.inverse_flattening),
            ("longitude_of_prime_meridian", self.longitude_of_prime_meridian),
            ("false_easting", self.false_easting),
            ("false_northing", self.false_northing),
            ("scale_factor_at_central_meridian", self.scale_factor_at_central_meridian),
            ("longitude_of_central_meridian", self.longitude_of_central_meridian),
            ("latitude_of_projection_origin", self.latitude_of_projection_origin),
            ("semi_major_axis", self.semi_major_axis),
            ("semi_minor_axis", self.semi_minor_axis),
        ];
        for (key, value) in numeric {
            if let Some(v) = value {
                attrs.insert(key.to_string(), Value::from(v));
            }
        }
        attrs
    }

    /// Whether projection parameters were extracted.
    pub fn is_transverse_mercator(&self) -> bool {
        self.grid_mapping_name.as_deref() == Some("transverse_mercator")
    }
}

/// Encode a CRS specification with the built-in geodesy service.
///
/// `None` yields the geographic EPSG:4326 default carrying only `spatial_ref`.
pub fn encode(crs: Option<&str>) -> Result<GridMapping> {
    encode_with(&WktGeodesy, crs)
}

/// Encode a CRS specification using the supplied geodesy service.
pub fn encode_with(service: &dyn GeodesyService, crs: Option<&str>) -> Result<GridMapping> {
    let Some(crs) = crs else {
        return Ok(default_mapping());
    };

    let definition = service.resolve(crs)?;
    debug!(
        crs = %definition.name,
        projected = definition.is_projected(),
        method = definition.method_name().unwrap_or("none"),
        "Resolved CRS"
    );
    Ok(from_definition(&definition))
}

fn default_mapping() -> GridMapping {
    GridMapping {
        spatial_ref: epsg::wkt_for_code(epsg::DEFAULT_GEOGRAPHIC_CODE).unwrap_or_default(),
        ..GridMapping::default()
    }
}

fn from_definition(definition: &CrsDefinition) -> GridMapping {
    let ellipsoid = &definition.ellipsoid;
    let mut mapping = GridMapping {
        spatial_ref: definition.wkt.clone(),
        inverse_flattening: Some(ellipsoid.inverse_flattening),
        longitude_of_prime_meridian: Some(definition.prime_meridian),
        ..GridMapping::default()
    };

    let is_tm = definition
        .method_name()
        .is_some_and(|m| m.eq_ignore_ascii_case(TRANSVERSE_MERCATOR));
    if is_tm {
        let param = |name: &str, default: f64| Some(definition.parameter(name).unwrap_or(default));
        mapping.grid_mapping_name = Some("transverse_mercator".to_string());
        mapping.false_easting = param("false easting", 0.0);
        mapping.false_northing = param("false northing", 0.0);
        mapping.scale_factor_at_central_meridian = param("scale factor at natural origin", 1.0);
        mapping.longitude_of_central_meridian = param("longitude of natural origin", 0.0);
        mapping.latitude_of_projection_origin = param("latitude of natural origin", 0.0);
    }

    if !ellipsoid.semi_minor_computed {
        mapping.semi_major_axis = Some(ellipsoid.semi_major_metre);
        mapping.semi_minor_axis = Some(ellipsoid.semi_minor_metre);
    }

    mapping
}
