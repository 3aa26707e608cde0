//! Common test fixtures for geozarr tests.
//!
//! This module provides pre-defined CRS strings and dataset schemas that
//! represent common scenarios.

/// Common CRS identifiers and WKT strings.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// WGS 84 / UTM zone 18N
    pub const EPSG_32618: &str = "EPSG:32618";

    /// WGS 84 / UTM zone 18N as OGC WKT1.
    pub const UTM_18N_WKT1: &str = concat!(
        r#"PROJCS["WGS 84 / UTM zone 18N","#,
        r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],"#,
        r#"PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],"#,
        r#"PROJECTION["Transverse_Mercator"],"#,
        r#"PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",-75],PARAMETER["scale_factor",0.9996],"#,
        r#"PARAMETER["false_easting",500000],PARAMETER["false_northing",0],"#,
        r#"UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["Easting",EAST],AXIS["Northing",NORTH],AUTHORITY["EPSG","32618"]]"#
    );

    /// WGS 84 / UTM zone 18N as ISO 19162 WKT2.
    pub const UTM_18N_WKT2: &str = concat!(
        r#"PROJCRS["WGS 84 / UTM zone 18N","#,
        r#"BASEGEOGCRS["WGS 84",DATUM["World Geodetic System 1984","#,
        r#"ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],"#,
        r#"PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],ID["EPSG",4326]],"#,
        r#"CONVERSION["UTM zone 18N",METHOD["Transverse Mercator",ID["EPSG",9807]],"#,
        r#"PARAMETER["Latitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433]],"#,
        r#"PARAMETER["Longitude of natural origin",-75,ANGLEUNIT["degree",0.0174532925199433]],"#,
        r#"PARAMETER["Scale factor at natural origin",0.9996,SCALEUNIT["unity",1]],"#,
        r#"PARAMETER["False easting",500000,LENGTHUNIT["metre",1]],"#,
        r#"PARAMETER["False northing",0,LENGTHUNIT["metre",1]]],"#,
        r#"CS[Cartesian,2],AXIS["easting",east],AXIS["northing",north],"#,
        r#"LENGTHUNIT["metre",1],ID["EPSG",32618]]"#
    );

    /// UTM zone 18N wrapped in a BOUNDCRS with a WGS 84 target, as produced
    /// by tools that attach a towgs84 transformation.
    pub const UTM_18N_BOUND: &str = concat!(
        "BOUNDCRS[SOURCECRS[",
        r#"PROJCRS["WGS 84 / UTM zone 18N","#,
        r#"BASEGEOGCRS["WGS 84",DATUM["World Geodetic System 1984","#,
        r#"ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],"#,
        r#"PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]]],"#,
        r#"CONVERSION["UTM zone 18N",METHOD["Transverse Mercator"],"#,
        r#"PARAMETER["Latitude of natural origin",0],PARAMETER["Longitude of natural origin",-75],"#,
        r#"PARAMETER["Scale factor at natural origin",0.9996],"#,
        r#"PARAMETER["False easting",500000],PARAMETER["False northing",0]],"#,
        r#"CS[Cartesian,2],AXIS["easting",east],AXIS["northing",north],LENGTHUNIT["metre",1]]"#,
        "],TARGETCRS[",
        r#"GEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563]],"#,
        r#"PRIMEM["Greenwich",0],CS[ellipsoidal,2],ANGLEUNIT["degree",0.0174532925199433]]"#,
        r#"],ABRIDGEDTRANSFORMATION["Transformation from WGS 84 to WGS84",METHOD["Position Vector transformation (geog2D domain)"],"#,
        r#"PARAMETER["X-axis translation",0],PARAMETER["Y-axis translation",0],PARAMETER["Z-axis translation",0]]]"#
    );

    /// Geographic CRS on a sphere (inverse flattening 0).
    pub const SPHERE_WKT1: &str = concat!(
        r#"GEOGCS["Normal Sphere (r=6370997)",DATUM["unknown",SPHEROID["sphere",6370997,0]],"#,
        r#"PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#
    );

    /// Lambert conformal conic; projected but not Transverse Mercator.
    pub const LAMBERT_WKT1: &str = concat!(
        r#"PROJCS["RGF93 / Lambert-93",GEOGCS["RGF93",DATUM["Reseau_Geodesique_Francais_1993","#,
        r#"SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],"#,
        r#"PROJECTION["Lambert_Conformal_Conic_2SP"],PARAMETER["standard_parallel_1",49],"#,
        r#"PARAMETER["standard_parallel_2",44],PARAMETER["latitude_of_origin",46.5],"#,
        r#"PARAMETER["central_meridian",3],PARAMETER["false_easting",700000],"#,
        r#"PARAMETER["false_northing",6600000],UNIT["metre",1]]"#
    );
}

/// Dataset schemas in the nested-mapping layout.
pub mod schema {
    /// Snow water equivalent on a UTM grid with axes `(time, y, x)`.
    ///
    /// Shape `(4, 3, 5)`, grid origin `(100, 200)`, unit size 10.
    pub const SWE_TIME_SERIES_JSON: &str = r#"{
        "global_attributes": {
            "title": "Snow water equivalent",
            "institution": "test"
        },
        "grid": {
            "crs": "EPSG:32618",
            "upperLeft": [100.0, 200.0],
            "unitSize": 10.0
        },
        "swe": {
            "name": "SWE",
            "dtype": "float32",
            "shape": [4, 3, 5],
            "chunks": [1, 3, 5],
            "attributes": {"long_name": "snow water equivalent", "units": "mm"},
            "dimensions": [
                {"name": "time", "standard_name": "time", "units": "nanoseconds since 1970-01-01", "dtype": "<M8[ns]", "kind": "DIMENSION_VALUE"},
                {"name": "y", "standard_name": "projection_y_coordinate", "units": "m", "dtype": "float64", "kind": "COORDINATE_Y"},
                {"name": "x", "standard_name": "projection_x_coordinate", "units": "m", "dtype": "float64", "kind": "COORDINATE_X"}
            ]
        }
    }"#;

    /// The same dataset as [`SWE_TIME_SERIES_JSON`] written as YAML.
    pub const SWE_TIME_SERIES_YAML: &str = r#"
global_attributes:
  title: Snow water equivalent
  institution: test
grid:
  crs: "EPSG:32618"
  upperLeft: [100.0, 200.0]
  unitSize: 10.0
swe:
  name: SWE
  dtype: float32
  shape: [4, 3, 5]
  chunks: [1, 3, 5]
  attributes:
    long_name: snow water equivalent
    units: mm
  dimensions:
    - {name: time, standard_name: time, units: "nanoseconds since 1970-01-01", dtype: "<M8[ns]", kind: DIMENSION_VALUE}
    - {name: y, standard_name: projection_y_coordinate, units: m, dtype: float64, kind: COORDINATE_Y}
    - {name: x, standard_name: projection_x_coordinate, units: m, dtype: float64, kind: COORDINATE_X}
"#;

    /// One gridless float32 cube `(time, y, x)` of shape `(16, 64, 64)` with no
    /// declared chunks, so the data array is a single chunk.
    pub const UNCHUNKED_CUBE_JSON: &str = r#"{
        "cube": {
            "name": "value",
            "dtype": "float32",
            "shape": [16, 64, 64],
            "dimensions": [
                {"name": "time", "standard_name": "time", "units": "1", "dtype": "int64", "kind": "DIMENSION_VALUE"},
                {"name": "y", "standard_name": "projection_y_coordinate", "units": "m", "dtype": "float64", "kind": "COORDINATE_Y"},
                {"name": "x", "standard_name": "projection_x_coordinate", "units": "m", "dtype": "float64", "kind": "COORDINATE_X"}
            ]
        }
    }"#;

    /// Two gridless variables sharing dimension names: a station series
    /// indexed by integer ids and a 2-D band table.
    pub const GRIDLESS_JSON: &str = r#"{
        "stations": {
            "name": "temperature",
            "dtype": "float64",
            "shape": [3, 2],
            "attributes": {},
            "dimensions": [
                {"name": "station", "standard_name": "platform_id", "units": "1", "dtype": "int32", "kind": "DIMENSION_VALUE"},
                {"name": "level", "standard_name": "height", "units": "m", "dtype": "float32", "kind": "COORDINATE_Z"}
            ]
        },
        "bands": {
            "name": "reflectance",
            "dtype": "uint16",
            "shape": [2, 4],
            "attributes": {"scale_factor": 0.0001},
            "dimensions": [
                {"name": "band", "standard_name": "band", "units": "1", "dtype": "uint8", "kind": "DIMENSION_VALUE"},
                {"name": "x", "standard_name": "projection_x_coordinate", "units": "m", "dtype": "float64", "kind": "COORDINATE_X"}
            ]
        }
    }"#;
}
