//! Geodesy service: resolves CRS specifications into structured definitions.
//!
//! [`GeodesyService`] is the seam between grid-mapping encoding and whatever
//! knows about coordinate reference systems. The built-in [`WktGeodesy`]
//! handles EPSG codes from the `crs-definitions` database plus arbitrary WKT1/WKT2 text; callers
//! with richer CRS databases can plug in their own implementation.

use serde::{Deserialize, Serialize};

use crate::epsg;
use crate::error::{GridMappingError, Result};
use crate::wkt::{self, WktNode};

const PROJECTED: &[&str] = &["PROJCS", "PROJCRS", "PROJECTEDCRS"];
const GEOGRAPHIC: &[&str] = &[
    "GEOGCS",
    "GEOGCRS",
    "GEODCRS",
    "GEOGRAPHICCRS",
    "GEODETICCRS",
    "BASEGEOGCRS",
    "BASEGEODCRS",
];
const ELLIPSOID: &[&str] = &["SPHEROID", "ELLIPSOID"];

/// Whether a CRS is geographic or projected, with projection details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrsKind {
    Geographic,
    Projected {
        /// Coordinate-operation method, normalized to its EPSG name.
        method: String,
        parameters: Vec<OperationParameter>,
    },
}

/// A named coordinate-operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameter {
    /// EPSG-style parameter name, e.g. "False easting".
    pub name: String,
    /// Value in the unit declared by the WKT.
    pub value: f64,
    pub unit: Option<String>,
}

/// Reference ellipsoid parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub name: String,
    pub semi_major_metre: f64,
    /// Zero for a sphere.
    pub inverse_flattening: f64,
    pub semi_minor_metre: f64,
    /// True when the semi-minor axis is derived from the inverse flattening
    /// rather than defined on its own.
    pub semi_minor_computed: bool,
}

impl Ellipsoid {
    /// Ellipsoid defined by semi-major axis and inverse flattening.
    ///
    /// An inverse flattening of zero denotes a sphere, whose semi-minor axis
    /// is defined directly as equal to the semi-major axis.
    pub fn from_inverse_flattening(name: impl Into<String>, semi_major: f64, inverse_flattening: f64) -> Self {
        if inverse_flattening == 0.0 {
            return Self {
                name: name.into(),
                semi_major_metre: semi_major,
                inverse_flattening,
                semi_minor_metre: semi_major,
                semi_minor_computed: false,
            };
        }
        Self {
            name: name.into(),
            semi_major_metre: semi_major,
            inverse_flattening,
            semi_minor_metre: semi_major * (1.0 - 1.0 / inverse_flattening),
            semi_minor_computed: true,
        }
    }

    /// Ellipsoid defined by both axes.
    pub fn from_axes(name: impl Into<String>, semi_major: f64, semi_minor: f64) -> Self {
        let inverse_flattening = if semi_major == semi_minor {
            0.0
        } else {
            semi_major / (semi_major - semi_minor)
        };
        Self {
            name: name.into(),
            semi_major_metre: semi_major,
            inverse_flattening,
            semi_minor_metre: semi_minor,
            semi_minor_computed: false,
        }
    }
}

/// A resolved coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsDefinition {
    pub name: String,
    pub kind: CrsKind,
    pub ellipsoid: Ellipsoid,
    /// Prime meridian longitude in the CRS angular unit (degrees for EPSG entries).
    pub prime_meridian: f64,
    /// WKT serialization: canonical text for identifiers, the caller's text for WKT input.
    pub wkt: String,
}

impl CrsDefinition {
    pub fn is_projected(&self) -> bool {
        matches!(self.kind, CrsKind::Projected { .. })
    }

    /// Projection method name for projected CRSs.
    pub fn method_name(&self) -> Option<&str> {
        match &self.kind {
            CrsKind::Projected { method, .. } => Some(method),
            CrsKind::Geographic => None,
        }
    }

    /// Coordinate-operation parameters (empty for geographic CRSs).
    pub fn parameters(&self) -> &[OperationParameter] {
        match &self.kind {
            CrsKind::Projected { parameters, .. } => parameters,
            CrsKind::Geographic => &[],
        }
    }

    /// Value of the first parameter whose name matches `name` (case-insensitive).
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value)
    }
}

/// Resolves CRS identifiers and WKT strings.
pub trait GeodesyService: Send + Sync {
    /// Resolve an `EPSG:<code>` identifier or a WKT string.
    fn resolve(&self, crs: &str) -> Result<CrsDefinition>;
}

/// Built-in geodesy service backed by the EPSG database and the WKT parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct WktGeodesy;

impl GeodesyService for WktGeodesy {
    fn resolve(&self, crs: &str) -> Result<CrsDefinition> {
        if let Some(code) = epsg::parse_identifier(crs) {
            let code = code.map_err(|reason| GridMappingError::invalid_crs(crs, reason))?;
            let text = epsg::wkt_for_code(code)
                .ok_or_else(|| GridMappingError::invalid_crs(crs, format!("unknown EPSG code {code}")))?;
            return definition_from_wkt(crs, text);
        }

        if !crs.contains(|c| c == '[' || c == '(') {
            return Err(GridMappingError::invalid_crs(
                crs,
                "expected an EPSG:<code> identifier or a WKT string",
            ));
        }
        definition_from_wkt(crs, crs.to_string())
    }
}

fn definition_from_wkt(input: &str, text: String) -> Result<CrsDefinition> {
    let root = wkt::parse(&text).map_err(|e| GridMappingError::invalid_crs(input, e.to_string()))?;
    let crs = horizontal_crs(&root).map_err(|reason| GridMappingError::invalid_crs(input, reason))?;
    let mut definition = interpret(crs).map_err(|reason| GridMappingError::invalid_crs(input, reason))?;
    definition.wkt = text;
    Ok(definition)
}

/// Unwrap `BOUNDCRS` and compound wrappers down to the horizontal CRS node.
fn horizontal_crs(root: &WktNode) -> std::result::Result<&WktNode, String> {
    if root.is_any(&["BOUNDCRS"]) {
        let source = root
            .child(&["SOURCECRS"])
            .and_then(|s| s.nodes().next())
            .ok_or("BOUNDCRS without SOURCECRS")?;
        return horizontal_crs(source);
    }
    if root.is_any(&["COMPD_CS", "COMPOUNDCRS"]) {
        let horizontal = root
            .nodes()
            .find(|n| n.is_any(PROJECTED) || n.is_any(GEOGRAPHIC) || n.is_any(&["BOUNDCRS"]))
            .ok_or("compound CRS without a horizontal component")?;
        return horizontal_crs(horizontal);
    }
    Ok(root)
}

fn interpret(crs: &WktNode) -> std::result::Result<CrsDefinition, String> {
    let name = crs.text(0).unwrap_or_default().to_string();

    let (base, kind) = if crs.is_any(PROJECTED) {
        let base = crs
            .child(GEOGRAPHIC)
            .ok_or_else(|| format!("{} without a base geographic CRS", crs.keyword))?;
        (base, projection(crs)?)
    } else if crs.is_any(GEOGRAPHIC) {
        (crs, CrsKind::Geographic)
    } else {
        return Err(format!("unsupported CRS type {}", crs.keyword));
    };

    let spheroid = base
        .find(ELLIPSOID)
        .ok_or_else(|| format!("{} without an ellipsoid", base.keyword))?;
    let ellipsoid = ellipsoid(spheroid)?;

    let prime_meridian = base
        .child(&["PRIMEM", "PRIMEMERIDIAN"])
        .and_then(|pm| pm.number(0))
        .unwrap_or(0.0);

    Ok(CrsDefinition {
        name,
        kind,
        ellipsoid,
        prime_meridian,
        wkt: String::new(),
    })
}

fn projection(crs: &WktNode) -> std::result::Result<CrsKind, String> {
    // WKT2 keeps method and parameters under CONVERSION; WKT1 puts them on the CRS itself.
    let holder = crs.child(&["CONVERSION"]).unwrap_or(crs);
    let method = holder
        .child(&["METHOD", "PROJECTION"])
        .and_then(|m| m.text(0))
        .ok_or_else(|| format!("{} without a projection method", crs.keyword))?;

    let parameters = holder
        .children(&["PARAMETER"])
        .into_iter()
        .map(|p| -> std::result::Result<OperationParameter, String> {
            let name = p.text(0).ok_or("PARAMETER without a name")?;
            let value = p
                .number(0)
                .ok_or_else(|| format!("parameter '{name}' without a value"))?;
            let unit = p
                .child(&["ANGLEUNIT", "LENGTHUNIT", "SCALEUNIT", "UNIT"])
                .and_then(|u| u.text(0))
                .map(str::to_string);
            Ok(OperationParameter {
                name: normalize_parameter(name),
                value,
                unit,
            })
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;

    Ok(CrsKind::Projected {
        method: normalize_method(method),
        parameters,
    })
}

fn ellipsoid(node: &WktNode) -> std::result::Result<Ellipsoid, String> {
    let name = node.text(0).unwrap_or_default();
    let semi_major = node
        .number(0)
        .ok_or_else(|| format!("{} without a semi-major axis", node.keyword))?;
    let inverse_flattening = node
        .number(1)
        .ok_or_else(|| format!("{} without an inverse flattening", node.keyword))?;
    let to_metre = node
        .child(&["LENGTHUNIT", "UNIT"])
        .and_then(|u| u.number(0))
        .unwrap_or(1.0);

    if semi_major <= 0.0 || inverse_flattening < 0.0 {
        return Err(format!("{} has invalid axes", node.keyword));
    }
    Ok(Ellipsoid::from_inverse_flattening(
        name,
        semi_major * to_metre,
        inverse_flattening,
    ))
}

/// Map WKT1 method spellings onto EPSG method names.
fn normalize_method(name: &str) -> String {
    name.replace('_', " ")
}

/// Map WKT1 parameter spellings onto EPSG parameter names.
fn normalize_parameter(name: &str) -> String {
    let spaced = name.replace('_', " ");
    match spaced.to_ascii_lowercase().as_str() {
        "central meridian" | "longitude of origin" => "Longitude of natural origin".to_string(),
        "latitude of origin" => "Latitude of natural origin".to_string(),
        "scale factor" => "Scale factor at natural origin".to_string(),
        "false easting" => "False easting".to_string(),
        "false northing" => "False northing".to_string(),
        _ => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WKT2_UTM_18N: &str = r#"PROJCRS["WGS 84 / UTM zone 18N",
        BASEGEOGCRS["WGS 84",
            ENSEMBLE["World Geodetic System 1984 ensemble",
                MEMBER["World Geodetic System 1984 (G2139)"],
                ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]],
                ENSEMBLEACCURACY[2.0]],
            PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],
            ID["EPSG",4326]],
        CONVERSION["UTM zone 18N",
            METHOD["Transverse Mercator",ID["EPSG",9807]],
            PARAMETER["Latitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Longitude of natural origin",-75,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Scale factor at natural origin",0.9996,SCALEUNIT["unity",1]],
            PARAMETER["False easting",500000,LENGTHUNIT["metre",1]],
            PARAMETER["False northing",0,LENGTHUNIT["metre",1]]],
        CS[Cartesian,2],
        ID["EPSG",32618]]"#;

    #[test]
    fn test_resolve_epsg_geographic() {
        let def = WktGeodesy.resolve("EPSG:4326").unwrap();
        assert!(!def.is_projected());
        assert_eq!(def.name, "WGS 84");
        assert_eq!(def.ellipsoid.inverse_flattening, 298.257223563);
        assert!(def.ellipsoid.semi_minor_computed);
        assert_eq!(def.prime_meridian, 0.0);
        assert_eq!(def.wkt, epsg::wkt_for_code(4326).unwrap());
    }

    #[test]
    fn test_resolve_epsg_utm_normalizes_names() {
        let def = WktGeodesy.resolve("EPSG:32618").unwrap();
        assert_eq!(def.method_name(), Some("Transverse Mercator"));
        assert_eq!(def.parameter("longitude of natural origin"), Some(-75.0));
        assert_eq!(def.parameter("Scale factor at natural origin"), Some(0.9996));
        assert_eq!(def.parameter("false easting"), Some(500000.0));
    }

    #[test]
    fn test_resolve_wkt2_keeps_verbatim_text() {
        let def = WktGeodesy.resolve(WKT2_UTM_18N).unwrap();
        assert_eq!(def.method_name(), Some("Transverse Mercator"));
        assert_eq!(def.parameter("Latitude of natural origin"), Some(0.0));
        assert_eq!(def.ellipsoid.semi_major_metre, 6378137.0);
        assert_eq!(def.wkt, WKT2_UTM_18N);
        let unit = def.parameters()[0].unit.as_deref();
        assert_eq!(unit, Some("degree"));
    }

    #[test]
    fn test_resolve_bound_crs_uses_source() {
        let wkt = format!(
            "BOUNDCRS[SOURCECRS[{}],TARGETCRS[{}],ABRIDGEDTRANSFORMATION[\"x\",METHOD[\"Geocentric translations\"]]]",
            WKT2_UTM_18N,
            epsg::wkt_for_code(4326).unwrap()
        );
        let def = WktGeodesy.resolve(&wkt).unwrap();
        assert_eq!(def.name, "WGS 84 / UTM zone 18N");
        assert_eq!(def.parameter("False easting"), Some(500000.0));
    }

    #[test]
    fn test_sphere_has_independent_semi_minor() {
        let wkt = r#"GEOGCS["Sphere",DATUM["unknown",SPHEROID["Sphere",6371000,0]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;
        let def = WktGeodesy.resolve(wkt).unwrap();
        assert!(!def.ellipsoid.semi_minor_computed);
        assert_eq!(def.ellipsoid.semi_minor_metre, 6371000.0);
    }

    #[test]
    fn test_prime_meridian_is_read() {
        let wkt = r#"GEOGCS["NTF (Paris)",DATUM["Nouvelle_Triangulation_Francaise_Paris",SPHEROID["Clarke 1880 (IGN)",6378249.2,293.466021293627]],PRIMEM["Paris",2.33722917],UNIT["grad",0.01570796326794897]]"#;
        let def = WktGeodesy.resolve(wkt).unwrap();
        assert_eq!(def.prime_meridian, 2.33722917);
    }

    #[test]
    fn test_from_axes() {
        let e = Ellipsoid::from_axes("Airy", 6377563.396, 6356256.909);
        assert!(!e.semi_minor_computed);
        assert!((e.inverse_flattening - 299.3249646).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_errors() {
        assert!(matches!(
            WktGeodesy.resolve("EPSG:1"),
            Err(GridMappingError::InvalidCrs { .. })
        ));
        assert!(WktGeodesy.resolve("EPSG:").is_err());
        assert!(WktGeodesy.resolve("+proj=longlat").is_err());
        assert!(WktGeodesy.resolve("PROJCS[\"broken\"").is_err());
        assert!(WktGeodesy.resolve("VERTCS[\"height\",VDATUM[\"x\"]]").is_err());
        // Projected CRS missing its base geographic CRS.
        assert!(WktGeodesy.resolve("PROJCS[\"x\",PROJECTION[\"Transverse_Mercator\"]]").is_err());
    }
}
