//! EPSG identifier handling.
//!
//! Codes are looked up in the `crs-definitions` database, which carries the
//! OGC WKT1 text of every EPSG CRS. Codes outside the database are rejected
//! by the geodesy service.

/// Geographic CRS used when a dataset declares no CRS (WGS 84).
pub const DEFAULT_GEOGRAPHIC_CODE: u32 = 4326;

/// Parse an `EPSG:<code>` identifier (case-insensitive prefix).
///
/// Returns `None` when the input is not an EPSG identifier at all and
/// `Some(Err(..))` when it is one but the code is not a number.
pub fn parse_identifier(input: &str) -> Option<Result<u32, String>> {
    let trimmed = input.trim();
    let prefix = trimmed.get(..5)?;
    if !prefix.eq_ignore_ascii_case("EPSG:") {
        return None;
    }
    let code = trimmed[5..].trim();
    Some(
        code.parse::<u32>()
            .map_err(|_| format!("'{code}' is not a numeric EPSG code")),
    )
}

/// Canonical WKT for an EPSG code, if the database knows it.
pub fn wkt_for_code(code: u32) -> Option<String> {
    u16::try_from(code)
        .ok()
        .and_then(crs_definitions::from_code)
        .map(|def| def.wkt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wkt;

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier("EPSG:4326"), Some(Ok(4326)));
        assert_eq!(parse_identifier("epsg: 32618 "), Some(Ok(32618)));
        assert!(matches!(parse_identifier("EPSG:abc"), Some(Err(_))));
        assert_eq!(parse_identifier("GEOGCS[\"x\"]"), None);
        assert_eq!(parse_identifier("EPS"), None);
    }

    #[test]
    fn test_database_wkt_parses() {
        for code in [4326, 4269, 3857, 32618, 32733, 26910, 25832, 27700, 2193] {
            let text = wkt_for_code(code).unwrap_or_else(|| panic!("EPSG:{code} missing"));
            wkt::parse(&text).unwrap_or_else(|e| panic!("EPSG:{code}: {e}"));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!(wkt_for_code(9999).is_none());
        assert!(wkt_for_code(70_000).is_none());
    }

    #[test]
    fn test_utm_name() {
        assert!(wkt_for_code(32733).unwrap().contains("UTM zone 33S"));
    }
}
