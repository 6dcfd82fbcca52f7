//! CRS descriptors: parsing, validation, and semantic equality.
//!
//! A [`Crs`] is an opaque, immutable value describing a coordinate
//! reference system. Construction delegates validation to `proj4rs`;
//! accepted input forms are EPSG authority strings (`"EPSG:4326"`, bare
//! codes), PROJ strings (`"+proj=..."`), and WKT carrying an EPSG
//! identifier.

use std::collections::BTreeMap;
use std::fmt;

use proj4rs::Proj;

use crate::error::CrsError;

/// Parameter keys that never affect which reference system is described.
const NOISE_PARAMS: [&str; 2] = ["no_defs", "type"];

/// An opaque, immutable CRS descriptor.
///
/// Equality is semantic, not textual: authority-code descriptors compare by
/// code, PROJ-string descriptors compare by normalized parameter set
/// (parameter order, `+no_defs`, and numeric formatting do not matter).
/// Descriptors parsed from different input families compare unequal, so a
/// dubious comparison surfaces as a conflict instead of a silent merge.
#[derive(Debug, Clone)]
pub struct Crs {
    definition: String,
    epsg: Option<u32>,
    params: BTreeMap<String, Option<String>>,
    geographic: bool,
}

impl Crs {
    /// Parse any accepted input form into a validated descriptor.
    pub fn from_user_input(input: &str) -> Result<Self, CrsError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid(input, "empty CRS input"));
        }
        if input.starts_with('+') {
            return Self::from_proj_string(input);
        }
        if let Some(code) = parse_authority_code(input) {
            return Self::from_epsg(code);
        }
        if input.contains('[') {
            return match extract_wkt_epsg(input) {
                Some(code) => Self::from_epsg(code),
                None => Err(invalid(
                    input,
                    "WKT without an EPSG authority identifier is not supported",
                )),
            };
        }
        Err(invalid(input, "unrecognized CRS input format"))
    }

    /// Build a descriptor from an EPSG authority code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsError> {
        let definition = format!("EPSG:{code}");
        let proj = Proj::from_user_string(&definition)
            .map_err(|e| invalid(&definition, &e.to_string()))?;
        Ok(Self {
            definition,
            epsg: Some(code),
            params: BTreeMap::new(),
            geographic: proj.is_latlong(),
        })
    }

    fn from_proj_string(input: &str) -> Result<Self, CrsError> {
        let proj = Proj::from_proj_string(input).map_err(|e| invalid(input, &e.to_string()))?;
        let params = parse_proj_params(input);
        let definition = render_proj_params(&params);
        Ok(Self {
            definition,
            epsg: None,
            params,
            geographic: proj.is_latlong(),
        })
    }

    /// EPSG code, when the descriptor was built from one.
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// Compact definition string (`EPSG:4326` or a normalized PROJ string).
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Definition string truncated to `max_width` characters for inline
    /// display.
    pub fn format_compact(&self, max_width: usize) -> String {
        labgrid::truncate_repr(&self.definition, max_width)
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.params == other.params,
            _ => false,
        }
    }
}

impl Eq for Crs {}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition)
    }
}

/// Anything a caller may hand to `assign_crs`: an already-parsed
/// descriptor, an authority/PROJ/WKT string, or a bare EPSG code.
#[derive(Debug, Clone)]
pub enum CrsInput {
    Parsed(Crs),
    Text(String),
    Epsg(u32),
}

impl CrsInput {
    pub fn into_crs(self) -> Result<Crs, CrsError> {
        match self {
            Self::Parsed(crs) => Ok(crs),
            Self::Text(text) => Crs::from_user_input(&text),
            Self::Epsg(code) => Crs::from_epsg(code),
        }
    }
}

impl From<Crs> for CrsInput {
    fn from(crs: Crs) -> Self {
        Self::Parsed(crs)
    }
}

impl From<&Crs> for CrsInput {
    fn from(crs: &Crs) -> Self {
        Self::Parsed(crs.clone())
    }
}

impl From<&str> for CrsInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CrsInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<u32> for CrsInput {
    fn from(code: u32) -> Self {
        Self::Epsg(code)
    }
}

fn invalid(input: &str, reason: &str) -> CrsError {
    CrsError::InvalidCrs {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// `"EPSG:4326"` (any case) or a bare code.
fn parse_authority_code(input: &str) -> Option<u32> {
    let code = match input.split_once(':') {
        Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code.trim(),
        Some(_) => return None,
        None => input,
    };
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

/// Pull the EPSG code out of a WKT body. The trailing `AUTHORITY` / `ID`
/// clause identifies the whole CRS (earlier clauses belong to nested
/// elements such as the datum).
fn extract_wkt_epsg(wkt: &str) -> Option<u32> {
    for (marker, terminator) in [("AUTHORITY[\"EPSG\",\"", "\"]"), ("ID[\"EPSG\",", "]")] {
        if let Some(pos) = wkt.rfind(marker) {
            let start = pos + marker.len();
            if let Some(end) = wkt[start..].find(terminator) {
                if let Ok(code) = wkt[start..start + end].trim().parse() {
                    return Some(code);
                }
            }
        }
    }
    None
}

fn parse_proj_params(input: &str) -> BTreeMap<String, Option<String>> {
    input
        .split_whitespace()
        .filter_map(|token| token.strip_prefix('+'))
        .map(|token| match token.split_once('=') {
            Some((key, value)) => (key.to_ascii_lowercase(), Some(normalize_value(value))),
            None => (token.to_ascii_lowercase(), None),
        })
        .filter(|(key, _)| !NOISE_PARAMS.contains(&key.as_str()))
        .collect()
}

/// Canonicalize numeric parameter values so `+lon_0=0` and `+lon_0=0.0`
/// compare equal.
fn normalize_value(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(number) => format!("{number}"),
        Err(_) => value.to_string(),
    }
}

fn render_proj_params(params: &BTreeMap<String, Option<String>>) -> String {
    let mut out = String::new();
    for (key, value) in params {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push('+');
        out.push_str(key);
        if let Some(value) = value {
            out.push('=');
            out.push_str(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_input_forms_agree() {
        let a = Crs::from_user_input("EPSG:4326").unwrap();
        let b = Crs::from_user_input("epsg:4326").unwrap();
        let c = Crs::from_user_input("4326").unwrap();
        let d = Crs::from_epsg(4326).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
        assert_eq!(a.epsg(), Some(4326));
    }

    #[test]
    fn distinct_codes_differ() {
        let wgs84 = Crs::from_epsg(4326).unwrap();
        let mercator = Crs::from_epsg(3857).unwrap();
        assert_ne!(wgs84, mercator);
    }

    #[test]
    fn geographic_classification() {
        assert!(Crs::from_epsg(4326).unwrap().is_geographic());
        assert!(!Crs::from_epsg(3857).unwrap().is_geographic());
    }

    #[test]
    fn proj_string_equality_ignores_order_and_noise() {
        let a = Crs::from_user_input("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        let b = Crs::from_user_input("+datum=WGS84 +proj=longlat").unwrap();
        assert_eq!(a, b);

        let c = Crs::from_user_input("+proj=merc +ellps=WGS84 +lon_0=0 +no_defs").unwrap();
        let d = Crs::from_user_input("+proj=merc +ellps=WGS84 +lon_0=0.0").unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn input_families_never_mix() {
        // Conservative by contract: an authority-code descriptor and a
        // PROJ-string descriptor surface as a conflict even when they name
        // the same system.
        let by_code = Crs::from_epsg(4326).unwrap();
        let by_string = Crs::from_user_input("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        assert_ne!(by_code, by_string);
    }

    #[test]
    fn wkt_resolves_through_trailing_authority() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]]"#;
        let crs = Crs::from_user_input(wkt).unwrap();
        assert_eq!(crs.epsg(), Some(4326));
        assert_eq!(crs, Crs::from_epsg(4326).unwrap());
    }

    #[test]
    fn wkt2_id_clause_is_accepted() {
        let wkt = r#"GEOGCRS["WGS 84",ID["EPSG",4326]]"#;
        assert_eq!(Crs::from_user_input(wkt).unwrap().epsg(), Some(4326));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            Crs::from_user_input(""),
            Err(CrsError::InvalidCrs { .. })
        ));
        assert!(matches!(
            Crs::from_user_input("not a crs"),
            Err(CrsError::InvalidCrs { .. })
        ));
        assert!(matches!(
            Crs::from_user_input("EPSG:99999999"),
            Err(CrsError::InvalidCrs { .. })
        ));
        assert!(matches!(
            Crs::from_user_input(r#"GEOGCS["no authority here"]"#),
            Err(CrsError::InvalidCrs { .. })
        ));
    }

    #[test]
    fn compact_format_truncates() {
        let crs = Crs::from_user_input("+proj=merc +lat_ts=56.5 +ellps=GRS80").unwrap();
        let compact = crs.format_compact(12);
        assert!(compact.ends_with(" ..."));
        assert_eq!(Crs::from_epsg(4326).unwrap().format_compact(20), "EPSG:4326");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const CODES: [u32; 5] = [4326, 3857, 4269, 32650, 2154];

        proptest! {
            #[test]
            fn equality_reflexive(code in prop::sample::select(CODES.to_vec())) {
                let crs = Crs::from_epsg(code).unwrap();
                prop_assert_eq!(&crs, &crs.clone());
            }

            #[test]
            fn equality_symmetric(
                a in prop::sample::select(CODES.to_vec()),
                b in prop::sample::select(CODES.to_vec()),
            ) {
                let left = Crs::from_epsg(a).unwrap();
                let right = Crs::from_epsg(b).unwrap();
                prop_assert_eq!(left == right, right == left);
                prop_assert_eq!(left == right, a == b);
            }
        }
    }
}
