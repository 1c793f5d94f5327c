//! Coordinate reference system descriptors.
//!
//! A [`ProjectionInfo`] is an immutable value: geographic base (datum, prime
//! meridian, angular unit), projection method and parameters, linear unit and
//! the `over` flag. It can be read from PROJ.4 strings, WKT, authority codes
//! or the named catalog, and written back to PROJ.4 or WKT.
//!
//! Equality is structural: two descriptors are equal when they describe the
//! same computation, regardless of how they were spelled or what they are
//! called.

pub mod datum;
pub mod epsg;
pub mod known;
pub mod proj_string;
pub mod spheroid;
pub mod units;
pub mod wkt;

use std::fmt;
use std::str::FromStr;

use crate::error::{ProjError, Result};
use crate::proj::registry::ProjectionMethod;

pub use datum::{Datum, DatumMethod};
pub use spheroid::Spheroid;
pub use units::{AngularUnit, LinearUnit, PrimeMeridian};

/// Authority reference, e.g. `EPSG:27700`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Authority {
    pub name: String,
    pub code: u32,
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.code)
    }
}

/// Geographic part of a CRS.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeographicInfo {
    pub name: String,
    pub datum: Datum,
    pub prime_meridian: PrimeMeridian,
    pub unit: AngularUnit,
}

impl GeographicInfo {
    pub fn new(datum: Datum) -> Self {
        Self {
            name: datum.name.clone(),
            datum,
            prime_meridian: PrimeMeridian::greenwich(),
            unit: AngularUnit::degree(),
        }
    }
}

impl PartialEq for GeographicInfo {
    fn eq(&self, other: &Self) -> bool {
        self.datum == other.datum && self.prime_meridian == other.prime_meridian && self.unit == other.unit
    }
}

/// Projection parameters as spelled in the definition. Angles are degrees,
/// false easting and northing are metres.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectionParams {
    pub lat_0: Option<f64>,
    pub lon_0: Option<f64>,
    pub lat_1: Option<f64>,
    pub lat_2: Option<f64>,
    pub lat_ts: Option<f64>,
    pub k_0: Option<f64>,
    pub x_0: Option<f64>,
    pub y_0: Option<f64>,
    pub zone: Option<u8>,
    pub south: bool,
}

/// Parameters with every method default applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedParams {
    pub lat_0: f64,
    pub lon_0: f64,
    pub lat_1: f64,
    pub lat_2: f64,
    pub lat_ts: f64,
    pub k_0: f64,
    pub x_0: f64,
    pub y_0: f64,
}

impl ResolvedParams {
    fn approx_eq(&self, other: &Self) -> bool {
        let angles = [
            (self.lat_0, other.lat_0),
            (self.lon_0, other.lon_0),
            (self.lat_1, other.lat_1),
            (self.lat_2, other.lat_2),
            (self.lat_ts, other.lat_ts),
        ];
        let offsets = [(self.x_0, other.x_0), (self.y_0, other.y_0)];
        angles.iter().all(|(a, b)| (a - b).abs() < 1e-10)
            && offsets.iter().all(|(a, b)| (a - b).abs() < 1e-6)
            && approx::relative_eq!(self.k_0, other.k_0, epsilon = 1e-12)
    }
}

impl ProjectionParams {
    /// Apply the defaults of `method`. Returns the method used for computation
    /// (UTM and UPS resolve to their base families) and its parameters.
    pub fn resolve(&self, method: ProjectionMethod) -> (ProjectionMethod, ResolvedParams) {
        let lat_0 = self.lat_0.unwrap_or(0.0);
        let lat_1 = self.lat_1.unwrap_or(0.0);
        let mut resolved = ResolvedParams {
            lat_0,
            lon_0: self.lon_0.unwrap_or(0.0),
            lat_1,
            lat_2: self.lat_2.unwrap_or(lat_1),
            lat_ts: self.lat_ts.unwrap_or(0.0),
            k_0: self.k_0.unwrap_or(1.0),
            x_0: self.x_0.unwrap_or(0.0),
            y_0: self.y_0.unwrap_or(0.0),
        };

        match method {
            ProjectionMethod::Utm => {
                let zone = self.zone.map(f64::from).unwrap_or_else(|| {
                    let lon = crate::proj::common::adjlon(resolved.lon_0.to_radians()).to_degrees();
                    ((lon + 180.0) / 6.0).floor().clamp(0.0, 59.0) + 1.0
                });
                resolved.lat_0 = 0.0;
                resolved.lon_0 = (zone - 1.0) * 6.0 - 180.0 + 3.0;
                resolved.k_0 = self.k_0.unwrap_or(0.9996);
                resolved.x_0 = 500_000.0;
                resolved.y_0 = if self.south { 10_000_000.0 } else { 0.0 };
                resolved.lat_ts = 0.0;
                (ProjectionMethod::TransverseMercator, resolved)
            }
            ProjectionMethod::UniversalPolarStereographic => {
                resolved.lat_0 = if self.south { -90.0 } else { 90.0 };
                resolved.lat_ts = resolved.lat_0;
                resolved.k_0 = self.k_0.unwrap_or(0.994);
                resolved.x_0 = 2_000_000.0;
                resolved.y_0 = 2_000_000.0;
                (ProjectionMethod::Stereographic, resolved)
            }
            ProjectionMethod::Stereographic => {
                resolved.lat_ts = self.lat_ts.unwrap_or(if lat_0 < 0.0 { -90.0 } else { 90.0 });
                (method, resolved)
            }
            ProjectionMethod::LambertConformalConic => {
                if self.lat_2.is_none() && self.lat_0.is_none() {
                    resolved.lat_0 = lat_1;
                }
                (method, resolved)
            }
            _ => (method, resolved),
        }
    }
}

/// A coordinate reference system.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectionInfo {
    pub name: Option<String>,
    pub authority: Option<Authority>,
    pub geographic: GeographicInfo,
    pub method: ProjectionMethod,
    pub params: ProjectionParams,
    pub unit: LinearUnit,
    /// Suppresses longitude wrapping into [-180, 180] around projections.
    pub over: bool,
}

impl ProjectionInfo {
    /// Geographic coordinates on `datum`.
    pub fn geographic(datum: Datum) -> Self {
        Self {
            name: None,
            authority: None,
            geographic: GeographicInfo::new(datum),
            method: ProjectionMethod::Geographic,
            params: ProjectionParams::default(),
            unit: LinearUnit::meter(),
            over: false,
        }
    }

    pub fn wgs84() -> Self {
        Self::geographic(Datum::wgs84())
    }

    pub fn from_proj4_string(definition: &str) -> Result<Self> {
        proj_string::parse(definition)
    }

    /// Parse OGC or ESRI flavoured WKT1.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        wkt::parse(wkt)
    }

    pub fn from_esri_string(wkt: &str) -> Result<Self> {
        wkt::parse(wkt)
    }

    pub fn from_epsg_code(code: u32) -> Result<Self> {
        Self::from_authority_code("EPSG", code)
    }

    pub fn from_authority_code(authority: &str, code: u32) -> Result<Self> {
        let definition = epsg::lookup(authority, code).ok_or_else(|| ProjError::UnknownAuthorityCode {
            authority: authority.to_uppercase(),
            code,
        })?;
        let mut info = proj_string::parse(&definition.proj4)?;
        info.name = Some(definition.name.clone());
        info.authority = Some(Authority {
            name: authority.to_uppercase(),
            code,
        });
        log::debug!("Resolved {}:{} as {}", authority.to_uppercase(), code, definition.name);
        Ok(info)
    }

    /// Look up a coordinate system in the named catalog.
    pub fn from_known_name(name: &str) -> Result<Self> {
        known::by_name(name)
    }

    /// Resolve any supported definition: `EPSG:n` / `ESRI:n` codes, WKT,
    /// PROJ.4 strings or catalog names.
    pub fn from_definition(definition: &str) -> Result<Self> {
        let trimmed = definition.trim();
        if trimmed.is_empty() {
            return Err(ProjError::parse(definition, "empty definition"));
        }
        if let Some((authority, code)) = trimmed.split_once(':') {
            let authority = authority.trim();
            if !authority.is_empty() && authority.chars().all(|c| c.is_ascii_alphabetic()) {
                if let Ok(code) = code.trim().parse::<u32>() {
                    return Self::from_authority_code(authority, code);
                }
            }
        }
        if wkt::looks_like_wkt(trimmed) {
            return wkt::parse(trimmed);
        }
        if trimmed.contains("proj=") || trimmed.contains("init=") {
            return proj_string::parse(trimmed);
        }
        known::by_name(trimmed).map_err(|_| ProjError::parse(definition, "not a recognised CRS definition"))
    }

    pub fn to_proj4_string(&self) -> String {
        proj_string::format(self)
    }

    pub fn to_wkt(&self) -> String {
        wkt::format(self)
    }

    pub fn is_geographic(&self) -> bool {
        self.method == ProjectionMethod::Geographic
    }

    pub fn with_over(mut self, over: bool) -> Self {
        self.over = over;
        self
    }

    pub fn datum(&self) -> &Datum {
        &self.geographic.datum
    }

    pub fn spheroid(&self) -> &Spheroid {
        &self.geographic.datum.spheroid
    }

    /// Method and parameters after applying defaults.
    pub fn resolved(&self) -> (ProjectionMethod, ResolvedParams) {
        self.params.resolve(self.method)
    }
}

impl PartialEq for ProjectionInfo {
    fn eq(&self, other: &Self) -> bool {
        if self.geographic != other.geographic || self.over != other.over {
            return false;
        }
        match (self.is_geographic(), other.is_geographic()) {
            (true, true) => true,
            (false, false) => {
                let (method_a, params_a) = self.resolved();
                let (method_b, params_b) = other.resolved();
                method_a == method_b && params_a.approx_eq(&params_b) && self.unit == other.unit
            }
            _ => false,
        }
    }
}

impl FromStr for ProjectionInfo {
    type Err = ProjError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_definition(s)
    }
}

impl fmt::Display for ProjectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_proj4_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_spelling() {
        let a = ProjectionInfo::from_proj4_string("+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs").unwrap();
        let b = ProjectionInfo::from_proj4_string(
            "+proj=tmerc +lat_0=0 +lon_0=15 +k=0.9996 +x_0=500000 +y_0=0 +ellps=WGS84 +towgs84=0,0,0",
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_ignores_name_and_authority() {
        let a = ProjectionInfo::from_epsg_code(3006).unwrap();
        let mut b = a.clone();
        b.name = Some("something else".to_string());
        b.authority = None;
        assert_eq!(a, b);
    }

    #[test]
    fn test_inequality() {
        let utm33 = ProjectionInfo::from_epsg_code(32633).unwrap();
        let utm34 = ProjectionInfo::from_epsg_code(32634).unwrap();
        assert_ne!(utm33, utm34);
        assert_ne!(utm33, utm33.clone().with_over(true));
        assert_ne!(ProjectionInfo::wgs84(), utm33);

        let ed50 = ProjectionInfo::from_epsg_code(4230).unwrap();
        assert_ne!(ProjectionInfo::wgs84(), ed50);
    }

    #[test]
    fn test_lcc_single_parallel_defaults() {
        let (_, params) = ProjectionInfo::from_proj4_string("+proj=lcc +lat_1=45 +lon_0=3 +ellps=GRS80")
            .unwrap()
            .resolved();
        assert_eq!(params.lat_0, 45.0);
        assert_eq!(params.lat_2, 45.0);
    }

    #[test]
    fn test_utm_zone_from_lon_0() {
        let info = ProjectionInfo::from_proj4_string("+proj=utm +lon_0=16 +datum=WGS84").unwrap();
        let (method, params) = info.resolved();
        assert_eq!(method, ProjectionMethod::TransverseMercator);
        assert_eq!(params.lon_0, 15.0);
    }

    #[test]
    fn test_from_definition_dispatch() {
        let by_code: ProjectionInfo = "EPSG:27700".parse().unwrap();
        let by_proj = ProjectionInfo::from_definition(&by_code.to_proj4_string()).unwrap();
        let by_wkt = ProjectionInfo::from_definition(&by_code.to_wkt()).unwrap();
        let by_name = ProjectionInfo::from_definition("BritishNationalGrid").unwrap();
        assert_eq!(by_code, by_proj);
        assert_eq!(by_code, by_wkt);
        assert_eq!(by_code, by_name);

        assert!(matches!(
            ProjectionInfo::from_definition("EPSG:999999"),
            Err(ProjError::UnknownAuthorityCode { code: 999999, .. })
        ));
        assert!(matches!(ProjectionInfo::from_definition("not a crs"), Err(ProjError::Parse { .. })));
        assert!(matches!(ProjectionInfo::from_definition("   "), Err(ProjError::Parse { .. })));
    }
}
