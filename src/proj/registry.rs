//! Projection method registry.
//!
//! [`ProjectionMethod`] names a family as spelled in PROJ.4 (`+proj=`).
//! [`AnyProjection`] holds the precomputed state of one family and dispatches
//! statically, so the per-point loop never goes through a vtable.

use crate::crs::{ProjectionInfo, ResolvedParams, Spheroid};
use crate::error::{ProjError, Result};
use crate::proj::albers_equal_area::AlbersEqualArea;
use crate::proj::equirectangular::Equirectangular;
use crate::proj::lambert_azimuthal::LambertAzimuthalEqualArea;
use crate::proj::lambert_conformal::LambertConformalConic;
use crate::proj::mercator::Mercator;
use crate::proj::sinusoidal::Sinusoidal;
use crate::proj::stereographic::{ObliqueStereographic, Stereographic};
use crate::proj::transverse_mercator::TransverseMercator;
use crate::proj::Projection;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProjectionMethod {
    #[default]
    Geographic,
    TransverseMercator,
    Utm,
    Mercator,
    LambertAzimuthalEqualArea,
    Stereographic,
    UniversalPolarStereographic,
    ObliqueStereographic,
    LambertConformalConic,
    AlbersEqualArea,
    Equirectangular,
    Sinusoidal,
}

impl ProjectionMethod {
    pub const ALL: [ProjectionMethod; 12] = [
        ProjectionMethod::Geographic,
        ProjectionMethod::TransverseMercator,
        ProjectionMethod::Utm,
        ProjectionMethod::Mercator,
        ProjectionMethod::LambertAzimuthalEqualArea,
        ProjectionMethod::Stereographic,
        ProjectionMethod::UniversalPolarStereographic,
        ProjectionMethod::ObliqueStereographic,
        ProjectionMethod::LambertConformalConic,
        ProjectionMethod::AlbersEqualArea,
        ProjectionMethod::Equirectangular,
        ProjectionMethod::Sinusoidal,
    ];

    /// Look up a method by its PROJ.4 name.
    pub fn from_proj_name(name: &str) -> Result<Self> {
        let method = match name.to_ascii_lowercase().as_str() {
            "longlat" | "latlong" | "lonlat" | "latlon" => ProjectionMethod::Geographic,
            "tmerc" | "etmerc" => ProjectionMethod::TransverseMercator,
            "utm" => ProjectionMethod::Utm,
            "merc" | "webmerc" => ProjectionMethod::Mercator,
            "laea" => ProjectionMethod::LambertAzimuthalEqualArea,
            "stere" => ProjectionMethod::Stereographic,
            "ups" => ProjectionMethod::UniversalPolarStereographic,
            "sterea" => ProjectionMethod::ObliqueStereographic,
            "lcc" => ProjectionMethod::LambertConformalConic,
            "aea" => ProjectionMethod::AlbersEqualArea,
            "eqc" => ProjectionMethod::Equirectangular,
            "sinu" => ProjectionMethod::Sinusoidal,
            _ => return Err(ProjError::UnsupportedProjection(name.to_string())),
        };
        Ok(method)
    }

    pub fn proj_name(&self) -> &'static str {
        match self {
            ProjectionMethod::Geographic => "longlat",
            ProjectionMethod::TransverseMercator => "tmerc",
            ProjectionMethod::Utm => "utm",
            ProjectionMethod::Mercator => "merc",
            ProjectionMethod::LambertAzimuthalEqualArea => "laea",
            ProjectionMethod::Stereographic => "stere",
            ProjectionMethod::UniversalPolarStereographic => "ups",
            ProjectionMethod::ObliqueStereographic => "sterea",
            ProjectionMethod::LambertConformalConic => "lcc",
            ProjectionMethod::AlbersEqualArea => "aea",
            ProjectionMethod::Equirectangular => "eqc",
            ProjectionMethod::Sinusoidal => "sinu",
        }
    }

    pub fn is_geographic(&self) -> bool {
        *self == ProjectionMethod::Geographic
    }
}

/// Precomputed projection state for one CRS.
pub enum AnyProjection {
    TransverseMercator(TransverseMercator),
    Mercator(Mercator),
    LambertAzimuthalEqualArea(LambertAzimuthalEqualArea),
    Stereographic(Stereographic),
    ObliqueStereographic(ObliqueStereographic),
    LambertConformalConic(LambertConformalConic),
    AlbersEqualArea(AlbersEqualArea),
    Equirectangular(Equirectangular),
    Sinusoidal(Sinusoidal),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            AnyProjection::TransverseMercator($p) => $body,
            AnyProjection::Mercator($p) => $body,
            AnyProjection::LambertAzimuthalEqualArea($p) => $body,
            AnyProjection::Stereographic($p) => $body,
            AnyProjection::ObliqueStereographic($p) => $body,
            AnyProjection::LambertConformalConic($p) => $body,
            AnyProjection::AlbersEqualArea($p) => $body,
            AnyProjection::Equirectangular($p) => $body,
            AnyProjection::Sinusoidal($p) => $body,
        }
    };
}

impl Projection for AnyProjection {
    #[inline]
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        dispatch!(self, p => p.forward(lam, phi))
    }

    #[inline]
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        dispatch!(self, p => p.inverse(x, y))
    }

    fn spheroid(&self) -> &Spheroid {
        dispatch!(self, p => p.spheroid())
    }
}

/// Build the projection for `info`. Geographic systems have none.
///
/// Returns the projection together with its central meridian in radians,
/// which the caller removes before `forward` and restores after `inverse`.
pub fn build(info: &ProjectionInfo) -> Result<Option<(AnyProjection, f64)>> {
    let (method, p) = info.resolved();
    if method == ProjectionMethod::Geographic {
        return Ok(None);
    }
    check_params(method, &p)?;
    let spheroid = info.spheroid().clone();
    let rad = f64::to_radians;

    let projection = match method {
        ProjectionMethod::Geographic => return Ok(None),
        ProjectionMethod::TransverseMercator => {
            AnyProjection::TransverseMercator(TransverseMercator::new(spheroid, rad(p.lat_0), p.k_0, p.x_0, p.y_0))
        }
        ProjectionMethod::Mercator => {
            AnyProjection::Mercator(Mercator::new(spheroid, rad(p.lat_ts), p.k_0, p.x_0, p.y_0))
        }
        ProjectionMethod::LambertAzimuthalEqualArea => {
            AnyProjection::LambertAzimuthalEqualArea(LambertAzimuthalEqualArea::new(spheroid, rad(p.lat_0), p.x_0, p.y_0))
        }
        ProjectionMethod::Stereographic => AnyProjection::Stereographic(Stereographic::new(
            spheroid,
            rad(p.lat_0),
            rad(p.lat_ts),
            p.k_0,
            p.x_0,
            p.y_0,
        )),
        ProjectionMethod::ObliqueStereographic => {
            AnyProjection::ObliqueStereographic(ObliqueStereographic::new(spheroid, rad(p.lat_0), p.k_0, p.x_0, p.y_0))
        }
        ProjectionMethod::LambertConformalConic => AnyProjection::LambertConformalConic(LambertConformalConic::new(
            spheroid,
            rad(p.lat_0),
            rad(p.lat_1),
            rad(p.lat_2),
            p.k_0,
            p.x_0,
            p.y_0,
        )?),
        ProjectionMethod::AlbersEqualArea => AnyProjection::AlbersEqualArea(AlbersEqualArea::new(
            spheroid,
            rad(p.lat_0),
            rad(p.lat_1),
            rad(p.lat_2),
            p.x_0,
            p.y_0,
        )?),
        ProjectionMethod::Equirectangular => {
            AnyProjection::Equirectangular(Equirectangular::new(spheroid, rad(p.lat_0), rad(p.lat_ts), p.x_0, p.y_0)?)
        }
        ProjectionMethod::Sinusoidal => AnyProjection::Sinusoidal(Sinusoidal::new(spheroid, p.x_0, p.y_0)),
        ProjectionMethod::Utm | ProjectionMethod::UniversalPolarStereographic => {
            // resolve() maps these onto their base families.
            return Err(ProjError::UnsupportedProjection(method.proj_name().to_string()));
        }
    };

    log::debug!("Built {} projection with lon_0={}", method.proj_name(), p.lon_0);
    Ok(Some((projection, rad(p.lon_0))))
}

/// Reject parameter sets no projection family can evaluate.
fn check_params(method: ProjectionMethod, p: &ResolvedParams) -> Result<()> {
    let invalid = |reason: String| Err(ProjError::InvalidParameter(format!("{}: {reason}", method.proj_name())));
    if !(p.k_0 > 0.0) {
        return invalid(format!("scale factor k_0 = {} must be positive", p.k_0));
    }
    for (name, lat) in [("lat_0", p.lat_0), ("lat_1", p.lat_1), ("lat_2", p.lat_2), ("lat_ts", p.lat_ts)] {
        if !(lat.abs() <= 90.0) {
            return invalid(format!("{name} = {lat} is outside [-90, 90]"));
        }
    }
    if method == ProjectionMethod::Mercator && p.lat_ts.abs() >= 90.0 {
        return invalid("latitude of true scale must be within (-90, 90)".to_string());
    }
    Ok(())
}
