//! Datum conversion between geographic coordinates on different datums.
//!
//! Helmert family datums go through geocentric coordinates and WGS84; grid
//! shift datums are moved onto WGS84 by their grids first (source) or last
//! (target). Unknown datums are never shifted.

pub mod geocentric;
pub mod gridshift;
pub mod helmert;

use crate::config::{self, Settings};
use crate::crs::{Datum, DatumMethod, Spheroid};
use crate::error::Result;
use crate::proj::common::adjlon;

use geocentric::{geocentric_to_geodetic, geodetic_to_geocentric};
use gridshift::GridList;
use helmert::Helmert;

pub use gridshift::{register_grid, Grid};

/// One side of a datum conversion.
#[derive(Debug)]
struct Side {
    grids: Option<GridList>,
    helmert: Helmert,
    spheroid: Spheroid,
}

impl Side {
    fn new(datum: &Datum, settings: &Settings) -> Result<Self> {
        match &datum.method {
            DatumMethod::GridShift(names) => Ok(Self {
                grids: Some(GridList::load(names, settings)?),
                helmert: Helmert::translation(0.0, 0.0, 0.0),
                // Grids move coordinates onto WGS84.
                spheroid: Spheroid::wgs84(),
            }),
            method => Ok(Self {
                grids: None,
                helmert: Helmert::for_method(method).unwrap_or_else(|| Helmert::translation(0.0, 0.0, 0.0)),
                spheroid: datum.spheroid.clone(),
            }),
        }
    }
}

#[derive(Debug)]
enum Steps {
    Identity,
    Shift { src: Side, dst: Side, geocentric: bool },
}

/// A prepared conversion from one datum to another. Grids are resolved when
/// the conversion is built.
#[derive(Debug)]
pub struct DatumTransform {
    steps: Steps,
}

impl DatumTransform {
    pub fn new(src: &Datum, dst: &Datum) -> Result<Self> {
        Self::with_settings(src, dst, &config::current())
    }

    pub(crate) fn with_settings(src: &Datum, dst: &Datum, settings: &Settings) -> Result<Self> {
        if src == dst {
            return Ok(Self::identity());
        }
        if src.method == DatumMethod::Unknown || dst.method == DatumMethod::Unknown {
            log::debug!(
                "Datum {} or {} has no known relation to WGS84, skipping datum shift",
                src.name,
                dst.name
            );
            return Ok(Self::identity());
        }

        let src = Side::new(src, settings)?;
        let dst = Side::new(dst, settings)?;
        let geocentric = !(src.helmert.is_identity() && dst.helmert.is_identity() && src.spheroid == dst.spheroid);
        Ok(Self {
            steps: Steps::Shift { src, dst, geocentric },
        })
    }

    pub fn identity() -> Self {
        Self { steps: Steps::Identity }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.steps, Steps::Identity)
    }

    /// Convert (λ, φ, h) in radians and metres.
    pub fn apply(&self, lon: f64, lat: f64, z: f64) -> Result<(f64, f64, f64)> {
        let Steps::Shift { src, dst, geocentric } = &self.steps else {
            return Ok((lon, lat, z));
        };

        let (mut lon, mut lat, mut z) = (lon, lat, z);
        if let Some(grids) = &src.grids {
            (lon, lat) = grids.forward(lon, lat)?;
        }

        if *geocentric {
            let (x, y, zz) = geodetic_to_geocentric(&src.spheroid, lon, lat, z);
            let (x, y, zz) = src.helmert.to_wgs84(x, y, zz);
            let (x, y, zz) = dst.helmert.from_wgs84(x, y, zz);
            let (lon2, lat2, h) = geocentric_to_geodetic(&dst.spheroid, x, y, zz);
            // Applied as a delta so the input's winding survives.
            lon += adjlon(lon2 - lon);
            lat = lat2;
            z = h;
        }

        if let Some(grids) = &dst.grids {
            (lon, lat) = grids.inverse(lon, lat)?;
        }
        Ok((lon, lat, z))
    }
}

/// Convert one point from `src` to `dst`. Builds the conversion each call;
/// prefer [`DatumTransform`] for many points.
pub fn shift(src: &Datum, dst: &Datum, lon: f64, lat: f64, z: f64) -> Result<(f64, f64, f64)> {
    DatumTransform::new(src, dst)?.apply(lon, lat, z)
}
