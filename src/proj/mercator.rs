//! Mercator projection on the ellipsoid or the sphere (Web Mercator, EPSG:3857).
//!
//!   forward: x = a·k₀·Δλ, y = −a·k₀·ln(tsfn(φ, e))
//!   inverse: Δλ = x/(a·k₀), φ = phi_from_ts(exp(−y/(a·k₀)), e)
//!
//! With a standard parallel `lat_ts` the scale is k₀ = msfn(lat_ts), which
//! replaces any explicit scale factor. On a sphere (e = 0) the formulas reduce
//! to y = a·k₀·ln(tan(π/4 + φ/2)); Web Mercator is that case on a sphere of
//! radius 6378137. Latitudes are clamped just short of the poles so the
//! northing stays finite.

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{msfn, phi_from_ts, tsfn, EPS10};
use crate::proj::Projection;

pub struct Mercator {
    spheroid: Spheroid,
    e: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Mercator {
    pub fn new(spheroid: Spheroid, lat_ts: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let k0 = if lat_ts != 0.0 { msfn(lat_ts, spheroid.e2) } else { k0 };
        Self {
            e: spheroid.eccentricity(),
            spheroid,
            k0,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for Mercator {
    fn forward(&self, lam: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let lat = lat.clamp(-FRAC_PI_2 + EPS10, FRAC_PI_2 - EPS10);
        let ak0 = self.spheroid.a * self.k0;
        let x = ak0 * lam + self.false_easting;
        // For positive latitudes tsfn < 1, so −ln(tsfn) > 0.
        let y = -ak0 * tsfn(lat, self.e).ln() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let ak0 = self.spheroid.a * self.k0;
        let lam = (x - self.false_easting) / ak0;
        let ts = (-(y - self.false_northing) / ak0).exp();
        Ok((lam, phi_from_ts(ts, self.e)))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}
