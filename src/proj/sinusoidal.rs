//! Sinusoidal (Sanson–Flamsteed) projection, ellipsoidal form.
//!
//! forward: x = a·Δλ·m(φ), y = M(φ)
//! inverse: φ = M⁻¹(y), Δλ = x/(a·m(φ))
//!
//! where m is `msfn` and M the meridional arc. On a sphere this is the
//! classic x = a·Δλ·cosφ, y = a·φ.

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{inverse_meridional_arc, meridional_arc, msfn, EPS10};
use crate::proj::Projection;

pub struct Sinusoidal {
    spheroid: Spheroid,
    false_easting: f64,
    false_northing: f64,
}

impl Sinusoidal {
    pub fn new(spheroid: Spheroid, false_easting: f64, false_northing: f64) -> Self {
        Self {
            spheroid,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for Sinusoidal {
    fn forward(&self, lam: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let x = self.spheroid.a * lam * msfn(lat, self.spheroid.e2) + self.false_easting;
        let y = meridional_arc(&self.spheroid, lat) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let lat = inverse_meridional_arc(&self.spheroid, y - self.false_northing);
        let s = lat.abs();
        if s >= FRAC_PI_2 - EPS10 {
            // Longitude is undefined at the poles.
            return Ok((0.0, FRAC_PI_2.copysign(lat)));
        }
        let lam = (x - self.false_easting) / (self.spheroid.a * msfn(lat, self.spheroid.e2));
        Ok((lam, lat))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip() {
        let proj = Sinusoidal::new(Spheroid::wgs84(), 0.0, 0.0);
        let cases: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 45.0), (-73.9857, 40.7484), (139.6917, 35.6895), (20.0, -70.0)];
        for &(lon_deg, lat_deg) in cases {
            let lam = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lam, lat).unwrap();
            let (lam2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lam2, lam, epsilon = 1e-10);
            assert_relative_eq!(lat2, lat, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_equator_x_equals_eqrect() {
        let proj = Sinusoidal::new(Spheroid::wgs84(), 0.0, 0.0);
        let lam = 15.0_f64.to_radians();
        let (x, y) = proj.forward(lam, 0.0).unwrap();
        assert_relative_eq!(x, 6_378_137.0 * lam, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_modis_sphere() {
        // MODIS sinusoidal grid: sphere R=6371007.181, tile width 1111950.5197665 m (10°)
        let proj = Sinusoidal::new(Spheroid::sphere(6_371_007.181), 0.0, 0.0);
        let (x, _) = proj.forward(10.0_f64.to_radians(), 0.0).unwrap();
        assert_relative_eq!(x, 1_111_950.519_766_5, epsilon = 1e-6);
        let (_, y) = proj.forward(0.0, 10.0_f64.to_radians()).unwrap();
        assert_relative_eq!(y, 1_111_950.519_766_5, epsilon = 1e-6);
    }

    #[test]
    fn test_pole() {
        let proj = Sinusoidal::new(Spheroid::wgs84(), 0.0, 0.0);
        let (x, y) = proj.forward(45.0_f64.to_radians(), FRAC_PI_2).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        let (lam, lat) = proj.inverse(x, y).unwrap();
        assert_eq!(lam, 0.0);
        assert_relative_eq!(lat, FRAC_PI_2, epsilon = 1e-9);
    }
}
