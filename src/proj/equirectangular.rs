//! Equirectangular (Plate Carrée) projection, spherical form.
//!
//! forward: x = a·Δλ·cos(φ_ts), y = a·(φ − φ₀)
//! inverse: Δλ = x/(a·cos(φ_ts)), φ = φ₀ + y/a

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::EPS10;
use crate::proj::Projection;

pub struct Equirectangular {
    spheroid: Spheroid,
    lat0: f64,
    cos_lat_ts: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Equirectangular {
    pub fn new(
        spheroid: Spheroid,
        lat0: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if !lat_ts.is_finite() || lat_ts.abs() >= FRAC_PI_2 - EPS10 {
            return Err(ProjError::InvalidParameter(
                "eqc latitude of true scale must be within (-90, 90)".to_string(),
            ));
        }
        Ok(Self {
            spheroid,
            lat0,
            cos_lat_ts: lat_ts.cos(),
            false_easting,
            false_northing,
        })
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lam: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.spheroid.a;
        let x = a * lam * self.cos_lat_ts + self.false_easting;
        let y = a * (lat - self.lat0) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.spheroid.a;
        let lam = (x - self.false_easting) / (a * self.cos_lat_ts);
        let lat = self.lat0 + (y - self.false_northing) / a;
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
    use std::f64::consts::PI;

    fn plate_carree() -> Equirectangular {
        Equirectangular::new(Spheroid::wgs84(), 0.0, 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let proj = plate_carree();
        let lam = 10.0_f64.to_radians();
        let lat = 45.0_f64.to_radians();
        let (x, y) = proj.forward(lam, lat).unwrap();
        let (lam2, lat2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lam2, lam, epsilon = 1e-12);
        assert_relative_eq!(lat2, lat, epsilon = 1e-12);
    }

    #[test]
    fn test_with_standard_parallel() {
        // With standard parallel at 30°, x should be scaled by cos(30°)
        let lat_ts = 30.0_f64.to_radians();
        let proj = Equirectangular::new(Spheroid::wgs84(), 0.0, lat_ts, 0.0, 0.0).unwrap();
        let lam = 1.0_f64.to_radians();
        let (x, _) = proj.forward(lam, 0.0).unwrap();
        assert_relative_eq!(x, 6_378_137.0 * lam * lat_ts.cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_latitude_of_origin_and_false_origin() {
        let proj = Equirectangular::new(Spheroid::sphere(1000.0), 0.5, 0.0, 10.0, 20.0).unwrap();
        let (x, y) = proj.forward(0.0, 0.5).unwrap();
        assert_relative_eq!(x, 10.0);
        assert_relative_eq!(y, 20.0);
        let (_, y) = proj.forward(0.0, 0.6).unwrap();
        assert_relative_eq!(y, 120.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dateline() {
        let proj = plate_carree();
        let (xe, _) = proj.forward(PI, 0.0).unwrap();
        let (xw, _) = proj.forward(-PI, 0.0).unwrap();
        assert_relative_eq!(xe, -xw, epsilon = 1e-6);
        // EPSG:4087 half-width
        assert_relative_eq!(xe, 20_037_508.342_789_244, epsilon = 1e-6);
    }

    #[test]
    fn test_polar_true_scale_rejected() {
        for lat_ts in [PI / 2.0, -PI / 2.0, f64::NAN] {
            assert!(Equirectangular::new(Spheroid::wgs84(), 0.0, lat_ts, 0.0, 0.0).is_err());
        }
        assert!(Equirectangular::new(Spheroid::wgs84(), 0.0, 1.5, 0.0, 0.0).is_ok());
    }
}
