//! Albers Equal Area Conic projection.
//!
//! Area-preserving conic using `qsfn` from common.rs. The cone constant is
//! n = (m₁² − m₂²)/(q₂ − q₁) for two standard parallels and sinφ₁ for one.

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{msfn, qsfn, EPS10};
use crate::proj::Projection;

const PHI_TOLERANCE: f64 = 1e-10;
const PHI_ITERATIONS: usize = 15;

pub struct AlbersEqualArea {
    spheroid: Spheroid,
    e: f64,
    ec: f64, // q at the pole
    n: f64,
    c: f64,
    dd: f64,
    rho0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AlbersEqualArea {
    pub fn new(
        spheroid: Spheroid,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if (lat1 + lat2).abs() < EPS10 {
            return Err(ProjError::InvalidParameter(
                "aea standard parallels must not be symmetric about the equator".to_string(),
            ));
        }
        let e = spheroid.eccentricity();
        let e2 = spheroid.e2;

        let m1 = msfn(lat1, e2);
        let q1 = qsfn(lat1, e);
        let n = if (lat1 - lat2).abs() >= EPS10 {
            let m2 = msfn(lat2, e2);
            (m1 * m1 - m2 * m2) / (qsfn(lat2, e) - q1)
        } else {
            lat1.sin()
        };
        if n.abs() < EPS10 {
            return Err(ProjError::InvalidParameter("aea cone constant is zero".to_string()));
        }

        let c = m1 * m1 + n * q1;
        let dd = 1.0 / n;
        let rho0 = dd * (c - n * qsfn(lat0, e)).max(0.0).sqrt();

        Ok(Self {
            ec: qsfn(FRAC_PI_2, e),
            spheroid,
            e,
            n,
            c,
            dd,
            rho0,
            false_easting,
            false_northing,
        })
    }

    /// Latitude from the authalic helper q, by Newton iteration.
    fn phi_from_q(&self, q: f64) -> f64 {
        let mut phi = (0.5 * q).clamp(-1.0, 1.0).asin();
        let e = self.e;
        if e < 1e-7 {
            return phi;
        }
        let one_es = 1.0 - self.spheroid.e2;
        for _ in 0..PHI_ITERATIONS {
            let (sinphi, cosphi) = phi.sin_cos();
            let con = e * sinphi;
            let com = 1.0 - con * con;
            let dphi = 0.5 * com * com / cosphi
                * (q / one_es - sinphi / com + 0.5 / e * ((1.0 - con) / (1.0 + con)).ln());
            phi += dphi;
            if dphi.abs() <= PHI_TOLERANCE {
                break;
            }
        }
        phi
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lam: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let q = qsfn(lat, self.e);
        let rho = self.dd * (self.c - self.n * q).max(0.0).sqrt();
        let theta = self.n * lam;

        let a = self.spheroid.a;
        let x = a * rho * theta.sin() + self.false_easting;
        let y = a * (self.rho0 - rho * theta.cos()) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.spheroid.a;
        let mut x_ = (x - self.false_easting) / a;
        let mut y_ = self.rho0 - (y - self.false_northing) / a;
        let mut rho = x_.hypot(y_);

        if rho == 0.0 {
            return Ok((0.0, FRAC_PI_2.copysign(self.n)));
        }
        if self.n < 0.0 {
            rho = -rho;
            x_ = -x_;
            y_ = -y_;
        }

        let r = rho / self.dd;
        let q = (self.c - r * r) / self.n;
        let lat = if (self.ec - q.abs()).abs() > 1e-7 {
            self.phi_from_q(q)
        } else {
            FRAC_PI_2.copysign(q)
        };
        Ok((x_.atan2(y_) / self.n, lat))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // NAD83 / Conus Albers (EPSG:5070): lat1=29.5°, lat2=45.5°, lat0=23°, lon0=-96°
    fn conus() -> AlbersEqualArea {
        AlbersEqualArea::new(
            Spheroid::named("GRS80").unwrap(),
            23.0_f64.to_radians(),
            29.5_f64.to_radians(),
            45.5_f64.to_radians(),
            0.0,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let proj = conus();
        let lon0 = -96.0;
        let cases: &[(f64, f64)] = &[
            (-96.0, 23.0),  // origin
            (-96.0, 39.0),  // on central meridian
            (-74.0, 40.7),  // NYC
            (-87.6, 41.9),  // Chicago
            (-118.2, 34.0), // LA
            (-122.4, 37.8), // SF
        ];
        for &(lon_deg, lat_deg) in cases {
            let lam = (lon_deg - lon0).to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lam, lat).unwrap();
            let (lam2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lam2, lam, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_origin() {
        let (x, y) = conus().forward(0.0, 23.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_with_false_easting_northing() {
        let proj = AlbersEqualArea::new(
            Spheroid::wgs84(),
            40.0_f64.to_radians(),
            35.0_f64.to_radians(),
            45.0_f64.to_radians(),
            500_000.0,
            1_000_000.0,
        )
        .unwrap();
        let (x, y) = proj.forward(0.0, 40.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 500_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 1_000_000.0, epsilon = 1e-6);

        let lam = 16.0_f64.to_radians();
        let lat = 35.0_f64.to_radians();
        let (x, y) = proj.forward(lam, lat).unwrap();
        let (lam2, lat2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lam2, lam, epsilon = 1e-9);
        assert_relative_eq!(lat2, lat, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_cone_constant() {
        // On a sphere n reduces to (sinφ₁ + sinφ₂)/2.
        let (lat1, lat2) = (20.0_f64.to_radians(), 50.0_f64.to_radians());
        let proj = AlbersEqualArea::new(Spheroid::sphere(1.0), 0.0, lat1, lat2, 0.0, 0.0).unwrap();
        assert_relative_eq!(proj.n, (lat1.sin() + lat2.sin()) / 2.0, epsilon = 1e-15);
        let (x, y) = proj.forward(0.3, 0.7).unwrap();
        let (lam, phi) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lam, 0.3, epsilon = 1e-12);
        assert_relative_eq!(phi, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_southern_hemisphere() {
        // Australian Albers (EPSG:3577): lat1=-18, lat2=-36, lat0=0, lon0=132
        let proj = AlbersEqualArea::new(
            Spheroid::named("GRS80").unwrap(),
            0.0,
            (-18.0_f64).to_radians(),
            (-36.0_f64).to_radians(),
            0.0,
            0.0,
        )
        .unwrap();
        let lam = (151.2 - 132.0_f64).to_radians();
        let lat = (-33.9_f64).to_radians();
        let (x, y) = proj.forward(lam, lat).unwrap();
        assert!(y < 0.0);
        let (lam2, lat2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lam2, lam, epsilon = 1e-9);
        assert_relative_eq!(lat2, lat, epsilon = 1e-9);
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        let result = AlbersEqualArea::new(Spheroid::wgs84(), 0.0, 0.5, -0.5, 0.0, 0.0);
        assert!(matches!(result, Err(ProjError::InvalidParameter(_))));
    }
}
