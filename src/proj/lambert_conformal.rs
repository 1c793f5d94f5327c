//! Lambert Conformal Conic projection, 1SP and 2SP variants.
//!
//! Uses `tsfn`, `msfn`, `phi_from_ts` from common.rs. With equal standard
//! parallels the cone constant is n = sin(φ₁) (1SP); otherwise
//! n = ln(m₁/m₂) / ln(t₁/t₂). The scale factor k₀ multiplies both variants.

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{msfn, phi_from_ts, tsfn, EPS10};
use crate::proj::Projection;

pub struct LambertConformalConic {
    spheroid: Spheroid,
    e: f64,
    n: f64,    // cone constant
    c: f64,    // F = m₁/(n·t₁ⁿ)
    rho0: f64, // ρ₀ = F·t₀ⁿ
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl LambertConformalConic {
    pub fn new(
        spheroid: Spheroid,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if (lat1 + lat2).abs() < EPS10 {
            return Err(ProjError::InvalidParameter(
                "lcc standard parallels must not be symmetric about the equator".to_string(),
            ));
        }
        if lat1.abs() >= FRAC_PI_2 - EPS10 || lat2.abs() >= FRAC_PI_2 - EPS10 {
            return Err(ProjError::InvalidParameter(
                "lcc standard parallels must not be at a pole".to_string(),
            ));
        }
        let e = spheroid.eccentricity();
        let e2 = spheroid.e2;

        let m1 = msfn(lat1, e2);
        let t1 = tsfn(lat1, e);
        let n = if (lat1 - lat2).abs() >= EPS10 {
            (m1 / msfn(lat2, e2)).ln() / (t1 / tsfn(lat2, e)).ln()
        } else {
            lat1.sin()
        };

        let c = m1 * t1.powf(-n) / n;
        if !(n.is_finite() && n != 0.0 && c.is_finite()) {
            return Err(ProjError::InvalidParameter(format!("lcc cone constant {n} is degenerate")));
        }
        let rho0 = if (lat0.abs() - FRAC_PI_2).abs() < EPS10 {
            0.0
        } else {
            c * tsfn(lat0, e).powf(n)
        };

        Ok(Self {
            spheroid,
            e,
            n,
            c,
            rho0,
            k0,
            false_easting,
            false_northing,
        })
    }
}

impl Projection for LambertConformalConic {
    fn forward(&self, lam: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        // The apex pole maps to ρ = 0; the opposite pole to a large finite radius.
        let lat = lat.clamp(-FRAC_PI_2 + EPS10, FRAC_PI_2 - EPS10);
        let rho = self.c * tsfn(lat, self.e).powf(self.n);
        let theta = self.n * lam;

        let ak0 = self.spheroid.a * self.k0;
        let x = ak0 * rho * theta.sin() + self.false_easting;
        let y = ak0 * (self.rho0 - rho * theta.cos()) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let ak0 = self.spheroid.a * self.k0;
        let mut x_ = (x - self.false_easting) / ak0;
        let mut y_ = self.rho0 - (y - self.false_northing) / ak0;
        let mut rho = x_.hypot(y_);

        if rho == 0.0 {
            return Ok((0.0, FRAC_PI_2.copysign(self.n)));
        }
        // For n < 0, flip signs before computing angle and radius
        if self.n < 0.0 {
            rho = -rho;
            x_ = -x_;
            y_ = -y_;
        }

        let ts = (rho / self.c).powf(1.0 / self.n);
        let lat = phi_from_ts(ts, self.e);
        let lam = x_.atan2(y_) / self.n; // atan2(x, y), not (y, x)

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

    fn deg(v: f64) -> f64 {
        v.to_radians()
    }

    fn lambert93() -> LambertConformalConic {
        LambertConformalConic::new(
            Spheroid::named("GRS80").unwrap(),
            deg(46.5),
            deg(44.0),
            deg(49.0),
            1.0,
            700_000.0,
            6_600_000.0,
        )
        .unwrap()
    }

    #[test]
    fn test_2sp_roundtrip() {
        let proj = lambert93();
        let lon0 = 3.0;
        let cases: &[(f64, f64)] = &[
            (3.0, 46.5),    // origin
            (2.35, 48.86),  // Paris
            (-1.55, 47.22), // Nantes
            (7.75, 48.58),  // Strasbourg
        ];
        for &(lon_deg, lat_deg) in cases {
            let lam = deg(lon_deg - lon0);
            let lat = deg(lat_deg);
            let (x, y) = proj.forward(lam, lat).unwrap();
            let (lam2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lam2, lam, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_1sp_roundtrip() {
        let proj = LambertConformalConic::new(Spheroid::wgs84(), deg(45.0), deg(45.0), deg(45.0), 0.9998, 0.0, 0.0)
            .unwrap();
        let lam = deg(5.0);
        let lat = deg(48.0);
        let (x, y) = proj.forward(lam, lat).unwrap();
        let (lam2, lat2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lam2, lam, epsilon = 1e-9);
        assert_relative_eq!(lat2, lat, epsilon = 1e-9);
    }

    #[test]
    fn test_origin_point() {
        let (x, y) = lambert93().forward(0.0, deg(46.5)).unwrap();
        assert_relative_eq!(x, 700_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 6_600_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_standard_parallels_have_unit_scale() {
        // Along a standard parallel, distance between meridians equals a·m(φ)·Δλ.
        let proj = lambert93();
        let grs80 = Spheroid::named("GRS80").unwrap();
        let dlam = 1e-7;
        for lat in [deg(44.0), deg(49.0)] {
            let (x0, y0) = proj.forward(0.0, lat).unwrap();
            let (x1, y1) = proj.forward(dlam, lat).unwrap();
            let expected = grs80.a * msfn(lat, grs80.e2) * dlam;
            assert_relative_eq!((x1 - x0).hypot(y1 - y0) / expected, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_southern_cone() {
        let proj = LambertConformalConic::new(Spheroid::wgs84(), deg(-32.0), deg(-28.0), deg(-36.0), 1.0, 0.0, 0.0)
            .unwrap();
        let (x, y) = proj.forward(deg(4.0), deg(-30.0)).unwrap();
        let (lam, lat) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lam, deg(4.0), epsilon = 1e-9);
        assert_relative_eq!(lat, deg(-30.0), epsilon = 1e-9);
    }

    #[test]
    fn test_poles_are_finite() {
        let proj = lambert93();
        for lat in [FRAC_PI_2, -FRAC_PI_2] {
            let (x, y) = proj.forward(0.2, lat).unwrap();
            assert!(x.is_finite() && y.is_finite());
        }
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        let result = LambertConformalConic::new(Spheroid::wgs84(), 0.0, deg(30.0), deg(-30.0), 1.0, 0.0, 0.0);
        assert!(matches!(result, Err(ProjError::InvalidParameter(_))));
    }

    #[test]
    fn test_polar_standard_parallels_rejected() {
        for (lat1, lat2) in [(90.0, 90.0), (-90.0, -90.0), (45.0, 90.0)] {
            let result = LambertConformalConic::new(Spheroid::wgs84(), 0.0, deg(lat1), deg(lat2), 1.0, 0.0, 0.0);
            assert!(matches!(result, Err(ProjError::InvalidParameter(_))), "{lat1} {lat2}");
        }
    }
}
