//! Common helpers for projection math (meridional arc, latitude conversions, etc.).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::crs::Spheroid;

/// Latitudes closer than this to a pole are treated as the pole.
pub const EPS10: f64 = 1e-10;

/// Wrap a longitude into [-π, π]. Values already within range (with a small
/// slack) are returned untouched.
pub fn adjlon(lon: f64) -> f64 {
    if !lon.is_finite() || lon.abs() < PI + 1e-12 {
        return lon;
    }
    let shifted = lon + PI;
    shifted - TAU * (shifted / TAU).floor() - PI
}

/// Isometric latitude helper t(φ) = tan(π/4 − φ/2) / ((1 − e·sinφ)/(1 + e·sinφ))^(e/2).
pub fn tsfn(phi: f64, e: f64) -> f64 {
    let sinphi = phi.sin();
    let con = e * sinphi;
    (FRAC_PI_4 - 0.5 * phi).tan() / ((1.0 - con) / (1.0 + con)).powf(0.5 * e)
}

/// m(φ) = cosφ / √(1 − e²·sin²φ).
pub fn msfn(phi: f64, e2: f64) -> f64 {
    let sinphi = phi.sin();
    phi.cos() / (1.0 - e2 * sinphi * sinphi).sqrt()
}

/// Latitude from the isometric helper t, inverse of [`tsfn`].
pub fn phi_from_ts(ts: f64, e: f64) -> f64 {
    let half_e = 0.5 * e;
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..15 {
        let con = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(half_e)).atan();
        let delta = next - phi;
        phi = next;
        if delta.abs() < 1e-14 {
            break;
        }
    }
    phi
}

/// Authalic helper q(φ) = (1 − e²)·(sinφ/(1 − e²sin²φ) − ln((1 − e·sinφ)/(1 + e·sinφ))/(2e)).
/// Reduces to 2·sinφ on the sphere.
pub fn qsfn(phi: f64, e: f64) -> f64 {
    let sinphi = phi.sin();
    if e < 1e-7 {
        return 2.0 * sinphi;
    }
    let con = e * sinphi;
    (1.0 - e * e) * (sinphi / (1.0 - con * con) - (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln())
}

/// Series coefficients for converting authalic latitude back to geodetic.
pub fn authalic_coefficients(e2: f64) -> [f64; 3] {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    [
        e2 / 3.0 + 31.0 / 180.0 * e4 + 517.0 / 5040.0 * e6,
        23.0 / 360.0 * e4 + 251.0 / 3780.0 * e6,
        761.0 / 45360.0 * e6,
    ]
}

/// Geodetic latitude from authalic latitude β.
pub fn authalic_to_geodetic(beta: f64, apa: &[f64; 3]) -> f64 {
    let t = 2.0 * beta;
    beta + apa[0] * t.sin() + apa[1] * (2.0 * t).sin() + apa[2] * (3.0 * t).sin()
}

/// Compute the meridional arc length from the equator to latitude phi.
/// Uses the series expansion in powers of n (third flattening).
pub fn meridional_arc(spheroid: &Spheroid, phi: f64) -> f64 {
    let n = spheroid.n;
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;

    let a = spheroid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

    let a2 = -3.0 / 2.0 * n + 9.0 / 16.0 * n3;
    let a4 = 15.0 / 16.0 * n2 - 15.0 / 32.0 * n4;
    let a6 = -35.0 / 48.0 * n3;
    let a8 = 315.0 / 512.0 * n4;

    a * (phi + a2 * (2.0 * phi).sin() + a4 * (4.0 * phi).sin() + a6 * (6.0 * phi).sin() + a8 * (8.0 * phi).sin())
}

/// Latitude whose meridional arc is `m`, by Newton iteration on [`meridional_arc`].
pub fn inverse_meridional_arc(spheroid: &Spheroid, m: f64) -> f64 {
    let e2 = spheroid.e2;
    let mut phi = m / (spheroid.a * (1.0 - e2 / 4.0));
    for _ in 0..20 {
        let s = phi.sin();
        let w = 1.0 - e2 * s * s;
        // dM/dφ is the meridian radius of curvature.
        let rho = spheroid.a * (1.0 - e2) / (w * w.sqrt());
        let delta = (meridional_arc(spheroid, phi) - m) / rho;
        phi -= delta;
        if delta.abs() < 1e-14 {
            break;
        }
    }
    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_meridional_arc_equator() {
        let m = meridional_arc(&Spheroid::wgs84(), 0.0);
        assert_relative_eq!(m, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_meridional_arc_positive() {
        let m = meridional_arc(&Spheroid::wgs84(), FRAC_PI_4);
        // Arc to 45 degrees on WGS84 is 4984944.378 m.
        assert_relative_eq!(m, 4_984_944.378, epsilon = 1e-3);
    }

    #[test]
    fn test_inverse_meridional_arc() {
        let wgs84 = Spheroid::wgs84();
        for lat in [-89.0_f64, -45.0, -1.0, 0.0, 10.0, 60.0, 89.9] {
            let phi = lat.to_radians();
            let m = meridional_arc(&wgs84, phi);
            assert_relative_eq!(inverse_meridional_arc(&wgs84, m), phi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_adjlon() {
        assert_eq!(adjlon(1.0), 1.0);
        assert_eq!(adjlon(PI), PI);
        assert_relative_eq!(adjlon((-445.0_f64).to_radians()), (-85.0_f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(adjlon(190.0_f64.to_radians()), (-170.0_f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(adjlon((-190.0_f64).to_radians()), 170.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_tsfn_inverse() {
        let e = Spheroid::wgs84().eccentricity();
        for lat in [-80.0_f64, -30.0, 0.0, 45.0, 89.0] {
            let phi = lat.to_radians();
            assert_relative_eq!(phi_from_ts(tsfn(phi, e), e), phi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_authalic_round_trip() {
        let wgs84 = Spheroid::wgs84();
        let e = wgs84.eccentricity();
        let qp = qsfn(FRAC_PI_2, e);
        let apa = authalic_coefficients(wgs84.e2);
        for lat in [-60.0_f64, 0.0, 30.0, 52.0, 85.0] {
            let phi = lat.to_radians();
            let beta = (qsfn(phi, e) / qp).asin();
            assert_relative_eq!(authalic_to_geodetic(beta, &apa), phi, epsilon = 1e-9);
        }
        assert_relative_eq!(qsfn(0.5, 0.0), 2.0 * 0.5_f64.sin());
    }
}
