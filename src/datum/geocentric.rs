//! Geodetic ↔ geocentric (earth-centred, earth-fixed) coordinates.

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;

const TOLERANCE: f64 = 1e-14;
const MAX_ITERATIONS: usize = 30;

/// (λ, φ, h) in radians and metres to geocentric (X, Y, Z) in metres.
pub fn geodetic_to_geocentric(spheroid: &Spheroid, lon: f64, lat: f64, h: f64) -> (f64, f64, f64) {
    let lat = lat.clamp(-FRAC_PI_2, FRAC_PI_2);
    let (sinlat, coslat) = lat.sin_cos();
    let (sinlon, coslon) = lon.sin_cos();
    // prime vertical radius of curvature
    let nu = spheroid.a / (1.0 - spheroid.e2 * sinlat * sinlat).sqrt();
    (
        (nu + h) * coslat * coslon,
        (nu + h) * coslat * sinlon,
        (nu * (1.0 - spheroid.e2) + h) * sinlat,
    )
}

/// Geocentric (X, Y, Z) back to (λ, φ, h), by fixed-point iteration on φ.
pub fn geocentric_to_geodetic(spheroid: &Spheroid, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let a = spheroid.a;
    let e2 = spheroid.e2;
    let p = x.hypot(y);

    if p < 1e-9 * a {
        // On the polar axis.
        let lat = if z < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
        return (0.0, lat, z.abs() - spheroid.b);
    }

    let lon = y.atan2(x);
    let mut lat = (z / (p * (1.0 - e2))).atan();
    for _ in 0..MAX_ITERATIONS {
        let sinlat = lat.sin();
        let nu = a / (1.0 - e2 * sinlat * sinlat).sqrt();
        let h = p / lat.cos() - nu;
        let next = (z / (p * (1.0 - e2 * nu / (nu + h)))).atan();
        let delta = (next - lat).abs();
        lat = next;
        if delta < TOLERANCE {
            break;
        }
    }

    let (sinlat, coslat) = lat.sin_cos();
    let w = (1.0 - e2 * sinlat * sinlat).sqrt();
    let h = p * coslat + z * sinlat - a * w;
    (lon, lat, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equator_prime_meridian() {
        let (x, y, z) = geodetic_to_geocentric(&Spheroid::wgs84(), 0.0, 0.0, 0.0);
        assert_relative_eq!(x, 6_378_137.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pole() {
        let wgs84 = Spheroid::wgs84();
        let (x, y, z) = geodetic_to_geocentric(&wgs84, 1.0, FRAC_PI_2, 10.0);
        assert_relative_eq!(x.hypot(y), 0.0, epsilon = 1e-6);
        assert_relative_eq!(z, wgs84.b + 10.0, epsilon = 1e-6);
        let (_, lat, h) = geocentric_to_geodetic(&wgs84, 0.0, 0.0, -wgs84.b);
        assert_eq!(lat, -FRAC_PI_2);
        assert_relative_eq!(h, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let spheroids = [Spheroid::wgs84(), Spheroid::named("bessel").unwrap(), Spheroid::sphere(6_371_000.0)];
        for spheroid in &spheroids {
            for &(lon, lat, h) in &[(0.3, 0.9, 120.0), (-2.5, -0.4, -35.0), (3.1, 1.5, 5000.0), (0.0, 0.0, 0.0)] {
                let (x, y, z) = geodetic_to_geocentric(spheroid, lon, lat, h);
                let (lon2, lat2, h2) = geocentric_to_geodetic(spheroid, x, y, z);
                assert_relative_eq!(lon2, lon, epsilon = 1e-12);
                assert_relative_eq!(lat2, lat, epsilon = 1e-12);
                assert_relative_eq!(h2, h, epsilon = 1e-6);
            }
        }
    }
}
