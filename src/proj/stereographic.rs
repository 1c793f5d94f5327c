//! Stereographic projections.
//!
//! [`Stereographic`] covers `stere` and `ups`: polar aspect (EPSG:3031, 3413,
//! UPS) with either a latitude of true scale or a scale factor at the pole,
//! plus equatorial and oblique aspects on the conformal sphere.
//!
//! [`ObliqueStereographic`] is `sterea` (double stereographic, e.g. RD New):
//! the ellipsoid is first mapped conformally onto a Gaussian sphere, which is
//! then projected stereographically.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{tsfn, EPS10};
use crate::proj::Projection;

const POLAR_ITERATIONS: usize = 8;
const POLAR_TOLERANCE: f64 = 1e-10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Aspect {
    NorthPole,
    SouthPole,
    Equatorial,
    Oblique,
}

/// tan(π/4 + φ/2) · ((1 − e·sinφ)/(1 + e·sinφ))^(e/2)
fn ssfn(phi: f64, e: f64) -> f64 {
    let con = e * phi.sin();
    (0.5 * (FRAC_PI_2 + phi)).tan() * ((1.0 - con) / (1.0 + con)).powf(0.5 * e)
}

pub struct Stereographic {
    spheroid: Spheroid,
    aspect: Aspect,
    e: f64,
    akm1: f64,
    sin_x1: f64,
    cos_x1: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Stereographic {
    /// `lat_ts` only matters for the polar aspect; at the pole itself `k0` sets the scale.
    pub fn new(spheroid: Spheroid, lat0: f64, lat_ts: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let e = spheroid.eccentricity();
        let aspect = if (lat0.abs() - FRAC_PI_2).abs() < EPS10 {
            if lat0 < 0.0 {
                Aspect::SouthPole
            } else {
                Aspect::NorthPole
            }
        } else if lat0.abs() > EPS10 {
            Aspect::Oblique
        } else {
            Aspect::Equatorial
        };

        let (mut sin_x1, mut cos_x1) = (0.0, 1.0);
        let akm1 = match aspect {
            Aspect::NorthPole | Aspect::SouthPole => {
                let ts = lat_ts.abs();
                if (ts - FRAC_PI_2).abs() < EPS10 {
                    2.0 * k0 / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt()
                } else {
                    let t = e * ts.sin();
                    ts.cos() / tsfn(ts, e) / (1.0 - t * t).sqrt()
                }
            }
            Aspect::Equatorial => 2.0 * k0,
            Aspect::Oblique => {
                let x1 = 2.0 * ssfn(lat0, e).atan() - FRAC_PI_2;
                (sin_x1, cos_x1) = x1.sin_cos();
                let t = e * lat0.sin();
                2.0 * k0 * lat0.cos() / (1.0 - t * t).sqrt()
            }
        };

        Self {
            spheroid,
            aspect,
            e,
            akm1,
            sin_x1,
            cos_x1,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for Stereographic {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError> {
        let (sinlam, mut coslam) = lam.sin_cos();

        let (x, y) = match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                let chi = 2.0 * ssfn(phi, self.e).atan() - FRAC_PI_2;
                let (sin_x, cos_x) = chi.sin_cos();
                let (a, y) = if self.aspect == Aspect::Oblique {
                    let denom = self.cos_x1 * (1.0 + self.sin_x1 * sin_x + self.cos_x1 * cos_x * coslam);
                    let a = self.akm1 / denom.max(EPS10);
                    (a, a * (self.cos_x1 * sin_x - self.sin_x1 * cos_x * coslam))
                } else {
                    let denom = 1.0 + cos_x * coslam;
                    let a = self.akm1 / denom.max(EPS10);
                    (a, a * sin_x)
                };
                (a * cos_x * sinlam, y)
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                let mut phi = phi;
                if self.aspect == Aspect::SouthPole {
                    phi = -phi;
                    coslam = -coslam;
                }
                // The opposite pole is at infinity.
                let phi = phi.max(-FRAC_PI_2 + EPS10);
                let r = self.akm1 * tsfn(phi, self.e);
                (r * sinlam, -r * coslam)
            }
        };

        let a = self.spheroid.a;
        Ok((a * x + self.false_easting, a * y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.spheroid.a;
        let mut x = (x - self.false_easting) / a;
        let mut y = (y - self.false_northing) / a;
        let rho = x.hypot(y);

        let (tp, mut phi_l, halfpi, halfe) = match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                let t = 2.0 * (rho * self.cos_x1).atan2(self.akm1);
                let (sinphi, cosphi) = t.sin_cos();
                let phi_l = if rho == 0.0 {
                    (cosphi * self.sin_x1).asin()
                } else {
                    (cosphi * self.sin_x1 + y * sinphi * self.cos_x1 / rho).clamp(-1.0, 1.0).asin()
                };
                x *= sinphi;
                y = rho * self.cos_x1 * cosphi - y * self.sin_x1 * sinphi;
                ((0.5 * (FRAC_PI_2 + phi_l)).tan(), phi_l, FRAC_PI_2, 0.5 * self.e)
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                if self.aspect == Aspect::NorthPole {
                    y = -y;
                }
                let tp = -rho / self.akm1;
                (tp, FRAC_PI_2 - 2.0 * (-tp).atan(), -FRAC_PI_2, -0.5 * self.e)
            }
        };

        let mut phi = phi_l;
        for _ in 0..POLAR_ITERATIONS {
            let sinphi = self.e * phi_l.sin();
            phi = 2.0 * (tp * ((1.0 + sinphi) / (1.0 - sinphi)).powf(halfe)).atan() - halfpi;
            if (phi_l - phi).abs() < POLAR_TOLERANCE {
                break;
            }
            phi_l = phi;
        }
        if self.aspect == Aspect::SouthPole {
            phi = -phi;
        }

        let lam = if x == 0.0 && y == 0.0 { 0.0 } else { x.atan2(y) };
        Ok((lam, phi))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}

const GAUSS_ITERATIONS: usize = 20;
const GAUSS_TOLERANCE: f64 = 1e-14;

/// ((1 − e·sinφ)/(1 + e·sinφ))^exp
fn srat(esinp: f64, exp: f64) -> f64 {
    ((1.0 - esinp) / (1.0 + esinp)).powf(exp)
}

/// Oblique (double) stereographic projection.
pub struct ObliqueStereographic {
    spheroid: Spheroid,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    // Gaussian sphere constants
    e: f64,
    c: f64,
    k: f64,
    ratexp: f64,
    chi0: f64,
    sin_chi0: f64,
    cos_chi0: f64,
    r2: f64,
}

impl ObliqueStereographic {
    pub fn new(spheroid: Spheroid, lat0: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let e = spheroid.eccentricity();
        let es = spheroid.e2;
        let sphi = lat0.sin();
        let cphi2 = lat0.cos().powi(2);

        let rc = (1.0 - es).sqrt() / (1.0 - es * sphi * sphi);
        let c = (1.0 + es * cphi2 * cphi2 / (1.0 - es)).sqrt();
        let chi0 = (sphi / c).asin();
        let ratexp = 0.5 * c * e;
        let k = (0.5 * chi0 + FRAC_PI_4).tan() / ((0.5 * lat0 + FRAC_PI_4).tan().powf(c) * srat(e * sphi, ratexp));

        Self {
            spheroid,
            k0,
            false_easting,
            false_northing,
            e,
            c,
            k,
            ratexp,
            chi0,
            sin_chi0: chi0.sin(),
            cos_chi0: chi0.cos(),
            r2: 2.0 * rc,
        }
    }

    /// Geodetic (Δλ, φ) to Gaussian sphere (Λ, χ).
    fn to_sphere(&self, lam: f64, phi: f64) -> (f64, f64) {
        let chi = 2.0
            * (self.k * (0.5 * phi + FRAC_PI_4).tan().powf(self.c) * srat(self.e * phi.sin(), self.ratexp)).atan()
            - FRAC_PI_2;
        (self.c * lam, chi)
    }

    /// Gaussian sphere (Λ, χ) back to geodetic (Δλ, φ).
    fn from_sphere(&self, lam: f64, chi: f64) -> (f64, f64) {
        let num = ((0.5 * chi + FRAC_PI_4).tan() / self.k).powf(1.0 / self.c);
        let mut phi = chi;
        for _ in 0..GAUSS_ITERATIONS {
            let next = 2.0 * (num * srat(self.e * phi.sin(), -0.5 * self.e)).atan() - FRAC_PI_2;
            let converged = (next - phi).abs() < GAUSS_TOLERANCE;
            phi = next;
            if converged {
                break;
            }
        }
        (lam / self.c, phi)
    }
}

impl Projection for ObliqueStereographic {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError> {
        let (lam, chi) = self.to_sphere(lam, phi);
        let (sinc, cosc) = chi.sin_cos();
        let (sinl, cosl) = lam.sin_cos();
        let denom = 1.0 + self.sin_chi0 * sinc + self.cos_chi0 * cosc * cosl;
        let k = self.k0 * self.r2 / denom.max(EPS10);

        let a = self.spheroid.a;
        let x = a * k * cosc * sinl + self.false_easting;
        let y = a * k * (self.cos_chi0 * sinc - self.sin_chi0 * cosc * cosl) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let scale = self.spheroid.a * self.k0;
        let xd = (x - self.false_easting) / scale;
        let yd = (y - self.false_northing) / scale;
        let rho = xd.hypot(yd);

        let (lam, chi) = if rho != 0.0 {
            let c = 2.0 * rho.atan2(self.r2);
            let (sin_c, cos_c) = c.sin_cos();
            let chi = (cos_c * self.sin_chi0 + yd * sin_c * self.cos_chi0 / rho).clamp(-1.0, 1.0).asin();
            let lam = (xd * sin_c).atan2(rho * self.cos_chi0 * cos_c - yd * self.sin_chi0 * sin_c);
            (lam, chi)
        } else {
            (0.0, self.chi0)
        };

        Ok(self.from_sphere(lam, chi))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}
