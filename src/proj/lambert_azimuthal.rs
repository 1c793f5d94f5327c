//! Lambert Azimuthal Equal-Area projection in its polar, equatorial and oblique aspects.
//!
//! Works on the authalic sphere: geodetic latitude φ maps to authalic latitude
//! β = asin(q(φ)/q_p), projected with the spherical formulas and scaled so that
//! areas are preserved. On a sphere q(φ) = 2·sinφ and β = φ.
//!
//! Oblique aspect (centre φ₀ with authalic β₁):
//!   b = √(2 / (1 + sinβ₁·sinβ + cosβ₁·cosβ·cosΔλ))
//!   x = a·x_m·b·cosβ·sinΔλ
//!   y = a·y_m·b·(cosβ₁·sinβ − sinβ₁·cosβ·cosΔλ)
//!
//! The squared cosine of β is clamped at zero. Rounding can push |q/q_p| just
//! past one near the pole, and the square root would then return NaN.

use std::f64::consts::FRAC_PI_2;

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{authalic_coefficients, authalic_to_geodetic, qsfn, EPS10};
use crate::proj::Projection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Aspect {
    NorthPole,
    SouthPole,
    Equatorial,
    Oblique,
}

pub struct LambertAzimuthalEqualArea {
    spheroid: Spheroid,
    aspect: Aspect,
    e: f64,
    phi0: f64,
    qp: f64,
    rq: f64,
    dd: f64,
    xmf: f64,
    ymf: f64,
    sinb1: f64,
    cosb1: f64,
    apa: [f64; 3],
    false_easting: f64,
    false_northing: f64,
}

impl LambertAzimuthalEqualArea {
    pub fn new(spheroid: Spheroid, lat0: f64, false_easting: f64, false_northing: f64) -> Self {
        let e = spheroid.eccentricity();
        let aspect = if (lat0.abs() - FRAC_PI_2).abs() < EPS10 {
            if lat0 < 0.0 {
                Aspect::SouthPole
            } else {
                Aspect::NorthPole
            }
        } else if lat0.abs() < EPS10 {
            Aspect::Equatorial
        } else {
            Aspect::Oblique
        };

        let qp = qsfn(FRAC_PI_2, e);
        let rq = (0.5 * qp).sqrt();
        let (mut dd, mut xmf, mut ymf, mut sinb1, mut cosb1) = (1.0, 1.0, 1.0, 0.0, 1.0);
        match aspect {
            Aspect::NorthPole | Aspect::SouthPole => {}
            Aspect::Equatorial => {
                dd = 1.0 / rq;
                ymf = 0.5 * qp;
            }
            Aspect::Oblique => {
                let sinphi = lat0.sin();
                sinb1 = qsfn(lat0, e) / qp;
                cosb1 = (1.0 - sinb1 * sinb1).max(0.0).sqrt();
                dd = lat0.cos() / ((1.0 - spheroid.e2 * sinphi * sinphi).sqrt() * rq * cosb1);
                xmf = rq * dd;
                ymf = rq / dd;
            }
        }

        Self {
            apa: authalic_coefficients(spheroid.e2),
            spheroid,
            aspect,
            e,
            phi0: lat0,
            qp,
            rq,
            dd,
            xmf,
            ymf,
            sinb1,
            cosb1,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for LambertAzimuthalEqualArea {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError> {
        let (sinlam, coslam) = lam.sin_cos();
        let q = qsfn(phi, self.e);

        let (x, y) = match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                let sinb = (q / self.qp).clamp(-1.0, 1.0);
                let cosb = (1.0 - sinb * sinb).max(0.0).sqrt();
                let denom = if self.aspect == Aspect::Oblique {
                    1.0 + self.sinb1 * sinb + self.cosb1 * cosb * coslam
                } else {
                    1.0 + cosb * coslam
                };
                // The antipode of the centre is a singularity.
                let b = (2.0 / denom.max(EPS10)).sqrt();
                if self.aspect == Aspect::Oblique {
                    (
                        self.xmf * b * cosb * sinlam,
                        self.ymf * b * (self.cosb1 * sinb - self.sinb1 * cosb * coslam),
                    )
                } else {
                    (self.xmf * b * cosb * sinlam, self.ymf * b * sinb)
                }
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                let q = if self.aspect == Aspect::NorthPole { self.qp - q } else { self.qp + q };
                let b = q.max(0.0).sqrt();
                let y = if self.aspect == Aspect::NorthPole { -b * coslam } else { b * coslam };
                (b * sinlam, y)
            }
        };

        let a = self.spheroid.a;
        Ok((a * x + self.false_easting, a * y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.spheroid.a;
        let mut x = (x - self.false_easting) / a;
        let mut y = (y - self.false_northing) / a;

        let ab = match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                x /= self.dd;
                y *= self.dd;
                let rho = x.hypot(y);
                if rho < EPS10 {
                    return Ok((0.0, self.phi0));
                }
                let sce = 2.0 * (0.5 * rho / self.rq).clamp(-1.0, 1.0).asin();
                let (s, c) = sce.sin_cos();
                x *= s;
                if self.aspect == Aspect::Oblique {
                    let ab = c * self.sinb1 + y * s * self.cosb1 / rho;
                    y = rho * self.cosb1 * c - y * self.sinb1 * s;
                    ab
                } else {
                    let ab = y * s / rho;
                    y = rho * c;
                    ab
                }
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                if self.aspect == Aspect::NorthPole {
                    y = -y;
                }
                let q = x * x + y * y;
                if q == 0.0 {
                    return Ok((0.0, self.phi0));
                }
                let ab = 1.0 - q / self.qp;
                if self.aspect == Aspect::SouthPole {
                    -ab
                } else {
                    ab
                }
            }
        };

        let lam = x.atan2(y);
        let phi = authalic_to_geodetic(ab.clamp(-1.0, 1.0).asin(), &self.apa);
        Ok((lam, phi))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}
