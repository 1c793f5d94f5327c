//! Transverse Mercator projection (Gauss-Krüger).
//!
//! Geodetic latitude goes through the conformal sphere, then the Krüger
//! series in the third flattening `n` (6th order) maps between conformal and
//! rectifying coordinates. The series are summed with Clenshaw's recurrence
//! on the complex argument ξ + iη. Accurate to well under a millimetre within
//! a few thousand kilometres of the central meridian; serves `tmerc`,
//! `etmerc` and every UTM and Japanese plane rectangular zone.

use crate::crs::Spheroid;
use crate::error::ProjError;
use crate::proj::common::{phi_from_ts, tsfn};
use crate::proj::Projection;

/// |η| bound that keeps the hyperbolic terms finite far outside the domain.
const ETA_LIMIT: f64 = 20.0;

/// Forward (conformal to rectifying) coefficients. Row j holds the factors of
/// n¹..n⁶ in α_{j+1}.
const ALPHA: [[f64; 6]; 6] = [
    [1.0 / 2.0, -2.0 / 3.0, 5.0 / 16.0, 41.0 / 180.0, -127.0 / 288.0, 7891.0 / 37800.0],
    [0.0, 13.0 / 48.0, -3.0 / 5.0, 557.0 / 1440.0, 281.0 / 630.0, -1983433.0 / 1935360.0],
    [0.0, 0.0, 61.0 / 240.0, -103.0 / 140.0, 15061.0 / 26880.0, 167603.0 / 181440.0],
    [0.0, 0.0, 0.0, 49561.0 / 161280.0, -179.0 / 168.0, 6601661.0 / 7257600.0],
    [0.0, 0.0, 0.0, 0.0, 34729.0 / 80640.0, -3418889.0 / 1995840.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 212378941.0 / 319334400.0],
];

/// Inverse (rectifying to conformal) coefficients, same layout as [`ALPHA`].
const BETA: [[f64; 6]; 6] = [
    [1.0 / 2.0, -2.0 / 3.0, 37.0 / 96.0, -1.0 / 360.0, -81.0 / 512.0, 96199.0 / 604800.0],
    [0.0, 1.0 / 48.0, 1.0 / 15.0, -437.0 / 1440.0, 46.0 / 105.0, -1118711.0 / 3870720.0],
    [0.0, 0.0, 17.0 / 480.0, -37.0 / 840.0, -209.0 / 4480.0, 5569.0 / 90720.0],
    [0.0, 0.0, 0.0, 4397.0 / 161280.0, -11.0 / 504.0, -830251.0 / 7257600.0],
    [0.0, 0.0, 0.0, 0.0, 4583.0 / 161280.0, -108847.0 / 3991680.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 20648693.0 / 638668800.0],
];

/// Rectifying latitude μ(φ) coefficients: factors of n¹..n⁴ for sin 2kφ.
const MU: [[f64; 4]; 4] = [
    [-3.0 / 2.0, 0.0, 9.0 / 16.0, 0.0],
    [0.0, 15.0 / 16.0, 0.0, -15.0 / 32.0],
    [0.0, 0.0, -35.0 / 48.0, 0.0],
    [0.0, 0.0, 0.0, 315.0 / 512.0],
];

/// Σ c_i·n^(i+1) by Horner's rule.
fn poly_in_n<const N: usize>(row: &[f64; N], n: f64) -> f64 {
    row.iter().rev().fold(0.0, |acc, c| acc * n + c) * n
}

/// Σ a_k·sin(2kζ) for complex ζ = ξ + iη, returned as (re, im).
fn clenshaw_sin(coeffs: &[f64; 6], xi: f64, eta: f64) -> (f64, f64) {
    let (s, c) = (2.0 * xi).sin_cos();
    let (sh, ch) = ((2.0 * eta).sinh(), (2.0 * eta).cosh());
    // 2·cos 2ζ
    let (rr, ri) = (2.0 * c * ch, -2.0 * s * sh);

    let (mut b1, mut b2) = ((0.0, 0.0), (0.0, 0.0));
    for &a in coeffs.iter().rev() {
        let next = (a + rr * b1.0 - ri * b1.1 - b2.0, rr * b1.1 + ri * b1.0 - b2.1);
        b2 = b1;
        b1 = next;
    }
    // sin 2ζ · b₁
    let (sr, si) = (s * ch, c * sh);
    (sr * b1.0 - si * b1.1, sr * b1.1 + si * b1.0)
}

pub struct TransverseMercator {
    spheroid: Spheroid,
    e: f64,
    /// k₀ times the rectifying radius.
    scale: f64,
    false_easting: f64,
    false_northing: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
    /// Rectifying latitude of the latitude of origin.
    mu0: f64,
}

impl TransverseMercator {
    pub fn new(spheroid: Spheroid, lat0: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let n = spheroid.n;
        let n2 = n * n;
        let rectifying_radius = spheroid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        let alpha = ALPHA.map(|row| poly_in_n(&row, n));
        let beta = BETA.map(|row| poly_in_n(&row, n));
        let mu0 = MU
            .iter()
            .enumerate()
            .fold(lat0, |mu, (k, row)| mu + poly_in_n(row, n) * (2.0 * (k + 1) as f64 * lat0).sin());

        Self {
            e: spheroid.eccentricity(),
            spheroid,
            scale: k0 * rectifying_radius,
            false_easting,
            false_northing,
            alpha,
            beta,
            mu0,
        }
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError> {
        let chi = std::f64::consts::FRAC_PI_2 - 2.0 * tsfn(phi, self.e).atan();
        let (sin_chi, cos_chi) = chi.sin_cos();
        let (sin_lam, cos_lam) = lam.sin_cos();

        let xi_c = sin_chi.atan2(cos_chi * cos_lam);
        let denom = sin_chi.hypot(cos_chi * cos_lam).max(1e-15);
        let eta_c = (cos_chi * sin_lam / denom).asinh().clamp(-ETA_LIMIT, ETA_LIMIT);

        let (dxi, deta) = clenshaw_sin(&self.alpha, xi_c, eta_c);
        let x = self.scale * (eta_c + deta) + self.false_easting;
        let y = self.scale * (xi_c + dxi - self.mu0) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let xi = (y - self.false_northing) / self.scale + self.mu0;
        let eta = ((x - self.false_easting) / self.scale).clamp(-ETA_LIMIT, ETA_LIMIT);

        let (dxi, deta) = clenshaw_sin(&self.beta, xi, eta);
        let (xi_c, eta_c) = (xi - dxi, eta - deta);

        let (sin_xi, cos_xi) = xi_c.sin_cos();
        let sinh_eta = eta_c.sinh();
        let chi = sin_xi.atan2(sinh_eta.hypot(cos_xi));
        let phi = phi_from_ts((std::f64::consts::FRAC_PI_4 - 0.5 * chi).tan(), self.e);
        Ok((sinh_eta.atan2(cos_xi), phi))
    }

    fn spheroid(&self) -> &Spheroid {
        &self.spheroid
    }
}
