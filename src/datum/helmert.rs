//! Seven-parameter similarity (Helmert) transform between geocentric frames.
//!
//! Position vector convention, as used by PROJ.4 `+towgs84`:
//!
//!   X_wgs84 = T + (1 + s)·R·X
//!
//! with rotations given in arc-seconds and the scale in parts per million.

use crate::crs::DatumMethod;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Helmert {
    dx: f64,
    dy: f64,
    dz: f64,
    rx: f64,
    ry: f64,
    rz: f64,
    m: f64, // 1 + s
}

impl Helmert {
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            dx,
            dy,
            dz,
            rx: 0.0,
            ry: 0.0,
            rz: 0.0,
            m: 1.0,
        }
    }

    /// Build from `towgs84` values: metres, arc-seconds, ppm.
    pub fn from_towgs84(p: &[f64; 7]) -> Self {
        Self {
            dx: p[0],
            dy: p[1],
            dz: p[2],
            rx: p[3] * ARCSEC_TO_RAD,
            ry: p[4] * ARCSEC_TO_RAD,
            rz: p[5] * ARCSEC_TO_RAD,
            m: 1.0 + p[6] * 1e-6,
        }
    }

    /// The shift to WGS84 of a Helmert family datum method.
    pub fn for_method(method: &DatumMethod) -> Option<Self> {
        match method {
            DatumMethod::Wgs84 => Some(Self::translation(0.0, 0.0, 0.0)),
            DatumMethod::Param3([dx, dy, dz]) => Some(Self::translation(*dx, *dy, *dz)),
            DatumMethod::Param7(p) => Some(Self::from_towgs84(p)),
            DatumMethod::GridShift(_) | DatumMethod::Unknown => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::translation(0.0, 0.0, 0.0)
    }

    /// Local frame to WGS84.
    pub fn to_wgs84(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        (
            self.dx + self.m * (x - self.rz * y + self.ry * z),
            self.dy + self.m * (self.rz * x + y - self.rx * z),
            self.dz + self.m * (-self.ry * x + self.rx * y + z),
        )
    }

    /// WGS84 to the local frame, using the transposed rotation.
    pub fn from_wgs84(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let xt = (x - self.dx) / self.m;
        let yt = (y - self.dy) / self.m;
        let zt = (z - self.dz) / self.m;
        (
            xt + self.rz * yt - self.ry * zt,
            -self.rz * xt + yt + self.rx * zt,
            self.ry * xt - self.rx * yt + zt,
        )
    }
}
