pub mod albers_equal_area;
pub mod common;
pub mod equirectangular;
pub mod lambert_azimuthal;
pub mod lambert_conformal;
pub mod mercator;
pub mod pipeline;
pub mod registry;
pub mod sinusoidal;
pub mod stereographic;
pub mod transverse_mercator;

use crate::crs::Spheroid;
use crate::error::ProjError;

/// Trait for map projections supporting forward and inverse transforms.
///
/// Longitudes are relative to the central meridian: the caller subtracts
/// `lon_0` (and wraps, unless `over` is set) before `forward`, and adds it back
/// after `inverse`. Planar coordinates are metres with the false origin applied.
pub trait Projection: Send + Sync {
    /// Forward: (Δλ_rad, φ_rad) -> (easting, northing)
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError>;

    /// Inverse: (easting, northing) -> (Δλ_rad, φ_rad)
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError>;

    /// Batch forward transform (default: loop).
    fn forward_batch(&self, coords: &mut [(f64, f64)]) -> Result<(), ProjError> {
        for c in coords.iter_mut() {
            *c = self.forward(c.0, c.1)?;
        }
        Ok(())
    }

    /// Batch inverse transform.
    fn inverse_batch(&self, coords: &mut [(f64, f64)]) -> Result<(), ProjError> {
        for c in coords.iter_mut() {
            *c = self.inverse(c.0, c.1)?;
        }
        Ok(())
    }

    fn spheroid(&self) -> &Spheroid;
}
