//! Coordinate reprojection: CRS descriptors, map projections, datum shifts
//! and raster affine transforms.
//!
//! ```
//! use _rust::{reproject_points, ProjectionInfo};
//!
//! let wgs84 = ProjectionInfo::from_epsg_code(4326)?;
//! let bng = ProjectionInfo::from_epsg_code(27700)?;
//! let mut xy = [465_000.0, 170_000.0];
//! reproject_points(&mut xy, None, &bng, &wgs84, 0, 1)?;
//! assert!((xy[0] + 1.0665).abs() < 1e-3);
//! # Ok::<(), _rust::ProjError>(())
//! ```

pub mod affine;
pub mod cell;
pub mod config;
pub mod crs;
pub mod datum;
pub mod error;
pub mod proj;
pub mod reproject;

#[cfg(feature = "python")]
mod py;

pub use affine::AffineTransform;
pub use cell::RcIndex;
pub use config::{MissingGridPolicy, RuntimeConfiguration};
pub use crs::{Datum, DatumMethod, GeographicInfo, ProjectionInfo, Spheroid};
pub use error::{ProjError, Result};
pub use proj::pipeline::Pipeline;
pub use proj::registry::ProjectionMethod;
pub use reproject::{par_reproject_points, reproject_points};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py::register(m)?;
    Ok(())
}
