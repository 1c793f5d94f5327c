//! PyO3 binding for in-place point reprojection.

use numpy::PyReadwriteArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::crs::ProjectionInfo;
use crate::py::to_py_err;

/// Reproject points in place.
///
/// Args:
///     xy: 1D contiguous f64 array of interleaved x, y values.
///     z: Optional 1D contiguous f64 array of heights, one per point.
///     source: Source CRS (EPSG code, PROJ.4 string, WKT or catalog name).
///     target: Target CRS, same forms as `source`.
///     start_index: First point to transform.
///     num_points: Number of points; defaults to every point from `start_index`.
///     parallel: Process chunks of points on the rayon thread pool.
#[pyfunction]
#[pyo3(signature = (xy, source, target, z=None, start_index=0, num_points=None, parallel=false))]
#[allow(clippy::too_many_arguments)]
pub fn reproject_points<'py>(
    py: Python<'py>,
    mut xy: PyReadwriteArray1<'py, f64>,
    source: &str,
    target: &str,
    z: Option<PyReadwriteArray1<'py, f64>>,
    start_index: usize,
    num_points: Option<usize>,
    parallel: bool,
) -> PyResult<()> {
    let source: ProjectionInfo = source.parse().map_err(to_py_err)?;
    let target: ProjectionInfo = target.parse().map_err(to_py_err)?;

    let xy = xy
        .as_slice_mut()
        .map_err(|_| PyValueError::new_err("xy must be a contiguous array"))?;
    let num_points = num_points.unwrap_or_else(|| (xy.len() / 2).saturating_sub(start_index));

    let mut z = z;
    let z = match z.as_mut() {
        Some(z) => Some(
            z.as_slice_mut()
                .map_err(|_| PyValueError::new_err("z must be a contiguous array"))?,
        ),
        None => None,
    };

    py.allow_threads(move || {
        if parallel {
            crate::reproject::par_reproject_points(xy, z, &source, &target, start_index, num_points)
        } else {
            crate::reproject::reproject_points(xy, z, &source, &target, start_index, num_points)
        }
    })
    .map_err(to_py_err)
}
