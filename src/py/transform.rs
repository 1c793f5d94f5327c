//! PyO3 bindings for copying CRS transforms and CRS definition output.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::crs::ProjectionInfo;
use crate::proj::pipeline::Pipeline;
use crate::py::to_py_err;

type Coordinates<'py> = (
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Option<Bound<'py, PyArray1<f64>>>,
);

/// Transform separate coordinate arrays, returning new arrays.
///
/// Args:
///     x: Eastings or longitudes in the source CRS units.
///     y: Northings or latitudes.
///     src_crs: Source CRS (EPSG code, PROJ.4 string, WKT or catalog name).
///     dst_crs: Target CRS, same forms as `src_crs`.
///     z: Optional ellipsoidal heights in metres.
///
/// Returns:
///     Tuple `(x, y, z)` in the target CRS; `z` is None when not given.
#[pyfunction]
#[pyo3(signature = (x, y, src_crs, dst_crs, z=None))]
pub fn transform_points<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<'py, f64>,
    y: PyReadonlyArray1<'py, f64>,
    src_crs: &str,
    dst_crs: &str,
    z: Option<PyReadonlyArray1<'py, f64>>,
) -> PyResult<Coordinates<'py>> {
    let (x, y) = (x.as_array(), y.as_array());
    if x.len() != y.len() {
        return Err(PyValueError::new_err(format!(
            "x and y differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    let mut heights = match &z {
        Some(z) if z.as_array().len() != x.len() => {
            return Err(PyValueError::new_err("z must have the same length as x"));
        }
        Some(z) => Some(z.as_array().to_vec()),
        None => None,
    };

    let source: ProjectionInfo = src_crs.parse().map_err(to_py_err)?;
    let target: ProjectionInfo = dst_crs.parse().map_err(to_py_err)?;
    let mut xy: Vec<f64> = x.iter().zip(y.iter()).flat_map(|(&x, &y)| [x, y]).collect();

    py.allow_threads(|| {
        let pipeline = Pipeline::new(&source, &target)?;
        pipeline.transform_slice(&mut xy, heights.as_deref_mut())
    })
    .map_err(to_py_err)?;

    let xs: ndarray::Array1<f64> = xy.iter().step_by(2).copied().collect();
    let ys: ndarray::Array1<f64> = xy.iter().skip(1).step_by(2).copied().collect();
    Ok((
        PyArray1::from_owned_array(py, xs),
        PyArray1::from_owned_array(py, ys),
        heights.map(|h| PyArray1::from_vec(py, h)),
    ))
}

/// PROJ.4 string for any supported CRS definition.
#[pyfunction]
pub fn to_proj4(definition: &str) -> PyResult<String> {
    let info: ProjectionInfo = definition.parse().map_err(to_py_err)?;
    Ok(info.to_proj4_string())
}

/// OGC WKT1 for any supported CRS definition.
#[pyfunction]
pub fn to_wkt(definition: &str) -> PyResult<String> {
    let info: ProjectionInfo = definition.parse().map_err(to_py_err)?;
    Ok(info.to_wkt())
}
