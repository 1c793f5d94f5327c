use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::ProjError;

mod affine;
mod reproject;
mod transform;

/// Register all Python-visible functions and types.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(reproject::reproject_points, m)?)?;
    m.add_function(wrap_pyfunction!(transform::transform_points, m)?)?;
    m.add_function(wrap_pyfunction!(transform::to_proj4, m)?)?;
    m.add_function(wrap_pyfunction!(transform::to_wkt, m)?)?;
    m.add_function(wrap_pyfunction!(affine::proj_to_cell, m)?)?;
    m.add_function(wrap_pyfunction!(affine::cell_center_to_proj, m)?)?;
    m.add_function(wrap_pyfunction!(affine::affine_from_gdal, m)?)?;
    m.add_function(wrap_pyfunction!(affine::affine_to_gdal, m)?)?;
    Ok(())
}

pub(crate) fn to_py_err(err: ProjError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
