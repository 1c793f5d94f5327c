//! PyO3 bindings for raster affine helpers.

use pyo3::prelude::*;

use crate::affine::AffineTransform;

/// Cell containing (x, y) as `(row, column)`. With `shape = (rows, columns)`,
/// points outside the grid give `None`.
#[pyfunction]
#[pyo3(signature = (coefficients, x, y, shape=None))]
pub fn proj_to_cell(coefficients: [f64; 6], x: f64, y: f64, shape: Option<(i32, i32)>) -> Option<(i32, i32)> {
    let affine = AffineTransform::new(coefficients);
    let index = match shape {
        Some((rows, columns)) => affine.proj_to_cell_within(x, y, rows, columns),
        None => affine.proj_to_cell(x, y),
    };
    (!index.is_empty()).then_some((index.row, index.column))
}

/// Projected coordinates of the centre of cell (row, column).
#[pyfunction]
pub fn cell_center_to_proj(coefficients: [f64; 6], row: i32, column: i32) -> (f64, f64) {
    AffineTransform::new(coefficients).cell_center_to_proj(row, column)
}

/// Cell-centre coefficients from a corner-anchored GDAL geotransform.
#[pyfunction]
pub fn affine_from_gdal(geotransform: [f64; 6]) -> [f64; 6] {
    AffineTransform::from_gdal(&geotransform).coefficients
}

/// Corner-anchored GDAL geotransform from cell-centre coefficients.
#[pyfunction]
pub fn affine_to_gdal(coefficients: [f64; 6]) -> [f64; 6] {
    AffineTransform::new(coefficients).to_gdal()
}
