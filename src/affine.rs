use crate::cell::RcIndex;
use crate::error::{ProjError, Result};
use approx::{AbsDiffEq, RelativeEq};

/// A 2D affine transform between raster cells and projected coordinates.
///
/// Coefficients follow the world-file convention and are anchored on the cell
/// centre:
///   x = c0 + c1 * column + c2 * row
///   y = c3 + c4 * column + c5 * row
///
/// c2 and c4 are the skew (rotation) terms.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffineTransform {
    pub coefficients: [f64; 6],
}

impl AffineTransform {
    pub const fn new(coefficients: [f64; 6]) -> Self {
        Self { coefficients }
    }

    /// Create from a GDAL geotransform `[x0, dx, rx, y0, ry, dy]`, which is
    /// anchored on the top-left corner of the top-left cell.
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        Self::new([
            gt[0] + 0.5 * gt[1] + 0.5 * gt[2],
            gt[1],
            gt[2],
            gt[3] + 0.5 * gt[4] + 0.5 * gt[5],
            gt[4],
            gt[5],
        ])
    }

    /// Convert to a corner-anchored GDAL geotransform.
    pub fn to_gdal(&self) -> [f64; 6] {
        let c = &self.coefficients;
        [
            c[0] - 0.5 * c[1] - 0.5 * c[2],
            c[1],
            c[2],
            c[3] - 0.5 * c[4] - 0.5 * c[5],
            c[4],
            c[5],
        ]
    }

    /// Create from rasterio ordering `(a, b, c, d, e, f)` where
    /// `x = a * col + b * row + c` at the top-left corner.
    pub fn from_rasterio(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self::from_gdal(&[c, a, b, f, d, e])
    }

    /// Parse the six lines of a world file (`A, D, B, E, C, F`).
    pub fn from_world_file_str(text: &str) -> Result<Self> {
        let values = text
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| ProjError::parse(text, format!("invalid world file value '{token}'")))
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() != 6 {
            return Err(ProjError::parse(
                text,
                format!("a world file has 6 values, found {}", values.len()),
            ));
        }

        // A D B E C F
        Ok(Self::new([values[4], values[0], values[2], values[5], values[1], values[3]]))
    }

    pub fn to_world_file_string(&self) -> String {
        let c = &self.coefficients;
        format!("{}\n{}\n{}\n{}\n{}\n{}\n", c[1], c[4], c[2], c[5], c[0], c[3])
    }

    /// Apply the transform to continuous cell coordinates: (col, row) -> (x, y).
    pub fn forward(&self, col: f64, row: f64) -> (f64, f64) {
        let c = &self.coefficients;
        let x = c[0] + c[1] * col + c[2] * row;
        let y = c[3] + c[4] * col + c[5] * row;
        (x, y)
    }

    pub fn cell_center_to_proj(&self, row: i32, column: i32) -> (f64, f64) {
        self.forward(column as f64, row as f64)
    }

    pub fn cell_top_left_to_proj(&self, row: i32, column: i32) -> (f64, f64) {
        self.forward(column as f64 - 0.5, row as f64 - 0.5)
    }

    pub fn cell_top_right_to_proj(&self, row: i32, column: i32) -> (f64, f64) {
        self.forward(column as f64 + 0.5, row as f64 - 0.5)
    }

    pub fn cell_bottom_left_to_proj(&self, row: i32, column: i32) -> (f64, f64) {
        self.forward(column as f64 - 0.5, row as f64 + 0.5)
    }

    pub fn cell_bottom_right_to_proj(&self, row: i32, column: i32) -> (f64, f64) {
        self.forward(column as f64 + 0.5, row as f64 + 0.5)
    }

    /// Coefficients re-anchored so that `(start_col, start_row)` becomes the
    /// local origin. The linear part is unchanged.
    ///
    /// After re-anchoring, `cell_center_to_proj(0, 0)` is the centre of the
    /// original cell `(start_row, start_col)` and `cell_top_left_to_proj(0, 0)`
    /// is that cell's top-left corner.
    pub fn transform_to_corner(&self, start_col: f64, start_row: f64) -> [f64; 6] {
        let c = &self.coefficients;
        [
            c[0] + c[1] * start_col + c[2] * start_row,
            c[1],
            c[2],
            c[3] + c[4] * start_col + c[5] * start_row,
            c[4],
            c[5],
        ]
    }

    /// Find the cell whose centre is nearest to `(x, y)`.
    ///
    /// Fractional indices are rounded half to even. A degenerate matrix or an
    /// index outside the `i32` range yields `RcIndex::EMPTY`.
    pub fn proj_to_cell(&self, x: f64, y: f64) -> RcIndex {
        let c = &self.coefficients;
        let (dx, dy) = (x - c[0], y - c[3]);
        let (row, col) = if c[2] == 0.0 && c[4] == 0.0 {
            // No skew: rows and columns are independent.
            (dy / c[5], dx / c[1])
        } else if c[2] != 0.0 {
            // Column first, the substitution multiplied through by c2.
            let det = c[1] * c[5] - c[2] * c[4];
            let col = (c[5] * dx - c[2] * dy) / det;
            let row = (c[1] * dy - c[4] * dx) / det;
            (row, col)
        } else {
            // c2 == 0: the column is independent of the row.
            let col = dx / c[1];
            let row = (c[1] * dy - c[4] * dx) / (c[1] * c[5]);
            (row, col)
        };

        match (round_to_index(row), round_to_index(col)) {
            (Some(row), Some(column)) => RcIndex::new(row, column),
            _ => RcIndex::EMPTY,
        }
    }

    /// Like [`proj_to_cell`](Self::proj_to_cell) but returns `RcIndex::EMPTY`
    /// when the cell lies outside a `rows` x `columns` grid.
    pub fn proj_to_cell_within(&self, x: f64, y: f64, rows: i32, columns: i32) -> RcIndex {
        let cell = self.proj_to_cell(x, y);
        if cell.is_within(rows, columns) {
            cell
        } else {
            RcIndex::EMPTY
        }
    }

    /// Compute the inverse transform, mapping (x, y) to continuous (col, row).
    pub fn inverse(&self) -> Result<AffineTransform> {
        let c = &self.coefficients;
        let det = c[1] * c[5] - c[2] * c[4];
        if det.abs() < f64::EPSILON {
            return Err(ProjError::DegenerateTransform(format!(
                "determinant {det} of {:?} is zero",
                self.coefficients
            )));
        }
        let inv_det = 1.0 / det;
        let i1 = c[5] * inv_det;
        let i2 = -c[2] * inv_det;
        let i4 = -c[4] * inv_det;
        let i5 = c[1] * inv_det;
        Ok(AffineTransform::new([
            -(i1 * c[0] + i2 * c[3]),
            i1,
            i2,
            -(i4 * c[0] + i5 * c[3]),
            i4,
            i5,
        ]))
    }
}

fn round_to_index(value: f64) -> Option<i32> {
    let rounded = value.round_ties_even();
    if rounded.is_finite() && rounded >= i32::MIN as f64 + 1.0 && rounded <= i32::MAX as f64 {
        Some(rounded as i32)
    } else {
        None
    }
}

impl From<[f64; 6]> for AffineTransform {
    fn from(coefficients: [f64; 6]) -> Self {
        AffineTransform::new(coefficients)
    }
}

impl AbsDiffEq for AffineTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.coefficients.abs_diff_eq(&other.coefficients, epsilon)
    }
}

impl RelativeEq for AffineTransform {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.coefficients.relative_eq(&other.coefficients, epsilon, max_relative)
    }
}
