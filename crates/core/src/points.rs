//! Point sets stored as 3×N coordinate matrices.

use ndarray::{Array2, ArrayView, ArrayView1, ArrayView2, Dimension, Ix2};

use crate::error::ShapeError;

/// Validate that `array` is a 2-D matrix with exactly 3 rows (x, y, z).
///
/// Column `i` holds the coordinates of point `i`. A single point must be
/// given as a 3×1 matrix; rank-1 input is rejected rather than reshaped.
pub fn coordinates<'a, D: Dimension>(
    name: &'static str,
    array: ArrayView<'a, f64, D>,
) -> Result<ArrayView2<'a, f64>, ShapeError> {
    let ndim = array.ndim();
    let view = array
        .into_dimensionality::<Ix2>()
        .map_err(|_| ShapeError::NotMatrix { name, ndim })?;
    if view.nrows() != 3 {
        return Err(ShapeError::WrongRowCount {
            name,
            rows: view.nrows(),
        });
    }
    Ok(view)
}

/// An ordered, immutable set of 3-D points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    coords: Array2<f64>,
}

impl PointSet {
    /// Build from three parallel coordinate arrays.
    pub fn from_xyz(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self, ShapeError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(ShapeError::LengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        let mut coords = Array2::zeros((3, x.len()));
        coords.row_mut(0).assign(&ArrayView1::from(x));
        coords.row_mut(1).assign(&ArrayView1::from(y));
        coords.row_mut(2).assign(&ArrayView1::from(z));
        Ok(Self { coords })
    }

    /// Build from a list of `[x, y, z]` points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let coords = Array2::from_shape_fn((3, points.len()), |(axis, i)| points[i][axis]);
        Self { coords }
    }

    /// Build from a 3×N array of any declared dimensionality.
    pub fn from_array<D: Dimension>(array: ArrayView<'_, f64, D>) -> Result<Self, ShapeError> {
        let view = coordinates("points", array)?;
        Ok(Self {
            coords: view.to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.coords.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The 3×N coordinate matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.coords.view()
    }

    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.coords.row(0)
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.coords.row(1)
    }

    pub fn z(&self) -> ArrayView1<'_, f64> {
        self.coords.row(2)
    }

    /// Coordinates of point `i`. Panics if `i >= len()`.
    pub fn point(&self, i: usize) -> [f64; 3] {
        [self.coords[[0, i]], self.coords[[1, i]], self.coords[[2, i]]]
    }
}
