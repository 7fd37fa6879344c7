//! Shape validation errors for point sets and kernel inputs.

use std::fmt;

/// Error raised when an input does not have the shape a kernel requires.
///
/// Every kernel validates its inputs before computing anything, so a
/// `ShapeError` always means no output was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Input is not a 2-D coordinate matrix.
    NotMatrix { name: &'static str, ndim: usize },
    /// Coordinate matrix does not have exactly 3 rows (x, y, z).
    WrongRowCount { name: &'static str, rows: usize },
    /// Parallel coordinate arrays have different lengths.
    LengthMismatch { x: usize, y: usize, z: usize },
    /// A fixed-length vector has the wrong number of components.
    WrongLength {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// A matrix does not share the shape of its companions.
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::NotMatrix { name, ndim } => write!(
                f,
                "ShapeError: {} must be a 2d array, got {} dimension(s)",
                name, ndim
            ),
            ShapeError::WrongRowCount { name, rows } => {
                write!(f, "ShapeError: {} must have 3 rows, got {}", name, rows)
            }
            ShapeError::LengthMismatch { x, y, z } => write!(
                f,
                "ShapeError: coordinate arrays must have equal length (x: {}, y: {}, z: {})",
                x, y, z
            ),
            ShapeError::WrongLength {
                name,
                expected,
                found,
            } => write!(
                f,
                "ShapeError: {} must have {} components, got {}",
                name, expected, found
            ),
            ShapeError::ShapeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "ShapeError: {} has shape {:?}, expected {:?}",
                name, found, expected
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Convert a slice into a 3-component vector.
pub fn vector3(name: &'static str, values: &[f64]) -> Result<[f64; 3], ShapeError> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(ShapeError::WrongLength {
            name,
            expected: 3,
            found: values.len(),
        }),
    }
}
