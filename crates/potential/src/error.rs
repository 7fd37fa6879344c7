//! Errors raised by the potential and field kernels.

use mk_core::ShapeError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// An input matrix or vector has the wrong shape.
    Shape(ShapeError),
    /// Strict mode found an observation point on top of a source point.
    CoincidentPoints { observation: usize, source: usize },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Shape(e) => write!(f, "{}", e),
            KernelError::CoincidentPoints {
                observation,
                source,
            } => write!(
                f,
                "KernelError: observation point {} coincides with source point {} (r = 0)",
                observation, source
            ),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Shape(e) => Some(e),
            KernelError::CoincidentPoints { .. } => None,
        }
    }
}

impl From<ShapeError> for KernelError {
    fn from(e: ShapeError) -> Self {
        KernelError::Shape(e)
    }
}
