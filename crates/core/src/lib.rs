//! Core library for magnetic-kernels.
//!
//! Pure Rust, no Python dependencies. Provides point sets, squared
//! Euclidean distance matrices in several interchangeable formulations,
//! and inclination/declination orientation utilities.

pub mod error;
pub mod orientation;
pub mod points;
pub mod sedm;
pub mod util;

pub use error::ShapeError;
pub use points::PointSet;
pub use sedm::{squared_distance_matrix, SedmVariant};
