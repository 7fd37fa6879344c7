//! Inverse-distance potential kernels and magnetic dipole matrices.
//!
//! Builds on the squared distance matrices of `mk_core::sedm` to evaluate
//! 1/r and its first and second derivatives between observation and source
//! points, then projects the second-derivative tensor onto main-field and
//! magnetization directions to form the dipole forward-model matrix.

pub mod derivatives;
pub mod error;
pub mod field;
pub mod params;

pub use error::KernelError;
pub use params::KernelParams;
