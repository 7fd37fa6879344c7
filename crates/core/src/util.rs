//! Common utility functions shared across modules.

use ndarray::ArrayView2;

/// Compute squared distance between two 3D points.
#[inline(always)]
pub fn distance_squared(p1: &[f64; 3], p2: &[f64; 3]) -> f64 {
    let dx = p1[0] - p2[0];
    let dy = p1[1] - p2[1];
    let dz = p1[2] - p2[2];
    dx * dx + dy * dy + dz * dz
}

/// Extract column `i` of a 3×N coordinate matrix as a point.
#[inline(always)]
pub fn column(coords: &ArrayView2<'_, f64>, i: usize) -> [f64; 3] {
    [coords[[0, i]], coords[[1, i]], coords[[2, i]]]
}

/// Squared magnitude of a 3-vector.
#[inline(always)]
pub fn norm_squared(v: &[f64; 3]) -> f64 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}
