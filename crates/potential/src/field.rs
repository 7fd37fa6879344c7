//! Magnetic dipole forward model.
//!
//! The second-derivative tensor of 1/r is projected onto the main-field
//! direction F to give A = F·∇∇(1/r), whose components are then projected
//! onto the magnetization direction h:
//!
//!   Ax = F₀Kxx + F₁Kxy + F₂Kxz
//!   Ay = F₀Kxy + F₁Kyy + F₂Kyz
//!   Az = F₀Kxz + F₁Kyz - F₂(Kxx + Kyy)
//!   G  = h₀Ax + h₁Ay + h₂Az
//!
//! Entry (i, j) of G is the approximated total-field anomaly at observation
//! point i produced by a unit dipole at source j.

use mk_core::ShapeError;
use ndarray::{Array2, ArrayView, Dimension, Zip};

use crate::derivatives::{second_derivatives, SecondDerivatives};
use crate::error::KernelError;
use crate::params::KernelParams;

/// Components of F·∇∇(1/r), each N×M.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComponents {
    pub ax: Array2<f64>,
    pub ay: Array2<f64>,
    pub az: Array2<f64>,
}

/// Check that every named matrix has the shape of the first one.
fn common_shape(matrices: &[(&'static str, &Array2<f64>)]) -> Result<(), ShapeError> {
    let Some((_, first)) = matrices.first() else {
        return Ok(());
    };
    let expected = first.dim();
    for &(name, m) in &matrices[1..] {
        if m.dim() != expected {
            return Err(ShapeError::ShapeMismatch {
                name,
                expected,
                found: m.dim(),
            });
        }
    }
    Ok(())
}

/// Project the second-derivative tensor onto the main-field unit vector `f`.
pub fn dipole_field_components(
    f: &[f64; 3],
    k: &SecondDerivatives,
) -> Result<FieldComponents, ShapeError> {
    common_shape(&[
        ("Kxx", &k.xx),
        ("Kxy", &k.xy),
        ("Kxz", &k.xz),
        ("Kyy", &k.yy),
        ("Kyz", &k.yz),
    ])?;
    let [f0, f1, f2] = *f;

    let ax = Zip::from(&k.xx)
        .and(&k.xy)
        .and(&k.xz)
        .map_collect(|&xx, &xy, &xz| f0 * xx + f1 * xy + f2 * xz);
    let ay = Zip::from(&k.xy)
        .and(&k.yy)
        .and(&k.yz)
        .map_collect(|&xy, &yy, &yz| f0 * xy + f1 * yy + f2 * yz);
    let az = Zip::from(&k.xz)
        .and(&k.yz)
        .and(&k.xx)
        .and(&k.yy)
        .map_collect(|&xz, &yz, &xx, &yy| f0 * xz + f1 * yz - f2 * (xx + yy));

    Ok(FieldComponents { ax, ay, az })
}

/// Per-entry magnitude √(Ax² + Ay² + Az²).
pub fn field_magnitude(a: &FieldComponents) -> Result<Array2<f64>, ShapeError> {
    common_shape(&[("Ax", &a.ax), ("Ay", &a.ay), ("Az", &a.az)])?;
    Ok(Zip::from(&a.ax)
        .and(&a.ay)
        .and(&a.az)
        .map_collect(|&x, &y, &z| (x * x + y * y + z * z).sqrt()))
}

/// Dipole matrix G = h₀Ax + h₁Ay + h₂Az for the magnetization unit vector `h`.
pub fn dipole_anomaly(h: &[f64; 3], a: &FieldComponents) -> Result<Array2<f64>, ShapeError> {
    common_shape(&[("Ax", &a.ax), ("Ay", &a.ay), ("Az", &a.az)])?;
    let [h0, h1, h2] = *h;
    Ok(Zip::from(&a.ax)
        .and(&a.ay)
        .and(&a.az)
        .map_collect(|&x, &y, &z| h0 * x + h1 * y + h2 * z))
}

/// Build the N×M dipole matrix directly from observation and source points.
///
/// # Arguments
/// * `p` - Observation points, 3×N
/// * `s` - Source points, 3×M
/// * `main_field` - Main-field unit vector F
/// * `magnetization` - Magnetization unit vector h
/// * `params` - Distance variant and strict-mode flag
pub fn dipole_matrix<D1, D2>(
    p: ArrayView<'_, f64, D1>,
    s: ArrayView<'_, f64, D2>,
    main_field: &[f64; 3],
    magnetization: &[f64; 3],
    params: &KernelParams,
) -> Result<Array2<f64>, KernelError>
where
    D1: Dimension,
    D2: Dimension,
{
    let k = second_derivatives(p, s, params)?;
    let a = dipole_field_components(main_field, &k)?;
    let g = dipole_anomaly(magnetization, &a)?;

    log::info!(
        "assembled {}x{} dipole matrix (variant={}, strict={})",
        g.nrows(),
        g.ncols(),
        params.variant,
        params.strict
    );
    Ok(g)
}
