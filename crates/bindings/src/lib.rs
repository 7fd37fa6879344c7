#![allow(clippy::type_complexity)]

use ndarray::Array2;
use numpy::{
    IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArrayDyn,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use mk_core::error::vector3;
use mk_core::orientation;
use mk_core::sedm::{self, SedmVariant};
use mk_potential::derivatives::{self, SecondDerivatives};
use mk_potential::field::{self, FieldComponents};
use mk_potential::KernelParams;

// ============================================================================
// Helpers
// ============================================================================

fn value_error<E: std::fmt::Display>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn kernel_params(variant: &str, strict: bool) -> PyResult<KernelParams> {
    let variant = variant.parse::<SedmVariant>().map_err(value_error)?;
    Ok(KernelParams { variant, strict })
}

fn direction_vector(name: &'static str, v: &PyReadonlyArray1<'_, f64>) -> PyResult<[f64; 3]> {
    let values = v.as_array().to_vec();
    vector3(name, &values).map_err(value_error)
}

fn field_components(
    ax: &PyReadonlyArray2<'_, f64>,
    ay: &PyReadonlyArray2<'_, f64>,
    az: &PyReadonlyArray2<'_, f64>,
) -> FieldComponents {
    FieldComponents {
        ax: ax.as_array().to_owned(),
        ay: ay.as_array().to_owned(),
        az: az.as_array().to_owned(),
    }
}

// ============================================================================
// DISTANCE KERNEL
// ============================================================================

/// Squared Euclidean distance matrix between P (3×N) and S (3×M).
#[pyfunction]
#[pyo3(name = "squared_distance_matrix", signature = (p, s, variant="vectorized"))]
fn squared_distance_matrix_py<'py>(
    py: Python<'py>,
    p: PyReadonlyArrayDyn<'py, f64>,
    s: PyReadonlyArrayDyn<'py, f64>,
    variant: &str,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let variant = variant.parse::<SedmVariant>().map_err(value_error)?;
    let d = sedm::squared_distance_matrix(p.as_array(), s.as_array(), variant)
        .map_err(value_error)?;
    Ok(d.into_pyarray_bound(py))
}

// ============================================================================
// POTENTIAL DERIVATIVES
// ============================================================================

#[pyfunction]
#[pyo3(name = "inverse_distance", signature = (p, s, variant="dot", strict=false))]
fn inverse_distance_py<'py>(
    py: Python<'py>,
    p: PyReadonlyArrayDyn<'py, f64>,
    s: PyReadonlyArrayDyn<'py, f64>,
    variant: &str,
    strict: bool,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let params = kernel_params(variant, strict)?;
    let k = derivatives::inverse_distance(p.as_array(), s.as_array(), &params)
        .map_err(value_error)?;
    Ok(k.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "first_derivatives", signature = (p, s, variant="dot", strict=false))]
fn first_derivatives_py<'py>(
    py: Python<'py>,
    p: PyReadonlyArrayDyn<'py, f64>,
    s: PyReadonlyArrayDyn<'py, f64>,
    variant: &str,
    strict: bool,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
)> {
    let params = kernel_params(variant, strict)?;
    let k = derivatives::first_derivatives(p.as_array(), s.as_array(), &params)
        .map_err(value_error)?;
    Ok((
        k.x.into_pyarray_bound(py),
        k.y.into_pyarray_bound(py),
        k.z.into_pyarray_bound(py),
    ))
}

/// Returns (Kxx, Kxy, Kxz, Kyy, Kyz); Kzz = -(Kxx + Kyy).
#[pyfunction]
#[pyo3(name = "second_derivatives", signature = (p, s, variant="dot", strict=false))]
fn second_derivatives_py<'py>(
    py: Python<'py>,
    p: PyReadonlyArrayDyn<'py, f64>,
    s: PyReadonlyArrayDyn<'py, f64>,
    variant: &str,
    strict: bool,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
)> {
    let params = kernel_params(variant, strict)?;
    let k = derivatives::second_derivatives(p.as_array(), s.as_array(), &params)
        .map_err(value_error)?;
    Ok((
        k.xx.into_pyarray_bound(py),
        k.xy.into_pyarray_bound(py),
        k.xz.into_pyarray_bound(py),
        k.yy.into_pyarray_bound(py),
        k.yz.into_pyarray_bound(py),
    ))
}

// ============================================================================
// FIELD ASSEMBLY
// ============================================================================

#[pyfunction]
#[pyo3(name = "dipole_field_components", signature = (f, kxx, kxy, kxz, kyy, kyz))]
fn dipole_field_components_py<'py>(
    py: Python<'py>,
    f: PyReadonlyArray1<'py, f64>,
    kxx: PyReadonlyArray2<'py, f64>,
    kxy: PyReadonlyArray2<'py, f64>,
    kxz: PyReadonlyArray2<'py, f64>,
    kyy: PyReadonlyArray2<'py, f64>,
    kyz: PyReadonlyArray2<'py, f64>,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
)> {
    let f = direction_vector("F", &f)?;
    let k = SecondDerivatives {
        xx: kxx.as_array().to_owned(),
        xy: kxy.as_array().to_owned(),
        xz: kxz.as_array().to_owned(),
        yy: kyy.as_array().to_owned(),
        yz: kyz.as_array().to_owned(),
    };
    let a = field::dipole_field_components(&f, &k).map_err(value_error)?;
    Ok((
        a.ax.into_pyarray_bound(py),
        a.ay.into_pyarray_bound(py),
        a.az.into_pyarray_bound(py),
    ))
}

#[pyfunction]
#[pyo3(name = "field_magnitude")]
fn field_magnitude_py<'py>(
    py: Python<'py>,
    ax: PyReadonlyArray2<'py, f64>,
    ay: PyReadonlyArray2<'py, f64>,
    az: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let a = field_components(&ax, &ay, &az);
    let m = field::field_magnitude(&a).map_err(value_error)?;
    Ok(m.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "dipole_anomaly")]
fn dipole_anomaly_py<'py>(
    py: Python<'py>,
    h: PyReadonlyArray1<'py, f64>,
    ax: PyReadonlyArray2<'py, f64>,
    ay: PyReadonlyArray2<'py, f64>,
    az: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let h = direction_vector("h", &h)?;
    let a = field_components(&ax, &ay, &az);
    let g = field::dipole_anomaly(&h, &a).map_err(value_error)?;
    Ok(g.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "dipole_matrix", signature = (p, s, f, h, variant="dot", strict=false))]
fn dipole_matrix_py<'py>(
    py: Python<'py>,
    p: PyReadonlyArrayDyn<'py, f64>,
    s: PyReadonlyArrayDyn<'py, f64>,
    f: PyReadonlyArray1<'py, f64>,
    h: PyReadonlyArray1<'py, f64>,
    variant: &str,
    strict: bool,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let params = kernel_params(variant, strict)?;
    let f = direction_vector("F", &f)?;
    let h = direction_vector("h", &h)?;
    let g = field::dipole_matrix(p.as_array(), s.as_array(), &f, &h, &params)
        .map_err(value_error)?;
    Ok(g.into_pyarray_bound(py))
}

// ============================================================================
// ORIENTATION
// ============================================================================

#[pyfunction]
#[pyo3(name = "unit_vector")]
fn unit_vector_py(py: Python<'_>, inc: f64, dec: f64) -> Bound<'_, PyArray1<f64>> {
    PyArray1::from_slice_bound(py, &orientation::unit_vector(inc, dec))
}

/// Returns (intensity, inclination, declination) with angles in degrees.
#[pyfunction]
#[pyo3(name = "direction")]
fn direction_py(vector: PyReadonlyArray1<'_, f64>) -> PyResult<(f64, f64, f64)> {
    let v = direction_vector("vector", &vector)?;
    let d = orientation::direction(&v)
        .ok_or_else(|| PyValueError::new_err("zero vector has no direction"))?;
    Ok((d.intensity, d.inclination, d.declination))
}

#[pyfunction]
#[pyo3(name = "rotation_matrix")]
fn rotation_matrix_py(
    py: Python<'_>,
    inc: f64,
    dec: f64,
    d_inc: f64,
    d_dec: f64,
) -> Bound<'_, PyArray2<f64>> {
    let r = orientation::rotation_matrix(inc, dec, d_inc, d_dec);
    Array2::from_shape_fn((3, 3), |(i, j)| r[i][j]).into_pyarray_bound(py)
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn magnetic_kernels(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Distance kernel
    m.add_function(wrap_pyfunction!(squared_distance_matrix_py, m)?)?;

    // Potential derivatives
    m.add_function(wrap_pyfunction!(inverse_distance_py, m)?)?;
    m.add_function(wrap_pyfunction!(first_derivatives_py, m)?)?;
    m.add_function(wrap_pyfunction!(second_derivatives_py, m)?)?;

    // Field assembly
    m.add_function(wrap_pyfunction!(dipole_field_components_py, m)?)?;
    m.add_function(wrap_pyfunction!(field_magnitude_py, m)?)?;
    m.add_function(wrap_pyfunction!(dipole_anomaly_py, m)?)?;
    m.add_function(wrap_pyfunction!(dipole_matrix_py, m)?)?;

    // Orientation
    m.add_function(wrap_pyfunction!(unit_vector_py, m)?)?;
    m.add_function(wrap_pyfunction!(direction_py, m)?)?;
    m.add_function(wrap_pyfunction!(rotation_matrix_py, m)?)?;

    Ok(())
}
