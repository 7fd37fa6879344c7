//! Squared Euclidean distance matrices (SEDM) between two point sets.
//!
//! Every [`SedmVariant`] computes the same N×M matrix `D`, where `D[i, j]`
//! is the squared distance between column `i` of `P` and column `j` of `S`.
//! The variants follow the usual optimization ladder for dense pairwise
//! distances (Bauckhage, 2014): drop the square root, drop the per-pair
//! loop, exploit symmetry. `Direct` is the reference baseline and `Library`
//! is an independent oracle.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use ndarray::{s, Array1, Array2, ArrayView, ArrayView2, Axis, Dimension};

use crate::error::ShapeError;
use crate::points::coordinates;
use crate::util::{column, distance_squared};

/// Formulation used to evaluate the distance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SedmVariant {
    /// Norm of each difference vector, squared.
    Direct,
    /// Dot product of each difference vector with itself.
    Dot,
    /// Expansion `a·a - 2a·b + b·b` read off one Gram matrix.
    Gram,
    /// Broadcast sums of squares minus twice `PᵗS`, no per-pair loop.
    #[default]
    Vectorized,
    /// Upper triangle only, mirrored. Needs `S == P` to save work.
    Symmetric,
    /// `nalgebra::distance_squared` per pair.
    Library,
}

impl SedmVariant {
    pub const ALL: [SedmVariant; 6] = [
        SedmVariant::Direct,
        SedmVariant::Dot,
        SedmVariant::Gram,
        SedmVariant::Vectorized,
        SedmVariant::Symmetric,
        SedmVariant::Library,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SedmVariant::Direct => "direct",
            SedmVariant::Dot => "dot",
            SedmVariant::Gram => "gram",
            SedmVariant::Vectorized => "vectorized",
            SedmVariant::Symmetric => "symmetric",
            SedmVariant::Library => "library",
        }
    }
}

impl fmt::Display for SedmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing a variant name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = SedmVariant::ALL.iter().map(|v| v.name()).collect();
        write!(
            f,
            "unknown distance variant '{}' (expected one of: {})",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for SedmVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        SedmVariant::ALL
            .into_iter()
            .find(|v| v.name() == lowered)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Compute the N×M squared distance matrix between `p` (3×N) and `s` (3×M).
///
/// Both inputs are validated before any work is done: each must be a 2-D
/// array with exactly 3 rows, otherwise a [`ShapeError`] is returned.
///
/// # Arguments
/// * `p` - Observation points, one per column
/// * `s` - Source points, one per column
/// * `variant` - Formulation to use; all agree up to roundoff
pub fn squared_distance_matrix<D1, D2>(
    p: ArrayView<'_, f64, D1>,
    s: ArrayView<'_, f64, D2>,
    variant: SedmVariant,
) -> Result<Array2<f64>, ShapeError>
where
    D1: Dimension,
    D2: Dimension,
{
    let p = coordinates("P", p)?;
    let s = coordinates("S", s)?;

    log::debug!(
        "computing {}x{} squared distance matrix ({})",
        p.ncols(),
        s.ncols(),
        variant
    );

    let d = match variant {
        SedmVariant::Direct => direct(&p, &s),
        SedmVariant::Dot => dot(&p, &s),
        SedmVariant::Gram => gram(&p, &s),
        SedmVariant::Vectorized => vectorized(&p, &s),
        SedmVariant::Symmetric => symmetric(&p, &s),
        SedmVariant::Library => library(&p, &s),
    };
    Ok(d)
}

/// Squared distances among the points of a single set, using the
/// half-matrix variant.
pub fn self_squared_distance_matrix<D: Dimension>(
    p: ArrayView<'_, f64, D>,
) -> Result<Array2<f64>, ShapeError> {
    let p = coordinates("P", p)?;
    Ok(symmetric(&p, &p))
}

fn direct(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> Array2<f64> {
    let mut d = Array2::zeros((p.ncols(), s.ncols()));
    for i in 0..p.ncols() {
        for j in 0..s.ncols() {
            let diff = &p.column(i) - &s.column(j);
            d[[i, j]] = diff.dot(&diff).sqrt().powi(2);
        }
    }
    d
}

fn dot(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> Array2<f64> {
    let sources: Vec<[f64; 3]> = (0..s.ncols()).map(|j| column(s, j)).collect();
    let mut d = Array2::zeros((p.ncols(), s.ncols()));
    for i in 0..p.ncols() {
        let pi = column(p, i);
        for (j, sj) in sources.iter().enumerate() {
            d[[i, j]] = distance_squared(&pi, sj);
        }
    }
    d
}

fn gram(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> Array2<f64> {
    let n = p.ncols();
    let m = s.ncols();

    // X = [P | S], G = XᵗX holds every inner product needed. G is
    // (N+M)×(N+M), about four times the size of the output when N ≈ M.
    let mut x = Array2::zeros((3, n + m));
    x.slice_mut(s![.., ..n]).assign(p);
    x.slice_mut(s![.., n..]).assign(s);
    let g = inner_products(&x.view(), &x.view());

    let mut d = Array2::zeros((n, m));
    for i in 0..n {
        for j in 0..m {
            let value = g[[i, i]] - 2.0 * g[[i, n + j]] + g[[n + j, n + j]];
            d[[i, j]] = value.max(0.0);
        }
    }
    d
}

fn vectorized(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> Array2<f64> {
    let p_sq = squared_norms(p);
    let s_sq = squared_norms(s);

    let mut d = inner_products(p, s);
    d *= -2.0;
    d += &p_sq.insert_axis(Axis(1));
    d += &s_sq.insert_axis(Axis(0));
    // cancellation can leave tiny negatives
    d.mapv_inplace(|v| v.max(0.0));
    d
}

/// `AᵗB` accumulated one coordinate row at a time.
///
/// Uses the same summation order as [`squared_norms`], so a column paired
/// with itself gives bit-identical norm and inner product and the expansion
/// `a·a - 2a·b + b·b` cancels to exactly 0.
fn inner_products(a: &ArrayView2<'_, f64>, b: &ArrayView2<'_, f64>) -> Array2<f64> {
    let mut out = Array2::zeros((a.ncols(), b.ncols()));
    for (ra, rb) in a.outer_iter().zip(b.outer_iter()) {
        out += &(&ra.insert_axis(Axis(1)) * &rb.insert_axis(Axis(0)));
    }
    out
}

fn squared_norms(a: &ArrayView2<'_, f64>) -> Array1<f64> {
    let mut out = Array1::zeros(a.ncols());
    for row in a.outer_iter() {
        out += &(&row * &row);
    }
    out
}

fn symmetric(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> Array2<f64> {
    if !same_points(p, s) {
        log::debug!("symmetric variant given distinct point sets, computing full matrix");
        return dot(p, s);
    }

    let n = p.ncols();
    let points: Vec<[f64; 3]> = (0..n).map(|i| column(p, i)).collect();
    let mut d = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let value = distance_squared(&points[i], &points[j]);
            d[[i, j]] = value;
            d[[j, i]] = value;
        }
    }
    d
}

fn same_points(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> bool {
    if p.shape() != s.shape() {
        return false;
    }
    let aliased = std::ptr::eq(p.as_ptr(), s.as_ptr()) && p.strides() == s.strides();
    aliased || p == s
}

fn to_points(coords: &ArrayView2<'_, f64>) -> Vec<Point3<f64>> {
    (0..coords.ncols())
        .map(|i| Point3::from(column(coords, i)))
        .collect()
}

fn library(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>) -> Array2<f64> {
    let observations = to_points(p);
    let sources = to_points(s);
    Array2::from_shape_fn((observations.len(), sources.len()), |(i, j)| {
        nalgebra::distance_squared(&observations[i], &sources[j])
    })
}
