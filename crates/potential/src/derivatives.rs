//! The inverse distance 1/r and its derivatives with respect to the
//! observation-point coordinates.
//!
//! With Δa = P_a(i) - S_a(j) and r² from the distance kernel:
//!
//!   K   = r⁻¹
//!   Ka  = -Δa · r⁻³
//!   Kaa = 3Δa² · r⁻⁵ - r⁻³
//!   Kab = 3ΔaΔb · r⁻⁵
//!
//! r³ and r⁵ are built from r² with a single square root per entry.
//!
//! Observation and source points must not coincide. A pair at r = 0 yields
//! inf/NaN entries unless [`KernelParams::strict`] is set, in which case the
//! pair is reported as [`KernelError::CoincidentPoints`]. Strict mode also
//! rejects distinct points whose r² came out as 0, which the expansion
//! variants produce for near-coincident points far from the origin.

use mk_core::points::coordinates;
use mk_core::sedm::squared_distance_matrix;
use ndarray::{Array2, ArrayView, ArrayView2, Dimension, Zip};

use crate::error::KernelError;
use crate::params::KernelParams;

/// First derivatives of 1/r, each N×M.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstDerivatives {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub z: Array2<f64>,
}

/// Second derivatives of 1/r, each N×M.
///
/// zz is not stored: 1/r is harmonic away from its source, so
/// zz = -(xx + yy).
#[derive(Debug, Clone, PartialEq)]
pub struct SecondDerivatives {
    pub xx: Array2<f64>,
    pub xy: Array2<f64>,
    pub xz: Array2<f64>,
    pub yy: Array2<f64>,
    pub yz: Array2<f64>,
}

impl SecondDerivatives {
    /// Reconstruct zz from the trace-free condition.
    pub fn zz(&self) -> Array2<f64> {
        -(&self.xx + &self.yy)
    }
}

/// Pairwise coordinate offsets and squared distances.
struct PairGeometry {
    dx: Array2<f64>,
    dy: Array2<f64>,
    dz: Array2<f64>,
    r2: Array2<f64>,
}

impl PairGeometry {
    fn new<D1, D2>(
        p: ArrayView<'_, f64, D1>,
        s: ArrayView<'_, f64, D2>,
        params: &KernelParams,
    ) -> Result<Self, KernelError>
    where
        D1: Dimension,
        D2: Dimension,
    {
        let p = coordinates("P", p)?;
        let s = coordinates("S", s)?;
        let r2 = squared_distance_matrix(p.view(), s.view(), params.variant)?;

        let geometry = Self {
            dx: offsets(&p, &s, 0),
            dy: offsets(&p, &s, 1),
            dz: offsets(&p, &s, 2),
            r2,
        };
        if params.strict {
            geometry.reject_coincident()?;
        }
        Ok(geometry)
    }

    fn reject_coincident(&self) -> Result<(), KernelError> {
        for ((i, j), &r2) in self.r2.indexed_iter() {
            let coincident =
                self.dx[[i, j]] == 0.0 && self.dy[[i, j]] == 0.0 && self.dz[[i, j]] == 0.0;
            if coincident || r2 <= 0.0 {
                log::warn!(
                    "observation point {} coincides with source point {} (r2 = {:e})",
                    i,
                    j,
                    r2
                );
                return Err(KernelError::CoincidentPoints {
                    observation: i,
                    source: j,
                });
            }
        }
        Ok(())
    }

    /// r⁻³ and 3r⁻⁵.
    fn inverse_powers(&self) -> (Array2<f64>, Array2<f64>) {
        let r3 = self.r2.mapv(|r2| r2 * r2.sqrt());
        let inv_r3 = r3.mapv(f64::recip);
        let three_inv_r5 = Zip::from(&r3)
            .and(&self.r2)
            .map_collect(|&r3, &r2| 3.0 / (r3 * r2));
        (inv_r3, three_inv_r5)
    }
}

fn offsets(p: &ArrayView2<'_, f64>, s: &ArrayView2<'_, f64>, axis: usize) -> Array2<f64> {
    Array2::from_shape_fn((p.ncols(), s.ncols()), |(i, j)| {
        p[[axis, i]] - s[[axis, j]]
    })
}

/// Inverse distance 1/r between observation points `p` (3×N) and sources `s` (3×M).
pub fn inverse_distance<D1, D2>(
    p: ArrayView<'_, f64, D1>,
    s: ArrayView<'_, f64, D2>,
    params: &KernelParams,
) -> Result<Array2<f64>, KernelError>
where
    D1: Dimension,
    D2: Dimension,
{
    let geometry = PairGeometry::new(p, s, params)?;
    Ok(geometry.r2.mapv(|r2| r2.sqrt().recip()))
}

/// First derivatives of 1/r with respect to the observation coordinates.
pub fn first_derivatives<D1, D2>(
    p: ArrayView<'_, f64, D1>,
    s: ArrayView<'_, f64, D2>,
    params: &KernelParams,
) -> Result<FirstDerivatives, KernelError>
where
    D1: Dimension,
    D2: Dimension,
{
    let geometry = PairGeometry::new(p, s, params)?;
    let r3 = geometry.r2.mapv(|r2| r2 * r2.sqrt());

    let component = |delta: &Array2<f64>| {
        Zip::from(delta)
            .and(&r3)
            .map_collect(|&d, &r3| -d / r3)
    };

    Ok(FirstDerivatives {
        x: component(&geometry.dx),
        y: component(&geometry.dy),
        z: component(&geometry.dz),
    })
}

/// Second derivatives of 1/r with respect to the observation coordinates.
///
/// # Arguments
/// * `p` - Observation points, 3×N
/// * `s` - Source points, 3×M
/// * `params` - Distance variant and strict-mode flag
///
/// # Returns
/// `SecondDerivatives` holding xx, xy, xz, yy and yz, each N×M.
pub fn second_derivatives<D1, D2>(
    p: ArrayView<'_, f64, D1>,
    s: ArrayView<'_, f64, D2>,
    params: &KernelParams,
) -> Result<SecondDerivatives, KernelError>
where
    D1: Dimension,
    D2: Dimension,
{
    let geometry = PairGeometry::new(p, s, params)?;
    let (inv_r3, three_inv_r5) = geometry.inverse_powers();

    let diagonal = |delta: &Array2<f64>| {
        Zip::from(delta)
            .and(&three_inv_r5)
            .and(&inv_r3)
            .map_collect(|&d, &t, &i| t * d * d - i)
    };
    let cross = |a: &Array2<f64>, b: &Array2<f64>| {
        Zip::from(a)
            .and(b)
            .and(&three_inv_r5)
            .map_collect(|&a, &b, &t| t * a * b)
    };

    Ok(SecondDerivatives {
        xx: diagonal(&geometry.dx),
        xy: cross(&geometry.dx, &geometry.dy),
        xz: cross(&geometry.dx, &geometry.dz),
        yy: diagonal(&geometry.dy),
        yz: cross(&geometry.dy, &geometry.dz),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mk_core::{SedmVariant, ShapeError};
    use ndarray::{array, Array1};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const STEP: f64 = 1e-5;

    /// Observation points above sources with at least unit standoff.
    fn fixture(seed: u64, n: usize, m: usize) -> (Array2<f64>, Array2<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let p = Array2::from_shape_fn((3, n), |(axis, _)| {
            let v: f64 = rng.gen();
            if axis == 2 {
                v - 2.0
            } else {
                v
            }
        });
        let s = Array2::from_shape_fn((3, m), |_| rng.gen::<f64>());
        (p, s)
    }

    fn shifted(p: &Array2<f64>, axis: usize, delta: f64) -> Array2<f64> {
        let mut out = p.clone();
        out.row_mut(axis).mapv_inplace(|v| v + delta);
        out
    }

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64, label: &str) {
        assert_eq!(a.shape(), b.shape(), "{}: shape mismatch", label);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < tol, "{}: {} vs {}", label, x, y);
        }
    }

    #[test]
    fn test_single_pair_known_values() {
        // observation directly above the source at unit distance
        let p = array![[0.0], [0.0], [-1.0]];
        let s = array![[0.0], [0.0], [0.0]];
        let params = KernelParams::default();

        let k = inverse_distance(p.view(), s.view(), &params).unwrap();
        assert!((k[[0, 0]] - 1.0).abs() < 1e-12);

        let first = first_derivatives(p.view(), s.view(), &params).unwrap();
        assert_eq!(first.x[[0, 0]], 0.0);
        assert!((first.z[[0, 0]] - 1.0).abs() < 1e-12);

        let second = second_derivatives(p.view(), s.view(), &params).unwrap();
        assert!((second.xx[[0, 0]] + 1.0).abs() < 1e-12);
        assert!((second.yy[[0, 0]] + 1.0).abs() < 1e-12);
        assert!((second.zz()[[0, 0]] - 2.0).abs() < 1e-12);
        assert_eq!(second.xz[[0, 0]], 0.0);
    }

    #[test]
    fn test_first_derivatives_match_finite_differences() {
        let (p, s) = fixture(3, 6, 5);
        let params = KernelParams::default();
        let first = first_derivatives(p.view(), s.view(), &params).unwrap();

        for (axis, analytic) in [(0, &first.x), (1, &first.y), (2, &first.z)] {
            let plus = inverse_distance(shifted(&p, axis, STEP).view(), s.view(), &params).unwrap();
            let minus = inverse_distance(shifted(&p, axis, -STEP).view(), s.view(), &params).unwrap();
            let numeric = (plus - minus) / (2.0 * STEP);
            assert_close(analytic, &numeric, 1e-7, "first derivative");
        }
    }

    #[test]
    fn test_second_derivatives_match_finite_differences() {
        let (p, s) = fixture(5, 4, 7);
        let params = KernelParams::default();
        let second = second_derivatives(p.view(), s.view(), &params).unwrap();

        let numeric = |axis: usize| {
            let plus = first_derivatives(shifted(&p, axis, STEP).view(), s.view(), &params).unwrap();
            let minus = first_derivatives(shifted(&p, axis, -STEP).view(), s.view(), &params).unwrap();
            (
                (plus.x - minus.x) / (2.0 * STEP),
                (plus.y - minus.y) / (2.0 * STEP),
                (plus.z - minus.z) / (2.0 * STEP),
            )
        };
        let (d_dx, _, _) = numeric(0);
        let (d_dy, dy_dy, _) = numeric(1);
        let (d_dz, dy_dz, dz_dz) = numeric(2);

        assert_close(&second.xx, &d_dx, 1e-6, "xx");
        assert_close(&second.xy, &d_dy, 1e-6, "xy");
        assert_close(&second.xz, &d_dz, 1e-6, "xz");
        assert_close(&second.yy, &dy_dy, 1e-6, "yy");
        assert_close(&second.yz, &dy_dz, 1e-6, "yz");
        assert_close(&second.zz(), &dz_dz, 1e-6, "zz");
    }

    #[test]
    fn test_laplace_property() {
        let (p, s) = fixture(13, 8, 11);
        let second = second_derivatives(p.view(), s.view(), &KernelParams::default()).unwrap();

        // zz from its own formula, not reconstructed
        let k = inverse_distance(p.view(), s.view(), &KernelParams::default()).unwrap();
        let dz = Array2::from_shape_fn((8, 11), |(i, j)| p[[2, i]] - s[[2, j]]);
        let zz_direct = Zip::from(&dz)
            .and(&k)
            .map_collect(|&dz, &k| 3.0 * dz * dz * k.powi(5) - k.powi(3));

        let trace = &second.xx + &second.yy + &zz_direct;
        assert!(trace.iter().all(|t| t.abs() < 1e-10), "trace = {:?}", trace);
        assert_close(&second.zz(), &zz_direct, 1e-10, "zz");
    }

    #[test]
    fn test_variants_give_same_derivatives() {
        let (p, s) = fixture(11, 5, 6);
        let reference =
            second_derivatives(p.view(), s.view(), &KernelParams::with_variant(SedmVariant::Direct))
                .unwrap();
        for variant in SedmVariant::ALL {
            let second =
                second_derivatives(p.view(), s.view(), &KernelParams::with_variant(variant)).unwrap();
            assert_close(&reference.xx, &second.xx, 1e-10, variant.name());
            assert_close(&reference.yz, &second.yz, 1e-10, variant.name());
        }
    }

    #[test]
    fn test_coincident_points() {
        let p = array![[0.0, 1.0], [0.0, 2.0], [-5.0, 3.0]];
        let s = array![[4.0, 1.0, 7.0], [4.0, 2.0, 7.0], [4.0, 3.0, 7.0]];

        // unguarded by default
        let k = inverse_distance(p.view(), s.view(), &KernelParams::default()).unwrap();
        assert!(!k[[1, 1]].is_finite());
        assert!(k[[0, 0]].is_finite());

        let err = second_derivatives(p.view(), s.view(), &KernelParams::strict()).unwrap_err();
        assert_eq!(
            err,
            KernelError::CoincidentPoints {
                observation: 1,
                source: 1
            }
        );
    }

    #[test]
    fn test_near_coincident_far_from_origin() {
        let p = array![[5.0e6], [7.0e6], [-1.0e3]];
        let s = array![[5.0e6 + 1e-4], [7.0e6], [-1.0e3]];

        // the default works from the offsets, so a 0.1 mm gap is resolved
        let second = second_derivatives(p.view(), s.view(), &KernelParams::strict()).unwrap();
        let dx = p[[0, 0]] - s[[0, 0]];
        let expected = 2.0 / dx.abs().powi(3);
        assert!(second.xx[[0, 0]].is_finite());
        assert!(
            ((second.xx[[0, 0]] - expected) / expected).abs() < 1e-12,
            "xx = {}, expected {}",
            second.xx[[0, 0]],
            expected
        );

        // the expansion loses the gap entirely; strict mode must catch it
        let strict_vectorized = KernelParams {
            variant: SedmVariant::Vectorized,
            strict: true,
        };
        let err = second_derivatives(p.view(), s.view(), &strict_vectorized).unwrap_err();
        assert_eq!(
            err,
            KernelError::CoincidentPoints {
                observation: 0,
                source: 0
            }
        );
        assert!(inverse_distance(p.view(), s.view(), &strict_vectorized).is_err());
    }

    #[test]
    fn test_default_keeps_precision_at_large_offsets() {
        let p = array![[5.0e6 + 0.3], [7.0e6 + 0.7], [-10.0]];
        let s = array![[5.0e6 + 1.1], [7.0e6 - 0.4], [0.0]];

        let params = KernelParams::default();
        let reference = KernelParams::with_variant(SedmVariant::Direct);
        let k = inverse_distance(p.view(), s.view(), &params).unwrap();
        let k_direct = inverse_distance(p.view(), s.view(), &reference).unwrap();
        let rel = ((k[[0, 0]] - k_direct[[0, 0]]) / k_direct[[0, 0]]).abs();
        assert!(rel < 1e-12, "relative error {:e}", rel);

        let second = second_derivatives(p.view(), s.view(), &params).unwrap();
        let second_direct = second_derivatives(p.view(), s.view(), &reference).unwrap();
        for (a, b) in [
            (&second.xx, &second_direct.xx),
            (&second.xy, &second_direct.xy),
            (&second.xz, &second_direct.xz),
            (&second.yy, &second_direct.yy),
            (&second.yz, &second_direct.yz),
        ] {
            let rel = ((a[[0, 0]] - b[[0, 0]]) / b[[0, 0]]).abs();
            assert!(rel < 1e-10, "{} vs {}", a[[0, 0]], b[[0, 0]]);
        }
    }

    #[test]
    fn test_translation_invariance() {
        let (p, s) = fixture(17, 6, 9);
        let origin = [5.0e6, 7.0e6, 0.0];
        let translate = |a: &Array2<f64>| {
            Array2::from_shape_fn(a.dim(), |(axis, i)| a[[axis, i]] + origin[axis])
        };
        let (p_far, s_far) = (translate(&p), translate(&s));
        // offsets between the translated points, shifted back to a local frame
        let p_local = Array2::from_shape_fn(p.dim(), |(axis, i)| p_far[[axis, i]] - origin[axis]);
        let s_local = Array2::from_shape_fn(s.dim(), |(axis, i)| s_far[[axis, i]] - origin[axis]);

        let params = KernelParams::default();
        let far = second_derivatives(p_far.view(), s_far.view(), &params).unwrap();
        let local = second_derivatives(p_local.view(), s_local.view(), &params).unwrap();
        assert_close(&far.xx, &local.xx, 1e-12, "xx");
        assert_close(&far.xy, &local.xy, 1e-12, "xy");
        assert_close(&far.yz, &local.yz, 1e-12, "yz");
        assert_close(&far.zz(), &local.zz(), 1e-12, "zz");
    }

    #[test]
    fn test_shape_errors_propagate() {
        let point = Array1::<f64>::zeros(3);
        let s = Array2::<f64>::ones((3, 2));
        let err = first_derivatives(point.view(), s.view(), &KernelParams::default()).unwrap_err();
        assert_eq!(err, KernelError::Shape(ShapeError::NotMatrix { name: "P", ndim: 1 }));

        let two_rows = Array2::<f64>::ones((2, 2));
        let err = second_derivatives(s.view(), two_rows.view(), &KernelParams::default()).unwrap_err();
        assert_eq!(err, KernelError::Shape(ShapeError::WrongRowCount { name: "S", rows: 2 }));
    }
}
