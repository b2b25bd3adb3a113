//! Postsolve: nearest pencil, eigenvalues, and the consistency check.
//!
//! At the final point `(Q1, Q2)` the projection `(PS, PT)` of
//! `(Q1·A·Q2, Q1·B·Q2)` is mapped back to
//!
//! ```text
//! PA = Q1ᴴ·PS·Q2ᴴ,   PB = Q1ᴴ·PT·Q2ᴴ
//! ```
//!
//! which is unitarily equivalent to the triangular pair, so its eigenvalues
//! are read off the diagonals: `λ_k = −PS_kk / PT_kk`.
//!
//! Since Q1, Q2 are unitary, `‖A − PA‖² + ‖B − PB‖²` must agree with the
//! closed-form cost at the same point. A disagreement means the point drifted
//! off the manifold or the evaluators are inconsistent, and is reported
//! through [`ConsistencyReport`].

use std::fmt;

use num_complex::Complex64;

use crate::objective::{project_with_mask, Projection, StabilityMask, TransformedPencil};
use crate::problem::{ManifoldPoint, Pencil};

/// Eigenvalue of a pencil `T·x + A` from one diagonal pair `(S_kk, T_kk)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PencilEigenvalue {
    /// `−S_kk / T_kk`
    Finite(Complex64),
    /// `T_kk = 0`, `S_kk != 0`
    Infinite,
    /// `S_kk = T_kk = 0`: the pencil is singular
    Indeterminate,
}

impl PencilEigenvalue {
    pub fn from_diagonal(s_kk: Complex64, t_kk: Complex64) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        if t_kk != zero {
            PencilEigenvalue::Finite(-s_kk / t_kk)
        } else if s_kk != zero {
            PencilEigenvalue::Infinite
        } else {
            PencilEigenvalue::Indeterminate
        }
    }

    /// Modulus of a finite eigenvalue.
    pub fn modulus(&self) -> Option<f64> {
        match self {
            PencilEigenvalue::Finite(z) => Some(z.norm()),
            _ => None,
        }
    }
}

impl fmt::Display for PencilEigenvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PencilEigenvalue::Finite(z) => write!(f, "{:.6e}{:+.6e}i", z.re, z.im),
            PencilEigenvalue::Infinite => write!(f, "inf"),
            PencilEigenvalue::Indeterminate => write!(f, "0/0"),
        }
    }
}

/// Outcome of comparing the solver's cost with the reassembled distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsistencyReport {
    /// Closed-form cost reported by the solver
    pub solver_cost: f64,
    /// `‖A − PA‖² + ‖B − PB‖²`
    pub reconstructed_cost: f64,
    /// `|solver_cost − reconstructed_cost|`
    pub gap: f64,
    /// Allowed absolute gap
    pub tolerance: f64,
    pub passed: bool,
}

/// Nearest pencil and derived data at a point, in the units of `pencil`.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub projection: Projection,
    pub mask: StabilityMask,
    pub nearest: Pencil,
    pub eigenvalues: Vec<PencilEigenvalue>,
    /// See [`StabilityMask::margin`]
    pub mask_margin: f64,
}

/// Assemble the nearest stable pencil at `point`.
pub fn reconstruct(pencil: &Pencil, point: &ManifoldPoint) -> Reconstruction {
    let (s, t) = TransformedPencil::pair(pencil, point);
    let mask = StabilityMask::new(&s, &t);
    let mask_margin = StabilityMask::margin(&s, &t);
    let projection = project_with_mask(&s, &t, &mask);

    let q1h = point.q1.adjoint();
    let q2h = point.q2.adjoint();
    let nearest = Pencil {
        a: &q1h * &projection.ps * &q2h,
        b: &q1h * &projection.pt * &q2h,
    };

    let eigenvalues = (0..mask.len())
        .map(|k| PencilEigenvalue::from_diagonal(projection.ps[(k, k)], projection.pt[(k, k)]))
        .collect();

    Reconstruction { projection, mask, nearest, eigenvalues, mask_margin }
}

/// Compare `solver_cost` with the squared distance from `pencil` to `nearest`.
///
/// `tol` is an absolute bound on the gap, independent of the cost's size.
pub fn check_consistency(solver_cost: f64, pencil: &Pencil, nearest: &Pencil, tol: f64) -> ConsistencyReport {
    let reconstructed_cost = pencil.distance_sq(nearest);
    let gap = (solver_cost - reconstructed_cost).abs();
    ConsistencyReport {
        solver_cost,
        reconstructed_cost,
        gap,
        tolerance: tol,
        passed: gap <= tol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::dense::{from_real_rows, random_gaussian};
    use crate::manifold::{Manifold, UnitaryProduct};
    use crate::objective::cost;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_eigenvalue_classes() {
        assert_eq!(PencilEigenvalue::from_diagonal(c(1.0, 0.0), c(2.0, 0.0)), PencilEigenvalue::Finite(c(-0.5, 0.0)));
        assert_eq!(PencilEigenvalue::from_diagonal(c(1.0, 0.0), c(0.0, 0.0)), PencilEigenvalue::Infinite);
        assert_eq!(PencilEigenvalue::from_diagonal(c(0.0, 0.0), c(0.0, 0.0)), PencilEigenvalue::Indeterminate);
        assert_eq!(PencilEigenvalue::Infinite.modulus(), None);
        assert_eq!(PencilEigenvalue::Finite(c(3.0, 4.0)).modulus(), Some(5.0));
    }

    #[test]
    fn test_reconstruct_swap_pencil() {
        let a = from_real_rows(2, &[1.0, 0.0, 0.0, 1.0]);
        let b = from_real_rows(2, &[0.0, 1.0, 1.0, 0.0]);
        let pencil = Pencil::new(a, b).unwrap();
        let point = ManifoldPoint::identity(2);
        let rec = reconstruct(&pencil, &point);

        // Both indices flagged: PS = diag(0.5, 0.5), PT = [[0.5, 1], [0, 0.5]]
        assert_eq!(rec.mask.as_slice(), &[true, true]);
        assert!((rec.nearest.a[(0, 0)] - c(0.5, 0.0)).norm() < 1e-15);
        assert!((rec.nearest.b[(1, 1)] - c(0.5, 0.0)).norm() < 1e-15);
        assert_eq!(rec.nearest.b[(1, 0)], c(0.0, 0.0));
        assert_eq!(rec.eigenvalues, vec![PencilEigenvalue::Finite(c(-1.0, 0.0)); 2]);

        let report = check_consistency(cost(&pencil, &point), &pencil, &rec.nearest, 1e-12);
        assert!(report.passed, "{:?}", report);
        assert!((report.reconstructed_cost - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_reconstruct_matches_cost_at_random_point() {
        let mut rng = StdRng::seed_from_u64(51);
        let n = 4;
        let pencil = Pencil::new(random_gaussian(n, &mut rng), random_gaussian(n, &mut rng)).unwrap();
        let point = UnitaryProduct::new(n).random_point(&mut rng);
        let rec = reconstruct(&pencil, &point);

        let report = check_consistency(cost(&pencil, &point), &pencil, &rec.nearest, 1e-10);
        assert!(report.passed, "{:?}", report);

        // Every finite eigenvalue of the nearest pencil lies in the closed unit disk
        for ev in &rec.eigenvalues {
            if let Some(r) = ev.modulus() {
                assert!(r <= 1.0 + 1e-12, "|λ| = {}", r);
            }
        }
    }

    #[test]
    fn test_consistency_failure_detected() {
        let a = from_real_rows(1, &[1.0]);
        let b = from_real_rows(1, &[0.0]);
        let pencil = Pencil::new(a, b.clone()).unwrap();
        let far = Pencil::new(from_real_rows(1, &[4.0]), b).unwrap();
        let report = check_consistency(0.0, &pencil, &far, 1e-10);
        assert!(!report.passed);
        assert!((report.gap - 9.0).abs() < 1e-15);
    }

    #[test]
    fn test_consistency_tolerance_is_absolute() {
        // dist² = 100 between the two pencils
        let b = from_real_rows(1, &[0.0]);
        let pencil = Pencil::new(from_real_rows(1, &[10.0]), b.clone()).unwrap();
        let near = Pencil::new(from_real_rows(1, &[0.0]), b).unwrap();

        let report = check_consistency(100.0 + 5e-9, &pencil, &near, 1e-10);
        assert_eq!(report.tolerance, 1e-10);
        assert!(!report.passed, "{:?}", report);

        let report = check_consistency(100.0, &pencil, &near, 1e-10);
        assert!(report.passed, "{:?}", report);
    }
}
