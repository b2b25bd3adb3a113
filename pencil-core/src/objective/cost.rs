//! Cost evaluation.
//!
//! ```text
//! f(Q1, Q2) = ‖L(T)‖²_F + ‖L(S)‖²_F + ½·Σ_k mask_k·(|S_kk| − |T_kk|)²
//! ```
//!
//! where `L` is the strictly lower-triangular part. This equals
//! `‖S − PS‖²_F + ‖T − PT‖²_F` for the projection of [`super::projector`],
//! but is evaluated in closed form without forming the projection.

use super::factors::TransformedPencil;
use super::mask::StabilityMask;
use crate::linalg::dense::strict_lower_norm_sq;
use crate::linalg::CMat;
use crate::problem::{ManifoldPoint, Pencil};

/// Squared distance from `(Q1·A·Q2, Q1·B·Q2)` to its projection.
pub fn cost(pencil: &Pencil, point: &ManifoldPoint) -> f64 {
    let (s, t) = TransformedPencil::pair(pencil, point);
    let mask = StabilityMask::new(&s, &t);
    cost_of_pair(&s, &t, &mask)
}

/// Closed-form cost of an already transformed pair.
pub fn cost_of_pair(s: &CMat, t: &CMat, mask: &StabilityMask) -> f64 {
    let mut diag = 0.0;
    for k in 0..mask.len() {
        if mask.get(k) {
            let gap = s[(k, k)].norm() - t[(k, k)].norm();
            diag += gap * gap;
        }
    }
    strict_lower_norm_sq(t) + strict_lower_norm_sq(s) + 0.5 * diag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::dense::{self, from_real_rows};
    use crate::objective::projector::project_with_mask;

    #[test]
    fn test_cost_swap_pencil_scenario() {
        // A = I, B = [[0,1],[1,1]], Q = (I, I):
        // ‖L(T)‖² = 1, ‖L(S)‖² = 0, index 0 flagged with (1 − 0)², index 1 not
        let a = from_real_rows(2, &[1.0, 0.0, 0.0, 1.0]);
        let b = from_real_rows(2, &[0.0, 1.0, 1.0, 1.0]);
        let pencil = Pencil::new(a, b).unwrap();
        let c = cost(&pencil, &ManifoldPoint::identity(2));
        assert!((c - 1.5).abs() < 1e-15, "cost = {}", c);
    }

    #[test]
    fn test_cost_pure_swap_pencil() {
        // B = [[0,1],[1,0]] has a zero diagonal, so both indices are flagged
        let a = from_real_rows(2, &[1.0, 0.0, 0.0, 1.0]);
        let b = from_real_rows(2, &[0.0, 1.0, 1.0, 0.0]);
        let pencil = Pencil::new(a, b).unwrap();
        let c = cost(&pencil, &ManifoldPoint::identity(2));
        assert!((c - 2.0).abs() < 1e-15, "cost = {}", c);
    }

    #[test]
    fn test_cost_matches_projection_distance() {
        let s = from_real_rows(3, &[3.0, 1.0, 2.0, 1.0, -0.5, 1.0, 2.0, 2.0, 2.0]);
        let t = from_real_rows(3, &[1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 1.0, -1.0]);
        let mask = StabilityMask::new(&s, &t);
        let p = project_with_mask(&s, &t, &mask);

        let explicit = dense::frobenius_norm_sq(&(&s - &p.ps)) + dense::frobenius_norm_sq(&(&t - &p.pt));
        let closed = cost_of_pair(&s, &t, &mask);
        assert!((explicit - closed).abs() < 1e-12, "{} vs {}", explicit, closed);
    }

    #[test]
    fn test_cost_zero_for_stable_triangular() {
        let a = from_real_rows(2, &[0.5, 4.0, 0.0, -1.0]);
        let b = from_real_rows(2, &[1.0, 2.0, 0.0, 1.0]);
        let pencil = Pencil::new(a, b).unwrap();
        assert_eq!(cost(&pencil, &ManifoldPoint::identity(2)), 0.0);
    }

    #[test]
    fn test_cost_zero_on_equal_magnitude_boundary() {
        // S_00 = i, T_00 = 1: equal magnitudes, different phases
        let mut a = from_real_rows(2, &[0.0, 2.0, 0.0, 0.5]);
        a[(0, 0)] = num_complex::Complex64::new(0.0, 1.0);
        let b = from_real_rows(2, &[1.0, 3.0, 0.0, 1.0]);
        let pencil = Pencil::new(a, b).unwrap();
        assert_eq!(cost(&pencil, &ManifoldPoint::identity(2)), 0.0);
    }
}
