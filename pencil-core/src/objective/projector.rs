//! Projection onto stable upper-triangular pencils.
//!
//! Given `(S, T)`, the projection `(PS, PT)`:
//! - copies the strictly upper-triangular entries,
//! - zeroes the strictly lower-triangular entries,
//! - for each flagged index k (`|S_kk| > |T_kk|`), moves both diagonal
//!   entries to the common magnitude `m = (|S_kk| + |T_kk|) / 2`, each
//!   keeping its own phase: `PS_kk = m·S_kk/|S_kk|`, `PT_kk = m·T_kk/|T_kk|`,
//! - leaves unflagged diagonal entries unchanged.
//!
//! This is the closest point (in Frobenius norm) of the admissible set
//! `{upper triangular, |PS_kk| <= |PT_kk|}`.
//!
//! # Degenerate diagonals
//!
//! A flagged index always has `S_kk != 0`, but `T_kk` may be exactly zero,
//! leaving its phase `0/|0|` undefined. `PT_kk` then takes the phase of
//! `S_kk`. Any unit phase gives a closest point there; borrowing S's keeps
//! `‖S − PS‖² + ‖T − PT‖²` equal to the closed-form cost.

use num_complex::Complex64;

use super::mask::StabilityMask;
use crate::linalg::dense::phase;
use crate::linalg::CMat;

/// Projected pencil `(PS, PT)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Projection of S
    pub ps: CMat,
    /// Projection of T
    pub pt: CMat,
}

/// Project `(s, t)`, computing the mask from the diagonals.
pub fn project(s: &CMat, t: &CMat) -> Projection {
    let mask = StabilityMask::new(s, t);
    project_with_mask(s, t, &mask)
}

/// Project `(s, t)` using a precomputed mask.
///
/// The mask must come from the same `(s, t)`; evaluators compute it once and
/// reuse it for the projection and the derivative formulas.
pub fn project_with_mask(s: &CMat, t: &CMat, mask: &StabilityMask) -> Projection {
    assert_eq!(s.shape(), t.shape(), "S and T must have the same shape");
    assert_eq!(s.nrows(), s.ncols(), "S must be square");
    assert_eq!(mask.len(), s.nrows(), "mask length must match the pencil size");

    let zero = Complex64::new(0.0, 0.0);
    let mut ps = s.clone();
    let mut pt = t.clone();
    let n = s.nrows();

    for j in 0..n {
        for i in (j + 1)..n {
            ps[(i, j)] = zero;
            pt[(i, j)] = zero;
        }
    }

    for k in 0..n {
        if mask.get(k) {
            let s_kk = s[(k, k)];
            let t_kk = t[(k, k)];
            let mid = 0.5 * (s_kk.norm() + t_kk.norm());
            let s_phase = phase(s_kk);
            let t_phase = if t_kk == zero { s_phase } else { phase(t_kk) };
            ps[(k, k)] = s_phase * mid;
            pt[(k, k)] = t_phase * mid;
        }
    }

    Projection { ps, pt }
}
