//! Per-diagonal stability mask.
//!
//! `mask[k] = |S_kk| > |T_kk|` marks the indices whose eigenvalue
//! `-S_kk/T_kk` lies outside the closed unit disk. Those are the only
//! diagonal entries the projection moves. The comparison is strict, so an
//! index with `|S_kk| == |T_kk|` (including `0 == 0`) is left alone.
//!
//! The mask is the sole non-smooth ingredient of the objective: it is
//! piecewise constant and switches on the set `|S_kk| = |T_kk|`. It is
//! computed once per evaluation and handed explicitly to every formula that
//! depends on it.

use crate::linalg::CMat;

/// Boolean vector of length n, `true` where the diagonal must be corrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityMask {
    unstable: Vec<bool>,
}

impl StabilityMask {
    /// Compare diagonal magnitudes of `s` and `t`.
    pub fn new(s: &CMat, t: &CMat) -> Self {
        debug_assert_eq!(s.shape(), t.shape());
        let n = s.nrows().min(s.ncols());
        let unstable = (0..n).map(|k| s[(k, k)].norm() > t[(k, k)].norm()).collect();
        Self { unstable }
    }

    /// Build a mask from explicit flags.
    pub fn from_flags(unstable: Vec<bool>) -> Self {
        Self { unstable }
    }

    /// Number of diagonal indices.
    pub fn len(&self) -> usize {
        self.unstable.len()
    }

    /// True for a 0 × 0 pencil.
    pub fn is_empty(&self) -> bool {
        self.unstable.is_empty()
    }

    /// Flag for index k.
    #[inline]
    pub fn get(&self, k: usize) -> bool {
        self.unstable[k]
    }

    /// Flags as a slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.unstable
    }

    /// Number of flagged indices.
    pub fn count(&self) -> usize {
        self.unstable.iter().filter(|&&u| u).count()
    }

    /// Smallest relative gap `||S_kk| − |T_kk|| / (|S_kk| + |T_kk|)` over the
    /// diagonal, ignoring indices where both entries vanish.
    ///
    /// Values near zero mean the point sits next to a mask switch, where the
    /// Hessian (which treats the mask as constant) loses accuracy. Returns
    /// `f64::INFINITY` when every diagonal pair is zero.
    pub fn margin(s: &CMat, t: &CMat) -> f64 {
        let n = s.nrows().min(s.ncols());
        let mut margin = f64::INFINITY;
        for k in 0..n {
            let abs_s = s[(k, k)].norm();
            let abs_t = t[(k, k)].norm();
            let total = abs_s + abs_t;
            if total > 0.0 {
                margin = margin.min((abs_s - abs_t).abs() / total);
            }
        }
        margin
    }
}
