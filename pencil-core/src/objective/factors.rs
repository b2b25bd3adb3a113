//! Transformed pencil and the factor products shared by the derivatives.

use crate::linalg::CMat;
use crate::problem::{ManifoldPoint, Pencil};

/// `(S, T) = (Q1·A·Q2, Q1·B·Q2)` together with the half products
/// `A·Q2, B·Q2, Q1·A, Q1·B` that the gradient and Hessian reuse.
///
/// Built fresh from the point at every evaluation.
#[derive(Debug, Clone)]
pub struct TransformedPencil {
    /// `Q1·A·Q2`
    pub s: CMat,
    /// `Q1·B·Q2`
    pub t: CMat,
    /// `A·Q2`
    pub a_q2: CMat,
    /// `B·Q2`
    pub b_q2: CMat,
    /// `Q1·A`
    pub q1_a: CMat,
    /// `Q1·B`
    pub q1_b: CMat,
}

impl TransformedPencil {
    /// Form all products for `point`.
    pub fn new(pencil: &Pencil, point: &ManifoldPoint) -> Self {
        let a_q2 = &pencil.a * &point.q2;
        let b_q2 = &pencil.b * &point.q2;
        let q1_a = &point.q1 * &pencil.a;
        let q1_b = &point.q1 * &pencil.b;
        let s = &point.q1 * &a_q2;
        let t = &point.q1 * &b_q2;
        Self { s, t, a_q2, b_q2, q1_a, q1_b }
    }

    /// Only `(S, T)`, for callers that need no derivative data.
    pub fn pair(pencil: &Pencil, point: &ManifoldPoint) -> (CMat, CMat) {
        let s = &point.q1 * &pencil.a * &point.q2;
        let t = &point.q1 * &pencil.b * &point.q2;
        (s, t)
    }
}
