//! Euclidean gradient.
//!
//! With residuals `RS = S − PS` and `RT = T − PT`, the differential of the
//! cost is `df = 2·Re⟨RS, dS⟩ + 2·Re⟨RT, dT⟩` (the mask is locally constant
//! and `d|z| = Re(conj(z/|z|)·dz)`). Pulling `dS = dQ1·A·Q2 + Q1·A·dQ2`
//! and `dT` back to each factor gives
//!
//! ```text
//! grad_Q1 = 2·RT·(B·Q2)ᴴ + 2·RS·(A·Q2)ᴴ
//! grad_Q2 = 2·(Q1·B)ᴴ·RT + 2·(Q1·A)ᴴ·RS
//! ```
//!
//! Q1 and Q2 are treated as unconstrained complex matrices. Projection onto
//! the tangent space of the unitary product is the manifold's job.

use super::factors::TransformedPencil;
use super::mask::StabilityMask;
use super::projector::project_with_mask;
use crate::linalg::dense::scale;
use crate::linalg::CMat;
use crate::problem::{ManifoldPoint, Pencil, TangentVector};

/// Euclidean gradient of [`super::cost::cost`] with respect to `(Q1, Q2)`.
pub fn egrad(pencil: &Pencil, point: &ManifoldPoint) -> TangentVector {
    let tp = TransformedPencil::new(pencil, point);
    let mask = StabilityMask::new(&tp.s, &tp.t);
    let (rs, rt) = residuals(&tp, &mask);
    gradient_from_residuals(&tp, &rs, &rt)
}

/// `(S − PS, T − PT)` for the given mask.
pub(crate) fn residuals(tp: &TransformedPencil, mask: &StabilityMask) -> (CMat, CMat) {
    let proj = project_with_mask(&tp.s, &tp.t, mask);
    (&tp.s - proj.ps, &tp.t - proj.pt)
}

pub(crate) fn gradient_from_residuals(tp: &TransformedPencil, rs: &CMat, rt: &CMat) -> TangentVector {
    let g1 = rt * tp.b_q2.adjoint() + rs * tp.a_q2.adjoint();
    let g2 = tp.q1_b.adjoint() * rt + tp.q1_a.adjoint() * rs;
    TangentVector::new(scale(&g1, 2.0), scale(&g2, 2.0))
}
