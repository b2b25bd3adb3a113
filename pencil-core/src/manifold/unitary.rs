//! Unitary group U(n).
//!
//! U(n) = {X ∈ ℂⁿˣⁿ : XᴴX = I}, viewed as a real submanifold of ℂⁿˣⁿ ≅ ℝ²ⁿ²
//! with the metric `⟨U, V⟩ = Re tr(UᴴV)`.
//!
//! ## Geometry
//!
//! ```text
//! T_X U(n) = {Z : XᴴZ + ZᴴX = 0}          (XᴴZ skew-Hermitian)
//! P_X(Z)   = Z − X·herm(XᴴZ)
//! Hess f(X)[U] = P_X(∇²f(X)[U] − U·herm(Xᴴ∇f(X)))
//! R_X(Z)   = qf(X + Z)
//! ```
//!
//! `qf` takes the Q factor of a QR decomposition and fixes the column phases
//! so that R has a positive real diagonal, which makes the factorization, and
//! hence the retraction, unique and smooth.
//!
//! The real dimension is n², and the typical distance `π·√n` is the diameter
//! scale of the group under this metric.

use num_complex::Complex64;
use rand::Rng;

use super::traits::Manifold;
use crate::linalg::dense::{self, herm_part, lincomb, phase, random_gaussian};
use crate::linalg::CMat;

/// Unitary group of n × n matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitaryGroup {
    n: usize,
}

impl UnitaryGroup {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Matrix size.
    pub fn n(&self) -> usize {
        self.n
    }

    /// `x` is n × n with `‖XᴴX − I‖_F <= tol`.
    pub fn is_unitary(&self, x: &CMat, tol: f64) -> bool {
        x.shape() == (self.n, self.n) && dense::unitarity_defect(x) <= tol
    }
}

/// Q factor of `m = Q·R` with column phases chosen so `diag(R) > 0`.
///
/// A zero pivot keeps its column unchanged.
pub fn qf(m: CMat) -> CMat {
    let qr = m.qr();
    let r = qr.r();
    let mut q = qr.q();
    for j in 0..q.ncols().min(r.nrows()) {
        let p = phase(r[(j, j)]);
        if p != Complex64::new(0.0, 0.0) {
            for i in 0..q.nrows() {
                q[(i, j)] *= p;
            }
        }
    }
    q
}

impl Manifold for UnitaryGroup {
    type Point = CMat;
    type Tangent = CMat;

    fn dimension(&self) -> usize {
        self.n * self.n
    }

    fn typical_dist(&self) -> f64 {
        std::f64::consts::PI * (self.n as f64).sqrt()
    }

    fn inner(&self, _x: &CMat, u: &CMat, v: &CMat) -> f64 {
        dense::real_inner(u, v)
    }

    fn project(&self, x: &CMat, z: &CMat) -> CMat {
        z - x * herm_part(&(x.adjoint() * z))
    }

    fn ehess_to_rhess(&self, x: &CMat, egrad: &CMat, ehess: &CMat, u: &CMat) -> CMat {
        let correction = u * herm_part(&(x.adjoint() * egrad));
        self.project(x, &(ehess - correction))
    }

    fn retract(&self, x: &CMat, u: &CMat) -> CMat {
        qf(x + u)
    }

    fn zero_vec(&self, _x: &CMat) -> CMat {
        dense::zeros(self.n)
    }

    fn lincomb(&self, _x: &CMat, a: f64, u: &CMat, b: f64, v: &CMat) -> CMat {
        lincomb(a, u, b, v)
    }

    fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> CMat {
        qf(random_gaussian(self.n, rng))
    }

    fn random_tangent<R: Rng + ?Sized>(&self, x: &CMat, rng: &mut R) -> CMat {
        let z = self.project(x, &random_gaussian(self.n, rng));
        let nrm = self.norm(x, &z);
        if nrm > 0.0 {
            dense::scale(&z, 1.0 / nrm)
        } else {
            z
        }
    }
}
