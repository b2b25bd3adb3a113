//! Product U(n) × U(n) carrying the pair `(Q1, Q2)`.
//!
//! Every operation acts factor-wise; the metric is the sum of the factor
//! metrics.

use rand::Rng;

use super::traits::Manifold;
use super::unitary::UnitaryGroup;
use crate::error::PencilResult;
use crate::problem::{ManifoldPoint, TangentVector};

/// Product of two unitary groups of the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitaryProduct {
    factor: UnitaryGroup,
}

impl UnitaryProduct {
    pub fn new(n: usize) -> Self {
        Self { factor: UnitaryGroup::new(n) }
    }

    /// Matrix size of each factor.
    pub fn n(&self) -> usize {
        self.factor.n()
    }

    /// Reject a point whose factors have the wrong size or are not unitary.
    pub fn check_point(&self, x: &ManifoldPoint, tol: f64) -> PencilResult<()> {
        x.check_unitary(self.n(), tol)
    }
}

impl Manifold for UnitaryProduct {
    type Point = ManifoldPoint;
    type Tangent = TangentVector;

    fn dimension(&self) -> usize {
        2 * self.factor.dimension()
    }

    fn typical_dist(&self) -> f64 {
        std::f64::consts::SQRT_2 * self.factor.typical_dist()
    }

    fn inner(&self, x: &ManifoldPoint, u: &TangentVector, v: &TangentVector) -> f64 {
        self.factor.inner(&x.q1, &u.d1, &v.d1) + self.factor.inner(&x.q2, &u.d2, &v.d2)
    }

    fn project(&self, x: &ManifoldPoint, z: &TangentVector) -> TangentVector {
        TangentVector::new(self.factor.project(&x.q1, &z.d1), self.factor.project(&x.q2, &z.d2))
    }

    fn ehess_to_rhess(
        &self,
        x: &ManifoldPoint,
        egrad: &TangentVector,
        ehess: &TangentVector,
        u: &TangentVector,
    ) -> TangentVector {
        TangentVector::new(
            self.factor.ehess_to_rhess(&x.q1, &egrad.d1, &ehess.d1, &u.d1),
            self.factor.ehess_to_rhess(&x.q2, &egrad.d2, &ehess.d2, &u.d2),
        )
    }

    fn retract(&self, x: &ManifoldPoint, u: &TangentVector) -> ManifoldPoint {
        ManifoldPoint::new(self.factor.retract(&x.q1, &u.d1), self.factor.retract(&x.q2, &u.d2))
    }

    fn zero_vec(&self, x: &ManifoldPoint) -> TangentVector {
        TangentVector::new(self.factor.zero_vec(&x.q1), self.factor.zero_vec(&x.q2))
    }

    fn lincomb(
        &self,
        x: &ManifoldPoint,
        a: f64,
        u: &TangentVector,
        b: f64,
        v: &TangentVector,
    ) -> TangentVector {
        TangentVector::new(
            self.factor.lincomb(&x.q1, a, &u.d1, b, &v.d1),
            self.factor.lincomb(&x.q2, a, &u.d2, b, &v.d2),
        )
    }

    fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> ManifoldPoint {
        let q1 = self.factor.random_point(rng);
        let q2 = self.factor.random_point(rng);
        ManifoldPoint::new(q1, q2)
    }

    fn random_tangent<R: Rng + ?Sized>(&self, x: &ManifoldPoint, rng: &mut R) -> TangentVector {
        let d1 = self.factor.random_tangent(&x.q1, rng);
        let d2 = self.factor.random_tangent(&x.q2, rng);
        // Each factor has unit norm; rescale the pair
        let u = TangentVector::new(d1, d2);
        let zero = self.zero_vec(x);
        self.lincomb(x, std::f64::consts::FRAC_1_SQRT_2, &u, 0.0, &zero)
    }
}
