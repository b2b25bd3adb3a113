//! Manifold trait used by the trust-region solver.

use rand::Rng;

/// Riemannian submanifold of a Euclidean space.
///
/// Tangent vectors are stored in ambient coordinates. The metric is the
/// restriction of the ambient inner product, so the Riemannian gradient is the
/// tangent projection of the Euclidean one.
pub trait Manifold {
    /// Point representation
    type Point: Clone;

    /// Tangent vector representation (ambient coordinates)
    type Tangent: Clone;

    /// Real dimension of the manifold.
    fn dimension(&self) -> usize;

    /// Typical distance between two points; sets the default trust-region
    /// radius.
    fn typical_dist(&self) -> f64;

    /// Riemannian metric at `x`.
    fn inner(&self, x: &Self::Point, u: &Self::Tangent, v: &Self::Tangent) -> f64;

    /// Norm induced by [`Manifold::inner`].
    fn norm(&self, x: &Self::Point, u: &Self::Tangent) -> f64 {
        self.inner(x, u, u).max(0.0).sqrt()
    }

    /// Orthogonal projection of an ambient vector onto the tangent space at `x`.
    fn project(&self, x: &Self::Point, z: &Self::Tangent) -> Self::Tangent;

    /// Riemannian gradient from the Euclidean gradient.
    fn egrad_to_rgrad(&self, x: &Self::Point, egrad: &Self::Tangent) -> Self::Tangent {
        self.project(x, egrad)
    }

    /// Riemannian Hessian applied to the tangent vector `u`, from the
    /// Euclidean gradient at `x` and the Euclidean Hessian applied to `u`.
    fn ehess_to_rhess(
        &self,
        x: &Self::Point,
        egrad: &Self::Tangent,
        ehess: &Self::Tangent,
        u: &Self::Tangent,
    ) -> Self::Tangent;

    /// Retraction `R_x(u)`.
    fn retract(&self, x: &Self::Point, u: &Self::Tangent) -> Self::Point;

    /// Zero tangent vector at `x`.
    fn zero_vec(&self, x: &Self::Point) -> Self::Tangent;

    /// `a·u + b·v`.
    fn lincomb(&self, x: &Self::Point, a: f64, u: &Self::Tangent, b: f64, v: &Self::Tangent) -> Self::Tangent;

    /// Random point, distributed uniformly where the manifold allows it.
    fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Point;

    /// Random unit-norm tangent vector at `x`.
    fn random_tangent<R: Rng + ?Sized>(&self, x: &Self::Point, rng: &mut R) -> Self::Tangent;
}
