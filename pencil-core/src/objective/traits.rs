//! Objective trait consumed by the trust-region solver.

/// Smooth cost on a matrix manifold, with Euclidean derivatives.
///
/// Derivatives are taken in the ambient space; turning them into
/// Riemannian quantities is left to the [`crate::manifold::Manifold`].
/// Implementations must be pure functions of the point: the solver calls
/// them in arbitrary order and never expects state to carry between calls.
pub trait Objective {
    /// Point representation
    type Point;

    /// Ambient direction representation
    type Tangent;

    /// Cost at `x`.
    fn cost(&self, x: &Self::Point) -> f64;

    /// Euclidean gradient at `x`.
    fn egrad(&self, x: &Self::Point) -> Self::Tangent;

    /// Euclidean Hessian at `x` applied to `u`.
    fn ehess(&self, x: &Self::Point, u: &Self::Tangent) -> Self::Tangent;
}
