//! Timed access to the objective and the manifold.

use super::perf::PerfTimers;
use crate::manifold::Manifold;
use crate::objective::Objective;

/// Bundles a manifold and an objective, routing every call through
/// [`PerfTimers`] so section times and evaluation counts stay accurate.
pub struct Evaluator<'a, M, O> {
    pub manifold: &'a M,
    pub objective: &'a O,
    pub timers: PerfTimers,
}

impl<'a, M, O> Evaluator<'a, M, O>
where
    M: Manifold,
    O: Objective<Point = M::Point, Tangent = M::Tangent>,
{
    pub fn new(manifold: &'a M, objective: &'a O) -> Self {
        Self { manifold, objective, timers: PerfTimers::default() }
    }

    pub fn cost(&mut self, x: &M::Point) -> f64 {
        let _t = self.timers.cost.start();
        self.objective.cost(x)
    }

    /// `(euclidean, riemannian)` gradients at `x`.
    pub fn gradient(&mut self, x: &M::Point) -> (M::Tangent, M::Tangent) {
        let _t = self.timers.gradient.start();
        let egrad = self.objective.egrad(x);
        let rgrad = self.manifold.egrad_to_rgrad(x, &egrad);
        (egrad, rgrad)
    }

    /// Riemannian Hessian at `x` applied to the tangent vector `u`.
    pub fn hessian(&mut self, x: &M::Point, egrad: &M::Tangent, u: &M::Tangent) -> M::Tangent {
        let _t = self.timers.hessian.start();
        let ehess = self.objective.ehess(x, u);
        self.manifold.ehess_to_rhess(x, egrad, &ehess, u)
    }

    pub fn retract(&mut self, x: &M::Point, u: &M::Tangent) -> M::Point {
        let _t = self.timers.retraction.start();
        self.manifold.retract(x, u)
    }

    pub fn inner(&self, x: &M::Point, u: &M::Tangent, v: &M::Tangent) -> f64 {
        self.manifold.inner(x, u, v)
    }
}
