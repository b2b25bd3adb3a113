//! Steihaug–Toint truncated conjugate gradient for the trust-region
//! subproblem
//!
//! ```text
//! min_η  m(η) = ⟨g, η⟩ + ½⟨η, H[η]⟩   subject to ‖η‖ <= Δ
//! ```
//!
//! on the tangent space at the current iterate. Stops on negative
//! curvature, on leaving the trust region (both finish with a step to the
//! boundary), on reaching the residual target
//! `‖r‖ <= ‖r0‖·min(‖r0‖^θ, κ)`, on a model increase (round-off), or after
//! the inner iteration cap.
//!
//! `e_Pe = ⟨η, η⟩`, `e_Pd = ⟨η, δ⟩` and `d_Pd = ⟨δ, δ⟩` are updated by
//! recurrence instead of being recomputed.

use std::fmt;

use super::evaluator::Evaluator;
use crate::manifold::Manifold;
use crate::objective::Objective;

/// Why the inner solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcgStop {
    NegativeCurvature,
    ExceededRadius,
    ReachedTarget,
    ModelIncreased,
    MaxInnerIterations,
}

impl TcgStop {
    /// The returned step lies on the trust-region boundary.
    pub fn hit_boundary(self) -> bool {
        matches!(self, TcgStop::NegativeCurvature | TcgStop::ExceededRadius)
    }
}

impl fmt::Display for TcgStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TcgStop::NegativeCurvature => "negative curvature",
            TcgStop::ExceededRadius => "exceeded trust region",
            TcgStop::ReachedTarget => "reached target residual",
            TcgStop::ModelIncreased => "model increased",
            TcgStop::MaxInnerIterations => "max inner iterations",
        };
        write!(f, "{}", s)
    }
}

/// Inner solve parameters.
#[derive(Debug, Clone, Copy)]
pub struct TcgOptions {
    pub max_inner: usize,
    pub min_inner: usize,
    pub kappa: f64,
    pub theta: f64,
}

/// Step, its Hessian image, and how the solve ended.
#[derive(Debug, Clone)]
pub struct TcgOutcome<T> {
    pub eta: T,
    pub heta: T,
    pub iters: usize,
    pub stop: TcgStop,
}

/// Approximately minimize the quadratic model at `x` within radius `radius`.
pub fn truncated_cg<M, O>(
    ev: &mut Evaluator<'_, M, O>,
    x: &M::Point,
    egrad: &M::Tangent,
    grad: &M::Tangent,
    radius: f64,
    opts: &TcgOptions,
) -> TcgOutcome<M::Tangent>
where
    M: Manifold,
    O: Objective<Point = M::Point, Tangent = M::Tangent>,
{
    let m = ev.manifold;
    let mut eta = m.zero_vec(x);
    let mut heta = m.zero_vec(x);

    let mut r = grad.clone();
    let mut r_r = ev.inner(x, &r, &r);
    let norm_r0 = r_r.sqrt();
    if norm_r0 == 0.0 {
        return TcgOutcome { eta, heta, iters: 0, stop: TcgStop::ReachedTarget };
    }

    let target = norm_r0 * norm_r0.powf(opts.theta).min(opts.kappa);
    let radius_sq = radius * radius;

    let mut z_r = r_r;
    let mut delta = m.lincomb(x, -1.0, &r, 0.0, &r);
    let mut e_pe = 0.0;
    let mut e_pd = 0.0;
    let mut d_pd = z_r;
    let mut model_value = 0.0;

    let mut stop = TcgStop::MaxInnerIterations;
    let mut iters = 0;

    for j in 0..opts.max_inner {
        iters = j + 1;
        let hdelta = ev.hessian(x, egrad, &delta);
        let d_hd = ev.inner(x, &delta, &hdelta);
        let alpha = z_r / d_hd;
        let e_pe_new = e_pe + 2.0 * alpha * e_pd + alpha * alpha * d_pd;

        if d_hd <= 0.0 || e_pe_new >= radius_sq {
            let tau = (-e_pd + (e_pd * e_pd + d_pd * (radius_sq - e_pe)).max(0.0).sqrt()) / d_pd;
            eta = m.lincomb(x, 1.0, &eta, tau, &delta);
            heta = m.lincomb(x, 1.0, &heta, tau, &hdelta);
            stop = if d_hd <= 0.0 { TcgStop::NegativeCurvature } else { TcgStop::ExceededRadius };
            break;
        }

        let new_eta = m.lincomb(x, 1.0, &eta, alpha, &delta);
        let new_heta = m.lincomb(x, 1.0, &heta, alpha, &hdelta);
        let new_model_value = ev.inner(x, &new_eta, grad) + 0.5 * ev.inner(x, &new_eta, &new_heta);
        if new_model_value >= model_value {
            stop = TcgStop::ModelIncreased;
            break;
        }

        e_pe = e_pe_new;
        eta = new_eta;
        heta = new_heta;
        model_value = new_model_value;

        r = m.lincomb(x, 1.0, &r, alpha, &hdelta);
        r_r = ev.inner(x, &r, &r);
        if iters >= opts.min_inner && r_r.sqrt() <= target {
            stop = TcgStop::ReachedTarget;
            break;
        }

        let z_r_old = z_r;
        z_r = r_r;
        let beta = z_r / z_r_old;
        // Re-project to keep δ tangent despite round-off
        delta = m.project(x, &m.lincomb(x, -1.0, &r, beta, &delta));

        e_pd = beta * (e_pd + alpha * d_pd);
        d_pd = z_r + beta * beta * d_pd;
    }

    TcgOutcome { eta, heta, iters, stop }
}
