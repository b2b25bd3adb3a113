//! Riemannian trust-region outer loop.
//!
//! Each iteration solves the trust-region subproblem with truncated CG,
//! retracts the step, and compares the actual decrease of the cost with the
//! decrease predicted by the quadratic model:
//!
//! ```text
//! ρ = (f(x) − f(R_x(η)) + reg) / (−⟨g, η⟩ − ½⟨η, H[η]⟩ + reg)
//! reg = max(1, |f(x)|) · ε · rho_regularization
//! ```
//!
//! The regularization keeps ρ meaningful once both differences fall to
//! round-off level near a minimizer.
//!
//! Radius update: shrink by 4 when ρ < ¼ or the model failed to decrease;
//! double (up to `radius_max`) when ρ > ¾ and the step reached the boundary.
//! A step is accepted when the model decreased and ρ > `accept_ratio`.

use std::time::{Duration, Instant};

use log::{debug, info};

use super::diagnostics::DiagnosticsConfig;
use super::evaluator::Evaluator;
use super::perf::PerfTimers;
use super::tcg::{truncated_cg, TcgOptions};
use super::termination::{check_termination, TerminationCriteria};
use crate::manifold::Manifold;
use crate::objective::Objective;
use crate::problem::{IterationRecord, SolveStatus, SolverSettings};

/// Final state of a trust-region run.
#[derive(Debug, Clone)]
pub struct TrustRegionOutcome<P> {
    pub status: SolveStatus,
    pub point: P,
    pub cost: f64,
    pub grad_norm: f64,
    pub radius: f64,
    pub iters: usize,
    pub inner_iters: usize,
    pub timers: PerfTimers,
    pub history: Vec<IterationRecord>,
    pub elapsed: Duration,
}

/// Radius bounds and inner-solve options resolved against the manifold.
#[derive(Debug, Clone, Copy)]
pub struct TrustRegionParams {
    pub radius_max: f64,
    pub radius_init: f64,
    pub tcg: TcgOptions,
}

impl TrustRegionParams {
    pub fn resolve<M: Manifold>(manifold: &M, settings: &SolverSettings) -> Self {
        let radius_max = settings.radius_max.unwrap_or_else(|| manifold.typical_dist());
        let radius_init = settings.radius_init.unwrap_or(radius_max / 8.0).min(radius_max);
        let max_inner = settings.max_inner_iter.unwrap_or_else(|| manifold.dimension()).max(1);
        Self {
            radius_max,
            radius_init,
            tcg: TcgOptions {
                max_inner,
                min_inner: settings.min_inner_iter.min(max_inner),
                kappa: settings.tcg_kappa,
                theta: settings.tcg_theta,
            },
        }
    }
}

/// Minimize `objective` over `manifold` from `x0`.
pub fn solve_rtr<M, O>(
    manifold: &M,
    objective: &O,
    x0: M::Point,
    settings: &SolverSettings,
) -> TrustRegionOutcome<M::Point>
where
    M: Manifold,
    O: Objective<Point = M::Point, Tangent = M::Tangent>,
{
    let start = Instant::now();
    let diag = DiagnosticsConfig::from_env();
    let params = TrustRegionParams::resolve(manifold, settings);
    let criteria = TerminationCriteria::from_settings(settings);
    let mut ev = Evaluator::new(manifold, objective);

    let log_rows = settings.verbosity >= 2 || diag.enabled;
    if log_rows {
        info!(
            "{:>5} {:>14} {:>10} {:>10} {:>10} {:>6} {:>4}  {}",
            "iter", "cost", "|grad|", "radius", "rho", "inner", "acc", "tcg stop"
        );
    }

    let mut x = x0;
    let mut fx = ev.cost(&x);
    let (mut egrad, mut grad) = ev.gradient(&x);
    let mut grad_norm = manifold.norm(&x, &grad);
    let mut radius = params.radius_init;

    let mut iter = 0;
    let mut inner_total = 0;
    let mut history = Vec::new();

    let status = loop {
        if let Some(status) = check_termination(fx, grad_norm, radius, iter, start.elapsed(), &criteria) {
            break status;
        }

        let tcg_start = Instant::now();
        let step = truncated_cg(&mut ev, &x, &egrad, &grad, radius, &params.tcg);
        ev.timers.subproblem.record(tcg_start.elapsed());
        inner_total += step.iters;

        let x_prop = ev.retract(&x, &step.eta);
        let f_prop = ev.cost(&x_prop);

        let model_decrease =
            -(manifold.inner(&x, &grad, &step.eta) + 0.5 * manifold.inner(&x, &step.eta, &step.heta));
        let actual_decrease = fx - f_prop;
        let reg = fx.abs().max(1.0) * f64::EPSILON * settings.rho_regularization;
        let rho_num = actual_decrease + reg;
        let rho_den = model_decrease + reg;
        let model_decreased = rho_den >= 0.0;
        let rho = rho_num / rho_den;

        let radius_used = radius;
        if rho.is_nan() || rho < 0.25 || !model_decreased {
            radius /= 4.0;
        } else if rho > 0.75 && step.stop.hit_boundary() {
            radius = (2.0 * radius).min(params.radius_max);
        }

        let accepted = model_decreased && rho > settings.accept_ratio && f_prop.is_finite();
        if accepted {
            x = x_prop;
            fx = f_prop;
            let g = ev.gradient(&x);
            egrad = g.0;
            grad = g.1;
            grad_norm = manifold.norm(&x, &grad);
        }

        if diag.log_inner && (settings.verbosity >= 3 || diag.should_log(iter)) {
            debug!(
                "iter {} tcg: {} after {} steps, model decrease {:.3e}, actual {:.3e}",
                iter,
                step.stop,
                step.iters,
                model_decrease,
                actual_decrease
            );
        }
        if settings.verbosity >= 2 || diag.should_log(iter) {
            info!(
                "{:>5} {:>14.8e} {:>10.3e} {:>10.3e} {:>10.3e} {:>6} {:>4}  {}",
                iter,
                fx,
                grad_norm,
                radius_used,
                rho,
                step.iters,
                if accepted { "yes" } else { "no" },
                step.stop
            );
        }

        if settings.record_history {
            history.push(IterationRecord {
                iter,
                cost: fx,
                grad_norm,
                radius: radius_used,
                rho,
                inner_iters: step.iters,
                accepted,
            });
        }

        iter += 1;
    };

    TrustRegionOutcome {
        status,
        point: x,
        cost: fx,
        grad_norm,
        radius,
        iters: iter,
        inner_iters: inner_total,
        timers: ev.timers,
        history,
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::dense::{from_real_rows, random_gaussian};
    use crate::manifold::UnitaryProduct;
    use crate::objective::PencilObjective;
    use crate::problem::{ManifoldPoint, Pencil};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_params_defaults() {
        let m = UnitaryProduct::new(3);
        let p = TrustRegionParams::resolve(&m, &SolverSettings::default());
        assert!((p.radius_max - m.typical_dist()).abs() < 1e-15);
        assert!((p.radius_init - m.typical_dist() / 8.0).abs() < 1e-15);
        assert_eq!(p.tcg.max_inner, m.dimension());
    }

    #[test]
    fn test_admissible_start_converges_immediately() {
        let a = from_real_rows(2, &[0.5, 1.0, 0.0, 0.3]);
        let b = from_real_rows(2, &[1.0, 0.0, 0.0, -2.0]);
        let pencil = Pencil::new(a, b).unwrap();
        let obj = PencilObjective::new(&pencil);
        let m = UnitaryProduct::new(2);

        let out = solve_rtr(&m, &obj, ManifoldPoint::identity(2), &SolverSettings::default());
        assert_eq!(out.status, SolveStatus::Converged);
        assert_eq!(out.iters, 0);
        assert_eq!(out.cost, 0.0);
        assert_eq!(out.timers.cost.calls, 1);
    }

    #[test]
    fn test_cost_never_increases() {
        let mut rng = StdRng::seed_from_u64(41);
        let n = 3;
        let pencil = Pencil::new(random_gaussian(n, &mut rng), random_gaussian(n, &mut rng)).unwrap();
        let obj = PencilObjective::new(&pencil);
        let m = UnitaryProduct::new(n);
        let x0 = m.random_point(&mut rng);
        let f0 = obj.cost(&x0);

        let settings = SolverSettings::default().with_max_iter(40).with_history();
        let out = solve_rtr(&m, &obj, x0, &settings);

        assert!(out.cost <= f0 + 1e-10 * f0.max(1.0));
        assert_eq!(out.history.len(), out.iters);
        let mut prev = f0;
        for rec in &out.history {
            assert!(rec.cost <= prev + 1e-10 * prev.max(1.0), "iter {}: {} > {}", rec.iter, rec.cost, prev);
            prev = rec.cost;
        }
        assert!(m.check_point(&out.point, 1e-10).is_ok());
        assert!(out.timers.hessian.calls >= out.inner_iters);
    }
}
