//! Termination criteria for the trust-region solver.
//!
//! Checks, in order:
//! - Numerical errors: non-finite cost or gradient norm
//! - Stationarity: Riemannian gradient norm below tolerance
//! - Budgets: outer iterations, wall-clock time
//! - Radius collapse: trust region too small to make progress

use std::time::Duration;

use crate::problem::{SolveStatus, SolverSettings};

/// Termination criteria.
#[derive(Debug, Clone)]
pub struct TerminationCriteria {
    /// Tolerance on the Riemannian gradient norm
    pub tol_grad: f64,

    /// Maximum outer iterations
    pub max_iter: usize,

    /// Wall-clock budget
    pub time_limit: Option<Duration>,

    /// Smallest admissible trust-region radius
    pub radius_min: f64,
}

impl Default for TerminationCriteria {
    fn default() -> Self {
        Self {
            tol_grad: 1e-6,
            max_iter: 1000,
            time_limit: None,
            radius_min: 1e-12,
        }
    }
}

impl TerminationCriteria {
    pub fn from_settings(settings: &SolverSettings) -> Self {
        Self {
            tol_grad: settings.tol_grad,
            max_iter: settings.max_iter,
            time_limit: settings.time_limit_ms.map(Duration::from_millis),
            radius_min: settings.radius_min,
        }
    }
}

/// Check termination conditions at the start of an outer iteration.
///
/// Returns `Some(status)` if the solver should stop, `None` otherwise.
pub fn check_termination(
    cost: f64,
    grad_norm: f64,
    radius: f64,
    iter: usize,
    elapsed: Duration,
    criteria: &TerminationCriteria,
) -> Option<SolveStatus> {
    if !cost.is_finite() || !grad_norm.is_finite() {
        return Some(SolveStatus::NumericalError);
    }

    if grad_norm < criteria.tol_grad {
        return Some(SolveStatus::Converged);
    }

    if iter >= criteria.max_iter {
        return Some(SolveStatus::MaxIters);
    }

    if let Some(limit) = criteria.time_limit {
        if elapsed >= limit {
            return Some(SolveStatus::TimeLimit);
        }
    }

    if radius < criteria.radius_min {
        return Some(SolveStatus::RadiusCollapse);
    }

    None
}
