//! pencil-core: nearest stable matrix pencil
//!
//! Given a square complex pencil `T·x + A`, stored as `(A, B)`, this library
//! finds a nearby pencil `(PA, PB)` whose eigenvalues `x` lie in the closed
//! unit disk, by minimizing over unitary `Q1, Q2` the squared distance from
//! `(Q1·A·Q2, Q1·B·Q2)` to the set of upper-triangular pencils with
//! `|S_kk| <= |T_kk|`.
//!
//! # Algorithm
//!
//! - **Objective**: closed-form cost, Euclidean gradient and Hessian-vector
//!   product of the distance to the projected (triangular, stable) pencil
//! - **Manifold**: U(n) × U(n) with the embedded metric, QR retraction
//! - **Solver**: Riemannian trust region with Steihaug–Toint truncated CG
//! - **Presolve**: uniform rescaling to `‖[A | B]‖_F = 100`
//! - **Postsolve**: nearest pencil `PA = Q1ᴴ·PS·Q2ᴴ`, `PB = Q1ᴴ·PT·Q2ᴴ`,
//!   its eigenvalues, and a cost/distance consistency check
//!
//! # Example
//!
//! ```ignore
//! use pencil_core::{solve, Pencil, SolverSettings};
//! use pencil_core::linalg::dense::from_real_rows;
//!
//! let a = from_real_rows(2, &[1.0, 0.0, 0.0, 1.0]);
//! let b = from_real_rows(2, &[0.0, 1.0, 1.0, 0.0]);
//! let pencil = Pencil::new(a, b)?;
//!
//! let result = solve(&pencil, &SolverSettings::default().with_seed(1))?;
//! println!("Status: {}", result.status);
//! println!("Distance: {}", result.distance);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod linalg;
pub mod manifold;
pub mod objective;
pub mod postsolve;
pub mod presolve;
pub mod problem;
pub mod rtr;

use std::time::Instant;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::manifold::{Manifold, UnitaryProduct};
use crate::objective::PencilObjective;
use crate::postsolve::{check_consistency, reconstruct};
use crate::presolve::PencilScaling;
use crate::rtr::solve_rtr;

// Re-export main types
pub use error::{PencilError, PencilResult};
pub use postsolve::{ConsistencyReport, PencilEigenvalue};
pub use problem::{
    IterationRecord, ManifoldPoint, Pencil, SolveInfo, SolveResult, SolveStatus, SolverSettings,
    TangentVector,
};

/// Main solve entry point.
///
/// Rescales the pencil, runs the trust-region solver from the warm start or
/// a random point, and assembles the nearest stable pencil in the original
/// units.
///
/// Non-convergence is reported through [`SolveResult::status`]. A failed
/// cost/distance consistency check returns [`PencilError::Inconsistent`]
/// with the full result attached.
pub fn solve(pencil: &Pencil, settings: &SolverSettings) -> PencilResult<SolveResult> {
    let start = Instant::now();
    pencil.validate()?;
    settings.validate()?;

    let n = pencil.dim();
    let manifold = UnitaryProduct::new(n);
    let (scaling, scaled) = PencilScaling::normalize(pencil, settings.target_norm);

    let x0 = match &settings.warm_start {
        Some(point) => {
            manifold.check_point(point, settings.unitary_tol)?;
            point.clone()
        }
        None => {
            let mut rng = match settings.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            manifold.random_point(&mut rng)
        }
    };

    if settings.verbosity >= 1 {
        info!(
            "pencil-core: n={} ‖[A|B]‖={:.3e} scale={:.3e} start={}",
            n,
            pencil.frobenius_norm(),
            scaling.factor,
            if settings.warm_start.is_some() { "warm" } else { "random" }
        );
    }

    let objective = PencilObjective::new(&scaled);
    let outcome = solve_rtr(&manifold, &objective, x0, settings);

    let rec = reconstruct(&scaled, &outcome.point);
    let consistency = check_consistency(outcome.cost, &scaled, &rec.nearest, settings.consistency_tol);

    if rec.mask_margin < settings.mask_margin_warn {
        warn!(
            "final point is {:.3e} (relative) from a stability-mask switch; \
             Hessian information there is unreliable",
            rec.mask_margin
        );
    }

    let cost = scaling.unscale_cost(outcome.cost);
    let timers = &outcome.timers;
    let info = SolveInfo {
        iters: outcome.iters,
        inner_iters: outcome.inner_iters,
        solve_time_ms: start.elapsed().as_millis() as u64,
        cost_time_ms: timers.cost.millis(),
        grad_time_ms: timers.gradient.millis(),
        hess_time_ms: timers.hessian.millis(),
        cost_evals: timers.cost.calls,
        grad_evals: timers.gradient.calls,
        hess_evals: timers.hessian.calls,
        grad_norm: outcome.grad_norm,
        radius: outcome.radius,
        scaled_cost: outcome.cost,
        scale_factor: scaling.factor,
        mask_margin: rec.mask_margin,
        unstable_count: rec.mask.count(),
        history: outcome.history,
    };

    let result = SolveResult {
        status: outcome.status,
        cost,
        distance: cost.max(0.0).sqrt(),
        point: outcome.point,
        nearest: scaling.unscale_pencil(&rec.nearest),
        eigenvalues: rec.eigenvalues,
        consistency,
        info,
    };

    if settings.verbosity >= 1 {
        info!(
            "status={} iters={} inner={} cost={:.6e} |grad|={:.3e} moved={}/{} time={}ms",
            result.status,
            result.info.iters,
            result.info.inner_iters,
            result.cost,
            result.info.grad_norm,
            result.info.unstable_count,
            n,
            result.info.solve_time_ms
        );
    }

    // A non-finite cost already carries its own status
    if !consistency.passed && result.status != SolveStatus::NumericalError {
        warn!(
            "consistency check failed: gap {:.3e} > {:.3e}",
            consistency.gap, consistency.tolerance
        );
        return Err(PencilError::Inconsistent {
            report: consistency,
            result: Box::new(result),
        });
    }

    Ok(result)
}
