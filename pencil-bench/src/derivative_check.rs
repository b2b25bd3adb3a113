//! Finite-difference derivative checks at random points.

use pencil_core::linalg::dense::random_gaussian;
use pencil_core::manifold::{Manifold, UnitaryProduct};
use pencil_core::objective::{check_gradient, check_hessian, PencilObjective, StabilityMask, TransformedPencil};
use pencil_core::{Pencil, TangentVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Step sizes for the Taylor-remainder slope.
pub const CHECK_STEPS: [f64; 6] = [1e-3, 5e-4, 2.5e-4, 1.25e-4, 6.25e-5, 3.125e-5];

/// Slope tolerance around the expected value 2.
pub const SLOPE_TOL: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRecord {
    pub point: usize,
    pub grad_slope: f64,
    pub grad_central_error: f64,
    pub hess_slope: f64,
    pub hess_central_error: f64,
    /// Relative distance of the point to a mask switch
    pub mask_margin: f64,
    pub passed: bool,
}

/// Check gradient and Hessian of the distance objective at `points` random
/// unitary pairs, along random ambient directions.
pub fn run_checks(pencil: &Pencil, points: usize, seed: u64) -> Vec<CheckRecord> {
    let n = pencil.dim();
    let manifold = UnitaryProduct::new(n);
    let objective = PencilObjective::new(pencil);
    let mut rng = StdRng::seed_from_u64(seed);

    (0..points)
        .map(|point| {
            let x = manifold.random_point(&mut rng);
            let d = TangentVector::new(random_gaussian(n, &mut rng), random_gaussian(n, &mut rng));

            let (s, t) = TransformedPencil::pair(pencil, &x);
            let mask_margin = StabilityMask::margin(&s, &t);

            let g = check_gradient(&objective, &x, &d, &CHECK_STEPS);
            let h = check_hessian(&objective, &x, &d, &CHECK_STEPS);
            log::debug!("point {}: gradient remainders {:?}", point, g.remainders);
            log::debug!("point {}: hessian remainders {:?}", point, h.remainders);

            CheckRecord {
                point,
                grad_slope: g.slope,
                grad_central_error: g.central_error,
                hess_slope: h.slope,
                hess_central_error: h.central_error,
                mask_margin,
                passed: g.is_second_order(SLOPE_TOL) && h.is_second_order(SLOPE_TOL),
            }
        })
        .collect()
}

pub fn print_check_table(records: &[CheckRecord]) {
    println!(
        "\n{:>5} {:>10} {:>12} {:>10} {:>12} {:>12} {:>6}",
        "Point", "g slope", "g central", "H slope", "H central", "Margin", "Pass"
    );
    println!("{}", "-".repeat(73));
    for r in records {
        println!(
            "{:>5} {:>10.4} {:>12.3e} {:>10.4} {:>12.3e} {:>12.3e} {:>6}",
            r.point,
            r.grad_slope,
            r.grad_central_error,
            r.hess_slope,
            r.hess_central_error,
            r.mask_margin,
            if r.passed { "yes" } else { "NO" }
        );
    }
}
