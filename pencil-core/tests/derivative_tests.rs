//! Finite difference validation of the objective derivatives.
//!
//! Gradients and Hessian-vector products of the distance objective are
//! compared with central differences at random points, both in the ambient
//! space (Euclidean derivatives) and on U(n) × U(n) (Riemannian ones).

use pencil_core::linalg::dense::{self, random_gaussian};
use pencil_core::manifold::{Manifold, UnitaryProduct};
use pencil_core::objective::{check_gradient, check_hessian, cost, egrad, ehess, Objective, PencilObjective};
use pencil_core::{ManifoldPoint, Pencil, TangentVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Finite difference tolerance for gradient checking
const FD_GRAD_TOL: f64 = 1e-6;

/// Finite difference tolerance for Hessian checking
const FD_HESS_TOL: f64 = 1e-5;

fn random_pencil(n: usize, rng: &mut StdRng) -> Pencil {
    Pencil::new(random_gaussian(n, rng), random_gaussian(n, rng)).unwrap()
}

fn random_direction(n: usize, rng: &mut StdRng) -> TangentVector {
    TangentVector::new(random_gaussian(n, rng), random_gaussian(n, rng))
}

fn inner(u: &TangentVector, v: &TangentVector) -> f64 {
    dense::real_inner(&u.d1, &v.d1) + dense::real_inner(&u.d2, &v.d2)
}

fn norm(u: &TangentVector) -> f64 {
    inner(u, u).sqrt()
}

fn axpy(x: &ManifoldPoint, eps: f64, d: &TangentVector) -> ManifoldPoint {
    ManifoldPoint::new(dense::lincomb(1.0, &x.q1, eps, &d.d1), dense::lincomb(1.0, &x.q2, eps, &d.d2))
}

/// Directional derivative of the cost by central differences:
/// ⟨∇f(x), d⟩ ≈ (f(x + εd) − f(x − εd)) / (2ε)
fn finite_diff_directional(pencil: &Pencil, x: &ManifoldPoint, d: &TangentVector) -> f64 {
    let eps = 1e-6;
    let f_plus = cost(pencil, &axpy(x, eps, d));
    let f_minus = cost(pencil, &axpy(x, -eps, d));
    (f_plus - f_minus) / (2.0 * eps)
}

/// Hessian-vector product by central differences of the gradient:
/// ∇²f(x) d ≈ (∇f(x + εd) − ∇f(x − εd)) / (2ε)
fn finite_diff_hessian_apply(pencil: &Pencil, x: &ManifoldPoint, d: &TangentVector) -> TangentVector {
    let eps = 1e-6;
    let g_plus = egrad(pencil, &axpy(x, eps, d));
    let g_minus = egrad(pencil, &axpy(x, -eps, d));
    let s = 0.5 / eps;
    TangentVector::new(
        dense::lincomb(s, &g_plus.d1, -s, &g_minus.d1),
        dense::lincomb(s, &g_plus.d2, -s, &g_minus.d2),
    )
}

#[test]
fn test_euclidean_gradient_fd() {
    for seed in 0..5u64 {
        let mut rng = StdRng::seed_from_u64(100 + seed);
        let n = 2 + (seed as usize % 4);
        let pencil = random_pencil(n, &mut rng);
        let x = UnitaryProduct::new(n).random_point(&mut rng);
        let d = random_direction(n, &mut rng);

        let analytic = inner(&egrad(&pencil, &x), &d);
        let fd = finite_diff_directional(&pencil, &x, &d);
        let rel = (analytic - fd).abs() / analytic.abs().max(1.0);
        assert!(
            rel < FD_GRAD_TOL,
            "seed {} n {}: analytic {} vs fd {} (rel {:.3e})",
            seed,
            n,
            analytic,
            fd,
            rel
        );
    }
}

#[test]
fn test_euclidean_gradient_fd_off_manifold() {
    // Evaluators accept arbitrary complex factors
    let mut rng = StdRng::seed_from_u64(7);
    let n = 3;
    let pencil = random_pencil(n, &mut rng);
    let x = ManifoldPoint::new(random_gaussian(n, &mut rng), random_gaussian(n, &mut rng));
    let d = random_direction(n, &mut rng);

    let analytic = inner(&egrad(&pencil, &x), &d);
    let fd = finite_diff_directional(&pencil, &x, &d);
    assert!((analytic - fd).abs() / analytic.abs().max(1.0) < FD_GRAD_TOL);
}

#[test]
fn test_euclidean_hessian_fd() {
    for seed in 0..5u64 {
        let mut rng = StdRng::seed_from_u64(200 + seed);
        let n = 2 + (seed as usize % 4);
        let pencil = random_pencil(n, &mut rng);
        let x = UnitaryProduct::new(n).random_point(&mut rng);
        let d = random_direction(n, &mut rng);

        let analytic = ehess(&pencil, &x, &d);
        let fd = finite_diff_hessian_apply(&pencil, &x, &d);
        let diff = TangentVector::new(&analytic.d1 - &fd.d1, &analytic.d2 - &fd.d2);
        let rel = norm(&diff) / norm(&analytic).max(1.0);
        assert!(rel < FD_HESS_TOL, "seed {} n {}: rel error {:.3e}", seed, n, rel);
    }
}

#[test]
fn test_taylor_remainder_is_second_order() {
    let mut rng = StdRng::seed_from_u64(300);
    let n = 4;
    let pencil = random_pencil(n, &mut rng);
    let obj = PencilObjective::new(&pencil);
    let x = UnitaryProduct::new(n).random_point(&mut rng);
    let d = random_direction(n, &mut rng);
    let steps = [1e-3, 5e-4, 2.5e-4, 1.25e-4, 6.25e-5];

    let g = check_gradient(&obj, &x, &d, &steps);
    assert!(g.is_second_order(0.1), "gradient slope {}", g.slope);
    assert!(g.central_error < FD_GRAD_TOL);

    let h = check_hessian(&obj, &x, &d, &steps);
    assert!(h.is_second_order(0.1), "hessian slope {}", h.slope);
    assert!(h.central_error < FD_HESS_TOL);
}

#[test]
fn test_riemannian_gradient_along_retraction() {
    let mut rng = StdRng::seed_from_u64(400);
    let n = 3;
    let pencil = random_pencil(n, &mut rng);
    let obj = PencilObjective::new(&pencil);
    let m = UnitaryProduct::new(n);
    let x = m.random_point(&mut rng);
    let u = m.random_tangent(&x, &mut rng);

    let grad = m.egrad_to_rgrad(&x, &obj.egrad(&x));
    let slope = m.inner(&x, &grad, &u);
    let f0 = obj.cost(&x);

    let eps = 1e-6;
    let f_plus = obj.cost(&m.retract(&x, &m.lincomb(&x, eps, &u, 0.0, &u)));
    let f_minus = obj.cost(&m.retract(&x, &m.lincomb(&x, -eps, &u, 0.0, &u)));
    let fd = (f_plus - f_minus) / (2.0 * eps);
    assert!((fd - slope).abs() / slope.abs().max(1.0) < FD_GRAD_TOL, "{} vs {}", fd, slope);

    // The Riemannian gradient is tangent and no longer than the Euclidean one
    let egrad = obj.egrad(&x);
    assert!(m.norm(&x, &grad) <= norm(&egrad) * (1.0 + 1e-12));
    assert!(f0 >= 0.0);
}

#[test]
fn test_riemannian_hessian_is_symmetric() {
    for seed in 0..4u64 {
        let mut rng = StdRng::seed_from_u64(500 + seed);
        let n = 3;
        let pencil = random_pencil(n, &mut rng);
        let obj = PencilObjective::new(&pencil);
        let m = UnitaryProduct::new(n);
        let x = m.random_point(&mut rng);
        let u = m.random_tangent(&x, &mut rng);
        let v = m.random_tangent(&x, &mut rng);

        let g = obj.egrad(&x);
        let hu = m.ehess_to_rhess(&x, &g, &obj.ehess(&x, &u), &u);
        let hv = m.ehess_to_rhess(&x, &g, &obj.ehess(&x, &v), &v);

        let uhv = m.inner(&x, &u, &hv);
        let vhu = m.inner(&x, &v, &hu);
        let scale = uhv.abs().max(vhu.abs()).max(1.0);
        assert!((uhv - vhu).abs() < 1e-9 * scale, "seed {}: {} vs {}", seed, uhv, vhu);
    }
}
