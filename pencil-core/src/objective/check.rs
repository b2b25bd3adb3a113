//! Finite-difference validation of the analytic derivatives.
//!
//! Both checks perturb the factors in the ambient space, `Q + h·D`, without
//! retraction: the evaluators accept any complex factors, so the Euclidean
//! derivatives can be compared directly against differences of the cost
//! and gradient.
//!
//! For each step `h` two quantities are recorded:
//! - the first-order Taylor remainder, which decays like `h²` when the
//!   derivative is right (slope 2 on a log-log plot) and like `h` otherwise,
//! - the relative error of a central difference.
//!
//! Steps should stay small enough that no `|S_kk| = |T_kk|` is crossed;
//! beyond a mask switch the remainder no longer shrinks.

use super::traits::Objective;
use crate::linalg::dense::{self, lincomb};
use crate::problem::{ManifoldPoint, TangentVector};

/// Result of a derivative check along one direction.
#[derive(Debug, Clone)]
pub struct DerivativeCheck {
    /// Step sizes, as given
    pub steps: Vec<f64>,

    /// Taylor remainder at each step
    pub remainders: Vec<f64>,

    /// Least-squares slope of `log(remainder)` against `log(h)`
    pub slope: f64,

    /// Smallest relative central-difference error over all steps
    pub central_error: f64,
}

impl DerivativeCheck {
    /// Slope within `tol` of 2, or remainders already at round-off.
    pub fn is_second_order(&self, tol: f64) -> bool {
        (self.slope - 2.0).abs() <= tol || self.remainders.iter().all(|&r| r <= 1e-13)
    }
}

fn displaced(x: &ManifoldPoint, d: &TangentVector, h: f64) -> ManifoldPoint {
    ManifoldPoint::new(lincomb(1.0, &x.q1, h, &d.d1), lincomb(1.0, &x.q2, h, &d.d2))
}

fn inner(u: &TangentVector, v: &TangentVector) -> f64 {
    dense::real_inner(&u.d1, &v.d1) + dense::real_inner(&u.d2, &v.d2)
}

fn norm_sq(u: &TangentVector) -> f64 {
    dense::frobenius_norm_sq(&u.d1) + dense::frobenius_norm_sq(&u.d2)
}

fn difference(u: &TangentVector, a: f64, v: &TangentVector, b: f64) -> TangentVector {
    TangentVector::new(lincomb(a, &u.d1, b, &v.d1), lincomb(a, &u.d2, b, &v.d2))
}

fn log_slope(steps: &[f64], values: &[f64]) -> f64 {
    let pts: Vec<(f64, f64)> = steps
        .iter()
        .zip(values)
        .filter(|&(_, &v)| v > 0.0)
        .map(|(&h, &v)| (h.ln(), v.ln()))
        .collect();
    if pts.len() < 2 {
        return f64::NAN;
    }
    let m = pts.len() as f64;
    let mx = pts.iter().map(|p| p.0).sum::<f64>() / m;
    let my = pts.iter().map(|p| p.1).sum::<f64>() / m;
    let sxy: f64 = pts.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
    let sxx: f64 = pts.iter().map(|p| (p.0 - mx) * (p.0 - mx)).sum();
    if sxx == 0.0 {
        f64::NAN
    } else {
        sxy / sxx
    }
}

/// Compare `⟨egrad(x), d⟩` with differences of the cost along `d`.
pub fn check_gradient<O>(obj: &O, x: &ManifoldPoint, d: &TangentVector, steps: &[f64]) -> DerivativeCheck
where
    O: Objective<Point = ManifoldPoint, Tangent = TangentVector>,
{
    let f0 = obj.cost(x);
    let slope0 = inner(&obj.egrad(x), d);

    let mut remainders = Vec::with_capacity(steps.len());
    let mut central_error = f64::INFINITY;
    for &h in steps {
        let f_plus = obj.cost(&displaced(x, d, h));
        let f_minus = obj.cost(&displaced(x, d, -h));
        remainders.push((f_plus - f0 - h * slope0).abs());

        let fd = (f_plus - f_minus) / (2.0 * h);
        central_error = central_error.min((fd - slope0).abs() / slope0.abs().max(1.0));
    }

    DerivativeCheck {
        slope: log_slope(steps, &remainders),
        steps: steps.to_vec(),
        remainders,
        central_error,
    }
}

/// Compare `ehess(x)[d]` with differences of the gradient along `d`.
pub fn check_hessian<O>(obj: &O, x: &ManifoldPoint, d: &TangentVector, steps: &[f64]) -> DerivativeCheck
where
    O: Objective<Point = ManifoldPoint, Tangent = TangentVector>,
{
    let g0 = obj.egrad(x);
    let hd = obj.ehess(x, d);
    let hd_norm = norm_sq(&hd).sqrt();

    let mut remainders = Vec::with_capacity(steps.len());
    let mut central_error = f64::INFINITY;
    for &h in steps {
        let g_plus = obj.egrad(&displaced(x, d, h));
        let g_minus = obj.egrad(&displaced(x, d, -h));

        let taylor = difference(&difference(&g_plus, 1.0, &g0, -1.0), 1.0, &hd, -h);
        remainders.push(norm_sq(&taylor).sqrt());

        let fd = difference(&g_plus, 0.5 / h, &g_minus, -0.5 / h);
        let err = norm_sq(&difference(&fd, 1.0, &hd, -1.0)).sqrt();
        central_error = central_error.min(err / hd_norm.max(1.0));
    }

    DerivativeCheck {
        slope: log_slope(steps, &remainders),
        steps: steps.to_vec(),
        remainders,
        central_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_slope() {
        let steps = [1e-1, 1e-2, 1e-3];
        let quad: Vec<f64> = steps.iter().map(|h| 3.0 * h * h).collect();
        assert!((log_slope(&steps, &quad) - 2.0).abs() < 1e-12);

        let lin: Vec<f64> = steps.iter().map(|h| 0.5 * h).collect();
        assert!((log_slope(&steps, &lin) - 1.0).abs() < 1e-12);

        assert!(log_slope(&steps, &[0.0, 0.0, 0.0]).is_nan());
    }
}
