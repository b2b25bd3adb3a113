//! Euclidean Hessian-vector product.
//!
//! Differentiates the gradient formula
//!
//! ```text
//! G1 = 2·RT·(B·Q2)ᴴ + 2·RS·(A·Q2)ᴴ
//! G2 = 2·(Q1·B)ᴴ·RT + 2·(Q1·A)ᴴ·RS
//! ```
//!
//! along a direction `(d1, d2)` with the stability mask held fixed.
//!
//! # Structure
//!
//! 1. Linearize the pencil: `dS = d1·(A·Q2) + (Q1·A)·d2`,
//!    `dT = d1·(B·Q2) + (Q1·B)·d2`.
//! 2. Differentiate the projected diagonal at flagged indices. Writing
//!    `z = r·σ` with `r = |z|`, `σ = z/r`:
//!    `dr = Re(conj(σ)·dz)`, `dσ = i·σ·Im(conj(σ)·dz) / r`. With
//!    `m = (|S_kk| + |T_kk|)/2`:
//!    `H0_k = d(PS_kk) = dm·σ_S + m·dσ_S`, `H1_k = d(PT_kk) = dm·σ_T + m·dσ_T`.
//! 3. Residual derivatives: `d(S − PS) = L(dS) + diag(mask·(dS_kk − H0_k))`,
//!    and likewise for T with `H1`.
//! 4. Product rule on each gradient term. The S-side residual derivative
//!    multiplies `(A·Q2)ᴴ` and the T-side one multiplies `(B·Q2)ᴴ`, exactly
//!    as in the gradient; the factor derivatives `A·d2, B·d2, d1·A, d1·B`
//!    supply the second-order cross terms.
//! 5. Scale by 2.
//!
//! The derivative of the mask itself is dropped. It vanishes on the open
//! dense set where no `|S_kk| = |T_kk|`, so the product is exact there and
//! loses accuracy only next to a mask switch (see
//! [`StabilityMask::margin`]).
//!
//! Magnitudes and phases come from the unperturbed point. A zero `T_kk` at
//! a flagged index contributes no magnitude derivative, and `PT_kk` follows
//! the phase of `S_kk` exactly as the projector does.

use num_complex::Complex64;

use super::factors::TransformedPencil;
use super::gradient::residuals;
use super::mask::StabilityMask;
use crate::linalg::dense::{scale, strict_lower};
use crate::linalg::CMat;
use crate::problem::{ManifoldPoint, Pencil, TangentVector};

/// Euclidean Hessian of [`super::cost::cost`] applied to `dir`.
pub fn ehess(pencil: &Pencil, point: &ManifoldPoint, dir: &TangentVector) -> TangentVector {
    let tp = TransformedPencil::new(pencil, point);
    let mask = StabilityMask::new(&tp.s, &tp.t);
    let (rs, rt) = residuals(&tp, &mask);
    let n = mask.len();

    let ds = &dir.d1 * &tp.a_q2 + &tp.q1_a * &dir.d2;
    let dt = &dir.d1 * &tp.b_q2 + &tp.q1_b * &dir.d2;

    let (h0, h1) = projected_diagonal_derivative(&tp.s, &tp.t, &ds, &dt, &mask);

    let mut drs = strict_lower(&ds);
    let mut drt = strict_lower(&dt);
    for k in 0..n {
        if mask.get(k) {
            drs[(k, k)] = ds[(k, k)] - h0[k];
            drt[(k, k)] = dt[(k, k)] - h1[k];
        }
    }

    let a_d2 = &pencil.a * &dir.d2;
    let b_d2 = &pencil.b * &dir.d2;
    let d1_a = &dir.d1 * &pencil.a;
    let d1_b = &dir.d1 * &pencil.b;

    let h_q1 = &drt * tp.b_q2.adjoint()
        + &rt * b_d2.adjoint()
        + &drs * tp.a_q2.adjoint()
        + &rs * a_d2.adjoint();
    let h_q2 = d1_b.adjoint() * &rt
        + tp.q1_b.adjoint() * &drt
        + d1_a.adjoint() * &rs
        + tp.q1_a.adjoint() * &drs;

    TangentVector::new(scale(&h_q1, 2.0), scale(&h_q2, 2.0))
}

/// Derivatives `(H0, H1)` of the projected diagonals `PS_kk`, `PT_kk` along
/// `(dS, dT)`. Entries at unflagged indices are zero and unused.
pub(crate) fn projected_diagonal_derivative(
    s: &CMat,
    t: &CMat,
    ds: &CMat,
    dt: &CMat,
    mask: &StabilityMask,
) -> (Vec<Complex64>, Vec<Complex64>) {
    let zero = Complex64::new(0.0, 0.0);
    let n = mask.len();
    let mut h0 = vec![zero; n];
    let mut h1 = vec![zero; n];

    for k in 0..n {
        if !mask.get(k) {
            continue;
        }
        let ps = polar_derivative(s[(k, k)], ds[(k, k)]);
        let pt = polar_derivative(t[(k, k)], dt[(k, k)]);

        let mid = 0.5 * (ps.modulus + pt.modulus);
        let dmid = 0.5 * (ps.d_modulus + pt.d_modulus);

        h0[k] = ps.phase * dmid + ps.d_phase * mid;
        h1[k] = if pt.modulus == 0.0 {
            h0[k]
        } else {
            pt.phase * dmid + pt.d_phase * mid
        };
    }

    (h0, h1)
}

/// Polar form `z = r·σ` and its derivative along `dz`.
#[derive(Debug, Clone, Copy)]
struct PolarDerivative {
    modulus: f64,
    d_modulus: f64,
    phase: Complex64,
    d_phase: Complex64,
}

fn polar_derivative(z: Complex64, dz: Complex64) -> PolarDerivative {
    let r = z.norm();
    if r == 0.0 {
        let zero = Complex64::new(0.0, 0.0);
        return PolarDerivative { modulus: 0.0, d_modulus: 0.0, phase: zero, d_phase: zero };
    }
    let sigma = z / r;
    let w = sigma.conj() * dz;
    PolarDerivative {
        modulus: r,
        d_modulus: w.re,
        phase: sigma,
        d_phase: sigma * Complex64::new(0.0, w.im / r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::dense::{self, random_gaussian};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_setup(n: usize, seed: u64) -> (Pencil, ManifoldPoint, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pencil = Pencil::new(random_gaussian(n, &mut rng), random_gaussian(n, &mut rng)).unwrap();
        let point = ManifoldPoint::new(random_gaussian(n, &mut rng), random_gaussian(n, &mut rng));
        (pencil, point, rng)
    }

    fn inner(u: &TangentVector, v: &TangentVector) -> f64 {
        dense::real_inner(&u.d1, &v.d1) + dense::real_inner(&u.d2, &v.d2)
    }

    #[test]
    fn test_polar_derivative_matches_difference() {
        let z = Complex64::new(0.3, -1.2);
        let dz = Complex64::new(-0.7, 0.4);
        let h = 1e-6;
        let p = polar_derivative(z, dz);

        let r_plus = (z + dz * h).norm();
        let r_minus = (z - dz * h).norm();
        assert!(((r_plus - r_minus) / (2.0 * h) - p.d_modulus).abs() < 1e-8);

        let s_plus = (z + dz * h) / r_plus;
        let s_minus = (z - dz * h) / r_minus;
        assert!(((s_plus - s_minus) / (2.0 * h) - p.d_phase).norm() < 1e-8);
    }

    #[test]
    fn test_polar_derivative_at_zero() {
        let p = polar_derivative(Complex64::new(0.0, 0.0), Complex64::new(1.0, 1.0));
        assert_eq!(p.d_modulus, 0.0);
        assert_eq!(p.d_phase, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_zero_t_diagonal_follows_s_side() {
        let s = crate::linalg::dense::from_real_rows(1, &[2.0]);
        let t = dense::zeros(1);
        let mut ds = dense::zeros(1);
        let mut dt = dense::zeros(1);
        ds[(0, 0)] = Complex64::new(0.3, 0.7);
        dt[(0, 0)] = Complex64::new(-1.0, 0.2);
        let mask = StabilityMask::new(&s, &t);

        let (h0, h1) = projected_diagonal_derivative(&s, &t, &ds, &dt, &mask);
        // m = |S|/2 with dm = Re(dS)/2, phase 1 with derivative i·Im(dS)/2
        let expected = Complex64::new(0.15, 0.35);
        assert!((h0[0] - expected).norm() < 1e-15);
        assert_eq!(h0[0], h1[0]);
    }

    #[test]
    fn test_hessian_is_linear_in_direction() {
        let (pencil, point, mut rng) = random_setup(4, 21);
        let u = TangentVector::new(random_gaussian(4, &mut rng), random_gaussian(4, &mut rng));
        let v = TangentVector::new(random_gaussian(4, &mut rng), random_gaussian(4, &mut rng));
        let w = TangentVector::new(
            dense::lincomb(2.0, &u.d1, -3.0, &v.d1),
            dense::lincomb(2.0, &u.d2, -3.0, &v.d2),
        );

        let hu = ehess(&pencil, &point, &u);
        let hv = ehess(&pencil, &point, &v);
        let hw = ehess(&pencil, &point, &w);

        let e1 = dense::lincomb(2.0, &hu.d1, -3.0, &hv.d1) - &hw.d1;
        let e2 = dense::lincomb(2.0, &hu.d2, -3.0, &hv.d2) - &hw.d2;
        let scale_ref = dense::frobenius_norm_sq(&hw.d1) + dense::frobenius_norm_sq(&hw.d2);
        let err = dense::frobenius_norm_sq(&e1) + dense::frobenius_norm_sq(&e2);
        assert!(err <= 1e-24 * scale_ref.max(1.0), "err = {:.3e}", err);
    }

    #[test]
    fn test_hessian_is_self_adjoint() {
        for seed in [3u64, 5, 8] {
            let (pencil, point, mut rng) = random_setup(3, seed);
            let u = TangentVector::new(random_gaussian(3, &mut rng), random_gaussian(3, &mut rng));
            let v = TangentVector::new(random_gaussian(3, &mut rng), random_gaussian(3, &mut rng));

            let uhv = inner(&u, &ehess(&pencil, &point, &v));
            let vhu = inner(&v, &ehess(&pencil, &point, &u));
            let tol = 1e-10 * uhv.abs().max(vhu.abs()).max(1.0);
            assert!((uhv - vhu).abs() <= tol, "seed {}: {} vs {}", seed, uhv, vhu);
        }
    }
}
