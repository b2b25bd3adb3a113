//! Dense complex matrix types and operations.
//!
//! Everything in the solver works on square `DMatrix<Complex64>` values.
//! The inner product used throughout is the real part of the Frobenius inner
//! product, `Re tr(Aᴴ B)`, which is the metric the unitary manifold inherits
//! from the ambient space of complex matrices seen as a real vector space.

use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;

/// Dense complex matrix.
pub type CMat = DMatrix<Complex64>;

/// n × n identity.
pub fn identity(n: usize) -> CMat {
    CMat::identity(n, n)
}

/// n × n zero matrix.
pub fn zeros(n: usize) -> CMat {
    CMat::zeros(n, n)
}

/// Build a square matrix from real entries given in row-major order.
pub fn from_real_rows(n: usize, values: &[f64]) -> CMat {
    assert_eq!(values.len(), n * n, "expected {} entries, got {}", n * n, values.len());
    CMat::from_fn(n, n, |i, j| Complex64::new(values[i * n + j], 0.0))
}

/// Strictly lower-triangular part (diagonal and above set to zero).
pub fn strict_lower(m: &CMat) -> CMat {
    CMat::from_fn(m.nrows(), m.ncols(), |i, j| {
        if i > j {
            m[(i, j)]
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

/// Squared Frobenius norm of the strictly lower-triangular part.
pub fn strict_lower_norm_sq(m: &CMat) -> f64 {
    let mut acc = 0.0;
    for j in 0..m.ncols() {
        for i in (j + 1)..m.nrows() {
            acc += m[(i, j)].norm_sqr();
        }
    }
    acc
}

/// Squared Frobenius norm, summed entry by entry.
///
/// Computed from `re² + im²` only, so scaling the input by a power of two
/// scales the result exactly.
pub fn frobenius_norm_sq(m: &CMat) -> f64 {
    m.iter().map(|z| z.norm_sqr()).sum()
}

/// Real inner product `Re tr(aᴴ b)`.
pub fn real_inner(a: &CMat, b: &CMat) -> f64 {
    debug_assert_eq!(a.shape(), b.shape());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.re * y.re + x.im * y.im)
        .sum()
}

/// Hermitian part `(m + mᴴ) / 2`.
pub fn herm_part(m: &CMat) -> CMat {
    let adj = m.adjoint();
    CMat::from_fn(m.nrows(), m.ncols(), |i, j| (m[(i, j)] + adj[(i, j)]) * 0.5)
}

/// `a · m` for a real scalar `a`.
pub fn scale(m: &CMat, a: f64) -> CMat {
    m.map(|z| z * a)
}

/// `a · x + b · y` for real scalars.
pub fn lincomb(a: f64, x: &CMat, b: f64, y: &CMat) -> CMat {
    debug_assert_eq!(x.shape(), y.shape());
    x.zip_map(y, |u, v| u * a + v * b)
}

/// Unit-modulus phase `z / |z|`, with `phase(0) = 0`.
#[inline]
pub fn phase(z: Complex64) -> Complex64 {
    let r = z.norm();
    if r == 0.0 {
        Complex64::new(0.0, 0.0)
    } else {
        z / r
    }
}

/// Matrix with i.i.d. standard complex Gaussian entries `(x + iy)/√2`.
pub fn random_gaussian<R: Rng + ?Sized>(n: usize, rng: &mut R) -> CMat {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    CMat::from_fn(n, n, |_, _| {
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        Complex64::new(re * s, im * s)
    })
}

/// Frobenius distance of `qᴴ q` from the identity.
pub fn unitarity_defect(q: &CMat) -> f64 {
    let n = q.ncols();
    let gram = q.adjoint() * q;
    let mut acc = 0.0;
    for j in 0..n {
        for i in 0..gram.nrows() {
            let target = if i == j { 1.0 } else { 0.0 };
            acc += (gram[(i, j)] - Complex64::new(target, 0.0)).norm_sqr();
        }
    }
    acc.sqrt()
}

/// True when every entry has finite real and imaginary parts.
pub fn is_finite(m: &CMat) -> bool {
    m.iter().all(|z| z.re.is_finite() && z.im.is_finite())
}
