//! Problem data structures and validation.
//!
//! This module defines the pencil, the point and tangent representations on
//! the product of two unitary groups, solver settings, and the solve result.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;

use crate::error::{PencilError, PencilResult};
use crate::linalg::dense::{self, CMat};
use crate::postsolve::{ConsistencyReport, PencilEigenvalue};

/// Square matrix pencil `T·x + A`, stored as the pair `(A, B)`.
///
/// The solver looks for unitary `Q1, Q2` such that `(Q1·A·Q2, Q1·B·Q2)` is as
/// close as possible to an upper-triangular pencil with `|S_kk| <= |T_kk|`,
/// i.e. a pencil whose eigenvalues `-S_kk/T_kk` lie in the closed unit disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Pencil {
    /// Constant coefficient A (n × n)
    pub a: CMat,

    /// Linear coefficient B (n × n)
    pub b: CMat,
}

impl Pencil {
    /// Create a pencil after validating shapes and entries.
    pub fn new(a: CMat, b: CMat) -> PencilResult<Self> {
        let pencil = Self { a, b };
        pencil.validate()?;
        Ok(pencil)
    }

    /// Size n of the pencil.
    pub fn dim(&self) -> usize {
        self.a.nrows()
    }

    /// Frobenius norm of the stacked coefficients `[A | B]`.
    pub fn frobenius_norm(&self) -> f64 {
        (dense::frobenius_norm_sq(&self.a) + dense::frobenius_norm_sq(&self.b)).sqrt()
    }

    /// Squared Frobenius distance `‖A − A'‖² + ‖B − B'‖²`.
    pub fn distance_sq(&self, other: &Pencil) -> f64 {
        dense::frobenius_norm_sq(&(&self.a - &other.a))
            + dense::frobenius_norm_sq(&(&self.b - &other.b))
    }

    /// Validate pencil dimensions and entries.
    pub fn validate(&self) -> PencilResult<()> {
        let (ar, ac) = self.a.shape();
        let (br, bc) = self.b.shape();

        if ar == 0 {
            return Err(PencilError::InvalidPencil("pencil is empty".to_string()));
        }
        if ar != ac {
            return Err(PencilError::InvalidPencil(format!(
                "A has shape {}×{}, expected a square matrix",
                ar, ac
            )));
        }
        if (br, bc) != (ar, ac) {
            return Err(PencilError::InvalidPencil(format!(
                "B has shape {}×{}, expected {}×{}",
                br, bc, ar, ac
            )));
        }
        if !dense::is_finite(&self.a) {
            return Err(PencilError::InvalidPencil("A has non-finite entries".to_string()));
        }
        if !dense::is_finite(&self.b) {
            return Err(PencilError::InvalidPencil("B has non-finite entries".to_string()));
        }

        Ok(())
    }
}

/// Point `(Q1, Q2)` on the product of two unitary groups U(n) × U(n).
#[derive(Debug, Clone, PartialEq)]
pub struct ManifoldPoint {
    /// Left factor
    pub q1: CMat,
    /// Right factor
    pub q2: CMat,
}

impl ManifoldPoint {
    /// Pair of factors; no unitarity check (see [`ManifoldPoint::check_unitary`]).
    pub fn new(q1: CMat, q2: CMat) -> Self {
        Self { q1, q2 }
    }

    /// `(I, I)`.
    pub fn identity(n: usize) -> Self {
        Self { q1: dense::identity(n), q2: dense::identity(n) }
    }

    /// Factor size n.
    pub fn dim(&self) -> usize {
        self.q1.nrows()
    }

    /// Check that both factors are n × n and unitary to within `tol`.
    pub fn check_unitary(&self, n: usize, tol: f64) -> PencilResult<()> {
        for (name, q) in [("Q1", &self.q1), ("Q2", &self.q2)] {
            if q.shape() != (n, n) {
                return Err(PencilError::InvalidWarmStart(format!(
                    "{} has shape {}×{}, expected {}×{}",
                    name,
                    q.nrows(),
                    q.ncols(),
                    n,
                    n
                )));
            }
            let defect = dense::unitarity_defect(q);
            if !(defect <= tol) {
                return Err(PencilError::InvalidWarmStart(format!(
                    "{} is not unitary: ‖QᴴQ − I‖ = {:.3e} > {:.1e}",
                    name, defect, tol
                )));
            }
        }
        Ok(())
    }
}

/// Direction `(d1, d2)` at a [`ManifoldPoint`], one matrix per factor.
///
/// Also carries Euclidean gradients and Hessian-vector products, which live
/// in the same ambient space before tangent projection.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentVector {
    /// Component along Q1
    pub d1: CMat,
    /// Component along Q2
    pub d2: CMat,
}

impl TangentVector {
    /// Pair of components.
    pub fn new(d1: CMat, d2: CMat) -> Self {
        Self { d1, d2 }
    }

    /// Zero direction for factors of size n.
    pub fn zeros(n: usize) -> Self {
        Self { d1: dense::zeros(n), d2: dense::zeros(n) }
    }
}

/// Solver settings and parameters.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Maximum number of outer trust-region iterations
    pub max_iter: usize,

    /// Time limit in milliseconds (None = no limit)
    pub time_limit_ms: Option<u64>,

    /// Verbosity: 0 = silent, 1 = summary, 2 = one line per iteration
    pub verbosity: u8,

    /// Riemannian gradient norm tolerance
    pub tol_grad: f64,

    /// Cap on truncated-CG iterations (None = manifold dimension)
    pub max_inner_iter: Option<usize>,

    /// Truncated-CG iterations performed before the residual test applies
    pub min_inner_iter: usize,

    /// Largest trust-region radius (None = typical distance of the manifold)
    pub radius_max: Option<f64>,

    /// Initial trust-region radius (None = radius_max / 8)
    pub radius_init: Option<f64>,

    /// Stop when the radius shrinks below this value
    pub radius_min: f64,

    /// Minimum reduction ratio ρ for accepting a step
    pub accept_ratio: f64,

    /// Regularization of ρ against round-off near convergence, in units of
    /// `max(1, |f|)·ε`
    pub rho_regularization: f64,

    /// Linear convergence target κ for the truncated-CG residual
    pub tcg_kappa: f64,

    /// Superlinear exponent θ for the truncated-CG residual
    pub tcg_theta: f64,

    /// Frobenius norm of `[A | B]` after rescaling
    pub target_norm: f64,

    /// Absolute tolerance for the cost / reconstructed-distance
    /// post-condition, in rescaled units
    pub consistency_tol: f64,

    /// Tolerance on `‖QᴴQ − I‖` when accepting a warm start
    pub unitary_tol: f64,

    /// Relative diagonal-magnitude gap below which the final point is flagged
    /// as close to a mask switch
    pub mask_margin_warn: f64,

    /// Seed for the random initial point (None = entropy)
    pub seed: Option<u64>,

    /// Optional initial point
    pub warm_start: Option<ManifoldPoint>,

    /// Keep one [`IterationRecord`] per outer iteration
    pub record_history: bool,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl Default for SolverSettings {
    fn default() -> Self {
        // Environment overrides for quick experiments without recompiling,
        // e.g. PENCIL_MAX_ITER=50 PENCIL_VERBOSITY=2
        Self {
            max_iter: env_or("PENCIL_MAX_ITER", 1000),
            time_limit_ms: None,
            verbosity: env_or("PENCIL_VERBOSITY", 0),
            tol_grad: env_or("PENCIL_TOL_GRAD", 1e-6),
            max_inner_iter: None,
            min_inner_iter: 1,
            radius_max: None,
            radius_init: None,
            radius_min: 1e-12,
            accept_ratio: 0.1,
            rho_regularization: 1e3,
            tcg_kappa: 0.1,
            tcg_theta: 1.0,
            target_norm: 100.0,
            consistency_tol: 1e-10,
            unitary_tol: 1e-8,
            mask_margin_warn: 1e-6,
            seed: std::env::var("PENCIL_SEED").ok().and_then(|s| s.parse::<u64>().ok()),
            warm_start: None,
            record_history: false,
        }
    }
}

impl SolverSettings {
    /// Settings with per-iteration logging enabled.
    pub fn verbose() -> Self {
        Self { verbosity: 2, ..Self::default() }
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set maximum outer iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set gradient-norm tolerance.
    pub fn with_tol_grad(mut self, tol: f64) -> Self {
        self.tol_grad = tol;
        self
    }

    /// Set verbosity level.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Fix the seed of the random initial point.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start from the given point instead of a random one.
    pub fn with_warm_start(mut self, point: ManifoldPoint) -> Self {
        self.warm_start = Some(point);
        self
    }

    /// Record the per-iteration history in [`SolveInfo::history`].
    pub fn with_history(mut self) -> Self {
        self.record_history = true;
        self
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> PencilResult<()> {
        fn positive(name: &str, v: f64) -> PencilResult<()> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(PencilError::InvalidSettings(format!(
                    "{} must be positive and finite, got {}",
                    name, v
                )))
            }
        }

        positive("tol_grad", self.tol_grad)?;
        positive("radius_min", self.radius_min)?;
        positive("target_norm", self.target_norm)?;
        positive("consistency_tol", self.consistency_tol)?;
        positive("unitary_tol", self.unitary_tol)?;
        positive("tcg_kappa", self.tcg_kappa)?;
        if let Some(r) = self.radius_max {
            positive("radius_max", r)?;
        }
        if let Some(r) = self.radius_init {
            positive("radius_init", r)?;
            if let Some(rmax) = self.radius_max {
                if r > rmax {
                    return Err(PencilError::InvalidSettings(format!(
                        "radius_init {} exceeds radius_max {}",
                        r, rmax
                    )));
                }
            }
        }
        if !(0.0..0.25).contains(&self.accept_ratio) {
            return Err(PencilError::InvalidSettings(format!(
                "accept_ratio must be in [0, 0.25), got {}",
                self.accept_ratio
            )));
        }
        if self.tcg_theta < 0.0 {
            return Err(PencilError::InvalidSettings(format!(
                "tcg_theta must be nonnegative, got {}",
                self.tcg_theta
            )));
        }
        if self.rho_regularization < 0.0 {
            return Err(PencilError::InvalidSettings(format!(
                "rho_regularization must be nonnegative, got {}",
                self.rho_regularization
            )));
        }
        Ok(())
    }
}

/// Solution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Riemannian gradient norm below tolerance
    Converged,

    /// Maximum outer iterations reached
    MaxIters,

    /// Time limit reached
    TimeLimit,

    /// Trust-region radius shrank below `radius_min`
    RadiusCollapse,

    /// Non-finite cost encountered
    NumericalError,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Converged => write!(f, "Converged"),
            SolveStatus::MaxIters => write!(f, "MaxIters"),
            SolveStatus::TimeLimit => write!(f, "Time Limit"),
            SolveStatus::RadiusCollapse => write!(f, "Radius Collapse"),
            SolveStatus::NumericalError => write!(f, "Numerical Error"),
        }
    }
}

/// One row of the trust-region iteration log.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// Outer iteration index
    pub iter: usize,
    /// Cost at the current iterate (after the step decision)
    pub cost: f64,
    /// Riemannian gradient norm at the current iterate
    pub grad_norm: f64,
    /// Trust-region radius used for this step
    pub radius: f64,
    /// Reduction ratio ρ of the proposed step
    pub rho: f64,
    /// Truncated-CG iterations spent
    pub inner_iters: usize,
    /// Whether the proposed step was accepted
    pub accepted: bool,
}

/// Solve result with the nearest pencil and diagnostics.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Solution status
    pub status: SolveStatus,

    /// Squared Frobenius distance to the nearest pencil, original units
    pub cost: f64,

    /// Frobenius distance to the nearest pencil, original units
    pub distance: f64,

    /// Final unitary factors
    pub point: ManifoldPoint,

    /// Nearest stable pencil, original units
    pub nearest: Pencil,

    /// Eigenvalues of the nearest pencil, one per diagonal index
    pub eigenvalues: Vec<PencilEigenvalue>,

    /// Cost / reconstructed-distance post-condition
    pub consistency: ConsistencyReport,

    /// Detailed solve information and diagnostics
    pub info: SolveInfo,
}

impl SolveResult {
    /// Finite eigenvalues of the nearest pencil.
    pub fn finite_eigenvalues(&self) -> Vec<Complex64> {
        self.eigenvalues
            .iter()
            .filter_map(|e| match e {
                PencilEigenvalue::Finite(z) => Some(*z),
                _ => None,
            })
            .collect()
    }
}

/// Detailed solve information and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SolveInfo {
    /// Number of outer iterations completed
    pub iters: usize,

    /// Total truncated-CG iterations
    pub inner_iters: usize,

    /// Total solve time (milliseconds)
    pub solve_time_ms: u64,

    /// Time spent in cost evaluations (milliseconds)
    pub cost_time_ms: u64,

    /// Time spent in gradient evaluations (milliseconds)
    pub grad_time_ms: u64,

    /// Time spent in Hessian-vector products (milliseconds)
    pub hess_time_ms: u64,

    /// Number of cost evaluations
    pub cost_evals: usize,

    /// Number of gradient evaluations
    pub grad_evals: usize,

    /// Number of Hessian-vector products
    pub hess_evals: usize,

    /// Final Riemannian gradient norm (rescaled units)
    pub grad_norm: f64,

    /// Final trust-region radius
    pub radius: f64,

    /// Cost in rescaled units (what the solver minimized)
    pub scaled_cost: f64,

    /// Factor applied to `(A, B)` before solving
    pub scale_factor: f64,

    /// Smallest relative gap `||S_kk| − |T_kk|| / (|S_kk| + |T_kk|)` at the
    /// final point; small values mean the Hessian is near a mask switch
    pub mask_margin: f64,

    /// Number of diagonal indices moved by the projection at the final point
    pub unstable_count: usize,

    /// Per-iteration log (empty unless `record_history`)
    pub history: Vec<IterationRecord>,
}
