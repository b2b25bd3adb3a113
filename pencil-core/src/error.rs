//! Error types for the nearest-pencil solver.

use thiserror::Error;

use crate::postsolve::ConsistencyReport;
use crate::problem::SolveResult;

/// Errors that can occur while setting up or finishing a solve.
///
/// Non-convergence is not an error: the solver reports it through
/// [`SolveStatus`](crate::SolveStatus).
#[derive(Error, Debug)]
pub enum PencilError {
    /// Pencil validation failed (shape, size, or non-finite entries)
    #[error("Invalid pencil: {0}")]
    InvalidPencil(String),

    /// Solver settings are out of range
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Warm start is not a unitary pair of the right size
    #[error("Invalid warm start: {0}")]
    InvalidWarmStart(String),

    /// The solver-reported cost disagrees with the distance to the
    /// reassembled pencil. The full result is attached so callers can still
    /// inspect it.
    #[error(
        "Consistency check failed: solver cost {:.12e}, reconstructed distance {:.12e} (gap {:.3e} > tol {:.1e})",
        report.solver_cost, report.reconstructed_cost, report.gap, report.tolerance
    )]
    Inconsistent {
        /// Outcome of the post-condition check
        report: ConsistencyReport,
        /// Result assembled before the check failed
        result: Box<SolveResult>,
    },
}

/// Result type for pencil operations.
pub type PencilResult<T> = Result<T, PencilError>;
