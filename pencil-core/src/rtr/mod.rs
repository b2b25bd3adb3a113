//! Riemannian trust-region solver.
//!
//! Generic over the [`Manifold`](crate::manifold::Manifold) and the
//! [`Objective`](crate::objective::Objective); the pencil problem plugs in
//! the unitary product and the distance objective.

pub mod diagnostics;
pub mod evaluator;
pub mod perf;
pub mod solve;
pub mod tcg;
pub mod termination;

pub use diagnostics::DiagnosticsConfig;
pub use evaluator::Evaluator;
pub use perf::{PerfTimers, SectionStats, SectionTimer};
pub use solve::{solve_rtr, TrustRegionOutcome, TrustRegionParams};
pub use tcg::{truncated_cg, TcgOptions, TcgOutcome, TcgStop};
pub use termination::{check_termination, TerminationCriteria};
