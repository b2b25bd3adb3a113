//! Linear algebra layer.
//!
//! Dense complex matrix helpers shared by the objective, the manifold, and
//! postsolve.

pub mod dense;

pub use dense::CMat;
