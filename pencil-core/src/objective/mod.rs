//! Distance-to-stable-pencil objective.
//!
//! This module provides the cost, Euclidean gradient, and Euclidean
//! Hessian-vector product of the squared distance between a transformed
//! pencil `(S, T) = (Q1·A·Q2, Q1·B·Q2)` and its projection onto the set of
//! upper-triangular pencils with `|PS_kk| <= |PT_kk|`.
//!
//! Every evaluation recomputes `(S, T)`, the stability mask, and the
//! projection from the point it is given; nothing is cached between calls.

pub mod adapter;
pub mod check;
pub mod cost;
pub mod factors;
pub mod gradient;
pub mod hessian;
pub mod mask;
pub mod projector;
pub mod traits;

pub use adapter::PencilObjective;
pub use check::{check_gradient, check_hessian, DerivativeCheck};
pub use cost::cost;
pub use factors::TransformedPencil;
pub use gradient::egrad;
pub use hessian::ehess;
pub use mask::StabilityMask;
pub use projector::{project, project_with_mask, Projection};
pub use traits::Objective;
