//! Riemannian geometry of the search space.
//!
//! The solver walks on U(n) × U(n). Points are pairs of unitary matrices and
//! tangent vectors are pairs of ambient matrices satisfying the tangency
//! condition factor-wise.

pub mod product;
pub mod traits;
pub mod unitary;

pub use product::UnitaryProduct;
pub use traits::Manifold;
pub use unitary::{qf, UnitaryGroup};
