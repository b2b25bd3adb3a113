//! Presolve: rescaling of the input pencil.

pub mod scaling;

pub use scaling::PencilScaling;
