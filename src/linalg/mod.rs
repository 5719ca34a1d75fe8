//! Linear algebra primitives
//!
//! - `matrix`: the dense [`Matrix`] type, broadcasting arithmetic and reductions
//! - `lu_decomp`: LU factorisation of square matrices

pub mod lu_decomp;
pub mod matrix;

pub use lu_decomp::{lu_factor, LuDecomposition};
pub use matrix::{clamp, log, scalar, Element, Matrix, Scalar};
