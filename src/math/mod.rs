//! Linear algebra for the pipeline: vectors, matrices and Euler rotations
//!
//! All values are `f64` and `Copy`. Operators return new values, the
//! `*Assign` operators and `*_in_place` helpers mutate the receiver.

mod euler;
mod matrix;
mod vector;

pub use euler::*;
pub use matrix::*;
pub use vector::*;

/// Per-component tolerance used by `==` on vectors and matrices
pub const EPSILON: f64 = 1e-9;

/// Determinants smaller than this in magnitude are treated as singular
pub const SINGULAR_EPSILON: f64 = 1e-12;
