//! Regularized linear solve.
//!
//! Responsibilities:
//!
//! - assemble the normal equations in vectorized or flattened form
//! - update the assembled system when regularization weights change
//! - solve it with a dense or sparse SPD direct solver

pub mod assemble;
pub mod lin_solve;

pub use assemble::*;
pub use lin_solve::*;
