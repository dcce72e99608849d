//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - input and representation enums (`InputMode`, `ProblemMode`)
//! - regularization weights (`SparsityWeights`, `Sparsity`, `Smoothness`)
//! - the serializable solver configuration (`LinSolveConfig`)

pub mod types;

pub use types::*;
