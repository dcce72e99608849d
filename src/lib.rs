//! `spook-linsolve` library crate.
//!
//! Regularized linear least-squares reconstruction: recover a coefficient
//! matrix `X` from observations `B ≈ A X Gᵀ` under an L2 sparsity penalty and
//! spatial/spectral Laplacian smoothness penalties, by solving the normal
//! equations in closed form.
//!
//! The binary (`spook`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the solver can be embedded in larger reconstruction toolkits

pub mod app;
pub mod base;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod solve;

pub use base::{BaseOperators, SpookBase};
pub use domain::{InputMode, LinSolveConfig, ProblemMode, Smoothness, SparsityWeights};
pub use error::SpookError;
pub use math::Operator;
pub use solve::{RegularizedProblem, SpookLinSolve};
