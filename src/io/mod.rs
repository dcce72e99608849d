//! Input/output helpers.
//!
//! - solver configuration files (`config`)
//! - solution exports (`export`)

pub mod config;
pub mod export;

pub use config::*;
pub use export::*;
