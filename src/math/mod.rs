//! Mathematical building blocks: operator storage, smoothers and SPD solves.

pub mod laplacian;
pub mod operator;
pub mod spd;

pub use laplacian::*;
pub use operator::*;
pub use spd::*;
