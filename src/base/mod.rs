//! Base operators the linear-solve strategy is built on.
//!
//! The assembler never touches raw observations or design matrices directly;
//! it only needs the precomputed cross-products and smoothers listed in
//! [`BaseOperators`]. [`SpookBase`] is the concrete implementation used by the
//! solver and the demo, but any other precomputation (e.g. streamed or cached
//! from disk) can plug in by implementing the trait.
//!
//! Base operators are immutable for the lifetime of a problem.

pub mod spook;

pub use spook::*;

use nalgebra::DMatrix;

use crate::math::Operator;

pub trait BaseOperators {
    /// Number of design-matrix columns, `Na`.
    fn na(&self) -> usize;

    /// Number of basis columns when a basis is present, else the number of
    /// observation columns, `Ng`.
    fn ng(&self) -> usize;

    /// `AᵀA`, `Na×Na`.
    fn ata(&self) -> &Operator;

    /// Observations projected onto the design (and basis), `Na×Ng`.
    fn b_contracted(&self) -> &DMatrix<f64>;

    /// `GᵀG`, present iff a basis is used.
    fn gtg(&self) -> Option<&Operator>;

    /// Unweighted spatial smoother `Asm`, `Na×Na`.
    fn spatial_smoother(&self) -> &Operator;

    /// Unweighted spectral smoother `Bsm`, `Ng×Ng`.
    fn spectral_smoother(&self) -> &Operator;

    /// Cross tensor term `AGtAG` of side `Na·Ng`.
    ///
    /// Computed on every call; callers decide whether to keep it.
    fn cross_term(&self) -> Operator;

    fn has_basis(&self) -> bool {
        self.gtg().is_some()
    }
}
