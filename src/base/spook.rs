//! Precomputed cross-products for a single reconstruction problem.
//!
//! Given observations `B` (`Ns×Nb`), a design `A` (`Ns×Na`) and an optional
//! basis `G` (`Nb×Ng`), the objective
//!
//! ```text
//! ‖A X Gᵀ - B‖² + penalties(X)
//! ```
//!
//! only depends on the data through `AᵀA`, `GᵀG` and `AᵀBG`. Those are formed
//! once here. Without a basis, `G` is the identity and `Ng = Nb`.

use nalgebra::DMatrix;

use crate::base::BaseOperators;
use crate::domain::InputMode;
use crate::error::SpookError;
use crate::math::{Operator, laplacian_square};

#[derive(Debug, Clone)]
pub struct SpookBase {
    na: usize,
    ng: usize,
    ata: Operator,
    b_contracted: DMatrix<f64>,
    gtg: Option<Operator>,
    asm: Operator,
    bsm: Operator,
}

impl SpookBase {
    /// Precompute the base operators.
    ///
    /// In [`InputMode::Raw`], `a` is the design matrix and `b` the observations.
    /// In [`InputMode::Contracted`], `a` is already `AᵀA` and `b` already the
    /// contracted right-hand side (`AᵀB`, or `AᵀBG` when `g` is given).
    pub fn new(
        b: &DMatrix<f64>,
        a: Operator,
        mode: InputMode,
        g: Option<&DMatrix<f64>>,
        drop_boundaries: bool,
    ) -> Result<Self, SpookError> {
        let (ata, b_contracted) = match mode {
            InputMode::Raw => {
                if a.nrows() != b.nrows() {
                    return Err(SpookError::shape(format!(
                        "Design matrix has {} rows but observations have {}.",
                        a.nrows(),
                        b.nrows()
                    )));
                }
                let atb = a.tr_mul_dense(b);
                let contracted = match g {
                    Some(g) => {
                        if g.nrows() != b.ncols() {
                            return Err(SpookError::shape(format!(
                                "Basis has {} rows but observations have {} columns.",
                                g.nrows(),
                                b.ncols()
                            )));
                        }
                        atb * g
                    }
                    None => atb,
                };
                (a.gram(), contracted)
            }
            InputMode::Contracted => {
                if a.nrows() != a.ncols() {
                    return Err(SpookError::shape(format!(
                        "Contracted design must be square (AᵀA), got {}x{}.",
                        a.nrows(),
                        a.ncols()
                    )));
                }
                if b.nrows() != a.nrows() {
                    return Err(SpookError::shape(format!(
                        "Contracted observations have {} rows, expected {}.",
                        b.nrows(),
                        a.nrows()
                    )));
                }
                if let Some(g) = g {
                    if g.ncols() != b.ncols() {
                        return Err(SpookError::shape(format!(
                            "Basis has {} columns but contracted observations have {}.",
                            g.ncols(),
                            b.ncols()
                        )));
                    }
                }
                (a, b.clone())
            }
        };

        let na = ata.nrows();
        let ng = b_contracted.ncols();
        let gtg = g.map(|g| Operator::Dense(g.tr_mul(g)));
        log::debug!(
            "Base operators: Na={na}, Ng={ng}, AtA {}, basis={}",
            ata.kind_name(),
            gtg.is_some()
        );

        Ok(Self {
            na,
            ng,
            ata,
            b_contracted,
            gtg,
            asm: laplacian_square(na, drop_boundaries),
            bsm: laplacian_square(ng, drop_boundaries),
        })
    }

    /// Replace the default Laplacian spectral smoother.
    pub fn with_spectral_smoother(mut self, bsm: Operator) -> Result<Self, SpookError> {
        if bsm.nrows() != self.ng || bsm.ncols() != self.ng {
            return Err(SpookError::shape(format!(
                "Spectral smoother must be {0}x{0}, got {1}x{2}.",
                self.ng,
                bsm.nrows(),
                bsm.ncols()
            )));
        }
        self.bsm = bsm;
        Ok(self)
    }
}

impl BaseOperators for SpookBase {
    fn na(&self) -> usize {
        self.na
    }

    fn ng(&self) -> usize {
        self.ng
    }

    fn ata(&self) -> &Operator {
        &self.ata
    }

    fn b_contracted(&self) -> &DMatrix<f64> {
        &self.b_contracted
    }

    fn gtg(&self) -> Option<&Operator> {
        self.gtg.as_ref()
    }

    fn spatial_smoother(&self) -> &Operator {
        &self.asm
    }

    fn spectral_smoother(&self) -> &Operator {
        &self.bsm
    }

    fn cross_term(&self) -> Operator {
        log::trace!("Computing cross term of side {}", self.na * self.ng);
        match &self.gtg {
            Some(gtg) => self.ata.kron(gtg),
            None => self.ata.kron(&Operator::identity(self.ng)),
        }
    }
}
