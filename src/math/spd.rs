//! Direct solves of regularized normal-equations systems.
//!
//! We repeatedly solve `P x = rhs` where `P` is symmetric, and SPD by
//! construction as long as the regularization weights are positive:
//!
//! - dense `P`: Cholesky (nalgebra), which only reads the lower triangle and
//!   fails on anything that is not positive definite
//! - sparse `P`: LDLᵀ (sprs-ldl) with reverse Cuthill–McKee fill-in reduction.
//!   Negative pivots are fine (symmetric indefinite systems still solve); a zero
//!   or non-finite pivot means the matrix is singular.

use nalgebra::DMatrix;
use sprs::errors::{LinalgError, SingularMatrixInfo};
use sprs::{FillInReduction, SymmetryCheck};
use sprs_ldl::Ldl;

use crate::error::SpookError;
use crate::math::Operator;

/// Solve `p * x = rhs` for every column of `rhs`.
///
/// Returns an error (and no partial result) when the factorization fails or the
/// solution contains non-finite values.
pub fn solve_spd(p: &Operator, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>, SpookError> {
    if p.nrows() != p.ncols() || p.nrows() != rhs.nrows() {
        return Err(SpookError::shape(format!(
            "Cannot solve a {}x{} system against a right-hand side with {} rows.",
            p.nrows(),
            p.ncols(),
            rhs.nrows()
        )));
    }

    let x = match p {
        Operator::Dense(m) => {
            log::debug!("Solving dense {0}x{0} system via Cholesky", m.nrows());
            let chol = m
                .clone()
                .cholesky()
                .ok_or(SpookError::NotPositiveDefinite { side: m.nrows() })?;
            chol.solve(rhs)
        }
        Operator::Sparse(m) => {
            log::debug!(
                "Solving sparse {0}x{0} system (nnz={1}) via LDL^T",
                m.rows(),
                m.nnz()
            );
            let ldl = Ldl::new()
                .fill_in_reduction(FillInReduction::ReverseCuthillMcKee)
                .check_symmetry(SymmetryCheck::DontCheckSymmetry)
                .numeric(m.view())?;
            if let Some(index) = ldl.d().iter().position(|&d| d == 0.0 || !d.is_finite()) {
                return Err(SpookError::Factorization(LinalgError::SingularMatrix(
                    SingularMatrixInfo {
                        index,
                        reason: "zero or non-finite pivot in LDL^T (matrix is singular)",
                    },
                )));
            }
            let mut out = DMatrix::zeros(rhs.nrows(), rhs.ncols());
            for (c, column) in rhs.column_iter().enumerate() {
                let b: Vec<f64> = column.iter().copied().collect();
                let x = ldl.solve(&b[..]);
                out.column_mut(c).copy_from_slice(&x);
            }
            out
        }
    };

    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(SpookError::NonFinite)
    }
}
