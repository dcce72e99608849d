//! Closed-form regularized solve with cheap re-parameterization.
//!
//! [`SpookLinSolve`] owns one [`RegularizedProblem`] and keeps it in sync with
//! the current regularization weights:
//!
//! - changing the sparsity weight(s) only shifts diagonal entries of `P`
//!   (O(side)), which makes scanning `lsparse` cheap
//! - changing the smoothness weights rebuilds `P`, possibly switching between
//!   the vectorized and flattened representations
//!
//! Every mutation bumps [`SpookLinSolve::revision`].

use nalgebra::DMatrix;

use crate::base::{BaseOperators, SpookBase};
use crate::domain::{InputMode, LinSolveConfig, ProblemMode, Smoothness, Sparsity, SparsityWeights};
use crate::error::SpookError;
use crate::math::{Operator, solve_spd};
use crate::solve::{Assembler, RegularizedProblem, diagonal_range};

#[derive(Debug, Clone)]
pub struct SpookLinSolve<B = SpookBase> {
    base: B,
    sparsity: Sparsity,
    smoothness: Smoothness,
    assembler: Assembler,
    problem: RegularizedProblem,
    /// Last successful solve and the representation it was solved in.
    res: Option<(DMatrix<f64>, ProblemMode)>,
    revision: u64,
}

impl SpookLinSolve<SpookBase> {
    /// Build the base operators and assemble the initial problem.
    ///
    /// The sparsity segmentation is validated before any matrix work.
    pub fn new(
        b: &DMatrix<f64>,
        a: Operator,
        mode: InputMode,
        g: Option<&DMatrix<f64>>,
        config: &LinSolveConfig,
    ) -> Result<Self, SpookError> {
        let na = match mode {
            InputMode::Raw => a.ncols(),
            InputMode::Contracted => a.nrows(),
        };
        let sparsity = Sparsity::new(config.lsparse.clone(), config.sp_idcs.as_deref(), na)?;
        let base = SpookBase::new(b, a, mode, g, config.smoothness_drop_boundaries)?;
        Ok(Self::assemble(base, sparsity, config))
    }
}

impl<B: BaseOperators> SpookLinSolve<B> {
    /// Use an existing set of base operators.
    pub fn from_base(base: B, config: &LinSolveConfig) -> Result<Self, SpookError> {
        let sparsity = Sparsity::new(config.lsparse.clone(), config.sp_idcs.as_deref(), base.na())?;
        Ok(Self::assemble(base, sparsity, config))
    }

    fn assemble(base: B, sparsity: Sparsity, config: &LinSolveConfig) -> Self {
        let mut assembler = Assembler::new(config.cache_cross_term);
        let problem = assembler.assemble(&base, &sparsity, config.lsmooth);
        Self {
            base,
            sparsity,
            smoothness: config.lsmooth,
            assembler,
            problem,
            res: None,
            revision: 0,
        }
    }

    /// Shift the sparsity weight(s) without reassembling.
    ///
    /// The new weights must have the same shape as the current ones (a scalar,
    /// or one value per segment). The mode never changes.
    pub fn update_lsparse(&mut self, lsparse: impl Into<SparsityWeights>) -> Result<(), SpookError> {
        let next = self.sparsity.with_weights(&lsparse.into())?;
        let (mode, ng) = (self.problem.mode, self.base.ng());
        for delta in self.sparsity.deltas_to(&next) {
            if delta.weight == 0.0 {
                continue;
            }
            let range = diagonal_range(&delta, mode, ng);
            log::trace!("lsparse update: diagonal [{}, {}) += {}", range.start, range.end, delta.weight);
            self.problem.p.add_to_diagonal(range, delta.weight);
        }
        self.sparsity = next;
        self.revision += 1;
        Ok(())
    }

    /// Store new smoothness weights and rebuild the problem.
    ///
    /// A change of representation replaces `P` and `qhalf` wholesale.
    pub fn update_lsmooth(&mut self, lsmooth: impl Into<Smoothness>) {
        self.smoothness = lsmooth.into();
        let previous = self.problem.mode;
        self.problem = self.assembler.assemble(&self.base, &self.sparsity, self.smoothness);
        if previous != self.problem.mode {
            log::debug!(
                "Representation switched: {} -> {}",
                previous.display_name(),
                self.problem.mode.display_name()
            );
        }
        self.revision += 1;
    }

    /// Apply any given weight changes, then solve `P x = -qhalf`.
    ///
    /// On failure the previous solution (if any) is kept.
    pub fn solve(
        &mut self,
        lsparse: Option<SparsityWeights>,
        lsmooth: Option<Smoothness>,
    ) -> Result<&DMatrix<f64>, SpookError> {
        if let Some(lsparse) = lsparse {
            if lsparse != self.sparsity.weights() {
                self.update_lsparse(lsparse)?;
            }
        }
        if let Some(lsmooth) = lsmooth {
            if lsmooth != self.smoothness {
                self.update_lsmooth(lsmooth);
            }
        }

        log::debug!("Solving Lin. Eq. ({} {})", self.problem.mode.display_name(), self.problem.p.kind_name());
        let x = solve_spd(&self.problem.p, &(-&self.problem.qhalf))?;
        let (x, _) = self.res.insert((x, self.problem.mode));
        Ok(&*x)
    }

    /// Raw result of the last successful solve.
    ///
    /// Its layout follows [`Self::solution_mode`], which may differ from the
    /// current mode after a smoothness update.
    pub fn solution(&self) -> Option<&DMatrix<f64>> {
        self.res.as_ref().map(|(x, _)| x)
    }

    /// Representation the last solution was computed in.
    pub fn solution_mode(&self) -> Option<ProblemMode> {
        self.res.as_ref().map(|(_, mode)| *mode)
    }

    /// Last solution as the `Na×Ng` coefficient matrix.
    pub fn x_opt(&self) -> Option<DMatrix<f64>> {
        let (res, mode) = self.res.as_ref()?;
        match mode {
            ProblemMode::Vectorized => Some(res.clone()),
            ProblemMode::Flattened => Some(DMatrix::from_row_slice(self.base.na(), self.base.ng(), res.as_slice())),
        }
    }

    /// `‖P x + qhalf‖` for the last solution against the current problem.
    ///
    /// `None` when the problem has since switched representation.
    pub fn residual_norm(&self) -> Option<f64> {
        let (res, mode) = self.res.as_ref()?;
        if *mode != self.problem.mode || res.shape() != self.problem.qhalf.shape() {
            return None;
        }
        Some((self.problem.p.mul_dense(res) + &self.problem.qhalf).norm())
    }

    pub fn problem(&self) -> &RegularizedProblem {
        &self.problem
    }

    pub fn mode(&self) -> ProblemMode {
        self.problem.mode
    }

    pub fn lsparse(&self) -> SparsityWeights {
        self.sparsity.weights()
    }

    pub fn lsmooth(&self) -> Smoothness {
        self.smoothness
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    /// Incremented on every hyperparameter update.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cross_term_builds(&self) -> usize {
        self.assembler.cross_term_builds()
    }
}
