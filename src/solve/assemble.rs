//! Normal-equations assembly.
//!
//! Minimizing the regularized objective leads to `P x = -qhalf`. Two
//! representations exist:
//!
//! - **vectorized** (side `Na`): used when nothing couples the two domains.
//!   Every observation column is an independent right-hand side.
//!   `P = AᵀA + ws·Asm + sparsity`, `qhalf = -Bcontracted`.
//! - **flattened** (side `Na·Ng`): required once a basis is present or
//!   spectral smoothing is on. The coefficient matrix `X` is flattened
//!   row-major, so index `(a, g)` maps to `a·Ng + g`.
//!   `P = kron(sparsity + ws·Asm, I_Ng) + AGtAG + kron(I_Na, wg·Bsm)`,
//!   `qhalf = -vec(Bcontracted)`.
//!
//! The sparsity term is `λ·I` for a single weight, or a piecewise-constant
//! diagonal when the design columns are segmented.

use nalgebra::DMatrix;

use crate::base::BaseOperators;
use crate::domain::{ProblemMode, Segment, Smoothness, Sparsity};
use crate::math::Operator;

/// Assembled normal-equations system.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizedProblem {
    pub(crate) p: Operator,
    pub(crate) qhalf: DMatrix<f64>,
    pub(crate) mode: ProblemMode,
}

impl RegularizedProblem {
    /// Quadratic coefficient matrix.
    pub fn p(&self) -> &Operator {
        &self.p
    }

    /// Linear coefficients; one column per right-hand side.
    pub fn qhalf(&self) -> &DMatrix<f64> {
        &self.qhalf
    }

    pub fn mode(&self) -> ProblemMode {
        self.mode
    }

    /// Side length of `P`.
    pub fn side(&self) -> usize {
        self.p.nrows()
    }
}

/// Diagonal index range of `P` covered by a segment of design columns.
///
/// In flattened mode every design column expands into `ng` consecutive rows.
pub fn diagonal_range(segment: &Segment, mode: ProblemMode, ng: usize) -> std::ops::Range<usize> {
    match mode {
        ProblemMode::Vectorized => segment.range.clone(),
        ProblemMode::Flattened => segment.range.start * ng..segment.range.end * ng,
    }
}

/// Builds [`RegularizedProblem`]s and owns the optional cross-term cache.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    cache_cross_term: bool,
    cross_cache: Option<Operator>,
    cross_builds: usize,
}

impl Assembler {
    pub fn new(cache_cross_term: bool) -> Self {
        Self {
            cache_cross_term,
            cross_cache: None,
            cross_builds: 0,
        }
    }

    /// Number of times the cross term has been computed.
    pub fn cross_term_builds(&self) -> usize {
        self.cross_builds
    }

    pub fn caches_cross_term(&self) -> bool {
        self.cache_cross_term
    }

    /// Assemble the representation required by the basis and `smoothness`.
    pub fn assemble<B: BaseOperators + ?Sized>(
        &mut self,
        base: &B,
        sparsity: &Sparsity,
        smoothness: Smoothness,
    ) -> RegularizedProblem {
        match ProblemMode::required(base.has_basis(), smoothness) {
            ProblemMode::Vectorized => self.assemble_vectorized(base, sparsity, smoothness),
            ProblemMode::Flattened => self.assemble_flattened(base, sparsity, smoothness),
        }
    }

    fn assemble_vectorized<B: BaseOperators + ?Sized>(
        &mut self,
        base: &B,
        sparsity: &Sparsity,
        smoothness: Smoothness,
    ) -> RegularizedProblem {
        assert!(
            !base.has_basis() && smoothness.spectral == 0.0,
            "vectorized assembly requires no basis and zero spectral smoothing"
        );
        log::debug!("Set up a vectorized problem (side {})", base.na());

        let mut p = penalty_matrix(base, sparsity, smoothness);
        p.add_assign(base.ata());

        RegularizedProblem {
            p,
            qhalf: -base.b_contracted(),
            mode: ProblemMode::Vectorized,
        }
    }

    fn assemble_flattened<B: BaseOperators + ?Sized>(
        &mut self,
        base: &B,
        sparsity: &Sparsity,
        smoothness: Smoothness,
    ) -> RegularizedProblem {
        let (na, ng) = (base.na(), base.ng());
        log::debug!("Set up a flattened problem (side {} = {na}x{ng})", na * ng);

        let bc = base.b_contracted();
        let flat: Vec<f64> = (0..na)
            .flat_map(|a| (0..ng).map(move |g| -bc[(a, g)]))
            .collect();
        let qhalf = DMatrix::from_vec(na * ng, 1, flat);

        let mut p = penalty_matrix(base, sparsity, smoothness).kron(&Operator::identity(ng));
        self.add_cross_term(base, &mut p);
        let spectral = base.spectral_smoother().scaled(smoothness.spectral);
        p.add_assign(&Operator::identity(na).kron(&spectral));

        RegularizedProblem {
            p,
            qhalf,
            mode: ProblemMode::Flattened,
        }
    }

    fn add_cross_term<B: BaseOperators + ?Sized>(&mut self, base: &B, p: &mut Operator) {
        if let Some(cross) = &self.cross_cache {
            log::debug!("Reusing cached cross term");
            p.add_assign(cross);
            return;
        }
        let cross = base.cross_term();
        self.cross_builds += 1;
        p.add_assign(&cross);
        if self.cache_cross_term {
            log::debug!("Caching cross term ({}x{}, {})", cross.nrows(), cross.ncols(), cross.kind_name());
            self.cross_cache = Some(cross);
        }
    }
}

/// `ws·Asm` plus the sparsity diagonal, `Na×Na`.
fn penalty_matrix<B: BaseOperators + ?Sized>(base: &B, sparsity: &Sparsity, smoothness: Smoothness) -> Operator {
    let mut q = base.spatial_smoother().scaled(smoothness.spatial);
    for segment in sparsity.segments() {
        log::trace!(
            "Sparsity segment [{}, {}) weight {}",
            segment.range.start,
            segment.range.end,
            segment.weight
        );
        q.add_to_diagonal(segment.range, segment.weight);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SpookBase;
    use crate::domain::InputMode;
    use crate::math::laplacian_square;
    use approx::assert_abs_diff_eq;

    fn base(with_basis: bool) -> SpookBase {
        let a = DMatrix::from_fn(20, 4, |i, j| ((i * 7 + j * 3) % 5) as f64 + 0.5 * j as f64);
        let b = DMatrix::from_fn(20, 3, |i, j| (i as f64 * 0.1).cos() + j as f64);
        let g = DMatrix::from_row_slice(3, 2, &[1.0, 0.2, -0.2, 1.0, 0.0, -0.2]);
        let g = with_basis.then_some(g);
        SpookBase::new(&b, Operator::Dense(a), InputMode::Raw, g.as_ref(), true).unwrap()
    }

    #[test]
    fn vectorized_unsegmented_matches_closed_form() {
        let base = base(false);
        let sparsity = Sparsity::new(0.7.into(), None, 4).unwrap();
        let smoothness = Smoothness::from((0.3, 0.0));
        let problem = Assembler::new(false).assemble(&base, &sparsity, smoothness);

        assert_eq!(problem.mode(), ProblemMode::Vectorized);
        let expected = base.ata().to_dense()
            + laplacian_square(4, true).to_dense() * 0.3
            + DMatrix::<f64>::identity(4, 4) * 0.7;
        for (x, y) in problem.p().to_dense().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
        }
        assert_eq!(problem.qhalf(), &(-base.b_contracted()));
        assert_eq!(problem.qhalf().ncols(), 3);
    }

    #[test]
    fn vectorized_segmented_diagonal_is_piecewise() {
        let base = base(false);
        let sparsity = Sparsity::new(vec![1.0, 5.0].into(), Some(&[1, 3]), 4).unwrap();
        let smoothness = Smoothness::from((0.0, 0.0));
        let problem = Assembler::new(false).assemble(&base, &sparsity, smoothness);

        let diff = problem.p().to_dense() - base.ata().to_dense();
        let expected_diag = [1.0, 5.0, 5.0, 5.0];
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { expected_diag[i] } else { 0.0 };
                assert_abs_diff_eq!(diff[(i, j)], expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn flattened_matches_kronecker_formula() {
        let base = base(true);
        let sparsity = Sparsity::new(0.5.into(), None, 4).unwrap();
        let smoothness = Smoothness::from((0.2, 0.4));
        let problem = Assembler::new(false).assemble(&base, &sparsity, smoothness);

        assert_eq!(problem.mode(), ProblemMode::Flattened);
        assert_eq!(problem.side(), 8);
        let q = laplacian_square(4, true).to_dense() * 0.2 + DMatrix::<f64>::identity(4, 4) * 0.5;
        let expected = q.kronecker(&DMatrix::<f64>::identity(2, 2))
            + base.cross_term().to_dense()
            + DMatrix::<f64>::identity(4, 4).kronecker(&(laplacian_square(2, true).to_dense() * 0.4));
        for (x, y) in problem.p().to_dense().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
        }

        // Row-major flattening: entry (a, g) lands at a·Ng + g.
        let bc = base.b_contracted();
        assert_abs_diff_eq!(problem.qhalf()[(2 * 2 + 1, 0)], -bc[(2, 1)], epsilon = 1e-15);
        assert_eq!(problem.qhalf().ncols(), 1);
    }

    #[test]
    fn spectral_weight_alone_forces_flattening() {
        let base = base(false);
        let sparsity = Sparsity::new(1.0.into(), None, 4).unwrap();
        let problem = Assembler::new(false).assemble(&base, &sparsity, (0.1, 0.1).into());
        assert_eq!(problem.mode(), ProblemMode::Flattened);
        assert_eq!(problem.side(), 4 * 3);
    }

    #[test]
    fn cross_term_is_cached_only_when_enabled() {
        let base = base(true);
        let sparsity = Sparsity::new(1.0.into(), None, 4).unwrap();

        let mut cached = Assembler::new(true);
        assert!(cached.caches_cross_term());
        let first = cached.assemble(&base, &sparsity, (0.1, 0.1).into());
        let second = cached.assemble(&base, &sparsity, (0.1, 0.1).into());
        assert_eq!(cached.cross_term_builds(), 1);
        assert_eq!(first, second);

        let mut uncached = Assembler::new(false);
        assert!(!uncached.caches_cross_term());
        let third = uncached.assemble(&base, &sparsity, (0.1, 0.1).into());
        uncached.assemble(&base, &sparsity, (0.1, 0.1).into());
        assert_eq!(uncached.cross_term_builds(), 2);
        assert_eq!(first, third);
    }

    #[test]
    fn flattened_segment_ranges_expand_by_ng() {
        let segment = Segment { range: 1..3, weight: 1.0 };
        assert_eq!(diagonal_range(&segment, ProblemMode::Vectorized, 5), 1..3);
        assert_eq!(diagonal_range(&segment, ProblemMode::Flattened, 5), 5..15);
    }
}
