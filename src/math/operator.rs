//! Square and rectangular operators stored either densely or sparsely.
//!
//! The normal-equations matrix is a sum of several operators (`AtA`, the
//! smoothers, identity blocks, Kronecker expansions). Sums stay sparse only
//! while every term is sparse; the first dense term turns the result dense.
//! Sparse storage is always CSC.

use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Dense(DMatrix<f64>),
    Sparse(CsMat<f64>),
}

impl From<DMatrix<f64>> for Operator {
    fn from(value: DMatrix<f64>) -> Self {
        Self::Dense(value)
    }
}

impl From<CsMat<f64>> for Operator {
    fn from(value: CsMat<f64>) -> Self {
        Self::Sparse(value.into_csc())
    }
}

impl Operator {
    /// Sparse `n×n` identity.
    pub fn identity(n: usize) -> Self {
        Self::Sparse(CsMat::eye(n).into_csc())
    }

    /// Sparse all-zero `nrows×ncols` matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::Sparse(CsMat::zero((nrows, ncols)).into_csc())
    }

    pub fn nrows(&self) -> usize {
        match self {
            Self::Dense(m) => m.nrows(),
            Self::Sparse(m) => m.rows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Self::Dense(m) => m.ncols(),
            Self::Sparse(m) => m.cols(),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Self::Sparse(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Dense(_) => "dense",
            Self::Sparse(_) => "sparse",
        }
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        match self {
            Self::Dense(m) => m.clone(),
            Self::Sparse(m) => sparse_to_dense(m),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            Self::Dense(m) => m[(row, col)],
            Self::Sparse(m) => m.get(row, col).copied().unwrap_or(0.0),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Self::Dense(m) => Self::Dense(m * factor),
            Self::Sparse(m) => Self::Sparse(m.map(|v| v * factor)),
        }
    }

    /// `self + other`, sparse iff both terms are sparse.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn add(&self, other: &Operator) -> Self {
        assert_eq!(
            (self.nrows(), self.ncols()),
            (other.nrows(), other.ncols()),
            "operator shapes must match"
        );
        match (self, other) {
            (Self::Sparse(a), Self::Sparse(b)) => Self::Sparse((a + b).into_csc()),
            (Self::Dense(a), Self::Dense(b)) => Self::Dense(a + b),
            (Self::Dense(d), Self::Sparse(s)) | (Self::Sparse(s), Self::Dense(d)) => {
                let mut out = d.clone();
                for (&v, (i, j)) in s.iter() {
                    out[(i, j)] += v;
                }
                Self::Dense(out)
            }
        }
    }

    /// In-place `self += other`; a sparse `self` becomes dense if `other` is dense.
    pub fn add_assign(&mut self, other: &Operator) {
        if let Self::Dense(d) = self {
            assert_eq!((d.nrows(), d.ncols()), (other.nrows(), other.ncols()), "operator shapes must match");
            match other {
                Self::Dense(b) => *d += b,
                Self::Sparse(s) => {
                    for (&v, (i, j)) in s.iter() {
                        d[(i, j)] += v;
                    }
                }
            }
            return;
        }
        *self = self.add(other);
    }

    /// Kronecker product `self ⊗ other`.
    pub fn kron(&self, other: &Operator) -> Self {
        match (self, other) {
            (Self::Sparse(a), Self::Sparse(b)) => Self::Sparse(kron_sparse(a, b)),
            (Self::Dense(a), Self::Dense(b)) => Self::Dense(a.kronecker(b)),
            (Self::Dense(a), Self::Sparse(b)) => Self::Dense(kron_dense_sparse(a, b)),
            (Self::Sparse(a), Self::Dense(b)) => Self::Dense(sparse_to_dense(a).kronecker(b)),
        }
    }

    /// `self[i, i] += delta` for every `i` in `range`.
    ///
    /// Sparse diagonal entries missing from the structure are inserted.
    pub fn add_to_diagonal(&mut self, range: std::ops::Range<usize>, delta: f64) {
        match self {
            Self::Dense(m) => {
                for i in range {
                    m[(i, i)] += delta;
                }
            }
            Self::Sparse(m) => {
                for i in range {
                    match m.get_mut(i, i) {
                        Some(v) => *v += delta,
                        None => m.insert(i, i, delta),
                    }
                }
            }
        }
    }

    /// Matrix product `self * rhs` for a dense right-hand side.
    pub fn mul_dense(&self, rhs: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            Self::Dense(m) => m * rhs,
            Self::Sparse(m) => {
                let mut out = DMatrix::zeros(m.rows(), rhs.ncols());
                for (&v, (i, j)) in m.iter() {
                    for c in 0..rhs.ncols() {
                        out[(i, c)] += v * rhs[(j, c)];
                    }
                }
                out
            }
        }
    }

    /// Gram matrix `selfᵀ self`.
    pub fn gram(&self) -> Self {
        match self {
            Self::Dense(m) => Self::Dense(m.tr_mul(m)),
            Self::Sparse(m) => {
                let mt = m.transpose_view().to_owned();
                Self::Sparse((&mt * m).into_csc())
            }
        }
    }

    /// `selfᵀ rhs` for a dense right-hand side.
    pub fn tr_mul_dense(&self, rhs: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            Self::Dense(m) => m.tr_mul(rhs),
            Self::Sparse(m) => {
                let mut out = DMatrix::zeros(m.cols(), rhs.ncols());
                for (&v, (i, j)) in m.iter() {
                    for c in 0..rhs.ncols() {
                        out[(j, c)] += v * rhs[(i, c)];
                    }
                }
                out
            }
        }
    }
}

fn sparse_to_dense(m: &CsMat<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(m.rows(), m.cols());
    for (&v, (i, j)) in m.iter() {
        out[(i, j)] += v;
    }
    out
}

fn kron_sparse(a: &CsMat<f64>, b: &CsMat<f64>) -> CsMat<f64> {
    let (br, bc) = (b.rows(), b.cols());
    let mut tri = TriMat::with_capacity((a.rows() * br, a.cols() * bc), a.nnz() * b.nnz());
    for (&va, (ia, ja)) in a.iter() {
        for (&vb, (ib, jb)) in b.iter() {
            tri.add_triplet(ia * br + ib, ja * bc + jb, va * vb);
        }
    }
    tri.to_csc()
}

fn kron_dense_sparse(a: &DMatrix<f64>, b: &CsMat<f64>) -> DMatrix<f64> {
    let (br, bc) = (b.rows(), b.cols());
    let mut out = DMatrix::zeros(a.nrows() * br, a.ncols() * bc);
    for ja in 0..a.ncols() {
        for ia in 0..a.nrows() {
            let va = a[(ia, ja)];
            if va == 0.0 {
                continue;
            }
            for (&vb, (ib, jb)) in b.iter() {
                out[(ia * br + ib, ja * bc + jb)] += va * vb;
            }
        }
    }
    out
}
