//! Discrete Laplacian smoothness operators.
//!
//! The smoothness penalty on a coefficient axis of length `n` is `‖L x‖²`,
//! where `L` is the second-difference operator with rows `[1, -2, 1]`.
//! The normal equations need `LᵀL`, which is what [`laplacian_square`] returns.
//!
//! Boundary handling:
//! - `drop_boundaries = true`: only interior rows (`n - 2` of them), so the
//!   penalty vanishes on any linear trend.
//! - `drop_boundaries = false`: the full `n×n` tridiagonal, whose first and last
//!   rows also penalize the boundary values themselves.

use sprs::TriMat;

use crate::math::Operator;

/// Sparse `LᵀL` for an axis of length `n`.
pub fn laplacian_square(n: usize, drop_boundaries: bool) -> Operator {
    let mut tri = TriMat::new((n, n));
    for row in second_difference_rows(n, drop_boundaries) {
        for &(c1, v1) in &row {
            for &(c2, v2) in &row {
                tri.add_triplet(c1, c2, v1 * v2);
            }
        }
    }
    Operator::Sparse(tri.to_csc())
}

/// Rows of `L` as `(column, value)` lists.
fn second_difference_rows(n: usize, drop_boundaries: bool) -> Vec<Vec<(usize, f64)>> {
    if drop_boundaries {
        if n < 3 {
            return Vec::new();
        }
        (1..n - 1)
            .map(|i| vec![(i - 1, 1.0), (i, -2.0), (i + 1, 1.0)])
            .collect()
    } else {
        (0..n)
            .map(|i| {
                let mut row = Vec::with_capacity(3);
                if i > 0 {
                    row.push((i - 1, 1.0));
                }
                row.push((i, -2.0));
                if i + 1 < n {
                    row.push((i + 1, 1.0));
                }
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DVector;

    #[test]
    fn interior_laplacian_annihilates_linear_trends() {
        let la2 = laplacian_square(6, true).to_dense();
        let x = DVector::from_fn(6, |i, _| 2.0 + 0.5 * i as f64);
        let y = &la2 * &x;
        for v in y.iter() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn laplacian_square_is_symmetric_with_known_stencil() {
        let la2 = laplacian_square(5, true).to_dense();
        assert_eq!(la2, la2.transpose());
        // Middle row of LᵀL for interior rows is [1, -4, 6, -4, 1].
        let mid: Vec<f64> = la2.row(2).iter().copied().collect();
        assert_eq!(mid, vec![1.0, -4.0, 6.0, -4.0, 1.0]);
        assert_abs_diff_eq!(la2[(0, 0)], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn full_laplacian_penalizes_boundaries() {
        let la2 = laplacian_square(4, false).to_dense();
        assert_abs_diff_eq!(la2[(0, 0)], 5.0, epsilon = 1e-15);
        let x = DVector::from_element(4, 1.0);
        let penalty = x.dot(&(&la2 * &x));
        assert!(penalty > 0.0, "constant vector should be penalized, got {penalty}");
    }

    #[test]
    fn short_axes_have_no_interior_penalty() {
        let la2 = laplacian_square(2, true);
        assert!(la2.is_sparse());
        assert_eq!(la2.nrows(), 2);
        assert!(la2.to_dense().iter().all(|v| *v == 0.0));
    }
}
