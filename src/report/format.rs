//! Formatted terminal output for demo runs.
//!
//! We keep formatting code in one place so the solver stays free of printing
//! and output changes are localized.

use nalgebra::DMatrix;

use crate::app::pipeline::RunOutput;
use crate::domain::SparsityWeights;
use crate::error::SpookError;

/// Largest absolute element-wise deviation between `x` and `x_true`.
pub fn max_abs_error(x: &DMatrix<f64>, x_true: &DMatrix<f64>) -> Result<f64, SpookError> {
    if x.shape() != x_true.shape() {
        return Err(SpookError::shape(format!(
            "Solution is {}x{} but truth is {}x{}.",
            x.nrows(),
            x.ncols(),
            x_true.nrows(),
            x_true.ncols()
        )));
    }
    Ok(x.iter()
        .zip(x_true.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max))
}

fn format_lsparse(weights: &SparsityWeights) -> String {
    match weights {
        SparsityWeights::Uniform(w) => format!("{w}"),
        SparsityWeights::PerSegment(ws) => {
            let parts: Vec<String> = ws.iter().map(|w| format!("{w}")).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// Format a matrix with one row per line.
pub fn format_matrix(m: &DMatrix<f64>) -> String {
    let mut out = String::new();
    for row in m.row_iter() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>9.4}")).collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// Format the run summary (problem setup + recovery diagnostics).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();
    let s = &run.scenario;

    out.push_str("=== spook - regularized linear solve ===\n");
    out.push_str(&format!(
        "Data: A {}x{} | G {}x{} | B {}x{} | noise sigma={:.3e}\n",
        s.a.nrows(),
        s.a.ncols(),
        s.g.nrows(),
        s.g.ncols(),
        s.b.nrows(),
        s.b.ncols(),
        s.noise_sigma
    ));
    out.push_str(&format!(
        "Weights: lsparse={} | lsmooth=({}, {})",
        format_lsparse(&run.config.lsparse),
        run.config.lsmooth.spatial,
        run.config.lsmooth.spectral
    ));
    if let Some(sizes) = &run.config.sp_idcs {
        out.push_str(&format!(" | segments={sizes:?}"));
    }
    out.push('\n');
    out.push_str(&format!(
        "Problem: {} | {} | side={} | cross-term builds={}\n",
        run.mode.display_name(),
        run.representation,
        run.side,
        run.cross_term_builds
    ));
    out.push_str(&format!(
        "Recovery: max |X - X_true| = {:.4e} | residual ||P x + q|| = {:.3e}\n",
        run.max_abs_error, run.residual_norm
    ));
    out.push_str("\nX (recovered):\n");
    out.push_str(&format_matrix(&run.x));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_abs_error_picks_largest_deviation() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = DMatrix::from_row_slice(2, 2, &[1.5, 2.0, 2.0, 4.1]);
        let err = max_abs_error(&a, &b).unwrap();
        assert!((err - 1.0).abs() < 1e-12, "got {err}");
        assert!(max_abs_error(&a, &DMatrix::zeros(1, 2)).is_err());
    }

    #[test]
    fn lsparse_formatting() {
        assert_eq!(format_lsparse(&SparsityWeights::Uniform(1.0)), "1");
        assert_eq!(format_lsparse(&vec![0.5, 2.0].into()), "[0.5, 2]");
    }

    #[test]
    fn matrix_formatting_has_one_line_per_row() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let text = format_matrix(&m);
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("   1.0000"), "{text:?}");
    }
}
