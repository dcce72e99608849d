//! Export a solved problem to JSON.
//!
//! The export is meant to be easy to consume in notebooks or downstream scripts:
//! matrices are written as lists of rows.

use std::fs::File;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{ProblemMode, Smoothness, SparsityWeights};
use crate::error::SpookError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionFile {
    pub tool: String,
    pub mode: ProblemMode,
    pub lsparse: SparsityWeights,
    pub lsmooth: Smoothness,
    /// Recovered coefficients, `Na` rows of `Ng` values.
    pub x: Vec<Vec<f64>>,
    /// Ground truth when the problem was synthetic.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x_true: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_abs_error: Option<f64>,
}

/// Row-major nested representation of a matrix.
pub fn matrix_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|row| row.iter().copied().collect()).collect()
}

pub fn write_solution_json(path: &Path, solution: &SolutionFile) -> Result<(), SpookError> {
    let file = File::create(path).map_err(|source| SpookError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::to_writer_pretty(file, solution)?;
    Ok(())
}

pub fn read_solution_json(path: &Path) -> Result<SolutionFile, SpookError> {
    let file = File::open(path).map_err(|source| SpookError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_file_round_trips_through_disk() {
        let x = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let solution = SolutionFile {
            tool: "spook".to_string(),
            mode: ProblemMode::Flattened,
            lsparse: SparsityWeights::PerSegment(vec![1.0, 0.5]),
            lsmooth: (0.1, 0.2).into(),
            x: matrix_rows(&x),
            x_true: None,
            max_abs_error: Some(1e-3),
        };
        assert_eq!(solution.x[1], vec![4.0, 5.0, 6.0]);

        let path = std::env::temp_dir().join(format!("spook_solution_{}.json", std::process::id()));
        write_solution_json(&path, &solution).unwrap();
        let back = read_solution_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, solution);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_solution_json(Path::new("/nonexistent/spook.json")).unwrap_err();
        assert!(matches!(err, SpookError::Io { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
