//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<T, SpookError>`. The binary maps an
//! error to a process exit code via [`SpookError::exit_code`]:
//!
//! - `2`: bad input (configuration, shapes, files)
//! - `4`: numerical failure (the coefficient matrix could not be factorized)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpookError {
    /// Malformed or dimensionally inconsistent regularization settings.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Operator dimensions do not line up.
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Dense Cholesky factorization failed.
    #[error("Coefficient matrix ({side}x{side}) is not positive definite; increase the regularization weights.")]
    NotPositiveDefinite { side: usize },

    /// Sparse LDL^T factorization reported a singular or indefinite matrix.
    #[error("Sparse factorization failed: {0}")]
    Factorization(#[from] sprs::errors::LinalgError),

    /// The solve finished but produced NaN/inf entries.
    #[error("Solve produced non-finite values; the system is numerically degenerate.")]
    NonFinite,

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpookError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Shape(_) | Self::Io { .. } | Self::Json(_) => 2,
            Self::NotPositiveDefinite { .. } | Self::Factorization(_) | Self::NonFinite => 4,
        }
    }

    /// True for failures the caller can mitigate by raising the regularization weights.
    pub fn is_numerical(&self) -> bool {
        self.exit_code() == 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_split_input_and_numerical_failures() {
        assert_eq!(SpookError::config("bad").exit_code(), 2);
        assert_eq!(SpookError::shape("bad").exit_code(), 2);
        let err = SpookError::NotPositiveDefinite { side: 3 };
        assert_eq!(err.exit_code(), 4);
        assert!(err.is_numerical());
        assert!(err.to_string().contains("3x3"), "unexpected message: {err}");
    }
}
