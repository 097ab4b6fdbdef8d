//! Error type for tensor regression estimators

use scirs2_linalg::LinalgError;
use tenreg_kernels::KernelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegressionError {
    /// Samples, labels or factors have incompatible shapes
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// A configuration value is out of its valid range
    #[error("Invalid hyperparameter `{name}`: {reason}")]
    InvalidHyperparameter { name: &'static str, reason: String },

    /// The estimator has not been fitted yet
    #[error("Estimator is not fitted; call fit() first")]
    NotFitted,

    /// The factor update could not be solved even after adding jitter
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

impl From<KernelError> for RegressionError {
    fn from(err: KernelError) -> Self {
        RegressionError::InvalidShape(err.to_string())
    }
}

impl RegressionError {
    pub(crate) fn hyperparameter(name: &'static str, reason: impl Into<String>) -> Self {
        RegressionError::InvalidHyperparameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for regression operations
pub type RegressionResult<T> = Result<T, RegressionError>;
