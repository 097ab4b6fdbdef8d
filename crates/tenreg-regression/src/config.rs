//! Estimator configuration
//!
//! [`CpRegressorConfig`] is a plain value: construct it with
//! [`CpRegressorConfig::new`] or `Default`, adjust it with the `with_*`
//! methods and hand it to [`crate::CpRegressor::new`], which validates it.

use crate::error::{RegressionError, RegressionResult};

/// How much the fitting loop reports through `tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verbosity {
    /// Only start/end summaries at `debug` level
    #[default]
    Silent,
    /// One `info` event per iteration, `warn` when the loss goes up
    PerIteration,
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose {
            Verbosity::PerIteration
        } else {
            Verbosity::Silent
        }
    }
}

/// Factor initialization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FactorInit {
    /// Entries drawn from N(0, 1/dim_k)
    #[default]
    RandomNormal,
    /// Entries drawn from U[0, 1) scaled by 1/sqrt(dim_k)
    RandomUniform,
}

/// Hyperparameters of [`crate::CpRegressor`]
///
/// # Examples
///
/// ```
/// use tenreg_regression::{CpRegressorConfig, Verbosity};
///
/// let config = CpRegressorConfig::new(3)
///     .with_reg_w(0.1)
///     .with_n_iter_max(50)
///     .with_verbosity(Verbosity::PerIteration);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.rank, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpRegressorConfig {
    /// Number of CP components r (≥ 1)
    pub rank: usize,
    /// Ridge penalty on the factors (≥ 0)
    pub reg_w: f64,
    /// Relative loss-change tolerance (> 0)
    pub tol: f64,
    /// Maximum number of ALS sweeps (≥ 1)
    pub n_iter_max: usize,
    pub verbosity: Verbosity,
    pub init: FactorInit,
    /// Seed for the factor initialization; `None` draws from the thread RNG
    pub random_state: Option<u64>,
    /// Fit an unpenalized scalar intercept
    pub fit_intercept: bool,
    /// Rebalance column norms across modes after every sweep
    pub normalize_factors: bool,
    /// Stop after this many consecutive loss increases
    pub divergence_patience: Option<usize>,
}

impl Default for CpRegressorConfig {
    fn default() -> Self {
        Self {
            rank: 1,
            reg_w: 0.0,
            tol: 1e-6,
            n_iter_max: 100,
            verbosity: Verbosity::Silent,
            init: FactorInit::RandomNormal,
            random_state: Some(0),
            fit_intercept: false,
            normalize_factors: true,
            divergence_patience: None,
        }
    }
}

impl CpRegressorConfig {
    /// Default configuration with the given CP rank
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            ..Self::default()
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_reg_w(mut self, reg_w: f64) -> Self {
        self.reg_w = reg_w;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_n_iter_max(mut self, n_iter_max: usize) -> Self {
        self.n_iter_max = n_iter_max;
        self
    }

    pub fn with_verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.verbosity = verbosity.into();
        self
    }

    pub fn with_init(mut self, init: FactorInit) -> Self {
        self.init = init;
        self
    }

    pub fn with_random_state(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn with_normalize_factors(mut self, normalize_factors: bool) -> Self {
        self.normalize_factors = normalize_factors;
        self
    }

    pub fn with_divergence_patience(mut self, patience: Option<usize>) -> Self {
        self.divergence_patience = patience;
        self
    }

    /// Check every field against its valid range
    ///
    /// # Errors
    ///
    /// Returns [`RegressionError::InvalidHyperparameter`] naming the first
    /// offending field.
    pub fn validate(&self) -> RegressionResult<()> {
        if self.rank == 0 {
            return Err(RegressionError::hyperparameter("rank", "must be at least 1"));
        }
        if !self.reg_w.is_finite() || self.reg_w < 0.0 {
            return Err(RegressionError::hyperparameter(
                "reg_w",
                format!("must be finite and non-negative, got {}", self.reg_w),
            ));
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(RegressionError::hyperparameter(
                "tol",
                format!("must be finite and positive, got {}", self.tol),
            ));
        }
        if self.n_iter_max == 0 {
            return Err(RegressionError::hyperparameter(
                "n_iter_max",
                "must be at least 1",
            ));
        }
        if self.divergence_patience == Some(0) {
            return Err(RegressionError::hyperparameter(
                "divergence_patience",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}
