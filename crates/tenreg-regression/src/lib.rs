//! # tenreg-regression - Low-rank Tensor Regression
//!
//! Linear regression of scalar labels on tensor-valued samples, with the
//! weight tensor constrained to a low-rank CP (Kruskal) form:
//!
//! ```text
//! yᵢ ≈ ⟨Xᵢ, W⟩ + b,   W = Σ_c a₁c ∘ a₂c ∘ … ∘ a_dc
//! ```
//!
//! For samples of shape (d₁, …, d_d) a rank-r model has r·Σ dₖ parameters
//! instead of Π dₖ.
//!
//! ## Fitting
//!
//! [`CpRegressor`] estimates the factors by alternating least squares: each
//! sweep solves a ridge-regularized linear problem for one factor at a time
//! while the others are held fixed, until the relative loss change drops
//! below `tol` or `n_iter_max` sweeps have run.
//!
//! ```
//! use scirs2_core::ndarray_ext::Array1;
//! use tenreg_core::DenseND;
//! use tenreg_regression::{CpRegressor, CpRegressorConfig, StopReason};
//!
//! let x = DenseND::<f64>::random_normal_seeded(&[100, 4, 4], 0.0, 1.0, 0);
//! let y = Array1::from_shape_fn(100, |n| x[&[n, 1, 2]] - 2.0 * x[&[n, 3, 2]]);
//!
//! let mut model = CpRegressor::new(
//!     CpRegressorConfig::new(1).with_n_iter_max(200).with_tol(1e-10),
//! )
//! .unwrap();
//! model.fit(&x, &y).unwrap();
//!
//! assert_eq!(model.report().unwrap().stop_reason, StopReason::Converged);
//! assert!(model.score(&x, &y).unwrap() > 0.999);
//!
//! let w = model.weight_tensor().unwrap();
//! assert_eq!(w.shape(), &[4, 4]);
//! assert!((w[&[1, 2]] - 1.0).abs() < 1e-3);
//! ```
//!
//! ## Logging
//!
//! Fitting emits `tracing` events: a `debug` summary at the start and end of
//! every fit, and with [`Verbosity::PerIteration`] one `info` event per
//! sweep plus a `warn` whenever the loss increases.
//!
//! ## Features
//!
//! - `serde`: serialization of [`CpRegressorConfig`]

#![deny(warnings)]

pub mod config;
pub mod cp;
pub mod error;
mod solve;
pub mod traits;


pub use config::{CpRegressorConfig, FactorInit, Verbosity};
pub use cp::{CpRegressor, FitReport, StopReason};
pub use error::{RegressionError, RegressionResult};
pub use traits::TensorRegressor;
