//! # tenreg - Low-rank tensor regression
//!
//! Meta crate re-exporting the tenreg components for convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use tenreg::prelude::*;
//! use scirs2_core::ndarray_ext::Array1;
//!
//! // 40 samples of 4x3 matrices, target depends on a single entry
//! let x = DenseND::<f64>::random_normal_seeded(&[40, 4, 3], 0.0, 1.0, 1);
//! let y = Array1::from_shape_fn(40, |n| 2.0 * x[&[n, 1, 0]]);
//!
//! let mut model = CpRegressor::new(
//!     CpRegressorConfig::new(1)
//!         .with_reg_w(0.0)
//!         .with_tol(1e-12)
//!         .with_random_state(Some(3)),
//! )?;
//! model.fit(&x, &y)?;
//!
//! let w = model.weight_tensor()?;
//! assert_eq!(w.shape(), &[4, 3]);
//! assert!((w[&[1, 0]] - 2.0).abs() < 1e-4);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Dense tensors ([`core`])
//!
//! `DenseND`, reshape/permute, unfold/fold and the per-sample
//! `partial_unfold` / `partial_vec` reshapes used to build design matrices.
//!
//! ```
//! use tenreg::core::DenseND;
//!
//! let batch = DenseND::<f64>::ones(&[5, 2, 3]);
//! assert_eq!(batch.partial_vec(1).unwrap().shape(), &[5, 6]);
//! ```
//!
//! ### Kernels ([`kernels`])
//!
//! Khatri-Rao products, n-mode products and Kruskal reconstruction.
//!
//! ```
//! use scirs2_core::ndarray_ext::Array2;
//! use tenreg::kernels::cp_reconstruct;
//!
//! let a = Array2::<f64>::ones((3, 2));
//! let b = Array2::<f64>::ones((4, 2));
//! let w = cp_reconstruct(&[a.view(), b.view()], None).unwrap();
//! assert_eq!(w.shape(), &[3, 4]);
//! assert_eq!(w[&[0, 0]], 2.0);
//! ```
//!
//! ### Regression ([`regression`])
//!
//! [`regression::CpRegressor`] fits a Kruskal weight tensor by
//! alternating ridge-regularized least squares.
//!
//! ## Features
//!
//! - `parallel` (default): parallel Khatri-Rao products for large factors
//! - `serde`: serialization for tensors and configuration

#![deny(warnings)]

pub use tenreg_core as core;
pub use tenreg_kernels as kernels;
pub use tenreg_regression as regression;

/// Commonly used types and functions
pub mod prelude {
    pub use tenreg_core::DenseND;
    pub use tenreg_kernels::{
        cp_norm, cp_reconstruct, khatri_rao, khatri_rao_seq, nmode_product, nmode_products_seq,
        outer_product, KernelError,
    };
    pub use tenreg_regression::{
        CpRegressor, CpRegressorConfig, FactorInit, FitReport, RegressionError, StopReason,
        TensorRegressor, Verbosity,
    };
}
