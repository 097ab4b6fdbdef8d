//! # tenreg-kernels
//!
//! Stateless numerical kernels for low-rank tensor regression.
//!
//! - **Khatri-Rao product** of two matrices (serial and parallel) and of a
//!   factor list with one factor left out
//! - **N-mode products** (tensor times matrix), single and sequential
//! - **Outer products** and **CP reconstruction**
//! - **CP norm** computed from the factors without forming the tensor
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::Array2;
//! use tenreg_core::DenseND;
//! use tenreg_kernels::{cp_reconstruct, khatri_rao_seq, nmode_product};
//!
//! let factors = vec![
//!     Array2::<f64>::ones((3, 2)),
//!     Array2::<f64>::ones((4, 2)),
//!     Array2::<f64>::ones((5, 2)),
//! ];
//! let views: Vec<_> = factors.iter().map(|f| f.view()).collect();
//!
//! // Product of all factors except mode 1
//! let kr = khatri_rao_seq(&views, Some(1)).unwrap();
//! assert_eq!(kr.shape(), &[15, 2]);
//!
//! // Dense tensor of the CP model
//! let w = cp_reconstruct(&views, None).unwrap();
//! assert_eq!(w.shape(), &[3, 4, 5]);
//! assert_eq!(w[&[0, 0, 0]], 2.0);
//!
//! // Tensor-matrix multiplication
//! let tensor = DenseND::<f64>::ones(&[3, 4, 5]);
//! let matrix = Array2::<f64>::ones((2, 3));
//! let result = nmode_product(&tensor, &matrix.view(), 0).unwrap();
//! assert_eq!(result.shape(), &[2, 4, 5]);
//! ```
//!
//! ## Error Handling
//!
//! Kernels return [`KernelResult`] with a structured [`KernelError`];
//! `khatri_rao` and `khatri_rao_parallel` panic on column mismatch like
//! their ndarray counterparts.
//!
//! ## Features
//!
//! - `parallel` (default): parallel Khatri-Rao via `scirs2_core::parallel_ops`

#![deny(warnings)]

pub mod error;
pub mod khatri_rao;
pub mod nmode;
pub mod outer;

#[cfg(test)]
mod property_tests;

pub use error::{KernelError, KernelResult};
pub use khatri_rao::*;
pub use nmode::*;
pub use outer::*;
