//! # tenreg-core
//!
//! Dense tensor type and the shape operations that tensor regression is
//! built on.
//!
//! - **Dense tensor representation** ([`DenseND`]) over `scirs2_core` arrays
//! - **Shape operations** (reshape, permute, flatten)
//! - **Matricization** (unfold/fold) of a single tensor
//! - **Batch matricization** (`partial_unfold`, `partial_fold`,
//!   `partial_vec`) that keeps the leading sample axis intact
//! - **Random construction** with seeded and caller-supplied generators
//!
//! ## SciRS2 Integration
//!
//! This crate uses `scirs2-core` for arrays, numeric traits and random
//! number generation. Direct use of `ndarray`, `rand` or `num-traits` is
//! not allowed.
//!
//! ## Quick Start
//!
//! ```
//! use tenreg_core::DenseND;
//!
//! // 10 samples of 3×4 matrices
//! let batch = DenseND::<f64>::random_normal_seeded(&[10, 3, 4], 0.0, 1.0, 0);
//!
//! // One flattened sample per row
//! let rows = batch.partial_vec(1).unwrap();
//! assert_eq!(rows.shape(), &[10, 12]);
//!
//! // Unfold every sample along its second mode
//! let unfolded = batch.partial_unfold(1, 1).unwrap();
//! assert_eq!(unfolded.shape(), &[10, 4, 3]);
//! ```
//!
//! ## Matricization (Unfold/Fold)
//!
//! ```
//! use tenreg_core::DenseND;
//!
//! let tensor = DenseND::<f64>::ones(&[2, 3, 4]);
//!
//! let unfolded = tensor.unfold(1).unwrap();
//! assert_eq!(unfolded.shape(), &[3, 8]);
//!
//! let folded = DenseND::fold(&unfolded, &[2, 3, 4], 1).unwrap();
//! assert_eq!(folded, tensor);
//! ```
//!
//! ## Error Handling
//!
//! Operations return `anyhow::Result`:
//!
//! ```
//! use tenreg_core::DenseND;
//!
//! let tensor = DenseND::<f64>::zeros(&[2, 3]);
//! assert!(tensor.reshape(&[7]).is_err());
//! assert!(tensor.unfold(10).is_err());
//! assert!(tensor.partial_unfold(1, 1).is_err());
//! ```
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support

#![deny(warnings)]

pub mod dense;


pub use dense::DenseND;
