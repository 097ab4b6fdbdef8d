//! Dense tensor implementation and operations

// Core type definition
pub mod types;

mod creation;
mod shape_ops;
mod statistics;

pub mod densend_traits;

pub use types::DenseND;
