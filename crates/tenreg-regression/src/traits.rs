//! Capability shared by tensor regression models

use crate::cp::CpRegressor;
use crate::error::RegressionResult;
use scirs2_core::ndarray_ext::{Array1, ScalarOperand};
use scirs2_core::numeric::{Float, FloatConst, NumAssign, NumCast};
use std::fmt::Display;
use std::iter::Sum;
use tenreg_core::DenseND;

/// A model that regresses scalar labels on sample tensors
///
/// Samples are passed as one tensor whose leading axis indexes them.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array1;
/// use tenreg_core::DenseND;
/// use tenreg_regression::{CpRegressor, CpRegressorConfig, TensorRegressor};
///
/// fn fit_and_predict<M: TensorRegressor<f64>>(
///     model: &mut M,
///     x: &DenseND<f64>,
///     y: &Array1<f64>,
/// ) -> Array1<f64> {
///     model.fit(x, y).unwrap();
///     model.predict(x).unwrap()
/// }
///
/// let x = DenseND::<f64>::random_normal_seeded(&[30, 3, 3], 0.0, 1.0, 0);
/// let y = Array1::from_shape_fn(30, |n| x[&[n, 0, 0]]);
/// let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
/// let y_hat = fit_and_predict(&mut model, &x, &y);
/// assert_eq!(y_hat.len(), 30);
/// ```
pub trait TensorRegressor<T> {
    /// Estimate the model from samples and labels
    fn fit(&mut self, x: &DenseND<T>, y: &Array1<T>) -> RegressionResult<&mut Self>;

    /// Predict one label per sample
    fn predict(&self, x: &DenseND<T>) -> RegressionResult<Array1<T>>;

    /// Dense weight tensor of the fitted model
    fn weight_tensor(&self) -> RegressionResult<DenseND<T>>;
}

impl<T> TensorRegressor<T> for CpRegressor<T>
where
    T: Float
        + FloatConst
        + NumCast
        + NumAssign
        + Sum
        + ScalarOperand
        + Send
        + Sync
        + Display
        + 'static,
{
    fn fit(&mut self, x: &DenseND<T>, y: &Array1<T>) -> RegressionResult<&mut Self> {
        CpRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &DenseND<T>) -> RegressionResult<Array1<T>> {
        CpRegressor::predict(self, x)
    }

    fn weight_tensor(&self) -> RegressionResult<DenseND<T>> {
        CpRegressor::weight_tensor(self)
    }
}
