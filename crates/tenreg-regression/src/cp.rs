//! CP (Kruskal) tensor regression fitted by alternating least squares
//!
//! The model predicts a scalar from each sample tensor Xᵢ of shape
//! (dim₁, …, dim_d) through a weight tensor of the same shape that is kept
//! in CP form:
//!
//! ŷᵢ = ⟨Xᵢ, W⟩ + b,   W = Σ_c F₁[:, c] ∘ … ∘ F_d[:, c]
//!
//! so only r·Σ dim_k parameters are estimated. Fixing every factor but F_k
//! makes ŷ linear in vec(F_k):
//!
//! ŷ = Φ_k · vec(F_k) + b,   Φ_k = [X]_(k) · (⊙_{j≠k} F_j)
//!
//! where `[X]_(k)` is the per-sample mode-k unfolding. Each ALS sweep solves
//! one ridge-regularized least-squares problem per mode, in ascending mode
//! order, and replaces that factor wholesale.
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.
//! Linear solves use `scirs2_linalg::lstsq`.

use crate::config::{CpRegressorConfig, FactorInit, Verbosity};
use crate::error::{RegressionError, RegressionResult};
use crate::solve::solve_regularized;
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView2, Axis, ScalarOperand};
use scirs2_core::numeric::{Float, FloatConst, NumAssign, NumCast};
use scirs2_core::random::{thread_rng, Rng, SeedableRng, StdRng};
use std::fmt::Display;
use std::iter::Sum;
use std::sync::atomic::{AtomicBool, Ordering};
use tenreg_core::DenseND;
use tenreg_kernels::{cp_norm, cp_reconstruct, khatri_rao_seq, nmode_products_seq};
use tracing::{debug, info, warn};

/// Why the fitting loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Relative loss change fell below `tol`, or the fit became exact
    Converged,
    /// `n_iter_max` sweeps ran without converging
    MaxIterations,
    /// The cancellation flag was raised
    Cancelled,
    /// The loss rose for `divergence_patience` consecutive sweeps
    Diverged,
}

/// Diagnostics of the last successful fit
#[derive(Debug, Clone)]
pub struct FitReport<T> {
    /// Number of completed ALS sweeps
    pub n_iter: usize,
    pub stop_reason: StopReason,
    /// Loss after every sweep, `(‖y − ŷ‖² + reg_w·Σ‖F_k‖²) / N`
    pub loss_history: Vec<T>,
    /// ‖W‖_F after every sweep
    pub weight_norm_history: Vec<T>,
}

impl<T: Copy> FitReport<T> {
    /// Loss after the last sweep, `None` if no sweep completed
    pub fn final_loss(&self) -> Option<T> {
        self.loss_history.last().copied()
    }

    pub fn converged(&self) -> bool {
        self.stop_reason == StopReason::Converged
    }
}

/// Frozen state of a fitted model
#[derive(Debug, Clone)]
struct FittedCp<T> {
    factors: Vec<Array2<T>>,
    bias: T,
    sample_shape: Vec<usize>,
    report: FitReport<T>,
}

/// Low-rank CP tensor regressor
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array1;
/// use tenreg_core::DenseND;
/// use tenreg_regression::{CpRegressor, CpRegressorConfig};
///
/// // 200 samples of 6×5 matrices, labels from a rank-1 weight u ∘ v
/// let x = DenseND::<f64>::random_normal_seeded(&[200, 6, 5], 0.0, 1.0, 1);
/// let u = [1.0, -1.0, 0.5, 0.0, 2.0, 1.0];
/// let v = [0.5, 1.0, -1.0, 1.0, 0.0];
/// let y = Array1::from_shape_fn(200, |n| {
///     let mut acc = 0.0;
///     for i in 0..6 {
///         for j in 0..5 {
///             acc += x[&[n, i, j]] * u[i] * v[j];
///         }
///     }
///     acc
/// });
///
/// let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
/// model.fit(&x, &y).unwrap();
///
/// let y_hat = model.predict(&x).unwrap();
/// let err: f64 = (&y_hat - &y).mapv(|e| e * e).sum().sqrt();
/// assert!(err / y.mapv(|e| e * e).sum().sqrt() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct CpRegressor<T> {
    config: CpRegressorConfig,
    state: Option<FittedCp<T>>,
}

impl<T> CpRegressor<T>
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
    /// Create an unfitted estimator
    ///
    /// # Errors
    ///
    /// Returns [`RegressionError::InvalidHyperparameter`] if the
    /// configuration is out of range.
    pub fn new(config: CpRegressorConfig) -> RegressionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &CpRegressorConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Fit the model to samples `x` (N, dim₁, …, dim_d) and labels `y` (N)
    ///
    /// Factors are initialized from `config.random_state`, or from the
    /// thread RNG when it is `None`. Fitting again discards the previous
    /// model.
    ///
    /// # Errors
    ///
    /// - [`RegressionError::InvalidShape`] if `x` has no sample mode, no
    ///   samples, an empty mode, or `y` does not have N entries
    /// - [`RegressionError::Linalg`] if a factor update cannot be solved
    ///
    /// A failed fit leaves a previously fitted model untouched.
    pub fn fit(&mut self, x: &DenseND<T>, y: &Array1<T>) -> RegressionResult<&mut Self> {
        let mut rng = match self.config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let mut thread_rng_instance = thread_rng();
                StdRng::from_rng(&mut thread_rng_instance)
            }
        };
        self.fit_with_control(x, y, &mut rng, None)
    }

    /// Fit with factors initialized from a caller-supplied generator
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        x: &DenseND<T>,
        y: &Array1<T>,
        rng: &mut R,
    ) -> RegressionResult<&mut Self> {
        self.fit_with_control(x, y, rng, None)
    }

    /// Fit with an optional cancellation flag
    ///
    /// The flag is checked before every ALS sweep. A cancelled fit still
    /// produces a usable model from the sweeps completed so far, with
    /// [`StopReason::Cancelled`] in its report.
    pub fn fit_with_control<R: Rng>(
        &mut self,
        x: &DenseND<T>,
        y: &Array1<T>,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> RegressionResult<&mut Self> {
        let sample_shape = validate_training_data(x, y)?;
        let n = y.len();
        let rank = self.config.rank;
        let verbose = self.config.verbosity == Verbosity::PerIteration;

        let reg: T = cast(self.config.reg_w)?;
        let tol: T = cast(self.config.tol)?;
        let n_t: T = cast(n as f64)?;

        debug!(
            n_samples = n,
            sample_shape = ?sample_shape,
            rank,
            reg_w = self.config.reg_w,
            tol = self.config.tol,
            n_iter_max = self.config.n_iter_max,
            "starting CP regression fit"
        );

        let init = self.config.init;
        let mut factors = sample_shape
            .iter()
            .map(|&dim| init_factor(dim, rank, init, &mut *rng))
            .collect::<RegressionResult<Vec<_>>>()?;

        // Per-sample mode-k unfoldings, flattened to (N·dim_k, Π_{j≠k} dim_j)
        let unfoldings = (0..sample_shape.len())
            .map(|mode| {
                let unfolded = x
                    .partial_unfold(mode, 1)
                    .map_err(|e| RegressionError::InvalidShape(e.to_string()))?;
                let others = unfolded.shape()[2];
                unfolded
                    .reshape(&[n * sample_shape[mode], others])
                    .and_then(|t| t.unfold(0))
                    .map_err(|e| RegressionError::InvalidShape(e.to_string()))
            })
            .collect::<RegressionResult<Vec<Array2<T>>>>()?;

        let y_mean = y.sum() / n_t;
        let y_mean_sq = y.iter().fold(T::zero(), |acc, &v| acc + v * v) / n_t;
        let mut bias = if self.config.fit_intercept {
            y_mean
        } else {
            T::zero()
        };

        let mut loss_history = Vec::new();
        let mut weight_norm_history = Vec::new();
        let mut stop_reason = StopReason::MaxIterations;
        let mut stopping = StoppingRule::new(tol, y_mean_sq, self.config.divergence_patience);
        let mut n_iter = 0;

        for iter in 0..self.config.n_iter_max {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                stop_reason = StopReason::Cancelled;
                break;
            }

            let target = y.mapv(|v| v - bias);
            let mut inner = Array1::<T>::zeros(n);

            for mode in 0..factors.len() {
                let design = design_matrix(&unfoldings[mode], &factors, mode, n)?;
                let solution = solve_regularized(&design, &target, reg)?;
                inner = design.dot(&solution);
                factors[mode] =
                    Array2::from_shape_vec((sample_shape[mode], rank), solution.to_vec())
                        .map_err(|e| RegressionError::InvalidShape(e.to_string()))?;
            }

            if self.config.fit_intercept {
                bias = (y - &inner).sum() / n_t;
            }
            if self.config.normalize_factors {
                balance_factors(&mut factors);
            }

            let residual_sq = y
                .iter()
                .zip(inner.iter())
                .fold(T::zero(), |acc, (&yi, &fi)| {
                    let r = yi - fi - bias;
                    acc + r * r
                });
            let penalty = factors.iter().fold(T::zero(), |acc, f| {
                acc + f.iter().fold(T::zero(), |s, &v| s + v * v)
            });
            let loss = (residual_sq + reg * penalty) / n_t;

            let views: Vec<ArrayView2<T>> = factors.iter().map(|f| f.view()).collect();
            let weight_norm = cp_norm(&views)?;

            loss_history.push(loss);
            weight_norm_history.push(weight_norm);
            n_iter = iter + 1;

            let check = stopping.record(loss);
            if verbose {
                info!(
                    iteration = n_iter,
                    loss = to_f64(loss),
                    rel_change = ?check.rel_change.map(to_f64),
                    weight_norm = to_f64(weight_norm),
                    "cp regression iteration"
                );
                if let Some(prev) = check.increased_from {
                    warn!(
                        iteration = n_iter,
                        previous = to_f64(prev),
                        loss = to_f64(loss),
                        "loss increased"
                    );
                }
            }

            if let Some(reason) = check.stop {
                stop_reason = reason;
                break;
            }
        }

        debug!(
            n_iter,
            stop_reason = ?stop_reason,
            final_loss = ?loss_history.last().copied().map(to_f64),
            "CP regression fit finished"
        );

        self.state = Some(FittedCp {
            factors,
            bias,
            sample_shape,
            report: FitReport {
                n_iter,
                stop_reason,
                loss_history,
                weight_norm_history,
            },
        });
        Ok(self)
    }

    /// Predict labels for samples `x` (M, dim₁, …, dim_d)
    ///
    /// Each CP component is contracted against `x` mode by mode; the dense
    /// weight tensor is never formed.
    ///
    /// # Errors
    ///
    /// [`RegressionError::NotFitted`] before a successful fit and
    /// [`RegressionError::InvalidShape`] if the per-sample shape differs from
    /// the one seen during fit.
    pub fn predict(&self, x: &DenseND<T>) -> RegressionResult<Array1<T>> {
        let state = self.fitted()?;
        let shape = x.shape();
        if shape.len() != state.sample_shape.len() + 1 || shape[1..] != state.sample_shape[..] {
            return Err(RegressionError::InvalidShape(format!(
                "samples must have shape (M, {}), got {:?}",
                join_dims(&state.sample_shape),
                shape
            )));
        }

        let m = shape[0];
        let mut prediction = Array1::from_elem(m, state.bias);
        if m == 0 {
            return Ok(prediction);
        }

        for c in 0..self.config.rank {
            let rows: Vec<(ArrayView2<T>, usize)> = state
                .factors
                .iter()
                .enumerate()
                .map(|(k, f)| (f.column(c).insert_axis(Axis(0)), k + 1))
                .collect();
            let contracted = nmode_products_seq(x, &rows)?;
            for (p, &v) in prediction.iter_mut().zip(contracted.iter()) {
                *p += v;
            }
        }

        Ok(prediction)
    }

    /// Coefficient of determination R² on `(x, y)`
    ///
    /// Returns 1 for a perfect fit of constant labels and 0 for an imperfect
    /// one.
    pub fn score(&self, x: &DenseND<T>, y: &Array1<T>) -> RegressionResult<T> {
        let prediction = self.predict(x)?;
        if prediction.len() != y.len() {
            return Err(RegressionError::InvalidShape(format!(
                "labels must have {} entries, got {}",
                prediction.len(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(RegressionError::InvalidShape(
                "cannot score an empty sample set".to_string(),
            ));
        }

        let n_t: T = cast(y.len() as f64)?;
        let mean = y.sum() / n_t;
        let ss_res = y
            .iter()
            .zip(prediction.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + (a - b) * (a - b));
        let ss_tot = y.iter().fold(T::zero(), |acc, &a| acc + (a - mean) * (a - mean));

        if ss_tot > T::zero() {
            Ok(T::one() - ss_res / ss_tot)
        } else if ss_res > T::zero() {
            Ok(T::zero())
        } else {
            Ok(T::one())
        }
    }

    /// Dense weight tensor W of shape (dim₁, …, dim_d)
    pub fn weight_tensor(&self) -> RegressionResult<DenseND<T>> {
        let state = self.fitted()?;
        let views: Vec<ArrayView2<T>> = state.factors.iter().map(|f| f.view()).collect();
        Ok(cp_reconstruct(&views, None)?)
    }

    /// Row-major vec(W), so that `partial_vec(X) · vec(W) + bias == predict(X)`
    pub fn weight_vector(&self) -> RegressionResult<Array1<T>> {
        Ok(Array1::from(self.weight_tensor()?.to_vec()))
    }

    /// Fitted factor matrices, factor k of shape (dim_k, r)
    pub fn factors(&self) -> RegressionResult<&[Array2<T>]> {
        Ok(&self.fitted()?.factors)
    }

    /// Fitted intercept (zero unless `fit_intercept`)
    pub fn bias(&self) -> RegressionResult<T> {
        Ok(self.fitted()?.bias)
    }

    /// Per-sample shape seen during fit
    pub fn sample_shape(&self) -> RegressionResult<&[usize]> {
        Ok(&self.fitted()?.sample_shape)
    }

    pub fn report(&self) -> RegressionResult<&FitReport<T>> {
        Ok(&self.fitted()?.report)
    }

    /// Number of estimated parameters, r·Σ dim_k (+1 with an intercept)
    pub fn n_parameters(&self) -> RegressionResult<usize> {
        let state = self.fitted()?;
        let factor_params: usize = state.sample_shape.iter().sum::<usize>() * self.config.rank;
        let intercept = if self.config.fit_intercept { 1 } else { 0 };
        Ok(factor_params + intercept)
    }

    fn fitted(&self) -> RegressionResult<&FittedCp<T>> {
        self.state.as_ref().ok_or(RegressionError::NotFitted)
    }
}

/// Loss bookkeeping that decides when the sweep loop stops
///
/// The fit counts as exact once the loss is below `ε·mean(y²)`. Relative
/// changes are measured against at least `sqrt(ε)·mean(y²)`, the residual
/// level the ridge floor of the factor solves can leave behind, so a loss
/// that plateaus there still converges for small `tol`.
#[derive(Debug, Clone)]
struct StoppingRule<T> {
    tol: T,
    exact_threshold: T,
    scale_floor: T,
    patience: Option<usize>,
    previous: Option<T>,
    consecutive_increases: usize,
}

/// Outcome of recording one sweep's loss
#[derive(Debug, Clone, Copy)]
struct SweepCheck<T> {
    rel_change: Option<T>,
    /// Previous loss, when this sweep increased it
    increased_from: Option<T>,
    stop: Option<StopReason>,
}

impl<T: Float> StoppingRule<T> {
    fn new(tol: T, label_power: T, patience: Option<usize>) -> Self {
        Self {
            tol,
            exact_threshold: T::epsilon() * label_power,
            scale_floor: (T::epsilon().sqrt() * label_power).max(T::min_positive_value()),
            patience,
            previous: None,
            consecutive_increases: 0,
        }
    }

    fn record(&mut self, loss: T) -> SweepCheck<T> {
        let previous = self.previous.replace(loss);
        let scale_floor = self.scale_floor;
        let rel_change = previous.map(|prev| (prev - loss).abs() / prev.abs().max(scale_floor));
        let increased_from = previous.filter(|&prev| loss > prev);

        if increased_from.is_some() {
            self.consecutive_increases += 1;
        } else {
            self.consecutive_increases = 0;
        }

        let stop = if self
            .patience
            .is_some_and(|p| self.consecutive_increases >= p)
        {
            Some(StopReason::Diverged)
        } else if loss <= self.exact_threshold || rel_change.is_some_and(|c| c < self.tol) {
            Some(StopReason::Converged)
        } else {
            None
        };

        SweepCheck {
            rel_change,
            increased_from,
            stop,
        }
    }
}

/// Check the training pair and return the per-sample shape
fn validate_training_data<T>(x: &DenseND<T>, y: &Array1<T>) -> RegressionResult<Vec<usize>>
where
    T: Float,
{
    let shape = x.shape();
    if shape.len() < 2 {
        return Err(RegressionError::InvalidShape(format!(
            "samples need a leading sample axis and at least one mode, got shape {:?}",
            shape
        )));
    }
    if shape[0] == 0 {
        return Err(RegressionError::InvalidShape(
            "at least one sample is required".to_string(),
        ));
    }
    if let Some(mode) = shape[1..].iter().position(|&d| d == 0) {
        return Err(RegressionError::InvalidShape(format!(
            "sample mode {} has size 0 in shape {:?}",
            mode, shape
        )));
    }
    if y.len() != shape[0] {
        return Err(RegressionError::InvalidShape(format!(
            "{} samples but {} labels",
            shape[0],
            y.len()
        )));
    }
    Ok(shape[1..].to_vec())
}

/// Φ_k of shape (N, dim_k·r), `Φ_k[n, i·r + c] = Σ X[n, …i…] Π_{j≠k} F_j[i_j, c]`
fn design_matrix<T>(
    unfolding: &Array2<T>,
    factors: &[Array2<T>],
    mode: usize,
    n: usize,
) -> RegressionResult<Array2<T>>
where
    T: Float + Send + Sync + 'static,
{
    let views: Vec<ArrayView2<T>> = factors.iter().map(|f| f.view()).collect();
    let kr = khatri_rao_seq(&views, Some(mode))?;
    let dim = factors[mode].nrows();
    let rank = kr.ncols();

    unfolding
        .dot(&kr)
        .into_shape_with_order((n, dim * rank))
        .map_err(|e| RegressionError::InvalidShape(e.to_string()))
}

fn init_factor<T, R>(
    dim: usize,
    rank: usize,
    init: FactorInit,
    rng: &mut R,
) -> RegressionResult<Array2<T>>
where
    T: Float,
    R: Rng,
{
    let scale = 1.0 / (dim as f64).sqrt();
    let tensor = match init {
        FactorInit::RandomNormal => {
            DenseND::<T>::random_normal_with_rng(&[dim, rank], 0.0, scale, rng)
        }
        FactorInit::RandomUniform => {
            let mut t = DenseND::<T>::random_uniform_with_rng(&[dim, rank], 0.0, 1.0, rng);
            let s: T = cast(scale)?;
            t.iter_mut().for_each(|v| *v = *v * s);
            t
        }
    };
    Array2::from_shape_vec((dim, rank), tensor.to_vec())
        .map_err(|e| RegressionError::InvalidShape(e.to_string()))
}

/// Give every mode the same column norm per component, leaving W unchanged
fn balance_factors<T: Float>(factors: &mut [Array2<T>]) {
    if factors.len() < 2 {
        return;
    }
    let rank = factors[0].ncols();
    let d = <T as NumCast>::from(factors.len()).unwrap_or_else(T::one);

    for c in 0..rank {
        let norms: Vec<T> = factors
            .iter()
            .map(|f| f.column(c).iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt())
            .collect();
        if norms.iter().any(|&nrm| nrm <= T::zero() || !nrm.is_finite()) {
            continue;
        }
        let log_mean = norms.iter().fold(T::zero(), |acc, &nrm| acc + nrm.ln()) / d;
        let target = log_mean.exp();
        for (f, &nrm) in factors.iter_mut().zip(norms.iter()) {
            let s = target / nrm;
            f.column_mut(c).mapv_inplace(|v| v * s);
        }
    }
}

fn cast<T: NumCast>(value: f64) -> RegressionResult<T> {
    <T as NumCast>::from(value).ok_or_else(|| {
        RegressionError::InvalidShape(format!("value {} is not representable", value))
    })
}

fn to_f64<T: Float>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn join_dims(dims: &[usize]) -> String {
    dims.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
