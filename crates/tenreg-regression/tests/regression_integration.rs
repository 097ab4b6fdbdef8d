//! Integration tests for the CP regressor
//!
//! Synthetic problems are generated inline from seeded tensors.

use scirs2_core::ndarray_ext::{Array1, Array2};
use scirs2_core::random::{SeedableRng, StdRng};
use std::sync::atomic::AtomicBool;
use tenreg_core::DenseND;
use tenreg_kernels::cp_reconstruct;
use tenreg_regression::{
    CpRegressor, CpRegressorConfig, FactorInit, RegressionError, StopReason, TensorRegressor,
    Verbosity,
};

/// Labels `y_n = <X_n, W>` for the CP weight with the given factors
fn labels_for(x: &DenseND<f64>, factors: &[Array2<f64>]) -> Array1<f64> {
    let views: Vec<_> = factors.iter().map(|f| f.view()).collect();
    let w = cp_reconstruct(&views, None).unwrap();
    x.partial_vec(1).unwrap().dot(&Array1::from(w.to_vec()))
}

fn random_factor(rows: usize, rank: usize, seed: u64) -> Array2<f64> {
    DenseND::<f64>::random_normal_seeded(&[rows, rank], 0.0, 1.0, seed)
        .unfold(0)
        .unwrap()
}

fn relative_error(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let num = (a - b).mapv(|v| v * v).sum().sqrt();
    let den = b.mapv(|v| v * v).sum().sqrt();
    num / den
}

#[test]
fn test_rank_one_images_25x25() {
    let x = DenseND::<f64>::random_normal_seeded(&[1000, 25, 25], 0.0, 1.0, 0);
    let factors = vec![random_factor(25, 1, 1), random_factor(25, 1, 2)];
    let y = labels_for(&x, &factors);

    let config = CpRegressorConfig::new(1)
        .with_reg_w(0.0)
        .with_tol(1e-6)
        .with_n_iter_max(100);
    let mut model = CpRegressor::new(config).unwrap();
    model.fit(&x, &y).unwrap();

    let y_hat = model.predict(&x).unwrap();
    let err = relative_error(&y_hat, &y);
    assert!(err < 1e-3, "relative training error {}", err);

    // Recovered weight matches the generating one
    let views: Vec<_> = factors.iter().map(|f| f.view()).collect();
    let w_true = cp_reconstruct(&views, None).unwrap();
    let w_hat = model.weight_tensor().unwrap();
    let diff = (&w_hat - &w_true).frobenius_norm() / w_true.frobenius_norm();
    assert!(diff < 1e-3, "relative weight error {}", diff);
}

#[test]
fn test_single_sample_interpolates() {
    let x = DenseND::<f64>::random_normal_seeded(&[1, 5, 4], 0.0, 1.0, 3);
    let y = Array1::from(vec![3.0]);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    model.fit(&x, &y).unwrap();

    let y_hat = model.predict(&x).unwrap();
    assert!((y_hat[0] - 3.0).abs() < 1e-5, "prediction {}", y_hat[0]);
}

#[test]
fn test_huge_regularization_collapses_to_bias() {
    let x = DenseND::<f64>::random_normal_seeded(&[200, 6, 6], 0.0, 1.0, 4);
    let factors = vec![random_factor(6, 1, 5), random_factor(6, 1, 6)];
    let y = labels_for(&x, &factors).mapv(|v| v + 2.0);

    let mut plain = CpRegressor::new(CpRegressorConfig::new(1).with_reg_w(1e12)).unwrap();
    plain.fit(&x, &y).unwrap();
    let y_hat = plain.predict(&x).unwrap();
    assert!(y_hat.iter().all(|v| v.abs() < 1e-6));
    assert!(plain.factors().unwrap().iter().all(|f| f.iter().all(|v| v.abs() < 1e-3)));

    let mut with_bias = CpRegressor::new(
        CpRegressorConfig::new(1)
            .with_reg_w(1e12)
            .with_fit_intercept(true),
    )
    .unwrap();
    with_bias.fit(&x, &y).unwrap();
    let mean = y.sum() / y.len() as f64;
    let y_hat = with_bias.predict(&x).unwrap();
    assert!(y_hat.iter().all(|v| (v - mean).abs() < 1e-4));
}

#[test]
fn test_rank_capacity() {
    let x = DenseND::<f64>::random_normal_seeded(&[500, 8, 8], 0.0, 1.0, 7);
    let factors = vec![random_factor(8, 2, 8), random_factor(8, 2, 9)];
    let y = labels_for(&x, &factors);

    let fit_loss = |rank: usize| {
        let mut model = CpRegressor::new(
            CpRegressorConfig::new(rank)
                .with_tol(1e-12)
                .with_n_iter_max(500),
        )
        .unwrap();
        model.fit(&x, &y).unwrap();
        model.report().unwrap().final_loss().unwrap()
    };

    let loss_1 = fit_loss(1);
    let loss_2 = fit_loss(2);
    assert!(
        loss_2 < 0.1 * loss_1,
        "rank-2 loss {} not well below rank-1 loss {}",
        loss_2,
        loss_1
    );
}

#[test]
fn test_intercept_is_recovered() {
    let x = DenseND::<f64>::random_normal_seeded(&[300, 5, 4], 0.0, 1.0, 10);
    let factors = vec![random_factor(5, 1, 11), random_factor(4, 1, 12)];
    let y = labels_for(&x, &factors).mapv(|v| v + 5.0);

    let mut model = CpRegressor::new(
        CpRegressorConfig::new(1)
            .with_fit_intercept(true)
            .with_tol(1e-10)
            .with_n_iter_max(200),
    )
    .unwrap();
    model.fit(&x, &y).unwrap();

    assert!((model.bias().unwrap() - 5.0).abs() < 1e-4);
    assert!(model.score(&x, &y).unwrap() > 0.9999);
}

#[test]
fn test_vector_samples_reduce_to_linear_regression() {
    let x = DenseND::<f64>::random_normal_seeded(&[60, 6], 0.0, 1.0, 13);
    let beta = Array1::from(vec![1.0, -2.0, 0.0, 0.5, 3.0, -1.0]);
    let y = x.partial_vec(1).unwrap().dot(&beta);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    model.fit(&x, &y).unwrap();

    let w = model.weight_vector().unwrap();
    for (a, b) in w.iter().zip(beta.iter()) {
        assert!((a - b).abs() < 1e-5, "{} vs {}", a, b);
    }
}

#[test]
fn test_third_order_samples() {
    let x = DenseND::<f64>::random_normal_seeded(&[400, 4, 3, 5], 0.0, 1.0, 14);
    let factors = vec![
        random_factor(4, 1, 15),
        random_factor(3, 1, 16),
        random_factor(5, 1, 17),
    ];
    let y = labels_for(&x, &factors);

    let mut model = CpRegressor::new(
        CpRegressorConfig::new(1)
            .with_tol(1e-10)
            .with_n_iter_max(300),
    )
    .unwrap();
    model.fit(&x, &y).unwrap();

    let err = relative_error(&model.predict(&x).unwrap(), &y);
    assert!(err < 1e-3, "relative error {}", err);
    assert_eq!(model.n_parameters().unwrap(), 4 + 3 + 5);
}

#[test]
fn test_refit_overwrites_model() {
    let x1 = DenseND::<f64>::random_normal_seeded(&[50, 3, 3], 0.0, 1.0, 18);
    let x2 = DenseND::<f64>::random_normal_seeded(&[40, 2, 5], 0.0, 1.0, 19);
    let y1 = Array1::from_shape_fn(50, |n| x1[&[n, 0, 0]]);
    let y2 = Array1::from_shape_fn(40, |n| x2[&[n, 1, 4]]);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    model.fit(&x1, &y1).unwrap();
    assert_eq!(model.sample_shape().unwrap(), &[3, 3]);

    model.fit(&x2, &y2).unwrap();
    assert_eq!(model.sample_shape().unwrap(), &[2, 5]);
    assert!(model.predict(&x1).is_err());
    assert_eq!(model.predict(&x2).unwrap().len(), 40);
}

#[test]
fn test_errors_leave_fitted_model_intact() {
    let x = DenseND::<f64>::random_normal_seeded(&[30, 3, 4], 0.0, 1.0, 20);
    let y = Array1::from_shape_fn(30, |n| x[&[n, 2, 1]]);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    assert!(matches!(model.predict(&x), Err(RegressionError::NotFitted)));

    model.fit(&x, &y).unwrap();
    let before = model.predict(&x).unwrap();

    let short_y = Array1::<f64>::zeros(29);
    assert!(matches!(
        model.fit(&x, &short_y),
        Err(RegressionError::InvalidShape(_))
    ));
    let no_modes = DenseND::<f64>::zeros(&[30]);
    assert!(matches!(
        model.fit(&no_modes, &y),
        Err(RegressionError::InvalidShape(_))
    ));
    let empty = DenseND::<f64>::zeros(&[0, 3, 4]);
    assert!(matches!(
        model.fit(&empty, &Array1::zeros(0)),
        Err(RegressionError::InvalidShape(_))
    ));

    let wrong_shape = DenseND::<f64>::zeros(&[5, 4, 3]);
    assert!(matches!(
        model.predict(&wrong_shape),
        Err(RegressionError::InvalidShape(_))
    ));

    assert_eq!(model.predict(&x).unwrap(), before);
}

#[test]
fn test_invalid_hyperparameters_rejected() {
    for config in [
        CpRegressorConfig::new(0),
        CpRegressorConfig::new(1).with_reg_w(-0.5),
        CpRegressorConfig::new(1).with_tol(-1.0),
        CpRegressorConfig::new(1).with_n_iter_max(0),
    ] {
        assert!(matches!(
            CpRegressor::<f64>::new(config),
            Err(RegressionError::InvalidHyperparameter { .. })
        ));
    }
}

#[test]
fn test_predict_empty_batch() {
    let x = DenseND::<f64>::random_normal_seeded(&[20, 2, 2], 0.0, 1.0, 21);
    let y = Array1::from_shape_fn(20, |n| x[&[n, 0, 1]]);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    model.fit(&x, &y).unwrap();

    let none = DenseND::<f64>::zeros(&[0, 2, 2]);
    assert_eq!(model.predict(&none).unwrap().len(), 0);
}

#[test]
fn test_same_seed_same_factors() {
    let x = DenseND::<f64>::random_normal_seeded(&[60, 4, 4], 0.0, 1.0, 22);
    let y = Array1::from_shape_fn(60, |n| x[&[n, 0, 0]] + x[&[n, 3, 3]]);

    let fit = |config: CpRegressorConfig| {
        let mut model = CpRegressor::new(config).unwrap();
        model.fit(&x, &y).unwrap();
        model.factors().unwrap().to_vec()
    };

    let config = CpRegressorConfig::new(2).with_random_state(Some(17));
    assert_eq!(fit(config.clone()), fit(config));

    let uniform = CpRegressorConfig::new(2).with_init(FactorInit::RandomUniform);
    assert_eq!(fit(uniform.clone()), fit(uniform));

    let mut a = CpRegressor::new(CpRegressorConfig::new(2)).unwrap();
    let mut b = CpRegressor::new(CpRegressorConfig::new(2)).unwrap();
    a.fit_with_rng(&x, &y, &mut StdRng::seed_from_u64(5)).unwrap();
    b.fit_with_rng(&x, &y, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a.factors().unwrap(), b.factors().unwrap());
}

#[test]
fn test_unseeded_fit_still_converges() {
    let x = DenseND::<f64>::random_normal_seeded(&[100, 3, 3], 0.0, 1.0, 23);
    let y = Array1::from_shape_fn(100, |n| 2.0 * x[&[n, 1, 1]]);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1).with_random_state(None)).unwrap();
    model.fit(&x, &y).unwrap();
    assert!(model.score(&x, &y).unwrap() > 0.999);
}

#[test]
fn test_cancelled_fit_is_consistent() {
    let x = DenseND::<f64>::random_normal_seeded(&[40, 3, 3], 0.0, 1.0, 24);
    let y = Array1::from_shape_fn(40, |n| x[&[n, 0, 2]]);
    let cancel = AtomicBool::new(true);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    model
        .fit_with_control(&x, &y, &mut StdRng::seed_from_u64(0), Some(&cancel))
        .unwrap();

    let report = model.report().unwrap();
    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert_eq!(report.n_iter, 0);
    assert!(report.final_loss().is_none());
    assert_eq!(model.predict(&x).unwrap().len(), 40);
}

#[test]
fn test_tight_tolerance_on_exact_labels_converges() {
    let x = DenseND::<f64>::random_normal_seeded(&[100, 4, 4], 0.0, 1.0, 0);
    let y = Array1::from_shape_fn(100, |n| x[&[n, 1, 2]] - 2.0 * x[&[n, 3, 2]]);

    for tol in [1e-6, 1e-8, 1e-10, 1e-12] {
        let mut model = CpRegressor::new(
            CpRegressorConfig::new(1)
                .with_tol(tol)
                .with_n_iter_max(200),
        )
        .unwrap();
        model.fit(&x, &y).unwrap();

        let report = model.report().unwrap();
        assert_eq!(report.stop_reason, StopReason::Converged, "tol = {}", tol);
        assert!(report.n_iter < 100, "tol = {} took {} sweeps", tol, report.n_iter);
        assert!(model.score(&x, &y).unwrap() > 0.999999);
    }
}

#[test]
fn test_report_histories() {
    let x = DenseND::<f64>::random_normal_seeded(&[80, 4, 4], 0.0, 1.0, 25);
    let factors = vec![random_factor(4, 1, 26), random_factor(4, 1, 27)];
    let y = labels_for(&x, &factors);

    let mut model = CpRegressor::new(
        CpRegressorConfig::new(1)
            .with_n_iter_max(3)
            .with_tol(1e-300),
    )
    .unwrap();
    model.fit(&x, &y).unwrap();

    let report = model.report().unwrap();
    assert_eq!(report.loss_history.len(), report.n_iter);
    assert_eq!(report.weight_norm_history.len(), report.n_iter);
    assert!(report.n_iter <= 3);

    let last_norm = *report.weight_norm_history.last().unwrap();
    let dense_norm = model.weight_tensor().unwrap().frobenius_norm();
    assert!((last_norm - dense_norm).abs() < 1e-10 * (1.0 + dense_norm));
}

#[test]
fn test_verbose_fit_logs_without_failing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let x = DenseND::<f64>::random_normal_seeded(&[50, 3, 3], 0.0, 1.0, 28);
    let y = Array1::from_shape_fn(50, |n| x[&[n, 1, 0]]);

    let mut model = CpRegressor::new(
        CpRegressorConfig::new(2)
            .with_verbosity(Verbosity::PerIteration)
            .with_divergence_patience(Some(3)),
    )
    .unwrap();
    model.fit(&x, &y).unwrap();
    assert!(model.report().unwrap().n_iter >= 1);
}

#[test]
fn test_trait_object_style_usage() {
    fn fit_predict<M: TensorRegressor<f32>>(
        model: &mut M,
        x: &DenseND<f32>,
        y: &Array1<f32>,
    ) -> Array1<f32> {
        model.fit(x, y).unwrap();
        model.predict(x).unwrap()
    }

    let x = DenseND::<f32>::random_normal_seeded(&[100, 3, 2], 0.0, 1.0, 29);
    let y = Array1::from_shape_fn(100, |n| x[&[n, 2, 1]] * 1.5);

    let mut model = CpRegressor::new(CpRegressorConfig::new(1)).unwrap();
    let y_hat = fit_predict(&mut model, &x, &y);
    for (a, b) in y_hat.iter().zip(y.iter()) {
        assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
    }
    assert_eq!(TensorRegressor::weight_tensor(&model).unwrap().shape(), &[3, 2]);
}
