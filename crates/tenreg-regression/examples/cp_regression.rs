//! Rank-1 tensor regression on synthetic 25×25 "images".
//!
//! A weight pattern W = u ∘ v is planted, labels are `<X_i, W>`, and the
//! CP regressor recovers W from 1000 noise-free samples.
//!
//! Run with:
//! ```bash
//! RUST_LOG=tenreg_regression=info cargo run --example cp_regression
//! ```

use scirs2_core::ndarray_ext::Array1;
use tenreg_core::DenseND;
use tenreg_regression::{CpRegressor, CpRegressorConfig, Verbosity};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    println!("{}", "=".repeat(80));
    println!("CP Tensor Regression Example");
    println!("{}", "=".repeat(80));
    println!();

    // Planted pattern: a vertical bar times a horizontal bar (a cross section)
    let size = 25;
    let u: Vec<f64> = (0..size).map(|i| if (8..17).contains(&i) { 1.0 } else { 0.0 }).collect();
    let v: Vec<f64> = (0..size).map(|j| ((j as f64) / 4.0).sin()).collect();
    let w_true = DenseND::from_vec(
        (0..size * size).map(|idx| u[idx / size] * v[idx % size]).collect(),
        &[size, size],
    )?;

    let n_samples = 1000;
    let x = DenseND::<f64>::random_normal_seeded(&[n_samples, size, size], 0.0, 1.0, 0);
    let y: Array1<f64> = x.partial_vec(1)?.dot(&Array1::from(w_true.to_vec()));

    println!("Samples: {:?}", x.shape());
    println!("Dense parameters: {}", size * size);
    println!();

    let config = CpRegressorConfig::new(1)
        .with_reg_w(0.0)
        .with_tol(1e-6)
        .with_n_iter_max(100)
        .with_verbosity(Verbosity::PerIteration);
    let mut model = CpRegressor::new(config)?;
    model.fit(&x, &y)?;

    let report = model.report()?;
    println!("Results:");
    println!("  - Iterations: {}", report.n_iter);
    println!("  - Stop reason: {:?}", report.stop_reason);
    if let Some(loss) = report.final_loss() {
        println!("  - Final loss: {:.3e}", loss);
    }
    println!("  - CP parameters: {}", model.n_parameters()?);

    let y_hat = model.predict(&x)?;
    let err = (&y_hat - &y).mapv(|e| e * e).sum().sqrt() / y.mapv(|e| e * e).sum().sqrt();
    println!("  - Relative training error: {:.3e}", err);
    println!("  - R²: {:.6}", model.score(&x, &y)?);

    let w_hat = model.weight_tensor()?;
    let w_err = (&w_hat - &w_true).frobenius_norm() / w_true.frobenius_norm();
    println!("  - Relative weight error: {:.3e}", w_err);
    println!();

    // Held-out samples
    let x_test = DenseND::<f64>::random_normal_seeded(&[200, size, size], 0.0, 1.0, 1);
    let y_test = x_test.partial_vec(1)?.dot(&Array1::from(w_true.to_vec()));
    println!("Held-out R²: {:.6}", model.score(&x_test, &y_test)?);

    Ok(())
}
